// service/wallet_service.rs
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::{db::DBClient, walletdb::WalletExt},
    models::walletmodels::*,
    service::{error::ServiceError, zarinpal::ZarinpalService},
};

/// Gateway-driven wallet deposits and withdrawals. Deposits are two-phase:
/// a `pending` ledger row at initiation, balance credit only after the
/// gateway independently verifies the payment.
#[derive(Clone)]
pub struct WalletService {
    db_client: Arc<DBClient>,
    gateway: Arc<ZarinpalService>,
}

pub struct DepositInitiation {
    pub transaction: WalletTransaction,
    pub payment_url: String,
}

impl WalletService {
    pub fn new(db_client: Arc<DBClient>, gateway: Arc<ZarinpalService>) -> Self {
        Self { db_client, gateway }
    }

    pub async fn initiate_deposit(
        &self,
        user_id: Uuid,
        amount: i64,
        callback_url: &str,
    ) -> Result<DepositInitiation, ServiceError> {
        if amount <= 0 {
            return Err(ServiceError::InvalidAmount);
        }

        // Gateway first: if it refuses there is nothing to record.
        let request = self
            .gateway
            .request_payment(amount, "Zemano wallet deposit", callback_url)
            .await?;

        let reference = generate_transaction_reference();
        let transaction = self
            .db_client
            .create_pending_deposit(user_id, amount, reference, request.authority.clone())
            .await?;

        Ok(DepositInitiation {
            transaction,
            payment_url: request.payment_url,
        })
    }

    /// Callback path. The pending row is claimed and the balance credited
    /// in one database transaction; a duplicate callback finds no pending
    /// row and fails without touching the balance.
    pub async fn verify_deposit(&self, authority: &str) -> Result<WalletTransaction, ServiceError> {
        let pending = self
            .db_client
            .get_pending_deposit_by_authority(authority)
            .await?
            .ok_or(ServiceError::TransactionNotFound)?;

        match self.gateway.verify_payment(authority, pending.amount).await {
            Ok(verification) => self
                .db_client
                .complete_pending_deposit(pending.id, verification.ref_id)
                .await?
                .ok_or(ServiceError::InvalidTransactionState(pending.id)),
            Err(gateway_error) => {
                self.db_client.fail_pending_deposit(pending.id).await?;
                tracing::warn!(
                    "deposit verification failed for transaction {}: {}",
                    pending.id,
                    gateway_error
                );
                Err(gateway_error)
            }
        }
    }

    pub async fn withdraw(
        &self,
        user_id: Uuid,
        amount: i64,
        description: String,
    ) -> Result<WalletTransaction, ServiceError> {
        if amount <= 0 {
            return Err(ServiceError::InvalidAmount);
        }

        let reference = generate_transaction_reference();
        let debited = self
            .db_client
            .debit_wallet(user_id, amount, TransactionType::Withdrawal, description, reference)
            .await?;

        match debited {
            Some(transaction) => Ok(transaction),
            None => {
                let available = self
                    .db_client
                    .get_wallet(user_id)
                    .await?
                    .map(|w| w.balance)
                    .unwrap_or(0);
                Err(ServiceError::InsufficientBalance {
                    required: amount,
                    available,
                })
            }
        }
    }
}
