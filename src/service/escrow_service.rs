// service/escrow_service.rs
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::{db::DBClient, escrowdb::EscrowExt},
    models::escrowmodels::*,
    service::{
        error::ServiceError,
        notification_service::NotificationService,
        zarinpal::{PaymentRequest, ZarinpalService},
    },
};

/// A direct release always pays out the full held amount; anything less
/// goes through the arbitration split path, which settles the row in the
/// same claim. Accepting an arbitrary figure here would let repeated
/// requests credit more than was ever held, because the row would stay
/// `held` with no record of what already left.
pub fn validate_release_amount(
    requested: Option<i64>,
    held: i64,
) -> Result<i64, ServiceError> {
    match requested {
        None => Ok(held),
        Some(amount) if amount <= 0 => Err(ServiceError::InvalidAmount),
        Some(amount) if amount == held => Ok(held),
        Some(_) => Err(ServiceError::Validation(
            "A direct release must pay out the full held amount; partial settlements go through arbitration".to_string(),
        )),
    }
}

/// Owns the state machine of a single milestone payment: no double
/// payment for a milestone, no orphaned `pending` rows, and no wallet
/// credit without the matching status claim.
#[derive(Clone)]
pub struct EscrowService {
    db_client: Arc<DBClient>,
    gateway: Arc<ZarinpalService>,
    notification_service: Arc<NotificationService>,
}

impl EscrowService {
    pub fn new(
        db_client: Arc<DBClient>,
        gateway: Arc<ZarinpalService>,
        notification_service: Arc<NotificationService>,
    ) -> Self {
        Self {
            db_client,
            gateway,
            notification_service,
        }
    }

    pub async fn create_pending_transaction(
        &self,
        project_id: Uuid,
        milestone_id: Uuid,
        employer_id: Uuid,
        amount: i64,
    ) -> Result<EscrowTransaction, ServiceError> {
        if amount <= 0 {
            return Err(ServiceError::InvalidAmount);
        }

        let project = self
            .db_client
            .get_project(project_id)
            .await?
            .ok_or_else(|| ServiceError::Validation(format!("Project {} not found", project_id)))?;

        if project.employer_id != employer_id {
            return Err(ServiceError::Validation(
                "Only the project employer can fund a milestone".to_string(),
            ));
        }

        let contractor_id = project
            .contractor_id
            .ok_or(ServiceError::ContractorNotAssigned(project_id))?;

        let payments = self
            .db_client
            .get_milestone_payments(project_id, milestone_id)
            .await?;
        if let Some(existing) = payments.iter().find(|t| t.status.is_live_payment()) {
            tracing::warn!(
                "duplicate milestone payment attempt: milestone {} already covered by transaction {}",
                milestone_id,
                existing.id
            );
            return Err(ServiceError::DuplicateMilestonePayment(project_id, milestone_id));
        }

        let transaction = self
            .db_client
            .create_escrow_transaction(project_id, Some(milestone_id), employer_id, contractor_id, amount)
            .await?;

        Ok(transaction)
    }

    /// Obtains a gateway session for a freshly created `pending` row. If the
    /// gateway refuses, the row is removed again: no payment was initiated,
    /// so nothing must accumulate in `pending`.
    pub async fn request_gateway_payment(
        &self,
        transaction: &EscrowTransaction,
        description: &str,
        callback_url: &str,
    ) -> Result<PaymentRequest, ServiceError> {
        let callback = format!("{}?transaction_id={}", callback_url, transaction.id);

        match self
            .gateway
            .request_payment(transaction.amount, description, &callback)
            .await
        {
            Ok(request) => {
                self.db_client
                    .set_transaction_authority(transaction.id, &request.authority)
                    .await?;
                Ok(request)
            }
            Err(gateway_error) => {
                self.db_client
                    .delete_pending_transaction(transaction.id)
                    .await?;
                tracing::warn!(
                    "gateway refused payment request for transaction {}: {}",
                    transaction.id,
                    gateway_error
                );
                Err(gateway_error)
            }
        }
    }

    /// Gateway callback path: verify the payment against the stored amount
    /// and move `pending -> held`. A project's first held milestone advances
    /// the project to `in_progress`.
    pub async fn verify_and_hold(
        &self,
        transaction_id: Uuid,
        authority: &str,
    ) -> Result<EscrowTransaction, ServiceError> {
        let transaction = self
            .db_client
            .get_pending_by_authority(transaction_id, authority)
            .await?
            .ok_or(ServiceError::TransactionNotFound)?;

        match self
            .gateway
            .verify_payment(authority, transaction.amount)
            .await
        {
            Ok(verification) => {
                let held = self
                    .db_client
                    .mark_transaction_held(transaction.id, &verification.ref_id)
                    .await?
                    .ok_or(ServiceError::InvalidTransactionState(transaction.id))?;

                self.db_client
                    .advance_project_to_in_progress(held.project_id)
                    .await?;

                tracing::info!(
                    "transaction {} held: amount {} ref_id {}",
                    held.id,
                    held.amount,
                    verification.ref_id
                );

                if let Err(e) = self.notification_service.notify_payment_held(&held).await {
                    tracing::warn!("failed to notify payment hold for {}: {}", held.id, e);
                }

                Ok(held)
            }
            Err(gateway_error) => {
                self.db_client.mark_transaction_failed(transaction.id).await?;
                tracing::warn!(
                    "gateway verification failed for transaction {}: {}",
                    transaction.id,
                    gateway_error
                );
                Err(gateway_error)
            }
        }
    }

    /// Payer abandoned the gateway page (callback with a non-OK status).
    /// No verification call is needed; the pending row just becomes `failed`.
    pub async fn cancel_pending(
        &self,
        transaction_id: Uuid,
        authority: &str,
    ) -> Result<EscrowTransaction, ServiceError> {
        let transaction = self
            .db_client
            .get_pending_by_authority(transaction_id, authority)
            .await?
            .ok_or(ServiceError::TransactionNotFound)?;

        self.db_client
            .mark_transaction_failed(transaction.id)
            .await?
            .ok_or(ServiceError::InvalidTransactionState(transaction.id))
    }

    /// Credits the contractor with the full held amount and transitions the
    /// transaction to `released`. `requested` lets API callers echo the
    /// amount they expect; anything other than the full held amount is
    /// rejected before any state is touched.
    pub async fn release(
        &self,
        transaction_id: Uuid,
        requested: Option<i64>,
    ) -> Result<EscrowTransaction, ServiceError> {
        let current = self
            .db_client
            .get_escrow_transaction(transaction_id)
            .await?
            .ok_or(ServiceError::TransactionNotFound)?;

        let amount = validate_release_amount(requested, current.amount)?;

        if !current.status.can_transition(EscrowStatus::Released) {
            return Err(ServiceError::InvalidTransactionState(transaction_id));
        }

        let escrow = self
            .db_client
            .release_escrow(transaction_id, "Escrow release for milestone work")
            .await?
            .ok_or(ServiceError::InvalidTransactionState(transaction_id))?;

        if let Err(e) = self
            .notification_service
            .notify_escrow_released(&escrow, amount)
            .await
        {
            tracing::warn!("failed to notify release of {}: {}", escrow.id, e);
        }

        Ok(escrow)
    }

    /// Symmetric to `release`: credits the employer with the full held
    /// amount as a refund and sets `refunded`.
    pub async fn refund(&self, transaction_id: Uuid) -> Result<EscrowTransaction, ServiceError> {
        let current = self
            .db_client
            .get_escrow_transaction(transaction_id)
            .await?
            .ok_or(ServiceError::TransactionNotFound)?;

        if !current.status.can_transition(EscrowStatus::Refunded) {
            return Err(ServiceError::InvalidTransactionState(transaction_id));
        }

        self.db_client
            .refund_escrow(transaction_id, "Escrow refund to employer")
            .await?
            .ok_or(ServiceError::InvalidTransactionState(transaction_id))
    }

    /// Settles a held transaction by percentage split. Both wallet credits
    /// and the `held -> split` claim commit as one unit.
    pub async fn split(
        &self,
        transaction_id: Uuid,
        contractor_amount: i64,
        employer_amount: i64,
    ) -> Result<EscrowTransaction, ServiceError> {
        if contractor_amount < 0 || employer_amount < 0 {
            return Err(ServiceError::InvalidAmount);
        }

        self.db_client
            .split_escrow(
                transaction_id,
                contractor_amount,
                employer_amount,
                "Arbitration split settlement",
            )
            .await?
            .ok_or(ServiceError::InvalidTransactionState(transaction_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_defaults_to_full_held_amount() {
        assert_eq!(validate_release_amount(None, 1_000_000).unwrap(), 1_000_000);
        assert_eq!(
            validate_release_amount(Some(1_000_000), 1_000_000).unwrap(),
            1_000_000
        );
    }

    #[test]
    fn test_release_rejects_partial_amounts() {
        // Repeated partial payouts would credit more than was ever held,
        // since the row would stay in `held` at its full amount.
        assert!(matches!(
            validate_release_amount(Some(600_000), 1_000_000),
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            validate_release_amount(Some(999_999), 1_000_000),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn test_release_rejects_amounts_above_held() {
        assert!(matches!(
            validate_release_amount(Some(1_000_001), 1_000_000),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn test_release_rejects_non_positive_amounts() {
        assert!(matches!(
            validate_release_amount(Some(0), 1_000_000),
            Err(ServiceError::InvalidAmount)
        ));
        assert!(matches!(
            validate_release_amount(Some(-1), 1_000_000),
            Err(ServiceError::InvalidAmount)
        ));
    }
}
