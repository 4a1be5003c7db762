// db/walletdb.rs
use async_trait::async_trait;
use sqlx::{Error, Postgres, Row, Transaction};
use uuid::Uuid;

use super::db::DBClient;
use crate::models::walletmodels::*;

const WALLET_TX_COLUMNS: &str = r#"
    id,
    wallet_id,
    user_id,
    transaction_type,
    amount,
    status,
    reference,
    external_reference,
    description,
    created_at,
    completed_at
"#;

/// Credit a user's wallet inside an already-open database transaction.
///
/// Creates the wallet lazily on first credit, bumps `total_earned` for
/// earning credits, and appends the completed ledger row. Every caller
/// commits the balance change and the audit row as one unit; there is no
/// code path that mutates a balance without a wallet_transactions insert.
pub(crate) async fn credit_wallet_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    amount: i64,
    transaction_type: TransactionType,
    description: &str,
    reference: &str,
    external_reference: Option<&str>,
) -> Result<WalletTransaction, Error> {
    let wallet_row = sqlx::query(
        r#"
        INSERT INTO wallets (user_id, balance, total_earned, total_spent)
        VALUES ($1, $2, CASE WHEN $3 = 'earning'::transaction_type THEN $2 ELSE 0 END, 0)
        ON CONFLICT (user_id) DO UPDATE SET
            balance = wallets.balance + $2,
            total_earned = wallets.total_earned
                + CASE WHEN $3 = 'earning'::transaction_type THEN $2 ELSE 0 END,
            updated_at = NOW()
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(amount)
    .bind(transaction_type)
    .fetch_one(&mut **tx)
    .await?;

    let wallet_id = wallet_row.get::<Uuid, _>("id");

    sqlx::query_as::<_, WalletTransaction>(&format!(
        r#"
        INSERT INTO wallet_transactions
        (wallet_id, user_id, transaction_type, amount, reference, external_reference,
         description, status, completed_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, 'completed'::transaction_status, NOW())
        RETURNING {WALLET_TX_COLUMNS}
        "#
    ))
    .bind(wallet_id)
    .bind(user_id)
    .bind(transaction_type)
    .bind(amount)
    .bind(reference)
    .bind(external_reference)
    .bind(description)
    .fetch_one(&mut **tx)
    .await
}

#[async_trait]
pub trait WalletExt {
    async fn get_wallet(&self, user_id: Uuid) -> Result<Option<Wallet>, Error>;

    /// Returns `Ok(None)` when the balance does not cover the amount.
    async fn debit_wallet(
        &self,
        user_id: Uuid,
        amount: i64,
        transaction_type: TransactionType,
        description: String,
        reference: String,
    ) -> Result<Option<WalletTransaction>, Error>;

    async fn create_pending_deposit(
        &self,
        user_id: Uuid,
        amount: i64,
        reference: String,
        authority: String,
    ) -> Result<WalletTransaction, Error>;

    async fn get_pending_deposit_by_authority(
        &self,
        authority: &str,
    ) -> Result<Option<WalletTransaction>, Error>;

    /// Completes a pending deposit and credits the wallet balance in the
    /// same database transaction. Returns `Ok(None)` when the row is no
    /// longer `pending` (already completed or failed by another request).
    async fn complete_pending_deposit(
        &self,
        transaction_id: Uuid,
        ref_id: String,
    ) -> Result<Option<WalletTransaction>, Error>;

    async fn fail_pending_deposit(
        &self,
        transaction_id: Uuid,
    ) -> Result<Option<WalletTransaction>, Error>;

    async fn get_wallet_transactions(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<WalletTransaction>, Error>;
}

#[async_trait]
impl WalletExt for DBClient {
    async fn get_wallet(&self, user_id: Uuid) -> Result<Option<Wallet>, Error> {
        sqlx::query_as::<_, Wallet>(
            r#"
            SELECT id, user_id, balance, total_earned, total_spent, created_at, updated_at
            FROM wallets
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn debit_wallet(
        &self,
        user_id: Uuid,
        amount: i64,
        transaction_type: TransactionType,
        description: String,
        reference: String,
    ) -> Result<Option<WalletTransaction>, Error> {
        let mut tx = self.pool.begin().await?;

        let wallet = sqlx::query_as::<_, Wallet>(
            r#"
            SELECT id, user_id, balance, total_earned, total_spent, created_at, updated_at
            FROM wallets
            WHERE user_id = $1
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let wallet = match wallet {
            Some(row) => row,
            None => return Ok(None), // no wallet, nothing to debit
        };

        if !wallet.can_debit(amount) {
            return Ok(None);
        }

        sqlx::query(
            r#"
            UPDATE wallets
            SET balance = balance - $2,
                total_spent = total_spent
                    + CASE WHEN $3 = 'payment'::transaction_type THEN $2 ELSE 0 END,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(wallet.id)
        .bind(amount)
        .bind(transaction_type)
        .execute(&mut *tx)
        .await?;

        let transaction = sqlx::query_as::<_, WalletTransaction>(&format!(
            r#"
            INSERT INTO wallet_transactions
            (wallet_id, user_id, transaction_type, amount, reference, description,
             status, completed_at)
            VALUES ($1, $2, $3, $4, $5, $6, 'completed'::transaction_status, NOW())
            RETURNING {WALLET_TX_COLUMNS}
            "#
        ))
        .bind(wallet.id)
        .bind(user_id)
        .bind(transaction_type)
        .bind(amount)
        .bind(reference)
        .bind(description)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(transaction))
    }

    async fn create_pending_deposit(
        &self,
        user_id: Uuid,
        amount: i64,
        reference: String,
        authority: String,
    ) -> Result<WalletTransaction, Error> {
        let mut tx = self.pool.begin().await?;

        // The wallet row must exist so the pending ledger entry has a home,
        // but the balance stays untouched until the gateway verifies.
        let wallet_row = sqlx::query(
            r#"
            INSERT INTO wallets (user_id, balance, total_earned, total_spent)
            VALUES ($1, 0, 0, 0)
            ON CONFLICT (user_id) DO UPDATE SET updated_at = NOW()
            RETURNING id
            "#,
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let transaction = sqlx::query_as::<_, WalletTransaction>(&format!(
            r#"
            INSERT INTO wallet_transactions
            (wallet_id, user_id, transaction_type, amount, reference, external_reference,
             description, status)
            VALUES ($1, $2, 'deposit'::transaction_type, $3, $4, $5,
                    'Wallet deposit via payment gateway', 'pending'::transaction_status)
            RETURNING {WALLET_TX_COLUMNS}
            "#
        ))
        .bind(wallet_row.get::<Uuid, _>("id"))
        .bind(user_id)
        .bind(amount)
        .bind(reference)
        .bind(authority)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(transaction)
    }

    async fn get_pending_deposit_by_authority(
        &self,
        authority: &str,
    ) -> Result<Option<WalletTransaction>, Error> {
        sqlx::query_as::<_, WalletTransaction>(&format!(
            r#"
            SELECT {WALLET_TX_COLUMNS}
            FROM wallet_transactions
            WHERE external_reference = $1
              AND transaction_type = 'deposit'::transaction_type
              AND status = 'pending'::transaction_status
            "#
        ))
        .bind(authority)
        .fetch_optional(&self.pool)
        .await
    }

    async fn complete_pending_deposit(
        &self,
        transaction_id: Uuid,
        ref_id: String,
    ) -> Result<Option<WalletTransaction>, Error> {
        let mut tx = self.pool.begin().await?;

        // Claim the row first: a concurrent or retried callback finds zero
        // rows here and cannot credit the wallet twice.
        let claimed = sqlx::query_as::<_, WalletTransaction>(&format!(
            r#"
            UPDATE wallet_transactions
            SET status = 'completed'::transaction_status,
                external_reference = $2,
                completed_at = NOW()
            WHERE id = $1 AND status = 'pending'::transaction_status
            RETURNING {WALLET_TX_COLUMNS}
            "#
        ))
        .bind(transaction_id)
        .bind(ref_id)
        .fetch_optional(&mut *tx)
        .await?;

        let claimed = match claimed {
            Some(row) => row,
            None => return Ok(None),
        };

        sqlx::query(
            "UPDATE wallets SET balance = balance + $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(claimed.wallet_id)
        .bind(claimed.amount)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(claimed))
    }

    async fn fail_pending_deposit(
        &self,
        transaction_id: Uuid,
    ) -> Result<Option<WalletTransaction>, Error> {
        sqlx::query_as::<_, WalletTransaction>(&format!(
            r#"
            UPDATE wallet_transactions
            SET status = 'failed'::transaction_status
            WHERE id = $1 AND status = 'pending'::transaction_status
            RETURNING {WALLET_TX_COLUMNS}
            "#
        ))
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_wallet_transactions(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<WalletTransaction>, Error> {
        sqlx::query_as::<_, WalletTransaction>(&format!(
            r#"
            SELECT {WALLET_TX_COLUMNS}
            FROM wallet_transactions
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }
}
