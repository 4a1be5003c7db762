// db/escrowdb.rs
use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use super::walletdb::credit_wallet_in_tx;
use crate::models::escrowmodels::*;
use crate::models::walletmodels::{generate_transaction_reference, TransactionType};

const ESCROW_COLUMNS: &str = r#"
    id,
    project_id,
    milestone_id,
    employer_id,
    contractor_id,
    amount,
    status,
    authority,
    ref_id,
    payment_date,
    release_date,
    created_at,
    updated_at
"#;

#[async_trait]
pub trait EscrowExt {
    async fn get_project(&self, project_id: Uuid) -> Result<Option<Project>, Error>;
    async fn get_milestone(&self, milestone_id: Uuid) -> Result<Option<Milestone>, Error>;
    async fn update_project_status(
        &self,
        project_id: Uuid,
        status: ProjectStatus,
    ) -> Result<Option<Project>, Error>;

    /// Advances `assigned -> in_progress` when the first milestone payment
    /// lands in escrow. A no-op for projects already past `assigned`.
    async fn advance_project_to_in_progress(&self, project_id: Uuid) -> Result<(), Error>;

    async fn get_escrow_transaction(
        &self,
        transaction_id: Uuid,
    ) -> Result<Option<EscrowTransaction>, Error>;

    /// All payment attempts for a `(project, milestone)` pair, oldest first.
    /// Callers decide which of them count as live via
    /// `EscrowStatus::is_live_payment`.
    async fn get_milestone_payments(
        &self,
        project_id: Uuid,
        milestone_id: Uuid,
    ) -> Result<Vec<EscrowTransaction>, Error>;

    async fn create_escrow_transaction(
        &self,
        project_id: Uuid,
        milestone_id: Option<Uuid>,
        employer_id: Uuid,
        contractor_id: Uuid,
        amount: i64,
    ) -> Result<EscrowTransaction, Error>;

    async fn set_transaction_authority(
        &self,
        transaction_id: Uuid,
        authority: &str,
    ) -> Result<(), Error>;

    /// Compensating delete for a `pending` row whose gateway request never
    /// went through. Rows that reached `held` are never deleted.
    async fn delete_pending_transaction(&self, transaction_id: Uuid) -> Result<(), Error>;

    async fn get_pending_by_authority(
        &self,
        transaction_id: Uuid,
        authority: &str,
    ) -> Result<Option<EscrowTransaction>, Error>;

    async fn mark_transaction_held(
        &self,
        transaction_id: Uuid,
        ref_id: &str,
    ) -> Result<Option<EscrowTransaction>, Error>;

    async fn mark_transaction_failed(
        &self,
        transaction_id: Uuid,
    ) -> Result<Option<EscrowTransaction>, Error>;

    async fn get_held_transactions(&self, project_id: Uuid)
        -> Result<Vec<EscrowTransaction>, Error>;

    /// Credits the contractor with the full held amount and transitions the
    /// transaction `held -> released`. Status claim and wallet credit share
    /// one database transaction; `Ok(None)` means another request already
    /// moved the row out of `held`. Partial payouts go through
    /// `split_escrow`, which settles the row in the same claim.
    async fn release_escrow(
        &self,
        transaction_id: Uuid,
        description: &str,
    ) -> Result<Option<EscrowTransaction>, Error>;

    /// Symmetric to `release_escrow`: credits the employer with the full
    /// held amount as a refund and sets `refunded`.
    async fn refund_escrow(
        &self,
        transaction_id: Uuid,
        description: &str,
    ) -> Result<Option<EscrowTransaction>, Error>;

    /// Split settlement: claims `held -> split`, then credits both sides in
    /// the same database transaction. Zero-amount sides are skipped.
    async fn split_escrow(
        &self,
        transaction_id: Uuid,
        contractor_amount: i64,
        employer_amount: i64,
        description: &str,
    ) -> Result<Option<EscrowTransaction>, Error>;
}

#[async_trait]
impl EscrowExt for DBClient {
    async fn get_project(&self, project_id: Uuid) -> Result<Option<Project>, Error> {
        sqlx::query_as::<_, Project>(
            r#"
            SELECT id, employer_id, contractor_id, title, status, created_at, updated_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(project_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_milestone(&self, milestone_id: Uuid) -> Result<Option<Milestone>, Error> {
        sqlx::query_as::<_, Milestone>(
            r#"
            SELECT id, project_id, title, amount, status, created_at
            FROM milestones
            WHERE id = $1
            "#,
        )
        .bind(milestone_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update_project_status(
        &self,
        project_id: Uuid,
        status: ProjectStatus,
    ) -> Result<Option<Project>, Error> {
        sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, employer_id, contractor_id, title, status, created_at, updated_at
            "#,
        )
        .bind(project_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
    }

    async fn advance_project_to_in_progress(&self, project_id: Uuid) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE projects
            SET status = 'in_progress'::project_status, updated_at = NOW()
            WHERE id = $1 AND status = 'assigned'::project_status
            "#,
        )
        .bind(project_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_escrow_transaction(
        &self,
        transaction_id: Uuid,
    ) -> Result<Option<EscrowTransaction>, Error> {
        sqlx::query_as::<_, EscrowTransaction>(&format!(
            "SELECT {ESCROW_COLUMNS} FROM escrow_transactions WHERE id = $1"
        ))
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_milestone_payments(
        &self,
        project_id: Uuid,
        milestone_id: Uuid,
    ) -> Result<Vec<EscrowTransaction>, Error> {
        sqlx::query_as::<_, EscrowTransaction>(&format!(
            r#"
            SELECT {ESCROW_COLUMNS}
            FROM escrow_transactions
            WHERE project_id = $1 AND milestone_id = $2
            ORDER BY created_at
            "#
        ))
        .bind(project_id)
        .bind(milestone_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn create_escrow_transaction(
        &self,
        project_id: Uuid,
        milestone_id: Option<Uuid>,
        employer_id: Uuid,
        contractor_id: Uuid,
        amount: i64,
    ) -> Result<EscrowTransaction, Error> {
        sqlx::query_as::<_, EscrowTransaction>(&format!(
            r#"
            INSERT INTO escrow_transactions
            (project_id, milestone_id, employer_id, contractor_id, amount, status)
            VALUES ($1, $2, $3, $4, $5, 'pending'::escrow_status)
            RETURNING {ESCROW_COLUMNS}
            "#
        ))
        .bind(project_id)
        .bind(milestone_id)
        .bind(employer_id)
        .bind(contractor_id)
        .bind(amount)
        .fetch_one(&self.pool)
        .await
    }

    async fn set_transaction_authority(
        &self,
        transaction_id: Uuid,
        authority: &str,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE escrow_transactions
            SET authority = $2, updated_at = NOW()
            WHERE id = $1 AND authority IS NULL
            "#,
        )
        .bind(transaction_id)
        .bind(authority)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_pending_transaction(&self, transaction_id: Uuid) -> Result<(), Error> {
        sqlx::query(
            "DELETE FROM escrow_transactions WHERE id = $1 AND status = 'pending'::escrow_status",
        )
        .bind(transaction_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_pending_by_authority(
        &self,
        transaction_id: Uuid,
        authority: &str,
    ) -> Result<Option<EscrowTransaction>, Error> {
        sqlx::query_as::<_, EscrowTransaction>(&format!(
            r#"
            SELECT {ESCROW_COLUMNS}
            FROM escrow_transactions
            WHERE id = $1 AND authority = $2 AND status = 'pending'::escrow_status
            "#
        ))
        .bind(transaction_id)
        .bind(authority)
        .fetch_optional(&self.pool)
        .await
    }

    async fn mark_transaction_held(
        &self,
        transaction_id: Uuid,
        ref_id: &str,
    ) -> Result<Option<EscrowTransaction>, Error> {
        sqlx::query_as::<_, EscrowTransaction>(&format!(
            r#"
            UPDATE escrow_transactions
            SET status = 'held'::escrow_status,
                ref_id = $2,
                payment_date = NOW(),
                updated_at = NOW()
            WHERE id = $1 AND status = 'pending'::escrow_status
            RETURNING {ESCROW_COLUMNS}
            "#
        ))
        .bind(transaction_id)
        .bind(ref_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn mark_transaction_failed(
        &self,
        transaction_id: Uuid,
    ) -> Result<Option<EscrowTransaction>, Error> {
        sqlx::query_as::<_, EscrowTransaction>(&format!(
            r#"
            UPDATE escrow_transactions
            SET status = 'failed'::escrow_status, updated_at = NOW()
            WHERE id = $1 AND status = 'pending'::escrow_status
            RETURNING {ESCROW_COLUMNS}
            "#
        ))
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_held_transactions(
        &self,
        project_id: Uuid,
    ) -> Result<Vec<EscrowTransaction>, Error> {
        sqlx::query_as::<_, EscrowTransaction>(&format!(
            r#"
            SELECT {ESCROW_COLUMNS}
            FROM escrow_transactions
            WHERE project_id = $1 AND status = 'held'::escrow_status
            ORDER BY created_at
            "#
        ))
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn release_escrow(
        &self,
        transaction_id: Uuid,
        description: &str,
    ) -> Result<Option<EscrowTransaction>, Error> {
        let mut tx = self.pool.begin().await?;

        // Claim first: the credited amount always comes from the claimed
        // row itself, so a release can never pay out more than was held.
        let escrow = sqlx::query_as::<_, EscrowTransaction>(&format!(
            r#"
            UPDATE escrow_transactions
            SET status = 'released'::escrow_status,
                release_date = NOW(),
                updated_at = NOW()
            WHERE id = $1 AND status = 'held'::escrow_status
            RETURNING {ESCROW_COLUMNS}
            "#
        ))
        .bind(transaction_id)
        .fetch_optional(&mut *tx)
        .await?;

        let escrow = match escrow {
            Some(row) => row,
            None => return Ok(None),
        };

        credit_wallet_in_tx(
            &mut tx,
            escrow.contractor_id,
            escrow.amount,
            TransactionType::Earning,
            description,
            &generate_transaction_reference(),
            escrow.ref_id.as_deref(),
        )
        .await?;

        tx.commit().await?;
        Ok(Some(escrow))
    }

    async fn refund_escrow(
        &self,
        transaction_id: Uuid,
        description: &str,
    ) -> Result<Option<EscrowTransaction>, Error> {
        let mut tx = self.pool.begin().await?;

        let escrow = sqlx::query_as::<_, EscrowTransaction>(&format!(
            r#"
            UPDATE escrow_transactions
            SET status = 'refunded'::escrow_status,
                release_date = NOW(),
                updated_at = NOW()
            WHERE id = $1 AND status = 'held'::escrow_status
            RETURNING {ESCROW_COLUMNS}
            "#
        ))
        .bind(transaction_id)
        .fetch_optional(&mut *tx)
        .await?;

        let escrow = match escrow {
            Some(row) => row,
            None => return Ok(None),
        };

        credit_wallet_in_tx(
            &mut tx,
            escrow.employer_id,
            escrow.amount,
            TransactionType::Refund,
            description,
            &generate_transaction_reference(),
            escrow.ref_id.as_deref(),
        )
        .await?;

        tx.commit().await?;
        Ok(Some(escrow))
    }

    async fn split_escrow(
        &self,
        transaction_id: Uuid,
        contractor_amount: i64,
        employer_amount: i64,
        description: &str,
    ) -> Result<Option<EscrowTransaction>, Error> {
        let mut tx = self.pool.begin().await?;

        // Claim first: a retried decision finds no row in `held` and cannot
        // credit either wallet a second time.
        let escrow = sqlx::query_as::<_, EscrowTransaction>(&format!(
            r#"
            UPDATE escrow_transactions
            SET status = 'split'::escrow_status,
                release_date = NOW(),
                updated_at = NOW()
            WHERE id = $1 AND status = 'held'::escrow_status
            RETURNING {ESCROW_COLUMNS}
            "#
        ))
        .bind(transaction_id)
        .fetch_optional(&mut *tx)
        .await?;

        let escrow = match escrow {
            Some(row) => row,
            None => return Ok(None),
        };

        if contractor_amount > 0 {
            credit_wallet_in_tx(
                &mut tx,
                escrow.contractor_id,
                contractor_amount,
                TransactionType::Earning,
                description,
                &generate_transaction_reference(),
                escrow.ref_id.as_deref(),
            )
            .await?;
        }

        if employer_amount > 0 {
            credit_wallet_in_tx(
                &mut tx,
                escrow.employer_id,
                employer_amount,
                TransactionType::Refund,
                description,
                &generate_transaction_reference(),
                escrow.ref_id.as_deref(),
            )
            .await?;
        }

        tx.commit().await?;
        Ok(Some(escrow))
    }
}
