// db/arbitrationdb.rs
use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::arbitrationmodels::*;

const ARBITRATION_COLUMNS: &str = r#"
    id,
    project_id,
    initiator_id,
    arbitrator_id,
    reason,
    status,
    decision,
    contractor_percentage,
    resolution,
    created_at,
    resolved_at
"#;

#[async_trait]
pub trait ArbitrationExt {
    async fn create_arbitration(
        &self,
        project_id: Uuid,
        initiator_id: Uuid,
        reason: String,
    ) -> Result<Arbitration, Error>;

    async fn get_arbitration(&self, case_id: Uuid) -> Result<Option<Arbitration>, Error>;

    async fn get_open_case_for_project(
        &self,
        project_id: Uuid,
    ) -> Result<Option<Arbitration>, Error>;

    /// Compare-and-swap `pending -> assigned`; `Ok(None)` means another
    /// request assigned the case first.
    async fn assign_arbitrator(
        &self,
        case_id: Uuid,
        arbitrator_id: Uuid,
    ) -> Result<Option<Arbitration>, Error>;

    /// Compare-and-swap `assigned -> resolved` recording the ruling.
    /// `Ok(None)` means the case was not in `assigned` state.
    async fn resolve_arbitration(
        &self,
        case_id: Uuid,
        decision: ArbitrationDecision,
        contractor_percentage: Option<i16>,
        resolution: String,
    ) -> Result<Option<Arbitration>, Error>;
}

#[async_trait]
impl ArbitrationExt for DBClient {
    async fn create_arbitration(
        &self,
        project_id: Uuid,
        initiator_id: Uuid,
        reason: String,
    ) -> Result<Arbitration, Error> {
        sqlx::query_as::<_, Arbitration>(&format!(
            r#"
            INSERT INTO arbitrations (project_id, initiator_id, reason, status)
            VALUES ($1, $2, $3, 'pending'::arbitration_status)
            RETURNING {ARBITRATION_COLUMNS}
            "#
        ))
        .bind(project_id)
        .bind(initiator_id)
        .bind(reason)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_arbitration(&self, case_id: Uuid) -> Result<Option<Arbitration>, Error> {
        sqlx::query_as::<_, Arbitration>(&format!(
            "SELECT {ARBITRATION_COLUMNS} FROM arbitrations WHERE id = $1"
        ))
        .bind(case_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_open_case_for_project(
        &self,
        project_id: Uuid,
    ) -> Result<Option<Arbitration>, Error> {
        sqlx::query_as::<_, Arbitration>(&format!(
            r#"
            SELECT {ARBITRATION_COLUMNS}
            FROM arbitrations
            WHERE project_id = $1
              AND status IN ('pending'::arbitration_status, 'assigned'::arbitration_status)
            LIMIT 1
            "#
        ))
        .bind(project_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn assign_arbitrator(
        &self,
        case_id: Uuid,
        arbitrator_id: Uuid,
    ) -> Result<Option<Arbitration>, Error> {
        sqlx::query_as::<_, Arbitration>(&format!(
            r#"
            UPDATE arbitrations
            SET arbitrator_id = $2, status = 'assigned'::arbitration_status
            WHERE id = $1 AND status = 'pending'::arbitration_status
            RETURNING {ARBITRATION_COLUMNS}
            "#
        ))
        .bind(case_id)
        .bind(arbitrator_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn resolve_arbitration(
        &self,
        case_id: Uuid,
        decision: ArbitrationDecision,
        contractor_percentage: Option<i16>,
        resolution: String,
    ) -> Result<Option<Arbitration>, Error> {
        sqlx::query_as::<_, Arbitration>(&format!(
            r#"
            UPDATE arbitrations
            SET status = 'resolved'::arbitration_status,
                decision = $2,
                contractor_percentage = $3,
                resolution = $4,
                resolved_at = NOW()
            WHERE id = $1 AND status = 'assigned'::arbitration_status
            RETURNING {ARBITRATION_COLUMNS}
            "#
        ))
        .bind(case_id)
        .bind(decision)
        .bind(contractor_percentage)
        .bind(resolution)
        .fetch_optional(&self.pool)
        .await
    }
}
