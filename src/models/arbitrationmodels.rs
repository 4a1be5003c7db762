// models/arbitrationmodels.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "arbitration_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ArbitrationStatus {
    Pending,
    Assigned,
    Resolved,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "arbitration_decision", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ArbitrationDecision {
    Contractor,
    Employer,
    Split,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Arbitration {
    pub id: Uuid,
    pub project_id: Uuid,
    pub initiator_id: Uuid,
    pub arbitrator_id: Option<Uuid>,
    pub reason: String,
    pub status: ArbitrationStatus,
    pub decision: Option<ArbitrationDecision>,
    pub contractor_percentage: Option<i16>,
    pub resolution: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
}
