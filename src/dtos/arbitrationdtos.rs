// dtos/arbitrationdtos.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::arbitrationmodels::*;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct OpenCaseDto {
    pub project_id: Uuid,

    #[validate(length(min = 10, max = 2000, message = "Reason must be between 10 and 2000 characters"))]
    pub reason: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AssignArbitratorDto {
    /// Required when an admin assigns; ignored for arbitrator self-assignment.
    pub arbitrator_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct DecisionDto {
    pub decision: ArbitrationDecision,

    pub contractor_percentage: Option<i16>,

    #[validate(length(min = 1, max = 5000, message = "Resolution text is required"))]
    pub resolution: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ArbitrationDto {
    pub id: Uuid,
    pub project_id: Uuid,
    pub initiator_id: Uuid,
    pub arbitrator_id: Option<Uuid>,
    pub status: ArbitrationStatus,
    pub decision: Option<ArbitrationDecision>,
    pub contractor_percentage: Option<i16>,
    pub resolution: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl From<Arbitration> for ArbitrationDto {
    fn from(case: Arbitration) -> Self {
        ArbitrationDto {
            id: case.id,
            project_id: case.project_id,
            initiator_id: case.initiator_id,
            arbitrator_id: case.arbitrator_id,
            status: case.status,
            decision: case.decision,
            contractor_percentage: case.contractor_percentage,
            resolution: case.resolution,
            created_at: case.created_at,
            resolved_at: case.resolved_at,
        }
    }
}
