// dtos/escrowdtos.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::escrowmodels::*;

#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentRedirectDto {
    pub transaction_id: Uuid,
    pub authority: String,
    pub payment_url: String,
    pub amount: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EscrowTransactionDto {
    pub id: Uuid,
    pub project_id: Uuid,
    pub milestone_id: Option<Uuid>,
    pub amount: i64,
    pub status: EscrowStatus,
    pub ref_id: Option<String>,
    pub payment_date: Option<DateTime<Utc>>,
    pub release_date: Option<DateTime<Utc>>,
}

impl From<EscrowTransaction> for EscrowTransactionDto {
    fn from(tx: EscrowTransaction) -> Self {
        EscrowTransactionDto {
            id: tx.id,
            project_id: tx.project_id,
            milestone_id: tx.milestone_id,
            amount: tx.amount,
            status: tx.status,
            ref_id: tx.ref_id,
            payment_date: tx.payment_date,
            release_date: tx.release_date,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ReleaseRequestDto {
    /// Optional confirmation of the amount being released; must equal the
    /// full held amount when provided. Partial settlements go through
    /// arbitration.
    pub amount: Option<i64>,
}

/// ZarinPal redirects the payer back with these query parameters.
#[derive(Debug, Deserialize)]
pub struct GatewayCallbackQuery {
    pub transaction_id: Uuid,
    #[serde(rename = "Authority")]
    pub authority: String,
    #[serde(rename = "Status")]
    pub status: String,
}
