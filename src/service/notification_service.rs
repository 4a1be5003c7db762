// service/notification_service.rs
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::{db::DBClient, userdb::UserExt},
    models::{arbitrationmodels::*, escrowmodels::*},
    service::error::ServiceError,
    utils::currency::format_rial,
};

/// Fire-and-forget notification sink. Settlement code treats every method
/// here as best-effort: a failed insert is logged by the caller and never
/// rolls back a ledger movement.
#[derive(Debug, Clone)]
pub struct NotificationService {
    db_client: Arc<DBClient>,
}

impl NotificationService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    pub async fn store_notification(
        &self,
        user_id: Option<Uuid>,
        notification_type: String,
        title: String,
        message: String,
        data: Option<serde_json::Value>,
    ) -> Result<(), ServiceError> {
        self.db_client
            .create_notification(user_id, notification_type, title, message, data)
            .await
            .map_err(|e| ServiceError::Notification(e.to_string()))?;
        Ok(())
    }

    pub async fn notify_payment_held(&self, escrow: &EscrowTransaction) -> Result<(), ServiceError> {
        tracing::info!(
            "payment held notification: transaction {} amount {}",
            escrow.id,
            escrow.amount
        );

        self.store_notification(
            Some(escrow.contractor_id),
            "payment_held".to_string(),
            "Milestone payment received".to_string(),
            format!(
                "{} is now held in escrow for your milestone",
                format_rial(escrow.amount)
            ),
            Some(serde_json::json!({
                "transaction_id": escrow.id,
                "project_id": escrow.project_id,
                "amount": escrow.amount,
            })),
        )
        .await
    }

    pub async fn notify_escrow_released(
        &self,
        escrow: &EscrowTransaction,
        amount: i64,
    ) -> Result<(), ServiceError> {
        self.store_notification(
            Some(escrow.contractor_id),
            "escrow_released".to_string(),
            "Payment released".to_string(),
            format!("{} has been released to your wallet", format_rial(amount)),
            Some(serde_json::json!({
                "transaction_id": escrow.id,
                "project_id": escrow.project_id,
                "amount": amount,
            })),
        )
        .await
    }

    pub async fn notify_arbitration_opened(
        &self,
        case: &Arbitration,
        other_party: Uuid,
    ) -> Result<(), ServiceError> {
        tracing::info!("arbitration opened for project {}", case.project_id);

        self.store_notification(
            Some(other_party),
            "arbitration_opened".to_string(),
            "Arbitration case opened".to_string(),
            "An arbitration case has been opened for your project".to_string(),
            Some(serde_json::json!({
                "case_id": case.id,
                "project_id": case.project_id,
            })),
        )
        .await
    }

    /// Both parties get the decision summary.
    pub async fn notify_arbitration_resolved(
        &self,
        case: &Arbitration,
        project: &Project,
        decision: ArbitrationDecision,
        contractor_percentage: Option<i16>,
    ) -> Result<(), ServiceError> {
        let summary = match decision {
            ArbitrationDecision::Contractor => {
                "The arbitrator ruled in favor of the contractor; held funds were released".to_string()
            }
            ArbitrationDecision::Employer => {
                "The arbitrator ruled in favor of the employer; held funds were refunded".to_string()
            }
            ArbitrationDecision::Split => format!(
                "The arbitrator split the held funds: {}% to the contractor",
                contractor_percentage.unwrap_or(0)
            ),
        };

        let data = serde_json::json!({
            "case_id": case.id,
            "project_id": case.project_id,
            "decision": decision,
            "contractor_percentage": contractor_percentage,
        });

        let recipients = [Some(project.employer_id), project.contractor_id];
        for recipient in recipients.into_iter().flatten() {
            self.store_notification(
                Some(recipient),
                "arbitration_resolved".to_string(),
                "Arbitration case resolved".to_string(),
                summary.clone(),
                Some(data.clone()),
            )
            .await?;
        }

        Ok(())
    }
}
