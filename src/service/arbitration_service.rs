// service/arbitration_service.rs
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::{arbitrationdb::ArbitrationExt, db::DBClient, escrowdb::EscrowExt},
    models::{arbitrationmodels::*, escrowmodels::*, usermodel::*},
    service::{
        error::ServiceError, escrow_service::EscrowService,
        notification_service::NotificationService,
    },
};

/// Compute the split of a held amount between contractor and employer.
///
/// The employer side is derived by subtraction, never by multiplying the
/// complementary percentage: the two amounts must sum to the original
/// amount exactly, so integer truncation on the contractor side can never
/// create or destroy a Rial.
pub fn split_amounts(amount: i64, contractor_percentage: i16) -> (i64, i64) {
    let contractor_amount = amount * contractor_percentage as i64 / 100;
    let employer_amount = amount - contractor_amount;
    (contractor_amount, employer_amount)
}

/// Reject malformed rulings before any state is touched: a split needs a
/// percentage in [0, 100], a one-sided ruling must not carry one.
pub fn validate_decision(
    decision: ArbitrationDecision,
    contractor_percentage: Option<i16>,
) -> Result<(), ServiceError> {
    match (decision, contractor_percentage) {
        (ArbitrationDecision::Split, Some(pct)) if (0..=100).contains(&pct) => Ok(()),
        (ArbitrationDecision::Split, Some(pct)) => Err(ServiceError::InvalidDecisionInput(
            format!("contractor percentage {} is outside [0, 100]", pct),
        )),
        (ArbitrationDecision::Split, None) => Err(ServiceError::InvalidDecisionInput(
            "a split decision requires a contractor percentage".to_string(),
        )),
        (_, Some(_)) => Err(ServiceError::InvalidDecisionInput(
            "a contractor percentage is only valid for a split decision".to_string(),
        )),
        (_, None) => Ok(()),
    }
}

/// Converts a one-time arbitrator ruling into ledger movements across every
/// open escrow transaction of the disputed project.
#[derive(Clone)]
pub struct ArbitrationService {
    db_client: Arc<DBClient>,
    escrow_service: Arc<EscrowService>,
    notification_service: Arc<NotificationService>,
}

impl ArbitrationService {
    pub fn new(
        db_client: Arc<DBClient>,
        escrow_service: Arc<EscrowService>,
        notification_service: Arc<NotificationService>,
    ) -> Self {
        Self {
            db_client,
            escrow_service,
            notification_service,
        }
    }

    pub async fn open_case(
        &self,
        project_id: Uuid,
        initiator_id: Uuid,
        reason: String,
    ) -> Result<Arbitration, ServiceError> {
        let project = self
            .db_client
            .get_project(project_id)
            .await?
            .ok_or_else(|| ServiceError::Validation(format!("Project {} not found", project_id)))?;

        let is_involved = project.employer_id == initiator_id
            || project.contractor_id == Some(initiator_id);
        if !is_involved {
            return Err(ServiceError::Validation(
                "Only the employer or contractor of a project can open arbitration".to_string(),
            ));
        }

        if self
            .db_client
            .get_open_case_for_project(project_id)
            .await?
            .is_some()
        {
            return Err(ServiceError::Validation(
                "This project already has an open arbitration case".to_string(),
            ));
        }

        let case = self
            .db_client
            .create_arbitration(project_id, initiator_id, reason)
            .await?;

        self.db_client
            .update_project_status(project_id, ProjectStatus::Disputed)
            .await?;

        // The initiator already knows; tell the other party.
        let other_party = if project.employer_id == initiator_id {
            project.contractor_id
        } else {
            Some(project.employer_id)
        };
        if let Some(other) = other_party {
            if let Err(e) = self
                .notification_service
                .notify_arbitration_opened(&case, other)
                .await
            {
                tracing::warn!("failed to notify arbitration opening for case {}: {}", case.id, e);
            }
        }

        Ok(case)
    }

    /// Arbitrators self-assign a pending case; admins may assign any
    /// arbitrator. `assigned` is mandatory before a decision can land.
    pub async fn assign_arbitrator(
        &self,
        case_id: Uuid,
        caller: &User,
        arbitrator_id: Option<Uuid>,
    ) -> Result<Arbitration, ServiceError> {
        let target = match caller.role {
            UserRole::Arbitrator => caller.id,
            UserRole::Admin => arbitrator_id.ok_or_else(|| {
                ServiceError::Validation("An admin assignment requires an arbitrator id".to_string())
            })?,
            UserRole::User => {
                return Err(ServiceError::Validation(
                    "Only arbitrators or admins can take arbitration cases".to_string(),
                ))
            }
        };

        self.db_client
            .get_arbitration(case_id)
            .await?
            .ok_or(ServiceError::CaseNotFound(case_id))?;

        self.db_client
            .assign_arbitrator(case_id, target)
            .await?
            .ok_or(ServiceError::CaseNotInAssignedState(case_id))
    }

    /// Processes the arbitrator's ruling over every `held` transaction of
    /// the disputed project.
    ///
    /// Each settled transaction is claimed out of `held` in the same
    /// database transaction that credits the wallets, so a retried or
    /// concurrent call finds nothing left to reprocess. A project with
    /// nothing in escrow resolves successfully with zero movements.
    pub async fn process_decision(
        &self,
        case_id: Uuid,
        caller_id: Uuid,
        decision: ArbitrationDecision,
        contractor_percentage: Option<i16>,
        resolution: String,
    ) -> Result<Arbitration, ServiceError> {
        let case = self
            .db_client
            .get_arbitration(case_id)
            .await?
            .ok_or(ServiceError::CaseNotFound(case_id))?;

        if case.arbitrator_id != Some(caller_id) {
            return Err(ServiceError::ArbitratorNotAssigned(caller_id, case_id));
        }

        if case.status != ArbitrationStatus::Assigned {
            return Err(ServiceError::CaseNotInAssignedState(case_id));
        }

        validate_decision(decision, contractor_percentage)?;

        let held = self.db_client.get_held_transactions(case.project_id).await?;
        tracing::info!(
            "processing arbitration {} over {} held transaction(s): {:?}",
            case_id,
            held.len(),
            decision
        );

        for transaction in &held {
            let settled = match decision {
                ArbitrationDecision::Contractor => {
                    self.escrow_service.release(transaction.id, None).await
                }
                ArbitrationDecision::Employer => self.escrow_service.refund(transaction.id).await,
                ArbitrationDecision::Split => {
                    // Percentage presence was validated above.
                    let pct = contractor_percentage.unwrap_or(0);
                    let (contractor_amount, employer_amount) =
                        split_amounts(transaction.amount, pct);
                    self.escrow_service
                        .split(transaction.id, contractor_amount, employer_amount)
                        .await
                }
            };

            match settled {
                Ok(_) => {}
                // A concurrent settlement already claimed this row; the
                // wallets were not touched by us, so skipping is safe.
                Err(ServiceError::InvalidTransactionState(id)) => {
                    tracing::warn!(
                        "transaction {} left held state while processing case {}; skipped",
                        id,
                        case_id
                    );
                }
                Err(e) => return Err(e),
            }
        }

        let resolved = self
            .db_client
            .resolve_arbitration(case_id, decision, contractor_percentage, resolution)
            .await?
            .ok_or(ServiceError::CaseNotInAssignedState(case_id))?;

        let project = self
            .db_client
            .update_project_status(case.project_id, ProjectStatus::Completed)
            .await?;

        if let Some(project) = project {
            if let Err(e) = self
                .notification_service
                .notify_arbitration_resolved(&resolved, &project, decision, contractor_percentage)
                .await
            {
                tracing::warn!("failed to notify resolution of case {}: {}", case_id, e);
            }
        }

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_conservation_exact() {
        // contractor + employer == amount for every percentage, including
        // amounts that do not divide evenly.
        for amount in [1i64, 3, 99, 101, 1_000_000, 999_999_999_999] {
            for pct in 0..=100i16 {
                let (contractor, employer) = split_amounts(amount, pct);
                assert_eq!(
                    contractor + employer,
                    amount,
                    "conservation violated for amount {} pct {}",
                    amount,
                    pct
                );
                assert!(contractor >= 0 && employer >= 0);
            }
        }
    }

    #[test]
    fn test_split_seventy_thirty() {
        let (contractor, employer) = split_amounts(1_000_000, 70);
        assert_eq!(contractor, 700_000);
        assert_eq!(employer, 300_000);
    }

    #[test]
    fn test_split_boundaries() {
        assert_eq!(split_amounts(1_000_000, 0), (0, 1_000_000));
        assert_eq!(split_amounts(1_000_000, 100), (1_000_000, 0));
    }

    #[test]
    fn test_split_truncation_favors_employer() {
        // 33% of 100 is 33; the leftover Rial stays with the employer side.
        assert_eq!(split_amounts(100, 33), (33, 67));
        assert_eq!(split_amounts(1, 50), (0, 1));
    }

    #[test]
    fn test_validate_split_requires_percentage() {
        assert!(validate_decision(ArbitrationDecision::Split, Some(0)).is_ok());
        assert!(validate_decision(ArbitrationDecision::Split, Some(100)).is_ok());
        assert!(validate_decision(ArbitrationDecision::Split, None).is_err());
        assert!(validate_decision(ArbitrationDecision::Split, Some(101)).is_err());
        assert!(validate_decision(ArbitrationDecision::Split, Some(-1)).is_err());
    }

    #[test]
    fn test_validate_one_sided_rejects_percentage() {
        assert!(validate_decision(ArbitrationDecision::Contractor, None).is_ok());
        assert!(validate_decision(ArbitrationDecision::Employer, None).is_ok());
        assert!(validate_decision(ArbitrationDecision::Contractor, Some(50)).is_err());
        assert!(validate_decision(ArbitrationDecision::Employer, Some(100)).is_err());
    }
}
