// service/error.rs
use axum::http::StatusCode;
use thiserror::Error;
use uuid::Uuid;

use crate::error::HttpError;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Milestone {1} of project {0} already has a held or released payment")]
    DuplicateMilestonePayment(Uuid, Uuid),

    #[error("Project {0} has no assigned contractor")]
    ContractorNotAssigned(Uuid),

    #[error("No pending transaction matches the given id and authority")]
    TransactionNotFound,

    #[error("Transaction {0} is not in a state that allows this operation")]
    InvalidTransactionState(Uuid),

    #[error("User {0} is not the arbitrator assigned to case {1}")]
    ArbitratorNotAssigned(Uuid, Uuid),

    #[error("Arbitration case {0} is not in the required state for this operation")]
    CaseNotInAssignedState(Uuid),

    #[error("Arbitration case {0} not found")]
    CaseNotFound(Uuid),

    #[error("Invalid decision input: {0}")]
    InvalidDecisionInput(String),

    #[error("Amount must be a positive number of Rials")]
    InvalidAmount,

    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: i64, available: i64 },

    #[error("Payment gateway error: {0}")]
    Gateway(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Notification error: {0}")]
    Notification(String),
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        let message = error.to_string();
        match error {
            ServiceError::TransactionNotFound | ServiceError::CaseNotFound(_) => {
                HttpError::not_found(message)
            }

            ServiceError::DuplicateMilestonePayment(_, _)
            | ServiceError::InvalidTransactionState(_)
            | ServiceError::CaseNotInAssignedState(_) => HttpError::conflict(message),

            ServiceError::ContractorNotAssigned(_)
            | ServiceError::InvalidDecisionInput(_)
            | ServiceError::InvalidAmount
            | ServiceError::Validation(_) => HttpError::bad_request(message),

            ServiceError::ArbitratorNotAssigned(_, _) => HttpError::forbidden(message),

            ServiceError::InsufficientBalance { .. } => HttpError::payment_required(message),

            ServiceError::Gateway(_) => HttpError::bad_gateway(message),

            _ => HttpError::server_error(message),
        }
    }
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::TransactionNotFound | ServiceError::CaseNotFound(_) => {
                StatusCode::NOT_FOUND
            }

            ServiceError::DuplicateMilestonePayment(_, _)
            | ServiceError::InvalidTransactionState(_)
            | ServiceError::CaseNotInAssignedState(_) => StatusCode::CONFLICT,

            ServiceError::ContractorNotAssigned(_)
            | ServiceError::InvalidDecisionInput(_)
            | ServiceError::InvalidAmount
            | ServiceError::Validation(_) => StatusCode::BAD_REQUEST,

            ServiceError::ArbitratorNotAssigned(_, _) => StatusCode::FORBIDDEN,

            ServiceError::InsufficientBalance { .. } => StatusCode::PAYMENT_REQUIRED,

            ServiceError::Gateway(_) => StatusCode::BAD_GATEWAY,

            ServiceError::Database(_) | ServiceError::Notification(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_conflicts_map_to_409() {
        let id = Uuid::new_v4();
        assert_eq!(
            ServiceError::InvalidTransactionState(id).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::CaseNotInAssignedState(id).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::DuplicateMilestonePayment(id, id).status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_arbitrator_check_maps_to_403() {
        let id = Uuid::new_v4();
        assert_eq!(
            ServiceError::ArbitratorNotAssigned(id, id).status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_insufficient_balance_maps_to_402() {
        let err = ServiceError::InsufficientBalance {
            required: 100,
            available: 50,
        };
        assert_eq!(err.status_code(), StatusCode::PAYMENT_REQUIRED);
    }
}
