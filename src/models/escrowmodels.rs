// models/escrowmodels.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "escrow_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EscrowStatus {
    Pending,
    Held,
    Released,
    Refunded,
    Split,
    Failed,
}

impl EscrowStatus {
    /// Forward-only state machine for a milestone payment.
    ///
    /// `pending` can only become `held` (gateway verified) or `failed`
    /// (gateway rejected). `held` reaches exactly one terminal state.
    pub fn can_transition(&self, to: EscrowStatus) -> bool {
        matches!(
            (self, to),
            (EscrowStatus::Pending, EscrowStatus::Held)
                | (EscrowStatus::Pending, EscrowStatus::Failed)
                | (EscrowStatus::Held, EscrowStatus::Released)
                | (EscrowStatus::Held, EscrowStatus::Refunded)
                | (EscrowStatus::Held, EscrowStatus::Split)
        )
    }

    /// A live payment still covers its milestone: money is sitting in
    /// escrow or was paid out to the contractor. A second payment for the
    /// same milestone must be rejected while one of these exists. Refunded
    /// and split settlements returned money to the employer, so the
    /// milestone may be funded again.
    pub fn is_live_payment(&self) -> bool {
        matches!(self, EscrowStatus::Held | EscrowStatus::Released)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EscrowStatus::Released | EscrowStatus::Refunded | EscrowStatus::Split | EscrowStatus::Failed
        )
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "project_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Open,
    Assigned,
    InProgress,
    Completed,
    Cancelled,
    Disputed,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "milestone_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MilestoneStatus {
    Pending,
    Funded,
    Delivered,
    Approved,
}

/// One milestone payment held by the platform pending release or refund.
/// `amount` is integer Rials and never changes after creation.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EscrowTransaction {
    pub id: Uuid,
    pub project_id: Uuid,
    pub milestone_id: Option<Uuid>,
    pub employer_id: Uuid,
    pub contractor_id: Uuid,
    pub amount: i64, // in Rials
    pub status: EscrowStatus,
    pub authority: Option<String>,
    pub ref_id: Option<String>,
    pub payment_date: Option<DateTime<Utc>>,
    pub release_date: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub id: Uuid,
    pub employer_id: Uuid,
    pub contractor_id: Option<Uuid>,
    pub title: String,
    pub status: ProjectStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Milestone {
    pub id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub amount: i64,
    pub status: MilestoneStatus,
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_transitions() {
        assert!(EscrowStatus::Pending.can_transition(EscrowStatus::Held));
        assert!(EscrowStatus::Pending.can_transition(EscrowStatus::Failed));
        assert!(!EscrowStatus::Pending.can_transition(EscrowStatus::Released));
        assert!(!EscrowStatus::Pending.can_transition(EscrowStatus::Refunded));
        assert!(!EscrowStatus::Pending.can_transition(EscrowStatus::Split));
    }

    #[test]
    fn test_held_reaches_exactly_the_terminal_states() {
        assert!(EscrowStatus::Held.can_transition(EscrowStatus::Released));
        assert!(EscrowStatus::Held.can_transition(EscrowStatus::Refunded));
        assert!(EscrowStatus::Held.can_transition(EscrowStatus::Split));
        assert!(!EscrowStatus::Held.can_transition(EscrowStatus::Pending));
        assert!(!EscrowStatus::Held.can_transition(EscrowStatus::Failed));
    }

    #[test]
    fn test_live_payment_blocks_a_second_funding() {
        assert!(EscrowStatus::Held.is_live_payment());
        assert!(EscrowStatus::Released.is_live_payment());
        assert!(!EscrowStatus::Pending.is_live_payment());
        assert!(!EscrowStatus::Failed.is_live_payment());
        assert!(!EscrowStatus::Refunded.is_live_payment());
        assert!(!EscrowStatus::Split.is_live_payment());
    }

    #[test]
    fn test_terminal_states_never_move() {
        let terminals = [
            EscrowStatus::Released,
            EscrowStatus::Refunded,
            EscrowStatus::Split,
            EscrowStatus::Failed,
        ];
        let all = [
            EscrowStatus::Pending,
            EscrowStatus::Held,
            EscrowStatus::Released,
            EscrowStatus::Refunded,
            EscrowStatus::Split,
            EscrowStatus::Failed,
        ];
        for from in terminals {
            assert!(from.is_terminal());
            for to in all {
                assert!(!from.can_transition(to), "{:?} -> {:?} must be rejected", from, to);
            }
        }
    }
}
