// models/walletmodels.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "transaction_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
    Earning,
    Payment,
    Refund,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "transaction_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
    Cancelled,
}

/// Spendable balance plus monotone lifetime accumulators, all in Rials.
/// The balance is only ever touched together with a wallet_transactions
/// row inside the same database transaction.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Wallet {
    pub id: Uuid,
    pub user_id: Uuid,
    pub balance: i64,
    pub total_earned: i64,
    pub total_spent: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Wallet {
    /// A debit may only spend what the balance covers; a failed check
    /// leaves the wallet untouched.
    pub fn can_debit(&self, amount: i64) -> bool {
        amount > 0 && self.balance >= amount
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct WalletTransaction {
    pub id: Uuid,
    pub wallet_id: Uuid,
    pub user_id: Uuid,
    pub transaction_type: TransactionType,
    pub amount: i64, // in Rials
    pub status: TransactionStatus,
    pub reference: String,
    pub external_reference: Option<String>, // gateway ref id
    pub description: String,
    pub created_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

pub fn generate_transaction_reference() -> String {
    format!(
        "ZMN_{}",
        uuid::Uuid::new_v4().to_string().replace("-", "").to_uppercase()[..16].to_string()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_format() {
        let reference = generate_transaction_reference();
        assert!(reference.starts_with("ZMN_"));
        assert_eq!(reference.len(), 20);
        assert!(reference[4..].chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    fn wallet_with_balance(balance: i64) -> Wallet {
        Wallet {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            balance,
            total_earned: 0,
            total_spent: 0,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_can_debit_up_to_the_balance() {
        let wallet = wallet_with_balance(100_000);
        assert!(wallet.can_debit(1));
        assert!(wallet.can_debit(100_000));
        assert!(!wallet.can_debit(100_001));
    }

    #[test]
    fn test_cannot_debit_empty_wallet_or_non_positive_amount() {
        let empty = wallet_with_balance(0);
        assert!(!empty.can_debit(1));

        let wallet = wallet_with_balance(100_000);
        assert!(!wallet.can_debit(0));
        assert!(!wallet.can_debit(-50));
    }

    #[test]
    fn test_references_are_unique() {
        let a = generate_transaction_reference();
        let b = generate_transaction_reference();
        assert_ne!(a, b);
    }
}
