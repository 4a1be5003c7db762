// dtos/walletdtos.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::walletmodels::*;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct DepositRequestDto {
    #[validate(range(min = 10000, message = "Minimum deposit is 10,000 Rials"))]
    pub amount: i64,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct WithdrawRequestDto {
    #[validate(range(min = 10000, message = "Minimum withdrawal is 10,000 Rials"))]
    pub amount: i64,

    #[validate(length(min = 1, max = 200, message = "Description is required"))]
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WalletResponseDto {
    pub id: Uuid,
    pub balance: i64,
    pub total_earned: i64,
    pub total_spent: i64,
}

impl From<Wallet> for WalletResponseDto {
    fn from(wallet: Wallet) -> Self {
        WalletResponseDto {
            id: wallet.id,
            balance: wallet.balance,
            total_earned: wallet.total_earned,
            total_spent: wallet.total_spent,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionResponseDto {
    pub id: Uuid,
    pub transaction_type: TransactionType,
    pub amount: i64,
    pub status: TransactionStatus,
    pub reference: String,
    pub external_reference: Option<String>,
    pub description: String,
    pub created_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<WalletTransaction> for TransactionResponseDto {
    fn from(tx: WalletTransaction) -> Self {
        TransactionResponseDto {
            id: tx.id,
            transaction_type: tx.transaction_type,
            amount: tx.amount,
            status: tx.status,
            reference: tx.reference,
            external_reference: tx.external_reference,
            description: tx.description,
            created_at: tx.created_at,
            completed_at: tx.completed_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DepositInitiationDto {
    pub reference: String,
    pub payment_url: String,
    pub amount: i64,
}

#[derive(Debug, Deserialize)]
pub struct TransactionHistoryQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// ZarinPal deposit callback query parameters.
#[derive(Debug, Deserialize)]
pub struct DepositCallbackQuery {
    #[serde(rename = "Authority")]
    pub authority: String,
    #[serde(rename = "Status")]
    pub status: String,
}
