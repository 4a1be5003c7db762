// handler/wallet.rs
use std::sync::Arc;

use axum::{
    extract::Query,
    response::IntoResponse,
    Extension, Json,
};
use validator::Validate;

use crate::{
    db::walletdb::WalletExt,
    dtos::{walletdtos::*, ApiResponse},
    error::HttpError,
    middleware::JWTAuthMiddleware,
    AppState,
};

pub async fn get_wallet(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
) -> Result<impl IntoResponse, HttpError> {
    let wallet = app_state
        .db_client
        .get_wallet(auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Wallet not found"))?;

    let response: WalletResponseDto = wallet.into();
    Ok(Json(ApiResponse::success("Wallet retrieved", response)))
}

pub async fn initiate_deposit(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Json(body): Json<DepositRequestDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let initiation = app_state
        .wallet_service
        .initiate_deposit(auth.user.id, body.amount, &app_state.env.deposit_callback_url)
        .await?;

    let response = DepositInitiationDto {
        reference: initiation.transaction.reference,
        payment_url: initiation.payment_url,
        amount: body.amount,
    };

    Ok(Json(ApiResponse::success("Deposit initiated, redirect the payer", response)))
}

/// Public ZarinPal callback for wallet deposits.
pub async fn deposit_callback(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<DepositCallbackQuery>,
) -> Result<impl IntoResponse, HttpError> {
    if query.status != "OK" {
        // Payer cancelled; the pending row stays pending until marked failed.
        let pending = app_state
            .db_client
            .get_pending_deposit_by_authority(&query.authority)
            .await
            .map_err(|e| HttpError::server_error(e.to_string()))?
            .ok_or_else(|| HttpError::not_found("No pending deposit for this authority"))?;

        app_state
            .db_client
            .fail_pending_deposit(pending.id)
            .await
            .map_err(|e| HttpError::server_error(e.to_string()))?;

        return Err(HttpError::bad_request("Deposit was cancelled by the payer"));
    }

    let completed = app_state.wallet_service.verify_deposit(&query.authority).await?;

    let response: TransactionResponseDto = completed.into();
    Ok(Json(ApiResponse::success("Deposit verified and credited", response)))
}

pub async fn withdraw_funds(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Json(body): Json<WithdrawRequestDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let transaction = app_state
        .wallet_service
        .withdraw(auth.user.id, body.amount, body.description)
        .await?;

    let response: TransactionResponseDto = transaction.into();
    Ok(Json(ApiResponse::success("Withdrawal completed", response)))
}

pub async fn get_transaction_history(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Query(query): Query<TransactionHistoryQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * limit;

    let transactions = app_state
        .db_client
        .get_wallet_transactions(auth.user.id, limit, offset)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let response: Vec<TransactionResponseDto> =
        transactions.into_iter().map(Into::into).collect();

    Ok(Json(ApiResponse::success("Transaction history retrieved", response)))
}
