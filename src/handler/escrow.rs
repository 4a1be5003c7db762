// handler/escrow.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::escrowdb::EscrowExt,
    dtos::{escrowdtos::*, ApiResponse},
    error::{ErrorMessage, HttpError},
    middleware::JWTAuthMiddleware,
    models::usermodel::UserRole,
    AppState,
};

/// Employer funds a milestone: creates the pending escrow row and returns
/// the gateway redirect URL.
pub async fn pay_milestone(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Path(milestone_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let milestone = app_state
        .db_client
        .get_milestone(milestone_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Milestone not found"))?;

    let transaction = app_state
        .escrow_service
        .create_pending_transaction(
            milestone.project_id,
            milestone.id,
            auth.user.id,
            milestone.amount,
        )
        .await?;

    let description = format!("Milestone payment: {}", milestone.title);
    let request = app_state
        .escrow_service
        .request_gateway_payment(
            &transaction,
            &description,
            &app_state.env.payment_callback_url,
        )
        .await?;

    let response = PaymentRedirectDto {
        transaction_id: transaction.id,
        authority: request.authority,
        payment_url: request.payment_url,
        amount: transaction.amount,
    };

    Ok(Json(ApiResponse::success("Payment initiated, redirect the payer", response)))
}

/// Public ZarinPal callback. A non-OK status means the payer cancelled on
/// the gateway page.
pub async fn gateway_callback(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<GatewayCallbackQuery>,
) -> Result<impl IntoResponse, HttpError> {
    if query.status != "OK" {
        app_state
            .escrow_service
            .cancel_pending(query.transaction_id, &query.authority)
            .await?;
        return Err(HttpError::bad_request("Payment was cancelled by the payer"));
    }

    let held = app_state
        .escrow_service
        .verify_and_hold(query.transaction_id, &query.authority)
        .await?;

    let response: EscrowTransactionDto = held.into();
    Ok(Json(ApiResponse::success("Payment verified, funds held in escrow", response)))
}

/// Direct release by the employer (or an admin) outside arbitration.
/// Always pays out the full held amount; `body.amount` only lets the
/// caller confirm what they expect to release.
pub async fn release_escrow(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Path(transaction_id): Path<Uuid>,
    Json(body): Json<ReleaseRequestDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let escrow = app_state
        .db_client
        .get_escrow_transaction(transaction_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Escrow transaction not found"))?;

    let is_allowed = escrow.employer_id == auth.user.id || auth.user.role == UserRole::Admin;
    if !is_allowed {
        return Err(HttpError::forbidden(ErrorMessage::PermissionDenied.to_string()));
    }

    let released = app_state
        .escrow_service
        .release(transaction_id, body.amount)
        .await?;

    let response: EscrowTransactionDto = released.into();
    Ok(Json(ApiResponse::success("Escrow released to contractor", response)))
}

pub async fn get_escrow_transaction(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Path(transaction_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let escrow = app_state
        .db_client
        .get_escrow_transaction(transaction_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Escrow transaction not found"))?;

    let is_party = escrow.employer_id == auth.user.id
        || escrow.contractor_id == auth.user.id
        || auth.user.role == UserRole::Admin;
    if !is_party {
        return Err(HttpError::forbidden(ErrorMessage::PermissionDenied.to_string()));
    }

    let response: EscrowTransactionDto = escrow.into();
    Ok(Json(ApiResponse::success("Escrow transaction retrieved", response)))
}
