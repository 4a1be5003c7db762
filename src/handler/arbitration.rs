// handler/arbitration.rs
use std::sync::Arc;

use axum::{extract::Path, response::IntoResponse, Extension, Json};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::arbitrationdb::ArbitrationExt,
    dtos::{arbitrationdtos::*, ApiResponse},
    error::{ErrorMessage, HttpError},
    middleware::JWTAuthMiddleware,
    models::usermodel::UserRole,
    AppState,
};

pub async fn open_case(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Json(body): Json<OpenCaseDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let case = app_state
        .arbitration_service
        .open_case(body.project_id, auth.user.id, body.reason)
        .await?;

    let response: ArbitrationDto = case.into();
    Ok(Json(ApiResponse::success("Arbitration case opened", response)))
}

pub async fn assign_arbitrator(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Path(case_id): Path<Uuid>,
    Json(body): Json<AssignArbitratorDto>,
) -> Result<impl IntoResponse, HttpError> {
    let case = app_state
        .arbitration_service
        .assign_arbitrator(case_id, &auth.user, body.arbitrator_id)
        .await?;

    let response: ArbitrationDto = case.into();
    Ok(Json(ApiResponse::success("Arbitrator assigned to case", response)))
}

/// The assigned arbitrator submits the ruling; the settlement engine turns
/// it into wallet movements.
pub async fn submit_decision(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Path(case_id): Path<Uuid>,
    Json(body): Json<DecisionDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let resolved = app_state
        .arbitration_service
        .process_decision(
            case_id,
            auth.user.id,
            body.decision,
            body.contractor_percentage,
            body.resolution,
        )
        .await?;

    let response: ArbitrationDto = resolved.into();
    Ok(Json(ApiResponse::success("Arbitration case resolved", response)))
}

pub async fn get_case(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Path(case_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let case = app_state
        .db_client
        .get_arbitration(case_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Arbitration case not found"))?;

    let is_involved = case.initiator_id == auth.user.id
        || case.arbitrator_id == Some(auth.user.id)
        || auth.user.role == UserRole::Admin;
    if !is_involved {
        return Err(HttpError::forbidden(ErrorMessage::PermissionDenied.to_string()));
    }

    let response: ArbitrationDto = case.into();
    Ok(Json(ApiResponse::success("Arbitration case retrieved", response)))
}
