// routes.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::{handler, middleware::auth, AppState};

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Server is running"
    }))
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let protected_escrow_routes = Router::new()
        .route("/milestones/:milestone_id/pay", post(handler::escrow::pay_milestone))
        .route("/:transaction_id", get(handler::escrow::get_escrow_transaction))
        .route("/:transaction_id/release", post(handler::escrow::release_escrow))
        .layer(middleware::from_fn(auth));

    // The gateway calls back without a session; matched by transaction id
    // plus the opaque authority instead.
    let escrow_routes = Router::new()
        .merge(protected_escrow_routes)
        .route("/callback", get(handler::escrow::gateway_callback));

    let arbitration_routes = Router::new()
        .route("/", post(handler::arbitration::open_case))
        .route("/:case_id", get(handler::arbitration::get_case))
        .route("/:case_id/assign", post(handler::arbitration::assign_arbitrator))
        .route("/:case_id/decision", post(handler::arbitration::submit_decision))
        .layer(middleware::from_fn(auth));

    let protected_wallet_routes = Router::new()
        .route("/", get(handler::wallet::get_wallet))
        .route("/deposit", post(handler::wallet::initiate_deposit))
        .route("/withdraw", post(handler::wallet::withdraw_funds))
        .route("/transactions", get(handler::wallet::get_transaction_history))
        .layer(middleware::from_fn(auth));

    let wallet_routes = Router::new()
        .merge(protected_wallet_routes)
        .route("/deposit/callback", get(handler::wallet::deposit_callback));

    let api_route = Router::new()
        .nest("/escrow", escrow_routes)
        .nest("/arbitration", arbitration_routes)
        .nest("/wallet", wallet_routes)
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_route)
}
