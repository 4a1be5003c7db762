mod config;
mod db;
mod dtos;
mod error;
mod handler;
mod middleware;
mod models;
mod routes;
mod service;
mod utils;

use std::sync::Arc;

use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use config::Config;
use dotenv::dotenv;
use routes::create_router;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::filter::LevelFilter;

use crate::db::db::DBClient;
use service::{
    arbitration_service::ArbitrationService,
    escrow_service::EscrowService,
    notification_service::NotificationService,
    wallet_service::WalletService,
    zarinpal::ZarinpalService,
};

#[derive(Clone)]
pub struct AppState {
    pub env: Config,
    pub db_client: Arc<DBClient>,
    pub escrow_service: Arc<EscrowService>,
    pub arbitration_service: Arc<ArbitrationService>,
    pub wallet_service: Arc<WalletService>,
    pub notification_service: Arc<NotificationService>,
}

impl AppState {
    pub fn new(db_client: DBClient, config: Config) -> Self {
        let db_client_arc = Arc::new(db_client);

        let gateway = Arc::new(ZarinpalService::new(&config));
        let notification_service = Arc::new(NotificationService::new(db_client_arc.clone()));

        let escrow_service = Arc::new(EscrowService::new(
            db_client_arc.clone(),
            gateway.clone(),
            notification_service.clone(),
        ));

        let arbitration_service = Arc::new(ArbitrationService::new(
            db_client_arc.clone(),
            escrow_service.clone(),
            notification_service.clone(),
        ));

        let wallet_service = Arc::new(WalletService::new(db_client_arc.clone(), gateway));

        Self {
            env: config,
            db_client: db_client_arc,
            escrow_service,
            arbitration_service,
            wallet_service,
            notification_service,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::INFO)
        .init();

    dotenv().ok();

    let config = Config::init();

    let pool = match PgPoolOptions::new()
        .max_connections(20)
        .min_connections(5)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            tracing::info!("connection to the database is successful");
            pool
        }
        Err(err) => {
            tracing::error!("failed to connect to the database: {:?}", err);
            std::process::exit(1);
        }
    };

    let db_client = DBClient::new(pool);

    let allowed_origins = vec![
        config.app_url.parse::<HeaderValue>().expect("APP_URL must be a valid origin"),
        "http://localhost:5173".parse::<HeaderValue>().unwrap(),
        "http://localhost:8000".parse::<HeaderValue>().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE])
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE]);

    let app_state = Arc::new(AppState::new(db_client, config.clone()));

    let app = create_router(app_state).layer(cors);

    tracing::info!("server is running on http://localhost:{}", config.port);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", &config.port))
        .await
        .expect("failed to bind the server port");

    axum::serve(listener, app).await.expect("server error");
}
