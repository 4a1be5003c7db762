// config.rs
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub app_url: String,
    pub jwt_secret: String,
    pub jwt_maxage: i64,
    pub port: u16,
    // ZarinPal payment gateway
    pub zarinpal_merchant_id: String,
    pub zarinpal_sandbox: bool,
    pub payment_callback_url: String,
    pub deposit_callback_url: String,
}

impl Config {
    pub fn init() -> Config {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let jwt_secret = std::env::var("JWT_SECRET_KEY").expect("JWT_SECRET_KEY must be set");
        let jwt_maxage = std::env::var("JWT_MAXAGE").expect("JWT_MAXAGE must be set");
        let app_url = std::env::var("APP_URL").expect("APP_URL must be set");

        let zarinpal_merchant_id = std::env::var("ZARINPAL_MERCHANT_ID")
            .unwrap_or_else(|_| "00000000-0000-0000-0000-000000000000".to_string());
        let zarinpal_sandbox = std::env::var("ZARINPAL_SANDBOX")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(true);

        let payment_callback_url = std::env::var("PAYMENT_CALLBACK_URL")
            .unwrap_or_else(|_| format!("{}/api/escrow/callback", app_url));
        let deposit_callback_url = std::env::var("DEPOSIT_CALLBACK_URL")
            .unwrap_or_else(|_| format!("{}/api/wallet/deposit/callback", app_url));

        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8000);

        Config {
            database_url,
            app_url,
            jwt_secret,
            jwt_maxage: jwt_maxage.parse::<i64>().unwrap(),
            port,
            zarinpal_merchant_id,
            zarinpal_sandbox,
            payment_callback_url,
            deposit_callback_url,
        }
    }
}
