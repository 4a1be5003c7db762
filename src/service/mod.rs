pub mod arbitration_service;
pub mod error;
pub mod escrow_service;
pub mod notification_service;
pub mod wallet_service;
pub mod zarinpal;
