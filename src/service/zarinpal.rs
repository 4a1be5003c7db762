// service/zarinpal.rs
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{config::Config, service::error::ServiceError};

const GATEWAY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub authority: String,
    pub payment_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentVerification {
    pub ref_id: String,
    pub card_pan: Option<String>,
}

/// ZarinPal REST client. Amounts are integer Rials; the gateway is the
/// source of truth for whether money actually moved.
pub struct ZarinpalService {
    client: reqwest::Client,
    merchant_id: String,
    api_base: &'static str,
    pay_base: &'static str,
}

impl ZarinpalService {
    pub fn new(config: &Config) -> Self {
        let (api_base, pay_base) = if config.zarinpal_sandbox {
            (
                "https://sandbox.zarinpal.com/pg/v4/payment",
                "https://sandbox.zarinpal.com/pg/StartPay",
            )
        } else {
            (
                "https://api.zarinpal.com/pg/v4/payment",
                "https://www.zarinpal.com/pg/StartPay",
            )
        };

        Self {
            client: reqwest::Client::builder()
                .timeout(GATEWAY_TIMEOUT)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            merchant_id: config.zarinpal_merchant_id.clone(),
            api_base,
            pay_base,
        }
    }

    /// Request a payment session and a redirect URL for the payer.
    pub async fn request_payment(
        &self,
        amount: i64,
        description: &str,
        callback_url: &str,
    ) -> Result<PaymentRequest, ServiceError> {
        let payload = serde_json::json!({
            "merchant_id": self.merchant_id,
            "amount": amount,
            "description": description,
            "callback_url": callback_url,
        });

        let response = self
            .client
            .post(format!("{}/request.json", self.api_base))
            .json(&payload)
            .send()
            .await
            .map_err(|e| ServiceError::Gateway(format!("payment request failed: {}", e)))?;

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ServiceError::Gateway(format!("invalid gateway response: {}", e)))?;

        let data = &body["data"];
        let code = data["code"].as_i64().unwrap_or_else(|| {
            body["errors"]["code"].as_i64().unwrap_or(0)
        });

        if code == 100 {
            let authority = data["authority"].as_str().unwrap_or("").to_string();
            if authority.is_empty() {
                return Err(ServiceError::Gateway(
                    "gateway accepted the request but returned no authority".to_string(),
                ));
            }
            let payment_url = format!("{}/{}", self.pay_base, authority);
            Ok(PaymentRequest {
                authority,
                payment_url,
            })
        } else {
            Err(ServiceError::Gateway(status_message(code).to_string()))
        }
    }

    /// Verify a callback against the amount we stored at request time.
    /// Code 100 is a fresh verification; 101 means this authority was
    /// already verified, which the callers treat as failure because the
    /// transaction row must still be `pending` for a hold to proceed.
    pub async fn verify_payment(
        &self,
        authority: &str,
        amount: i64,
    ) -> Result<PaymentVerification, ServiceError> {
        let payload = serde_json::json!({
            "merchant_id": self.merchant_id,
            "amount": amount,
            "authority": authority,
        });

        let response = self
            .client
            .post(format!("{}/verify.json", self.api_base))
            .json(&payload)
            .send()
            .await
            .map_err(|e| ServiceError::Gateway(format!("payment verification failed: {}", e)))?;

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ServiceError::Gateway(format!("invalid gateway response: {}", e)))?;

        let data = &body["data"];
        let code = data["code"].as_i64().unwrap_or_else(|| {
            body["errors"]["code"].as_i64().unwrap_or(0)
        });

        if code == 100 {
            Ok(PaymentVerification {
                ref_id: data["ref_id"]
                    .as_i64()
                    .map(|r| r.to_string())
                    .or_else(|| data["ref_id"].as_str().map(String::from))
                    .unwrap_or_default(),
                card_pan: data["card_pan"].as_str().map(String::from),
            })
        } else {
            Err(ServiceError::Gateway(status_message(code).to_string()))
        }
    }
}

/// Map a ZarinPal status code to a loggable reason. End users see a
/// localized failure message at the handler layer; these strings are for
/// diagnostics.
pub fn status_message(code: i64) -> &'static str {
    match code {
        100 => "payment verified",
        101 => "payment already verified",
        -9 => "validation error in the request payload",
        -10 => "invalid merchant id or ip address",
        -11 => "merchant account is inactive",
        -12 => "too many attempts",
        -33 => "amount does not match the payment session",
        -50 => "amount outside the allowed range",
        -51 => "payment session failed or was cancelled by the payer",
        -53 => "authority does not belong to this merchant",
        -54 => "invalid or expired authority",
        _ => "unknown gateway status",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_codes() {
        assert_eq!(status_message(100), "payment verified");
        assert_eq!(status_message(101), "payment already verified");
    }

    #[test]
    fn test_failure_codes_are_distinct() {
        assert_eq!(status_message(-33), "amount does not match the payment session");
        assert_eq!(status_message(-54), "invalid or expired authority");
        assert_ne!(status_message(-51), status_message(-53));
    }

    #[test]
    fn test_unknown_code_falls_through() {
        assert_eq!(status_message(42), "unknown gateway status");
        assert_eq!(status_message(-999), "unknown gateway status");
    }
}
