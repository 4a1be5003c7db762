// utils/token.rs
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{ErrorMessage, HttpError};

/// Tokens are issued by the identity service; this crate only verifies
/// them to resolve the caller.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

pub fn decode_token<T: Into<String>>(token: T, secret: &[u8]) -> Result<String, HttpError> {
    let decoded = decode::<TokenClaims>(
        &token.into(),
        &DecodingKey::from_secret(secret),
        &Validation::new(Algorithm::HS256),
    );

    match decoded {
        Ok(token) => Ok(token.claims.sub),
        Err(_) => Err(HttpError::unauthorized(ErrorMessage::InvalidToken.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn issue_token(user_id: &str, secret: &[u8]) -> String {
        let now = chrono::Utc::now().timestamp() as usize;
        let claims = TokenClaims {
            sub: user_id.to_string(),
            iat: now,
            exp: now + 60,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret)).unwrap()
    }

    #[test]
    fn test_valid_token_yields_subject() {
        let user_id = uuid::Uuid::new_v4().to_string();
        let token = issue_token(&user_id, b"secret");
        assert_eq!(decode_token(token, b"secret").unwrap(), user_id);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue_token("abc", b"secret");
        assert!(decode_token(token, b"other-secret").is_err());
    }
}
