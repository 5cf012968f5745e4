//! Authentication: access-token issuance/verification and password handling.
//!
//! Tokens are HS256 JWTs carrying the subject id, login name, a unique token
//! id, and one role entry per held role. The signing secret lives in a
//! `SecretString` and is only exposed at the signing boundary.

mod extractor;
pub mod password;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::ExposeSecret;
use uuid::Uuid;

pub use extractor::AuthUser;

use crate::config::{JwtSettings, TOKEN_TTL_HOURS};
use crate::error::{AppError, AppResult};
use crate::models::AccessClaims;

/// Create a signed access token for a user.
///
/// Returns the encoded token and its expiry (a fixed 3 hours from issuance).
pub fn create_access_token(
    jwt: &JwtSettings,
    user_id: Uuid,
    email: &str,
    roles: &[String],
) -> AppResult<(String, DateTime<Utc>)> {
    let now = Utc::now();
    let exp = now + Duration::hours(TOKEN_TTL_HOURS);

    let claims = AccessClaims {
        sub: user_id.to_string(),
        iss: jwt.issuer.clone(),
        jti: Uuid::new_v4().to_string(),
        exp: exp.timestamp() as usize,
        iat: now.timestamp() as usize,
        name: email.to_string(),
        roles: roles.to_vec(),
    };

    let key = EncodingKey::from_secret(jwt.secret.expose_secret().as_bytes());
    let token = encode(&Header::default(), &claims, &key)
        .map_err(|e| AppError::Validation(format!("Failed to create access token: {}", e)))?;

    Ok((token, exp))
}

/// Verify an access token and return its claims.
pub fn verify_access_token(jwt: &JwtSettings, token: &str) -> Result<AccessClaims, String> {
    let key = DecodingKey::from_secret(jwt.secret.expose_secret().as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&jwt.issuer]);
    validation.validate_aud = false;

    let token_data = decode::<AccessClaims>(token, &key, &validation)
        .map_err(|e| format!("Invalid access token: {}", e))?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn test_jwt() -> JwtSettings {
        JwtSettings {
            secret: SecretString::from("test-secret".to_string()),
            issuer: "docman".to_string(),
        }
    }

    #[test]
    fn test_token_round_trip() {
        let jwt = test_jwt();
        let user_id = Uuid::new_v4();
        let roles = vec!["User".to_string(), "Manager".to_string()];

        let (token, _) = create_access_token(&jwt, user_id, "ada@example.com", &roles).unwrap();
        let claims = verify_access_token(&jwt, &token).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.name, "ada@example.com");
        assert_eq!(claims.iss, "docman");
        assert_eq!(claims.roles, roles);
    }

    #[test]
    fn test_token_expires_three_hours_after_issuance() {
        let jwt = test_jwt();
        let (token, expiration) =
            create_access_token(&jwt, Uuid::new_v4(), "ada@example.com", &[]).unwrap();
        let claims = verify_access_token(&jwt, &token).unwrap();

        assert_eq!(claims.exp - claims.iat, 3 * 3600);
        let delta = (expiration - Utc::now()).num_seconds();
        assert!((3 * 3600 - 5..=3 * 3600).contains(&delta));
    }

    #[test]
    fn test_token_rejected_with_wrong_secret() {
        let jwt = test_jwt();
        let (token, _) = create_access_token(&jwt, Uuid::new_v4(), "ada@example.com", &[]).unwrap();

        let other = JwtSettings {
            secret: SecretString::from("other-secret".to_string()),
            issuer: "docman".to_string(),
        };
        assert!(verify_access_token(&other, &token).is_err());
    }

    #[test]
    fn test_token_rejected_with_wrong_issuer() {
        let jwt = test_jwt();
        let (token, _) = create_access_token(&jwt, Uuid::new_v4(), "ada@example.com", &[]).unwrap();

        let other = JwtSettings {
            secret: SecretString::from("test-secret".to_string()),
            issuer: "someone-else".to_string(),
        };
        assert!(verify_access_token(&other, &token).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(verify_access_token(&test_jwt(), "not-a-token").is_err());
    }
}
