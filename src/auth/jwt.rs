use crate::config::AuthConfig;
use crate::error::{Error, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

fn encode_claims(claims: &Claims, secret: &str) -> Result<String> {
    let token = encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

/// Issue an HS256 access token for a user
pub fn create_access_token(user_id: Uuid, config: &AuthConfig) -> Result<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::minutes(config.access_token_expire_minutes)).timestamp(),
    };

    encode_claims(&claims, &config.secret_key)
}

/// Verify a token and return the user ID it was issued for
pub fn decode_access_token(token: &str, config: &AuthConfig) -> Result<Uuid> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret_key.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|_| Error::Unauthorized("Could not validate credentials".to_string()))?;

    Uuid::parse_str(&data.claims.sub)
        .map_err(|_| Error::Unauthorized("Could not validate credentials".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str) -> AuthConfig {
        AuthConfig {
            secret_key: secret.to_string(),
            access_token_expire_minutes: 60,
            bcrypt_cost: 4,
        }
    }

    #[test]
    fn test_token_roundtrip() {
        let user_id = Uuid::new_v4();
        let token = create_access_token(user_id, &config("s3cret")).unwrap();
        assert_eq!(decode_access_token(&token, &config("s3cret")).unwrap(), user_id);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_access_token(Uuid::new_v4(), &config("s3cret")).unwrap();
        assert!(matches!(
            decode_access_token(&token, &config("other")),
            Err(Error::Unauthorized(_))
        ));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let token = create_access_token(Uuid::new_v4(), &config("s3cret")).unwrap();
        let mut tampered = token.clone();
        tampered.pop();
        tampered.push(if token.ends_with('A') { 'B' } else { 'A' });
        assert!(decode_access_token(&tampered, &config("s3cret")).is_err());
        assert!(decode_access_token("garbage", &config("s3cret")).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let now = Utc::now();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            iat: (now - Duration::hours(3)).timestamp(),
            exp: (now - Duration::hours(2)).timestamp(),
        };
        let token = encode_claims(&claims, "s3cret").unwrap();
        assert!(decode_access_token(&token, &config("s3cret")).is_err());
    }

    #[test]
    fn test_non_uuid_subject_rejected() {
        let claims = Claims {
            sub: "admin".to_string(),
            iat: Utc::now().timestamp(),
            exp: (Utc::now() + Duration::minutes(5)).timestamp(),
        };
        let token = encode_claims(&claims, "s3cret").unwrap();
        assert!(decode_access_token(&token, &config("s3cret")).is_err());
    }
}
