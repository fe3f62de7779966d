//! Core JWT handler implementation

use super::types::{Claims, JwtHandler, TokenResponse};
use crate::config::AuthConfig;
use crate::core::models::Identity;
use crate::core::traits::IdentityExtractor;
use crate::utils::error::{Result, WardenError};
use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

impl JwtHandler {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.as_bytes();

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            expiration: config.jwt_expiration,
            issuer: config.jwt_issuer.clone(),
        }
    }

    /// Sign a token for the user
    pub fn issue_token(&self, user_id: i64, user_name: &str) -> Result<TokenResponse> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| WardenError::internal(format!("System time error: {}", e)))?
            .as_secs();

        let claims = Claims {
            sub: user_id,
            name: user_name.to_string(),
            iat: now,
            exp: now + self.expiration,
            iss: self.issuer.clone(),
        };

        let header = Header::new(self.algorithm);
        let token = encode(&header, &claims, &self.encoding_key)?;

        debug!("Issued token for user: {}", user_name);
        Ok(TokenResponse {
            access_token: token,
            token_type: "Bearer".to_string(),
            expires_in: self.expiration,
        })
    }

    /// Verify and decode a token
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(self.algorithm);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "iss"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            warn!("JWT verification failed: {}", e);
            WardenError::Jwt(e)
        })?;

        Ok(token_data.claims)
    }
}

#[async_trait]
impl IdentityExtractor for JwtHandler {
    async fn extract(&self, authorization: Option<&str>) -> Result<Identity> {
        let header =
            authorization.ok_or_else(|| WardenError::unauthorized("missing Authorization header"))?;
        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| WardenError::unauthorized("expected a Bearer token"))?;

        let claims = self
            .verify_token(token)
            .map_err(|_| WardenError::unauthorized("invalid token"))?;
        Ok(Identity::new(claims.sub, claims.name))
    }
}
