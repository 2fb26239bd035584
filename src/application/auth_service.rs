//! Admin authentication: a static API key or a short-lived JWT.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

pub const ADMIN_ROLE: &str = "admin";

const JWT_EXPIRY_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize)]
pub struct AdminClaims {
    pub role: String,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub admin_api_key: Option<String>,
    pub admin_username: String,
    pub admin_password: Option<String>,
}

pub struct AuthService {
    settings: AuthSettings,
}

impl AuthService {
    pub fn new(settings: AuthSettings) -> Self {
        Self { settings }
    }

    /// Issues an admin token for the configured credentials.
    pub fn login(&self, username: &str, password: &str) -> Result<String, DomainError> {
        let Some(expected) = self.settings.admin_password.as_deref() else {
            log::warn!("Admin login attempted but ADMIN_PASSWORD is not set");
            return Err(DomainError::Unauthorized);
        };
        if username != self.settings.admin_username || password != expected {
            log::warn!("Rejected admin login for '{username}'");
            return Err(DomainError::Unauthorized);
        }

        let now = chrono::Utc::now();
        let claims = AdminClaims {
            role: ADMIN_ROLE.to_string(),
            exp: (now + chrono::Duration::hours(JWT_EXPIRY_HOURS)).timestamp() as usize,
            iat: now.timestamp() as usize,
        };
        jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.settings.jwt_secret.as_bytes()),
        )
        .map_err(|e| DomainError::Internal(format!("Failed to sign token: {e}")))
    }

    /// Accepts either the static API key or a bearer token carrying the admin role.
    pub fn authorize(&self, api_key: Option<&str>, bearer: Option<&str>) -> Result<(), DomainError> {
        if let (Some(given), Some(expected)) = (api_key, self.settings.admin_api_key.as_deref()) {
            if !expected.is_empty() && given == expected {
                return Ok(());
            }
        }

        let Some(token) = bearer else {
            return Err(DomainError::Unauthorized);
        };
        let claims = jsonwebtoken::decode::<AdminClaims>(
            token,
            &DecodingKey::from_secret(self.settings.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| {
            log::debug!("JWT validation failed: {e}");
            DomainError::Unauthorized
        })?
        .claims;

        if claims.role != ADMIN_ROLE {
            return Err(DomainError::Unauthorized);
        }
        Ok(())
    }
}
