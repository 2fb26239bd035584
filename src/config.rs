//! Service configuration loaded from environment variables.
//!
//! Required: `DATABASE_URL`, `STRIPE_SECRET_KEY`, `STRIPE_WEBHOOK_SECRET`, `JWT_SECRET`.
//!
//! Optional: `HOST` (0.0.0.0), `PORT` (3001), `FRONTEND_URL` (http://localhost:3000),
//! `ADMIN_API_KEY`, `ADMIN_USERNAME` (admin), `ADMIN_PASSWORD`, `SHUTDOWN_GRACE_SECS` (10),
//! `CLOUDINARY_CLOUD_NAME` + `CLOUDINARY_API_KEY` + `CLOUDINARY_API_SECRET`,
//! `PRINTFUL_API_KEY`, `PRINTFUL_STORE_ID`.

use thiserror::Error;

use crate::infrastructure::cloudinary::CloudinaryConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
    pub stripe_secret_key: String,
    pub stripe_webhook_secret: String,
    pub jwt_secret: String,
    pub admin_api_key: Option<String>,
    pub admin_username: String,
    pub admin_password: Option<String>,
    pub shutdown_grace_secs: u64,
    pub cloudinary: Option<CloudinaryConfig>,
    pub printful_api_key: Option<String>,
    pub printful_store_id: Option<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("frontend_url", &self.frontend_url)
            .field("admin_username", &self.admin_username)
            .field("shutdown_grace_secs", &self.shutdown_grace_secs)
            .field("cloudinary", &self.cloudinary.as_ref().map(|c| &c.cloud_name))
            .field("printful", &self.printful_api_key.is_some())
            .finish_non_exhaustive()
    }
}

struct Env<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Env<F> {
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn parsed<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(key) {
            Some(raw) => raw
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
            None => Ok(default),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup };

        let frontend_url = env.or_default("FRONTEND_URL", "http://localhost:3000");
        if !(frontend_url.starts_with("http://") || frontend_url.starts_with("https://")) {
            return Err(ConfigError::InvalidEnvVar(
                "FRONTEND_URL".to_string(),
                "must be an http(s) URL".to_string(),
            ));
        }

        let cloudinary = match (
            env.optional("CLOUDINARY_CLOUD_NAME"),
            env.optional("CLOUDINARY_API_KEY"),
            env.optional("CLOUDINARY_API_SECRET"),
        ) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => Some(CloudinaryConfig {
                cloud_name,
                api_key,
                api_secret,
            }),
            (None, None, None) => None,
            _ => {
                return Err(ConfigError::InvalidEnvVar(
                    "CLOUDINARY_*".to_string(),
                    "cloud name, API key and API secret must be set together".to_string(),
                ))
            }
        };

        Ok(Self {
            database_url: env.required("DATABASE_URL")?,
            host: env.or_default("HOST", "0.0.0.0"),
            port: env.parsed("PORT", 3001)?,
            frontend_url,
            stripe_secret_key: env.required("STRIPE_SECRET_KEY")?,
            stripe_webhook_secret: env.required("STRIPE_WEBHOOK_SECRET")?,
            jwt_secret: env.required("JWT_SECRET")?,
            admin_api_key: env.optional("ADMIN_API_KEY"),
            admin_username: env.or_default("ADMIN_USERNAME", "admin"),
            admin_password: env.optional("ADMIN_PASSWORD"),
            shutdown_grace_secs: env.parsed("SHUTDOWN_GRACE_SECS", 10)?,
            cloudinary,
            printful_api_key: env.optional("PRINTFUL_API_KEY"),
            printful_store_id: env.optional("PRINTFUL_STORE_ID"),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    const REQUIRED: [(&str, &str); 4] = [
        ("DATABASE_URL", "postgres://localhost/store"),
        ("STRIPE_SECRET_KEY", "sk_test_1"),
        ("STRIPE_WEBHOOK_SECRET", "whsec_1"),
        ("JWT_SECRET", "jwt"),
    ];

    #[test]
    fn defaults_apply() {
        let config = load(&REQUIRED).expect("config should load");
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3001);
        assert_eq!(config.frontend_url, "http://localhost:3000");
        assert_eq!(config.admin_username, "admin");
        assert_eq!(config.shutdown_grace_secs, 10);
        assert!(config.cloudinary.is_none());
        assert!(config.printful_api_key.is_none());
    }

    #[test]
    fn missing_required_variable_is_reported() {
        let err = load(&REQUIRED[..3]).unwrap_err();
        assert_eq!(err, ConfigError::MissingEnvVar("JWT_SECRET".to_string()));
    }

    #[test]
    fn blank_required_variable_counts_as_missing() {
        let mut vars = REQUIRED.to_vec();
        vars[0] = ("DATABASE_URL", "   ");
        assert_eq!(
            load(&vars).unwrap_err(),
            ConfigError::MissingEnvVar("DATABASE_URL".to_string())
        );
    }

    #[test]
    fn malformed_port_is_rejected() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("PORT", "eighty"));
        assert!(matches!(load(&vars), Err(ConfigError::InvalidEnvVar(k, _)) if k == "PORT"));
    }

    #[test]
    fn frontend_url_must_be_http() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("FRONTEND_URL", "localhost:3000"));
        assert!(matches!(load(&vars), Err(ConfigError::InvalidEnvVar(k, _)) if k == "FRONTEND_URL"));
    }

    #[test]
    fn partial_cloudinary_config_is_rejected() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("CLOUDINARY_CLOUD_NAME", "demo"));
        assert!(load(&vars).is_err());

        vars.push(("CLOUDINARY_API_KEY", "k"));
        vars.push(("CLOUDINARY_API_SECRET", "s"));
        let config = load(&vars).expect("config should load");
        assert_eq!(config.cloudinary.unwrap().cloud_name, "demo");
    }
}
