use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres connection string. Without one the in-memory store is used.
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub reset_on_start: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Identity provider tenant domain, e.g. `example.eu.auth0.com`
    pub domain: Option<String>,
    pub audience: String,
    pub issuer: Option<String>,
    pub jwks_url: Option<String>,
    /// Inline JWKS document; takes precedence over `jwks_url`
    pub static_jwks: Option<String>,
    pub algorithms: Vec<Algorithm>,
    pub leeway_secs: u64,
    pub jwks_refresh_secs: u64,
    pub jwks_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Answer every failed PATCH with the legacy 422 body
    pub legacy_unprocessable: bool,
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("AUTH_ALGORITHMS must name at least one supported algorithm")]
    NoAlgorithms,

    #[error("API_AUDIENCE must not be empty")]
    MissingAudience,

    #[error("set AUTH_ISSUER or AUTH0_DOMAIN")]
    MissingIssuer,

    #[error("set AUTH_JWKS, AUTH_JWKS_URL or AUTH0_DOMAIN")]
    MissingKeySource,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
        .with_derived_auth_urls()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v).filter(|s| !s.trim().is_empty());
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_RESET_ON_START") {
            self.database.reset_on_start = v.parse().unwrap_or(self.database.reset_on_start);
        }

        // Auth overrides
        if let Ok(v) = env::var("AUTH0_DOMAIN") {
            self.auth.domain = Some(v).filter(|s| !s.trim().is_empty());
        }
        if let Ok(v) = env::var("API_AUDIENCE") {
            self.auth.audience = v;
        }
        if let Ok(v) = env::var("AUTH_ISSUER") {
            self.auth.issuer = Some(v);
        }
        if let Ok(v) = env::var("AUTH_JWKS_URL") {
            self.auth.jwks_url = Some(v);
        }
        if let Ok(v) = env::var("AUTH_JWKS") {
            self.auth.static_jwks = Some(v).filter(|s| !s.trim().is_empty());
        }
        if let Ok(v) = env::var("AUTH_ALGORITHMS") {
            self.auth.algorithms = parse_algorithms(&v);
        }
        if let Ok(v) = env::var("AUTH_LEEWAY_SECS") {
            self.auth.leeway_secs = v.parse().unwrap_or(self.auth.leeway_secs);
        }
        if let Ok(v) = env::var("AUTH_JWKS_REFRESH_SECS") {
            self.auth.jwks_refresh_secs = v.parse().unwrap_or(self.auth.jwks_refresh_secs);
        }
        if let Ok(v) = env::var("AUTH_JWKS_TIMEOUT_SECS") {
            self.auth.jwks_timeout_secs = v.parse().unwrap_or(self.auth.jwks_timeout_secs);
        }

        // API overrides
        if let Ok(v) = env::var("API_LEGACY_UNPROCESSABLE") {
            self.api.legacy_unprocessable = v.parse().unwrap_or(self.api.legacy_unprocessable);
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        self
    }

    /// Fill issuer and JWKS location from the domain when they were not given
    fn with_derived_auth_urls(mut self) -> Self {
        if let Some(domain) = self.auth.domain.clone() {
            let base = if domain.starts_with("http://") || domain.starts_with("https://") {
                domain.trim_end_matches('/').to_string()
            } else {
                format!("https://{}", domain.trim_end_matches('/'))
            };
            if self.auth.issuer.is_none() {
                self.auth.issuer = Some(format!("{}/", base));
            }
            if self.auth.jwks_url.is_none() {
                self.auth.jwks_url = Some(format!("{}/.well-known/jwks.json", base));
            }
        }
        self
    }

    /// Reject configurations the verifier cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.algorithms.is_empty() {
            return Err(ConfigError::NoAlgorithms);
        }
        if self.auth.audience.trim().is_empty() {
            return Err(ConfigError::MissingAudience);
        }
        if self.auth.issuer.as_deref().map_or(true, |s| s.trim().is_empty()) {
            return Err(ConfigError::MissingIssuer);
        }
        if self.auth.static_jwks.is_none() && self.auth.jwks_url.is_none() {
            return Err(ConfigError::MissingKeySource);
        }
        Ok(())
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
                reset_on_start: false,
            },
            auth: AuthConfig {
                domain: None,
                audience: "drinks".to_string(),
                issuer: None,
                jwks_url: None,
                static_jwks: None,
                algorithms: vec![Algorithm::RS256],
                leeway_secs: 60,
                jwks_refresh_secs: 10,
                jwks_timeout_secs: 10,
            },
            api: ApiConfig {
                legacy_unprocessable: false,
                enable_request_logging: true,
                max_request_size_bytes: 1024 * 1024, // 1MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:8100".to_string(), "http://localhost:4200".to_string()],
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
                reset_on_start: false,
            },
            auth: AuthConfig {
                domain: None,
                audience: "drinks".to_string(),
                issuer: None,
                jwks_url: None,
                static_jwks: None,
                algorithms: vec![Algorithm::RS256],
                leeway_secs: 30,
                jwks_refresh_secs: 30,
                jwks_timeout_secs: 5,
            },
            api: ApiConfig {
                legacy_unprocessable: false,
                enable_request_logging: true,
                max_request_size_bytes: 256 * 1024,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
                reset_on_start: false,
            },
            auth: AuthConfig {
                domain: None,
                audience: "drinks".to_string(),
                issuer: None,
                jwks_url: None,
                static_jwks: None,
                algorithms: vec![Algorithm::RS256],
                leeway_secs: 30,
                jwks_refresh_secs: 60,
                jwks_timeout_secs: 5,
            },
            api: ApiConfig {
                legacy_unprocessable: false,
                enable_request_logging: false,
                max_request_size_bytes: 256 * 1024,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
        }
    }

    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        let mut config = Self::development();
        config.auth.issuer = Some(crate::testing::ISSUER.to_string());
        config.auth.audience = crate::testing::AUDIENCE.to_string();
        config.auth.algorithms = vec![Algorithm::HS256, Algorithm::RS256];
        config.auth.leeway_secs = 0;
        config
    }
}

/// Parse a comma separated allow-list. Unknown names, including `none`, are
/// dropped.
pub fn parse_algorithms(list: &str) -> Vec<Algorithm> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<Algorithm>().ok())
        .collect()
}
