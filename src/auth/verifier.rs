use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::jwk::KeyAlgorithm;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use super::claims::Claims;
use super::error::AuthError;
use super::keys::{KeySource, RemoteJwks, StaticKeySet};
use crate::config::{AuthConfig, ConfigError};

/// Errors building a verifier from configuration
#[derive(Debug, Error)]
pub enum VerifierSetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("AUTH_JWKS is not a valid JWKS document: {0}")]
    InvalidJwks(#[from] serde_json::Error),

    #[error("failed to build JWKS client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Checks bearer tokens against trusted keys and the expected issuer and
/// audience.
///
/// Only algorithms in the allow-list are accepted. `none` can never be on it:
/// jsonwebtoken has no such algorithm, so a header declaring it fails to
/// decode and is reported as an invalid signature.
pub struct TokenVerifier {
    keys: Arc<dyn KeySource>,
    issuer: String,
    audience: String,
    algorithms: Vec<Algorithm>,
    leeway: u64,
}

impl TokenVerifier {
    pub fn new(
        keys: Arc<dyn KeySource>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        algorithms: Vec<Algorithm>,
        leeway: u64,
    ) -> Self {
        Self {
            keys,
            issuer: issuer.into(),
            audience: audience.into(),
            algorithms,
            leeway,
        }
    }

    /// Build the verifier and its key source. An inline JWKS wins over a
    /// remote one.
    pub fn from_config(config: &AuthConfig) -> Result<Self, VerifierSetupError> {
        let issuer = config.issuer.clone().ok_or(ConfigError::MissingIssuer)?;
        if config.algorithms.is_empty() {
            return Err(ConfigError::NoAlgorithms.into());
        }

        let keys: Arc<dyn KeySource> = match (&config.static_jwks, &config.jwks_url) {
            (Some(document), _) => {
                let keys = StaticKeySet::from_json(document)?;
                if keys.is_empty() {
                    tracing::warn!("AUTH_JWKS holds no keys; every token will be rejected");
                } else {
                    tracing::info!("Using {} signing keys from AUTH_JWKS", keys.len());
                }
                Arc::new(keys)
            }
            (None, Some(url)) => Arc::new(RemoteJwks::new(
                url.clone(),
                Duration::from_secs(config.jwks_timeout_secs),
                Duration::from_secs(config.jwks_refresh_secs),
            )?),
            (None, None) => return Err(ConfigError::MissingKeySource.into()),
        };

        Ok(Self::new(
            keys,
            issuer,
            config.audience.clone(),
            config.algorithms.clone(),
            config.leeway_secs,
        ))
    }

    /// Verify the raw `Authorization` header value
    pub async fn verify_header(&self, header: Option<&str>) -> Result<Claims, AuthError> {
        let token = bearer_token(header)?;
        self.verify_token(token).await
    }

    pub async fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token)
            .map_err(|_| AuthError::invalid_signature("Unable to parse authentication token."))?;

        let kid = header.kid.as_deref().ok_or(AuthError::UnknownSigningKey)?;
        let jwk = self.keys.find(kid).await?.ok_or(AuthError::UnknownSigningKey)?;

        if !self.algorithms.contains(&header.alg) {
            return Err(AuthError::InvalidSignature(format!(
                "Algorithm {:?} is not accepted.",
                header.alg
            )));
        }
        if let Some(key_alg) = jwk.common.key_algorithm.as_ref() {
            if signing_algorithm(key_alg) != Some(header.alg) {
                return Err(AuthError::invalid_signature(
                    "Token algorithm does not match the signing key.",
                ));
            }
        }

        let key = DecodingKey::from_jwk(&jwk)
            .map_err(|_| AuthError::invalid_signature("Signing key is not usable."))?;

        let mut validation = Validation::new(header.alg);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        validation.leeway = self.leeway;

        let data = decode::<Claims>(token, &key, &validation).map_err(classify)?;
        tracing::debug!("Verified token for subject {:?}", data.claims.sub);
        Ok(data.claims)
    }
}

/// Pull the token out of `Bearer <token>`
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MissingAuthorization)?;
    let mut parts = header.split_whitespace();

    match (parts.next(), parts.next(), parts.next()) {
        (None, _, _) => Err(AuthError::malformed("Authorization header is empty.")),
        (Some(scheme), _, _) if !scheme.eq_ignore_ascii_case("bearer") => Err(
            AuthError::malformed("Authorization header must start with \"Bearer\"."),
        ),
        (Some(_), None, _) => Err(AuthError::malformed("Token not found.")),
        (Some(_), Some(token), None) => Ok(token),
        (Some(_), Some(_), Some(_)) => Err(AuthError::malformed("Authorization header must be bearer token.")),
    }
}

fn signing_algorithm(alg: &KeyAlgorithm) -> Option<Algorithm> {
    match alg {
        KeyAlgorithm::HS256 => Some(Algorithm::HS256),
        KeyAlgorithm::HS384 => Some(Algorithm::HS384),
        KeyAlgorithm::HS512 => Some(Algorithm::HS512),
        KeyAlgorithm::ES256 => Some(Algorithm::ES256),
        KeyAlgorithm::ES384 => Some(Algorithm::ES384),
        KeyAlgorithm::RS256 => Some(Algorithm::RS256),
        KeyAlgorithm::RS384 => Some(Algorithm::RS384),
        KeyAlgorithm::RS512 => Some(Algorithm::RS512),
        KeyAlgorithm::PS256 => Some(Algorithm::PS256),
        KeyAlgorithm::PS384 => Some(Algorithm::PS384),
        KeyAlgorithm::PS512 => Some(Algorithm::PS512),
        KeyAlgorithm::EdDSA => Some(Algorithm::EdDSA),
        // encryption algorithms never sign
        _ => None,
    }
}

fn classify(err: jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidIssuer
        | ErrorKind::InvalidAudience
        | ErrorKind::MissingRequiredClaim(_)
        | ErrorKind::ImmatureSignature
        | ErrorKind::Json(_) => AuthError::InvalidClaims(
            "Incorrect claims. Please, check the audience and issuer.".to_string(),
        ),
        ErrorKind::InvalidSignature => AuthError::invalid_signature("Token signature could not be verified."),
        _ => AuthError::invalid_signature("Unable to parse authentication token."),
    }
}
