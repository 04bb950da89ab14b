use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use std::marker::PhantomData;

use crate::app::AppState;
use crate::auth::{require_scope, AuthError, Claims, RequiredScope};
use crate::error::ApiError;

/// Verified caller holding permission `S`.
///
/// Place it before any body extractor: axum runs extractors in order, so the
/// token and scope are checked before the handler or the store sees the
/// request.
pub struct Authorized<S: RequiredScope> {
    pub claims: Claims,
    _scope: PhantomData<S>,
}

impl<S: RequiredScope> Authorized<S> {
    pub fn subject(&self) -> Option<&str> {
        self.claims.sub.as_deref()
    }
}

#[async_trait]
impl<S: RequiredScope> FromRequestParts<AppState> for Authorized<S> {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = extract_authorization(parts)?;

        let claims = state
            .verifier
            .verify_header(header)
            .await
            .map_err(|err| deny(parts, err))?;

        require_scope(&claims, S::SCOPE).map_err(|err| deny(parts, err))?;

        Ok(Self {
            claims,
            _scope: PhantomData,
        })
    }
}

/// Authorization header value, if present
fn extract_authorization(parts: &Parts) -> Result<Option<&str>, ApiError> {
    match parts.headers.get(AUTHORIZATION) {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .map(Some)
            .map_err(|_| deny(parts, AuthError::malformed("Invalid Authorization header format"))),
    }
}

fn deny(parts: &Parts, err: AuthError) -> ApiError {
    tracing::warn!(
        "Denied {} {}: {} ({})",
        parts.method,
        parts.uri.path(),
        err,
        err.code()
    );
    ApiError::Auth(err)
}
