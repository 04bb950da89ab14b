//! Test utilities: token minting against the fixture key set, and app state
//! backed by the in-memory store.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::app::AppState;
use crate::auth::{StaticKeySet, TokenVerifier};
use crate::config::AppConfig;
use crate::database::MemoryDrinkStore;

pub const ISSUER: &str = "https://drinks-test.auth.example/";
pub const AUDIENCE: &str = "drinks";
pub const HMAC_KID: &str = "drinks-test-hmac";
pub const RSA_KID: &str = "drinks-test-rsa";
pub const HMAC_SECRET: &[u8] = b"drinks-test-shared-secret-for-hs256";

const RSA_PRIVATE_PEM: &str = include_str!("../../tests/fixtures/rs256_private.pem");
const JWKS: &str = include_str!("../../tests/fixtures/jwks.json");

/// JWKS holding the HMAC and RSA test keys
pub fn jwks_document() -> String {
    JWKS.to_string()
}

pub fn verifier() -> TokenVerifier {
    verifier_with_algorithms(vec![Algorithm::HS256, Algorithm::RS256])
}

pub fn verifier_with_algorithms(algorithms: Vec<Algorithm>) -> TokenVerifier {
    let keys = StaticKeySet::from_json(JWKS).expect("fixture JWKS parses");
    TokenVerifier::new(Arc::new(keys), ISSUER, AUDIENCE, algorithms, 0)
}

/// App state over a fresh in-memory store; the store handle is returned so
/// tests can inspect it directly.
pub fn state() -> (AppState, Arc<MemoryDrinkStore>) {
    state_with_config(AppConfig::for_tests())
}

pub fn state_with_config(config: AppConfig) -> (AppState, Arc<MemoryDrinkStore>) {
    let store = Arc::new(MemoryDrinkStore::new());
    let state = AppState::new(store.clone(), verifier(), config);
    (state, store)
}

/// Builds signed test tokens. Defaults to a valid, unexpired token for the
/// test issuer and audience with no permissions claim.
pub struct TokenBuilder {
    claims: Value,
    kid: Option<Option<String>>,
    secret: Vec<u8>,
}

impl TokenBuilder {
    pub fn new() -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            claims: json!({
                "iss": ISSUER,
                "aud": AUDIENCE,
                "sub": "auth0|barista",
                "iat": now,
                "exp": now + 3600,
            }),
            kid: None,
            secret: HMAC_SECRET.to_vec(),
        }
    }

    pub fn permissions(mut self, permissions: &[&str]) -> Self {
        self.claims["permissions"] = json!(permissions);
        self
    }

    pub fn scope(mut self, scope: &str) -> Self {
        self.claims["scope"] = json!(scope);
        self
    }

    pub fn issuer(mut self, issuer: &str) -> Self {
        self.claims["iss"] = json!(issuer);
        self
    }

    pub fn audience(mut self, audience: Value) -> Self {
        self.claims["aud"] = audience;
        self
    }

    pub fn expires_in(mut self, secs: i64) -> Self {
        self.claims["exp"] = json!(chrono::Utc::now().timestamp() + secs);
        self
    }

    /// Override the header `kid`; `None` leaves it out entirely
    pub fn kid(mut self, kid: Option<&str>) -> Self {
        self.kid = Some(kid.map(String::from));
        self
    }

    pub fn secret(mut self, secret: &[u8]) -> Self {
        self.secret = secret.to_vec();
        self
    }

    pub fn claims(&self) -> Value {
        self.claims.clone()
    }

    pub fn hs256(self) -> String {
        let mut header = Header::new(Algorithm::HS256);
        header.kid = self.kid.clone().unwrap_or_else(|| Some(HMAC_KID.to_string()));
        encode(&header, &self.claims, &EncodingKey::from_secret(&self.secret)).expect("hs256 token")
    }

    pub fn rs256(self) -> String {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.kid.clone().unwrap_or_else(|| Some(RSA_KID.to_string()));
        let key = EncodingKey::from_rsa_pem(RSA_PRIVATE_PEM.as_bytes()).expect("fixture RSA key");
        encode(&header, &self.claims, &key).expect("rs256 token")
    }

    pub fn bearer(self) -> String {
        format!("Bearer {}", self.hs256())
    }
}

impl Default for TokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Token with `alg: none` and an empty signature
pub fn unsigned_token(claims: &Value) -> String {
    let header = json!({"alg": "none", "typ": "JWT", "kid": HMAC_KID});
    format!(
        "{}.{}.",
        URL_SAFE_NO_PAD.encode(header.to_string()),
        URL_SAFE_NO_PAD.encode(claims.to_string())
    )
}
