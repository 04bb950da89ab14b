#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{json, Value};

pub const ISSUER: &str = "https://drinks-it.auth.example/";
pub const AUDIENCE: &str = "drinks-it";
pub const HMAC_KID: &str = "drinks-test-hmac";
pub const HMAC_SECRET: &[u8] = b"drinks-test-shared-secret-for-hs256";

const JWKS: &str = include_str!("../fixtures/jwks.json");

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // In-memory store and inline key set so no database or identity
        // provider is needed
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_drinks-api"));
        cmd.env("DRINKS_API_PORT", port.to_string())
            .env("APP_ENV", "development")
            .env("DATABASE_URL", "")
            .env("DATABASE_RESET_ON_START", "false")
            .env("AUTH_JWKS", JWKS)
            .env("AUTH_ISSUER", ISSUER)
            .env("API_AUDIENCE", AUDIENCE)
            .env("AUTH_ALGORITHMS", "HS256,RS256")
            .env("AUTH_LEEWAY_SECS", "0")
            .env("API_LEGACY_UNPROCESSABLE", "false")
            .env("RUST_LOG", "warn")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Claims accepted by the spawned server, carrying `permissions`
pub fn claims(permissions: &[&str]) -> Value {
    let now = chrono::Utc::now().timestamp();
    json!({
        "iss": ISSUER,
        "aud": AUDIENCE,
        "sub": "auth0|integration",
        "iat": now,
        "exp": now + 600,
        "permissions": permissions,
    })
}

pub fn sign(claims: &Value) -> String {
    let mut header = Header::new(Algorithm::HS256);
    header.kid = Some(HMAC_KID.to_string());
    encode(&header, claims, &EncodingKey::from_secret(HMAC_SECRET)).expect("sign test token")
}

pub fn bearer(permissions: &[&str]) -> String {
    format!("Bearer {}", sign(&claims(permissions)))
}

/// Title unique to this process run so tests sharing a server don't collide
pub fn unique_title(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or_default();
    format!("{} {}-{}", prefix, std::process::id(), nanos)
}
