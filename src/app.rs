use axum::{
    extract::{DefaultBodyLimit, State},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method, StatusCode,
    },
    response::{IntoResponse, Json},
    routing::{get, patch},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::auth::TokenVerifier;
use crate::config::{AppConfig, SecurityConfig};
use crate::database::{
    DatabaseManager, DrinkStore, Ingredient, MemoryDrinkStore, NewDrink, PgDrinkStore, Recipe,
};
use crate::error::ApiError;
use crate::handlers::{protected, public};

/// Everything a handler needs, built once at startup and cloned per request
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DrinkStore>,
    pub verifier: Arc<TokenVerifier>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn DrinkStore>, verifier: TokenVerifier, config: AppConfig) -> Self {
        Self {
            store,
            verifier: Arc::new(verifier),
            config: Arc::new(config),
        }
    }

    /// Build the verifier and the store described by `config`.
    ///
    /// Without `DATABASE_URL` drinks live in memory for the life of the
    /// process.
    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let verifier = TokenVerifier::from_config(&config.auth)?;

        let store: Arc<dyn DrinkStore> = match config.database.url {
            Some(_) => {
                let pool = DatabaseManager::connect(&config.database).await?;
                if config.database.reset_on_start {
                    warn!("Resetting drinks table");
                    DatabaseManager::reset(&pool).await?;
                } else {
                    DatabaseManager::ensure_schema(&pool).await?;
                }
                Arc::new(PgDrinkStore::new(pool))
            }
            None => {
                warn!("DATABASE_URL not set; drinks are kept in memory and lost on restart");
                Arc::new(MemoryDrinkStore::new())
            }
        };

        if config.database.reset_on_start {
            seed(store.as_ref()).await?;
        }

        Ok(Self::new(store, verifier, config))
    }
}

/// Starter menu written after a reset
async fn seed(store: &dyn DrinkStore) -> anyhow::Result<()> {
    let water = store
        .create(NewDrink {
            title: "water".to_string(),
            recipe: Recipe(vec![Ingredient {
                color: "blue".to_string(),
                name: "water".to_string(),
                parts: 1,
            }]),
        })
        .await?;
    info!("Seeded drink {} '{}'", water.id, water.title);
    Ok(())
}

pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    let mut router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(drinks_routes())
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .with_state(state);

    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    router
}

fn drinks_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/drinks",
            get(public::drinks_list).post(protected::drinks_create),
        )
        .route("/drinks-detail", get(protected::drinks_detail))
        .route(
            "/drinks/:id",
            patch(protected::drinks_update).delete(protected::drinks_delete),
        )
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    if security.cors_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Drinks API",
            "version": version,
            "endpoints": {
                "GET /drinks": "public, short recipe view",
                "GET /drinks-detail": "get:drinks-detail",
                "POST /drinks": "post:drinks",
                "PATCH /drinks/:id": "patch:drinks",
                "DELETE /drinks/:id": "delete:drinks",
                "GET /health": "public",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    let backend = state.store.backend();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "store": backend
                }
            })),
        ),
        Err(e) => {
            warn!("Health check failed for {} store: {}", backend, e);
            let err = ApiError::service_unavailable("store unavailable");
            let mut body = err.to_json();
            body["data"] = json!({
                "status": "degraded",
                "timestamp": now,
                "store": backend
            });
            (err.status_code(), Json(body))
        }
    }
}

async fn not_found() -> ApiError {
    ApiError::not_found("Not Found")
}

async fn method_not_allowed(method: Method) -> ApiError {
    ApiError::method_not_allowed(format!("{} is not allowed on this route", method))
}
