use axum::extract::State;

use crate::api::{short_views, ShortDrink};
use crate::app::AppState;
use crate::middleware::{ApiResult, DrinksResponse};

/// GET /drinks - every drink in the short projection, no token needed
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<ShortDrink>> {
    let drinks = state.store.list_all().await?;
    Ok(DrinksResponse::new(short_views(&drinks)))
}
