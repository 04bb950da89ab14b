use axum::extract::{Path, State};
use tracing::{info, warn};

use crate::api::{long_views, LongDrink};
use crate::app::AppState;
use crate::auth::{DeleteDrinks, GetDrinksDetail, PatchDrinks, PostDrinks};
use crate::database::models::{DrinkPatch, NewDrink};
use crate::error::ApiError;
use crate::middleware::{ApiResult, Authorized, DrinksResponse, ValidJson};

/// GET /drinks-detail - every drink with ingredient names
pub async fn detail(
    State(state): State<AppState>,
    _auth: Authorized<GetDrinksDetail>,
) -> ApiResult<Vec<LongDrink>> {
    let drinks = state.store.list_all().await?;
    Ok(DrinksResponse::new(long_views(&drinks)))
}

/// POST /drinks - create a drink
pub async fn create(
    State(state): State<AppState>,
    auth: Authorized<PostDrinks>,
    ValidJson(body): ValidJson<NewDrink>,
) -> ApiResult<Vec<LongDrink>> {
    let drink = state.store.create(body).await?;
    info!("Created drink {} '{}' for {:?}", drink.id, drink.title, auth.subject());
    Ok(DrinksResponse::new(vec![LongDrink::from(&drink)]))
}

/// PATCH /drinks/:id - change the supplied fields of one drink
///
/// An unknown id is a 404 even when the body is also invalid. With
/// `api.legacy_unprocessable` set, any failure past the scope check is
/// answered with the generic 422 body.
pub async fn update(
    State(state): State<AppState>,
    auth: Authorized<PatchDrinks>,
    Path(raw_id): Path<String>,
    body: Result<ValidJson<DrinkPatch>, ApiError>,
) -> ApiResult<Vec<LongDrink>> {
    let outcome = async {
        let id = parse_id(&raw_id)?;
        let patch = match body {
            Ok(ValidJson(patch)) => patch,
            Err(err) => {
                // an unknown drink answers 404 whatever the body looks like
                state.store.find(id).await?;
                return Err(err);
            }
        };
        Ok::<_, ApiError>(state.store.update(id, patch).await?)
    }
    .await;

    match outcome {
        Ok(drink) => {
            info!("Updated drink {} for {:?}", drink.id, auth.subject());
            Ok(DrinksResponse::new(vec![LongDrink::from(&drink)]))
        }
        Err(err) if state.config.api.legacy_unprocessable => {
            warn!("Update of drink {} failed: {}", raw_id, err);
            Err(ApiError::legacy_unprocessable())
        }
        Err(err) => Err(err),
    }
}

/// DELETE /drinks/:id - remove one drink and echo its id
pub async fn delete(
    State(state): State<AppState>,
    auth: Authorized<DeleteDrinks>,
    Path(raw_id): Path<String>,
) -> ApiResult<i32> {
    let id = parse_id(&raw_id)?;
    let deleted = state.store.delete(id).await?;
    info!("Deleted drink {} for {:?}", deleted, auth.subject());
    Ok(DrinksResponse::new(deleted))
}

/// Ids that are not integers cannot name a drink
fn parse_id(raw: &str) -> Result<i32, ApiError> {
    raw.parse::<i32>()
        .map_err(|_| ApiError::not_found(format!("Drink {} not found", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_integer_ids_are_not_found() {
        assert_eq!(parse_id("12").unwrap(), 12);
        for raw in ["abc", "1.5", "", "99999999999"] {
            assert_eq!(parse_id(raw).unwrap_err().status_code().as_u16(), 404);
        }
    }
}
