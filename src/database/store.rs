use async_trait::async_trait;
use thiserror::Error;

use crate::database::models::{Drink, DrinkPatch, NewDrink};

/// Errors from a drink store, one variant per cause
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Drink {0} not found")]
    NotFound(i32),

    #[error("A drink titled '{0}' already exists")]
    Conflict(String),

    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Persistence(err.to_string())
    }
}

/// Single-table persistence for drinks.
///
/// Every mutation validates its input before touching storage, so a failed
/// call leaves the table as it was.
#[async_trait]
pub trait DrinkStore: Send + Sync {
    /// All drinks ordered by id
    async fn list_all(&self) -> Result<Vec<Drink>, StoreError>;

    async fn find(&self, id: i32) -> Result<Drink, StoreError>;

    async fn create(&self, drink: NewDrink) -> Result<Drink, StoreError>;

    /// An unknown id is reported as `NotFound` before the patch is validated.
    async fn update(&self, id: i32, patch: DrinkPatch) -> Result<Drink, StoreError>;

    /// Remove the drink and return its id
    async fn delete(&self, id: i32) -> Result<i32, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;

    /// Short backend label for health output and logs
    fn backend(&self) -> &'static str;
}
