use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use crate::database::models::{Drink, DrinkPatch, NewDrink, Recipe};
use crate::database::store::{DrinkStore, StoreError};
use crate::types::Patch;

#[derive(Debug, FromRow)]
struct DrinkRow {
    id: i32,
    title: String,
    recipe: String,
}

impl TryFrom<DrinkRow> for Drink {
    type Error = StoreError;

    fn try_from(row: DrinkRow) -> Result<Self, Self::Error> {
        Ok(Drink {
            id: row.id,
            title: row.title,
            recipe: Recipe::from_column(&row.recipe)?,
        })
    }
}

/// Drink store backed by the `drinks` table
pub struct PgDrinkStore {
    pool: PgPool,
}

impl PgDrinkStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Unique violations on the title column become `Conflict`; everything
    /// else is a persistence fault, logged where it is turned into a response.
    fn classify(err: sqlx::Error, title: Option<&str>) -> StoreError {
        match (&err, title) {
            (sqlx::Error::Database(db), Some(title)) if db.is_unique_violation() => {
                StoreError::Conflict(title.to_string())
            }
            _ => StoreError::from(err),
        }
    }
}

#[async_trait]
impl DrinkStore for PgDrinkStore {
    async fn list_all(&self) -> Result<Vec<Drink>, StoreError> {
        let rows = sqlx::query_as::<_, DrinkRow>("SELECT id, title, recipe FROM drinks ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Self::classify(e, None))?;

        rows.into_iter().map(Drink::try_from).collect()
    }

    async fn find(&self, id: i32) -> Result<Drink, StoreError> {
        let row = sqlx::query_as::<_, DrinkRow>("SELECT id, title, recipe FROM drinks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Self::classify(e, None))?;

        row.ok_or(StoreError::NotFound(id)).and_then(Drink::try_from)
    }

    async fn create(&self, drink: NewDrink) -> Result<Drink, StoreError> {
        drink.validate()?;
        let recipe = drink.recipe.to_column()?;

        let row = sqlx::query_as::<_, DrinkRow>(
            "INSERT INTO drinks (title, recipe) VALUES ($1, $2) RETURNING id, title, recipe",
        )
        .bind(&drink.title)
        .bind(&recipe)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Self::classify(e, Some(&drink.title)))?;

        Drink::try_from(row)
    }

    async fn update(&self, id: i32, patch: DrinkPatch) -> Result<Drink, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Lock the row so it cannot vanish between the check and the write
        let existing: Option<i32> = sqlx::query_scalar("SELECT id FROM drinks WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| Self::classify(e, None))?;
        if existing.is_none() {
            return Err(StoreError::NotFound(id));
        }
        patch.validate()?;

        let title = patch.title.as_value().cloned();
        let recipe = match &patch.recipe {
            Patch::Value(recipe) => Some(recipe.to_column()?),
            _ => None,
        };

        let row = sqlx::query_as::<_, DrinkRow>(
            r#"
            UPDATE drinks
            SET title = COALESCE($2, title),
                recipe = COALESCE($3, recipe)
            WHERE id = $1
            RETURNING id, title, recipe
            "#,
        )
        .bind(id)
        .bind(&title)
        .bind(&recipe)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| Self::classify(e, title.as_deref()))?;

        tx.commit().await?;
        Drink::try_from(row)
    }

    async fn delete(&self, id: i32) -> Result<i32, StoreError> {
        let deleted: Option<i32> = sqlx::query_scalar("DELETE FROM drinks WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Self::classify(e, None))?;

        deleted.ok_or(StoreError::NotFound(id))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
