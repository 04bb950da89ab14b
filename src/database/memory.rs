use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::database::models::{Drink, DrinkPatch, NewDrink};
use crate::database::store::{DrinkStore, StoreError};

/// Process-local drink store used when no database is configured, and by tests
pub struct MemoryDrinkStore {
    state: RwLock<MemoryState>,
}

struct MemoryState {
    next_id: i32,
    drinks: BTreeMap<i32, Drink>,
}

impl MemoryState {
    fn title_taken(&self, title: &str, except: Option<i32>) -> bool {
        self.drinks
            .values()
            .any(|d| d.title == title && Some(d.id) != except)
    }
}

impl MemoryDrinkStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState {
                next_id: 1,
                drinks: BTreeMap::new(),
            }),
        }
    }

    /// Number of stored drinks
    pub async fn len(&self) -> usize {
        self.state.read().await.drinks.len()
    }
}

impl Default for MemoryDrinkStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DrinkStore for MemoryDrinkStore {
    async fn list_all(&self) -> Result<Vec<Drink>, StoreError> {
        Ok(self.state.read().await.drinks.values().cloned().collect())
    }

    async fn find(&self, id: i32) -> Result<Drink, StoreError> {
        self.state
            .read()
            .await
            .drinks
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn create(&self, drink: NewDrink) -> Result<Drink, StoreError> {
        drink.validate()?;

        let mut state = self.state.write().await;
        if state.title_taken(&drink.title, None) {
            return Err(StoreError::Conflict(drink.title));
        }

        let id = state.next_id;
        state.next_id = id
            .checked_add(1)
            .ok_or_else(|| StoreError::Persistence("drink ids exhausted".to_string()))?;

        let created = Drink {
            id,
            title: drink.title,
            recipe: drink.recipe,
        };
        state.drinks.insert(id, created.clone());
        Ok(created)
    }

    async fn update(&self, id: i32, patch: DrinkPatch) -> Result<Drink, StoreError> {
        let mut state = self.state.write().await;
        if !state.drinks.contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }
        patch.validate()?;
        if let Some(title) = patch.title.as_value() {
            if state.title_taken(title, Some(id)) {
                return Err(StoreError::Conflict(title.clone()));
            }
        }

        let drink = state.drinks.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        patch.apply_to(drink);
        Ok(drink.clone())
    }

    async fn delete(&self, id: i32) -> Result<i32, StoreError> {
        self.state
            .write()
            .await
            .drinks
            .remove(&id)
            .map(|d| d.id)
            .ok_or(StoreError::NotFound(id))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{Ingredient, Recipe};
    use crate::types::Patch;

    fn new_drink(title: &str) -> NewDrink {
        NewDrink {
            title: title.to_string(),
            recipe: Recipe(vec![Ingredient {
                color: "blue".to_string(),
                name: "water".to_string(),
                parts: 1,
            }]),
        }
    }

    #[tokio::test]
    async fn create_assigns_fresh_ids() {
        let store = MemoryDrinkStore::new();
        let a = store.create(new_drink("water")).await.unwrap();
        let b = store.create(new_drink("tonic")).await.unwrap();
        assert_ne!(a.id, b.id);

        // ids are never reused after a delete
        store.delete(b.id).await.unwrap();
        let c = store.create(new_drink("soda")).await.unwrap();
        assert!(c.id > b.id);
    }

    #[tokio::test]
    async fn failed_create_leaves_store_unchanged() {
        let store = MemoryDrinkStore::new();
        store.create(new_drink("water")).await.unwrap();

        assert!(matches!(store.create(new_drink("")).await, Err(StoreError::Validation(_))));
        assert!(matches!(store.create(new_drink("water")).await, Err(StoreError::Conflict(_))));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_ids() {
        let store = MemoryDrinkStore::new();
        let patch = DrinkPatch { title: Patch::Value("x".to_string()), ..Default::default() };
        assert!(matches!(store.update(42, patch).await, Err(StoreError::NotFound(42))));
        assert!(matches!(store.delete(42).await, Err(StoreError::NotFound(42))));
    }

    #[tokio::test]
    async fn missing_id_wins_over_invalid_patch() {
        let store = MemoryDrinkStore::new();
        let empty = DrinkPatch { title: Patch::Value(String::new()), ..Default::default() };
        assert!(matches!(store.update(9, empty).await, Err(StoreError::NotFound(9))));

        let null = DrinkPatch { title: Patch::Null, ..Default::default() };
        assert!(matches!(store.update(9, null).await, Err(StoreError::NotFound(9))));

        let drink = store.create(new_drink("water")).await.unwrap();
        let empty = DrinkPatch { title: Patch::Value(String::new()), ..Default::default() };
        assert!(matches!(store.update(drink.id, empty).await, Err(StoreError::Validation(_))));
        assert_eq!(store.find(drink.id).await.unwrap().title, "water");
    }

    #[tokio::test]
    async fn exhausted_ids_fail_without_insert() {
        let store = MemoryDrinkStore::new();
        store.state.write().await.next_id = i32::MAX;

        assert!(matches!(store.create(new_drink("water")).await, Err(StoreError::Persistence(_))));
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn update_keeps_own_title_without_conflict() {
        let store = MemoryDrinkStore::new();
        let drink = store.create(new_drink("water")).await.unwrap();
        let other = store.create(new_drink("tonic")).await.unwrap();

        let same = DrinkPatch { title: Patch::Value("water".to_string()), ..Default::default() };
        assert!(store.update(drink.id, same).await.is_ok());

        let clash = DrinkPatch { title: Patch::Value("water".to_string()), ..Default::default() };
        assert!(matches!(store.update(other.id, clash).await, Err(StoreError::Conflict(_))));
    }
}
