use serde::{Deserialize, Deserializer, Serialize};

use crate::database::store::StoreError;
use crate::types::Patch;

/// Longest title the `drinks.title` column accepts
pub const TITLE_MAX_LEN: usize = 80;

/// One layer of a drink: what goes in, how it renders, and how much of it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub color: String,
    pub name: String,
    pub parts: u32,
}

/// Ordered list of ingredients.
///
/// Clients may send either a list or a single ingredient object; the single
/// form is wrapped into a one-element list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Recipe(pub Vec<Ingredient>);

#[derive(Deserialize)]
#[serde(untagged)]
enum RecipeInput {
    Many(Vec<Ingredient>),
    One(Ingredient),
}

impl<'de> Deserialize<'de> for Recipe {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match RecipeInput::deserialize(deserializer)? {
            RecipeInput::Many(items) => Recipe(items),
            RecipeInput::One(item) => Recipe(vec![item]),
        })
    }
}

impl Recipe {
    pub fn ingredients(&self) -> &[Ingredient] {
        &self.0
    }

    /// Serialized form stored in the `recipe` text column
    pub fn to_column(&self) -> Result<String, StoreError> {
        serde_json::to_string(self)
            .map_err(|e| StoreError::Validation(format!("recipe is not serializable: {}", e)))
    }

    pub fn from_column(text: &str) -> Result<Self, StoreError> {
        serde_json::from_str(text)
            .map_err(|e| StoreError::Persistence(format!("stored recipe is not valid JSON: {}", e)))
    }
}

/// A persisted drink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drink {
    pub id: i32,
    pub title: String,
    pub recipe: Recipe,
}

/// Body of POST /drinks
#[derive(Debug, Clone, Deserialize)]
pub struct NewDrink {
    pub title: String,
    pub recipe: Recipe,
}

impl NewDrink {
    pub fn validate(&self) -> Result<(), StoreError> {
        validate_title(&self.title)?;
        self.recipe.to_column().map(|_| ())
    }
}

/// Body of PATCH /drinks/:id
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DrinkPatch {
    #[serde(default)]
    pub title: Patch<String>,
    #[serde(default)]
    pub recipe: Patch<Recipe>,
}

impl DrinkPatch {
    /// Neither column is nullable, so an explicit null is rejected rather
    /// than silently ignored.
    pub fn validate(&self) -> Result<(), StoreError> {
        match &self.title {
            Patch::Absent => {}
            Patch::Null => return Err(StoreError::Validation("title cannot be null".to_string())),
            Patch::Value(title) => validate_title(title)?,
        }
        match &self.recipe {
            Patch::Absent => Ok(()),
            Patch::Null => Err(StoreError::Validation("recipe cannot be null".to_string())),
            Patch::Value(recipe) => recipe.to_column().map(|_| ()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_absent() && self.recipe.is_absent()
    }

    /// Apply supplied fields to `drink` in place. Call `validate` first.
    pub fn apply_to(&self, drink: &mut Drink) {
        if let Patch::Value(title) = &self.title {
            drink.title = title.clone();
        }
        if let Patch::Value(recipe) = &self.recipe {
            drink.recipe = recipe.clone();
        }
    }
}

pub fn validate_title(title: &str) -> Result<(), StoreError> {
    if title.trim().is_empty() {
        return Err(StoreError::Validation("title must not be empty".to_string()));
    }
    if title.chars().count() > TITLE_MAX_LEN {
        return Err(StoreError::Validation(format!(
            "title must be at most {} characters",
            TITLE_MAX_LEN
        )));
    }
    Ok(())
}
