use serde::Serialize;

use crate::database::models::{Drink, Ingredient};

/// Ingredient as shown to anonymous callers: no name
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ShortIngredient {
    pub color: String,
    pub parts: u32,
}

/// Public projection of a drink. Ingredient names are withheld so that
/// unauthenticated callers only see the rendered layers.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ShortDrink {
    pub id: i32,
    pub title: String,
    pub recipe: Vec<ShortIngredient>,
}

/// Full projection of a drink for authorized callers
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LongDrink {
    pub id: i32,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

impl From<&Drink> for ShortDrink {
    fn from(drink: &Drink) -> Self {
        Self {
            id: drink.id,
            title: drink.title.clone(),
            recipe: drink
                .recipe
                .ingredients()
                .iter()
                .map(|i| ShortIngredient {
                    color: i.color.clone(),
                    parts: i.parts,
                })
                .collect(),
        }
    }
}

impl From<&Drink> for LongDrink {
    fn from(drink: &Drink) -> Self {
        Self {
            id: drink.id,
            title: drink.title.clone(),
            recipe: drink.recipe.ingredients().to_vec(),
        }
    }
}

pub fn short_views(drinks: &[Drink]) -> Vec<ShortDrink> {
    drinks.iter().map(ShortDrink::from).collect()
}

pub fn long_views(drinks: &[Drink]) -> Vec<LongDrink> {
    drinks.iter().map(LongDrink::from).collect()
}
