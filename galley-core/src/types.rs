//! Recipe and instruction types shared between the store, the synthesizer,
//! and the document renderers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One ingredient line within a recipe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingredient {
    /// Ingredient name as stored (e.g. "tomatoes").
    pub ingredient: String,
    /// Display amount as stored (e.g. "2 cups").
    pub recipe_amount: String,
    pub unit_cost: f64,
    pub total_cost: f64,
}

/// Costed recipe details stored under a recipe's `data` key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeData {
    pub servings: i32,
    pub total_cost: f64,
    pub cost_per_serving: f64,
    pub ingredients: Vec<Ingredient>,
}

/// A stored recipe. `name` is unique within a user's collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub name: String,
    pub data: RecipeData,
}

/// Cooking instructions synthesized for one recipe.
///
/// Produced fresh for every generation run and never persisted. All six
/// fields are required; a model response missing any of them fails the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instructions {
    pub preparation_steps: Vec<String>,
    pub cooking_tips: Vec<String>,
    /// Step label -> duration description (e.g. "Simmering" -> "20 minutes").
    pub timing: BTreeMap<String, String>,
    pub techniques: Vec<String>,
    pub storage: String,
    pub serving: String,
}

/// Filter a user's stored recipes down to the requested names.
///
/// Stored order is preserved; names with no match are silently dropped.
/// Zero matches is a normal empty result, not an error.
pub fn filter_requested(all: Vec<Recipe>, requested: &[String]) -> Vec<Recipe> {
    all.into_iter()
        .filter(|recipe| requested.iter().any(|name| name == &recipe.name))
        .collect()
}
