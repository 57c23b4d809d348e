//! Document-store access for user recipe collections.
//!
//! Each user has one document whose `recipes` JSONB payload maps an
//! inventory key (`inventory-items-{user_id}`) to the ordered list of that
//! user's recipe records. The store is read-only to this service.

use diesel::prelude::*;
use galley_core::Recipe;
use thiserror::Error;

use crate::db::DbPool;
use crate::schema::user_documents;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid user document: {0}")]
    InvalidDocument(String),
}

/// Fetch a user's stored recipes.
///
/// A missing user document, a missing inventory key, or an empty list all
/// yield `Ok(vec![])`; only storage faults and unreadable documents error.
pub fn fetch_user_recipes(pool: &DbPool, user_id: &str) -> Result<Vec<Recipe>, StoreError> {
    let mut conn = pool
        .get()
        .map_err(|e| StoreError::Database(e.to_string()))?;

    let document: Option<serde_json::Value> = user_documents::table
        .find(user_id)
        .select(user_documents::recipes)
        .first(&mut conn)
        .optional()
        .map_err(|e| StoreError::Database(e.to_string()))?;

    match document {
        Some(recipes_map) => recipes_from_document(&recipes_map, user_id),
        None => Ok(vec![]),
    }
}

/// Extract the recipe list for `user_id` from the document's recipes map.
pub fn recipes_from_document(
    recipes_map: &serde_json::Value,
    user_id: &str,
) -> Result<Vec<Recipe>, StoreError> {
    let inventory_key = format!("inventory-items-{}", user_id);

    match recipes_map.get(&inventory_key) {
        Some(list) => serde_json::from_value(list.clone())
            .map_err(|e| StoreError::InvalidDocument(e.to_string())),
        None => Ok(vec![]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document() -> serde_json::Value {
        json!({
            "inventory-items-user-1": [
                {
                    "name": "Tomato Soup",
                    "data": {
                        "servings": 4,
                        "total_cost": 12.40,
                        "cost_per_serving": 3.10,
                        "ingredients": [
                            {"ingredient": "tomatoes", "recipe_amount": "2 cups", "unit_cost": 1.25, "total_cost": 2.50}
                        ]
                    }
                },
                {
                    "name": "Pancakes",
                    "data": {
                        "servings": 2,
                        "total_cost": 4.00,
                        "cost_per_serving": 2.00,
                        "ingredients": []
                    }
                }
            ]
        })
    }

    #[test]
    fn test_recipes_from_document_reads_inventory_key() {
        let recipes = recipes_from_document(&document(), "user-1").unwrap();
        assert_eq!(recipes.len(), 2);
        assert_eq!(recipes[0].name, "Tomato Soup");
        assert_eq!(recipes[1].name, "Pancakes");
    }

    #[test]
    fn test_recipes_from_document_missing_key_is_empty() {
        let recipes = recipes_from_document(&document(), "user-2").unwrap();
        assert!(recipes.is_empty());
    }

    #[test]
    fn test_recipes_from_document_rejects_malformed_records() {
        let doc = json!({"inventory-items-user-1": [{"name": "Broken"}]});
        let result = recipes_from_document(&doc, "user-1");
        assert!(matches!(result, Err(StoreError::InvalidDocument(_))));
    }

    #[test]
    fn test_recipes_from_document_empty_list() {
        let doc = json!({"inventory-items-user-1": []});
        let recipes = recipes_from_document(&doc, "user-1").unwrap();
        assert!(recipes.is_empty());
    }
}
