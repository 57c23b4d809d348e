//! Instruction synthesis: one generation call per recipe.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::llm::{ChatMessage, ChatRequest, LlmError, LlmProvider};
use crate::prompts::{
    render_instructions_prompt, INSTRUCTIONS_PROMPT_NAME, INSTRUCTIONS_SYSTEM_PROMPT,
};
use crate::types::{Ingredient, Instructions, Recipe};

#[derive(Error, Debug)]
pub enum InstructionsError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("Failed to parse instructions response: {0}")]
    Parse(String),
}

/// Synthesize instructions for a single recipe.
///
/// Issues one generation request and parses the response as a strict JSON
/// object with the six instruction fields. A malformed or non-conforming
/// response is a hard failure; there is no retry and no fallback text.
pub async fn generate_instructions(
    provider: &dyn LlmProvider,
    recipe_name: &str,
    ingredients: &[Ingredient],
) -> Result<Instructions, InstructionsError> {
    let request = ChatRequest {
        messages: vec![
            ChatMessage::system(INSTRUCTIONS_SYSTEM_PROMPT),
            ChatMessage::user(render_instructions_prompt(recipe_name, ingredients)),
        ],
        json_response: true,
        max_tokens: Some(2048),
        temperature: None,
    };

    tracing::debug!(
        prompt_name = INSTRUCTIONS_PROMPT_NAME,
        recipe = recipe_name,
        "Requesting instructions"
    );

    let content = provider.complete(request).await?;
    parse_instructions_response(&content)
}

/// Synthesize instructions for every recipe, sequentially.
///
/// Results are keyed by recipe name so the renderer joins them explicitly
/// rather than by list position. Any single failure fails the whole run.
pub async fn generate_for_recipes(
    provider: &dyn LlmProvider,
    recipes: &[Recipe],
) -> Result<BTreeMap<String, Instructions>, InstructionsError> {
    let mut results = BTreeMap::new();

    for recipe in recipes {
        let instructions =
            generate_instructions(provider, &recipe.name, &recipe.data.ingredients).await?;
        results.insert(recipe.name.clone(), instructions);
    }

    Ok(results)
}

/// Parse a model response into [`Instructions`].
///
/// Tolerates a Markdown code fence around the JSON body; everything else
/// must deserialize exactly.
pub fn parse_instructions_response(content: &str) -> Result<Instructions, InstructionsError> {
    let body = strip_code_fence(content);

    serde_json::from_str(body).map_err(|e| {
        InstructionsError::Parse(format!("Invalid JSON: {} - Response was: {}", e, content))
    })
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string ("json") on the opening fence line.
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::FakeProvider;
    use crate::types::RecipeData;

    const VALID_RESPONSE: &str = r#"{
        "preparation_steps": ["Chop the tomatoes.", "Simmer for 20 minutes."],
        "cooking_tips": ["Use ripe tomatoes.", "Season gradually.", "Blend while hot."],
        "timing": {"Chopping": "5 minutes", "Simmering": "20 minutes"},
        "techniques": ["Simmering", "Blending"],
        "storage": "Refrigerate up to 3 days.",
        "serving": "Serve hot with crusty bread."
    }"#;

    fn recipe(name: &str) -> Recipe {
        Recipe {
            name: name.to_string(),
            data: RecipeData {
                servings: 4,
                total_cost: 12.40,
                cost_per_serving: 3.10,
                ingredients: vec![Ingredient {
                    ingredient: "tomatoes".to_string(),
                    recipe_amount: "2 cups".to_string(),
                    unit_cost: 1.25,
                    total_cost: 2.50,
                }],
            },
        }
    }

    #[test]
    fn test_parse_valid_response() {
        let instructions = parse_instructions_response(VALID_RESPONSE).unwrap();
        assert_eq!(instructions.preparation_steps.len(), 2);
        assert_eq!(instructions.cooking_tips.len(), 3);
        assert_eq!(
            instructions.timing.get("Simmering"),
            Some(&"20 minutes".to_string())
        );
        assert_eq!(instructions.storage, "Refrigerate up to 3 days.");
    }

    #[test]
    fn test_parse_fenced_response() {
        let fenced = format!("```json\n{}\n```", VALID_RESPONSE);
        let instructions = parse_instructions_response(&fenced).unwrap();
        assert_eq!(instructions.techniques, vec!["Simmering", "Blending"]);
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(parse_instructions_response("Step 1: chop tomatoes").is_err());
    }

    #[test]
    fn test_parse_rejects_missing_fields() {
        let partial = r#"{"preparation_steps": ["Chop."]}"#;
        assert!(parse_instructions_response(partial).is_err());
    }

    #[tokio::test]
    async fn test_generate_for_recipes_keys_by_name() {
        let provider = FakeProvider::with_response("Tomato Soup", VALID_RESPONSE);
        let recipes = vec![recipe("Tomato Soup")];

        let results = generate_for_recipes(&provider, &recipes).await.unwrap();

        assert_eq!(results.len(), 1);
        assert!(results.contains_key("Tomato Soup"));
    }

    #[tokio::test]
    async fn test_generate_for_recipes_fails_whole_run() {
        // Second recipe has no configured response, so the provider errors
        // and the run must fail rather than return a partial map.
        let provider = FakeProvider::with_response("Tomato Soup", VALID_RESPONSE);
        let recipes = vec![recipe("Tomato Soup"), recipe("Pancakes")];

        assert!(generate_for_recipes(&provider, &recipes).await.is_err());
    }

    #[tokio::test]
    async fn test_generate_rejects_unparseable_model_output() {
        let provider = FakeProvider::new().with_default_response("not json at all");
        let recipes = vec![recipe("Tomato Soup")];

        let result = generate_for_recipes(&provider, &recipes).await;
        assert!(matches!(result, Err(InstructionsError::Parse(_))));
    }
}
