//! Prompt rendering for instruction synthesis.

use crate::types::Ingredient;

/// Prompt name, used in logs.
pub const INSTRUCTIONS_PROMPT_NAME: &str = "generate_instructions";

/// System prompt for instruction synthesis.
pub const INSTRUCTIONS_SYSTEM_PROMPT: &str =
    "You are a professional chef creating detailed cooking instructions.";

/// Render the user prompt for one recipe.
///
/// Ingredient amounts and names are upper-cased in the prompt; the response
/// contract is a JSON object with exactly the six instruction fields.
pub fn render_instructions_prompt(recipe_name: &str, ingredients: &[Ingredient]) -> String {
    let ingredients_text = ingredients
        .iter()
        .map(|ing| {
            format!(
                "- {} of {}",
                ing.recipe_amount.to_uppercase(),
                ing.ingredient.to_uppercase()
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Create detailed cooking instructions for: {recipe_name}

Ingredients:
{ingredients_text}

Create a comprehensive recipe guide with:
1. Step-by-step preparation method
2. Cooking tips specific to this recipe
3. Timing for each major step
4. Key techniques required
5. Storage and serving suggestions

Return as JSON with:
- preparation_steps: (array of strings) Detailed steps
- cooking_tips: (array of strings) At least 3 specific tips
- timing: (object) Time estimates for major steps
- techniques: (array of strings) Key cooking techniques
- storage: (string) Storage instructions
- serving: (string) Serving suggestions"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ingredient(name: &str, amount: &str) -> Ingredient {
        Ingredient {
            ingredient: name.to_string(),
            recipe_amount: amount.to_string(),
            unit_cost: 1.0,
            total_cost: 2.0,
        }
    }

    #[test]
    fn test_render_prompt_contains_recipe_name() {
        let prompt = render_instructions_prompt("Tomato Soup", &[]);
        assert!(prompt.contains("Create detailed cooking instructions for: Tomato Soup"));
    }

    #[test]
    fn test_render_prompt_uppercases_ingredients() {
        let ingredients = vec![ingredient("tomatoes", "2 cups")];
        let prompt = render_instructions_prompt("Tomato Soup", &ingredients);
        assert!(prompt.contains("- 2 CUPS of TOMATOES"));
    }

    #[test]
    fn test_render_prompt_names_all_six_fields() {
        let prompt = render_instructions_prompt("Tomato Soup", &[]);
        for field in [
            "preparation_steps",
            "cooking_tips",
            "timing",
            "techniques",
            "storage",
            "serving",
        ] {
            assert!(prompt.contains(field), "missing field {}", field);
        }
    }
}
