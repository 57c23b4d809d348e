//! End-to-end tests over synthesis and both document renderers, using the
//! fake LLM provider and scratch files.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use galley_core::llm::FakeProvider;
use galley_core::{
    filter_requested, generate_for_recipes, render_document, DocumentFormat, Ingredient,
    Instructions, Recipe, RecipeData,
};

const INSTRUCTIONS_RESPONSE: &str = r#"{
    "preparation_steps": ["Chop the tomatoes.", "Simmer everything for 20 minutes."],
    "cooking_tips": ["Use ripe tomatoes.", "Season gradually.", "Blend while hot."],
    "timing": {"Chopping": "5 minutes", "Simmering": "20 minutes"},
    "techniques": ["Simmering", "Blending"],
    "storage": "Refrigerate in an airtight container for up to 3 days.",
    "serving": "Serve hot with crusty bread."
}"#;

fn tomato_soup() -> Recipe {
    Recipe {
        name: "Tomato Soup".to_string(),
        data: RecipeData {
            servings: 4,
            total_cost: 12.40,
            cost_per_serving: 3.10,
            ingredients: vec![
                Ingredient {
                    ingredient: "tomatoes".to_string(),
                    recipe_amount: "2 cups".to_string(),
                    unit_cost: 1.25,
                    total_cost: 2.50,
                },
                Ingredient {
                    ingredient: "vegetable stock".to_string(),
                    recipe_amount: "3 cups".to_string(),
                    unit_cost: 0.80,
                    total_cost: 2.40,
                },
            ],
        },
    }
}

fn pancakes() -> Recipe {
    Recipe {
        name: "Pancakes".to_string(),
        data: RecipeData {
            servings: 2,
            total_cost: 4.00,
            cost_per_serving: 2.00,
            ingredients: vec![Ingredient {
                ingredient: "flour".to_string(),
                recipe_amount: "1 cup".to_string(),
                unit_cost: 0.50,
                total_cost: 0.50,
            }],
        },
    }
}

async fn synthesized(recipes: &[Recipe]) -> BTreeMap<String, Instructions> {
    let provider = FakeProvider::new().with_default_response(INSTRUCTIONS_RESPONSE);
    generate_for_recipes(&provider, recipes).await.unwrap()
}

#[tokio::test]
async fn test_pdf_one_page_per_recipe() {
    let recipes = vec![tomato_soup(), pancakes()];
    let instructions = synthesized(&recipes).await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recipes.pdf");
    render_document(DocumentFormat::Pdf, &recipes, &instructions, &path).unwrap();

    let doc = lopdf::Document::load(&path).unwrap();
    assert_eq!(doc.get_pages().len(), 2);
}

#[tokio::test]
async fn test_pdf_single_recipe_has_single_page() {
    let recipes = vec![tomato_soup()];
    let instructions = synthesized(&recipes).await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recipes.pdf");
    render_document(DocumentFormat::Pdf, &recipes, &instructions, &path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF"));

    let doc = lopdf::Document::load(&path).unwrap();
    assert_eq!(doc.get_pages().len(), 1);
}

#[tokio::test]
async fn test_pdf_section_content() {
    let recipes = vec![tomato_soup()];
    let instructions = synthesized(&recipes).await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recipes.pdf");
    render_document(DocumentFormat::Pdf, &recipes, &instructions, &path).unwrap();

    let doc = lopdf::Document::load(&path).unwrap();
    let text = doc.extract_text(&[1]).unwrap();

    assert!(text.contains("Tomato Soup"));
    assert!(text.contains("Servings"));
    assert!(text.contains("4"));
    assert!(text.contains("$12.40"));
    assert!(text.contains("$3.10"));
    // Ingredients are upper-cased in the table.
    assert!(text.contains("TOMATOES"));
    assert!(text.contains("2 CUPS"));
    assert!(text.contains("VEGETABLE STOCK"));
    // Synthesized blocks present.
    assert!(text.contains("Preparation Method"));
    assert!(text.contains("Cooking Tips"));
    assert!(text.contains("Timing"));
    assert!(text.contains("Storage"));
    assert!(text.contains("Serving Suggestions"));
}

#[test]
fn test_pdf_without_instructions_omits_blocks() {
    let recipes = vec![tomato_soup()];
    let instructions = BTreeMap::new();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recipes.pdf");
    render_document(DocumentFormat::Pdf, &recipes, &instructions, &path).unwrap();

    let doc = lopdf::Document::load(&path).unwrap();
    let text = doc.extract_text(&[1]).unwrap();

    assert!(text.contains("Tomato Soup"));
    assert!(text.contains("Ingredients"));
    for heading in [
        "Preparation Method",
        "Cooking Tips",
        "Timing",
        "Storage",
        "Serving Suggestions",
    ] {
        assert!(!text.contains(heading), "unexpected block: {}", heading);
    }
}

#[tokio::test]
async fn test_docx_output_is_a_word_package() {
    let recipes = vec![tomato_soup(), pancakes()];
    let instructions = synthesized(&recipes).await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recipes.docx");
    render_document(DocumentFormat::Docx, &recipes, &instructions, &path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    // A .docx file is a ZIP package containing word/document.xml.
    assert!(bytes.starts_with(b"PK\x03\x04"));
    let haystack = bytes.windows(b"word/document.xml".len());
    assert!(haystack
        .into_iter()
        .any(|window| window == b"word/document.xml"));
}

#[test]
fn test_docx_renders_without_instructions() {
    let recipes = vec![pancakes()];
    let instructions = BTreeMap::new();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recipes.docx");
    render_document(DocumentFormat::Docx, &recipes, &instructions, &path).unwrap();

    assert!(std::fs::read(&path).unwrap().starts_with(b"PK\x03\x04"));
}

#[tokio::test]
async fn test_base64_round_trip_preserves_bytes() {
    let recipes = vec![tomato_soup()];
    let instructions = synthesized(&recipes).await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recipes.pdf");
    render_document(DocumentFormat::Pdf, &recipes, &instructions, &path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    let encoded = BASE64.encode(&bytes);
    let decoded = BASE64.decode(encoded).unwrap();
    assert_eq!(decoded, bytes);
}

#[test]
fn test_filter_then_render_uses_requested_subset_only() {
    let all = vec![tomato_soup(), pancakes()];
    let requested = vec!["Tomato Soup".to_string()];
    let recipes = filter_requested(all, &requested);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recipes.pdf");
    render_document(DocumentFormat::Pdf, &recipes, &BTreeMap::new(), &path).unwrap();

    let doc = lopdf::Document::load(&path).unwrap();
    assert_eq!(doc.get_pages().len(), 1);
    let text = doc.extract_text(&[1]).unwrap();
    assert!(text.contains("Tomato Soup"));
    assert!(!text.contains("Pancakes"));
}
