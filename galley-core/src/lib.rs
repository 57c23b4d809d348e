pub mod error;
pub mod instructions;
pub mod llm;
pub mod prompts;
pub mod render;
pub mod types;

pub use error::RenderError;
pub use instructions::{generate_for_recipes, generate_instructions, InstructionsError};
pub use render::{render_document, DocumentFormat, InvalidFormat};
pub use types::{filter_requested, Ingredient, Instructions, Recipe, RecipeData};
