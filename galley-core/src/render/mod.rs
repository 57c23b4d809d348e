//! Document renderers.
//!
//! Both renderers share one contract: one page (or page-equivalent section,
//! separated by an explicit break) per recipe, in input order, laid out as
//! title, info table, ingredients table, and the optional synthesized
//! instruction blocks. Output is written to a caller-supplied scratch path;
//! the caller owns encoding, transport, and cleanup.

mod docx;
mod pdf;

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

use crate::error::RenderError;
use crate::types::{Instructions, Recipe};

pub use docx::render_docx;
pub use pdf::render_pdf;

/// Output document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

/// Word processing MIME type.
const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

impl DocumentFormat {
    /// File extension, also used as the key in the result document map.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Docx => DOCX_MIME,
        }
    }
}

/// Rejected format value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Format must be either 'pdf' or 'docx'")]
pub struct InvalidFormat;

impl FromStr for DocumentFormat {
    type Err = InvalidFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            _ => Err(InvalidFormat),
        }
    }
}

/// Section headings shared by both renderers.
pub(crate) const HEADING_INGREDIENTS: &str = "Ingredients";
pub(crate) const HEADING_PREPARATION: &str = "Preparation Method";
pub(crate) const HEADING_TIPS: &str = "Cooking Tips";
pub(crate) const HEADING_TIMING: &str = "Timing";
pub(crate) const HEADING_STORAGE: &str = "Storage";
pub(crate) const HEADING_SERVING: &str = "Serving Suggestions";

/// Ingredients table header row.
pub(crate) const INGREDIENT_COLUMNS: [&str; 4] =
    ["INGREDIENT", "AMOUNT", "COST PER UNIT", "TOTAL COST"];

/// Format a cost as currency with exactly two decimal places.
pub(crate) fn format_currency(value: f64) -> String {
    format!("${:.2}", value)
}

/// Info table rows for one recipe: label and formatted value.
pub(crate) fn info_rows(recipe: &Recipe) -> [(String, String); 3] {
    [
        ("Servings".to_string(), recipe.data.servings.to_string()),
        (
            "Total Cost".to_string(),
            format_currency(recipe.data.total_cost),
        ),
        (
            "Cost per Serving".to_string(),
            format_currency(recipe.data.cost_per_serving),
        ),
    ]
}

/// Render the recipes into `path` in the requested format.
///
/// `instructions` is joined by recipe name; a recipe with no entry gets no
/// instruction blocks and no placeholder text.
pub fn render_document(
    format: DocumentFormat,
    recipes: &[Recipe],
    instructions: &BTreeMap<String, Instructions>,
    path: &Path,
) -> Result<(), RenderError> {
    tracing::info!(
        format = format.extension(),
        recipes = recipes.len(),
        "Rendering document"
    );

    match format {
        DocumentFormat::Pdf => render_pdf(recipes, instructions, path),
        DocumentFormat::Docx => render_docx(recipes, instructions, path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency_two_decimals() {
        assert_eq!(format_currency(12.4), "$12.40");
        assert_eq!(format_currency(3.1), "$3.10");
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(1.005), "$1.00");
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("pdf".parse::<DocumentFormat>().unwrap(), DocumentFormat::Pdf);
        assert_eq!(
            "docx".parse::<DocumentFormat>().unwrap(),
            DocumentFormat::Docx
        );
    }

    #[test]
    fn test_format_from_str_rejects_xml() {
        let err = "xml".parse::<DocumentFormat>().unwrap_err();
        assert_eq!(err.to_string(), "Format must be either 'pdf' or 'docx'");
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(DocumentFormat::Pdf.mime_type(), "application/pdf");
        assert!(DocumentFormat::Docx.mime_type().contains("wordprocessingml"));
    }
}
