//! Word renderer.
//!
//! Builds the same section contract as the PDF renderer with docx-rs
//! paragraph and table builders; Word handles in-page flow natively, so the
//! only explicit layout is the page-break run between recipes.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use docx_rs::{AlignmentType, BreakType, Docx, Paragraph, Run, Table, TableCell, TableRow};

use crate::error::RenderError;
use crate::types::{Instructions, Recipe};

use super::{
    format_currency, info_rows, HEADING_INGREDIENTS, HEADING_PREPARATION, HEADING_SERVING,
    HEADING_STORAGE, HEADING_TIMING, HEADING_TIPS, INGREDIENT_COLUMNS,
};

// Run sizes are half-points.
const TITLE_SIZE: usize = 48;
const HEADING_SIZE: usize = 32;
/// Section accent, #2E5A88.
const ACCENT: &str = "2E5A88";

fn heading(text: &str) -> Paragraph {
    Paragraph::new().add_run(
        Run::new()
            .add_text(text)
            .bold()
            .size(HEADING_SIZE)
            .color(ACCENT),
    )
}

fn body(text: &str) -> Paragraph {
    Paragraph::new().add_run(Run::new().add_text(text))
}

fn cell(text: &str) -> TableCell {
    TableCell::new().add_paragraph(body(text))
}

fn page_break() -> Paragraph {
    Paragraph::new().add_run(Run::new().add_break(BreakType::Page))
}

fn add_recipe_section(
    mut docx: Docx,
    recipe: &Recipe,
    instructions: Option<&Instructions>,
) -> Docx {
    // Title, centered.
    docx = docx.add_paragraph(
        Paragraph::new()
            .align(AlignmentType::Center)
            .add_run(Run::new().add_text(recipe.name.as_str()).bold().size(TITLE_SIZE)),
    );
    docx = docx.add_paragraph(Paragraph::new());

    // Recipe information.
    let info = Table::new(
        info_rows(recipe)
            .iter()
            .map(|(label, value)| TableRow::new(vec![cell(label), cell(value)]))
            .collect(),
    );
    docx = docx.add_table(info);
    docx = docx.add_paragraph(Paragraph::new());

    // Ingredients.
    docx = docx.add_paragraph(heading(HEADING_INGREDIENTS));
    let mut rows = vec![TableRow::new(
        INGREDIENT_COLUMNS
            .iter()
            .map(|c| TableCell::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text(*c).bold())))
            .collect(),
    )];
    for ing in &recipe.data.ingredients {
        rows.push(TableRow::new(vec![
            cell(&ing.ingredient.to_uppercase()),
            cell(&ing.recipe_amount.to_uppercase()),
            cell(&format_currency(ing.unit_cost)),
            cell(&format_currency(ing.total_cost)),
        ]));
    }
    docx = docx.add_table(Table::new(rows));
    docx = docx.add_paragraph(Paragraph::new());

    let Some(instructions) = instructions else {
        return docx;
    };

    docx = docx.add_paragraph(heading(HEADING_PREPARATION));
    for (i, step) in instructions.preparation_steps.iter().enumerate() {
        docx = docx.add_paragraph(body(&format!("{}. {}", i + 1, step)));
    }
    docx = docx.add_paragraph(Paragraph::new());

    docx = docx.add_paragraph(heading(HEADING_TIPS));
    for tip in &instructions.cooking_tips {
        docx = docx.add_paragraph(body(&format!("\u{2022} {}", tip)));
    }
    docx = docx.add_paragraph(Paragraph::new());

    docx = docx.add_paragraph(heading(HEADING_TIMING));
    for (step, duration) in &instructions.timing {
        docx = docx.add_paragraph(body(&format!("\u{2022} {}: {}", step, duration)));
    }
    docx = docx.add_paragraph(Paragraph::new());

    docx = docx.add_paragraph(heading(HEADING_STORAGE));
    docx = docx.add_paragraph(body(&instructions.storage));

    docx = docx.add_paragraph(heading(HEADING_SERVING));
    docx = docx.add_paragraph(body(&instructions.serving));

    docx
}

/// Render the recipes to a Word document at `path`.
pub fn render_docx(
    recipes: &[Recipe],
    instructions: &BTreeMap<String, Instructions>,
    path: &Path,
) -> Result<(), RenderError> {
    let mut docx = Docx::new();

    for (idx, recipe) in recipes.iter().enumerate() {
        if idx > 0 {
            docx = docx.add_paragraph(page_break());
        }
        tracing::debug!(recipe = %recipe.name, "Rendering Word section");
        docx = add_recipe_section(docx, recipe, instructions.get(&recipe.name));
    }

    let file = File::create(path)?;
    docx.build()
        .pack(file)
        .map_err(|e| RenderError::Docx(e.to_string()))?;
    Ok(())
}
