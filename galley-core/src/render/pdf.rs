//! PDF renderer.
//!
//! Lays recipe sections out directly as PDF content streams: a manual flow
//! cursor on A4 pages, ruled tables, and an explicit page break between
//! recipes. The fixed section contract makes a layout engine unnecessary.

use std::collections::BTreeMap;
use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};

use crate::error::RenderError;
use crate::types::{Instructions, Recipe};

use super::{
    format_currency, info_rows, HEADING_INGREDIENTS, HEADING_PREPARATION, HEADING_SERVING,
    HEADING_STORAGE, HEADING_TIMING, HEADING_TIPS, INGREDIENT_COLUMNS,
};

// A4 in points.
const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 50.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

const TITLE_SIZE: f32 = 24.0;
const HEADING_SIZE: f32 = 16.0;
const BODY_SIZE: f32 = 11.0;
const BODY_LEADING: f32 = 14.0;

const ROW_HEIGHT: f32 = 20.0;
const CELL_PADDING: f32 = 6.0;

const BLACK: Rgb = (0.0, 0.0, 0.0);
const WHITE: Rgb = (1.0, 1.0, 1.0);
/// Section accent, #2E5A88.
const ACCENT: Rgb = (0.180, 0.353, 0.533);
/// Info-table label background, #F5F5F5.
const LABEL_FILL: Rgb = (0.961, 0.961, 0.961);
const GRID_GRAY: f32 = 0.5;

/// Info table column widths (2in / 4in).
const INFO_WIDTHS: [f32; 2] = [144.0, 288.0];
/// Ingredients table column widths (2.5in / 1.5in / 1.5in / 1.5in).
const INGREDIENT_WIDTHS: [f32; 4] = [180.0, 108.0, 108.0, 108.0];

type Rgb = (f32, f32, f32);

#[derive(Debug, Clone, Copy)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource_name(self) -> &'static str {
        match self {
            Self::Regular => "F1",
            Self::Bold => "F2",
        }
    }
}

/// Rough Helvetica advance estimate, used for centering and line wrapping.
/// Builtin Type1 fonts ship no metrics with the document, so an average
/// glyph width of half the font size has to do.
fn estimate_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.5
}

/// Split `text` into lines that fit `width` at the given font size.
fn wrap_text(text: &str, size: f32, width: f32) -> Vec<String> {
    let max_chars = ((width / (size * 0.5)) as usize).max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Encode text for the WinAnsi (CP1252) encoding used by both fonts.
/// Unmappable characters degrade to '?'.
fn encode_winansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{0000}'..='\u{007E}' => c as u8,
            '\u{00A0}'..='\u{00FF}' => c as u32 as u8,
            '\u{2022}' => 0x95, // bullet
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2026}' => 0x85,
            _ => b'?',
        })
        .collect()
}

/// Accumulates content-stream operations, breaking pages as the cursor
/// runs off the bottom margin.
struct PdfBuilder {
    pages: Vec<Vec<Operation>>,
    current: Vec<Operation>,
    y: f32,
}

impl PdfBuilder {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Vec::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    /// Start a new page and reset the flow cursor.
    fn break_page(&mut self) {
        let ops = std::mem::take(&mut self.current);
        self.pages.push(ops);
        self.y = PAGE_HEIGHT - MARGIN;
    }

    /// Break the page if `height` does not fit above the bottom margin.
    fn ensure_room(&mut self, height: f32) {
        if self.y - height < MARGIN {
            self.break_page();
        }
    }

    fn advance(&mut self, height: f32) {
        self.y -= height;
    }

    /// Place one run of text with its baseline at `y`.
    fn text_at(&mut self, text: &str, font: Font, size: f32, x: f32, y: f32, color: Rgb) {
        self.current.push(Operation::new("BT", vec![]));
        self.current.push(Operation::new(
            "rg",
            vec![
                Object::Real(color.0),
                Object::Real(color.1),
                Object::Real(color.2),
            ],
        ));
        self.current.push(Operation::new(
            "Tf",
            vec![font.resource_name().into(), Object::Real(size)],
        ));
        self.current
            .push(Operation::new("Td", vec![Object::Real(x), Object::Real(y)]));
        self.current.push(Operation::new(
            "Tj",
            vec![Object::String(encode_winansi(text), StringFormat::Literal)],
        ));
        self.current.push(Operation::new("ET", vec![]));
    }

    /// Write one line at the cursor and advance by `leading`.
    fn text_line(&mut self, text: &str, font: Font, size: f32, x: f32, color: Rgb, leading: f32) {
        self.ensure_room(leading);
        let baseline = self.y - size;
        self.text_at(text, font, size, x, baseline, color);
        self.advance(leading);
    }

    /// Write a wrapped paragraph at the cursor.
    fn paragraph(&mut self, text: &str, x: f32, width: f32) {
        for line in wrap_text(text, BODY_SIZE, width) {
            self.text_line(&line, Font::Regular, BODY_SIZE, x, BLACK, BODY_LEADING);
        }
    }

    fn stroke_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.current.push(Operation::new(
            "RG",
            vec![
                Object::Real(GRID_GRAY),
                Object::Real(GRID_GRAY),
                Object::Real(GRID_GRAY),
            ],
        ));
        self.current
            .push(Operation::new("w", vec![Object::Real(0.5)]));
        self.current.push(Operation::new(
            "m",
            vec![Object::Real(x1), Object::Real(y1)],
        ));
        self.current.push(Operation::new(
            "l",
            vec![Object::Real(x2), Object::Real(y2)],
        ));
        self.current.push(Operation::new("S", vec![]));
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb) {
        self.current.push(Operation::new(
            "rg",
            vec![
                Object::Real(color.0),
                Object::Real(color.1),
                Object::Real(color.2),
            ],
        ));
        self.current.push(Operation::new(
            "re",
            vec![
                Object::Real(x),
                Object::Real(y),
                Object::Real(w),
                Object::Real(h),
            ],
        ));
        self.current.push(Operation::new("f", vec![]));
    }

    /// Draw one ruled table row at the cursor: optional cell fills, grid
    /// lines on all four sides, then the cell text.
    fn table_row(
        &mut self,
        widths: &[f32],
        cells: &[String],
        font: Font,
        text_color: Rgb,
        fills: &[Option<Rgb>],
    ) {
        self.ensure_room(ROW_HEIGHT);
        let top = self.y;
        let bottom = top - ROW_HEIGHT;
        let total_width: f32 = widths.iter().sum();

        let mut x = MARGIN;
        for (i, width) in widths.iter().enumerate() {
            if let Some(Some(fill)) = fills.get(i) {
                self.fill_rect(x, bottom, *width, ROW_HEIGHT, *fill);
            }
            x += width;
        }

        // Grid: horizontals plus a vertical at each column boundary.
        self.stroke_line(MARGIN, top, MARGIN + total_width, top);
        self.stroke_line(MARGIN, bottom, MARGIN + total_width, bottom);
        let mut x = MARGIN;
        self.stroke_line(x, bottom, x, top);
        for width in widths {
            x += width;
            self.stroke_line(x, bottom, x, top);
        }

        let baseline = top - ROW_HEIGHT + CELL_PADDING;
        let mut x = MARGIN;
        for (cell, width) in cells.iter().zip(widths) {
            self.text_at(cell, font, BODY_SIZE, x + CELL_PADDING, baseline, text_color);
            x += width;
        }

        self.advance(ROW_HEIGHT);
    }

    /// Assemble the accumulated pages into a PDF document.
    fn into_document(mut self) -> Result<Document, RenderError> {
        self.pages.push(std::mem::take(&mut self.current));

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_regular = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let font_bold = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_regular,
                "F2" => font_bold,
            },
        });

        let mut kids: Vec<Object> = Vec::new();
        for ops in self.pages {
            let content = Content { operations: ops };
            let encoded = content
                .encode()
                .map_err(|e| RenderError::Pdf(e.to_string()))?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "MediaBox" => vec![
                    0.into(),
                    0.into(),
                    Object::Real(PAGE_WIDTH),
                    Object::Real(PAGE_HEIGHT),
                ],
                "Resources" => resources_id,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        Ok(doc)
    }
}

fn section_heading(builder: &mut PdfBuilder, heading: &str) {
    builder.text_line(
        heading,
        Font::Bold,
        HEADING_SIZE,
        MARGIN,
        ACCENT,
        HEADING_SIZE + 12.0,
    );
}

fn write_recipe_section(
    builder: &mut PdfBuilder,
    recipe: &Recipe,
    instructions: Option<&Instructions>,
) {
    // Title, centered.
    let title_x = MARGIN + (CONTENT_WIDTH - estimate_width(&recipe.name, TITLE_SIZE)).max(0.0) / 2.0;
    builder.text_line(
        &recipe.name,
        Font::Bold,
        TITLE_SIZE,
        title_x,
        BLACK,
        TITLE_SIZE + 30.0,
    );

    // Recipe information.
    for (label, value) in info_rows(recipe) {
        builder.table_row(
            &INFO_WIDTHS,
            &[label, value],
            Font::Regular,
            BLACK,
            &[Some(LABEL_FILL), None],
        );
    }
    builder.advance(20.0);

    // Ingredients.
    section_heading(builder, HEADING_INGREDIENTS);
    let header: Vec<String> = INGREDIENT_COLUMNS.iter().map(|c| c.to_string()).collect();
    builder.table_row(
        &INGREDIENT_WIDTHS,
        &header,
        Font::Bold,
        WHITE,
        &[Some(ACCENT); 4],
    );
    for ing in &recipe.data.ingredients {
        builder.table_row(
            &INGREDIENT_WIDTHS,
            &[
                ing.ingredient.to_uppercase(),
                ing.recipe_amount.to_uppercase(),
                format_currency(ing.unit_cost),
                format_currency(ing.total_cost),
            ],
            Font::Regular,
            BLACK,
            &[None; 4],
        );
    }
    builder.advance(20.0);

    let Some(instructions) = instructions else {
        return;
    };

    section_heading(builder, HEADING_PREPARATION);
    for (i, step) in instructions.preparation_steps.iter().enumerate() {
        builder.paragraph(&format!("{}. {}", i + 1, step), MARGIN, CONTENT_WIDTH);
    }
    builder.advance(20.0);

    section_heading(builder, HEADING_TIPS);
    for tip in &instructions.cooking_tips {
        builder.paragraph(&format!("\u{2022} {}", tip), MARGIN, CONTENT_WIDTH);
    }
    builder.advance(20.0);

    section_heading(builder, HEADING_TIMING);
    for (step, duration) in &instructions.timing {
        builder.paragraph(
            &format!("\u{2022} {}: {}", step, duration),
            MARGIN,
            CONTENT_WIDTH,
        );
    }
    builder.advance(20.0);

    section_heading(builder, HEADING_STORAGE);
    builder.paragraph(&instructions.storage, MARGIN, CONTENT_WIDTH);
    builder.advance(12.0);

    section_heading(builder, HEADING_SERVING);
    builder.paragraph(&instructions.serving, MARGIN, CONTENT_WIDTH);
}

/// Render the recipes to a PDF at `path`.
pub fn render_pdf(
    recipes: &[Recipe],
    instructions: &BTreeMap<String, Instructions>,
    path: &Path,
) -> Result<(), RenderError> {
    let mut builder = PdfBuilder::new();

    for (idx, recipe) in recipes.iter().enumerate() {
        if idx > 0 {
            builder.break_page();
        }
        tracing::debug!(recipe = %recipe.name, "Rendering PDF section");
        write_recipe_section(&mut builder, recipe, instructions.get(&recipe.name));
    }

    let mut doc = builder.into_document()?;
    doc.save(path).map_err(|e| RenderError::Pdf(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_text_respects_width() {
        let text = "one two three four five six seven eight nine ten";
        let lines = wrap_text(text, 11.0, 110.0);
        assert!(lines.len() > 1);
        let rejoined = lines.join(" ");
        assert_eq!(rejoined, text);
    }

    #[test]
    fn test_wrap_text_short_line_untouched() {
        let lines = wrap_text("short", 11.0, CONTENT_WIDTH);
        assert_eq!(lines, vec!["short"]);
    }

    #[test]
    fn test_encode_winansi_ascii_passthrough() {
        assert_eq!(encode_winansi("Servings: 4"), b"Servings: 4");
    }

    #[test]
    fn test_encode_winansi_bullet() {
        assert_eq!(encode_winansi("\u{2022} tip"), vec![0x95, b' ', b't', b'i', b'p']);
    }

    #[test]
    fn test_encode_winansi_unmappable_degrades() {
        assert_eq!(encode_winansi("\u{4E2D}"), b"?");
    }

    #[test]
    fn test_page_break_resets_cursor() {
        let mut builder = PdfBuilder::new();
        builder.advance(500.0);
        builder.break_page();
        assert_eq!(builder.y, PAGE_HEIGHT - MARGIN);
        assert_eq!(builder.pages.len(), 1);
    }

    #[test]
    fn test_ensure_room_breaks_at_bottom_margin() {
        let mut builder = PdfBuilder::new();
        builder.y = MARGIN + 10.0;
        builder.ensure_room(ROW_HEIGHT);
        assert_eq!(builder.pages.len(), 1);
        assert_eq!(builder.y, PAGE_HEIGHT - MARGIN);
    }
}
