//! Block model and page layout for the generated document.
//!
//! A composed document is an ordered list of [`Block`]s. The [`Renderer`]
//! streams them onto US-letter pages top-down with greedy word wrapping.
//! Text metrics use an average-character-width heuristic instead of real
//! font metrics: the output only has to be a well-formed, realistically
//! sized PDF, not typographically exact.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use super::PdfError;

/// US-letter page geometry, in points.
pub const PAGE_WIDTH: f64 = 612.0;
pub const PAGE_HEIGHT: f64 = 792.0;
pub const MARGIN_LEFT: f64 = 72.0;
pub const MARGIN_RIGHT: f64 = 72.0;
pub const MARGIN_TOP: f64 = 72.0;
pub const MARGIN_BOTTOM: f64 = 18.0;

/// Usable width between the side margins.
pub const CONTENT_WIDTH: f64 = PAGE_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;

const TITLE_SIZE: f64 = 24.0;
const SUBTITLE_SIZE: f64 = 18.0;
const HEADING_SIZE: f64 = 16.0;
const BODY_SIZE: f64 = 10.0;
const TABLE_HEADER_SIZE: f64 = 9.0;
const TABLE_BODY_SIZE: f64 = 10.0;

const TITLE_SPACE_AFTER: f64 = 30.0;
const HEADING_SPACE_AFTER: f64 = 12.0;

/// Line height as a multiple of the font size.
const LEADING: f64 = 1.2;

/// Average glyph width as a fraction of the font size. Close enough for
/// Helvetica body text.
const AVG_CHAR_WIDTH: f64 = 0.5;

const CELL_PADDING_X: f64 = 6.0;
const CELL_PADDING_Y: f64 = 3.0;
const HEADER_BOTTOM_PADDING: f64 = 12.0;

type Rgb = (f32, f32, f32);

const BLACK: Rgb = (0.0, 0.0, 0.0);
const DARK_BLUE: Rgb = (0.0, 0.0, 0.545);
const DARK_RED: Rgb = (0.545, 0.0, 0.0);
const GREY: Rgb = (0.5, 0.5, 0.5);
const WHITESMOKE: Rgb = (0.961, 0.961, 0.961);
const BEIGE: Rgb = (0.961, 0.961, 0.863);

/// One renderable unit of the document.
#[derive(Debug, Clone)]
pub enum Block {
    /// Document title, 24pt bold dark blue.
    Title(String),
    /// Title-page subtitle, 18pt bold, centered.
    Subtitle(String),
    /// Title-page description line, body text.
    Tagline(String),
    /// Cycle-labeled section heading, 16pt bold dark red.
    Heading(String),
    /// Expanded content paragraph, body text.
    Paragraph(String),
    /// Free-running narrative block, body text.
    Narrative(String),
    /// Fixed-schema statistics table.
    Table(StatsTable),
    /// Vertical gap, in points.
    Spacer(f64),
    /// Hard page break.
    PageBreak,
}

/// Table block: one header row plus data rows, all the same arity.
#[derive(Debug, Clone)]
pub struct StatsTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Ordered block sequence with the counting helpers summaries and tests
/// rely on.
#[derive(Debug, Clone, Default)]
pub struct DocumentPlan {
    pub blocks: Vec<Block>,
}

impl DocumentPlan {
    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Number of expanded content paragraphs. Headings, narratives and the
    /// title block are not counted.
    pub fn paragraph_count(&self) -> usize {
        self.count(|b| matches!(b, Block::Paragraph(_)))
    }

    pub fn heading_count(&self) -> usize {
        self.count(|b| matches!(b, Block::Heading(_)))
    }

    pub fn table_count(&self) -> usize {
        self.count(|b| matches!(b, Block::Table(_)))
    }

    pub fn narrative_count(&self) -> usize {
        self.count(|b| matches!(b, Block::Narrative(_)))
    }

    fn count(&self, pred: impl Fn(&Block) -> bool) -> usize {
        self.blocks.iter().filter(|b| pred(b)).count()
    }
}

#[derive(Debug, Clone, Copy)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource_name(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

/// Estimated width of `text` at `size` points.
fn text_width(text: &str, size: f64) -> f64 {
    text.chars().count() as f64 * size * AVG_CHAR_WIDTH
}

/// Greedy word wrap against `max_width`. A word wider than the whole line
/// gets a line of its own and overflows the right margin.
pub fn wrap_text(text: &str, size: f64, max_width: f64) -> Vec<String> {
    let budget = (max_width / (size * AVG_CHAR_WIDTH)).floor() as usize;

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0usize;

    for word in text.split_whitespace() {
        let word_chars = word.chars().count();
        if current_chars == 0 {
            current.push_str(word);
            current_chars = word_chars;
        } else if current_chars + 1 + word_chars > budget {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_chars = word_chars;
        } else {
            current.push(' ');
            current.push_str(word);
            current_chars += 1 + word_chars;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

fn rgb_operands(color: Rgb) -> Vec<Object> {
    vec![
        Object::Real(color.0),
        Object::Real(color.1),
        Object::Real(color.2),
    ]
}

/// Streams blocks onto pages and assembles the finished document.
///
/// Pages share one resource dictionary (Helvetica and Helvetica-Bold as
/// standard Type1 fonts, nothing embedded) hung off the page-tree root.
pub struct Renderer {
    doc: Document,
    pages_id: ObjectId,
    resources_id: ObjectId,
    page_ids: Vec<ObjectId>,
    ops: Vec<Operation>,
    y: f64,
}

impl Renderer {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_regular = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let font_bold = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_regular,
                "F2" => font_bold,
            },
        });

        Self {
            doc,
            pages_id,
            resources_id,
            page_ids: Vec::new(),
            ops: Vec::new(),
            y: PAGE_HEIGHT - MARGIN_TOP,
        }
    }

    /// Pages flushed so far, counting the one in progress.
    pub fn page_count(&self) -> usize {
        self.page_ids.len() + usize::from(!self.ops.is_empty())
    }

    pub fn render_block(&mut self, block: &Block) -> Result<(), PdfError> {
        match block {
            Block::Title(text) => self.text_block(
                text,
                Font::Bold,
                TITLE_SIZE,
                DARK_BLUE,
                TITLE_SPACE_AFTER,
                false,
            ),
            Block::Subtitle(text) => {
                self.text_block(text, Font::Bold, SUBTITLE_SIZE, BLACK, 0.0, true)
            }
            Block::Tagline(text) | Block::Paragraph(text) | Block::Narrative(text) => {
                self.text_block(text, Font::Regular, BODY_SIZE, BLACK, 0.0, false)
            }
            Block::Heading(text) => self.text_block(
                text,
                Font::Bold,
                HEADING_SIZE,
                DARK_RED,
                HEADING_SPACE_AFTER,
                false,
            ),
            Block::Table(table) => self.table_block(table),
            Block::Spacer(height) => {
                self.y -= height;
                Ok(())
            }
            Block::PageBreak => self.flush_page(),
        }
    }

    /// Finalize the document: flush the trailing page, build the page tree
    /// and catalog, compress content streams.
    pub fn finish(mut self) -> Result<Document, PdfError> {
        if !self.ops.is_empty() {
            self.flush_page()?;
        }

        let kids: Vec<Object> = self
            .page_ids
            .iter()
            .map(|id| Object::Reference(*id))
            .collect();
        let count = self.page_ids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => self.resources_id,
                "MediaBox" => vec![
                    0.into(),
                    0.into(),
                    (PAGE_WIDTH as i64).into(),
                    (PAGE_HEIGHT as i64).into(),
                ],
            }),
        );

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc.compress();

        Ok(self.doc)
    }

    fn text_block(
        &mut self,
        text: &str,
        font: Font,
        size: f64,
        color: Rgb,
        space_after: f64,
        centered: bool,
    ) -> Result<(), PdfError> {
        let line_height = size * LEADING;

        for line in wrap_text(text, size, CONTENT_WIDTH) {
            if self.y - line_height < MARGIN_BOTTOM {
                self.flush_page()?;
            }
            self.y -= line_height;

            let x = if centered {
                MARGIN_LEFT + ((CONTENT_WIDTH - text_width(&line, size)) / 2.0).max(0.0)
            } else {
                MARGIN_LEFT
            };
            self.text_line(&line, font, size, color, x, self.y);
        }

        self.y -= space_after;
        Ok(())
    }

    fn text_line(&mut self, line: &str, font: Font, size: f64, color: Rgb, x: f64, y: f64) {
        self.ops.push(Operation::new("BT", vec![]));
        self.ops.push(Operation::new(
            "Tf",
            vec![font.resource_name().into(), real(size)],
        ));
        self.ops.push(Operation::new("rg", rgb_operands(color)));
        self.ops.push(Operation::new("Td", vec![real(x), real(y)]));
        self.ops
            .push(Operation::new("Tj", vec![Object::string_literal(line)]));
        self.ops.push(Operation::new("ET", vec![]));
    }

    fn table_block(&mut self, table: &StatsTable) -> Result<(), PdfError> {
        let header_height = TABLE_HEADER_SIZE * LEADING + CELL_PADDING_Y + HEADER_BOTTOM_PADDING;
        let row_height = TABLE_BODY_SIZE * LEADING + 2.0 * CELL_PADDING_Y;
        let total_height = header_height + table.rows.len() as f64 * row_height;

        // Tables are kept whole: break first if the page is nearly full.
        if self.y - total_height < MARGIN_BOTTOM {
            self.flush_page()?;
        }

        let widths = column_widths(table);
        let table_width: f64 = widths.iter().sum();
        let x0 = MARGIN_LEFT + ((CONTENT_WIDTH - table_width) / 2.0).max(0.0);
        let top = self.y;

        // Header row: grey fill, whitesmoke bold text sitting on the
        // bottom padding.
        self.fill_rect(x0, top - header_height, table_width, header_height, GREY);
        let baseline = top - header_height + HEADER_BOTTOM_PADDING;
        let mut x = x0;
        for (cell, width) in table.header.iter().zip(&widths) {
            self.cell_text(cell, Font::Bold, TABLE_HEADER_SIZE, WHITESMOKE, x, *width, baseline);
            x += width;
        }

        // Body rows: beige fill, centered black text.
        let mut row_top = top - header_height;
        for row in &table.rows {
            self.fill_rect(x0, row_top - row_height, table_width, row_height, BEIGE);
            let baseline = row_top - row_height + CELL_PADDING_Y;
            let mut x = x0;
            for (cell, width) in row.iter().zip(&widths) {
                self.cell_text(cell, Font::Regular, TABLE_BODY_SIZE, BLACK, x, *width, baseline);
                x += width;
            }
            row_top -= row_height;
        }

        self.grid(x0, top, &widths, header_height, row_height, table.rows.len());
        self.y = top - total_height;
        Ok(())
    }

    fn cell_text(
        &mut self,
        text: &str,
        font: Font,
        size: f64,
        color: Rgb,
        cell_x: f64,
        cell_width: f64,
        baseline: f64,
    ) {
        let x = cell_x + ((cell_width - text_width(text, size)) / 2.0).max(0.0);
        self.text_line(text, font, size, color, x, baseline);
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgb) {
        self.ops.push(Operation::new("rg", rgb_operands(color)));
        self.ops.push(Operation::new(
            "re",
            vec![real(x), real(y), real(width), real(height)],
        ));
        self.ops.push(Operation::new("f", vec![]));
    }

    fn grid(
        &mut self,
        x0: f64,
        top: f64,
        widths: &[f64],
        header_height: f64,
        row_height: f64,
        rows: usize,
    ) {
        let table_width: f64 = widths.iter().sum();
        let bottom = top - header_height - rows as f64 * row_height;

        self.ops.push(Operation::new("RG", rgb_operands(BLACK)));
        self.ops.push(Operation::new("w", vec![real(1.0)]));

        self.stroke_line(x0, top, x0 + table_width, top);
        let mut y = top - header_height;
        self.stroke_line(x0, y, x0 + table_width, y);
        for _ in 0..rows {
            y -= row_height;
            self.stroke_line(x0, y, x0 + table_width, y);
        }

        let mut x = x0;
        self.stroke_line(x, top, x, bottom);
        for width in widths {
            x += width;
            self.stroke_line(x, top, x, bottom);
        }
    }

    fn stroke_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.ops
            .push(Operation::new("m", vec![real(x1), real(y1)]));
        self.ops
            .push(Operation::new("l", vec![real(x2), real(y2)]));
        self.ops.push(Operation::new("S", vec![]));
    }

    fn flush_page(&mut self) -> Result<(), PdfError> {
        let operations = std::mem::take(&mut self.ops);
        let content = Content { operations };
        let stream_id = self
            .doc
            .add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "Contents" => stream_id,
        });
        self.page_ids.push(page_id);
        self.y = PAGE_HEIGHT - MARGIN_TOP;
        Ok(())
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a composed plan into a PDF document.
pub fn render(plan: &DocumentPlan) -> Result<Document, PdfError> {
    let mut renderer = Renderer::new();
    for block in &plan.blocks {
        renderer.render_block(block)?;
    }
    renderer.finish()
}

/// Per-column widths sized to the widest cell plus padding, scaled down
/// proportionally if the table would exceed the usable width.
fn column_widths(table: &StatsTable) -> Vec<f64> {
    let mut widths: Vec<f64> = table
        .header
        .iter()
        .map(|cell| text_width(cell, TABLE_HEADER_SIZE) + 2.0 * CELL_PADDING_X)
        .collect();

    for row in &table.rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(text_width(cell, TABLE_BODY_SIZE) + 2.0 * CELL_PADDING_X);
        }
    }

    let total: f64 = widths.iter().sum();
    if total > CONTENT_WIDTH {
        let scale = CONTENT_WIDTH / total;
        for width in &mut widths {
            *width *= scale;
        }
    }
    widths
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> StatsTable {
        StatsTable {
            header: vec!["A".to_string(), "B".to_string()],
            rows: vec![
                vec!["1".to_string(), "2".to_string()],
                vec!["3".to_string(), "4".to_string()],
            ],
        }
    }

    #[test]
    fn test_content_width() {
        assert_eq!(CONTENT_WIDTH, 468.0);
    }

    #[test]
    fn test_wrap_text_narrow_width() {
        let lines = wrap_text("alpha beta gamma delta", BODY_SIZE, 40.0);
        assert!(lines.len() >= 3);
        assert_eq!(lines[0], "alpha");
    }

    #[test]
    fn test_wrap_text_fits_one_line() {
        let lines = wrap_text("short text", BODY_SIZE, CONTENT_WIDTH);
        assert_eq!(lines, vec!["short text".to_string()]);
    }

    #[test]
    fn test_wrap_text_empty() {
        assert!(wrap_text("", BODY_SIZE, CONTENT_WIDTH).is_empty());
        assert!(wrap_text("   ", BODY_SIZE, CONTENT_WIDTH).is_empty());
    }

    #[test]
    fn test_wrap_text_overlong_word() {
        let word = "x".repeat(400);
        let lines = wrap_text(&word, BODY_SIZE, CONTENT_WIDTH);
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn test_plan_counts() {
        let mut plan = DocumentPlan::default();
        plan.push(Block::Title("t".to_string()));
        plan.push(Block::Heading("h".to_string()));
        plan.push(Block::Paragraph("p".to_string()));
        plan.push(Block::Paragraph("p".to_string()));
        plan.push(Block::Narrative("n".to_string()));
        plan.push(Block::Table(sample_table()));
        plan.push(Block::PageBreak);

        assert_eq!(plan.heading_count(), 1);
        assert_eq!(plan.paragraph_count(), 2);
        assert_eq!(plan.narrative_count(), 1);
        assert_eq!(plan.table_count(), 1);
    }

    #[test]
    fn test_render_empty_plan_has_no_pages() {
        let doc = render(&DocumentPlan::default()).unwrap();
        assert!(doc.get_pages().is_empty());
    }

    #[test]
    fn test_render_single_block_is_one_page() {
        let mut plan = DocumentPlan::default();
        plan.push(Block::Paragraph("hello world".to_string()));
        let doc = render(&plan).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_page_break_starts_new_page() {
        let mut plan = DocumentPlan::default();
        plan.push(Block::Paragraph("first".to_string()));
        plan.push(Block::PageBreak);
        plan.push(Block::Paragraph("second".to_string()));
        let doc = render(&plan).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn test_trailing_page_break_adds_no_blank_page() {
        let mut plan = DocumentPlan::default();
        plan.push(Block::Paragraph("only".to_string()));
        plan.push(Block::PageBreak);
        let doc = render(&plan).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_long_paragraph_spans_pages() {
        let mut plan = DocumentPlan::default();
        plan.push(Block::Paragraph("word ".repeat(4000)));
        let doc = render(&plan).unwrap();
        assert!(doc.get_pages().len() > 1);
    }

    #[test]
    fn test_table_fits_columns_in_content_width() {
        let widths = column_widths(&sample_table());
        assert_eq!(widths.len(), 2);
        assert!(widths.iter().sum::<f64>() <= CONTENT_WIDTH);
    }

    #[test]
    fn test_rendered_document_loads_back() {
        let mut plan = DocumentPlan::default();
        plan.push(Block::Heading("Heading".to_string()));
        plan.push(Block::Table(sample_table()));
        let mut doc = render(&plan).unwrap();

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        let reloaded = Document::load_mem(&buf).unwrap();
        assert_eq!(reloaded.get_pages().len(), 1);
    }
}
