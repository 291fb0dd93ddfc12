//! Renders a customer's transaction table as a paginated Letter PDF.
//!
//! Every page carries the bank header, optional logo and support footer. The transaction
//! table flows down the page and breaks onto a new page, with the column header repeated,
//! whenever the cursor would cross into the bottom margin.

use crate::model::{
    format_amount, ColumnMap, CustomerMetadata, Period, TransactionRow, TransactionTable,
};
use crate::{Config, Result};
use anyhow::{bail, Context};
use printpdf::image_crate::codecs::jpeg::JpegDecoder;
use printpdf::image_crate::codecs::png::PngDecoder;
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Point,
};
use std::fs::File;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, warn};

const STATEMENT_TITLE: &str = "Monthly Bank Statement";
const NOTE_TEXT: &str = "Note: This statement is computer generated.";

// Letter, in millimeters.
const PAGE_WIDTH: f32 = 215.9;
const PAGE_HEIGHT: f32 = 279.4;
const MARGIN_LEFT: f32 = 12.7;
const CONTENT_TOP: f32 = 250.0;
const CONTENT_BOTTOM: f32 = 25.4;
const HEADER_BASELINE: f32 = 262.0;
const FOOTER_BASELINE: f32 = 10.6;

const LOGO_X: f32 = 175.0;
const LOGO_Y: f32 = 258.5;
const LOGO_WIDTH: f32 = 28.2;
const LOGO_DPI: f32 = 300.0;

const TITLE_SIZE: f32 = 18.0;
const HEADER_SIZE: f32 = 14.0;
const HEADING_SIZE: f32 = 12.0;
const BODY_SIZE: f32 = 10.0;
const TABLE_HEADER_SIZE: f32 = 9.0;
const TABLE_SIZE: f32 = 8.0;
const FOOTER_SIZE: f32 = 8.0;

const TITLE_STEP: f32 = 9.0;
const LINE_STEP: f32 = 5.3;
const ROW_STEP: f32 = 4.2;
const HEADER_STEP: f32 = 6.0;
const SECTION_GAP: f32 = 4.0;

const COL_DATE_X: f32 = 12.7;
const COL_DESC_X: f32 = 40.6;
const COL_AMOUNT_RIGHT: f32 = 165.1;
const COL_BALANCE_RIGHT: f32 = 203.2;
const DESC_MAX_WIDTH: f32 = 95.0;
const DESCRIPTION_MAX_CHARS: usize = 120;

const PT_TO_MM: f32 = 0.352_778;

/// Renders the statement PDF and returns its bytes. The `logo` bytes, when given, must be a
/// PNG or JPEG image; a logo that fails to decode is dropped with a warning rather than
/// failing the statement.
pub(crate) fn render(
    config: &Config,
    period: Period,
    metadata: &CustomerMetadata,
    table: &TransactionTable,
    logo: Option<&[u8]>,
) -> Result<Vec<u8>> {
    let (document, page, layer) = PdfDocument::new(
        format!("{STATEMENT_TITLE} {period}"),
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Layer 1",
    );
    let fonts = Fonts::load(&document, config.font_path())?;
    let layer = document.get_page(page).get_layer(layer);
    let mut writer = StatementWriter::new(document, layer, fonts, config, logo);

    writer.title(STATEMENT_TITLE);
    writer.body_line(&format!("Account Holder: {}", metadata.name()));
    writer.body_line(&format!("Account No: {}", metadata.account()));
    writer.body_line(&format!("Statement Period: {period}"));
    writer.gap();

    writer.heading("Summary");
    for line in table.summary().lines() {
        writer.body_line(&line);
    }
    writer.gap();

    writer.table_header();
    let columns = table.columns();
    for row in table.rows() {
        if writer.needs_break(ROW_STEP) {
            writer.break_page();
            writer.table_header();
        }
        writer.table_row(columns, row);
    }

    if writer.needs_break(LINE_STEP + SECTION_GAP) {
        writer.break_page();
    }
    writer.gap();
    writer.note_line(NOTE_TEXT);

    debug!("Rendered statement with {} page(s)", writer.pages());
    writer.finish()
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Fonts {
    fn load(document: &PdfDocumentReference, font_path: Option<&Path>) -> Result<Self> {
        let bold = document
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .context("Failed to load the builtin bold font")?;
        let regular = match font_path.and_then(|path| external_font(document, path)) {
            Some(font) => font,
            None => document
                .add_builtin_font(BuiltinFont::Helvetica)
                .context("Failed to load the builtin font")?,
        };
        Ok(Self { regular, bold })
    }
}

fn external_font(document: &PdfDocumentReference, path: &Path) -> Option<IndirectFontRef> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            warn!(
                "Falling back to the builtin font, cannot open {}: {e}",
                path.display()
            );
            return None;
        }
    };
    match document.add_external_font(file) {
        Ok(font) => Some(font),
        Err(e) => {
            warn!(
                "Falling back to the builtin font, cannot load {}: {e}",
                path.display()
            );
            None
        }
    }
}

struct StatementWriter<'a> {
    document: PdfDocumentReference,
    layer: PdfLayerReference,
    fonts: Fonts,
    bank_name: &'a str,
    support_contact: &'a str,
    logo: Option<&'a [u8]>,
    logo_broken: bool,
    cursor: f32,
    pages: usize,
}

impl<'a> StatementWriter<'a> {
    fn new(
        document: PdfDocumentReference,
        layer: PdfLayerReference,
        fonts: Fonts,
        config: &'a Config,
        logo: Option<&'a [u8]>,
    ) -> Self {
        let mut writer = Self {
            document,
            layer,
            fonts,
            bank_name: config.bank_name(),
            support_contact: config.support_contact(),
            logo,
            logo_broken: false,
            cursor: CONTENT_TOP,
            pages: 1,
        };
        writer.decorate_page();
        writer
    }

    fn pages(&self) -> usize {
        self.pages
    }

    fn finish(self) -> Result<Vec<u8>> {
        self.document
            .save_to_bytes()
            .context("Failed to serialize the statement PDF")
    }

    /// Bank header, logo and support footer, drawn on every page.
    fn decorate_page(&mut self) {
        self.layer.use_text(
            self.bank_name,
            HEADER_SIZE,
            Mm(MARGIN_LEFT),
            Mm(HEADER_BASELINE),
            &self.fonts.bold,
        );
        self.draw_logo();
        self.rule(CONTENT_TOP + 4.0);
        let footer = format!(
            "This is a system generated statement. For queries contact {}",
            self.support_contact
        );
        self.layer.use_text(
            footer,
            FOOTER_SIZE,
            Mm(MARGIN_LEFT),
            Mm(FOOTER_BASELINE),
            &self.fonts.regular,
        );
    }

    fn draw_logo(&mut self) {
        let Some(bytes) = self.logo else {
            return;
        };
        if self.logo_broken {
            return;
        }
        match decode_logo(bytes) {
            Ok(image) => {
                let width_px = image.image.width.0 as f32;
                let native_width = width_px * 25.4 / LOGO_DPI;
                let scale = if native_width > 0.0 {
                    LOGO_WIDTH / native_width
                } else {
                    1.0
                };
                image.add_to_layer(
                    self.layer.clone(),
                    ImageTransform {
                        translate_x: Some(Mm(LOGO_X)),
                        translate_y: Some(Mm(LOGO_Y)),
                        scale_x: Some(scale),
                        scale_y: Some(scale),
                        dpi: Some(LOGO_DPI),
                        ..Default::default()
                    },
                );
            }
            Err(e) => {
                warn!("Skipping the statement logo: {e:#}");
                self.logo_broken = true;
            }
        }
    }

    fn break_page(&mut self) {
        let (page, layer) = self
            .document
            .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        self.layer = self.document.get_page(page).get_layer(layer);
        self.cursor = CONTENT_TOP;
        self.pages += 1;
        self.decorate_page();
    }

    fn needs_break(&self, step: f32) -> bool {
        self.cursor - step < CONTENT_BOTTOM
    }

    fn gap(&mut self) {
        self.cursor -= SECTION_GAP;
    }

    fn title(&mut self, text: &str) {
        self.cursor -= TITLE_STEP;
        self.text_at(text, COL_DATE_X, TITLE_SIZE, true);
    }

    fn heading(&mut self, text: &str) {
        self.cursor -= HEADER_STEP;
        self.text_at(text, COL_DATE_X, HEADING_SIZE, true);
    }

    fn body_line(&mut self, text: &str) {
        self.cursor -= LINE_STEP;
        self.text_at(text, COL_DATE_X, BODY_SIZE, false);
    }

    fn note_line(&mut self, text: &str) {
        self.cursor -= LINE_STEP;
        self.text_at(text, COL_DATE_X, FOOTER_SIZE, false);
    }

    fn table_header(&mut self) {
        self.cursor -= HEADER_STEP;
        self.text_at("Date", COL_DATE_X, TABLE_HEADER_SIZE, true);
        self.text_at("Description", COL_DESC_X, TABLE_HEADER_SIZE, true);
        self.text_right("Amount", COL_AMOUNT_RIGHT, TABLE_HEADER_SIZE, true);
        self.text_right("Balance", COL_BALANCE_RIGHT, TABLE_HEADER_SIZE, true);
        self.rule(self.cursor - 1.5);
    }

    fn table_row(&mut self, columns: &ColumnMap, row: &TransactionRow) {
        self.cursor -= ROW_STEP;
        let date = row
            .date()
            .map(|ts| ts.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let description = row.text(columns.description());
        let description = fit_text(
            truncate_chars(&description, DESCRIPTION_MAX_CHARS),
            TABLE_SIZE,
            DESC_MAX_WIDTH,
        );
        let amount = money_text(row, columns.amount());
        let balance = money_text(row, columns.balance());
        self.text_at(&date, COL_DATE_X, TABLE_SIZE, false);
        self.text_at(&description, COL_DESC_X, TABLE_SIZE, false);
        self.text_right(&amount, COL_AMOUNT_RIGHT, TABLE_SIZE, false);
        self.text_right(&balance, COL_BALANCE_RIGHT, TABLE_SIZE, false);
    }

    fn text_at(&self, text: &str, x: f32, size: f32, bold: bool) {
        let font = if bold { &self.fonts.bold } else { &self.fonts.regular };
        self.layer.use_text(text, size, Mm(x), Mm(self.cursor), font);
    }

    fn text_right(&self, text: &str, right_edge: f32, size: f32, bold: bool) {
        let x = right_edge - text_width_mm(text, size);
        self.text_at(text, x, size, bold);
    }

    fn rule(&self, y: f32) {
        let line = Line {
            points: vec![
                (Point::new(Mm(MARGIN_LEFT), Mm(y)), false),
                (Point::new(Mm(COL_BALANCE_RIGHT), Mm(y)), false),
            ],
            is_closed: false,
        };
        self.layer.set_outline_thickness(0.3);
        self.layer.add_line(line);
    }
}

fn decode_logo(bytes: &[u8]) -> Result<Image> {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        let decoder = PngDecoder::new(Cursor::new(bytes)).context("Bad PNG logo")?;
        return Image::try_from(decoder).context("Failed to decode the PNG logo");
    }
    if bytes.starts_with(&[0xff, 0xd8]) {
        let decoder = JpegDecoder::new(Cursor::new(bytes)).context("Bad JPEG logo")?;
        return Image::try_from(decoder).context("Failed to decode the JPEG logo");
    }
    bail!("The logo must be a PNG or JPEG image")
}

fn money_text(row: &TransactionRow, column: &str) -> String {
    match row.decimal(column) {
        Some(value) => format_amount(value),
        None => row.text(column),
    }
}

/// Cuts `text` to at most `max_chars` characters.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

/// Cuts `text` to the characters that fit within `max_width` millimeters.
fn fit_text(text: &str, size: f32, max_width: f32) -> String {
    let mut out = String::new();
    let mut width = 0.0;
    for c in text.chars() {
        let advance = char_width_units(c) / 1000.0 * size * PT_TO_MM;
        if width + advance > max_width {
            break;
        }
        width += advance;
        out.push(c);
    }
    out
}

fn text_width_mm(text: &str, size: f32) -> f32 {
    let units: f32 = text.chars().map(char_width_units).sum();
    units / 1000.0 * size * PT_TO_MM
}

/// Helvetica advance widths in font units. Close enough for right alignment and truncation
/// when an external font is in play.
fn char_width_units(c: char) -> f32 {
    match c {
        ',' | '.' | ' ' => 278.0,
        '-' => 333.0,
        'i' | 'l' | 'j' => 222.0,
        'f' | 't' | 'I' => 278.0,
        'm' | 'M' | 'W' | 'w' => 833.0,
        _ => 556.0,
    }
}
