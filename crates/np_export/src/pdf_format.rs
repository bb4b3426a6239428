use np_core::{AuthorPayout, Error, Result};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};
use std::borrow::Cow;

pub const TITLE: &str = "Payout Report";

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const LEFT: f32 = 10.0;
const TITLE_TOP: f32 = 10.0;
const FIRST_ROW_TOP: f32 = 20.0;
const ROW_STEP: f32 = 10.0;
const BOTTOM_MARGIN: f32 = 10.0;
const TITLE_SIZE: f32 = 16.0;
const ROW_SIZE: f32 = 12.0;
const LAYER: &str = "Layer 1";
/// Windows-1252 code points in 0x80..=0x9F; builtin fonts encode nothing else outside Latin-1.
const WIN_ANSI_EXTRAS: &str = "€‚ƒ„…†‡ˆ‰Š‹ŒŽ‘’“”•–—˜™š›œžŸ";

pub fn report_line(payout: &AuthorPayout) -> String {
    format!(
        "Author: {} | Articles: {} | Total: ${}",
        payout.author, payout.article_count, payout.total_payout
    )
}

/// The title followed by one line per author, in input order.
pub fn report_lines(payouts: &[AuthorPayout]) -> Vec<String> {
    std::iter::once(TITLE.to_string())
        .chain(payouts.iter().map(report_line))
        .collect()
}

fn is_win_ansi(c: char) -> bool {
    matches!(c, ' '..='~' | '\u{A0}'..='\u{FF}') || WIN_ANSI_EXTRAS.contains(c)
}

/// Replaces characters the builtin fonts cannot draw with `?`.
pub fn encodable_text(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_win_ansi) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().map(|c| if is_win_ansi(c) { c } else { '?' }).collect())
    }
}

struct PageCursor {
    layer: PdfLayerReference,
    top: f32,
}

impl PageCursor {
    fn new_page(doc: &PdfDocumentReference) -> Self {
        let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER);
        Self {
            layer: doc.get_page(page).get_layer(layer),
            top: FIRST_ROW_TOP,
        }
    }

    fn write(&mut self, text: &str, size: f32, font: &IndirectFontRef) {
        // PDF coordinates grow upwards from the bottom edge.
        self.layer
            .use_text(text, size, Mm(LEFT), Mm(PAGE_HEIGHT - self.top), font);
    }
}

/// Renders the report as an A4 document, paging when rows run out of room.
pub fn to_pdf(payouts: &[AuthorPayout]) -> Result<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new(TITLE, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER);
    let font = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?;

    let mut cursor = PageCursor {
        layer: doc.get_page(page).get_layer(layer),
        top: TITLE_TOP,
    };
    cursor.write(TITLE, TITLE_SIZE, &font);
    cursor.top = FIRST_ROW_TOP;

    for payout in payouts {
        if cursor.top > PAGE_HEIGHT - BOTTOM_MARGIN {
            cursor = PageCursor::new_page(&doc);
        }
        let line = report_line(payout);
        let text = encodable_text(&line);
        if let Cow::Owned(_) = text {
            tracing::warn!("⚠️ Author {:?} has characters the PDF font cannot show, replaced with '?'", payout.author);
        }
        cursor.write(&text, ROW_SIZE, &font);
        cursor.top += ROW_STEP;
    }

    tracing::debug!("🧾 Rendered PDF report with {} rows", payouts.len());
    doc.save_to_bytes().map_err(pdf_error)
}

fn pdf_error(e: printpdf::Error) -> Error {
    Error::Export(format!("Failed to render PDF: {}", e))
}
