//! PDF emission via `printpdf` built-in fonts.

use std::io::BufWriter;

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument};

use crate::document::font_metrics::FontFace;
use crate::document::layout::{BlockKind, DocumentLayout, PageStyle};
use crate::document::DocumentBuildError;

/// One line of text with its final position on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub face: FontFace,
    pub size_pt: f32,
    /// Baseline height above the bottom page edge.
    pub y_mm: f32,
}

/// Distributes the layout's lines over pages, top to bottom.
///
/// A new page starts whenever the next baseline would drop below the bottom
/// margin. Titles and headings get half a line of extra space after them.
pub fn paginate(layout: &DocumentLayout, style: &PageStyle) -> Vec<Vec<PlacedLine>> {
    let top = style.page_height_mm - style.margin_mm;
    let mut pages: Vec<Vec<PlacedLine>> = vec![Vec::new()];
    let mut y = top;

    for block in &layout.blocks {
        let size_pt = block.size_pt(style);
        let advance = style.line_height_mm(size_pt);

        if block.kind == BlockKind::Heading || block.kind == BlockKind::Footer {
            y -= advance * 0.5;
        }

        for line in &block.lines {
            if y - advance < style.margin_mm {
                pages.push(Vec::new());
                y = top;
            }
            y -= advance;
            if let Some(page) = pages.last_mut() {
                page.push(PlacedLine {
                    text: line.clone(),
                    face: block.face(),
                    size_pt,
                    y_mm: y,
                });
            }
        }

        if block.kind == BlockKind::Title || block.kind == BlockKind::Heading {
            y -= advance * 0.5;
        }
    }

    pages
}

/// Replaces characters the PDF base fonts cannot show.
///
/// Base fonts carry WinAnsi glyphs only. Common typographic punctuation is
/// mapped to ASCII; other characters outside Latin-1, and control
/// characters, become `?`.
pub fn to_base_font_text(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2013}' | '\u{2014}' => '-',
            '\u{2022}' => '*',
            '\t' => ' ',
            c if (c as u32) < 0x20 || (0x7F..=0x9F).contains(&(c as u32)) => '?',
            c if (c as u32) > 0xFF => '?',
            c => c,
        })
        .collect()
}

fn font_error(e: printpdf::Error) -> DocumentBuildError {
    DocumentBuildError::Font(e.to_string())
}

/// Renders a laid-out document to PDF bytes in memory.
pub fn render_pdf(layout: &DocumentLayout, style: &PageStyle) -> Result<Vec<u8>, DocumentBuildError> {
    let width = Mm(style.page_width_mm);
    let height = Mm(style.page_height_mm);
    let (doc, first_page, first_layer) = PdfDocument::new(&layout.title, width, height, "Layer 1");

    let regular: IndirectFontRef = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(font_error)?;
    let bold: IndirectFontRef = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(font_error)?;

    for (index, page_lines) in paginate(layout, style).into_iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page, layer) = doc.add_page(width, height, "Layer 1");
            doc.get_page(page).get_layer(layer)
        };

        for line in page_lines {
            let font = match line.face {
                FontFace::Helvetica => &regular,
                FontFace::HelveticaBold => &bold,
            };
            layer.use_text(
                to_base_font_text(&line.text),
                line.size_pt,
                Mm(style.margin_mm),
                Mm(line.y_mm),
                font,
            );
        }
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| DocumentBuildError::Save(e.to_string()))?;
    buf.into_inner()
        .map_err(|e| DocumentBuildError::Save(e.to_string()))
}
