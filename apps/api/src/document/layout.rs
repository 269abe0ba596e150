//! Turns sectioned text into a flat list of styled, pre-wrapped blocks.
//!
//! Layout is kept apart from PDF emission so block structure can be checked
//! without decoding PDF bytes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::font_metrics::{get_metrics, FontFace};
use crate::document::sections::split_sections;

const PT_PER_MM: f32 = 72.0 / 25.4;

/// Page geometry and type sizes for generated documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageStyle {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub margin_mm: f32,
    pub title_size_pt: f32,
    pub heading_size_pt: f32,
    pub body_size_pt: f32,
    pub footer_size_pt: f32,
    /// Baseline-to-baseline distance as a multiple of the font size.
    pub line_spacing: f32,
}

/// A4 portrait, 20 mm margins, Helvetica 10 pt body.
pub fn default_page_style() -> PageStyle {
    PageStyle {
        page_width_mm: 210.0,
        page_height_mm: 297.0,
        margin_mm: 20.0,
        title_size_pt: 16.0,
        heading_size_pt: 12.0,
        body_size_pt: 10.0,
        footer_size_pt: 8.0,
        line_spacing: 1.4,
    }
}

impl PageStyle {
    pub fn text_width_mm(&self) -> f32 {
        self.page_width_mm - 2.0 * self.margin_mm
    }

    /// Usable line width in em units at `size_pt`.
    pub fn text_width_em(&self, size_pt: f32) -> f32 {
        self.text_width_mm() * PT_PER_MM / size_pt
    }

    /// Vertical advance per line at `size_pt`, in millimetres.
    pub fn line_height_mm(&self, size_pt: f32) -> f32 {
        size_pt * self.line_spacing / PT_PER_MM
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Title,
    Heading,
    Paragraph,
    Footer,
}

/// A run of already-wrapped lines sharing one style.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub kind: BlockKind,
    pub lines: Vec<String>,
}

impl Block {
    pub fn face(&self) -> FontFace {
        match self.kind {
            BlockKind::Title | BlockKind::Heading => FontFace::HelveticaBold,
            BlockKind::Paragraph | BlockKind::Footer => FontFace::Helvetica,
        }
    }

    pub fn size_pt(&self, style: &PageStyle) -> f32 {
        match self.kind {
            BlockKind::Title => style.title_size_pt,
            BlockKind::Heading => style.heading_size_pt,
            BlockKind::Paragraph => style.body_size_pt,
            BlockKind::Footer => style.footer_size_pt,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentLayout {
    pub title: String,
    pub blocks: Vec<Block>,
}

impl DocumentLayout {
    pub fn count(&self, kind: BlockKind) -> usize {
        self.blocks.iter().filter(|b| b.kind == kind).count()
    }
}

pub fn footer_text(generated_at: DateTime<Utc>) -> String {
    format!("Generated {} UTC", generated_at.format("%Y-%m-%d %H:%M"))
}

fn wrapped_block(kind: BlockKind, text: &str, style: &PageStyle) -> Block {
    let mut block = Block {
        kind,
        lines: Vec::new(),
    };
    let width = style.text_width_em(block.size_pt(style));
    block.lines = get_metrics(block.face()).wrap(text, width);
    block
}

/// Lays out `text` under `title`.
///
/// Output order: one title block, then for each section a heading block (when
/// the section has a heading) followed by one paragraph block per non-blank
/// body line, then one footer block. Empty text yields title and footer only.
pub fn layout(
    text: &str,
    title: &str,
    generated_at: DateTime<Utc>,
    style: &PageStyle,
) -> DocumentLayout {
    let mut blocks = vec![wrapped_block(BlockKind::Title, title, style)];

    for section in split_sections(text) {
        if let Some(heading) = &section.heading {
            blocks.push(wrapped_block(BlockKind::Heading, heading, style));
        }
        for line in section.body_lines.iter().filter(|l| !l.trim().is_empty()) {
            blocks.push(wrapped_block(BlockKind::Paragraph, line, style));
        }
    }

    blocks.push(wrapped_block(
        BlockKind::Footer,
        &footer_text(generated_at),
        style,
    ));

    DocumentLayout {
        title: title.to_string(),
        blocks,
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 9, 30, 0).unwrap()
    }

    fn kinds(layout: &DocumentLayout) -> Vec<BlockKind> {
        layout.blocks.iter().map(|b| b.kind).collect()
    }

    #[test]
    fn test_a4_text_width() {
        let style = default_page_style();
        assert!((style.text_width_mm() - 170.0).abs() < 1e-4);
        // 170 mm at 10 pt is a little over 48 em.
        let em = style.text_width_em(10.0);
        assert!(em > 48.0 && em < 48.3, "{em}");
    }

    #[test]
    fn test_empty_text_has_only_title_and_footer() {
        let layout = layout("", "Prior authorization", at(), &default_page_style());
        assert_eq!(kinds(&layout), vec![BlockKind::Title, BlockKind::Footer]);
    }

    #[test]
    fn test_no_markers_means_no_headings() {
        let layout = layout(
            "Plain answer without any structure.\nSecond line.",
            "T",
            at(),
            &default_page_style(),
        );
        assert_eq!(layout.count(BlockKind::Heading), 0);
        assert_eq!(layout.count(BlockKind::Paragraph), 2);
        assert_eq!(layout.blocks.first().unwrap().kind, BlockKind::Title);
        assert_eq!(layout.blocks.last().unwrap().kind, BlockKind::Footer);
    }

    #[test]
    fn test_each_marker_gives_one_heading_followed_by_its_body() {
        let text = "=== PATIENT ===\nName: Jan de Vries\n\n=== REQUEST ===\nType: MRI\nUrgency: High\n=== JUSTIFICATION ===";
        let layout = layout(text, "T", at(), &default_page_style());

        assert_eq!(layout.count(BlockKind::Heading), 3);
        assert_eq!(
            kinds(&layout),
            vec![
                BlockKind::Title,
                BlockKind::Heading,
                BlockKind::Paragraph,
                BlockKind::Heading,
                BlockKind::Paragraph,
                BlockKind::Paragraph,
                BlockKind::Heading,
                BlockKind::Footer,
            ]
        );
        assert_eq!(layout.blocks[1].lines, vec!["PATIENT"]);
        assert_eq!(layout.blocks[2].lines, vec!["Name: Jan de Vries"]);
        assert_eq!(layout.blocks[3].lines, vec!["REQUEST"]);
    }

    #[test]
    fn test_long_line_wraps_inside_one_paragraph() {
        let long = "word ".repeat(100);
        let layout = layout(&long, "T", at(), &default_page_style());
        assert_eq!(layout.count(BlockKind::Paragraph), 1);
        assert!(layout.blocks[1].lines.len() > 1);
    }

    #[test]
    fn test_footer_carries_timestamp() {
        let layout = layout("", "T", at(), &default_page_style());
        assert_eq!(
            layout.blocks.last().unwrap().lines,
            vec!["Generated 2024-03-05 09:30 UTC"]
        );
    }
}
