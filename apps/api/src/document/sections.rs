use serde::Serialize;

/// Token that marks a section header line in generated text.
pub const SECTION_MARKER: &str = "===";

/// One headed block of generated text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentSection {
    /// `None` only for text that precedes the first marker line.
    pub heading: Option<String>,
    pub body_lines: Vec<String>,
}

pub fn is_marker_line(line: &str) -> bool {
    line.contains(SECTION_MARKER)
}

/// Heading text of a marker line: every `=` removed, then trimmed.
pub fn heading_of(line: &str) -> String {
    line.replace('=', "").trim().to_string()
}

/// Splits generated text on marker lines.
///
/// Each marker line opens a section that collects the lines up to the next
/// marker. Lines before the first marker form a heading-less section, which
/// is dropped if it holds only blank lines. Body lines keep their text as-is
/// (minus trailing whitespace); blank lines are kept so callers can decide.
pub fn split_sections(text: &str) -> Vec<DocumentSection> {
    let mut sections = Vec::new();
    let mut current = DocumentSection {
        heading: None,
        body_lines: Vec::new(),
    };

    for line in text.lines() {
        if is_marker_line(line) {
            push_section(&mut sections, current);
            current = DocumentSection {
                heading: Some(heading_of(line)),
                body_lines: Vec::new(),
            };
        } else {
            current.body_lines.push(line.trim_end().to_string());
        }
    }
    push_section(&mut sections, current);

    sections
}

fn push_section(sections: &mut Vec<DocumentSection>, section: DocumentSection) {
    let is_blank_preamble =
        section.heading.is_none() && section.body_lines.iter().all(|l| l.trim().is_empty());
    if !is_blank_preamble {
        sections.push(section);
    }
}
