//! Block classification: which body nodes are headings, and how deep.

use std::sync::LazyLock;

use regex::Regex;
use wordbook_docx::{BodyElement, Paragraph, Table};
use wordbook_shared::MAX_HEADING_DEPTH;

static HEADING_LEVEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Heading\s*(\d+)").expect("valid regex"));

/// A body node after classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockNode<'a> {
    Heading {
        depth: u32,
        /// Trimmed paragraph text; may be empty.
        title: String,
        paragraph: &'a Paragraph,
    },
    Paragraph(&'a Paragraph),
    Table(&'a Table),
}

/// Heading depth for a paragraph style identity, or `None` when the style is
/// not a heading style.
///
/// The level is clamped to `1..=MAX_HEADING_DEPTH`; a level too large for
/// `u32` counts as the deepest level.
pub fn heading_depth(style: &str) -> Option<u32> {
    if !style.starts_with("Heading") {
        return None;
    }
    let depth = HEADING_LEVEL
        .captures(style)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().parse::<u32>().unwrap_or(u32::MAX))
        .unwrap_or(1);
    Some(depth.clamp(1, MAX_HEADING_DEPTH))
}

/// Classify one body element.
pub fn classify(element: &BodyElement) -> BlockNode<'_> {
    match element {
        BodyElement::Table(table) => BlockNode::Table(table),
        BodyElement::Paragraph(paragraph) => {
            match paragraph.style_identity().and_then(heading_depth) {
                Some(depth) => BlockNode::Heading {
                    depth,
                    title: paragraph.text().trim().to_string(),
                    paragraph,
                },
                None => BlockNode::Paragraph(paragraph),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_heading_styles() {
        assert_eq!(heading_depth("Heading 1"), Some(1));
        assert_eq!(heading_depth("Heading 3"), Some(3));
        assert_eq!(heading_depth("Heading9"), Some(9));
    }

    #[test]
    fn oversized_levels_saturate_at_the_deepest_level() {
        assert_eq!(heading_depth("Heading12"), Some(MAX_HEADING_DEPTH));
        assert_eq!(heading_depth("Heading 4000000000"), Some(MAX_HEADING_DEPTH));
        assert_eq!(heading_depth("Heading 99999999999"), Some(MAX_HEADING_DEPTH));
    }

    #[test]
    fn heading_without_number_defaults_to_one() {
        assert_eq!(heading_depth("Heading"), Some(1));
        assert_eq!(heading_depth("Heading Custom"), Some(1));
        assert_eq!(heading_depth("Heading 0"), Some(1));
    }

    #[test]
    fn other_styles_are_not_headings() {
        assert_eq!(heading_depth("Normal"), None);
        assert_eq!(heading_depth("Title"), None);
        assert_eq!(heading_depth("heading 1"), None);
        assert_eq!(heading_depth("标题 1"), None);
    }

    #[test]
    fn classify_uses_style_and_trims_title() {
        let element = BodyElement::Paragraph(Paragraph::styled("Heading 2", "  Setup  "));
        match classify(&element) {
            BlockNode::Heading { depth, title, .. } => {
                assert_eq!(depth, 2);
                assert_eq!(title, "Setup");
            }
            other => panic!("expected heading, got {other:?}"),
        }
    }

    #[test]
    fn classify_plain_paragraphs_and_tables() {
        let para = BodyElement::Paragraph(Paragraph::plain("hello"));
        assert!(matches!(classify(&para), BlockNode::Paragraph(_)));

        let table = BodyElement::Table(Table::from_strs(&[&["A"]]));
        assert!(matches!(classify(&table), BlockNode::Table(_)));
    }
}
