//! TOC builder: qualifying headings -> ordered [`TocEntry`] list.
//!
//! A heading qualifies when its depth is within the configured maximum and
//! its trimmed title is non-empty. Each distinct title gets one entry; a
//! repeated title resolves to the entry recorded first.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};
use wordbook_docx::BodyElement;
use wordbook_shared::{Fallback, Labels, Outcome, Stage, TocEntry};

use crate::heading::{BlockNode, classify};
use crate::session::ConversionSession;

/// Filename of the single entry used when a document has no qualifying heading.
pub const PLACEHOLDER_FILENAME: &str = "content.md";

const MAX_SLUG_CHARS: usize = 50;

static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s\x{4e00}-\x{9fff}-]").expect("valid regex"));
static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-\s]+").expect("valid regex"));

/// Where a qualifying heading landed in the TOC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TocSlot {
    /// A new entry was appended at this index.
    New(usize),
    /// The title was already recorded at this index.
    Existing(usize),
}

impl TocSlot {
    pub fn index(self) -> usize {
        match self {
            TocSlot::New(i) | TocSlot::Existing(i) => i,
        }
    }
}

/// Incremental TOC construction over classified nodes in document order.
#[derive(Debug, Clone)]
pub struct TocBuilder {
    max_depth: u32,
    entries: Vec<TocEntry>,
    by_title: HashMap<String, usize>,
}

impl TocBuilder {
    pub fn new(max_depth: u32) -> Self {
        Self {
            max_depth,
            entries: Vec::new(),
            by_title: HashMap::new(),
        }
    }

    /// Depth and title of a node that belongs in the TOC.
    pub fn qualifies<'n>(&self, node: &'n BlockNode<'_>) -> Option<(u32, &'n str)> {
        match node {
            BlockNode::Heading { depth, title, .. }
                if *depth <= self.max_depth && !title.is_empty() =>
            {
                Some((*depth, title.as_str()))
            }
            _ => None,
        }
    }

    /// Record a node. Returns `None` for nodes that do not qualify.
    pub fn observe(
        &mut self,
        node: &BlockNode<'_>,
        session: &mut ConversionSession<'_>,
    ) -> Option<TocSlot> {
        let (depth, title) = self.qualifies(node)?;

        if let Some(&index) = self.by_title.get(title) {
            return Some(TocSlot::Existing(index));
        }

        let filename = slug_filename(title, session);
        let index = self.entries.len();
        debug!(title, file = %filename, depth, "toc entry");
        self.entries.push(TocEntry::new(title, filename, depth));
        self.by_title.insert(title.to_string(), index);
        Some(TocSlot::New(index))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<TocEntry> {
        self.entries
    }
}

/// The entry that stands in for a document without qualifying headings.
pub fn placeholder_entry(labels: &Labels) -> TocEntry {
    TocEntry::new(labels.placeholder_title, PLACEHOLDER_FILENAME, 1)
}

/// TOC of a whole body; never empty.
#[instrument(skip_all, fields(elements = body.len(), max_depth = session.config().max_toc_level))]
pub fn build_toc(body: &[BodyElement], session: &mut ConversionSession<'_>) -> Vec<TocEntry> {
    let mut builder = TocBuilder::new(session.config().max_toc_level);
    for element in body {
        builder.observe(&classify(element), session);
    }
    if builder.is_empty() {
        return vec![placeholder_entry(session.labels())];
    }
    builder.into_entries()
}

/// Filesystem-safe `.md` filename for a heading title.
pub fn slug_filename(title: &str, session: &mut ConversionSession<'_>) -> String {
    let cleaned = DISALLOWED.replace_all(title, "");
    let collapsed = SEPARATORS.replace_all(&cleaned, "-");
    let mut slug = collapsed.trim_matches('-').to_lowercase();

    if slug.chars().count() < 2 {
        slug = format!("chapter-{}", session.next_chapter());
        session.report(
            Stage::Toc,
            title,
            Outcome::FallbackSynthesized(Fallback::ChapterName),
        );
    }

    if slug.chars().count() > MAX_SLUG_CHARS {
        slug = slug.chars().take(MAX_SLUG_CHARS).collect();
    }
    format!("{slug}.md")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wordbook_docx::{Paragraph, Table};
    use wordbook_shared::{BookConfig, RecordingObserver};

    fn config(max: u32) -> BookConfig {
        BookConfig::new("T", "D", "en", max, "out", "assets").unwrap()
    }

    fn slug(title: &str) -> String {
        let config = config(3);
        let observer = RecordingObserver::new();
        let mut session = ConversionSession::new(&config, &observer);
        slug_filename(title, &mut session)
    }

    #[test]
    fn slugs_are_lowercase_and_hyphenated() {
        assert_eq!(slug("Intro"), "intro.md");
        assert_eq!(slug("Getting Started: The Basics!"), "getting-started-the-basics.md");
        assert_eq!(slug("  a -- b  "), "a-b.md");
        assert_eq!(slug("snake_case stays"), "snake_case-stays.md");
    }

    #[test]
    fn cjk_titles_are_kept() {
        assert_eq!(slug("第一章 概述"), "第一章-概述.md");
        assert_eq!(slug("安装（Windows）"), "安装windows.md");
    }

    #[test]
    fn unusable_titles_become_numbered_chapters() {
        let config = config(3);
        let observer = RecordingObserver::new();
        let mut session = ConversionSession::new(&config, &observer);
        assert_eq!(slug_filename("!!!", &mut session), "chapter-1.md");
        assert_eq!(slug_filename("A", &mut session), "chapter-2.md");
        assert_eq!(slug_filename("Ok", &mut session), "ok.md");
        assert_eq!(
            observer
                .with_outcome(&Outcome::FallbackSynthesized(Fallback::ChapterName))
                .len(),
            2
        );
    }

    #[test]
    fn long_titles_are_truncated_to_fifty_chars() {
        let title = "x".repeat(80);
        assert_eq!(slug(&title), format!("{}.md", "x".repeat(50)));
        let cjk = "长".repeat(60);
        assert_eq!(slug(&cjk).chars().count(), 53);
    }

    fn heading(depth: u32, text: &str) -> BodyElement {
        BodyElement::Paragraph(Paragraph::styled(format!("Heading {depth}"), text))
    }

    #[test]
    fn build_toc_keeps_headings_within_depth() {
        let config = config(2);
        let observer = RecordingObserver::new();
        let mut session = ConversionSession::new(&config, &observer);
        let body = vec![
            heading(1, "Intro"),
            BodyElement::Paragraph(Paragraph::plain("text")),
            heading(2, "Setup"),
            heading(3, "Details"),
            heading(1, "   "),
            BodyElement::Table(Table::from_strs(&[&["A"]])),
        ];

        let toc = build_toc(&body, &mut session);

        assert_eq!(
            toc,
            vec![
                TocEntry::new("Intro", "intro.md", 1),
                TocEntry::new("Setup", "setup.md", 2),
            ]
        );
    }

    #[test]
    fn build_toc_without_headings_yields_placeholder() {
        let config = BookConfig::new("T", "D", "zh-hans", 3, "out", "assets").unwrap();
        let observer = RecordingObserver::new();
        let mut session = ConversionSession::new(&config, &observer);
        let body = vec![BodyElement::Paragraph(Paragraph::plain("only text"))];

        let toc = build_toc(&body, &mut session);

        assert_eq!(toc, vec![TocEntry::new("文档内容", "content.md", 1)]);
    }

    #[test]
    fn repeated_titles_resolve_to_the_first_entry() {
        let config = config(3);
        let observer = RecordingObserver::new();
        let mut session = ConversionSession::new(&config, &observer);
        let mut builder = TocBuilder::new(3);

        let first = heading(1, "Notes");
        let again = heading(2, "Notes");
        assert_eq!(builder.observe(&classify(&first), &mut session), Some(TocSlot::New(0)));
        assert_eq!(
            builder.observe(&classify(&again), &mut session),
            Some(TocSlot::Existing(0))
        );
        assert_eq!(builder.into_entries().len(), 1);
    }
}
