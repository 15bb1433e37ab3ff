//! Single-pass segmentation of the body into per-entry section buffers.

use tracing::{debug, instrument};
use wordbook_docx::BodyElement;
use wordbook_markdown::{ImageResolver, InlineContext, render_heading, render_paragraph, render_table};
use wordbook_shared::{DropReason, Fallback, Outcome, Stage, TocEntry};

use crate::heading::{BlockNode, classify};
use crate::session::ConversionSession;
use crate::toc::{TocBuilder, TocSlot, placeholder_entry};

/// Ordered Markdown fragments destined for one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionBuffer {
    fragments: Vec<String>,
}

impl SectionBuffer {
    pub fn push(&mut self, fragment: String) {
        self.fragments.push(fragment);
    }

    /// The buffer's file content.
    pub fn contents(&self) -> String {
        self.fragments.concat()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// TOC entries and their buffers; `sections[i]` belongs to `toc[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segmentation {
    pub toc: Vec<TocEntry>,
    pub sections: Vec<SectionBuffer>,
    /// The document had no qualifying heading and went to one placeholder file.
    pub single_file: bool,
}

/// Walk the body once, opening an entry per new qualifying heading and routing
/// every other node into the entry that is open.
///
/// Nodes before the first qualifying heading have no destination and are
/// dropped. A document with no qualifying heading at all becomes a single
/// placeholder entry holding every node.
#[instrument(skip_all, fields(elements = body.len()))]
pub fn segment(
    body: &[BodyElement],
    images: &dyn ImageResolver,
    session: &mut ConversionSession<'_>,
) -> Segmentation {
    let mut builder = TocBuilder::new(session.config().max_toc_level);
    let mut sections: Vec<SectionBuffer> = Vec::new();
    let mut current: Option<usize> = None;
    // Fragments seen before the first qualifying heading.
    let mut preamble: Vec<(usize, String)> = Vec::new();

    for (index, element) in body.iter().enumerate() {
        let node = classify(element);
        match builder.observe(&node, session) {
            Some(TocSlot::New(entry)) => {
                let (depth, title) = builder.qualifies(&node).unwrap_or_default();
                let mut buffer = SectionBuffer::default();
                buffer.push(render_heading(depth, title));
                sections.push(buffer);
                current = Some(entry);
                session.report(Stage::Segment, title, Outcome::Matched);
            }
            Some(TocSlot::Existing(entry)) => {
                let (depth, title) = builder.qualifies(&node).unwrap_or_default();
                sections[entry].push(render_heading(depth, title));
                current = Some(entry);
                debug!(title, entry, "repeated heading merged into earlier entry");
                session.report(Stage::Segment, title, Outcome::Merged { entry });
            }
            None => {
                let fragment = render_node(&node, images, session);
                match current {
                    Some(entry) => sections[entry].push(fragment),
                    None => preamble.push((index, fragment)),
                }
            }
        }
    }

    if builder.is_empty() {
        session.report(
            Stage::Segment,
            crate::toc::PLACEHOLDER_FILENAME,
            Outcome::FallbackSynthesized(Fallback::SingleFile),
        );
        let mut buffer = SectionBuffer::default();
        for (_, fragment) in preamble {
            buffer.push(fragment);
        }
        return Segmentation {
            toc: vec![placeholder_entry(session.labels())],
            sections: vec![buffer],
            single_file: true,
        };
    }

    for (index, _) in &preamble {
        session.report(
            Stage::Segment,
            format!("block {index}"),
            Outcome::Dropped(DropReason::PrecedesFirstHeading),
        );
    }
    if !preamble.is_empty() {
        debug!(dropped = preamble.len(), "content before first heading dropped");
    }

    Segmentation {
        toc: builder.into_entries(),
        sections,
        single_file: false,
    }
}

/// Markdown for a node that does not open or reopen an entry.
fn render_node(
    node: &BlockNode<'_>,
    images: &dyn ImageResolver,
    session: &ConversionSession<'_>,
) -> String {
    let ctx = InlineContext {
        images,
        assets_dir: &session.config().assets_dir,
        observer: session.observer(),
    };
    match node {
        BlockNode::Heading {
            depth, paragraph, ..
        } => render_paragraph(paragraph, Some(*depth), &ctx),
        BlockNode::Paragraph(paragraph) => render_paragraph(paragraph, None, &ctx),
        BlockNode::Table(table) => render_table(table),
    }
}
