//! Paragraph -> inline Markdown.

use std::collections::{HashMap, HashSet};

use tracing::debug;
use wordbook_docx::{EmbeddingShape, ImageRef, Paragraph, Run};
use wordbook_shared::{ConversionObserver, DropReason, MAX_HEADING_DEPTH, Outcome, Report, Stage};

/// Lookup from relationship id to the generated asset filename.
pub trait ImageResolver {
    fn resolve(&self, rel_id: &str) -> Option<&str>;
}

impl ImageResolver for HashMap<String, String> {
    fn resolve(&self, rel_id: &str) -> Option<&str> {
        self.get(rel_id).map(String::as_str)
    }
}

/// Everything the formatter needs besides the paragraph itself.
pub struct InlineContext<'a> {
    pub images: &'a dyn ImageResolver,
    /// Assets directory name, relative to the Markdown files.
    pub assets_dir: &'a str,
    pub observer: &'a dyn ConversionObserver,
}

/// Heading line: `#` repeated `depth` times, the title, a blank line.
/// `depth` is clamped to `1..=MAX_HEADING_DEPTH`.
pub fn render_heading(depth: u32, title: &str) -> String {
    let depth = depth.clamp(1, MAX_HEADING_DEPTH) as usize;
    format!("{} {}\n\n", "#".repeat(depth), title.trim())
}

/// Render a paragraph. `heading_depth` is set when the paragraph was
/// classified as a heading.
pub fn render_paragraph(
    paragraph: &Paragraph,
    heading_depth: Option<u32>,
    ctx: &InlineContext<'_>,
) -> String {
    let text = paragraph.text();

    if text.trim().is_empty() {
        let images = image_tags(paragraph, ctx);
        if images.is_empty() {
            return "\n".to_string();
        }
        return format!("{images}\n\n");
    }

    if let Some(depth) = heading_depth {
        return render_heading(depth, &text);
    }

    let mut out: String = paragraph.runs.iter().map(format_run).collect();
    out.push_str(&image_tags(paragraph, ctx));
    out.push_str("\n\n");
    out
}

fn format_run(run: &Run) -> String {
    let mut text = run.text.clone();
    if text.is_empty() {
        return text;
    }
    if run.bold {
        text = format!("**{text}**");
    }
    if run.italic {
        text = format!("*{text}*");
    }
    if run.underline {
        text = format!("<u>{text}</u>");
    }
    text
}

/// Image tags for every distinct relationship id the paragraph embeds.
fn image_tags(paragraph: &Paragraph, ctx: &InlineContext<'_>) -> String {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = String::new();

    for run in &paragraph.runs {
        let has_drawing = run
            .images
            .iter()
            .any(|r| r.shape == EmbeddingShape::Drawing);

        let candidates = run.images.iter().filter(|r| match r.shape {
            EmbeddingShape::Drawing => true,
            // Blips of a drawing-bearing run belong to the drawing.
            EmbeddingShape::BareEmbed => !has_drawing,
            EmbeddingShape::LegacyPicture => false,
        });
        let legacy = run
            .images
            .iter()
            .filter(|r| r.shape == EmbeddingShape::LegacyPicture);

        for image in candidates.chain(legacy) {
            if !seen.insert(image.rel_id.as_str()) {
                continue;
            }
            push_tag(&mut out, image, ctx);
        }
    }
    out
}

fn push_tag(out: &mut String, image: &ImageRef, ctx: &InlineContext<'_>) {
    match ctx.images.resolve(&image.rel_id) {
        Some(filename) => {
            out.push_str(&format!("\n\n![image]({}/{filename})\n\n", ctx.assets_dir));
        }
        None => {
            debug!(rel_id = %image.rel_id, "image reference has no extracted asset");
            ctx.observer.report(Report::new(
                Stage::Inline,
                image.rel_id.clone(),
                Outcome::Dropped(DropReason::UnmappedImage),
            ));
        }
    }
}
