//! Body-level document model produced by the package reader.

/// A top-level node of the document body, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyElement {
    Paragraph(Paragraph),
    Table(Table),
}

/// A paragraph and the runs it is made of.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paragraph {
    /// Value of `w:pStyle`, if the paragraph has one.
    pub style_id: Option<String>,
    /// Display name of that style, resolved through the style sheet.
    pub style_name: Option<String>,
    pub runs: Vec<Run>,
}

impl Paragraph {
    /// Paragraph with one plain run and no style.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            runs: vec![Run::plain(text)],
            ..Self::default()
        }
    }

    /// Paragraph with one plain run and the given style name.
    pub fn styled(style: impl Into<String>, text: impl Into<String>) -> Self {
        let style = style.into();
        Self {
            style_id: Some(style.replace(' ', "")),
            style_name: Some(style),
            runs: vec![Run::plain(text)],
        }
    }

    /// Concatenated text of all runs.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// The style identity used for heading detection: the resolved style name,
    /// falling back to the raw style id.
    pub fn style_identity(&self) -> Option<&str> {
        self.style_name.as_deref().or(self.style_id.as_deref())
    }
}

/// A run of uniformly formatted text, possibly carrying embedded images.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    /// Image references found anywhere inside the run.
    pub images: Vec<ImageRef>,
}

impl Run {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

/// How an image reference was embedded in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmbeddingShape {
    /// `a:blip` inside a `w:drawing` wrapper.
    Drawing,
    /// `a:blip` with no surrounding drawing.
    BareEmbed,
    /// `v:imagedata` inside a legacy `w:pict`.
    LegacyPicture,
}

/// A reference from a run to an image part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// Relationship id (`r:embed` / `r:id`).
    pub rel_id: String,
    pub shape: EmbeddingShape,
}

impl ImageRef {
    pub fn new(rel_id: impl Into<String>, shape: EmbeddingShape) -> Self {
        Self {
            rel_id: rel_id.into(),
            shape,
        }
    }
}

/// A table as rows of cell texts. A cell's text is its paragraphs joined by
/// `\n`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn from_strs(rows: &[&[&str]]) -> Self {
        Self {
            rows: rows
                .iter()
                .map(|row| row.iter().map(|c| (*c).to_string()).collect())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraph_text_concatenates_runs() {
        let para = Paragraph {
            runs: vec![Run::plain("Hello, "), Run::plain("world")],
            ..Paragraph::default()
        };
        assert_eq!(para.text(), "Hello, world");
    }

    #[test]
    fn style_identity_prefers_name() {
        let mut para = Paragraph::styled("Heading 2", "Setup");
        assert_eq!(para.style_identity(), Some("Heading 2"));
        para.style_name = None;
        assert_eq!(para.style_identity(), Some("Heading2"));
    }
}
