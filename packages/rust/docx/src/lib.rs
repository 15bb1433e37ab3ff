//! OOXML word-processing package reader.
//!
//! Opens a `.docx` container and exposes what the converter needs from it:
//! - the body as an ordered list of [`BodyElement`]s (paragraphs and tables),
//!   with paragraph styles resolved through `word/styles.xml`
//! - the main document's relationships and their binary parts, through the
//!   [`PartSource`] trait

mod body;
mod content_types;
mod model;
mod package;
mod parts;
mod styles;
mod xml;

#[cfg(any(test, feature = "fixture"))]
pub mod fixture;

pub use model::{BodyElement, EmbeddingShape, ImageRef, Paragraph, Run, Table};
pub use package::DocxPackage;
pub use parts::{MemoryParts, PartSource, Relationship};
pub use styles::StyleSheet;
