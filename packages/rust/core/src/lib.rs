//! Conversion engine for wordbook.
//!
//! Ties together the package reader, the Markdown transcoders and the book
//! emitters into the end-to-end [`convert_document`] workflow:
//! assets -> classification -> TOC and segmentation -> assembly.

pub mod assembler;
pub mod assets;
pub mod heading;
pub mod pipeline;
pub mod segment;
pub mod session;
pub mod toc;

pub use assembler::{
    BookCheck, build_outline, ensure_clearable, prepare_output_dir, validate_book, write_sections,
};
pub use assets::{AssetTable, extract_assets, sniff_extension};
pub use heading::{BlockNode, classify, heading_depth};
pub use pipeline::{ConvertResult, Inspection, convert_document, convert_package, inspect_document};
pub use segment::{SectionBuffer, Segmentation, segment};
pub use session::ConversionSession;
pub use toc::{TocBuilder, TocSlot, build_toc, slug_filename};
