//! Markdown rendering of document body nodes.
//!
//! Two transcoders, both pure apart from outcome reporting:
//! - [`render_paragraph`] turns a paragraph's runs into inline Markdown and
//!   appends image tags for the images the paragraph embeds
//! - [`render_table`] turns a table into a pipe table

mod inline;
mod table;

pub use inline::{ImageResolver, InlineContext, render_heading, render_paragraph};
pub use table::render_table;
