//! Shared types, error model, and configuration for wordbook.
//!
//! This crate is the foundation depended on by all other wordbook crates.
//! It provides:
//! - [`WordbookError`] — the unified error type
//! - Domain types ([`TocEntry`], [`OutlineEntry`], [`BookMeta`])
//! - Configuration ([`AppConfig`], [`BookConfig`], config loading)
//! - The conversion observer hook ([`ConversionObserver`], [`Outcome`])
//! - Locale-dependent output strings ([`Labels`])

pub mod config;
pub mod error;
pub mod labels;
pub mod report;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BookConfig, DefaultsConfig, config_dir, config_file_path, init_config,
    load_config, load_config_from,
};
pub use error::{Result, WordbookError};
pub use labels::Labels;
pub use report::{
    ConversionObserver, DropReason, Fallback, Outcome, RecordingObserver, Report, SilentObserver,
    Stage,
};
pub use types::{BookMeta, MAX_HEADING_DEPTH, OutlineEntry, TocEntry};
