//! Core domain types shared between the conversion engine and the emitters.

use serde::{Deserialize, Serialize};

use crate::config::BookConfig;

/// Deepest heading level the converter distinguishes; Word's built-in
/// heading styles stop at 9.
pub const MAX_HEADING_DEPTH: u32 = 9;

// ---------------------------------------------------------------------------
// TocEntry
// ---------------------------------------------------------------------------

/// A single table-of-contents row; one entry is one output Markdown file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Display title (the heading text, trimmed).
    pub title: String,
    /// File name relative to the output root, e.g. `getting-started.md`.
    pub filename: String,
    /// 1-based heading depth, never above the configured maximum.
    pub depth: u32,
}

impl TocEntry {
    pub fn new(title: impl Into<String>, filename: impl Into<String>, depth: u32) -> Self {
        Self {
            title: title.into(),
            filename: filename.into(),
            depth,
        }
    }
}

// ---------------------------------------------------------------------------
// OutlineEntry
// ---------------------------------------------------------------------------

/// A TOC entry with its nested sub-entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineEntry {
    pub title: String,
    pub filename: String,
    pub depth: u32,
    /// Entries of greater depth that follow this one before the next sibling.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<OutlineEntry>,
}

impl From<&TocEntry> for OutlineEntry {
    fn from(entry: &TocEntry) -> Self {
        Self {
            title: entry.title.clone(),
            filename: entry.filename.clone(),
            depth: entry.depth,
            children: Vec::new(),
        }
    }
}

impl OutlineEntry {
    /// Number of entries in this subtree, including `self`.
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(OutlineEntry::len).sum::<usize>()
    }

    /// Always false; an outline entry counts itself.
    pub fn is_empty(&self) -> bool {
        false
    }
}

// ---------------------------------------------------------------------------
// BookMeta
// ---------------------------------------------------------------------------

/// The metadata the manifest and readme emitters need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookMeta {
    pub title: String,
    pub description: String,
    pub language: String,
}

impl From<&BookConfig> for BookMeta {
    fn from(config: &BookConfig) -> Self {
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            language: config.language.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toc_entry_serialization() {
        let entry = TocEntry::new("Getting Started", "getting-started.md", 1);
        let json = serde_json::to_string(&entry).expect("serialize");
        let parsed: TocEntry = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, entry);
    }

    #[test]
    fn outline_len_counts_descendants() {
        let mut root = OutlineEntry::from(&TocEntry::new("Guide", "guide.md", 1));
        let mut child = OutlineEntry::from(&TocEntry::new("Install", "install.md", 2));
        child
            .children
            .push(OutlineEntry::from(&TocEntry::new("Linux", "linux.md", 3)));
        root.children.push(child);
        assert_eq!(root.len(), 3);

        let json = serde_json::to_string(&root).expect("serialize");
        assert!(json.contains("\"children\""));
    }

    #[test]
    fn leaf_outline_omits_children_field() {
        let leaf = OutlineEntry::from(&TocEntry::new("Leaf", "leaf.md", 1));
        let json = serde_json::to_string(&leaf).expect("serialize");
        assert!(!json.contains("children"));
    }
}
