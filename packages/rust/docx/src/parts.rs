//! Relationship map and access to the binary parts it points at.

use std::collections::HashMap;
use std::io;

use wordbook_shared::{Result, WordbookError};

/// One internal relationship of the main document part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship id, e.g. `rId7`.
    pub id: String,
    /// Relationship type URI.
    pub rel_type: String,
    /// Target part path inside the package (no leading `/`).
    pub target: String,
    /// Media type declared for the target part.
    pub content_type: String,
}

impl Relationship {
    pub fn new(
        id: impl Into<String>,
        target: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            rel_type: String::new(),
            target: target.into(),
            content_type: content_type.into(),
        }
    }

    /// Whether the declared media type is an image type.
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}

/// Source of related parts: the relationship map plus a way to read each target.
pub trait PartSource {
    /// Internal relationships of the main document part.
    fn relationships(&self) -> Vec<Relationship>;

    /// Read the full payload of a relationship's target part.
    fn read_part(&mut self, rel: &Relationship) -> Result<Vec<u8>>;
}

/// In-memory [`PartSource`]; a relationship without a payload fails to read.
#[derive(Debug, Default, Clone)]
pub struct MemoryParts {
    rels: Vec<Relationship>,
    payloads: HashMap<String, Vec<u8>>,
}

impl MemoryParts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a relationship whose target holds `bytes`.
    pub fn with_part(mut self, rel: Relationship, bytes: impl Into<Vec<u8>>) -> Self {
        self.payloads.insert(rel.id.clone(), bytes.into());
        self.rels.push(rel);
        self
    }

    /// Add a relationship whose target is missing from the package.
    pub fn with_missing(mut self, rel: Relationship) -> Self {
        self.rels.push(rel);
        self
    }
}

impl PartSource for MemoryParts {
    fn relationships(&self) -> Vec<Relationship> {
        self.rels.clone()
    }

    fn read_part(&mut self, rel: &Relationship) -> Result<Vec<u8>> {
        self.payloads.get(&rel.id).cloned().ok_or_else(|| {
            WordbookError::io(
                &rel.target,
                io::Error::new(io::ErrorKind::NotFound, "part not present"),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_parts_reads_payloads_and_reports_missing() {
        let mut parts = MemoryParts::new()
            .with_part(Relationship::new("rId1", "word/media/a.png", "image/png"), vec![1, 2])
            .with_missing(Relationship::new("rId2", "word/media/b.png", "image/png"));

        let rels = parts.relationships();
        assert_eq!(rels.len(), 2);
        assert!(rels.iter().all(Relationship::is_image));
        assert_eq!(parts.read_part(&rels[0]).unwrap(), vec![1, 2]);
        assert!(matches!(
            parts.read_part(&rels[1]),
            Err(WordbookError::Io { .. })
        ));
    }
}
