//! The `.docx` container: zip archive, content types, relationships, parts.

use std::io::{self, Cursor, Read};
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::{debug, instrument, warn};
use wordbook_shared::{Result, WordbookError};
use zip::ZipArchive;

use crate::body::parse_body;
use crate::content_types::{self, ContentTypes};
use crate::model::BodyElement;
use crate::parts::{PartSource, Relationship};
use crate::styles::StyleSheet;
use crate::xml::{attr, decode_part, local_name};

const ROOT_RELS: &str = "_rels/.rels";
const DEFAULT_DOCUMENT: &str = "word/document.xml";
const DEFAULT_STYLES: &str = "word/styles.xml";

/// An opened word-processing package with its body already parsed.
pub struct DocxPackage {
    archive: ZipArchive<Cursor<Vec<u8>>>,
    entries: Vec<String>,
    document_part: String,
    relationships: Vec<Relationship>,
    body: Vec<BodyElement>,
}

impl std::fmt::Debug for DocxPackage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocxPackage")
            .field("document_part", &self.document_part)
            .field("relationships", &self.relationships.len())
            .field("body", &self.body.len())
            .finish()
    }
}

impl DocxPackage {
    /// Read and parse a `.docx` file.
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| WordbookError::io(path, e))?;
        Self::from_bytes(bytes)
    }

    /// Parse a `.docx` held in memory.
    #[instrument(skip_all, fields(bytes = bytes.len()))]
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| WordbookError::package(format!("not a zip archive: {e}")))?;
        let entries: Vec<String> = archive.file_names().map(str::to_string).collect();

        let types_bytes = read_entry(&mut archive, &entries, content_types::PART_NAME)?
            .ok_or_else(|| WordbookError::package("missing [Content_Types].xml"))?;
        let content_types = ContentTypes::parse(&types_bytes)?;

        let document_part = match read_entry(&mut archive, &entries, ROOT_RELS)? {
            Some(bytes) => parse_relationships(ROOT_RELS, "", &bytes, &content_types)?
                .into_iter()
                .find(|rel| rel.rel_type.ends_with("/officeDocument"))
                .map(|rel| rel.target)
                .unwrap_or_else(|| DEFAULT_DOCUMENT.to_string()),
            None => DEFAULT_DOCUMENT.to_string(),
        };

        let document_bytes = read_entry(&mut archive, &entries, &document_part)?.ok_or_else(|| {
            WordbookError::package(format!("missing main document part {document_part}"))
        })?;

        let rels_part = rels_part_for(&document_part);
        let relationships = match read_entry(&mut archive, &entries, &rels_part)? {
            Some(bytes) => parse_relationships(&rels_part, &document_part, &bytes, &content_types)?,
            None => {
                debug!(part = %rels_part, "main document has no relationships");
                Vec::new()
            }
        };

        let styles_part = relationships
            .iter()
            .find(|rel| rel.rel_type.ends_with("/styles"))
            .map(|rel| rel.target.clone())
            .unwrap_or_else(|| DEFAULT_STYLES.to_string());
        let styles = match read_entry(&mut archive, &entries, &styles_part)? {
            Some(bytes) => StyleSheet::parse(&styles_part, &bytes)?,
            None => {
                warn!(part = %styles_part, "no style sheet; style ids used as names");
                StyleSheet::default()
            }
        };

        let body = parse_body(&document_part, &document_bytes, &styles)?;
        debug!(
            document = %document_part,
            relationships = relationships.len(),
            styles = styles.len(),
            body = body.len(),
            "opened package"
        );

        Ok(Self {
            archive,
            entries,
            document_part,
            relationships,
            body,
        })
    }

    /// Body elements in document order.
    pub fn body(&self) -> &[BodyElement] {
        &self.body
    }

    /// Path of the main document part inside the package.
    pub fn document_part(&self) -> &str {
        &self.document_part
    }

    /// Number of relationships whose target is an image part.
    pub fn image_count(&self) -> usize {
        self.relationships.iter().filter(|r| r.is_image()).count()
    }
}

impl PartSource for DocxPackage {
    fn relationships(&self) -> Vec<Relationship> {
        self.relationships.clone()
    }

    fn read_part(&mut self, rel: &Relationship) -> Result<Vec<u8>> {
        read_entry(&mut self.archive, &self.entries, &rel.target)?.ok_or_else(|| {
            WordbookError::io(
                &rel.target,
                io::Error::new(io::ErrorKind::NotFound, "part not present in package"),
            )
        })
    }
}

/// Read a zip entry by part name. Part names compare case-insensitively.
fn read_entry(
    archive: &mut ZipArchive<Cursor<Vec<u8>>>,
    entries: &[String],
    name: &str,
) -> Result<Option<Vec<u8>>> {
    let Some(entry) = entries
        .iter()
        .find(|e| e.as_str() == name)
        .or_else(|| entries.iter().find(|e| e.eq_ignore_ascii_case(name)))
    else {
        return Ok(None);
    };

    let mut file = archive
        .by_name(entry)
        .map_err(|e| WordbookError::package(format!("{entry}: {e}")))?;
    let mut buf = Vec::with_capacity(file.size() as usize);
    file.read_to_end(&mut buf)
        .map_err(|e| WordbookError::io(entry.as_str(), e))?;
    Ok(Some(buf))
}

/// `word/document.xml` -> `word/_rels/document.xml.rels`.
fn rels_part_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{dir}/_rels/{file}.rels"),
        None => format!("_rels/{part}.rels"),
    }
}

/// Resolve a relationship target against the directory of its source part.
fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments: Vec<&str> = match source_part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

/// Parse a `.rels` part. External targets are dropped.
fn parse_relationships(
    part: &str,
    source_part: &str,
    bytes: &[u8],
    content_types: &ContentTypes,
) -> Result<Vec<Relationship>> {
    let content = decode_part(part, bytes)?;
    let mut reader = Reader::from_str(&content);
    reader.config_mut().trim_text(true);

    let mut rels = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) | Ok(Event::Start(e))
                if local_name(e.name().as_ref()) == b"Relationship" =>
            {
                if attr(&e, b"TargetMode").is_some_and(|m| m.eq_ignore_ascii_case("External")) {
                    continue;
                }
                let (Some(id), Some(target)) = (attr(&e, b"Id"), attr(&e, b"Target")) else {
                    continue;
                };
                let target = resolve_target(source_part, &target);
                let content_type = content_types.lookup(&target).to_string();
                rels.push(Relationship {
                    id,
                    rel_type: attr(&e, b"Type").unwrap_or_default(),
                    target,
                    content_type,
                });
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(WordbookError::xml(part, e)),
            _ => {}
        }
    }
    Ok(rels)
}
