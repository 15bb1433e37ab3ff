//! Image extraction: related image parts -> files under the assets directory.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info, instrument, warn};
use wordbook_docx::{PartSource, Relationship};
use wordbook_markdown::ImageResolver;
use wordbook_shared::{DropReason, Fallback, Outcome, Result, Stage, WordbookError};

use crate::session::ConversionSession;

/// Relationship id -> generated asset filename, in extraction order.
#[derive(Debug, Default, Clone)]
pub struct AssetTable {
    by_rel: HashMap<String, usize>,
    entries: Vec<(String, String)>,
}

impl AssetTable {
    fn insert(&mut self, rel_id: String, filename: String) {
        self.by_rel.insert(rel_id.clone(), self.entries.len());
        self.entries.push((rel_id, filename));
    }

    pub fn get(&self, rel_id: &str) -> Option<&str> {
        self.by_rel
            .get(rel_id)
            .map(|&i| self.entries[i].1.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ImageResolver for AssetTable {
    fn resolve(&self, rel_id: &str) -> Option<&str> {
        self.get(rel_id)
    }
}

/// Extension for an image payload, judged by its leading bytes.
pub fn sniff_extension(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        Some("png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("jpeg")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("gif")
    } else if bytes.starts_with(b"BM") {
        Some("bmp")
    } else {
        None
    }
}

/// Write every related image part to `assets_dir` and map its relationship id
/// to the generated filename.
///
/// A part that cannot be read or written is reported and skipped; the rest of
/// the extraction continues.
#[instrument(skip_all, fields(assets_dir = %assets_dir.display()))]
pub fn extract_assets(
    source: &mut dyn PartSource,
    assets_dir: &Path,
    session: &mut ConversionSession<'_>,
) -> AssetTable {
    let mut rels: Vec<Relationship> = source
        .relationships()
        .into_iter()
        .filter(Relationship::is_image)
        .collect();
    rels.sort_by(|a, b| natural_cmp(&a.id, &b.id));

    let mut table = AssetTable::default();
    for rel in rels {
        match extract_one(source, &rel, assets_dir, session) {
            Ok(filename) => {
                debug!(rel_id = %rel.id, file = %filename, "extracted image");
                session.report(Stage::Assets, rel.id.clone(), Outcome::Matched);
                table.insert(rel.id, filename);
            }
            Err(e) => {
                warn!(rel_id = %rel.id, target = %rel.target, error = %e, "skipping unavailable image");
                session.report(
                    Stage::Assets,
                    rel.id,
                    Outcome::Dropped(DropReason::ImageUnavailable(e.to_string())),
                );
            }
        }
    }

    info!(images = table.len(), "image extraction complete");
    table
}

fn extract_one(
    source: &mut dyn PartSource,
    rel: &Relationship,
    assets_dir: &Path,
    session: &mut ConversionSession<'_>,
) -> Result<String> {
    let bytes = source.read_part(rel)?;
    let ext = match sniff_extension(&bytes) {
        Some(ext) => ext,
        None => {
            debug!(rel_id = %rel.id, content_type = %rel.content_type, "unrecognized image signature, using png");
            session.report(
                Stage::Assets,
                rel.id.clone(),
                Outcome::FallbackSynthesized(Fallback::ImageFormat),
            );
            "png"
        }
    };

    let filename = session.next_image_name(ext);
    let path = assets_dir.join(&filename);
    std::fs::write(&path, &bytes).map_err(|e| WordbookError::io(&path, e))?;
    session.image_written();
    Ok(filename)
}

/// Compare ids so that digit runs order numerically (`rId2` < `rId10`).
fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut a = a.chars().peekable();
    let mut b = b.chars().peekable();
    loop {
        match (a.peek().copied(), b.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let left = take_number(&mut a);
                let right = take_number(&mut b);
                let ord = left
                    .trim_start_matches('0')
                    .len()
                    .cmp(&right.trim_start_matches('0').len())
                    .then_with(|| left.trim_start_matches('0').cmp(right.trim_start_matches('0')))
                    .then_with(|| left.len().cmp(&right.len()));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(x), Some(y)) => {
                if x != y {
                    return x.cmp(&y);
                }
                a.next();
                b.next();
            }
        }
    }
}

fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(c) = chars.peek().copied().filter(char::is_ascii_digit) {
        digits.push(c);
        chars.next();
    }
    digits
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use wordbook_docx::MemoryParts;
    use wordbook_shared::{BookConfig, RecordingObserver};

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
    const JPEG: &[u8] = b"\xFF\xD8\xFF\xE0\0\x10JFIF";
    const GIF: &[u8] = b"GIF89a\x01\0\x01\0";

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("wb-assets-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn config() -> BookConfig {
        BookConfig::new("T", "D", "en", 3, "out", "assets").unwrap()
    }

    fn image(id: &str, name: &str) -> Relationship {
        Relationship::new(id, format!("word/media/{name}"), "image/png")
    }

    #[test]
    fn sniffs_known_signatures() {
        assert_eq!(sniff_extension(PNG), Some("png"));
        assert_eq!(sniff_extension(JPEG), Some("jpeg"));
        assert_eq!(sniff_extension(GIF), Some("gif"));
        assert_eq!(sniff_extension(b"BM\x36\0"), Some("bmp"));
        assert_eq!(sniff_extension(b"II*\0"), None);
        assert_eq!(sniff_extension(b""), None);
    }

    #[test]
    fn natural_order_compares_digit_runs_numerically() {
        let mut ids = vec!["rId10", "rId2", "rId1", "rId02", "image"];
        ids.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(ids, vec!["image", "rId1", "rId2", "rId02", "rId10"]);
    }

    #[test]
    fn extracts_images_in_natural_id_order_with_sniffed_extensions() {
        let dir = temp_dir();
        let config = config();
        let observer = RecordingObserver::new();
        let mut session = ConversionSession::new(&config, &observer);
        let mut parts = MemoryParts::new()
            .with_part(image("rId10", "b.png"), JPEG.to_vec())
            .with_part(image("rId2", "a.png"), PNG.to_vec())
            .with_part(
                Relationship::new("rId3", "word/theme/theme1.xml", "application/xml"),
                b"<theme/>".to_vec(),
            );

        let table = extract_assets(&mut parts, &dir, &mut session);

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("rId2"), Some("image_001.png"));
        assert_eq!(table.get("rId10"), Some("image_002.jpeg"));
        assert_eq!(table.get("rId3"), None);
        assert_eq!(std::fs::read(dir.join("image_002.jpeg")).unwrap(), JPEG);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn unknown_signature_falls_back_to_png() {
        let dir = temp_dir();
        let config = config();
        let observer = RecordingObserver::new();
        let mut session = ConversionSession::new(&config, &observer);
        let mut parts = MemoryParts::new().with_part(image("rId1", "x.emf"), b"\x01\0\0\0EMF".to_vec());

        let table = extract_assets(&mut parts, &dir, &mut session);

        assert_eq!(table.get("rId1"), Some("image_001.png"));
        assert_eq!(
            observer
                .with_outcome(&Outcome::FallbackSynthesized(Fallback::ImageFormat))
                .len(),
            1
        );
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn unreadable_image_is_skipped_without_consuming_a_number() {
        let dir = temp_dir();
        let config = config();
        let observer = RecordingObserver::new();
        let mut session = ConversionSession::new(&config, &observer);
        let mut parts = MemoryParts::new()
            .with_missing(image("rId1", "gone.png"))
            .with_part(image("rId2", "ok.gif"), GIF.to_vec());

        let table = extract_assets(&mut parts, &dir, &mut session);

        assert_eq!(table.get("rId1"), None);
        assert_eq!(table.get("rId2"), Some("image_001.gif"));
        assert_eq!(session.dropped(), 1);
        let dropped = observer.reports();
        assert!(dropped.iter().any(|r| r.subject == "rId1"
            && matches!(r.outcome, Outcome::Dropped(DropReason::ImageUnavailable(_)))));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn unwritable_assets_dir_drops_every_image() {
        let dir = std::env::temp_dir().join(format!("wb-assets-missing-{}", uuid::Uuid::now_v7()));
        let config = config();
        let observer = RecordingObserver::new();
        let mut session = ConversionSession::new(&config, &observer);
        let mut parts = MemoryParts::new().with_part(image("rId1", "a.png"), PNG.to_vec());

        let table = extract_assets(&mut parts, &dir, &mut session);

        assert!(table.is_empty());
        assert_eq!(session.dropped(), 1);
    }
}
