//! Book directory assembler.
//!
//! Prepares the output root, writes one Markdown file per TOC entry, folds the
//! flat TOC into an outline, and checks a finished book directory.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, instrument, warn};

use wordbook_artifacts::{BOOK_JSON, README_MD, SUMMARY_MD};
use wordbook_shared::{OutlineEntry, Result, TocEntry, WordbookError};

use crate::segment::SectionBuffer;

static SUMMARY_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\]\(([^)\s]+)\)").expect("valid regex"));

/// Result of [`validate_book`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookCheck {
    /// Number of links found in `SUMMARY.md`.
    pub linked: usize,
    /// Linked files that do not exist.
    pub missing: Vec<String>,
}

impl BookCheck {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Create the output root and its assets directory. With `clean`, an existing
/// root is removed first.
///
/// ```text
/// <root>/
/// ├── book.json
/// ├── SUMMARY.md
/// ├── README.md
/// ├── <entry>.md ...
/// └── <assets_dir>/
///     └── image_001.png ...
/// ```
///
/// A root that is the working directory or one of its ancestors is never
/// cleared.
#[instrument(skip_all, fields(root = %root.display(), clean))]
pub fn prepare_output_dir(root: &Path, assets_dir: &str, clean: bool) -> Result<PathBuf> {
    if clean && root.exists() {
        let cwd = std::env::current_dir().map_err(|e| WordbookError::io(".", e))?;
        ensure_clearable(root, &[cwd.as_path()])?;
        std::fs::remove_dir_all(root).map_err(|e| WordbookError::io(root, e))?;
        debug!("removed previous output");
    }

    let assets = root.join(assets_dir);
    for dir in [root, assets.as_path()] {
        std::fs::create_dir_all(dir).map_err(|e| WordbookError::io(dir, e))?;
    }
    info!(assets = %assets.display(), "output directory ready");
    Ok(assets)
}

/// Refuse to clear `root` when it is the filesystem root, or when it is or
/// contains any of the `protected` paths. Paths that do not exist are ignored.
pub fn ensure_clearable(root: &Path, protected: &[&Path]) -> Result<()> {
    let Ok(root) = root.canonicalize() else {
        return Ok(());
    };
    if root.parent().is_none() {
        return Err(WordbookError::validation(format!(
            "refusing to clear filesystem root {}",
            root.display()
        )));
    }
    for path in protected {
        let Ok(path) = path.canonicalize() else {
            continue;
        };
        if path.starts_with(&root) {
            return Err(WordbookError::validation(format!(
                "refusing to clear {}: it contains {}",
                root.display(),
                path.display()
            )));
        }
    }
    Ok(())
}

/// Write `sections[i]` to `<root>/<toc[i].filename>`.
#[instrument(skip_all, fields(root = %root.display(), sections = sections.len()))]
pub fn write_sections(
    root: &Path,
    toc: &[TocEntry],
    sections: &[SectionBuffer],
) -> Result<Vec<PathBuf>> {
    if toc.len() != sections.len() {
        return Err(WordbookError::Conversion(format!(
            "{} toc entries but {} section buffers",
            toc.len(),
            sections.len()
        )));
    }

    let mut written: Vec<PathBuf> = Vec::with_capacity(toc.len());
    for (entry, section) in toc.iter().zip(sections) {
        let path = root.join(&entry.filename);
        if written.contains(&path) {
            warn!(file = %entry.filename, title = %entry.title, "filename collision, earlier section overwritten");
        }
        std::fs::write(&path, section.contents()).map_err(|e| WordbookError::io(&path, e))?;
        debug!(path = %path.display(), title = %entry.title, "wrote section");
        written.push(path);
    }
    Ok(written)
}

/// Nest each entry under the nearest preceding entry of smaller depth.
pub fn build_outline(toc: &[TocEntry]) -> Vec<OutlineEntry> {
    let mut outline = Vec::new();
    for entry in toc {
        insert_outline(&mut outline, OutlineEntry::from(entry));
    }
    outline
}

fn insert_outline(list: &mut Vec<OutlineEntry>, entry: OutlineEntry) {
    match list.last_mut() {
        Some(last) if last.depth < entry.depth => insert_outline(&mut last.children, entry),
        Some(_) | None => list.push(entry),
    }
}

/// Verify that a book directory is well-formed.
///
/// The three book files must exist. Files linked from `SUMMARY.md` that are
/// missing are listed in the returned [`BookCheck`] but are not an error.
pub fn validate_book(root: &Path) -> Result<BookCheck> {
    for name in [BOOK_JSON, SUMMARY_MD, README_MD] {
        if !root.join(name).is_file() {
            return Err(WordbookError::validation(format!("missing {name}")));
        }
    }

    let book_path = root.join(BOOK_JSON);
    let book = std::fs::read_to_string(&book_path).map_err(|e| WordbookError::io(&book_path, e))?;
    if !book.trim_start().starts_with('{') {
        return Err(WordbookError::validation("book.json is not a JSON object"));
    }

    let summary_path = root.join(SUMMARY_MD);
    let summary =
        std::fs::read_to_string(&summary_path).map_err(|e| WordbookError::io(&summary_path, e))?;

    let mut check = BookCheck::default();
    for caps in SUMMARY_LINK.captures_iter(&summary) {
        let link = &caps[1];
        check.linked += 1;
        if !root.join(link).is_file() {
            debug!(link, "summary entry missing corresponding file (non-fatal)");
            check.missing.push(link.to_string());
        }
    }
    Ok(check)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("wb-assembler-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn buffer(text: &str) -> SectionBuffer {
        let mut b = SectionBuffer::default();
        b.push(text.to_string());
        b
    }

    #[test]
    fn prepare_creates_root_and_assets() {
        let tmp = temp_dir();
        let root = tmp.join("book");
        let assets = prepare_output_dir(&root, "assets", true).unwrap();
        assert!(root.is_dir());
        assert_eq!(assets, root.join("assets"));
        assert!(assets.is_dir());
        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn prepare_with_clean_removes_stale_files() {
        let tmp = temp_dir();
        std::fs::write(tmp.join("stale.md"), "old").unwrap();
        prepare_output_dir(&tmp, "assets", true).unwrap();
        assert!(!tmp.join("stale.md").exists());

        std::fs::write(tmp.join("kept.md"), "old").unwrap();
        prepare_output_dir(&tmp, "assets", false).unwrap();
        assert!(tmp.join("kept.md").exists());
        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn root_containing_a_protected_path_is_not_clearable() {
        let tmp = temp_dir();
        let root = tmp.join("book");
        std::fs::create_dir_all(&root).unwrap();
        let inside = root.join("manual.docx");
        std::fs::write(&inside, "docx").unwrap();
        let beside = tmp.join("manual.docx");
        std::fs::write(&beside, "docx").unwrap();

        let err = ensure_clearable(&root, &[inside.as_path()]).unwrap_err();
        assert!(err.to_string().contains("refusing to clear"));
        assert!(ensure_clearable(&root, &[root.as_path()]).is_err());
        assert!(ensure_clearable(&tmp, &[root.as_path()]).is_err());
        assert!(ensure_clearable(&root, &[beside.as_path()]).is_ok());
        assert!(ensure_clearable(&tmp.join("absent"), &[inside.as_path()]).is_ok());
        assert!(inside.exists());
        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn filesystem_root_is_not_clearable() {
        assert!(ensure_clearable(Path::new("/"), &[]).is_err());
    }

    #[test]
    fn write_sections_writes_each_buffer_verbatim() {
        let tmp = temp_dir();
        let toc = vec![
            TocEntry::new("Intro", "intro.md", 1),
            TocEntry::new("Setup", "setup.md", 2),
        ];
        let sections = vec![buffer("# Intro\n\n"), buffer("## Setup\n\nbody\n\n")];

        let written = write_sections(&tmp, &toc, &sections).unwrap();

        assert_eq!(written.len(), 2);
        assert_eq!(
            std::fs::read_to_string(tmp.join("setup.md")).unwrap(),
            "## Setup\n\nbody\n\n"
        );
        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn write_sections_rejects_mismatched_lengths() {
        let tmp = temp_dir();
        let toc = vec![TocEntry::new("Intro", "intro.md", 1)];
        assert!(write_sections(&tmp, &toc, &[]).is_err());
        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn outline_nests_by_depth() {
        let toc = vec![
            TocEntry::new("A", "a.md", 1),
            TocEntry::new("A.1", "a1.md", 2),
            TocEntry::new("A.1.a", "a1a.md", 3),
            TocEntry::new("A.2", "a2.md", 2),
            TocEntry::new("B", "b.md", 1),
            TocEntry::new("B.x", "bx.md", 3),
        ];
        let outline = build_outline(&toc);

        assert_eq!(outline.len(), 2);
        assert_eq!(outline[0].children.len(), 2);
        assert_eq!(outline[0].children[0].children[0].title, "A.1.a");
        assert_eq!(outline[1].children[0].title, "B.x");
        assert_eq!(outline.iter().map(OutlineEntry::len).sum::<usize>(), 6);
    }

    #[test]
    fn outline_of_entries_starting_deep_stays_flat() {
        let toc = vec![TocEntry::new("Deep", "d.md", 2), TocEntry::new("Top", "t.md", 1)];
        let outline = build_outline(&toc);
        assert_eq!(outline.len(), 2);
    }

    #[test]
    fn validate_book_reports_missing_links() {
        let tmp = temp_dir();
        std::fs::write(tmp.join(BOOK_JSON), "{}").unwrap();
        std::fs::write(tmp.join(README_MD), "# Book\n").unwrap();
        std::fs::write(
            tmp.join(SUMMARY_MD),
            "# Summary\n\n* [Intro](intro.md)\n  * [Gone](gone.md)\n",
        )
        .unwrap();
        std::fs::write(tmp.join("intro.md"), "# Intro\n").unwrap();

        let check = validate_book(&tmp).unwrap();
        assert_eq!(check.linked, 2);
        assert_eq!(check.missing, vec!["gone.md".to_string()]);
        assert!(!check.is_complete());
        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn validate_book_requires_book_files() {
        let tmp = temp_dir();
        let err = validate_book(&tmp).unwrap_err();
        assert!(err.to_string().contains("book.json"));
        let _ = std::fs::remove_dir_all(&tmp);
    }
}
