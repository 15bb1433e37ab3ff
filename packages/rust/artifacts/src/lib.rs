//! Book-level files: `book.json`, `SUMMARY.md` and `README.md`.
//!
//! The three renderers are pure; [`write_artifacts`] writes their output next
//! to the section files.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, info, instrument};

use wordbook_shared::{BookMeta, Labels, Result, TocEntry, WordbookError};

pub const BOOK_JSON: &str = "book.json";
pub const SUMMARY_MD: &str = "SUMMARY.md";
pub const README_MD: &str = "README.md";

/// Built-in plugins disabled for every generated book.
const DISABLED_PLUGINS: [&str; 3] = ["-sharing", "-fontsettings", "-livereload"];

#[derive(Serialize)]
struct BookJson<'a> {
    title: &'a str,
    description: &'a str,
    language: &'a str,
    plugins: &'a [&'a str],
    #[serde(rename = "pluginsConfig")]
    plugins_config: serde_json::Map<String, serde_json::Value>,
}

/// Render `book.json` (two-space indent, non-ASCII kept as-is).
pub fn book_json(meta: &BookMeta) -> Result<String> {
    let book = BookJson {
        title: &meta.title,
        description: &meta.description,
        language: &meta.language,
        plugins: &DISABLED_PLUGINS,
        plugins_config: serde_json::Map::new(),
    };
    serde_json::to_string_pretty(&book)
        .map_err(|e| WordbookError::validation(format!("JSON serialization failed: {e}")))
}

/// Render `SUMMARY.md`: one bullet per entry, indented by depth.
pub fn summary_md(toc: &[TocEntry]) -> String {
    let mut out = String::from("# Summary\n\n");
    for entry in toc {
        let indent = "  ".repeat(entry.depth.saturating_sub(1) as usize);
        out.push_str(&format!("{indent}* [{}]({})\n", entry.title, entry.filename));
    }
    out
}

/// Render `README.md`.
pub fn readme_md(meta: &BookMeta, labels: &Labels, generated_at: &NaiveDateTime) -> String {
    format!(
        "# {title}\n\n{description}\n\n## {about}\n\n{body}\n\n---\n\n*{stamp}: {time}*\n",
        title = meta.title,
        description = meta.description,
        about = labels.about_heading,
        body = labels.about_body,
        stamp = labels.generated_at,
        time = generated_at.format("%Y-%m-%d %H:%M:%S"),
    )
}

/// Write the three book files into `root`, each via a temp file and rename.
#[instrument(skip_all, fields(root = %root.display(), entries = toc.len()))]
pub fn write_artifacts(
    root: &Path,
    meta: &BookMeta,
    toc: &[TocEntry],
    labels: &Labels,
) -> Result<Vec<PathBuf>> {
    let now = Local::now().naive_local();
    let files = [
        (BOOK_JSON, book_json(meta)?),
        (SUMMARY_MD, summary_md(toc)),
        (README_MD, readme_md(meta, labels, &now)),
    ];

    let mut written = Vec::with_capacity(files.len());
    for (filename, content) in &files {
        let target = root.join(filename);
        let temp = root.join(format!(".{filename}.tmp"));

        std::fs::write(&temp, content).map_err(|e| WordbookError::io(&temp, e))?;
        std::fs::rename(&temp, &target).map_err(|e| WordbookError::io(&target, e))?;

        debug!(file = %filename, size = content.len(), "wrote book file");
        written.push(target);
    }

    info!(count = written.len(), "book files written");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn meta() -> BookMeta {
        BookMeta {
            title: "用户手册".into(),
            description: "Guide".into(),
            language: "zh-hans".into(),
        }
    }

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("wb-artifacts-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn book_json_layout() {
        let json = book_json(&meta()).unwrap();
        let expected = r#"{
  "title": "用户手册",
  "description": "Guide",
  "language": "zh-hans",
  "plugins": [
    "-sharing",
    "-fontsettings",
    "-livereload"
  ],
  "pluginsConfig": {}
}"#;
        assert_eq!(json, expected);
    }

    #[test]
    fn summary_indents_by_depth() {
        let toc = vec![
            TocEntry::new("Intro", "intro.md", 1),
            TocEntry::new("Setup", "setup.md", 2),
            TocEntry::new("Deep", "deep.md", 3),
        ];
        assert_eq!(
            summary_md(&toc),
            "# Summary\n\n* [Intro](intro.md)\n  * [Setup](setup.md)\n    * [Deep](deep.md)\n"
        );
    }

    #[test]
    fn readme_uses_labels_and_timestamp() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(7, 5, 1)
            .unwrap();
        let readme = readme_md(&meta(), &Labels::for_language("zh-hans"), &at);
        assert!(readme.starts_with("# 用户手册\n\nGuide\n\n## 关于本文档\n\n"));
        assert!(readme.ends_with("---\n\n*本文档生成时间: 2024-03-09 07:05:01*\n"));
    }

    #[test]
    fn write_artifacts_creates_files_without_temp_leftovers() {
        let dir = temp_dir();
        let toc = vec![TocEntry::new("Intro", "intro.md", 1)];
        let written = write_artifacts(&dir, &meta(), &toc, &Labels::default()).unwrap();

        assert_eq!(written.len(), 3);
        for name in [BOOK_JSON, SUMMARY_MD, README_MD] {
            assert!(dir.join(name).is_file(), "{name} missing");
        }
        let leftovers = std::fs::read_dir(&dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn write_artifacts_into_missing_dir_is_an_io_error() {
        let dir = std::env::temp_dir().join(format!("wb-artifacts-missing-{}", uuid::Uuid::now_v7()));
        let err = write_artifacts(&dir, &meta(), &[], &Labels::default()).unwrap_err();
        assert!(matches!(err, WordbookError::Io { .. }));
    }
}
