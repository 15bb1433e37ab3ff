//! Application configuration for wordbook.
//!
//! User config lives at `~/.wordbook/wordbook.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, WordbookError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "wordbook.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".wordbook";

// ---------------------------------------------------------------------------
// Config structs (matching wordbook.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Book title written to `book.json` and `README.md`.
    #[serde(default = "default_title")]
    pub title: String,

    /// Book description written to `book.json` and `README.md`.
    #[serde(default = "default_description")]
    pub description: String,

    /// Locale tag (e.g. `en`, `zh-hans`).
    #[serde(default = "default_language")]
    pub language: String,

    /// Deepest heading level that still gets its own file.
    #[serde(default = "default_max_toc_level")]
    pub max_toc_level: u32,

    /// Default output directory.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Name of the image directory inside the output directory.
    #[serde(default = "default_assets_dir")]
    pub assets_dir: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            description: default_description(),
            language: default_language(),
            max_toc_level: default_max_toc_level(),
            output_dir: default_output_dir(),
            assets_dir: default_assets_dir(),
        }
    }
}

fn default_title() -> String {
    "Document Title".into()
}
fn default_description() -> String {
    "Document description".into()
}
fn default_language() -> String {
    "en".into()
}
fn default_max_toc_level() -> u32 {
    3
}
fn default_output_dir() -> String {
    "book_output".into()
}
fn default_assets_dir() -> String {
    "assets".into()
}

// ---------------------------------------------------------------------------
// Book config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime conversion parameters, merged from the config file and CLI flags.
///
/// Borrowed immutably by every stage of a conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookConfig {
    pub title: String,
    pub description: String,
    /// Locale tag, written verbatim to `book.json`.
    pub language: String,
    /// Headings deeper than this are folded into their parent section.
    pub max_toc_level: u32,
    /// Output root.
    pub output_dir: PathBuf,
    /// Image directory, relative to `output_dir` and to every Markdown file.
    pub assets_dir: String,
}

impl BookConfig {
    /// Build a validated config.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        language: impl Into<String>,
        max_toc_level: u32,
        output_dir: impl Into<PathBuf>,
        assets_dir: impl Into<String>,
    ) -> Result<Self> {
        let config = Self {
            title: title.into(),
            description: description.into(),
            language: language.into(),
            max_toc_level,
            output_dir: output_dir.into(),
            assets_dir: assets_dir.into(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants every stage relies on.
    pub fn validate(&self) -> Result<()> {
        if self.max_toc_level < 1 {
            return Err(WordbookError::config("max_toc_level must be at least 1"));
        }
        let assets = self.assets_dir.as_str();
        if assets.trim().is_empty() {
            return Err(WordbookError::config("assets_dir must not be empty"));
        }
        if assets.trim() != assets {
            return Err(WordbookError::config(format!(
                "assets_dir must not start or end with whitespace, got '{assets}'"
            )));
        }
        if assets.contains(['/', '\\']) || assets == "." || assets == ".." {
            return Err(WordbookError::config(format!(
                "assets_dir must be a single directory name, got '{}'",
                self.assets_dir
            )));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(WordbookError::config("output_dir must not be empty"));
        }
        Ok(())
    }
}

impl From<&AppConfig> for BookConfig {
    fn from(config: &AppConfig) -> Self {
        let defaults = &config.defaults;
        Self {
            title: defaults.title.clone(),
            description: defaults.description.clone(),
            language: defaults.language.clone(),
            max_toc_level: defaults.max_toc_level,
            output_dir: PathBuf::from(&defaults.output_dir),
            assets_dir: defaults.assets_dir.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.wordbook/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| WordbookError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.wordbook/wordbook.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| WordbookError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| WordbookError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| WordbookError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| WordbookError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| WordbookError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
