//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use wordbook_core::{convert_document, inspect_document, validate_book};
use wordbook_shared::{
    AppConfig, BookConfig, ConversionObserver, OutlineEntry, Outcome, Report, SilentObserver,
    init_config, load_config, load_config_from,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// wordbook: turn a .docx into a GitBook-ready Markdown book.
#[derive(Parser)]
#[command(
    name = "wordbook",
    version,
    about = "Convert Word documents into linked Markdown files with a GitBook table of contents.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.wordbook/wordbook.toml.
    #[arg(long, global = true, env = "WORDBOOK_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Book settings shared by `convert` and `inspect`; unset flags fall back to
/// the config file, then to built-in defaults.
#[derive(clap::Args, Debug, Default)]
pub(crate) struct BookArgs {
    /// Book title.
    #[arg(short, long)]
    pub title: Option<String>,

    /// Book description.
    #[arg(short, long)]
    pub description: Option<String>,

    /// Locale tag written to book.json (e.g. en, zh-hans).
    #[arg(short, long)]
    pub language: Option<String>,

    /// Deepest heading level that gets its own file.
    #[arg(long)]
    pub max_toc_level: Option<u32>,

    /// Image directory name inside the output directory.
    #[arg(long)]
    pub assets_dir: Option<String>,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Convert a .docx file into a book directory.
    Convert {
        /// Word document to convert.
        input: PathBuf,

        /// Output directory.
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        book: BookArgs,

        /// Keep an existing output directory instead of clearing it first.
        #[arg(long)]
        keep_existing: bool,
    },

    /// Print the table of contents a conversion would produce.
    Inspect {
        /// Word document to inspect.
        input: PathBuf,

        #[command(flatten)]
        book: BookArgs,

        /// Print the outline as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Check a generated book directory.
    Check {
        /// Book directory.
        dir: PathBuf,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "wordbook=info",
        1 => "wordbook=debug",
        _ => "wordbook=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Convert {
            input,
            output,
            book,
            keep_existing,
        } => cmd_convert(config_path, &input, output, &book, keep_existing, cli.verbose),
        Command::Inspect { input, book, json } => cmd_inspect(config_path, &input, &book, json),
        Command::Check { dir } => cmd_check(&dir),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

fn app_config(path: Option<&Path>) -> Result<AppConfig> {
    Ok(match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    })
}

/// Layer CLI flags over the config file.
fn resolve_book_config(
    config_path: Option<&Path>,
    book: &BookArgs,
    output: Option<PathBuf>,
) -> Result<BookConfig> {
    let defaults = BookConfig::from(&app_config(config_path)?);
    let config = BookConfig::new(
        book.title.clone().unwrap_or(defaults.title),
        book.description.clone().unwrap_or(defaults.description),
        book.language.clone().unwrap_or(defaults.language),
        book.max_toc_level.unwrap_or(defaults.max_toc_level),
        output.unwrap_or(defaults.output_dir),
        book.assets_dir.clone().unwrap_or(defaults.assets_dir),
    )?;
    Ok(config)
}

fn cmd_convert(
    config_path: Option<&Path>,
    input: &Path,
    output: Option<PathBuf>,
    book: &BookArgs,
    keep_existing: bool,
    verbose: u8,
) -> Result<()> {
    if !input.is_file() {
        return Err(eyre!("input document '{}' does not exist", input.display()));
    }
    let config = resolve_book_config(config_path, book, output)?;

    info!(
        input = %input.display(),
        output = %config.output_dir.display(),
        max_toc_level = config.max_toc_level,
        "converting document"
    );

    let observer = CliObserver::new();
    let result = convert_document(input, &config, !keep_existing, &observer);
    observer.finish();
    let result = result?;

    println!();
    println!("  Book written to {}", result.output_dir.display());
    println!("  Entries:  {}", result.toc.len());
    println!("  Files:    {}", result.files.len());
    println!("  Images:   {}", result.images);
    println!("  Dropped:  {}", result.dropped);
    if result.single_file {
        println!("  Note:     no heading within level {}; everything is in content.md", config.max_toc_level);
    }
    println!("  Time:     {:.1}s", result.elapsed.as_secs_f64());

    let notes = observer.notes();
    if verbose > 0 && !notes.is_empty() {
        println!();
        for report in notes {
            println!("  {:?} {}: {:?}", report.stage, report.subject, report.outcome);
        }
    }
    println!();

    Ok(())
}

fn cmd_inspect(config_path: Option<&Path>, input: &Path, book: &BookArgs, json: bool) -> Result<()> {
    let config = resolve_book_config(config_path, book, None)?;
    let inspection = inspect_document(input, &config, &SilentObserver)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&inspection.outline)?);
        return Ok(());
    }

    println!();
    print_outline(&inspection.outline, 0);
    println!();
    println!("  Headings:   {}", inspection.headings);
    println!("  Paragraphs: {}", inspection.paragraphs);
    println!("  Tables:     {}", inspection.tables);
    println!("  Images:     {}", inspection.images);
    if inspection.single_file {
        println!("  No heading within level {}; output would be a single content.md", config.max_toc_level);
    }
    println!();
    Ok(())
}

fn print_outline(entries: &[OutlineEntry], level: usize) {
    for entry in entries {
        println!("  {}* {} ({})", "  ".repeat(level), entry.title, entry.filename);
        print_outline(&entry.children, level + 1);
    }
}

fn cmd_check(dir: &Path) -> Result<()> {
    let check = validate_book(dir)?;
    if check.is_complete() {
        println!("{}: ok ({} linked files)", dir.display(), check.linked);
        return Ok(());
    }
    for missing in &check.missing {
        println!("  missing: {missing}");
    }
    Err(eyre!(
        "{} of {} files linked from SUMMARY.md are missing",
        check.missing.len(),
        check.linked
    ))
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = app_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress observer
// ---------------------------------------------------------------------------

/// Spinner showing the current phase; keeps every non-`Matched` report.
struct CliObserver {
    spinner: ProgressBar,
    notes: Mutex<Vec<Report>>,
}

impl CliObserver {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            spinner.set_style(
                style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
        }
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self {
            spinner,
            notes: Mutex::new(Vec::new()),
        }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }

    fn notes(&self) -> Vec<Report> {
        self.notes.lock().map(|n| n.clone()).unwrap_or_default()
    }
}

impl ConversionObserver for CliObserver {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn report(&self, report: Report) {
        if report.outcome == Outcome::Matched {
            return;
        }
        if let Ok(mut notes) = self.notes.lock() {
            notes.push(report);
        }
    }
}
