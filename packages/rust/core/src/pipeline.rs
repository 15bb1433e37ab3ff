//! End-to-end conversion: `.docx` -> book directory.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{info, instrument};

use wordbook_artifacts::write_artifacts;
use wordbook_docx::DocxPackage;
use wordbook_shared::{BookConfig, BookMeta, ConversionObserver, OutlineEntry, Result, TocEntry};

use crate::assembler::{build_outline, ensure_clearable, prepare_output_dir, write_sections};
use crate::assets::extract_assets;
use crate::heading::{BlockNode, classify};
use crate::segment::segment;
use crate::session::ConversionSession;
use crate::toc::{build_toc, placeholder_entry};

/// Result of [`convert_document`].
#[derive(Debug, Clone)]
pub struct ConvertResult {
    pub output_dir: PathBuf,
    pub toc: Vec<TocEntry>,
    pub outline: Vec<OutlineEntry>,
    /// Every file written: sections first, then the book files.
    pub files: Vec<PathBuf>,
    /// Images written to the assets directory.
    pub images: usize,
    /// Number of `Dropped` outcomes.
    pub dropped: usize,
    /// Number of `FallbackSynthesized` outcomes.
    pub fallbacks: usize,
    /// The document had no qualifying heading.
    pub single_file: bool,
    pub elapsed: Duration,
}

/// Result of [`inspect_document`].
#[derive(Debug, Clone)]
pub struct Inspection {
    pub toc: Vec<TocEntry>,
    pub outline: Vec<OutlineEntry>,
    pub paragraphs: usize,
    pub headings: usize,
    pub tables: usize,
    /// Related image parts in the package.
    pub images: usize,
    pub single_file: bool,
}

/// Convert a `.docx` file into a book directory at `config.output_dir`.
///
/// The input is opened before the output directory is touched, so a missing
/// or unreadable document leaves any previous output in place. With `clean`,
/// an output directory that contains the input is an error.
#[instrument(skip_all, fields(input = %input.display(), output = %config.output_dir.display()))]
pub fn convert_document(
    input: &Path,
    config: &BookConfig,
    clean: bool,
    observer: &dyn ConversionObserver,
) -> Result<ConvertResult> {
    config.validate()?;
    observer.phase("Opening document");
    let mut package = DocxPackage::open(input)?;
    if clean {
        ensure_clearable(&config.output_dir, &[input])?;
    }
    convert_package(&mut package, config, clean, observer)
}

/// Convert an already opened package.
///
/// 1. Prepare the output directory
/// 2. Extract images
/// 3. Build the TOC and section buffers in one pass
/// 4. Write sections
/// 5. Write `book.json`, `SUMMARY.md` and `README.md`
pub fn convert_package(
    package: &mut DocxPackage,
    config: &BookConfig,
    clean: bool,
    observer: &dyn ConversionObserver,
) -> Result<ConvertResult> {
    let start = Instant::now();
    let mut session = ConversionSession::new(config, observer);
    info!(
        document = package.document_part(),
        elements = package.body().len(),
        "starting conversion"
    );

    session.phase("Preparing output directory");
    let assets_path = prepare_output_dir(&config.output_dir, &config.assets_dir, clean)?;

    session.phase("Extracting images");
    let assets = extract_assets(package, &assets_path, &mut session);

    session.phase("Splitting sections");
    let segmentation = segment(package.body(), &assets, &mut session);

    session.phase("Writing sections");
    let mut files = write_sections(&config.output_dir, &segmentation.toc, &segmentation.sections)?;

    session.phase("Writing book files");
    let meta = BookMeta::from(config);
    files.extend(write_artifacts(
        &config.output_dir,
        &meta,
        &segmentation.toc,
        session.labels(),
    )?);

    let outline = build_outline(&segmentation.toc);
    let result = ConvertResult {
        output_dir: config.output_dir.clone(),
        toc: segmentation.toc,
        outline,
        files,
        images: assets.len(),
        dropped: session.dropped(),
        fallbacks: session.fallbacks(),
        single_file: segmentation.single_file,
        elapsed: start.elapsed(),
    };

    info!(
        entries = result.toc.len(),
        files = result.files.len(),
        images = result.images,
        dropped = result.dropped,
        elapsed_ms = result.elapsed.as_millis() as u64,
        "conversion complete"
    );
    Ok(result)
}

/// Read a `.docx` and report its structure without writing anything.
#[instrument(skip_all, fields(input = %input.display()))]
pub fn inspect_document(
    input: &Path,
    config: &BookConfig,
    observer: &dyn ConversionObserver,
) -> Result<Inspection> {
    config.validate()?;
    observer.phase("Opening document");
    let package = DocxPackage::open(input)?;
    let mut session = ConversionSession::new(config, observer);

    observer.phase("Building table of contents");
    let body = package.body();
    let toc = build_toc(body, &mut session);
    let single_file = toc.len() == 1 && toc[0] == placeholder_entry(session.labels());

    let mut inspection = Inspection {
        outline: build_outline(&toc),
        toc,
        paragraphs: 0,
        headings: 0,
        tables: 0,
        images: package.image_count(),
        single_file,
    };
    for element in body {
        match classify(element) {
            BlockNode::Heading { .. } => inspection.headings += 1,
            BlockNode::Paragraph(_) => inspection.paragraphs += 1,
            BlockNode::Table(_) => inspection.tables += 1,
        }
    }
    Ok(inspection)
}
