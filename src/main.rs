// src/main.rs
mod acquisition;
mod extractors;
mod server;
mod storage;
mod utils;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

use acquisition::{AcquisitionConfig, Document, TextAcquisition};
use extractors::{SectionCatalog, SyllabusExtractor};
use storage::StorageManager;
use utils::error::AcquisitionError;
use utils::AppError;

/// Extracts late-work policy, grading scale and grading weights from syllabus PDFs
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    ocr: OcrArgs,

    /// JSON file replacing the built-in section catalog
    #[arg(long, env = "SYLLABUS_CATALOG", global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct OcrArgs {
    /// Tesseract language model used when falling back to OCR
    #[arg(long, env = "SYLLABUS_OCR_LANG", default_value = "eng", global = true)]
    ocr_lang: String,

    /// Rasterization resolution for OCR
    #[arg(long, env = "SYLLABUS_OCR_DPI", default_value_t = 300, global = true)]
    dpi: u32,

    /// pdftoppm executable
    #[arg(long, env = "SYLLABUS_PDFTOPPM", default_value = "pdftoppm", global = true)]
    pdftoppm: String,

    /// tesseract executable
    #[arg(long, env = "SYLLABUS_TESSERACT", default_value = "tesseract", global = true)]
    tesseract: String,
}

impl From<&OcrArgs> for AcquisitionConfig {
    fn from(args: &OcrArgs) -> Self {
        Self {
            language: args.ocr_lang.clone(),
            dpi: args.dpi,
            pdftoppm: args.pdftoppm.clone(),
            tesseract: args.tesseract.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract sections from a local PDF and print them as JSON
    Extract {
        /// Path to the syllabus PDF (left untouched; a temp copy is processed)
        input: PathBuf,

        /// Directory to save the result and metadata into
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Debug mode - also save the acquired text and an annotated copy
        #[arg(short, long, requires = "output_dir")]
        debug: bool,
    },

    /// Serve the upload endpoint over HTTP
    Serve {
        /// Address to listen on
        #[arg(long, env = "SYLLABUS_BIND", default_value = "127.0.0.1:8080")]
        bind: String,

        /// Maximum accepted upload size in megabytes
        #[arg(long, default_value_t = 16)]
        max_upload_mb: usize,
    },
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let cli = Cli::parse();
    tracing::debug!("Starting with args: {:?}", cli);

    // 3. Load the section catalog (fixed configuration for the process lifetime)
    let catalog = match &cli.catalog {
        Some(path) => SectionCatalog::from_json_file(path)?,
        None => SectionCatalog::default(),
    };

    // 4. Build the pipeline once
    let config = AcquisitionConfig::from(&cli.ocr);
    tracing::debug!("OCR fallback: {:?}", config);
    let extractor = Arc::new(SyllabusExtractor::new(&catalog, TextAcquisition::from_config(&config))?);

    match cli.command {
        Command::Extract { input, output_dir, debug } => {
            run_extract(extractor, &catalog, &input, output_dir.as_deref(), debug).await
        }
        Command::Serve { bind, max_upload_mb } => {
            server::serve(&bind, extractor, upload_limit_bytes(max_upload_mb)?).await
        }
    }
}

fn upload_limit_bytes(max_upload_mb: usize) -> Result<usize, AppError> {
    max_upload_mb
        .checked_mul(1024 * 1024)
        .ok_or_else(|| AppError::Config(format!("--max-upload-mb {} is too large", max_upload_mb)))
}

async fn run_extract(
    extractor: Arc<SyllabusExtractor>,
    catalog: &SectionCatalog,
    input: &Path,
    output_dir: Option<&Path>,
    debug: bool,
) -> Result<(), AppError> {
    tracing::info!("Processing {}", input.display());

    let label = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| AppError::Config(format!("{} is not a file path", input.display())))?;
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| label.clone());

    // Work on a temp copy; the pipeline deletes its document when done.
    let source_path = input.to_path_buf();
    let extraction = tokio::task::spawn_blocking(move || -> Result<extractors::Extraction, AcquisitionError> {
        let mut source = std::fs::File::open(&source_path)?;
        let document = Document::from_reader(&mut source, &label)?;
        extractor.extract_detailed(document)
    })
    .await
    .map_err(|e| AppError::Processing(format!("extraction task failed: {}", e)))??;

    let json = serde_json::to_string_pretty(&extraction.sections)
        .map_err(|e| AppError::Processing(format!("could not serialize result: {}", e)))?;
    println!("{}", json);

    if let Some(dir) = output_dir {
        let storage = StorageManager::new(dir)?;
        let source = input.to_string_lossy();
        storage.save_result(&stem, &extraction.sections)?;
        storage.save_metadata(&stem, &source, extraction.text.len(), &extraction.sections)?;

        if debug {
            storage.save_text(&stem, "acquired", extraction.text.as_str())?;
            let annotated = utils::text_debug::annotate(extraction.text.as_str(), catalog)?;
            storage.save_text(&stem, "annotated", &annotated)?;
        }
    }

    tracing::info!(
        "Processing finished. Found {} of {} sections",
        extraction.sections.found_count(),
        catalog.len()
    );
    Ok(())
}
