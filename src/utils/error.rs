// src/utils/error.rs
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum AcquisitionError {
    #[error("Document I/O failed: {0}")]
    Io(#[from] std::io::Error), // Reading/writing the temp document

    #[error("PDF parsing failed: {0}")]
    Pdf(#[from] lopdf::Error), // Native text layer could not be read

    #[error("Rasterization of page {page} failed: {source}")]
    Rasterize { page: u32, source: ToolError },

    #[error("Text recognition on page {page} failed: {source}")]
    Recognize { page: u32, source: ToolError },

    #[error("Neither native extraction nor OCR produced any text")]
    NoText,
}

/// Failures of the external rasterization/OCR tools.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("could not run `{tool}`: {source}")]
    Spawn { tool: String, source: std::io::Error },

    #[error("`{tool}` exited with {status}: {stderr}")]
    Failed { tool: String, status: std::process::ExitStatus, stderr: String },

    #[error("`{tool}` did not produce {}", .path.display())]
    MissingOutput { tool: String, path: std::path::PathBuf },
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Could not read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed catalog: {0}")]
    Parse(#[from] serde_json::Error), // Also covers unknown filter names

    #[error("Section '{0}' has no headings")]
    NoHeadings(String),

    #[error("Section '{0}' has a blank boundary")]
    EmptyBoundary(String),

    #[error("Section '{0}' is defined more than once")]
    DuplicateSection(String),

    #[error("Catalog contains no sections")]
    Empty,

    #[error("Could not compile section pattern: {0}")]
    Pattern(#[from] regex::Error),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Rejections raised by the upload layer before the pipeline ever runs.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No file provided")]
    NoFileProvided,

    #[error("No file selected")]
    NoFileSelected,

    #[error("Malformed upload: {0}")]
    Malformed(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Text acquisition failed: {0}")]
    Acquisition(#[from] AcquisitionError),

    #[error("Section catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Data processing failed: {0}")]
    Processing(String),
}
