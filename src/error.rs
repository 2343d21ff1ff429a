//! Error types for pdf2docx.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pdf2docx operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during conversion.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input path does not exist.
    #[error("Input file not found: {0}")]
    InputMissing(PathBuf),

    /// The input could not be parsed as a PDF.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The conversion was cancelled via the cancellation token.
    #[error("Conversion cancelled")]
    Cancelled,

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Invalid page range specification.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// Internal packager state error; the package would be malformed.
    #[error("Package error: {0}")]
    Package(String),

    /// Error writing the zip container.
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Cancelled;
        assert_eq!(err.to_string(), "Conversion cancelled");

        let err = Error::PageOutOfRange(10, 5);
        assert_eq!(
            err.to_string(),
            "Page 10 is out of range (document has 5 pages)"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_input_missing_display() {
        let err = Error::InputMissing(PathBuf::from("missing.pdf"));
        assert!(err.to_string().contains("missing.pdf"));
    }
}
