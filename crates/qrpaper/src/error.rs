//! Error types for the qrpaper library.
//!
//! Every step of the pipeline (fetching, rendering, compositing, cleanup) reports failures
//! through [`QrPaperError`]. Errors from the underlying crates are wrapped transparently so the
//! original cause is never lost.
//!
//! # Examples
//!
//! ```no_run
//! use qrpaper::{error::QrPaperError, fetch::{ArxivFetcher, FetcherConfig}, identifier::Identifier};
//!
//! # async fn example() -> Result<(), QrPaperError> {
//! let fetcher = ArxivFetcher::new(FetcherConfig::default())?;
//! match fetcher.pdf_url(&Identifier::new("2401.00000")).await {
//!   Err(QrPaperError::NotFound(id)) => println!("arXiv has no paper {id}"),
//!   Err(QrPaperError::Network(e)) => println!("Network error: {e}"),
//!   Err(e) => println!("Other error: {e}"),
//!   Ok(url) => println!("PDF lives at {url}"),
//! }
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Error type alias used for the [`qrpaper`](crate) crate.
pub type Result<T> = core::result::Result<T, QrPaperError>;

/// Errors that can occur while turning an arXiv link into a stamped PDF.
#[derive(Error, Debug)]
pub enum QrPaperError {
  /// arXiv returned an empty result set for the identifier.
  #[error("No paper found on arXiv for identifier \"{0}\"")]
  NotFound(String),

  /// arXiv answered, but with an error entry or an unsuccessful status code.
  ///
  /// The string carries the message from the API (or the HTTP status) for debugging.
  #[error("API error: {0}")]
  ApiError(String),

  /// A network request failed.
  ///
  /// This covers connection failures, timeouts and TLS errors.
  #[error(transparent)]
  Network(#[from] reqwest::Error),

  /// A file system operation failed.
  #[error(transparent)]
  Path(#[from] std::io::Error),

  /// The arXiv Atom feed could not be deserialized.
  #[error("Failed to parse arXiv response: {0}")]
  Feed(#[from] quick_xml::DeError),

  /// The downloaded document could not be parsed, edited or saved.
  #[error(transparent)]
  Lopdf(#[from] lopdf::Error),

  /// The QR code image could not be written or read back.
  #[error(transparent)]
  Image(#[from] image::ImageError),

  /// The URL could not be encoded as a QR code (for instance, it is too long).
  #[error("Failed to encode QR code: {0}")]
  QrCode(#[from] qrcode::types::QrError),

  /// The document has no pages, so there is nothing to stamp.
  #[error("Document {} has no pages to stamp", .0.display())]
  NoPages(PathBuf),

  /// The run was configured with invalid values.
  #[error("{0}")]
  Config(String),
}
