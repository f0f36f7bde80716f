//! Errors surfaced by the `qrpaper` binary.

use qrpaper::error::QrPaperError;
use thiserror::Error;

/// Result alias for the CLI.
pub type Result<T> = core::result::Result<T, QrPaperCliError>;

/// Everything that makes the CLI exit unsuccessfully.
#[derive(Error, Debug)]
pub enum QrPaperCliError {
  /// The library refused the configuration or could not set up the fetcher.
  #[error(transparent)]
  QrPaper(#[from] QrPaperError),

  /// Reading standard input failed.
  #[error("Failed to read input: {0}")]
  Stdin(#[from] std::io::Error),

  /// Some papers did not produce a stamped document.
  #[error("{failed} of {total} paper(s) could not be processed")]
  RunFailed {
    /// Papers that failed
    failed: usize,
    /// Papers attempted
    total:  usize,
  },

  /// Temporary files could not all be removed.
  #[error("Failed to remove temporary files: {0}")]
  Cleanup(QrPaperError),
}
