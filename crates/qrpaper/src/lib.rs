//! Download arXiv papers and stamp a scannable link back to them onto their first page.
//!
//! `qrpaper` takes free-form text (an email, a reading list, a chat log), finds every arXiv
//! abstract URL in it, and for each paper:
//!
//! - downloads the PDF from arXiv,
//! - renders a QR code of the abstract page URL,
//! - draws that QR code in the top-left corner of the first page,
//! - writes the result as `<identifier>.pdf` and removes the intermediate files.
//!
//! Printed copies of a paper can then be scanned to get back to its arXiv page.
//!
//! # Getting Started
//!
//! ```no_run
//! use qrpaper::{
//!   config::Config,
//!   fetch::ArxivFetcher,
//!   identifier::Extraction,
//!   pipeline::{Pipeline, SilentReporter},
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!   let extraction = Extraction::from_text("https://arxiv.org/abs/2301.07041");
//!
//!   let config = Config::default();
//!   let fetcher = ArxivFetcher::new(config.fetcher.clone())?;
//!   let mut pipeline = Pipeline::new(&config, fetcher, SilentReporter);
//!
//!   let report = pipeline.run(&extraction).await;
//!   assert!(report.is_success());
//!   Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`identifier`]: Finding arXiv identifiers in text
//! - [`layout`]: Where every intermediate and final file lives
//! - [`fetch`]: Querying arXiv and downloading PDFs
//! - [`code`]: Rendering QR codes
//! - [`compose`]: Stamping a QR code onto a PDF page
//! - [`cleanup`]: Removing intermediate files
//! - [`pipeline`]: Sequencing all of the above over a batch of papers
//! - [`config`]: Run configuration
//! - [`prelude`]: Common traits and types for ergonomic imports

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::{
  fmt::Display,
  fs,
  io::ErrorKind,
  path::{Path, PathBuf},
  time::Duration,
};

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info, trace, warn};
#[cfg(test)]
use {tempfile::tempdir, tracing_test::traced_test};

pub mod cleanup;
pub mod code;
pub mod compose;
pub mod config;
pub mod error;
pub mod fetch;
pub mod identifier;
pub mod layout;
pub mod pipeline;

#[cfg(test)] mod fixtures;

use crate::{error::*, identifier::Identifier, layout::*};

/// Common traits and types for ergonomic imports.
///
/// ```no_run
/// use qrpaper::prelude::*;
///
/// fn describe(error: &QrPaperError) -> String { error.to_string() }
/// ```
pub mod prelude {
  pub use crate::{error::QrPaperError, fetch::DocumentSource, pipeline::Reporter};
}
