//! Command line interface for turning arXiv links into QR-stamped PDFs.
//!
//! Paste (or pipe) any text containing arXiv abstract links on standard input. Every paper
//! is downloaded, a QR code of its abstract URL is drawn in the top-left corner of its first
//! page, and the result is saved as `<identifier>.pdf`.
//!
//! # Usage
//!
//! ```bash
//! # One link per line, finish with Ctrl-D
//! qrpaper
//!
//! # From a reading list, into a dedicated directory
//! qrpaper --output-dir papers < reading-list.txt
//!
//! # Keep the downloaded originals and QR images around for inspection
//! echo "https://arxiv.org/abs/2301.07041" | qrpaper --keep-temp -vv
//! ```
//!
//! The process exits with a non-zero status if any paper could not be processed or the
//! temporary files could not be removed.

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::{io::Read, path::PathBuf, process::ExitCode};

use clap::{builder::ArgAction, Parser};
use console::style;
use qrpaper::{
  config::Config,
  fetch::{ArxivFetcher, FetcherConfig, ARXIV_API_URL},
  identifier::Extraction,
  pipeline::{CleanupOutcome, Pipeline, RunReport},
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

pub mod error;
pub mod reporter;

use crate::{error::*, reporter::*};

/// Command line interface configuration and argument parsing
#[derive(Parser)]
#[command(
  author,
  version,
  about = "Download arXiv papers listed on stdin and stamp a QR code of their abstract page onto each"
)]
pub struct Cli {
  /// Verbose mode (-v, -vv, -vvv) for different levels of logging detail
  #[arg(short, long, action = ArgAction::Count, help = "Increase logging verbosity")]
  verbose: u8,

  /// Directory receiving the stamped PDFs (and, while running, the temporary files)
  #[arg(long, short, default_value = ".")]
  output_dir: PathBuf,

  /// Accept invalid TLS certificates when talking to arXiv
  #[arg(long, env = "QRPAPER_INSECURE")]
  insecure: bool,

  /// Leave the downloaded originals and QR code images in place
  #[arg(long)]
  keep_temp: bool,

  /// arXiv API endpoint (mostly for testing)
  #[arg(long, hide = true, env = "QRPAPER_API_BASE", default_value = ARXIV_API_URL)]
  api_base: String,
}

/// Configures the logging system based on the verbosity level
///
/// The verbosity levels are:
/// - 0: warn (default)
/// - 1: info
/// - 2: debug
/// - 3+: trace
///
/// `RUST_LOG` takes precedence when set. Logs go to stderr so they never interleave with the
/// progress lines on stdout.
fn setup_logging(verbosity: u8) {
  let filter = match verbosity {
    0 => "warn",
    1 => "info",
    2 => "debug",
    _ => "trace",
  };

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_file(true)
    .with_line_number(true)
    .with_target(true)
    .init();
}

impl Cli {
  /// Turns the parsed arguments into a library [`Config`].
  fn config(&self) -> Config {
    Config::default()
      .with_output_dir(&self.output_dir)
      .with_keep_temp(self.keep_temp)
      .with_fetcher(
        FetcherConfig::default().with_api_base(&self.api_base).with_insecure(self.insecure),
      )
  }
}

/// Entry point for the qrpaper CLI application
///
/// Reads all of stdin, runs the pipeline, and prints a summary. Any failure is printed to
/// stderr and turned into a non-zero exit status.
#[tokio::main]
async fn main() -> ExitCode {
  let cli = Cli::parse();
  setup_logging(cli.verbose);

  match run(&cli).await {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      eprintln!("{} {}", style(ERROR_PREFIX).red(), style(e).red());
      ExitCode::FAILURE
    },
  }
}

/// Runs the whole batch described by stdin.
async fn run(cli: &Cli) -> Result<()> {
  let config = cli.config();
  config.validate()?;

  let mut input = String::new();
  std::io::stdin().read_to_string(&mut input)?;
  debug!("Read {} bytes from stdin", input.len());

  let extraction = Extraction::from_text(&input);
  if extraction.is_empty() {
    println!("{} No arXiv abstract URLs found in input", style(INFO_PREFIX).cyan());
    return Ok(());
  }

  let fetcher = ArxivFetcher::new(config.fetcher.clone())?;
  let mut pipeline = Pipeline::new(&config, fetcher, ConsoleReporter::new());
  let report = pipeline.run(&extraction).await;

  summarize(&report);
  if let CleanupOutcome::Failed(e) = report.cleanup {
    return Err(QrPaperCliError::Cleanup(e));
  }
  if !report.failures.is_empty() {
    return Err(QrPaperCliError::RunFailed { failed: report.failures.len(), total: report.total() });
  }
  Ok(())
}

/// Prints what the run produced and what went wrong.
fn summarize(report: &RunReport) {
  println!();
  println!(
    "{} {} of {} paper(s) stamped",
    style(SUCCESS_PREFIX).green(),
    style(report.completed.len()).green().bold(),
    report.total()
  );
  for (n, path) in report.completed.iter().enumerate() {
    let branch = if n + 1 == report.completed.len() { LAST_ITEM_PREFIX } else { ITEM_PREFIX };
    println!("{branch} {}", style(path.display()).yellow());
  }

  if !report.failures.is_empty() {
    println!(
      "{} {} paper(s) failed",
      style(ERROR_PREFIX).red(),
      style(report.failures.len()).red().bold()
    );
    for (n, failure) in report.failures.iter().enumerate() {
      let branch = if n + 1 == report.failures.len() { LAST_ITEM_PREFIX } else { ITEM_PREFIX };
      println!(
        "{branch} {} {ARROW} {} during {}",
        style(&failure.identifier).cyan(),
        style(&failure.error).red(),
        failure.phase
      );
    }
  }

  if let CleanupOutcome::Completed(cleaned) = &report.cleanup {
    debug!("Removed {} temporary path(s), {} already gone", cleaned.removed, cleaned.missing);
  }
}
