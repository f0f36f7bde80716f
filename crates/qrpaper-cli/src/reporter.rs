//! Colored progress output on stdout.

use console::style;
use qrpaper::{error::QrPaperError, identifier::Identifier, pipeline::{Phase, Reporter}};

/// Prefix for informational messages
pub static INFO_PREFIX: &str = "ℹ ";
/// Prefix for success messages
pub static SUCCESS_PREFIX: &str = "✓ ";
/// Prefix for error messages
pub static ERROR_PREFIX: &str = "✗ ";
/// Tree branch for all but the last item of a list
pub static ITEM_PREFIX: &str = "├─";
/// Tree branch for the last item of a list
pub static LAST_ITEM_PREFIX: &str = "└─";
/// Separates a failed paper from its error
pub static ARROW: &str = "→";

/// Prints a red banner per phase and a line per paper.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl ConsoleReporter {
  /// Creates a reporter writing to stdout.
  pub fn new() -> Self { Self }
}

impl Reporter for ConsoleReporter {
  fn phase_started(&mut self, phase: Phase) {
    let banner = phase.banner();
    println!("{}", style(banner).red());
    println!("{}", style("=".repeat(banner.chars().count())).red());
  }

  fn item_started(&mut self, phase: Phase, _identifier: &Identifier, url: &str) {
    if phase == Phase::CodeGenerating {
      println!("{url}");
    }
  }

  fn item_finished(
    &mut self,
    phase: Phase,
    identifier: &Identifier,
    outcome: Result<(), &QrPaperError>,
  ) {
    match outcome {
      Ok(()) => println!("{}", style(format!("{identifier} ... {}", phase.done_label())).green()),
      Err(e) => println!("{}", style(format!("{identifier} ... Failed: {e}")).red()),
    }
  }
}
