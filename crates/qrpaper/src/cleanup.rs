//! Removing the intermediate files of a run.
//!
//! The code image directory goes first (recursively, whatever it contains), then the
//! temporary document of every identifier. Files that are already gone are counted and
//! skipped rather than treated as an error, so cleaning up after a partially failed run,
//! or twice in a row, is safe.

use super::*;

/// What a cleanup pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
  /// Paths that existed and were removed
  pub removed: usize,
  /// Paths that were expected but did not exist
  pub missing: usize,
}

/// Removes the code directory of `layout`, then the temporary document of every identifier.
///
/// # Errors
///
/// Any I/O error other than "not found" is returned immediately; paths after it are left in
/// place.
pub fn cleanup(layout: &Layout, identifiers: &[Identifier]) -> Result<CleanupReport> {
  let mut report = CleanupReport::default();

  let code_dir = layout.code_dir();
  debug!("Removing code directory: {code_dir:?}");
  tally(&mut report, code_dir, fs::remove_dir_all(code_dir))?;

  for identifier in identifiers {
    let temp_document = layout.paths_for(identifier).temp_document;
    debug!("Removing temporary document: {temp_document:?}");
    tally(&mut report, &temp_document, fs::remove_file(&temp_document))?;
  }

  info!("Cleanup removed {} path(s), {} already missing", report.removed, report.missing);
  Ok(report)
}

/// Records the outcome of one removal.
fn tally(report: &mut CleanupReport, path: &Path, outcome: std::io::Result<()>) -> Result<()> {
  match outcome {
    Ok(()) => report.removed += 1,
    Err(e) if e.kind() == ErrorKind::NotFound => {
      warn!("Nothing to remove at {path:?}");
      report.missing += 1;
    },
    Err(e) => return Err(e.into()),
  }
  Ok(())
}
