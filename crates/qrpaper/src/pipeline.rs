//! Sequencing the pipeline over a batch of papers.
//!
//! A run walks through four phases, strictly in order, and within each phase handles the
//! identifiers one after the other:
//!
//! ```text
//! Fetching -> CodeGenerating -> Compositing -> CleaningUp -> Done
//! ```
//!
//! A failure is recorded against its identifier and phase, and that identifier is dropped
//! from the later phases; the rest of the batch carries on. Cleanup always runs (unless
//! disabled in the [`Config`](crate::config::Config)), so a partially failed run still
//! leaves no intermediate files behind. The resulting [`RunReport`] tells exactly which
//! papers made it.
//!
//! Progress is pushed to a [`Reporter`]; the CLI prints it, tests record it.

use super::*;
use crate::{
  cleanup::{cleanup, CleanupReport},
  code::CodeGenerator,
  compose::Compositor,
  config::Config,
  fetch::DocumentSource,
  identifier::Extraction,
};

/// The stages of a run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
  /// Downloading documents
  Fetching,
  /// Rendering QR codes
  CodeGenerating,
  /// Stamping codes onto documents
  Compositing,
  /// Removing intermediate files
  CleaningUp,
}

impl Phase {
  /// Headline announcing the phase.
  pub fn banner(&self) -> &'static str {
    match self {
      Phase::Fetching => "Downloading papers: ....",
      Phase::CodeGenerating => "Generating QR codes: ....",
      Phase::Compositing => "Merging QRs & PDFs: ....",
      Phase::CleaningUp => "Cleaning up: ....",
    }
  }

  /// Word printed next to an identifier that made it through the phase.
  pub fn done_label(&self) -> &'static str {
    match self {
      Phase::Fetching => "Downloaded",
      Phase::CodeGenerating => "Done",
      Phase::Compositing => "Merged",
      Phase::CleaningUp => "Cleaned",
    }
  }
}

impl Display for Phase {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Phase::Fetching => write!(f, "fetching"),
      Phase::CodeGenerating => write!(f, "code generation"),
      Phase::Compositing => write!(f, "compositing"),
      Phase::CleaningUp => write!(f, "cleanup"),
    }
  }
}

/// Receives progress events from a [`Pipeline`].
pub trait Reporter {
  /// A phase is about to process its items.
  fn phase_started(&mut self, phase: Phase);

  /// An item is about to be processed; `url` is the paper's source URL.
  fn item_started(&mut self, _phase: Phase, _identifier: &Identifier, _url: &str) {}

  /// An item went through `phase`, successfully or not.
  fn item_finished(
    &mut self,
    phase: Phase,
    identifier: &Identifier,
    outcome: core::result::Result<(), &QrPaperError>,
  );
}

/// A [`Reporter`] that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
  fn phase_started(&mut self, phase: Phase) { debug!("Starting {phase}") }

  fn item_finished(
    &mut self,
    phase: Phase,
    identifier: &Identifier,
    outcome: core::result::Result<(), &QrPaperError>,
  ) {
    if let Err(e) = outcome {
      debug!("{identifier} failed during {phase}: {e}");
    }
  }
}

/// A paper that did not make it to the end of the run.
#[derive(Debug)]
pub struct ItemFailure {
  /// The paper that failed
  pub identifier: Identifier,
  /// The phase it failed in
  pub phase:      Phase,
  /// Why it failed
  pub error:      QrPaperError,
}

/// How the cleanup phase went.
#[derive(Debug, Default)]
pub enum CleanupOutcome {
  /// Nothing to clean, or cleanup disabled.
  #[default]
  Skipped,
  /// Cleanup ran; what it removed.
  Completed(CleanupReport),
  /// Cleanup stopped on an I/O error.
  Failed(QrPaperError),
}

/// Outcome of a whole run.
#[derive(Debug, Default)]
pub struct RunReport {
  /// Final documents written, in input order
  pub completed: Vec<PathBuf>,
  /// Papers that failed, in the order they failed
  pub failures:  Vec<ItemFailure>,
  /// How the cleanup phase went
  pub cleanup:   CleanupOutcome,
}

impl RunReport {
  /// Every paper produced a final document and nothing went wrong while cleaning up.
  pub fn is_success(&self) -> bool {
    self.failures.is_empty() && !matches!(self.cleanup, CleanupOutcome::Failed(_))
  }

  /// Papers attempted, counting duplicates.
  pub fn total(&self) -> usize { self.completed.len() + self.failures.len() }
}

/// Drives one batch of identifiers through every phase.
pub struct Pipeline<S, R> {
  /// Where documents come from
  source:     S,
  /// Where progress goes
  reporter:   R,
  /// Paths of every artifact
  layout:     Layout,
  /// Renders code images
  generator:  CodeGenerator,
  /// Stamps code images onto documents
  compositor: Compositor,
  /// Skip the cleanup phase
  keep_temp:  bool,
}

impl<S: DocumentSource, R: Reporter> Pipeline<S, R> {
  /// Builds a pipeline laid out and configured according to `config`.
  pub fn new(config: &Config, source: S, reporter: R) -> Self {
    Self {
      source,
      reporter,
      layout: config.layout(),
      generator: CodeGenerator::new(),
      compositor: Compositor::new(),
      keep_temp: config.keep_temp,
    }
  }

  /// The reporter, for inspecting what it collected.
  pub fn reporter(&self) -> &R { &self.reporter }

  /// Where this pipeline puts its files.
  pub fn layout(&self) -> &Layout { &self.layout }

  /// Processes every identifier of `extraction`.
  ///
  /// An empty extraction does nothing at all: no phase starts and no file is created.
  pub async fn run(&mut self, extraction: &Extraction) -> RunReport {
    let mut report = RunReport::default();
    if extraction.is_empty() {
      info!("No arXiv identifiers to process");
      return report;
    }

    let items: Vec<(ArtifactPaths, &str)> =
      extraction.iter().map(|(identifier, url)| (self.layout.paths_for(identifier), url)).collect();

    if let Err(e) = fs::create_dir_all(self.layout.output_dir()) {
      warn!("Cannot create output directory {:?}: {e}", self.layout.output_dir());
      // nothing can be written anywhere; every item fails up front
      for (paths, _) in items {
        let error = std::io::Error::new(e.kind(), e.to_string()).into();
        report.failures.push(ItemFailure { identifier: paths.identifier, phase: Phase::Fetching, error });
      }
      return report;
    }

    self.reporter.phase_started(Phase::Fetching);
    let mut fetched = Vec::with_capacity(items.len());
    for (paths, url) in items {
      self.reporter.item_started(Phase::Fetching, &paths.identifier, url);
      let outcome = self.source.fetch(&paths.identifier, &paths.temp_document).await;
      if self.settle(Phase::Fetching, &paths.identifier, outcome, &mut report) {
        fetched.push((paths, url));
      }
    }

    self.reporter.phase_started(Phase::CodeGenerating);
    let mut generated = Vec::with_capacity(fetched.len());
    for (paths, url) in fetched {
      self.reporter.item_started(Phase::CodeGenerating, &paths.identifier, url);
      let outcome = self.generator.generate(url, &paths.code_image);
      if self.settle(Phase::CodeGenerating, &paths.identifier, outcome, &mut report) {
        generated.push((paths, url));
      }
    }

    self.reporter.phase_started(Phase::Compositing);
    for (paths, url) in generated {
      self.reporter.item_started(Phase::Compositing, &paths.identifier, url);
      let outcome =
        self.compositor.stamp(&paths.temp_document, &paths.code_image, &paths.final_document).map(drop);
      if self.settle(Phase::Compositing, &paths.identifier, outcome, &mut report) {
        report.completed.push(paths.final_document);
      }
    }

    report.cleanup = if self.keep_temp {
      info!("Keeping temporary files in {:?}", self.layout.output_dir());
      CleanupOutcome::Skipped
    } else {
      self.reporter.phase_started(Phase::CleaningUp);
      match cleanup(&self.layout, extraction.identifiers()) {
        Ok(cleaned) => CleanupOutcome::Completed(cleaned),
        Err(e) => {
          warn!("Cleanup failed: {e}");
          CleanupOutcome::Failed(e)
        },
      }
    };

    info!("Run finished: {} completed, {} failed", report.completed.len(), report.failures.len());
    report
  }

  /// Reports the outcome of one item and records it if it failed. Returns whether the item
  /// goes on to the next phase.
  fn settle(
    &mut self,
    phase: Phase,
    identifier: &Identifier,
    outcome: Result<()>,
    report: &mut RunReport,
  ) -> bool {
    match outcome {
      Ok(()) => {
        self.reporter.item_finished(phase, identifier, Ok(()));
        true
      },
      Err(error) => {
        warn!("{identifier} failed during {phase}: {error}");
        self.reporter.item_finished(phase, identifier, Err(&error));
        report.failures.push(ItemFailure { identifier: identifier.clone(), phase, error });
        false
      },
    }
  }
}
