//! Where each file of a run lives.
//!
//! Every paper goes through three files: the downloaded document, the QR code image and the
//! stamped final document. [`Layout`] computes all three paths up front as an
//! [`ArtifactPaths`] value, which is then handed to each pipeline step, so no step has to
//! rebuild a file name from an identifier on its own.
//!
//! For identifier `2109.14101` and output directory `out/`:
//!
//! | artifact         | path                         |
//! |------------------|------------------------------|
//! | temp document    | `out/temp2109.14101.pdf`     |
//! | code image       | `out/.tempqr/2109.14101.png` |
//! | final document   | `out/2109.14101.pdf`         |

use super::*;

/// Default name of the directory holding QR code images while a run is in progress.
pub const DEFAULT_CODE_DIR: &str = ".tempqr";

/// Prefix that marks a downloaded document as not yet stamped.
pub const TEMP_DOCUMENT_PREFIX: &str = "temp";

/// Directory structure of a run, rooted at the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
  /// Where final (and temporary) documents are written.
  output_dir: PathBuf,
  /// Where QR code images are written; always inside `output_dir`.
  code_dir:   PathBuf,
}

/// All paths belonging to one paper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
  /// The paper these paths belong to
  pub identifier:     Identifier,
  /// Downloaded document, removed at the end of the run
  pub temp_document:  PathBuf,
  /// Rendered QR code, removed at the end of the run
  pub code_image:     PathBuf,
  /// Stamped document, the only file that outlives the run
  pub final_document: PathBuf,
}

impl Layout {
  /// Lays out a run in `output_dir`, with code images in its `code_dir_name` subdirectory.
  pub fn new(output_dir: impl Into<PathBuf>, code_dir_name: &str) -> Self {
    let output_dir = output_dir.into();
    let code_dir = output_dir.join(code_dir_name);
    Self { output_dir, code_dir }
  }

  /// Directory receiving final and temporary documents.
  pub fn output_dir(&self) -> &Path { &self.output_dir }

  /// Directory receiving code images.
  pub fn code_dir(&self) -> &Path { &self.code_dir }

  /// Computes the artifact paths for one identifier.
  pub fn paths_for(&self, identifier: &Identifier) -> ArtifactPaths {
    let stem = identifier.file_stem();
    ArtifactPaths {
      identifier:     identifier.clone(),
      temp_document:  self.output_dir.join(format!("{TEMP_DOCUMENT_PREFIX}{stem}.pdf")),
      code_image:     self.code_dir.join(format!("{stem}.png")),
      final_document: self.output_dir.join(format!("{stem}.pdf")),
    }
  }
}

impl Default for Layout {
  fn default() -> Self { Self::new(".", DEFAULT_CODE_DIR) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_paths_follow_naming_convention() {
    let layout = Layout::new("out", DEFAULT_CODE_DIR);
    let paths = layout.paths_for(&Identifier::new("2109.14101"));

    assert_eq!(paths.temp_document, PathBuf::from("out/temp2109.14101.pdf"));
    assert_eq!(paths.code_image, PathBuf::from("out/.tempqr/2109.14101.png"));
    assert_eq!(paths.final_document, PathBuf::from("out/2109.14101.pdf"));
    assert_eq!(layout.code_dir(), Path::new("out/.tempqr"));
  }

  #[test]
  fn test_old_style_identifier_stays_in_output_dir() {
    let layout = Layout::default();
    let paths = layout.paths_for(&Identifier::new("hep-th/9901001"));

    assert_eq!(paths.final_document.parent(), Some(Path::new(".")));
    assert_eq!(paths.code_image.parent(), Some(layout.code_dir()));
    assert_eq!(paths.identifier.as_str(), "hep-th/9901001");
  }

  #[test]
  fn test_distinct_identifiers_never_share_paths() {
    let layout = Layout::default();
    let raw = ["A", "B", "a/b", "a_b", "a%2Fb"];

    let mut all = Vec::new();
    for id in raw {
      let paths = layout.paths_for(&Identifier::new(id));
      all.extend([paths.temp_document, paths.code_image, paths.final_document]);
    }
    for (i, left) in all.iter().enumerate() {
      for right in &all[i + 1..] {
        assert_ne!(left, right);
      }
    }
  }
}
