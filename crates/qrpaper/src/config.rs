//! Run configuration.
//!
//! A [`Config`] says where files go, how arXiv is reached, and whether intermediate files
//! are removed at the end. Defaults reproduce the classic behaviour: everything in the
//! current directory, QR codes under `.tempqr/`, certificates verified.
//!
//! ```
//! use qrpaper::config::Config;
//!
//! let config = Config::default().with_output_dir("papers").with_insecure(true);
//! assert!(config.fetcher.insecure);
//! assert_eq!(config.layout().code_dir(), std::path::Path::new("papers/.tempqr"));
//! ```

use super::*;
use crate::fetch::FetcherConfig;

/// Settings for one run of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
  /// Directory receiving final and temporary documents
  pub output_dir:    PathBuf,
  /// Name of the code image directory, created inside `output_dir`
  pub code_dir_name: String,
  /// How arXiv is reached
  pub fetcher:       FetcherConfig,
  /// Leave temporary documents and code images behind
  pub keep_temp:     bool,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      output_dir:    PathBuf::from("."),
      code_dir_name: DEFAULT_CODE_DIR.to_string(),
      fetcher:       FetcherConfig::default(),
      keep_temp:     false,
    }
  }
}

impl Config {
  /// Sets the directory receiving the documents.
  pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
    self.output_dir = output_dir.into();
    self
  }

  /// Sets the name of the code image directory.
  pub fn with_code_dir_name(mut self, code_dir_name: impl Into<String>) -> Self {
    self.code_dir_name = code_dir_name.into();
    self
  }

  /// Replaces the fetcher settings.
  pub fn with_fetcher(mut self, fetcher: FetcherConfig) -> Self {
    self.fetcher = fetcher;
    self
  }

  /// Turns certificate verification off (or back on).
  pub fn with_insecure(mut self, insecure: bool) -> Self {
    self.fetcher.insecure = insecure;
    self
  }

  /// Keeps temporary files after the run.
  pub fn with_keep_temp(mut self, keep_temp: bool) -> Self {
    self.keep_temp = keep_temp;
    self
  }

  /// Checks the values that would otherwise only fail halfway through a run.
  ///
  /// # Errors
  ///
  /// Returns [`QrPaperError::Config`] if the output directory is not a directory or the code
  /// directory name would escape it.
  pub fn validate(&self) -> Result<()> {
    if self.output_dir.exists() && !self.output_dir.is_dir() {
      return Err(QrPaperError::Config(format!(
        "Output path {} is not a directory",
        self.output_dir.display()
      )));
    }
    let name = Path::new(&self.code_dir_name);
    if self.code_dir_name.is_empty()
      || name.components().count() != 1
      || !matches!(name.components().next(), Some(std::path::Component::Normal(_)))
    {
      return Err(QrPaperError::Config(format!(
        "Code directory name \"{}\" must be a single directory name",
        self.code_dir_name
      )));
    }
    Ok(())
  }

  /// The file layout implied by these settings.
  pub fn layout(&self) -> Layout { Layout::new(&self.output_dir, &self.code_dir_name) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults() {
    let config = Config::default();
    assert!(!config.fetcher.insecure);
    assert!(!config.keep_temp);
    assert_eq!(config.layout(), Layout::default());
    assert!(config.validate().is_ok());
  }

  #[test]
  fn test_code_dir_must_stay_inside_output_dir() {
    for name in ["", "..", "a/b", "/tmp"] {
      let config = Config::default().with_code_dir_name(name);
      assert!(matches!(config.validate(), Err(QrPaperError::Config(_))), "accepted {name:?}");
    }
    assert!(Config::default().with_code_dir_name(".codes").validate().is_ok());
  }

  #[test]
  fn test_output_dir_must_be_a_directory() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("not-a-dir");
    fs::write(&file, b"").unwrap();

    assert!(Config::default().with_output_dir(&file).validate().is_err());
    assert!(Config::default().with_output_dir(dir.path()).validate().is_ok());
    // created on demand
    assert!(Config::default().with_output_dir(dir.path().join("new")).validate().is_ok());
  }
}
