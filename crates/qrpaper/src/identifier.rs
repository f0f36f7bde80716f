//! Finding arXiv identifiers in free-form text.
//!
//! Input is whatever the user pastes in: one abstract link per line, or links buried in
//! prose. Every occurrence of `https://arxiv.org/abs/<id>` is captured, in order of
//! appearance, duplicates included.
//!
//! # Examples
//!
//! ```
//! use qrpaper::identifier::Extraction;
//!
//! let extraction = Extraction::from_text("see https://arxiv.org/abs/2109.14101 for details");
//! assert_eq!(extraction.identifiers()[0].as_str(), "2109.14101");
//! assert_eq!(extraction.urls()[0], "https://arxiv.org/abs/2109.14101");
//! ```

use super::*;

/// Base of every abstract page URL; an identifier appended to it gives the paper's source URL.
pub const SOURCE_BASE_URL: &str = "https://arxiv.org/abs/";

lazy_static! {
  /// Abstract page URLs. The identifier runs up to the next whitespace character.
  static ref ABSTRACT_URL: Regex = Regex::new(r"(?m)https://arxiv\.org/abs/[ \t]*(\S+)").unwrap();
}

/// A token naming one paper on arXiv, such as `2109.14101` or `math.AG/0601001`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(String);

impl Identifier {
  /// Wraps a raw identifier. No validation is performed.
  pub fn new(raw: impl Into<String>) -> Self { Self(raw.into()) }

  /// The identifier as captured from the input.
  pub fn as_str(&self) -> &str { &self.0 }

  /// The canonical abstract page URL for this paper.
  pub fn source_url(&self) -> String { format!("{SOURCE_BASE_URL}{}", self.0) }

  /// A version of the identifier that is safe to use as a file name.
  ///
  /// Old-style identifiers contain a `/` (`math.AG/0601001`), which would otherwise be read as
  /// a directory separator. Separators are percent-escaped, and so is `%` itself, which keeps
  /// distinct identifiers on distinct stems.
  pub fn file_stem(&self) -> String {
    let mut stem = String::with_capacity(self.0.len());
    for c in self.0.chars() {
      match c {
        '%' => stem.push_str("%25"),
        '/' => stem.push_str("%2F"),
        '\\' => stem.push_str("%5C"),
        c => stem.push(c),
      }
    }
    stem
  }
}

impl Display for Identifier {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(&self.0) }
}

impl AsRef<str> for Identifier {
  fn as_ref(&self) -> &str { &self.0 }
}

/// The identifiers found in a block of text, paired with their reconstructed source URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
  /// Identifiers in order of appearance.
  identifiers: Vec<Identifier>,
  /// `urls[i]` is always the source URL of `identifiers[i]`.
  urls:        Vec<String>,
}

impl Extraction {
  /// Scans `text` for arXiv abstract URLs.
  ///
  /// Matching is case-sensitive. Nothing found means an empty extraction, which is not an
  /// error: the pipeline simply has no work to do.
  pub fn from_text(text: &str) -> Self {
    let identifiers: Vec<Identifier> = ABSTRACT_URL
      .captures_iter(text)
      .filter_map(|captures| captures.get(1))
      .map(|m| Identifier::new(m.as_str()))
      .collect();
    let urls = identifiers.iter().map(Identifier::source_url).collect();

    debug!("Extracted {} identifier(s) from {} bytes of input", identifiers.len(), text.len());
    Self { identifiers, urls }
  }

  /// Identifiers in order of appearance.
  pub fn identifiers(&self) -> &[Identifier] { &self.identifiers }

  /// Source URLs, parallel to [`Extraction::identifiers`].
  pub fn urls(&self) -> &[String] { &self.urls }

  /// Number of identifiers found, duplicates included.
  pub fn len(&self) -> usize { self.identifiers.len() }

  /// Whether the text contained no abstract URL at all.
  pub fn is_empty(&self) -> bool { self.identifiers.is_empty() }

  /// Iterates over `(identifier, source_url)` pairs.
  pub fn iter(&self) -> impl Iterator<Item = (&Identifier, &str)> {
    self.identifiers.iter().zip(self.urls.iter().map(String::as_str))
  }
}
