//! Fetching paper documents from arXiv.
//!
//! Fetching is two requests per paper, made one after the other:
//!
//! 1. a metadata query against the arXiv Atom API (`id_list=<identifier>`), from which the
//!    first entry's PDF link is taken,
//! 2. the download of that PDF, written to the paper's temporary document path.
//!
//! The pipeline only depends on the [`DocumentSource`] trait, so tests (or other
//! repositories) can substitute their own implementation.
//!
//! # Transport security
//!
//! Certificates are verified unless [`FetcherConfig::insecure`] is set explicitly. Turning
//! verification off is logged as a warning when the fetcher is built.
//!
//! # Examples
//!
//! ```no_run
//! use std::path::Path;
//!
//! use qrpaper::{fetch::{ArxivFetcher, FetcherConfig}, identifier::Identifier, prelude::*};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = ArxivFetcher::new(FetcherConfig::default())?;
//! fetcher.fetch(&Identifier::new("2301.07041"), Path::new("temp2301.07041.pdf")).await?;
//! # Ok(())
//! # }
//! ```

use super::*;

/// Default endpoint of the arXiv Atom API.
pub const ARXIV_API_URL: &str = "https://export.arxiv.org/api/query";

/// Marker found in the `<id>` of entries arXiv uses to report a bad query.
const ARXIV_ERROR_MARKER: &str = "/api/errors";

/// Something that can put the document for an identifier at a given path.
#[async_trait]
pub trait DocumentSource {
  /// Retrieves the document for `identifier` and writes it to `destination`, replacing any
  /// file already there.
  async fn fetch(&self, identifier: &Identifier, destination: &Path) -> Result<()>;
}

/// Settings for [`ArxivFetcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetcherConfig {
  /// Atom API endpoint queried for metadata
  pub api_base: String,
  /// Accept invalid TLS certificates. Off unless explicitly requested.
  pub insecure: bool,
  /// Per-request timeout
  pub timeout:  Duration,
}

impl Default for FetcherConfig {
  fn default() -> Self {
    Self { api_base: ARXIV_API_URL.to_string(), insecure: false, timeout: Duration::from_secs(60) }
  }
}

impl FetcherConfig {
  /// Points the fetcher at another Atom API endpoint.
  pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
    self.api_base = api_base.into();
    self
  }

  /// Accepts invalid TLS certificates when `insecure` is set.
  pub fn with_insecure(mut self, insecure: bool) -> Self {
    self.insecure = insecure;
    self
  }

  /// Sets the per-request timeout.
  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }
}

/// Internal representation of the arXiv API's Atom feed response.
#[derive(Debug, Deserialize)]
struct Feed {
  /// Zero or more results; only the first one is used.
  #[serde(rename = "entry", default)]
  entries: Vec<Entry>,
}

/// One result of an arXiv query.
#[derive(Debug, Deserialize)]
struct Entry {
  /// Abstract URL of the paper (e.g., "http://arxiv.org/abs/2301.07041v2"), or an error URL.
  id:      String,
  /// Abstract text, or the error message for error entries.
  #[serde(default)]
  summary: String,
  #[serde(rename = "link", default)]
  links:   Vec<Link>,
}

/// A `<link>` of an entry; arXiv lists the abstract page and the PDF.
#[derive(Debug, Deserialize)]
struct Link {
  /// Target URL
  #[serde(rename = "@href")]
  href:       String,
  /// `pdf` for the PDF link
  #[serde(rename = "@title", default)]
  title:      Option<String>,
  /// MIME type of the target
  #[serde(rename = "@type", default)]
  media_type: Option<String>,
}

impl Entry {
  /// The entry's PDF link, falling back to the `/pdf/` twin of its abstract URL.
  fn pdf_url(&self) -> String {
    let url = self
      .links
      .iter()
      .find(|link| {
        link.title.as_deref() == Some("pdf") || link.media_type.as_deref() == Some("application/pdf")
      })
      .map(|link| link.href.clone())
      .unwrap_or_else(|| self.id.replacen("/abs/", "/pdf/", 1));
    upgrade_to_https(&url)
  }
}

/// Client that fetches papers from arXiv.
#[derive(Debug, Clone)]
pub struct ArxivFetcher {
  /// Web client reused for every request of a run.
  client: reqwest::Client,
  /// Endpoint and transport settings.
  config: FetcherConfig,
}

impl ArxivFetcher {
  /// Builds the HTTP client according to `config`.
  ///
  /// # Errors
  ///
  /// Returns [`QrPaperError::Network`] if the TLS backend cannot be initialised.
  pub fn new(config: FetcherConfig) -> Result<Self> {
    let mut builder = reqwest::Client::builder()
      .timeout(config.timeout)
      .user_agent(concat!("qrpaper/", env!("CARGO_PKG_VERSION")));

    if config.insecure {
      warn!("TLS certificate verification is disabled for all arXiv requests");
      builder = builder.danger_accept_invalid_certs(true);
    }

    Ok(Self { client: builder.build()?, config })
  }

  /// The settings this fetcher was built with.
  pub fn config(&self) -> &FetcherConfig { &self.config }

  /// Queries arXiv for `identifier` and returns the PDF URL of the first result.
  ///
  /// # Errors
  ///
  /// - [`QrPaperError::NotFound`] when the result set is empty
  /// - [`QrPaperError::ApiError`] when arXiv reports a malformed query or a bad status
  /// - [`QrPaperError::Feed`] when the response is not a readable Atom feed
  pub async fn pdf_url(&self, identifier: &Identifier) -> Result<String> {
    let response = self
      .client
      .get(&self.config.api_base)
      .query(&[("id_list", identifier.as_str()), ("max_results", "1")])
      .send()
      .await?;
    debug!("Queried arXiv via: {}", response.url());

    if !response.status().is_success() {
      return Err(QrPaperError::ApiError(format!(
        "Metadata query for {identifier} failed: {}",
        response.status()
      )));
    }

    let body = response.text().await?;
    trace!("arXiv response: {body}");
    first_pdf_url(&body, identifier)
  }

  /// Downloads `url` into `destination`.
  async fn download(&self, url: &str, destination: &Path) -> Result<()> {
    let response = self.client.get(url).send().await?;

    if response.status().is_success() {
      let bytes = response.bytes().await?;
      debug!("Writing {} bytes of PDF to path: {destination:?}", bytes.len());
      tokio::fs::write(destination, bytes).await?;
      Ok(())
    } else {
      trace!("pdf_url response: {response:?}");
      Err(QrPaperError::ApiError(format!("Failed to download PDF: {}", response.status())))
    }
  }
}

#[async_trait]
impl DocumentSource for ArxivFetcher {
  async fn fetch(&self, identifier: &Identifier, destination: &Path) -> Result<()> {
    let pdf_url = self.pdf_url(identifier).await?;
    self.download(&pdf_url, destination).await
  }
}

/// Parses an Atom feed and picks the PDF URL of its first entry.
fn first_pdf_url(feed: &str, identifier: &Identifier) -> Result<String> {
  let feed: Feed = quick_xml::de::from_str(feed)?;

  let entry =
    feed.entries.into_iter().next().ok_or_else(|| QrPaperError::NotFound(identifier.to_string()))?;

  if entry.id.contains(ARXIV_ERROR_MARKER) {
    return Err(QrPaperError::ApiError(format!("arXiv rejected \"{identifier}\": {}", entry.summary.trim())));
  }

  Ok(entry.pdf_url())
}

/// arXiv still hands out `http://` links in its feed.
fn upgrade_to_https(url: &str) -> String {
  match url.strip_prefix("http://") {
    Some(rest) if rest.starts_with("arxiv.org/") || rest.starts_with("export.arxiv.org/") =>
      format!("https://{rest}"),
    _ => url.to_string(),
  }
}
