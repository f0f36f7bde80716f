//! Rendering QR codes for source URLs.
//!
//! Codes are rendered with the `qrcode` crate's defaults (error correction level M, smallest
//! version that fits, four-module quiet zone) as 8-bit grayscale PNG files.

use image::{GrayImage, Luma};
use qrcode::QrCode;

use super::*;

/// Renders URLs into QR code images.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeGenerator;

impl CodeGenerator {
  /// Creates a generator using the default QR parameters.
  pub fn new() -> Self { Self }

  /// Encodes `url` exactly as given and renders it to an in-memory image.
  pub fn render(&self, url: &str) -> Result<GrayImage> {
    let code = QrCode::new(url.as_bytes())?;
    trace!("Encoded {url} as a version {:?} QR code", code.version());
    Ok(code.render::<Luma<u8>>().build())
  }

  /// Renders `url` and saves it as a PNG at `path`.
  ///
  /// The parent directory is created if it does not exist yet. An existing directory is left
  /// as is, and an existing file at `path` is overwritten.
  pub fn generate(&self, url: &str, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
      if !dir.exists() {
        debug!("Creating code directory: {dir:?}");
        fs::create_dir_all(dir)?;
      }
    }

    let image = self.render(url)?;
    image.save_with_format(path, image::ImageFormat::Png)?;
    debug!("Wrote QR code for {url} to {path:?}");
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{fixtures::decode_code, identifier::Identifier};

  const URL: &str = "https://arxiv.org/abs/2109.14101";

  #[test]
  fn test_render_is_square_and_deterministic() {
    let generator = CodeGenerator::new();
    let first = generator.render(URL).unwrap();
    let second = generator.render(URL).unwrap();

    assert_eq!(first.width(), first.height());
    assert!(first.width() > 0);
    assert_eq!(first, second);
  }

  #[test]
  fn test_different_urls_render_differently() {
    let generator = CodeGenerator::new();
    let a = generator.render("https://arxiv.org/abs/2109.14101").unwrap();
    let b = generator.render("https://arxiv.org/abs/2109.14102").unwrap();
    assert_ne!(a, b);
  }

  #[test]
  fn test_image_is_black_and_white() {
    let image = CodeGenerator::new().render(URL).unwrap();
    assert!(image.pixels().all(|Luma([value])| *value == 0 || *value == 255));
    // quiet zone
    assert_eq!(image.get_pixel(0, 0), &Luma([255]));
  }

  #[test]
  fn test_generate_creates_directory_and_png() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(DEFAULT_CODE_DIR).join("2109.14101.png");

    CodeGenerator::new().generate(URL, &path).unwrap();

    let written = image::open(&path).unwrap().to_luma8();
    assert_eq!(written, CodeGenerator::new().render(URL).unwrap());
  }

  #[test]
  fn test_saved_code_scans_back_to_source_url() {
    let dir = tempdir().unwrap();
    for raw in ["2109.14101", "2301.07041v2", "math.AG/0601001"] {
      let identifier = Identifier::new(raw);
      let path = dir.path().join(format!("{}.png", identifier.file_stem()));
      CodeGenerator::new().generate(&identifier.source_url(), &path).unwrap();

      let scanned = decode_code(&image::open(&path).unwrap().to_luma8());
      assert_eq!(scanned, format!("https://arxiv.org/abs/{raw}"));
    }
  }

  #[test]
  fn test_generate_overwrites_stale_image() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(DEFAULT_CODE_DIR).join("A.png");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, b"stale").unwrap();
    fs::write(path.with_file_name("unrelated.png"), b"left alone").unwrap();

    CodeGenerator::new().generate(URL, &path).unwrap();

    assert!(image::open(&path).is_ok());
    assert_eq!(fs::read(path.with_file_name("unrelated.png")).unwrap(), b"left alone");
  }

  #[test]
  fn test_oversized_payload_is_rejected() {
    let url = format!("{}{}", crate::identifier::SOURCE_BASE_URL, "x".repeat(8000));
    assert!(matches!(CodeGenerator::new().render(&url), Err(QrPaperError::QrCode(_))));
  }
}
