//! Stamping a QR code image onto the first page of a document.
//!
//! The code is embedded as a grayscale image XObject and drawn into a fixed
//! [`CODE_SQUARE_SIZE`]-point square anchored at the top-left corner of the first page's
//! visible area (its crop box, or its media box when it has none). The image is scaled to
//! fill the square; other pages are not touched.
//!
//! Whatever the page's own content leaves on the graphics state stack, the stamp is drawn
//! in the page's default coordinate system: the existing content streams are wrapped in a
//! `q`/`Q` pair before the stamp is appended.

use image::GrayImage;
use lopdf::{
  content::{Content, Operation},
  Dictionary, Document, Object, ObjectId, Stream,
};

use super::*;

/// Side length, in points, of the square the code is drawn into.
pub const CODE_SQUARE_SIZE: f32 = 100.0;

/// US Letter, used when no media box can be found at all.
const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// How far up the page tree inherited attributes are looked for.
const MAX_INHERITANCE_DEPTH: usize = 16;

/// Where the code ends up on the page, in PDF user space (origin bottom-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
  /// Left edge
  pub x:    f32,
  /// Bottom edge
  pub y:    f32,
  /// Width and height
  pub size: f32,
}

/// Overlays code images onto documents.
#[derive(Debug, Clone, Copy)]
pub struct Compositor {
  /// Side length of the square, in points.
  size: f32,
}

impl Default for Compositor {
  fn default() -> Self { Self { size: CODE_SQUARE_SIZE } }
}

impl Compositor {
  /// A compositor drawing [`CODE_SQUARE_SIZE`]-point codes.
  pub fn new() -> Self { Self::default() }

  /// Changes the side length of the square.
  pub fn with_size(mut self, size: f32) -> Self {
    self.size = size;
    self
  }

  /// Square anchored at the top-left corner of `page_box`.
  pub fn placement(&self, page_box: [f32; 4]) -> Placement {
    Placement { x: page_box[0], y: page_box[3] - self.size, size: self.size }
  }

  /// Loads `document`, draws `code_image` on its first page and saves the result to `output`.
  ///
  /// `document` itself is never modified.
  ///
  /// # Errors
  ///
  /// - [`QrPaperError::Lopdf`] if the document cannot be parsed or saved
  /// - [`QrPaperError::Image`] if the code image cannot be read
  /// - [`QrPaperError::NoPages`] if the document has no first page
  pub fn stamp(&self, document: &Path, code_image: &Path, output: &Path) -> Result<Placement> {
    let mut doc = Document::load(document)?;
    let code = image::open(code_image)?.to_luma8();

    let page_id = first_page(&doc).ok_or_else(|| QrPaperError::NoPages(document.to_path_buf()))?;
    let placement = self.stamp_page(&mut doc, page_id, &code)?;

    doc.save(output)?;
    debug!("Stamped {document:?} at {placement:?} and saved it to {output:?}");
    Ok(placement)
  }

  /// Embeds `code` in `doc` and draws it on `page_id`.
  fn stamp_page(&self, doc: &mut Document, page_id: ObjectId, code: &GrayImage) -> Result<Placement> {
    let image_id = doc.add_object(image_xobject(code)?);
    let name = format!("QrCode{}", image_id.0);
    register_xobject(doc, page_id, &name, image_id)?;

    let placement = self.placement(visible_box(doc, page_id));
    let stamp = Content {
      operations: vec![
        Operation::new("Q", vec![]),
        Operation::new("q", vec![]),
        Operation::new("cm", vec![
          placement.size.into(),
          0.into(),
          0.into(),
          placement.size.into(),
          placement.x.into(),
          placement.y.into(),
        ]),
        Operation::new("Do", vec![Object::Name(name.into_bytes())]),
        Operation::new("Q", vec![]),
      ],
    };
    // content streams are concatenated when rendered; keep tokens apart
    let mut stamp_bytes = b"\n".to_vec();
    stamp_bytes.extend(stamp.encode()?);

    let save_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let stamp_id = doc.add_object(Stream::new(Dictionary::new(), stamp_bytes));

    let mut contents = page_contents(doc, page_id)?;
    contents.insert(0, Object::Reference(save_id));
    contents.push(Object::Reference(stamp_id));
    doc.get_object_mut(page_id)?.as_dict_mut()?.set("Contents", Object::Array(contents));

    Ok(placement)
  }
}

/// The first page in document order, if any.
fn first_page(doc: &Document) -> Option<ObjectId> { doc.get_pages().into_values().next() }

/// Builds an 8-bit DeviceGray image XObject holding `code`.
fn image_xobject(code: &GrayImage) -> Result<Stream> {
  let (width, height) = code.dimensions();
  let dict = Dictionary::from_iter(vec![
    ("Type", Object::Name(b"XObject".to_vec())),
    ("Subtype", Object::Name(b"Image".to_vec())),
    ("Width", Object::Integer(i64::from(width))),
    ("Height", Object::Integer(i64::from(height))),
    ("ColorSpace", Object::Name(b"DeviceGray".to_vec())),
    ("BitsPerComponent", Object::Integer(8)),
  ]);
  let mut stream = Stream::new(dict, code.as_raw().clone());
  stream.compress()?;
  Ok(stream)
}

/// Gives the page its own copy of its effective resources and adds `image_id` under `name`.
///
/// The copy starts from whatever the page inherits, so fonts and images defined on the page
/// tree stay visible. Shared dictionaries are never modified.
fn register_xobject(
  doc: &mut Document,
  page_id: ObjectId,
  name: &str,
  image_id: ObjectId,
) -> Result<()> {
  let mut resources = match inherited(doc, page_id, b"Resources") {
    Some(Object::Dictionary(dict)) => dict.clone(),
    _ => Dictionary::new(),
  };
  let mut xobjects = match resources.get(b"XObject") {
    Ok(Object::Reference(id)) =>
      doc.get_dictionary(*id).ok().cloned().unwrap_or_else(Dictionary::new),
    Ok(Object::Dictionary(dict)) => dict.clone(),
    _ => Dictionary::new(),
  };

  xobjects.set(name, Object::Reference(image_id));
  resources.set("XObject", Object::Dictionary(xobjects));
  doc.get_object_mut(page_id)?.as_dict_mut()?.set("Resources", Object::Dictionary(resources));
  Ok(())
}

/// The page's content streams as a flat list of references.
fn page_contents(doc: &Document, page_id: ObjectId) -> Result<Vec<Object>> {
  let contents = doc.get_dictionary(page_id)?.get(b"Contents").ok().cloned();
  Ok(match contents {
    Some(Object::Reference(id)) => match doc.get_object(id) {
      Ok(Object::Array(items)) => items.clone(),
      _ => vec![Object::Reference(id)],
    },
    Some(Object::Array(items)) => items,
    _ => Vec::new(),
  })
}

/// Looks `key` up on the page, then up the page tree, following a top-level reference.
fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
  let mut node = doc.get_dictionary(page_id).ok();
  for _ in 0..MAX_INHERITANCE_DEPTH {
    let dict = node?;
    if let Ok(object) = dict.get(key) {
      return match object {
        Object::Reference(id) => doc.get_object(*id).ok(),
        object => Some(object),
      };
    }
    node = dict
      .get(b"Parent")
      .ok()
      .and_then(|parent| parent.as_reference().ok())
      .and_then(|id| doc.get_dictionary(id).ok());
  }
  None
}

/// A normalized `[x0, y0, x1, y1]` rectangle.
fn rectangle(object: &Object) -> Option<[f32; 4]> {
  let values: Vec<f32> =
    object.as_array().ok()?.iter().filter_map(|value| value.as_float().ok()).collect();
  let [x0, y0, x1, y1] = values[..] else { return None };
  Some([x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1)])
}

/// The part of the page a viewer shows: the crop box clipped to the media box.
///
/// Both boxes may be inherited. Without a crop box the media box is used, and without either
/// the page is assumed to be US Letter.
fn visible_box(doc: &Document, page_id: ObjectId) -> [f32; 4] {
  let media = inherited(doc, page_id, b"MediaBox").and_then(rectangle);
  let crop = inherited(doc, page_id, b"CropBox").and_then(rectangle);

  match (crop, media) {
    (Some(crop), Some(media)) => {
      let clipped = [
        crop[0].max(media[0]),
        crop[1].max(media[1]),
        crop[2].min(media[2]),
        crop[3].min(media[3]),
      ];
      if clipped[0] < clipped[2] && clipped[1] < clipped[3] {
        clipped
      } else {
        warn!("CropBox of page {page_id:?} lies outside its MediaBox, using the MediaBox");
        media
      }
    },
    (Some(rect), None) | (None, Some(rect)) => rect,
    (None, None) => {
      warn!("No usable MediaBox found for page {page_id:?}, assuming US Letter");
      DEFAULT_MEDIA_BOX
    },
  }
}
