//! Small documents for tests that must not touch the network.

use std::io::Read;

use flate2::read::ZlibDecoder;
use image::GrayImage;
use lopdf::{
  content::{Content, Operation},
  Dictionary, Document, Object, Stream,
};

use super::*;

/// Width and height of every fixture page (US Letter).
pub const PAGE_SIZE: (i64, i64) = (612, 792);

/// Builds a document with `pages` pages, each filling a rectangle so it has real content.
pub fn sample_document(pages: usize) -> Document {
  let mut doc = Document::with_version("1.5");
  let page_tree_id = doc.new_object_id();

  let mut kids = Vec::with_capacity(pages);
  for n in 0..pages {
    let content = Content {
      operations: vec![
        Operation::new("rg", vec![0.2_f32.into(), 0.2_f32.into(), 0.8_f32.into()]),
        Operation::new("re", vec![72.into(), 72.into(), (100 + n as i64).into(), 50.into()]),
        Operation::new("f", vec![]),
      ],
    };
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));
    let page_id = doc.add_object(Dictionary::from_iter(vec![
      ("Type", Object::Name(b"Page".to_vec())),
      ("Parent", Object::Reference(page_tree_id)),
      ("Contents", Object::Reference(content_id)),
      ("Resources", Object::Dictionary(Dictionary::new())),
      ("MediaBox", Object::Array(vec![0.into(), 0.into(), PAGE_SIZE.0.into(), PAGE_SIZE.1.into()])),
    ]));
    kids.push(Object::Reference(page_id));
  }

  let page_tree = Dictionary::from_iter(vec![
    ("Type", Object::Name(b"Pages".to_vec())),
    ("Count", Object::Integer(pages as i64)),
    ("Kids", Object::Array(kids)),
  ]);
  doc.objects.insert(page_tree_id, Object::Dictionary(page_tree));

  let catalog_id = doc.add_object(Dictionary::from_iter(vec![
    ("Type", Object::Name(b"Catalog".to_vec())),
    ("Pages", Object::Reference(page_tree_id)),
  ]));
  doc.trailer.set("Root", Object::Reference(catalog_id));
  doc
}

/// Writes [`sample_document`] to `path`.
pub fn write_sample_document(path: &Path, pages: usize) {
  sample_document(pages).save(path).unwrap();
}

/// Inflates a `FlateDecode` stream, image streams included.
pub fn inflate(stream: &Stream) -> Vec<u8> {
  let mut raw = Vec::new();
  ZlibDecoder::new(stream.content.as_slice()).read_to_end(&mut raw).unwrap();
  raw
}

/// Rebuilds the grayscale image held by an image XObject.
pub fn embedded_code(stream: &Stream) -> GrayImage {
  let width = stream.dict.get(b"Width").unwrap().as_i64().unwrap() as u32;
  let height = stream.dict.get(b"Height").unwrap().as_i64().unwrap() as u32;
  GrayImage::from_raw(width, height, inflate(stream)).unwrap()
}

/// Reads back the text of the only QR code in `image`.
pub fn decode_code(image: &GrayImage) -> String {
  let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
    image.width() as usize,
    image.height() as usize,
    |x, y| image.get_pixel(x as u32, y as u32).0[0],
  );
  let grids = prepared.detect_grids();
  assert_eq!(grids.len(), 1, "expected exactly one QR code");
  let (_, content) = grids[0].decode().unwrap();
  content
}
