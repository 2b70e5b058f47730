//! Output document assembly
//!
//! Builds a fresh PDF with one page per processed raster. Each page is sized
//! to its image (one point per pixel) and has the image as its only content.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use image::RgbImage;

use crate::error::{ScanError, ScanResult};
use crate::pdf;

const PDF_VERSION: &str = "1.7";
const IMAGE_NAME: &str = "Im0";

/// Accumulates raster pages into a new document
pub struct DocumentAssembler {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<ObjectId>,
}

impl DocumentAssembler {
    pub fn new() -> Self {
        let mut doc = Document::with_version(PDF_VERSION);
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            kids: Vec::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Append a page showing `image` edge to edge
    pub fn push_page(&mut self, image: &RgbImage) -> ScanResult<()> {
        let (width, height) = image.dimensions();
        let image_id = pdf::add_rgb_xobject(&mut self.doc, image)?;

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        (width as i64).into(),
                        0.into(),
                        0.into(),
                        (height as i64).into(),
                        0.into(),
                        0.into(),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(IMAGE_NAME.as_bytes().to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let encoded = content
            .encode()
            .map_err(|e| ScanError::Encode(format!("Failed to encode page content: {}", e)))?;
        let content_id = self.doc.add_object(Stream::new(dictionary! {}, encoded));

        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), (width as i64).into(), (height as i64).into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! {
                    IMAGE_NAME => image_id,
                },
            },
        });
        self.kids.push(page_id);

        tracing::trace!(page = self.kids.len() - 1, width, height, "Appended output page");
        Ok(())
    }

    /// Close the page tree and serialize
    pub fn finish(mut self) -> ScanResult<Vec<u8>> {
        let count = self.kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Count" => count,
            "Kids" => self.kids.iter().copied().map(Object::Reference).collect::<Vec<_>>(),
        };
        self.doc
            .objects
            .insert(self.pages_id, Object::Dictionary(pages));

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        self.doc
            .save_to(&mut buffer)
            .map_err(|e| ScanError::Encode(format!("Failed to write output PDF: {}", e)))?;
        Ok(buffer)
    }
}

impl Default for DocumentAssembler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SourceDocument;
    use crate::geometry::PageSize;
    use image::Rgb;

    #[test]
    fn test_pages_sized_to_images() {
        let mut assembler = DocumentAssembler::new();
        assembler
            .push_page(&RgbImage::from_pixel(120, 80, Rgb([200, 10, 10])))
            .unwrap();
        assembler
            .push_page(&RgbImage::from_pixel(30, 60, Rgb([0, 0, 0])))
            .unwrap();
        assert_eq!(assembler.page_count(), 2);

        let bytes = assembler.finish().unwrap();
        let reloaded = SourceDocument::from_bytes(&bytes).unwrap();

        assert_eq!(reloaded.page_count(), 2);
        assert_eq!(reloaded.page_box(0).unwrap().size(), PageSize::new(120.0, 80.0));
        assert_eq!(reloaded.page_box(1).unwrap().size(), PageSize::new(30.0, 60.0));
    }

    #[test]
    fn test_page_paints_its_image() {
        let mut assembler = DocumentAssembler::new();
        assembler
            .push_page(&RgbImage::from_pixel(4, 4, Rgb([1, 2, 3])))
            .unwrap();
        let bytes = assembler.finish().unwrap();

        let doc = Document::load_mem(&bytes).unwrap();
        let page_id = *doc.get_pages().get(&1).unwrap();
        let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
        let operators: Vec<_> = content.operations.iter().map(|op| op.operator.as_str()).collect();

        assert_eq!(operators, vec!["q", "cm", "Do", "Q"]);
        let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
        let xobjects = page
            .get(b"Resources")
            .and_then(|r| r.as_dict())
            .and_then(|r| r.get(b"XObject"))
            .and_then(|x| x.as_dict())
            .unwrap();
        let image_id = xobjects.get(b"Im0").unwrap().as_reference().unwrap();
        let image = doc.get_object(image_id).unwrap().as_stream().unwrap();
        assert_eq!(image.dict.get(b"Width").unwrap().as_i64().unwrap(), 4);
    }

    #[test]
    fn test_empty_assembler_still_serializes() {
        let bytes = DocumentAssembler::new().finish().unwrap();
        assert!(bytes.starts_with(b"%PDF-1.7"));
    }
}
