//! Signature compositing
//!
//! Stamps a signature image onto pages of the source document before it is
//! rasterized, so the signature goes through the same scan effects as the
//! rest of the page.

use image::imageops::FilterType;
use image::DynamicImage;
use lopdf::content::{Content, Operation};
use lopdf::Object;

use crate::document::SourceDocument;
use crate::error::{ScanError, ScanResult};
use crate::geometry::{self, DeviceRect};
use crate::pdf;
use crate::placement::Placement;

/// XObject name prefix for stamped signatures
const XOBJECT_PREFIX: &str = "Sig";

/// Decoded signature bitmap
///
/// Always RGB8 or RGBA8. Resizing derives new images and leaves the decode
/// untouched.
#[derive(Debug, Clone)]
pub struct SignatureImage {
    image: DynamicImage,
}

impl SignatureImage {
    /// Decode signature bytes (PNG, JPEG, ...)
    pub fn decode(data: &[u8]) -> ScanResult<Self> {
        let image = image::load_from_memory(data)
            .map_err(|e| ScanError::InvalidSignatureImage(e.to_string()))?;

        let image = match image {
            DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => image,
            other => DynamicImage::ImageRgba8(other.to_rgba8()),
        };

        tracing::debug!(
            width = image.width(),
            height = image.height(),
            alpha = image.color().has_alpha(),
            "Decoded signature image"
        );
        Ok(Self { image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn has_alpha(&self) -> bool {
        self.image.color().has_alpha()
    }

    /// A copy scaled to exactly `width` x `height`
    pub fn resized(&self, width: u32, height: u32) -> DynamicImage {
        self.image
            .resize_exact(width.max(1), height.max(1), FilterType::CatmullRom)
    }
}

/// Embed the signature at every placement, in order
///
/// Each placement is validated right before it is stamped; the first invalid
/// one aborts the request.
pub fn embed_signatures(
    mut document: SourceDocument,
    signature: &SignatureImage,
    placements: &[Placement],
) -> ScanResult<SourceDocument> {
    for placement in placements {
        stamp(&mut document, signature, placement)?;
    }
    Ok(document)
}

fn stamp(
    document: &mut SourceDocument,
    signature: &SignatureImage,
    placement: &Placement,
) -> ScanResult<()> {
    let index = placement.page_index(document.page_count())?;
    let (page_id, page_box) = match (document.page_id(index), document.page_box(index)) {
        (Some(id), Some(page_box)) => (id, page_box),
        _ => {
            return Err(ScanError::DocumentDecode(format!(
                "Page {} could not be loaded",
                index
            )))
        }
    };

    let rect = geometry::resolve(placement, page_box.size())?;
    let (pixel_width, pixel_height) = rect.pixel_size();
    let resized = signature.resized(pixel_width, pixel_height);

    let doc = document.inner_mut();
    let xobject_id = pdf::add_image_xobject(doc, &resized)?;
    let name = pdf::register_xobject(doc, page_id, XOBJECT_PREFIX, xobject_id)?;
    let content = paint_operations(&name, &rect, page_box.origin())?;
    pdf::append_page_content(doc, page_id, content)?;

    tracing::debug!(
        page = index,
        left = rect.left,
        bottom = rect.bottom,
        width = rect.width(),
        height = rect.height(),
        pixels = ?(pixel_width, pixel_height),
        "Stamped signature"
    );
    Ok(())
}

/// `q w 0 0 h x y cm /Name Do Q`
fn paint_operations(name: &str, rect: &DeviceRect, origin: (f64, f64)) -> ScanResult<Vec<u8>> {
    let real = |value: f64| Object::Real(value as f32);
    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    real(rect.width()),
                    real(0.0),
                    real(0.0),
                    real(rect.height()),
                    real(origin.0 + rect.left),
                    real(origin.1 + rect.bottom),
                ],
            ),
            Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };

    content
        .encode()
        .map_err(|e| ScanError::Encode(format!("Failed to encode page content: {}", e)))
}
