//! Image XObject encoding
//!
//! Images are stored losslessly: raw 8-bit samples compressed with zlib
//! (`/FlateDecode`). Transparency goes into a separate `/SMask` image.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::{DynamicImage, GrayImage, RgbImage};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use crate::error::{ScanError, ScanResult};

/// Compress bytes for a `/FlateDecode` stream
pub fn flate_encode(data: &[u8]) -> ScanResult<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 2), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| ScanError::Encode(format!("Flate compression failed: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| ScanError::Encode(format!("Flate compression failed: {}", e)))
}

fn image_stream(
    width: u32,
    height: u32,
    color_space: &str,
    samples: &[u8],
    soft_mask: Option<ObjectId>,
) -> ScanResult<Stream> {
    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width as i64,
        "Height" => height as i64,
        "ColorSpace" => Object::Name(color_space.as_bytes().to_vec()),
        "BitsPerComponent" => 8,
        "Filter" => "FlateDecode",
    };
    if let Some(mask_id) = soft_mask {
        dict.set("SMask", Object::Reference(mask_id));
    }

    let mut stream = Stream::new(dict, flate_encode(samples)?);
    // Already compressed; keep lopdf from touching it on save
    stream.allows_compression = false;
    Ok(stream)
}

/// Add an opaque RGB image to the document
pub fn add_rgb_xobject(doc: &mut Document, image: &RgbImage) -> ScanResult<ObjectId> {
    let stream = image_stream(image.width(), image.height(), "DeviceRGB", image.as_raw(), None)?;
    Ok(doc.add_object(stream))
}

/// Add an image to the document, splitting alpha into a soft mask
pub fn add_image_xobject(doc: &mut Document, image: &DynamicImage) -> ScanResult<ObjectId> {
    if !image.color().has_alpha() {
        return add_rgb_xobject(doc, &image.to_rgb8());
    }

    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut color = Vec::with_capacity((width * height * 3) as usize);
    let mut alpha = Vec::with_capacity((width * height) as usize);
    for pixel in rgba.pixels() {
        let [r, g, b, a] = pixel.0;
        color.extend_from_slice(&[r, g, b]);
        alpha.push(a);
    }

    let mask = GrayImage::from_raw(width, height, alpha)
        .ok_or_else(|| ScanError::Encode("Failed to build soft mask".to_string()))?;
    let mask_stream = image_stream(width, height, "DeviceGray", mask.as_raw(), None)?;
    let mask_id = doc.add_object(mask_stream);

    let stream = image_stream(width, height, "DeviceRGB", &color, Some(mask_id))?;
    Ok(doc.add_object(stream))
}
