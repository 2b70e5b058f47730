//! Page rasterization via MuPDF
//!
//! Renders pages to RGB pixel buffers at a fixed density. Pixel dimensions
//! follow each page's physical size, so pages of different sizes produce
//! buffers of different sizes.
//!
//! MuPDF's `fz_context` is not thread-safe. A rasterizer owns its document
//! and is used from a single thread for the lifetime of one request.

use image::RgbImage;
use mupdf::{Colorspace, Document, Matrix};

use crate::error::{ScanError, ScanResult};

/// Default rendering density
pub const DEFAULT_DPI: u32 = 200;

/// PDF user space unit (1/72 inch)
const POINTS_PER_INCH: f32 = 72.0;

/// Renders pages of one document, in order, one at a time
pub struct PageRasterizer {
    doc: Document,
    page_count: usize,
    scale: f32,
}

impl PageRasterizer {
    /// Open serialized PDF bytes for rendering at `dpi`
    pub fn from_bytes(data: &[u8], dpi: u32) -> ScanResult<Self> {
        let doc = Document::from_bytes(data, "application/pdf")
            .map_err(|e| ScanError::DocumentDecode(format!("Failed to open PDF: {}", e)))?;
        let page_count = doc.page_count()?.max(0) as usize;
        if page_count == 0 {
            return Err(ScanError::DocumentDecode("PDF has no pages".to_string()));
        }

        Ok(Self {
            doc,
            page_count,
            scale: dpi as f32 / POINTS_PER_INCH,
        })
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Render one page without alpha
    pub fn render_page(&self, index: usize) -> ScanResult<RgbImage> {
        let decode_error =
            |e: mupdf::Error| ScanError::DocumentDecode(format!("Failed to render page {}: {}", index, e));

        let page = self.doc.load_page(index as i32).map_err(decode_error)?;
        let matrix = Matrix::new_scale(self.scale, self.scale);
        let colorspace = Colorspace::device_rgb();
        // to_pixmap signature: (ctm, colorspace, alpha, show_extras) -> Pixmap
        let pixmap = page
            .to_pixmap(&matrix, &colorspace, false, true)
            .map_err(decode_error)?;

        pixmap_to_rgb(&pixmap)
    }
}

/// Copy pixmap samples into an RGB buffer
fn pixmap_to_rgb(pixmap: &mupdf::Pixmap) -> ScanResult<RgbImage> {
    let width = pixmap.width() as u32;
    let height = pixmap.height() as u32;
    let n = pixmap.n() as usize;
    let samples = pixmap.samples();

    samples_to_rgb(samples, width, height, n)
}

/// Convert packed `n`-component samples (rows possibly padded) to RGB
fn samples_to_rgb(samples: &[u8], width: u32, height: u32, n: usize) -> ScanResult<RgbImage> {
    if n == 0 {
        return Err(ScanError::DocumentDecode(
            "Pixmap has no color components".to_string(),
        ));
    }

    let stride = if height == 0 {
        0
    } else {
        samples.len() / height as usize
    };
    if stride < width as usize * n {
        return Err(ScanError::DocumentDecode(format!(
            "Pixmap too small: {} bytes for {}x{}x{}",
            samples.len(),
            width,
            height,
            n
        )));
    }

    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    for row in samples.chunks(stride.max(1)).take(height as usize) {
        for pixel in row[..width as usize * n].chunks_exact(n) {
            match n {
                1 | 2 => rgb.extend_from_slice(&[pixel[0], pixel[0], pixel[0]]),
                _ => rgb.extend_from_slice(&pixel[..3]),
            }
        }
    }

    RgbImage::from_raw(width, height, rgb)
        .ok_or_else(|| ScanError::DocumentDecode("Failed to create image buffer".to_string()))
}
