//! Scan pipeline entry point
//!
//! One request in, one PDF out. Inputs are validated in a fixed order so
//! the cheapest failures are reported first and no page is rendered for a
//! request that cannot succeed.

use std::time::Instant;

use rand::Rng;

use crate::assemble::DocumentAssembler;
use crate::document::SourceDocument;
use crate::effects::{self, EffectMode};
use crate::error::{ScanError, ScanResult};
use crate::placement::{self, Placement};
use crate::raster::{PageRasterizer, DEFAULT_DPI};
use crate::signature::{self, SignatureImage};

/// Everything one scan request carries
#[derive(Debug, Clone, Default)]
pub struct ScanRequest {
    /// Source PDF bytes
    pub document: Vec<u8>,
    pub mode: EffectMode,
    /// Raw placement payload (JSON list; empty means none)
    pub placements: String,
    /// Signature image bytes; empty is treated as absent
    pub signature: Option<Vec<u8>>,
}

impl ScanRequest {
    pub fn new(document: Vec<u8>, mode: EffectMode) -> Self {
        Self {
            document,
            mode,
            placements: String::new(),
            signature: None,
        }
    }

    pub fn with_placements(mut self, placements: impl Into<String>) -> Self {
        self.placements = placements.into();
        self
    }

    pub fn with_signature(mut self, signature: Vec<u8>) -> Self {
        self.signature = Some(signature);
        self
    }
}

/// Pipeline tuning
#[derive(Debug, Clone, Copy)]
pub struct ScanOptions {
    /// Rendering density
    pub dpi: u32,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self { dpi: DEFAULT_DPI }
    }
}

/// Run the pipeline with a fresh thread-local RNG
pub fn process_with_thread_rng(request: ScanRequest, options: &ScanOptions) -> ScanResult<Vec<u8>> {
    process(request, options, &mut rand::thread_rng())
}

/// Run the full pipeline
///
/// Check order:
/// 1. placement payload
/// 2. empty document
/// 3. document parse (MuPDF alone when there is nothing to stamp)
/// 4. signature decode, then signature presence
/// 5. placements embedded one by one
/// 6. pages rendered, processed and appended one at a time
pub fn process<R: Rng + ?Sized>(
    request: ScanRequest,
    options: &ScanOptions,
    rng: &mut R,
) -> ScanResult<Vec<u8>> {
    let started = Instant::now();
    let ScanRequest {
        document,
        mode,
        placements,
        signature,
    } = request;

    let placements = placement::parse_placements(&placements)?;
    if document.is_empty() {
        return Err(ScanError::EmptyDocument);
    }

    let rasterizer = if placements.is_empty() {
        // Nothing to stamp: MuPDF reads the upload as-is and repairs what it can
        let rasterizer = PageRasterizer::from_bytes(&document, options.dpi)?;
        decode_signature(signature)?;
        rasterizer
    } else {
        let source = SourceDocument::from_bytes(&document)?;
        drop(document);
        let signature = decode_signature(signature)?;
        let source = stamp_signatures(source, signature.as_ref(), &placements)?;
        PageRasterizer::from_bytes(&source.into_bytes()?, options.dpi)?
    };

    tracing::info!(
        pages = rasterizer.page_count(),
        mode = %mode,
        placements = placements.len(),
        dpi = options.dpi,
        "Processing scan request"
    );

    let output = render_scanned(&rasterizer, mode, rng)?;

    tracing::info!(
        bytes = output.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Scan complete"
    );
    Ok(output)
}

/// Empty signature bytes count as no signature
fn decode_signature(signature: Option<Vec<u8>>) -> ScanResult<Option<SignatureImage>> {
    signature
        .filter(|bytes| !bytes.is_empty())
        .map(|bytes| SignatureImage::decode(&bytes))
        .transpose()
}

fn stamp_signatures(
    source: SourceDocument,
    signature: Option<&SignatureImage>,
    placements: &[Placement],
) -> ScanResult<SourceDocument> {
    let signature = signature.ok_or(ScanError::MissingSignatureImage)?;
    signature::embed_signatures(source, signature, placements)
}

fn render_scanned<R: Rng + ?Sized>(
    rasterizer: &PageRasterizer,
    mode: EffectMode,
    rng: &mut R,
) -> ScanResult<Vec<u8>> {
    let mut assembler = DocumentAssembler::new();

    for index in 0..rasterizer.page_count() {
        let page_started = Instant::now();
        let page = rasterizer.render_page(index)?;
        let scanned = effects::apply_scan_effect(&page, mode, rng);
        drop(page);
        assembler.push_page(&scanned)?;

        tracing::debug!(
            page = index,
            width = scanned.width(),
            height = scanned.height(),
            elapsed_ms = page_started.elapsed().as_millis() as u64,
            "Processed page"
        );
    }

    assembler.finish()
}
