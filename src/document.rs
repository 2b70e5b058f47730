//! Source document handle
//!
//! Wraps the uploaded PDF for the duration of one request. The handle is
//! moved through signature embedding and then serialized for rendering; it
//! is never shared.

use lopdf::{Document, ObjectId};

use crate::error::{ScanError, ScanResult};
use crate::pdf::{self, PageBox};

/// Exclusively owned, mutable source PDF
pub struct SourceDocument {
    doc: Document,
    pages: Vec<ObjectId>,
}

impl SourceDocument {
    /// Parse PDF bytes
    ///
    /// Empty input is rejected before any parsing is attempted.
    pub fn from_bytes(data: &[u8]) -> ScanResult<Self> {
        if data.is_empty() {
            return Err(ScanError::EmptyDocument);
        }

        let doc = Document::load_mem(data)
            .map_err(|e| ScanError::DocumentDecode(format!("Failed to parse PDF: {}", e)))?;
        let pages = pdf::page_ids(&doc);

        tracing::debug!(pages = pages.len(), bytes = data.len(), "Opened source document");
        Ok(Self { doc, pages })
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Page object id for a zero-based index
    pub fn page_id(&self, index: usize) -> Option<ObjectId> {
        self.pages.get(index).copied()
    }

    /// Effective MediaBox of a page
    pub fn page_box(&self, index: usize) -> Option<PageBox> {
        self.page_id(index).map(|id| pdf::page_box(&self.doc, id))
    }

    pub(crate) fn inner_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    #[cfg(test)]
    pub(crate) fn inner(&self) -> &Document {
        &self.doc
    }

    /// Serialize the (possibly modified) document
    pub fn into_bytes(mut self) -> ScanResult<Vec<u8>> {
        let mut buffer = Vec::new();
        self.doc
            .save_to(&mut buffer)
            .map_err(|e| ScanError::Encode(format!("Failed to serialize PDF: {}", e)))?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PageSize;
    use crate::test_support::blank_pdf;

    #[test]
    fn test_empty_bytes_rejected() {
        assert!(matches!(
            SourceDocument::from_bytes(&[]),
            Err(ScanError::EmptyDocument)
        ));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(
            SourceDocument::from_bytes(b"definitely not a pdf"),
            Err(ScanError::DocumentDecode(_))
        ));
    }

    #[test]
    fn test_pages_in_order() {
        let doc = SourceDocument::from_bytes(&blank_pdf(&[(100.0, 200.0), (300.0, 150.0)])).unwrap();

        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.page_box(0).unwrap().size(), PageSize::new(100.0, 200.0));
        assert_eq!(doc.page_box(1).unwrap().size(), PageSize::new(300.0, 150.0));
        assert!(doc.page_box(2).is_none());
    }

    #[test]
    fn test_round_trip_bytes() {
        let doc = SourceDocument::from_bytes(&blank_pdf(&[(100.0, 100.0)])).unwrap();
        let bytes = doc.into_bytes().unwrap();

        assert!(bytes.starts_with(b"%PDF"));
        assert_eq!(SourceDocument::from_bytes(&bytes).unwrap().page_count(), 1);
    }
}
