//! Candidate extractor trait and the built-in signal families.
//!
//! Each extractor scans a document for one kind of date signal (meta tags,
//! structured data, PDF metadata, visible text) and reports what it finds as
//! [`RawCandidate`]s. Extractors never fail: a missing or malformed signal
//! yields no candidates.

mod meta;
mod pdf;
mod structured;
mod text;

use postdate_shared::{Document, DocumentKind, ExtractionConfig, RawCandidate};
use scraper::Html;
use tracing::debug;

pub use meta::MetaTagExtractor;
pub use pdf::PdfMetadataExtractor;
pub use structured::StructuredDataExtractor;
pub use text::{TextPatternExtractor, visible_text};

// ---------------------------------------------------------------------------
// Prepared document
// ---------------------------------------------------------------------------

/// A document parsed once and shared read-only by every extractor.
pub struct PreparedDocument<'a> {
    document: &'a Document,
    html: Option<Html>,
}

impl<'a> PreparedDocument<'a> {
    /// Parse the document's HTML (PDFs are kept as raw bytes).
    pub fn new(document: &'a Document) -> Self {
        let html = match document.kind {
            DocumentKind::Html => Some(Html::parse_document(&document.text())),
            DocumentKind::Pdf => None,
        };
        Self { document, html }
    }

    pub fn kind(&self) -> DocumentKind {
        self.document.kind
    }

    pub fn bytes(&self) -> &[u8] {
        &self.document.bytes
    }

    /// Parsed HTML tree, `None` for PDFs.
    pub fn html(&self) -> Option<&Html> {
        self.html.as_ref()
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// One independent source of date candidates.
pub trait CandidateExtractor: Send + Sync {
    /// Whether this extractor understands the given document kind.
    fn applies_to(&self, kind: DocumentKind) -> bool;

    /// Scan the document and report every candidate found.
    fn extract(&self, doc: &PreparedDocument<'_>) -> Vec<RawCandidate>;

    /// Human-readable extractor name for tracing.
    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Holds the configured extractors in declaration order.
pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn CandidateExtractor>>,
}

impl ExtractorRegistry {
    /// Build the built-in extractors from the recognized key sets in `config`.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            extractors: vec![
                Box::new(MetaTagExtractor::new(config.meta_keys.clone())),
                Box::new(StructuredDataExtractor::new(
                    config.structured_aliases.clone(),
                    config.max_json_depth,
                    config.scan_inline_scripts,
                )),
                Box::new(PdfMetadataExtractor),
                Box::new(TextPatternExtractor::new()),
            ],
        }
    }

    /// Names of the registered extractors, in order.
    pub fn names(&self) -> Vec<&str> {
        self.extractors.iter().map(|e| e.name()).collect()
    }

    /// Run every applicable extractor over an already prepared document.
    pub fn extract_prepared(&self, doc: &PreparedDocument<'_>) -> Vec<RawCandidate> {
        let mut candidates = Vec::new();

        for extractor in &self.extractors {
            if !extractor.applies_to(doc.kind()) {
                continue;
            }
            let found = extractor.extract(doc);
            debug!(
                extractor = extractor.name(),
                found = found.len(),
                "extractor finished"
            );
            candidates.extend(found);
        }

        candidates
    }

    /// Parse `document` and run every applicable extractor over it.
    pub fn extract_all(&self, document: &Document) -> Vec<RawCandidate> {
        let prepared = PreparedDocument::new(document);
        self.extract_prepared(&prepared)
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }
}
