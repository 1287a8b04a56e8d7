//! PDF-metadata extractor.
//!
//! Reads `CreationDate` from the document information dictionary. Files that
//! `lopdf` cannot load (truncated, unusual xref layout) fall back to a raw
//! byte scan for `/CreationDate (D:...)`.

use std::sync::LazyLock;

use lopdf::{Dictionary, Object};
use postdate_shared::{DocumentKind, RawCandidate, SourceKind};
use regex::bytes::Regex;
use tracing::debug;

use super::{CandidateExtractor, PreparedDocument};

const CREATION_DATE: &str = "CreationDate";

/// Extracts the creation date of a PDF document.
pub struct PdfMetadataExtractor;

impl CandidateExtractor for PdfMetadataExtractor {
    fn applies_to(&self, kind: DocumentKind) -> bool {
        kind == DocumentKind::Pdf
    }

    fn extract(&self, doc: &PreparedDocument<'_>) -> Vec<RawCandidate> {
        let bytes = doc.bytes();

        let found = creation_date_from_info(bytes)
            .map(|value| (value, "info-dictionary"))
            .or_else(|| scan_creation_date(bytes).map(|value| (value, "raw-scan")));

        match found {
            Some((value, location)) => vec![
                RawCandidate::new(SourceKind::PdfMetadata, CREATION_DATE, value, 0).at(location),
            ],
            None => Vec::new(),
        }
    }

    fn name(&self) -> &str {
        "pdf-metadata"
    }
}

fn creation_date_from_info(bytes: &[u8]) -> Option<String> {
    let document = match lopdf::Document::load_mem(bytes) {
        Ok(document) => document,
        Err(e) => {
            debug!(error = %e, "lopdf could not load document, falling back to byte scan");
            return None;
        }
    };

    let info: &Dictionary = match document.trailer.get(b"Info").ok()? {
        Object::Reference(id) => document.get_object(*id).ok()?.as_dict().ok()?,
        Object::Dictionary(dict) => dict,
        _ => return None,
    };

    match info.get(CREATION_DATE.as_bytes()).ok()? {
        Object::String(raw, _) => Some(decode_pdf_string(raw)).filter(|s| !s.is_empty()),
        _ => None,
    }
}

fn scan_creation_date(bytes: &[u8]) -> Option<String> {
    static CREATION_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?-u)/CreationDate\s*\(([^)]{4,40})\)").expect("valid regex")
    });

    CREATION_RE
        .captures(bytes)
        .and_then(|caps| caps.get(1))
        .map(|m| decode_pdf_string(m.as_bytes()))
        .filter(|s| !s.is_empty())
}

/// Decode a PDF text string: UTF-16BE when it carries a byte-order mark,
/// otherwise treated as (mostly ASCII) UTF-8.
fn decode_pdf_string(raw: &[u8]) -> String {
    let text = match raw.strip_prefix(&[0xFE, 0xFF]) {
        Some(utf16) => {
            let units: Vec<u16> = utf16
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        None => String::from_utf8_lossy(raw).into_owned(),
    };
    text.trim().to_string()
}
