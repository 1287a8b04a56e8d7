//! Core domain types for posting-date resolution.

use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// AnalysisId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper identifying a single analysis run (time-sortable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisId(pub Uuid);

impl AnalysisId {
    /// Generate a new time-sortable analysis identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for AnalysisId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AnalysisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for AnalysisId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// Content classification of a fetched document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Html,
    Pdf,
}

impl DocumentKind {
    /// Classify a document from its declared content type, its location, and
    /// its leading bytes. Anything that is not recognisably a PDF is HTML.
    pub fn detect(content_type: Option<&str>, location: Option<&str>, bytes: &[u8]) -> Self {
        let declared_pdf = content_type
            .map(|ct| ct.trim().to_ascii_lowercase().starts_with("application/pdf"))
            .unwrap_or(false);

        let path_pdf = location
            .and_then(|loc| loc.split(['?', '#']).next())
            .map(|path| path.to_ascii_lowercase().ends_with(".pdf"))
            .unwrap_or(false);

        if declared_pdf || path_pdf || bytes.starts_with(b"%PDF-") {
            Self::Pdf
        } else {
            Self::Html
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Html => f.write_str("html"),
            Self::Pdf => f.write_str("pdf"),
        }
    }
}

/// Raw document bytes plus their classification, as handed over by a fetcher.
#[derive(Debug, Clone)]
pub struct Document {
    /// HTML or PDF.
    pub kind: DocumentKind,
    /// Undecoded body.
    pub bytes: Vec<u8>,
    /// Where the document came from (URL or file path), if known.
    pub source_url: Option<String>,
}

impl Document {
    /// Wrap an HTML string.
    pub fn html(body: impl Into<String>) -> Self {
        Self {
            kind: DocumentKind::Html,
            bytes: body.into().into_bytes(),
            source_url: None,
        }
    }

    /// Wrap PDF bytes.
    pub fn pdf(bytes: Vec<u8>) -> Self {
        Self {
            kind: DocumentKind::Pdf,
            bytes,
            source_url: None,
        }
    }

    /// Build a document, classifying it with [`DocumentKind::detect`].
    pub fn classify(bytes: Vec<u8>, content_type: Option<&str>, source_url: Option<&str>) -> Self {
        Self {
            kind: DocumentKind::detect(content_type, source_url, &bytes),
            bytes,
            source_url: source_url.map(String::from),
        }
    }

    /// Attach the document's origin.
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

// ---------------------------------------------------------------------------
// Candidates
// ---------------------------------------------------------------------------

/// Which signal family produced a date candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    MetaTag,
    StructuredData,
    PdfMetadata,
    TextPattern,
}

/// Reliability ordinal of a source family. Higher is more trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Confidence(pub u8);

impl SourceKind {
    /// Fixed priority: meta-tag > structured-data > pdf-metadata > text-pattern.
    pub fn confidence(self) -> Confidence {
        match self {
            Self::MetaTag => Confidence(4),
            Self::StructuredData => Confidence(3),
            Self::PdfMetadata => Confidence(2),
            Self::TextPattern => Confidence(1),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::MetaTag => "meta-tag",
            Self::StructuredData => "structured-data",
            Self::PdfMetadata => "pdf-metadata",
            Self::TextPattern => "text-pattern",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An unparsed date signal plus its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCandidate {
    pub source_kind: SourceKind,
    /// Specific key, alias, or pattern name that matched (e.g. `datePosted`).
    pub source_label: String,
    /// The date text exactly as found in the document.
    pub raw_value: String,
    /// Offset, block index, or field path locating the signal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_hint: Option<String>,
    /// Declaration index of the key/alias/pattern that produced this candidate.
    pub pattern_rank: usize,
}

impl RawCandidate {
    pub fn new(
        source_kind: SourceKind,
        source_label: impl Into<String>,
        raw_value: impl Into<String>,
        pattern_rank: usize,
    ) -> Self {
        Self {
            source_kind,
            source_label: source_label.into(),
            raw_value: raw_value.into(),
            location_hint: None,
            pattern_rank,
        }
    }

    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location_hint = Some(location.into());
        self
    }
}

/// A raw candidate converted to an absolute UTC timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedCandidate {
    pub source_kind: SourceKind,
    pub source_label: String,
    pub raw_value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_hint: Option<String>,
    pub pattern_rank: usize,
    pub resolved_at: DateTime<Utc>,
    pub confidence: Confidence,
}

impl NormalizedCandidate {
    /// Attach a resolved timestamp to a raw candidate; confidence follows the source kind.
    pub fn from_raw(raw: &RawCandidate, resolved_at: DateTime<Utc>) -> Self {
        Self {
            source_kind: raw.source_kind,
            source_label: raw.source_label.clone(),
            raw_value: raw.raw_value.clone(),
            location_hint: raw.location_hint.clone(),
            pattern_rank: raw.pattern_rank,
            resolved_at,
            confidence: raw.source_kind.confidence(),
        }
    }
}

// ---------------------------------------------------------------------------
// Resolution output
// ---------------------------------------------------------------------------

/// The single winning timestamp of an analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDate {
    pub timestamp: DateTime<Utc>,
    pub source_kind: SourceKind,
    pub source_label: String,
    pub raw_value: String,
    /// Whole days between the timestamp and analysis time, never negative.
    pub elapsed_days: u64,
    /// Set when the timestamp lies after analysis time and was clamped.
    pub future_suspect: bool,
}

/// Coarse bucket of posting age.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UrgencyTier {
    /// Up to 7 days old.
    Fresh,
    /// Up to 30 days old.
    Recent,
    /// Up to 60 days old.
    Aging,
    /// Up to 90 days old.
    Stale,
    /// Older than 90 days.
    VeryStale,
    /// No posting date could be resolved.
    Undetermined,
}

impl UrgencyTier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fresh => "fresh",
            Self::Recent => "recent",
            Self::Aging => "aging",
            Self::Stale => "stale",
            Self::VeryStale => "very-stale",
            Self::Undetermined => "undetermined",
        }
    }
}

impl fmt::Display for UrgencyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The record handed to downstream consumers (display, persistence, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateReport {
    pub resolved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_kind: Option<SourceKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_days: Option<u64>,
    pub urgency_tier: UrgencyTier,
}

impl DateReport {
    /// Build the report for a run; `resolved == None` means "undetermined".
    pub fn new(resolved: Option<&ResolvedDate>, urgency_tier: UrgencyTier) -> Self {
        match resolved {
            Some(date) => Self {
                resolved: true,
                timestamp: Some(date.timestamp),
                source_kind: Some(date.source_kind),
                source_label: Some(date.source_label.clone()),
                elapsed_days: Some(date.elapsed_days),
                urgency_tier,
            },
            None => Self {
                resolved: false,
                timestamp: None,
                source_kind: None,
                source_label: None,
                elapsed_days: None,
                urgency_tier: UrgencyTier::Undetermined,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn analysis_id_roundtrip() {
        let id = AnalysisId::new();
        let parsed: AnalysisId = id.to_string().parse().expect("parse AnalysisId");
        assert_eq!(id, parsed);
    }

    #[test]
    fn confidence_follows_source_priority() {
        assert!(SourceKind::MetaTag.confidence() > SourceKind::StructuredData.confidence());
        assert!(SourceKind::StructuredData.confidence() > SourceKind::PdfMetadata.confidence());
        assert!(SourceKind::PdfMetadata.confidence() > SourceKind::TextPattern.confidence());
    }

    #[test]
    fn detect_pdf_by_header_type_or_path() {
        assert_eq!(
            DocumentKind::detect(Some("application/pdf; qs=0.9"), None, b""),
            DocumentKind::Pdf
        );
        assert_eq!(
            DocumentKind::detect(None, Some("https://x.io/jobs/posting.PDF?dl=1"), b"<html>"),
            DocumentKind::Pdf
        );
        assert_eq!(DocumentKind::detect(None, None, b"%PDF-1.7\n"), DocumentKind::Pdf);
        assert_eq!(
            DocumentKind::detect(Some("text/html"), Some("https://x.io/jobs/1"), b"<html>"),
            DocumentKind::Html
        );
    }

    #[test]
    fn source_kind_serializes_kebab_case() {
        let json = serde_json::to_string(&SourceKind::StructuredData).expect("serialize");
        assert_eq!(json, "\"structured-data\"");
        assert_eq!(SourceKind::PdfMetadata.to_string(), "pdf-metadata");
    }

    #[test]
    fn unresolved_report_is_undetermined() {
        let report = DateReport::new(None, UrgencyTier::Fresh);
        assert!(!report.resolved);
        assert_eq!(report.urgency_tier, UrgencyTier::Undetermined);
        assert!(report.elapsed_days.is_none());

        let json = serde_json::to_value(&report).expect("serialize");
        assert_eq!(json["urgency_tier"], "undetermined");
        assert!(json.get("timestamp").is_none());
    }

    #[test]
    fn resolved_report_carries_provenance() {
        let date = ResolvedDate {
            timestamp: Utc.with_ymd_and_hms(2025, 8, 1, 10, 30, 0).unwrap(),
            source_kind: SourceKind::StructuredData,
            source_label: "datePosted".into(),
            raw_value: "2025-08-01T10:30:00Z".into(),
            elapsed_days: 3,
            future_suspect: false,
        };
        let report = DateReport::new(Some(&date), UrgencyTier::Fresh);
        assert!(report.resolved);
        assert_eq!(report.source_kind, Some(SourceKind::StructuredData));
        assert_eq!(report.source_label.as_deref(), Some("datePosted"));
        assert_eq!(report.elapsed_days, Some(3));
    }

    #[test]
    fn normalized_candidate_inherits_confidence() {
        let raw = RawCandidate::new(SourceKind::MetaTag, "datePosted", "2025-08-01", 0)
            .at("meta[itemprop]");
        let ts = Utc.with_ymd_and_hms(2025, 8, 1, 0, 0, 0).unwrap();
        let norm = NormalizedCandidate::from_raw(&raw, ts);
        assert_eq!(norm.confidence, SourceKind::MetaTag.confidence());
        assert_eq!(norm.location_hint.as_deref(), Some("meta[itemprop]"));
    }
}
