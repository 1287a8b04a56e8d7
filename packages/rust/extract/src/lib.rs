//! Date-candidate extraction for job postings.
//!
//! This crate provides:
//! - [`extractors`]: the independent signal families (meta tags, structured
//!   data, visible text, PDF metadata)
//! - [`ExtractorRegistry`]: runs every applicable extractor over a document

pub mod extractors;

pub use extractors::{
    CandidateExtractor, ExtractorRegistry, MetaTagExtractor, PdfMetadataExtractor,
    PreparedDocument, StructuredDataExtractor, TextPatternExtractor, visible_text,
};

#[cfg(test)]
mod tests {
    use super::*;
    use postdate_shared::{Document, ExtractionConfig, RawCandidate, SourceKind};

    fn load_fixture(name: &str) -> Document {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures/html")
            .join(name);
        let content = std::fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("missing fixture: {}", path.display()));
        Document::html(content)
    }

    fn of_kind(found: &[RawCandidate], kind: SourceKind) -> Vec<&RawCandidate> {
        found.iter().filter(|c| c.source_kind == kind).collect()
    }

    #[test]
    fn registry_order_is_declaration_order() {
        let registry = ExtractorRegistry::default();
        assert_eq!(
            registry.names(),
            vec!["meta-tag", "structured-data", "pdf-metadata", "text-pattern"]
        );
    }

    #[test]
    fn jsonld_fixture_yields_structured_and_text_candidates() {
        let found = ExtractorRegistry::default().extract_all(&load_fixture("jsonld_posting.html"));

        let structured = of_kind(&found, SourceKind::StructuredData);
        assert_eq!(structured.len(), 1);
        assert_eq!(structured[0].source_label, "datePosted");
        assert_eq!(structured[0].raw_value, "2025-08-01T10:30:00Z");

        let text = of_kind(&found, SourceKind::TextPattern);
        assert!(text.iter().any(|c| c.raw_value == "3 days ago"));
        // Literals inside the tracking script never surface.
        assert!(found.iter().all(|c| c.raw_value != "2019-01-01"));
        assert!(of_kind(&found, SourceKind::MetaTag).is_empty());
    }

    #[test]
    fn meta_fixture_yields_meta_candidates() {
        let found = ExtractorRegistry::default().extract_all(&load_fixture("meta_posting.html"));
        let meta = of_kind(&found, SourceKind::MetaTag);

        let labels: Vec<&str> = meta.iter().map(|c| c.source_label.as_str()).collect();
        assert!(labels.contains(&"datePosted"));
        assert!(labels.contains(&"article:published_time"));
    }

    #[test]
    fn text_only_fixture_ignores_code() {
        let found = ExtractorRegistry::default().extract_all(&load_fixture("text_posting.html"));
        let values: Vec<&str> = found.iter().map(|c| c.raw_value.as_str()).collect();

        assert!(values.contains(&"5 days ago"), "values: {values:?}");
        assert!(!values.contains(&"2020-01-01"));
        assert!(found.iter().all(|c| c.source_kind == SourceKind::TextPattern));
    }

    #[test]
    fn undated_fixture_yields_nothing() {
        let found = ExtractorRegistry::default().extract_all(&load_fixture("no_date.html"));
        assert!(found.is_empty(), "unexpected: {found:?}");
    }

    #[test]
    fn custom_config_changes_recognized_keys() {
        let config = ExtractionConfig {
            meta_keys: vec!["jobPostedAt".into()],
            structured_aliases: vec!["firstSeen".into()],
            max_json_depth: 4,
            scan_inline_scripts: false,
        };
        let document = Document::html(
            r#"<head><meta name="jobPostedAt" content="2025-06-01">
               <script type="application/ld+json">{"datePosted": "2025-06-02", "firstSeen": "2025-06-03"}</script>
               </head>"#,
        );
        let found = ExtractorRegistry::from_config(&config).extract_all(&document);

        let values: Vec<&str> = found.iter().map(|c| c.raw_value.as_str()).collect();
        assert_eq!(values, vec!["2025-06-01", "2025-06-03"]);
    }

    #[test]
    fn pdf_documents_only_run_pdf_extractor() {
        let document = Document::pdf(
            b"%PDF-1.4\n<< /CreationDate (D:20250801000000Z) >>\n<meta name=\"date\" content=\"2020-01-01\">"
                .to_vec(),
        );
        let found = ExtractorRegistry::default().extract_all(&document);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].source_kind, SourceKind::PdfMetadata);
    }
}
