//! Meta-tag extractor.
//!
//! Matches elements whose `itemprop`, `name`, `property` or `http-equiv`
//! attribute names a configured date key, e.g.
//! `<meta itemprop="datePosted" content="2025-08-01">` or
//! `<meta property="article:published_time" content="...">`.

use std::sync::LazyLock;

use postdate_shared::{DocumentKind, RawCandidate, SourceKind};
use scraper::{ElementRef, Selector};

use super::{CandidateExtractor, PreparedDocument};

/// Attributes that carry the key of a date-bearing tag.
const KEY_ATTRS: [&str; 4] = ["itemprop", "name", "property", "http-equiv"];

static KEYED_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("[itemprop], meta[name], meta[property], meta[http-equiv]")
        .expect("valid selector")
});

/// Extracts dates from meta tags and microdata attributes.
pub struct MetaTagExtractor {
    keys: Vec<String>,
}

impl MetaTagExtractor {
    pub fn new(keys: Vec<String>) -> Self {
        Self { keys }
    }

    /// Index of the configured key matching any whitespace-separated token of `value`.
    fn rank_of(&self, value: &str) -> Option<usize> {
        value.split_whitespace().find_map(|token| {
            self.keys
                .iter()
                .position(|key| key.eq_ignore_ascii_case(token))
        })
    }
}

impl CandidateExtractor for MetaTagExtractor {
    fn applies_to(&self, kind: DocumentKind) -> bool {
        kind == DocumentKind::Html
    }

    fn extract(&self, doc: &PreparedDocument<'_>) -> Vec<RawCandidate> {
        let Some(html) = doc.html() else {
            return Vec::new();
        };
        if self.keys.is_empty() {
            return Vec::new();
        }

        let mut candidates = Vec::new();

        for (index, el) in html.select(&KEYED_SEL).enumerate() {
            let matched = KEY_ATTRS.iter().find_map(|attr| {
                let value = el.value().attr(attr)?;
                self.rank_of(value).map(|rank| (*attr, rank))
            });
            let Some((attr, rank)) = matched else {
                continue;
            };
            let Some(value) = tag_value(&el) else {
                continue;
            };

            let key = &self.keys[rank];
            candidates.push(
                RawCandidate::new(SourceKind::MetaTag, key.as_str(), value, rank)
                    .at(format!("{}[{attr}={key}]#{index}", el.value().name())),
            );
        }

        candidates
    }

    fn name(&self) -> &str {
        "meta-tag"
    }
}

/// Inline elements whose inner text may stand in for a missing attribute.
const TEXT_VALUE_TAGS: [&str; 6] = ["time", "span", "abbr", "data", "small", "strong"];

/// Date text of a keyed element: `content`, then `datetime`, then inner text
/// for inline or childless elements such as `<time itemprop="datePosted">`.
/// A keyed container like `<div itemprop="datePosted"><p>...</p></div>`
/// yields nothing.
fn tag_value(el: &ElementRef<'_>) -> Option<String> {
    let attr_value = el
        .value()
        .attr("content")
        .or_else(|| el.value().attr("datetime"))
        .map(str::trim)
        .filter(|v| !v.is_empty());

    if let Some(value) = attr_value {
        return Some(value.to_string());
    }

    let name = el.value().name();
    let is_leaf = !el.children().any(|child| child.value().is_element());
    if name == "meta" || !(TEXT_VALUE_TAGS.contains(&name) || is_leaf) {
        return None;
    }

    let text = el.text().collect::<Vec<_>>().join(" ");
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use postdate_shared::Document;

    fn keys() -> Vec<String> {
        vec!["datePosted".into(), "article:published_time".into(), "date".into()]
    }

    fn run(html: &str) -> Vec<RawCandidate> {
        let document = Document::html(html);
        let prepared = PreparedDocument::new(&document);
        MetaTagExtractor::new(keys()).extract(&prepared)
    }

    fn values(found: &[RawCandidate]) -> Vec<&str> {
        found.iter().map(|c| c.raw_value.as_str()).collect()
    }

    #[test]
    fn finds_itemprop_and_property_tags() {
        let found = run(r#"<html><head>
            <meta itemprop="datePosted" content="2025-08-01">
            <meta property="article:published_time" content="2025-08-02T09:00:00Z">
            <meta name="description" content="Senior engineer">
        </head><body></body></html>"#);

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].source_label, "datePosted");
        assert_eq!(found[0].raw_value, "2025-08-01");
        assert_eq!(found[0].pattern_rank, 0);
        assert_eq!(found[1].source_label, "article:published_time");
        assert_eq!(found[1].pattern_rank, 1);
        assert!(found.iter().all(|c| c.source_kind == SourceKind::MetaTag));
    }

    #[test]
    fn content_attribute_order_does_not_matter() {
        let found = run(r#"<meta content="2025-07-30" name="DATE">"#);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].source_label, "date");
        assert_eq!(found[0].raw_value, "2025-07-30");
    }

    #[test]
    fn time_element_uses_datetime_then_text() {
        let found = run(r#"<body>
            <time itemprop="datePosted" datetime="2025-08-01T08:00:00Z">Aug 1</time>
            <span itemprop="datePosted">August 2, 2025</span>
        </body>"#);

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].raw_value, "2025-08-01T08:00:00Z");
        assert_eq!(found[1].raw_value, "August 2, 2025");
    }

    #[test]
    fn keyed_containers_do_not_yield_their_text() {
        let found = run(r#"<body>
            <div itemprop="datePosted"><p>Posted 2025-08-01</p><p>Team of 12 since 2019</p></div>
            <p itemprop="datePosted">August 2, 2025</p>
            <span itemprop="datePosted"><b>Aug</b> 3, 2025</span>
        </body>"#);

        assert_eq!(values(&found), vec!["August 2, 2025", "Aug 3, 2025"]);
    }

    #[test]
    fn ignores_unknown_keys_and_empty_content() {
        let found = run(r#"<head>
            <meta name="author" content="Acme">
            <meta itemprop="datePosted" content="   ">
        </head>"#);
        assert!(found.is_empty());
    }

    #[test]
    fn synthetic_key_set_is_respected() {
        let document = Document::html(r#"<meta name="jobPostedAt" content="2025-06-01">"#);
        let prepared = PreparedDocument::new(&document);

        let default_keys = MetaTagExtractor::new(keys()).extract(&prepared);
        assert!(default_keys.is_empty());

        let custom = MetaTagExtractor::new(vec!["jobPostedAt".into()]).extract(&prepared);
        assert_eq!(custom.len(), 1);
        assert_eq!(custom[0].raw_value, "2025-06-01");
    }
}
