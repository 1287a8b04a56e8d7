//! Text-pattern extractor.
//!
//! Works on *visible* text only: script, style, noscript, template and head
//! content are skipped, and balanced `{...}` spans are removed from what
//! remains, so timestamps living in code never become candidates.
//!
//! Visible text is cut into windows (one per block-level element), and each
//! window into sentences. Every sentence is tried against an ordered pattern
//! list and contributes at most one candidate: the first pattern that matches.

use std::sync::LazyLock;

use postdate_shared::{DocumentKind, RawCandidate, SourceKind};
use regex::Regex;
use scraper::Html;

use super::{CandidateExtractor, PreparedDocument};

/// Elements whose text is never visible.
const HIDDEN_TAGS: [&str; 7] = [
    "script", "style", "noscript", "template", "head", "svg", "iframe",
];

/// Elements that start a new text window.
const BLOCK_TAGS: [&str; 26] = [
    "html", "body", "main", "article", "section", "header", "footer", "aside", "nav", "div",
    "p", "li", "ul", "ol", "dl", "dt", "dd", "td", "th", "tr", "h1", "h2", "h3", "h4", "h5",
    "h6",
];

const MONTHS: &str = "jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?";

/// One entry of the ordered pattern list.
struct TextPattern {
    label: &'static str,
    regex: Regex,
    /// Capture group holding the date text.
    group: usize,
}

impl TextPattern {
    fn new(label: &'static str, pattern: &str, group: usize) -> Self {
        Self {
            label,
            regex: Regex::new(pattern).expect("valid text pattern"),
            group,
        }
    }
}

static PATTERNS: LazyLock<Vec<TextPattern>> = LazyLock::new(|| {
    vec![
        TextPattern::new(
            "rfc2822",
            r"(?i)\b(?:mon|tue|wed|thu|fri|sat|sun),\s+\d{1,2}\s+(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)\s+\d{4}\s+\d{2}:\d{2}(?::\d{2})?\s*(?:[+-]\d{4}|gmt|utc|ut)\b",
            0,
        ),
        TextPattern::new(
            "iso-datetime",
            r"\b\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}(?::\d{2}(?:\.\d+)?)?(?:Z|[+-]\d{2}:?\d{2})?",
            0,
        ),
        TextPattern::new("iso-date", r"\b\d{4}-\d{2}-\d{2}\b", 0),
        TextPattern::new("pdf-date", r"\bD:\d{14}(?:Z|[+-]\d{2}'?\d{2}'?)?", 0),
        TextPattern::new(
            "labelled-numeric",
            r"(?i)\b(?:posted|published|created|listed|updated)(?:\s+on)?[:\s]+(\d{1,2}[/.-]\d{1,2}[/.-]\d{2,4})\b",
            1,
        ),
        TextPattern::new(
            "month-day-year",
            &format!(r"(?i)\b((?:{MONTHS})\.?\s+\d{{1,2}}(?:st|nd|rd|th)?,?\s+\d{{4}})\b"),
            1,
        ),
        TextPattern::new(
            "day-month-year",
            &format!(r"(?i)\b(\d{{1,2}}(?:st|nd|rd|th)?\s+(?:{MONTHS})\.?,?\s+\d{{4}})\b"),
            1,
        ),
        TextPattern::new(
            "relative-ago",
            r"(?i)\b((?:\d+|an?|one)\+?\s*(?:minute|min|hour|hr|day|week|wk|month|mo)s?\s+ago)\b",
            1,
        ),
        TextPattern::new(
            "day-word",
            r"(?i)\b(?:posted|published|listed|added|reposted|active)\s+(today|yesterday|just now)\b",
            1,
        ),
    ]
});

/// Extracts dates from the visible text of an HTML page.
pub struct TextPatternExtractor {
    patterns: &'static [TextPattern],
}

impl TextPatternExtractor {
    pub fn new() -> Self {
        Self {
            patterns: PATTERNS.as_slice(),
        }
    }

    /// First matching pattern for one sentence, as `(rank, label, date text, offset)`.
    fn match_sentence<'w>(
        &self,
        sentence: &'w str,
    ) -> Option<(usize, &'static str, &'w str, usize)> {
        self.patterns.iter().enumerate().find_map(|(rank, pattern)| {
            let caps = pattern.regex.captures(sentence)?;
            let m = caps.get(pattern.group)?;
            Some((rank, pattern.label, m.as_str(), m.start()))
        })
    }
}

impl Default for TextPatternExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl CandidateExtractor for TextPatternExtractor {
    fn applies_to(&self, kind: DocumentKind) -> bool {
        kind == DocumentKind::Html
    }

    fn extract(&self, doc: &PreparedDocument<'_>) -> Vec<RawCandidate> {
        let Some(html) = doc.html() else {
            return Vec::new();
        };

        visible_windows(html)
            .iter()
            .enumerate()
            .flat_map(|(index, window)| {
                sentence_spans(window).into_iter().filter_map(move |(start, end)| {
                    let (rank, label, text, offset) = self.match_sentence(&window[start..end])?;
                    Some(
                        RawCandidate::new(SourceKind::TextPattern, label, text.trim(), rank)
                            .at(format!("text#{index}@{}", start + offset)),
                    )
                })
            })
            .collect()
    }

    fn name(&self) -> &str {
        "text-pattern"
    }
}

// ---------------------------------------------------------------------------
// Visible text
// ---------------------------------------------------------------------------

/// All visible text of the page, one window per line.
pub fn visible_text(html: &Html) -> String {
    visible_windows(html).join("\n")
}

/// Visible text grouped by nearest block-level ancestor, code stripped.
fn visible_windows(html: &Html) -> Vec<String> {
    let mut windows: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_block = None;

    for node in html.tree.root().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let mut hidden = false;
        let mut block = None;
        for ancestor in node.ancestors() {
            let Some(el) = ancestor.value().as_element() else {
                continue;
            };
            if HIDDEN_TAGS.contains(&el.name()) {
                hidden = true;
                break;
            }
            if block.is_none() && BLOCK_TAGS.contains(&el.name()) {
                block = Some(ancestor.id());
            }
        }
        if hidden {
            continue;
        }

        if block != current_block {
            flush_window(&mut current, &mut windows);
            current_block = block;
        }
        current.push(' ');
        current.push_str(text);
    }
    flush_window(&mut current, &mut windows);

    windows
}

fn flush_window(current: &mut String, windows: &mut Vec<String>) {
    let stripped = strip_braced(current);
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    if !collapsed.is_empty() {
        windows.push(collapsed);
    }
    current.clear();
}

/// Byte ranges of the sentences in a window. `.`, `!` and `?` end a sentence
/// when whitespace and a capital letter follow, so `Aug. 4` stays whole;
/// `;`, `|`, `·` and `•` end one whenever whitespace follows.
fn sentence_spans(window: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = 0;

    for (i, c) in window.char_indices() {
        let end = i + c.len_utf8();
        let rest = &window[end..];
        let next = rest.trim_start();
        if next.len() == rest.len() || next.is_empty() {
            continue;
        }
        let boundary = match c {
            '.' | '!' | '?' => next.starts_with(char::is_uppercase),
            ';' | '|' | '·' | '•' => true,
            _ => false,
        };
        if boundary {
            spans.push((start, end));
            start = end;
        }
    }
    spans.push((start, window.len()));
    spans
}

/// Remove balanced `{...}` spans (nested included). An unclosed `{` and
/// everything after it is kept as-is.
fn strip_braced(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut depth = 0usize;
    let mut open_at = 0usize;

    for (i, c) in text.char_indices() {
        match c {
            '{' => {
                if depth == 0 {
                    open_at = i;
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    out.push(' ');
                }
            }
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }

    if depth > 0 {
        out.push_str(&text[open_at..]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use postdate_shared::Document;

    fn run(html: &str) -> Vec<RawCandidate> {
        let document = Document::html(html);
        TextPatternExtractor::new().extract(&PreparedDocument::new(&document))
    }

    fn values(found: &[RawCandidate]) -> Vec<&str> {
        found.iter().map(|c| c.raw_value.as_str()).collect()
    }

    #[test]
    fn finds_human_readable_and_relative_dates() {
        let found = run(r#"<body>
            <p>Posted August 4, 2025</p>
            <p>Updated 3 days ago</p>
            <p>Posted yesterday</p>
        </body>"#);

        assert_eq!(values(&found), vec!["August 4, 2025", "3 days ago", "yesterday"]);
        assert_eq!(found[0].source_label, "month-day-year");
        assert_eq!(found[1].source_label, "relative-ago");
        assert_eq!(found[2].source_label, "day-word");
        assert!(found.iter().all(|c| c.source_kind == SourceKind::TextPattern));
    }

    #[test]
    fn inline_markup_stays_in_one_window() {
        let found = run("<p>Posted <strong>30+</strong> days ago</p>");
        assert_eq!(values(&found), vec!["30+ days ago"]);
    }

    #[test]
    fn first_pattern_wins_per_sentence() {
        let found = run("<p>Posted 2 days ago, on 2025-08-02, closing 4 Sep 2025</p>");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].source_label, "iso-date");
        assert_eq!(found[0].raw_value, "2025-08-02");
    }

    #[test]
    fn each_sentence_contributes_a_candidate() {
        let found = run("<p>Posted 3 days ago. Apply by August 30, 2025</p>");
        assert_eq!(values(&found), vec!["3 days ago", "August 30, 2025"]);
        assert_eq!(found[0].location_hint.as_deref(), Some("text#0@7"));
        assert_eq!(found[1].location_hint.as_deref(), Some("text#0@28"));

        let found = run("<p>Posted Aug. 4, 2025 | Closes 2025-09-01</p>");
        assert_eq!(values(&found), vec!["Aug. 4, 2025", "2025-09-01"]);
    }

    #[test]
    fn sentence_spans_split_on_terminators() {
        let window = "Posted 3 days ago. Apply by Aug. 30; remote ok";
        let sentences: Vec<&str> = sentence_spans(window)
            .into_iter()
            .map(|(start, end)| &window[start..end])
            .collect();
        assert_eq!(sentences, vec!["Posted 3 days ago.", " Apply by Aug. 30;", " remote ok"]);
        assert_eq!(sentence_spans("no terminator"), vec![(0, 13)]);
    }

    #[test]
    fn script_and_style_content_is_ignored() {
        let found = run(r#"<html><head><title>Job 2021-01-01</title>
            <style>.x { content: "2020-02-02"; }</style></head>
            <body>
              <script>var created = "2019-03-03"; var ts = 1690000000;</script>
              <noscript>2018-04-04</noscript>
              <p>Nothing dated here</p>
            </body></html>"#);
        assert!(found.is_empty(), "found {:?}", values(&found));
    }

    #[test]
    fn braced_code_in_visible_text_is_stripped() {
        let found = run(r#"<pre>config = { "since": "2017-05-05", nested: { a: 1 } }</pre>
                           <p>Listed on 12 March 2025</p>"#);
        assert_eq!(values(&found), vec!["12 March 2025"]);
    }

    #[test]
    fn labelled_numeric_and_rfc2822() {
        let found = run(r#"<div>Posted: 08/04/2025</div>
                           <div>Mon, 4 Aug 2025 10:00:00 +0000</div>"#);
        assert_eq!(values(&found), vec!["08/04/2025", "Mon, 4 Aug 2025 10:00:00 +0000"]);
    }

    #[test]
    fn strip_braced_handles_nesting_and_unclosed() {
        assert_eq!(strip_braced("a {b {c} d} e"), "a   e");
        assert_eq!(strip_braced("a } b"), "a } b");
        assert_eq!(strip_braced("a { b"), "a { b");
    }

    #[test]
    fn visible_text_joins_windows() {
        let html = Html::parse_document(
            "<body><h1>Rust Engineer</h1><script>x()</script><p>Remote</p></body>",
        );
        assert_eq!(visible_text(&html), "Rust Engineer\nRemote");
    }
}
