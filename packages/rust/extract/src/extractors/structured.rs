//! Structured-data extractor.
//!
//! Parses every `<script type="application/ld+json">` block as JSON and walks
//! the tree (bounded depth) for a configured date alias. Other inline scripts
//! are optionally scanned for `"alias": "value"` pairs, which catches
//! hydration state that never made it into JSON-LD.

use std::collections::HashSet;
use std::sync::LazyLock;

use postdate_shared::{DocumentKind, RawCandidate, SourceKind};
use regex::Regex;
use scraper::Selector;
use serde_json::Value;
use tracing::{debug, warn};

use super::{CandidateExtractor, PreparedDocument};

static SCRIPT_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script").expect("valid selector"));

/// A date alias found inside a JSON tree.
#[derive(Debug, Clone, PartialEq, Eq)]
struct JsonHit {
    rank: usize,
    value: String,
    path: String,
}

/// Extracts dates from JSON-LD blocks and embedded script state.
pub struct StructuredDataExtractor {
    aliases: Vec<String>,
    max_depth: usize,
    inline_re: Option<Regex>,
}

impl StructuredDataExtractor {
    pub fn new(aliases: Vec<String>, max_depth: usize, scan_inline_scripts: bool) -> Self {
        let inline_re = if scan_inline_scripts {
            build_inline_regex(&aliases)
        } else {
            None
        };
        Self {
            aliases,
            max_depth,
            inline_re,
        }
    }

    /// Depth-first search: aliases at the current level (in declaration order)
    /// win over anything nested below it.
    fn find_date(&self, value: &Value, depth: usize, path: &str) -> Option<JsonHit> {
        if depth >= self.max_depth {
            return None;
        }

        match value {
            Value::Object(map) => {
                for (rank, alias) in self.aliases.iter().enumerate() {
                    if let Some(text) = map.get(alias).and_then(scalar_text) {
                        return Some(JsonHit {
                            rank,
                            value: text,
                            path: join_path(path, alias),
                        });
                    }
                }
                map.iter()
                    .filter(|(_, child)| child.is_object() || child.is_array())
                    .find_map(|(key, child)| self.find_date(child, depth + 1, &join_path(path, key)))
            }
            Value::Array(items) => items
                .iter()
                .enumerate()
                .find_map(|(i, item)| self.find_date(item, depth + 1, &format!("{path}[{i}]"))),
            _ => None,
        }
    }

    fn alias_rank(&self, alias: &str) -> usize {
        self.aliases
            .iter()
            .position(|a| a == alias)
            .unwrap_or(self.aliases.len())
    }

    fn scan_inline(&self, re: &Regex, block: usize, body: &str, out: &mut Vec<RawCandidate>) {
        let mut seen = HashSet::new();
        for caps in re.captures_iter(body) {
            let (Some(alias), Some(value)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            if !seen.insert((alias.as_str(), value.as_str())) {
                continue;
            }
            out.push(
                RawCandidate::new(
                    SourceKind::StructuredData,
                    format!("embedded:{}", alias.as_str()),
                    value.as_str(),
                    self.alias_rank(alias.as_str()),
                )
                .at(format!("script#{block}@{}", alias.start())),
            );
        }
    }
}

impl CandidateExtractor for StructuredDataExtractor {
    fn applies_to(&self, kind: DocumentKind) -> bool {
        kind == DocumentKind::Html
    }

    fn extract(&self, doc: &PreparedDocument<'_>) -> Vec<RawCandidate> {
        let Some(html) = doc.html() else {
            return Vec::new();
        };
        if self.aliases.is_empty() {
            return Vec::new();
        }

        let mut candidates = Vec::new();

        for (block, script) in html.select(&SCRIPT_SEL).enumerate() {
            let script_type = script
                .value()
                .attr("type")
                .map(|t| t.trim().to_ascii_lowercase())
                .unwrap_or_default();
            let body = script.text().collect::<String>();

            if script_type.starts_with("application/ld+json") {
                let payload = strip_comment_wrapper(&body);
                let parsed: Value = match serde_json::from_str(payload) {
                    Ok(value) => value,
                    Err(e) => {
                        debug!(block, error = %e, "skipping malformed JSON-LD block");
                        continue;
                    }
                };
                if let Some(hit) = self.find_date(&parsed, 0, "$") {
                    candidates.push(
                        RawCandidate::new(
                            SourceKind::StructuredData,
                            self.aliases[hit.rank].as_str(),
                            hit.value,
                            hit.rank,
                        )
                        .at(format!("ld+json#{block}:{}", hit.path)),
                    );
                }
            } else if let Some(re) = &self.inline_re {
                if is_inline_script(&script_type) {
                    self.scan_inline(re, block, &body, &mut candidates);
                }
            }
        }

        candidates
    }

    fn name(&self) -> &str {
        "structured-data"
    }
}

/// One regex matching `"alias": "value"` for every configured alias.
fn build_inline_regex(aliases: &[String]) -> Option<Regex> {
    if aliases.is_empty() {
        return None;
    }
    let alternation = aliases
        .iter()
        .map(|a| regex::escape(a))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = format!(r#""({alternation})"\s*:\s*"([^"\\]{{4,64}})""#);

    match Regex::new(&pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!(error = %e, "could not build inline script pattern; inline scan disabled");
            None
        }
    }
}

/// Script types whose body may hold embedded page state.
fn is_inline_script(script_type: &str) -> bool {
    static STATE_TYPES: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^(|text/javascript|application/javascript|module|application/json)$")
            .expect("valid regex")
    });
    STATE_TYPES.is_match(script_type)
}

/// Date-like text of a JSON scalar (or of a JSON-LD `{"@value": ...}` object).
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(n.to_string()),
        Value::Object(map) => map.get("@value").and_then(scalar_text),
        _ => None,
    }
}

fn join_path(path: &str, key: &str) -> String {
    format!("{path}.{key}")
}

fn strip_comment_wrapper(body: &str) -> &str {
    let trimmed = body.trim();
    let trimmed = trimmed.strip_prefix("<!--").unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix("-->").unwrap_or(trimmed);
    trimmed.trim()
}
