//! Skills pass: technical terms, title and company of a posting.
//!
//! Runs over the same visible text the text-pattern extractor reads and has no
//! influence on date resolution.

use std::collections::HashMap;
use std::sync::LazyLock;

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use url::Url;

/// `(canonical name, category, extra spellings)`.
const BUILTIN_SKILLS: &[(&str, &str, &[&str])] = &[
    ("Python", "language", &[]),
    ("Java", "language", &[]),
    ("JavaScript", "language", &["js", "ecmascript"]),
    ("TypeScript", "language", &[]),
    ("Rust", "language", &[]),
    ("Go", "language", &["golang"]),
    ("C++", "language", &["cpp"]),
    ("C#", "language", &["csharp"]),
    ("Ruby", "language", &[]),
    ("PHP", "language", &[]),
    ("Kotlin", "language", &[]),
    ("Swift", "language", &[]),
    ("Scala", "language", &[]),
    ("SQL", "language", &[]),
    ("React", "frontend", &["react.js", "reactjs"]),
    ("Vue", "frontend", &["vue.js", "vuejs"]),
    ("Angular", "frontend", &["angularjs"]),
    ("Svelte", "frontend", &[]),
    ("HTML", "frontend", &["html5"]),
    ("CSS", "frontend", &["css3"]),
    ("Tailwind", "frontend", &["tailwindcss"]),
    ("GraphQL", "api", &[]),
    ("REST", "api", &["restful"]),
    ("gRPC", "api", &[]),
    ("Node.js", "backend", &["nodejs"]),
    ("Django", "backend", &[]),
    ("Flask", "backend", &[]),
    ("FastAPI", "backend", &[]),
    ("Spring Boot", "backend", &["spring framework"]),
    ("Rails", "backend", &["ruby on rails"]),
    (".NET", "backend", &["dotnet"]),
    ("PostgreSQL", "database", &["postgres"]),
    ("MySQL", "database", &[]),
    ("MongoDB", "database", &["mongo"]),
    ("Redis", "database", &[]),
    ("Elasticsearch", "database", &[]),
    ("SQLite", "database", &[]),
    ("Kafka", "data", &[]),
    ("Spark", "data", &["pyspark"]),
    ("Airflow", "data", &[]),
    ("Tableau", "data", &[]),
    ("Pandas", "data", &[]),
    ("AWS", "cloud", &["amazon web services"]),
    ("GCP", "cloud", &["google cloud"]),
    ("Azure", "cloud", &[]),
    ("Docker", "devops", &[]),
    ("Kubernetes", "devops", &["k8s"]),
    ("Terraform", "devops", &[]),
    ("Ansible", "devops", &[]),
    ("CI/CD", "devops", &["continuous integration"]),
    ("Jenkins", "devops", &[]),
    ("Git", "tools", &["github", "gitlab"]),
    ("Linux", "tools", &["unix"]),
    ("TensorFlow", "ml", &[]),
    ("PyTorch", "ml", &[]),
    ("Machine Learning", "ml", &[]),
];

/// Canonical names that are also everyday words ("go", "rest", "rails") and
/// only count when written with this exact casing. Their aliases stay
/// case-insensitive.
const EXACT_CASE_NAMES: [&str; 3] = ["Go", "REST", "Rails"];

/// Category assigned to user-supplied terms.
const CUSTOM_CATEGORY: &str = "custom";

/// Markers that make a whitespace token look like a URL or a file path.
const URL_MARKERS: [&str; 4] = ["://", "www.", ".com", ".org"];

#[derive(Debug, Clone)]
struct SkillEntry {
    name: String,
    category: String,
    /// Lowercase spellings, matched case-insensitively.
    spellings: Vec<String>,
    /// Spellings matched against the original text as written.
    exact_spellings: Vec<String>,
}

/// A catalog of technical terms matched against posting text.
#[derive(Debug, Clone)]
pub struct SkillCatalog {
    entries: Vec<SkillEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillHit {
    pub name: String,
    pub category: String,
    pub occurrences: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillsSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub skills: Vec<SkillHit>,
    /// Share of detected skills found in the user's list, 0-100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_percentage: Option<f64>,
}

impl SkillCatalog {
    pub fn builtin() -> Self {
        let entries = BUILTIN_SKILLS
            .iter()
            .map(|(name, category, aliases)| {
                let exact = EXACT_CASE_NAMES.contains(name);
                let canonical = (!exact).then_some(*name);
                SkillEntry {
                    name: (*name).to_string(),
                    category: (*category).to_string(),
                    spellings: canonical
                        .into_iter()
                        .chain(aliases.iter().copied())
                        .map(str::to_lowercase)
                        .collect(),
                    exact_spellings: if exact { vec![(*name).to_string()] } else { Vec::new() },
                }
            })
            .collect();
        Self { entries }
    }

    /// Add user terms; ones already in the catalog are skipped.
    pub fn with_extra_terms(mut self, terms: &[String]) -> Self {
        for term in terms {
            let term = term.trim();
            if term.is_empty() || self.find(term).is_some() {
                continue;
            }
            self.entries.push(SkillEntry {
                name: term.to_string(),
                category: CUSTOM_CATEGORY.to_string(),
                spellings: vec![term.to_lowercase()],
                exact_spellings: Vec::new(),
            });
        }
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn find(&self, term: &str) -> Option<&SkillEntry> {
        let term = term.trim().to_lowercase();
        self.entries.iter().find(|entry| {
            entry.spellings.iter().any(|s| *s == term)
                || entry.exact_spellings.iter().any(|s| s.to_lowercase() == term)
        })
    }

    /// Detected skills, most frequent first, ties by name.
    pub fn detect(&self, text: &str) -> Vec<SkillHit> {
        let haystack = text.to_lowercase();

        let mut hits: Vec<SkillHit> = self
            .entries
            .iter()
            .filter_map(|entry| {
                let occurrences = count_occurrences(&haystack, &entry.spellings)
                    + count_occurrences(text, &entry.exact_spellings);
                (occurrences > 0).then(|| SkillHit {
                    name: entry.name.clone(),
                    category: entry.category.clone(),
                    occurrences,
                })
            })
            .collect();

        hits.sort_by(|a, b| b.occurrences.cmp(&a.occurrences).then_with(|| a.name.cmp(&b.name)));
        hits
    }

    /// Percentage of `hits` the user lists, rounded to one decimal.
    pub fn match_percentage(&self, hits: &[SkillHit], my_skills: &[String]) -> Option<f64> {
        if hits.is_empty() || my_skills.is_empty() {
            return None;
        }

        let mine: Vec<&str> = my_skills
            .iter()
            .filter_map(|term| self.find(term).map(|entry| entry.name.as_str()))
            .collect();
        let matched = hits.iter().filter(|hit| mine.contains(&hit.name.as_str())).count();

        let pct = matched as f64 / hits.len() as f64 * 100.0;
        Some((pct * 10.0).round() / 10.0)
    }
}

impl Default for SkillCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Count non-overlapping matches of any spelling, so `react.js` is one
/// occurrence even though `react` also matches inside it.
fn count_occurrences(haystack: &str, spellings: &[String]) -> usize {
    let mut spans: Vec<(usize, usize)> = spellings
        .iter()
        .flat_map(|spelling| term_spans(haystack, spelling))
        .collect();
    spans.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| b.1.cmp(&a.1)));

    let mut count = 0;
    let mut covered_until = 0;
    for (start, end) in spans {
        if count > 0 && start < covered_until {
            continue;
        }
        count += 1;
        covered_until = end;
    }
    count
}

/// Boundary-delimited matches of `term` (plural `s` allowed).
fn term_spans<'h>(haystack: &'h str, term: &'h str) -> impl Iterator<Item = (usize, usize)> + 'h {
    haystack
        .match_indices(term)
        .map(move |(start, _)| (start, start + term.len()))
        .filter(move |&(start, end)| {
            let mut preceding = haystack[..start].chars().rev();
            let before = match preceding.next() {
                // `js` inside `node.js`
                Some('.') => preceding.next().filter(|c| c.is_alphanumeric()),
                other => other,
            };
            let mut after = haystack[end..].chars();
            let next = match after.next() {
                Some('s') => after.next(),
                other => other,
            };

            !before.is_some_and(is_term_char)
                && !next.is_some_and(is_term_char)
                && !inside_url(haystack, start, end)
        })
}

fn is_term_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '+' | '#' | '_')
}

/// Whether the whitespace token around `start..end` looks like a URL or path.
fn inside_url(haystack: &str, start: usize, end: usize) -> bool {
    let token_start = haystack[..start]
        .rfind(char::is_whitespace)
        .map_or(0, |i| i + 1);
    let token_end = haystack[end..]
        .find(char::is_whitespace)
        .map_or(haystack.len(), |i| end + i);
    let token = &haystack[token_start..token_end];

    token.starts_with('/')
        || token.starts_with("~/")
        || URL_MARKERS.iter().any(|marker| token.contains(marker))
}

// ---------------------------------------------------------------------------
// Title and company
// ---------------------------------------------------------------------------

static OG_TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[property="og:title"]"#).expect("valid selector"));
static H1: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").expect("valid selector"));
static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("valid selector"));
static OG_SITE_NAME: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"meta[property="og:site_name"]"#).expect("valid selector")
});
static AUTHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[name="author"]"#).expect("valid selector"));

/// Posting title: `og:title`, then the first `h1`, then `<title>`.
pub fn posting_title(html: &Html) -> Option<String> {
    meta_content(html, &OG_TITLE)
        .or_else(|| element_text(html, &H1))
        .or_else(|| element_text(html, &TITLE))
}

/// Hiring company: `og:site_name`, then `author`, then the URL host.
pub fn posting_company(html: &Html, source_url: Option<&str>) -> Option<String> {
    meta_content(html, &OG_SITE_NAME)
        .or_else(|| meta_content(html, &AUTHOR))
        .or_else(|| source_url.and_then(company_from_host))
}

fn meta_content(html: &Html, selector: &Selector) -> Option<String> {
    html.select(selector)
        .filter_map(|el| el.value().attr("content"))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn element_text(html: &Html, selector: &Selector) -> Option<String> {
    html.select(selector)
        .map(|el| el.text().collect::<Vec<_>>().join(" "))
        .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
        .find(|s| !s.is_empty())
}

/// `https://jobs.acme.com/...` → `Acme`.
fn company_from_host(source_url: &str) -> Option<String> {
    let url = Url::parse(source_url).ok()?;
    let host = url.host_str()?;
    let labels: Vec<&str> = host.trim_start_matches("www.").split('.').collect();
    let name = match labels.len() {
        0 => return None,
        1 => labels[0],
        n => labels[n - 2],
    };

    let mut chars = name.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars).collect())
}

/// Full skills pass over a parsed page.
pub fn summarize(
    html: &Html,
    visible_text: &str,
    source_url: Option<&str>,
    catalog: &SkillCatalog,
    my_skills: &[String],
) -> SkillsSummary {
    let skills = catalog.detect(visible_text);
    let match_percentage = catalog.match_percentage(&skills, my_skills);

    SkillsSummary {
        title: posting_title(html),
        company: posting_company(html, source_url),
        skills,
        match_percentage,
    }
}

/// Group detected skills by category, for display.
pub fn by_category(hits: &[SkillHit]) -> Vec<(String, Vec<String>)> {
    let mut groups: HashMap<&str, Vec<String>> = HashMap::new();
    for hit in hits {
        groups.entry(hit.category.as_str()).or_default().push(hit.name.clone());
    }
    let mut grouped: Vec<(String, Vec<String>)> = groups
        .into_iter()
        .map(|(category, names)| (category.to_string(), names))
        .collect();
    grouped.sort_by(|a, b| a.0.cmp(&b.0));
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(hits: &[SkillHit]) -> Vec<&str> {
        hits.iter().map(|h| h.name.as_str()).collect()
    }

    #[test]
    fn matches_on_term_boundaries_only() {
        let hits = SkillCatalog::builtin().detect("We trust Rustaceans who know Rust and Java, not JavaScript.");
        let found = names(&hits);
        assert!(found.contains(&"Rust"));
        assert!(found.contains(&"Java"));
        assert!(found.contains(&"JavaScript"));
        assert_eq!(hits.iter().find(|h| h.name == "Rust").unwrap().occurrences, 1);
        assert_eq!(hits.iter().find(|h| h.name == "Java").unwrap().occurrences, 1);
    }

    #[test]
    fn aliases_fold_into_canonical_name() {
        let hits = SkillCatalog::builtin().detect("Node.js services, nodejs tooling, Postgres and PostgreSQL");
        let node = hits.iter().find(|h| h.name == "Node.js").unwrap();
        assert_eq!(node.occurrences, 2);
        assert_eq!(node.category, "backend");
        assert_eq!(hits.iter().find(|h| h.name == "PostgreSQL").unwrap().occurrences, 2);
    }

    #[test]
    fn dotted_suffixes_do_not_count_separately() {
        let hits = SkillCatalog::builtin().detect("Built with React.js and Node.js.");
        assert_eq!(names(&hits), vec!["Node.js", "React"]);
    }

    #[test]
    fn symbols_in_names_are_respected() {
        let found = SkillCatalog::builtin().detect("C++ and C# on CI/CD, plus APIs over REST");
        let found = names(&found);
        assert!(found.contains(&"C++"));
        assert!(found.contains(&"C#"));
        assert!(found.contains(&"CI/CD"));
        assert!(found.contains(&"REST"));
    }

    #[test]
    fn everyday_words_need_exact_casing() {
        let catalog = SkillCatalog::builtin();
        let hits = catalog.detect(
            "Ready to go? The rest of the team starts in spring and stays on the rails. \
             Send your CV in ts format or by email.",
        );
        assert!(hits.is_empty(), "unexpected: {hits:?}");

        let hits = catalog.detect("Go and Golang services behind REST APIs, Spring Boot and Rails");
        let found = names(&hits);
        assert_eq!(hits.iter().find(|h| h.name == "Go").unwrap().occurrences, 2);
        assert!(found.contains(&"REST"));
        assert!(found.contains(&"Spring Boot"));
        assert!(found.contains(&"Rails"));

        assert_eq!(catalog.find("go").map(|e| e.name.as_str()), Some("Go"));
    }

    #[test]
    fn url_and_path_tokens_are_ignored() {
        let hits = SkillCatalog::builtin()
            .detect("Apply at https://acme.com/jobs/python or see /opt/docker/run.sh");
        assert!(hits.is_empty(), "unexpected: {hits:?}");
    }

    #[test]
    fn sorted_by_occurrences_then_name() {
        let hits = SkillCatalog::builtin().detect("Docker Docker AWS Linux Linux");
        assert_eq!(names(&hits), vec!["Docker", "Linux", "AWS"]);
    }

    #[test]
    fn extra_terms_extend_catalog() {
        let catalog = SkillCatalog::builtin().with_extra_terms(&["Bevy".into(), "rust".into()]);
        assert_eq!(catalog.len(), SkillCatalog::builtin().len() + 1);

        let hits = catalog.detect("Bevy game engine in Rust");
        let bevy = hits.iter().find(|h| h.name == "Bevy").unwrap();
        assert_eq!(bevy.category, CUSTOM_CATEGORY);
    }

    #[test]
    fn match_percentage_uses_aliases() {
        let catalog = SkillCatalog::builtin();
        let hits = catalog.detect("Rust, Go, Docker and Kubernetes");
        let mine = vec!["rust".to_string(), "golang".to_string(), "Haskell".to_string()];
        assert_eq!(catalog.match_percentage(&hits, &mine), Some(50.0));
        assert_eq!(catalog.match_percentage(&hits, &[]), None);
        assert_eq!(catalog.match_percentage(&[], &mine), None);
    }

    #[test]
    fn title_and_company_fallbacks() {
        let html = Html::parse_document(
            r#"<html><head><title>Careers | Widget Co</title>
               <meta property="og:site_name" content="Widget Co"></head>
               <body><h1> Data   Analyst </h1></body></html>"#,
        );
        assert_eq!(posting_title(&html).as_deref(), Some("Data Analyst"));
        assert_eq!(posting_company(&html, None).as_deref(), Some("Widget Co"));

        let bare = Html::parse_document("<html><head><title>Ops Lead</title></head></html>");
        assert_eq!(posting_title(&bare).as_deref(), Some("Ops Lead"));
        assert_eq!(
            posting_company(&bare, Some("https://jobs.globex.com/ops/1")).as_deref(),
            Some("Globex")
        );
        assert_eq!(posting_company(&bare, None), None);
    }

    #[test]
    fn groups_by_category() {
        let hits = SkillCatalog::builtin().detect("Rust Python Docker");
        let groups = by_category(&hits);
        assert_eq!(groups[0].0, "devops");
        assert_eq!(groups[1].0, "language");
        assert_eq!(groups[1].1.len(), 2);
    }
}
