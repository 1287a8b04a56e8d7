//! Application configuration for postdate.
//!
//! User config lives at `~/.postdate/postdate.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PostdateError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "postdate.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".postdate";

// ---------------------------------------------------------------------------
// Config structs (matching postdate.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Recognized date-bearing keys.
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Plausibility thresholds.
    #[serde(default)]
    pub policy: PolicyConfig,

    /// HTTP fetch settings.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Skills pass settings.
    #[serde(default)]
    pub skills: SkillsConfig,
}

/// `[extraction]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Attribute values (`itemprop`, `name`, `property`, `http-equiv`) that mark a
    /// date-bearing meta tag. Order is the tie-break order.
    #[serde(default = "default_meta_keys")]
    pub meta_keys: Vec<String>,

    /// Keys searched for inside structured-data blocks, in preference order.
    #[serde(default = "default_structured_aliases")]
    pub structured_aliases: Vec<String>,

    /// Maximum nesting depth searched inside a structured-data block.
    #[serde(default = "default_max_json_depth")]
    pub max_json_depth: usize,

    /// Also scan non-JSON-LD `<script>` blocks for `"alias": "value"` pairs.
    #[serde(default = "default_true")]
    pub scan_inline_scripts: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            meta_keys: default_meta_keys(),
            structured_aliases: default_structured_aliases(),
            max_json_depth: default_max_json_depth(),
            scan_inline_scripts: true,
        }
    }
}

fn default_meta_keys() -> Vec<String> {
    [
        "datePosted",
        "article:published_time",
        "og:published_time",
        "datePublished",
        "date",
        "publish-date",
        "publish_date",
        "pubdate",
        "DC.date.issued",
        "dcterms.created",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_structured_aliases() -> Vec<String> {
    [
        "datePosted",
        "publishedDate",
        "createdDate",
        "postingDate",
        "date_posted",
        "posted_date",
        "dateCreated",
        "created",
        "published",
        "datePublished",
        "dateModified",
        "dateUpdated",
        "lastModified",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_max_json_depth() -> usize {
    8
}
fn default_true() -> bool {
    true
}

/// `[policy]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// How far past analysis time a candidate may lie before it is dropped.
    #[serde(default = "default_future_tolerance_hours")]
    pub future_tolerance_hours: i64,

    /// Candidates dated before January 1st of this year are dropped.
    #[serde(default = "default_min_year")]
    pub min_year: i32,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            future_tolerance_hours: default_future_tolerance_hours(),
            min_year: default_min_year(),
        }
    }
}

fn default_future_tolerance_hours() -> i64 {
    24
}
fn default_min_year() -> i32 {
    2000
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum number of redirects followed.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_redirects: default_max_redirects(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_max_redirects() -> usize {
    5
}
fn default_user_agent() -> String {
    concat!("postdate/", env!("CARGO_PKG_VERSION")).into()
}

/// `[skills]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillsConfig {
    /// Additional terms recognized on top of the built-in catalog.
    #[serde(default)]
    pub extra_terms: Vec<String>,

    /// The reader's own skills, used for the match percentage.
    #[serde(default)]
    pub my_skills: Vec<String>,
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.postdate/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| PostdateError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.postdate/postdate.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| PostdateError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content)
        .map_err(|e| PostdateError::config(format!("failed to parse {}: {e}", path.display())))?;

    validate_config(&config)?;
    tracing::debug!(?path, "loaded config");
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| PostdateError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| PostdateError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| PostdateError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// One year.
pub const MAX_FUTURE_TOLERANCE_HOURS: i64 = 24 * 365;

/// Reject settings the resolver cannot work with.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    if config.extraction.max_json_depth == 0 {
        return Err(PostdateError::config(
            "extraction.max_json_depth must be at least 1",
        ));
    }
    if !(0..=MAX_FUTURE_TOLERANCE_HOURS).contains(&config.policy.future_tolerance_hours) {
        return Err(PostdateError::config(format!(
            "policy.future_tolerance_hours must be between 0 and {MAX_FUTURE_TOLERANCE_HOURS}"
        )));
    }
    if config.fetch.timeout_secs == 0 {
        return Err(PostdateError::config("fetch.timeout_secs must be positive"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("meta_keys"));
        assert!(toml_str.contains("article:published_time"));
        assert!(toml_str.contains("future_tolerance_hours"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.extraction.max_json_depth, 8);
        assert_eq!(parsed.policy.min_year, 2000);
        assert_eq!(parsed.extraction.structured_aliases[0], "datePosted");
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let toml_str = r#"
[extraction]
meta_keys = ["jobPostedAt"]

[policy]
min_year = 2015
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.extraction.meta_keys, vec!["jobPostedAt".to_string()]);
        assert!(config.extraction.structured_aliases.contains(&"postingDate".to_string()));
        assert_eq!(config.policy.min_year, 2015);
        assert_eq!(config.policy.future_tolerance_hours, 24);
        assert_eq!(config.fetch.timeout_secs, 30);
    }

    #[test]
    fn validation_rejects_zero_depth() {
        let mut config = AppConfig::default();
        config.extraction.max_json_depth = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("max_json_depth"));
    }

    #[test]
    fn validation_bounds_future_tolerance() {
        let mut config = AppConfig::default();
        config.policy.future_tolerance_hours = MAX_FUTURE_TOLERANCE_HOURS;
        assert!(validate_config(&config).is_ok());

        for hours in [-1, MAX_FUTURE_TOLERANCE_HOURS + 1, i64::MAX] {
            config.policy.future_tolerance_hours = hours;
            let err = validate_config(&config).unwrap_err();
            assert!(err.to_string().contains("future_tolerance_hours"), "{hours}: {err}");
        }
    }

    #[test]
    fn load_config_from_reports_bad_toml() {
        let dir = std::env::temp_dir().join(format!("postdate-cfg-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        let path = dir.join("broken.toml");
        std::fs::write(&path, "[policy\nmin_year = ").expect("write");

        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
