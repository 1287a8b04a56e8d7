//! Shared types, error model, and configuration for postdate.
//!
//! This crate is the foundation depended on by all other postdate crates.
//! It provides:
//! - [`PostdateError`]: the unified error type
//! - Domain types ([`Document`], [`RawCandidate`], [`NormalizedCandidate`],
//!   [`ResolvedDate`], [`DateReport`])
//! - Configuration ([`AppConfig`], [`ExtractionConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ExtractionConfig, FetchConfig, PolicyConfig, SkillsConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from, validate_config,
};
pub use error::{PostdateError, Result};
pub use types::{
    AnalysisId, Confidence, DateReport, Document, DocumentKind, NormalizedCandidate,
    RawCandidate, ResolvedDate, SourceKind, UrgencyTier,
};
