//! Date resolution and posting analysis for postdate.
//!
//! This crate ties extraction, normalization and resolution into a single
//! analysis run ([`Analyzer::analyze`]):
//! - [`normalize`]: raw candidate text to UTC timestamps, with plausibility checks
//! - [`resolve`]: deterministic choice of one winning candidate
//! - [`recommend`]: urgency tier, apply advice and priority
//! - [`skills`]: optional skills, title and company pass
//! - [`summary`]: batch statistics

pub mod normalize;
pub mod pipeline;
pub mod recommend;
pub mod resolve;
pub mod skills;
pub mod summary;

pub use normalize::{DropReason, Normalizer};
pub use pipeline::{Analysis, Analyzer};
pub use recommend::{ApplyAdvice, Recommendation, recommend, tier_for, tier_for_days};
pub use resolve::resolve;
pub use skills::{SkillCatalog, SkillHit, SkillsSummary};
pub use summary::BatchSummary;
