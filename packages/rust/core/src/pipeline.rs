//! End-to-end analysis: document → candidates → resolved date → advice.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument};

use postdate_extract::{ExtractorRegistry, PreparedDocument, visible_text};
use postdate_shared::{
    AnalysisId, AppConfig, DateReport, Document, NormalizedCandidate, PolicyConfig, ResolvedDate,
};

use crate::normalize::Normalizer;
use crate::recommend::{self, Recommendation};
use crate::resolve;
use crate::skills::{self, SkillCatalog, SkillsSummary};

/// Everything one analysis run produced.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub id: AnalysisId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    pub analysis_time: DateTime<Utc>,
    pub report: DateReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved: Option<ResolvedDate>,
    /// Every candidate that survived normalization.
    pub candidates: Vec<NormalizedCandidate>,
    pub raw_candidates: usize,
    pub dropped_candidates: usize,
    pub recommendation: Recommendation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<SkillsSummary>,
}

/// Reusable analysis entry point; holds configuration, never a clock.
pub struct Analyzer {
    registry: ExtractorRegistry,
    policy: PolicyConfig,
    catalog: Option<SkillCatalog>,
    my_skills: Vec<String>,
}

impl Analyzer {
    /// Build from configuration with the skills pass disabled.
    pub fn new(config: &AppConfig) -> Self {
        Self {
            registry: ExtractorRegistry::from_config(&config.extraction),
            policy: config.policy.clone(),
            catalog: None,
            my_skills: config.skills.my_skills.clone(),
        }
    }

    /// Enable the skills pass, with the configured extra terms.
    pub fn with_skills(mut self, config: &AppConfig) -> Self {
        self.catalog = Some(SkillCatalog::builtin().with_extra_terms(&config.skills.extra_terms));
        self
    }

    /// Override the user's skill list (e.g. from the command line).
    pub fn with_my_skills(mut self, my_skills: Vec<String>) -> Self {
        self.my_skills = my_skills;
        self
    }

    #[instrument(skip_all, fields(kind = %document.kind, url = document.source_url.as_deref().unwrap_or("-")))]
    pub fn analyze(&self, document: &Document, analysis_time: DateTime<Utc>) -> Analysis {
        let id = AnalysisId::new();
        let prepared = PreparedDocument::new(document);

        let raw = self.registry.extract_prepared(&prepared);
        let normalizer = Normalizer::new(analysis_time, &self.policy);
        let candidates = normalizer.normalize_all(&raw);
        let dropped = raw.len() - candidates.len();
        debug!(%id, raw = raw.len(), kept = candidates.len(), dropped, "normalized candidates");

        let resolved = resolve::resolve(&candidates, analysis_time);
        let tier = recommend::tier_for(resolved.as_ref());
        let report = DateReport::new(resolved.as_ref(), tier);

        let skills = match (&self.catalog, prepared.html()) {
            (Some(catalog), Some(html)) => Some(skills::summarize(
                html,
                &visible_text(html),
                document.source_url.as_deref(),
                catalog,
                &self.my_skills,
            )),
            _ => None,
        };

        let recommendation = recommend::recommend(
            resolved.as_ref(),
            skills.as_ref().and_then(|s| s.match_percentage),
        );

        info!(
            %id,
            resolved = report.resolved,
            tier = %report.urgency_tier,
            elapsed_days = ?report.elapsed_days,
            "analysis complete"
        );

        Analysis {
            id,
            source_url: document.source_url.clone(),
            analysis_time,
            report,
            resolved,
            candidates,
            raw_candidates: raw.len(),
            dropped_candidates: dropped,
            recommendation,
            skills,
        }
    }
}
