//! Aggregate statistics over a batch of analyses.

use std::collections::BTreeMap;

use postdate_shared::Result;
use serde::Serialize;

use crate::pipeline::Analysis;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    /// Successful analyses whose advice is to apply.
    pub recommended: usize,
    /// Mean elapsed days over runs that resolved a date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_age_days: Option<f64>,
    pub tier_distribution: BTreeMap<String, usize>,
    pub priority_distribution: BTreeMap<u8, usize>,
}

impl BatchSummary {
    pub fn from_results<'a, I>(results: I) -> Self
    where
        I: IntoIterator<Item = &'a Result<Analysis>>,
    {
        let mut summary = Self::default();
        let mut ages: Vec<u64> = Vec::new();

        for result in results {
            summary.total += 1;
            let analysis = match result {
                Ok(analysis) => analysis,
                Err(_) => {
                    summary.failed += 1;
                    continue;
                }
            };

            summary.successful += 1;
            if analysis.recommendation.should_apply {
                summary.recommended += 1;
            }
            if let Some(days) = analysis.report.elapsed_days {
                ages.push(days);
            }
            *summary
                .tier_distribution
                .entry(analysis.report.urgency_tier.as_str().to_string())
                .or_default() += 1;
            *summary
                .priority_distribution
                .entry(analysis.recommendation.priority)
                .or_default() += 1;
        }

        if !ages.is_empty() {
            let mean = ages.iter().sum::<u64>() as f64 / ages.len() as f64;
            summary.average_age_days = Some((mean * 10.0).round() / 10.0);
        }
        summary
    }
}
