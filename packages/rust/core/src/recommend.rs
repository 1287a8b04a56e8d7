//! Urgency tiers and application advice.

use postdate_shared::{ResolvedDate, UrgencyTier};
use serde::{Deserialize, Serialize};

/// Inclusive upper bounds (in days) of each dated tier.
const TIER_BOUNDS: [(u64, UrgencyTier); 4] = [
    (7, UrgencyTier::Fresh),
    (30, UrgencyTier::Recent),
    (60, UrgencyTier::Aging),
    (90, UrgencyTier::Stale),
];

/// Map elapsed days to a tier.
pub fn tier_for_days(elapsed_days: u64) -> UrgencyTier {
    TIER_BOUNDS
        .iter()
        .find(|(bound, _)| elapsed_days <= *bound)
        .map(|(_, tier)| *tier)
        .unwrap_or(UrgencyTier::VeryStale)
}

/// Tier for an optional resolution; `None` is always undetermined.
pub fn tier_for(resolved: Option<&ResolvedDate>) -> UrgencyTier {
    resolved.map_or(UrgencyTier::Undetermined, |date| tier_for_days(date.elapsed_days))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApplyAdvice {
    Apply,
    ApplySoon,
    Maybe,
    Skip,
}

impl ApplyAdvice {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Apply => "apply",
            Self::ApplySoon => "apply soon",
            Self::Maybe => "maybe apply",
            Self::Skip => "skip",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub tier: UrgencyTier,
    pub advice: ApplyAdvice,
    pub should_apply: bool,
    /// 1 (lowest) to 10 (highest).
    pub priority: u8,
    pub guidance: String,
}

/// Build advice for one analysis. `skills_match` is a 0-100 percentage.
pub fn recommend(resolved: Option<&ResolvedDate>, skills_match: Option<f64>) -> Recommendation {
    let tier = tier_for(resolved);
    let future_suspect = resolved.is_some_and(|date| date.future_suspect);

    let advice = match tier {
        UrgencyTier::Fresh | UrgencyTier::Recent => ApplyAdvice::Apply,
        UrgencyTier::Aging => ApplyAdvice::ApplySoon,
        UrgencyTier::Stale | UrgencyTier::VeryStale => ApplyAdvice::Skip,
        UrgencyTier::Undetermined => ApplyAdvice::Maybe,
    };

    Recommendation {
        tier,
        advice,
        should_apply: advice != ApplyAdvice::Skip,
        priority: priority(tier, future_suspect, skills_match),
        guidance: guidance(tier, resolved, future_suspect),
    }
}

fn priority(tier: UrgencyTier, future_suspect: bool, skills_match: Option<f64>) -> u8 {
    let base: i32 = if future_suspect {
        10
    } else {
        match tier {
            UrgencyTier::Fresh => 9,
            UrgencyTier::Recent => 7,
            UrgencyTier::Aging => 5,
            UrgencyTier::Stale => 3,
            UrgencyTier::VeryStale => 1,
            UrgencyTier::Undetermined => 5,
        }
    };

    let adjustment = match skills_match {
        Some(pct) if pct >= 80.0 => 2,
        Some(pct) if pct >= 60.0 => 1,
        Some(pct) if pct < 30.0 => -1,
        _ => 0,
    };

    (base + adjustment).clamp(1, 10) as u8
}

fn guidance(tier: UrgencyTier, resolved: Option<&ResolvedDate>, future_suspect: bool) -> String {
    let days = resolved.map_or(0, |date| date.elapsed_days);
    let plural = if days == 1 { "" } else { "s" };

    if future_suspect {
        return "Posting date is ahead of the analysis time; treat it as brand new and apply now."
            .to_string();
    }

    match tier {
        UrgencyTier::Fresh => {
            format!("Very fresh posting, only {days} day{plural} old. Apply immediately.")
        }
        UrgencyTier::Recent => {
            format!("Recent posting, {days} days old. Good chance of getting noticed.")
        }
        UrgencyTier::Aging => {
            format!("Posting is {days} days old. Still worth applying, but act fast.")
        }
        UrgencyTier::Stale => {
            format!("Posting is {days} days old. The position may already be filled.")
        }
        UrgencyTier::VeryStale => {
            format!("Very old posting ({days} days). Likely filled or expired.")
        }
        UrgencyTier::Undetermined => {
            "No posting date found. It could be new; check the listing manually.".to_string()
        }
    }
}
