//! Human-readable and JSON rendering of analyses.

use std::fmt::Write;

use postdate_core::skills::by_category;
use postdate_core::{Analysis, BatchSummary};
use postdate_shared::Result;
use serde_json::{Value, json};

/// Multi-line report for one analysis.
pub(crate) fn render_analysis(analysis: &Analysis) -> String {
    let mut out = String::new();
    let report = &analysis.report;
    let rec = &analysis.recommendation;

    let _ = writeln!(out);
    if let Some(url) = &analysis.source_url {
        let _ = writeln!(out, "  Source:     {url}");
    }
    if let Some(skills) = &analysis.skills {
        if let Some(title) = &skills.title {
            let _ = writeln!(out, "  Title:      {title}");
        }
        if let Some(company) = &skills.company {
            let _ = writeln!(out, "  Company:    {company}");
        }
    }

    match &analysis.resolved {
        Some(date) => {
            let _ = writeln!(
                out,
                "  Posted:     {} ({})",
                date.timestamp.format("%Y-%m-%d %H:%M UTC"),
                age_label(date.elapsed_days)
            );
            let _ = writeln!(out, "  Found in:   {} ({})", date.source_kind, date.source_label);
            if date.future_suspect {
                let _ = writeln!(out, "  Warning:    date is after the analysis time");
            }
        }
        None => {
            let _ = writeln!(out, "  Posted:     unknown");
        }
    }

    let _ = writeln!(out, "  Tier:       {}", report.urgency_tier);
    let _ = writeln!(
        out,
        "  Advice:     {} (priority {}/10)",
        rec.advice.as_str().to_uppercase(),
        rec.priority
    );
    let _ = writeln!(out, "              {}", rec.guidance);
    let _ = writeln!(
        out,
        "  Candidates: {} found, {} kept, {} dropped",
        analysis.raw_candidates,
        analysis.candidates.len(),
        analysis.dropped_candidates
    );

    if let Some(skills) = &analysis.skills {
        if skills.skills.is_empty() {
            let _ = writeln!(out, "  Skills:     none detected");
        } else {
            let _ = writeln!(out, "  Skills:");
            for (category, names) in by_category(&skills.skills) {
                let _ = writeln!(out, "    {category:<10} {}", names.join(", "));
            }
        }
        if let Some(pct) = skills.match_percentage {
            let _ = writeln!(out, "  Match:      {pct:.1}%");
        }
    }
    let _ = writeln!(out);
    out
}

/// One line per URL, then the summary block.
pub(crate) fn render_batch(results: &[(String, Result<Analysis>)], summary: &BatchSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out);

    for (url, result) in results {
        match result {
            Ok(analysis) => {
                let age = analysis
                    .report
                    .elapsed_days
                    .map_or_else(|| "-".to_string(), |d| format!("{d}d"));
                let _ = writeln!(
                    out,
                    "  {:<12} {:>5}  p{:<2} {url}",
                    analysis.report.urgency_tier.as_str(),
                    age,
                    analysis.recommendation.priority
                );
            }
            Err(e) => {
                let _ = writeln!(out, "  {:<12} {:>5}  {:<3} {url}: {e}", "error", "-", "");
            }
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "  Total:       {}", summary.total);
    let _ = writeln!(out, "  Successful:  {}", summary.successful);
    let _ = writeln!(out, "  Failed:      {}", summary.failed);
    let _ = writeln!(out, "  Recommended: {}", summary.recommended);
    if let Some(avg) = summary.average_age_days {
        let _ = writeln!(out, "  Average age: {avg:.1} days");
    }
    for (tier, count) in &summary.tier_distribution {
        let _ = writeln!(out, "    {tier:<12} {count}");
    }
    let _ = writeln!(out);
    out
}

/// `{"results": [...], "summary": {...}}`; failures carry their error text.
pub(crate) fn batch_json(results: &[(String, Result<Analysis>)], summary: &BatchSummary) -> Value {
    let results: Vec<Value> = results
        .iter()
        .map(|(url, result)| match result {
            Ok(analysis) => json!({ "url": url, "ok": true, "analysis": analysis }),
            Err(e) => json!({ "url": url, "ok": false, "error": e.to_string() }),
        })
        .collect();

    json!({ "results": results, "summary": summary })
}

fn age_label(days: u64) -> String {
    match days {
        0 => "today".to_string(),
        1 => "1 day ago".to_string(),
        n => format!("{n} days ago"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use postdate_core::Analyzer;
    use postdate_shared::{AppConfig, Document, PostdateError};

    fn analysis(html: &str) -> Analysis {
        let now = Utc.with_ymd_and_hms(2025, 8, 4, 10, 30, 0).unwrap();
        Analyzer::new(&AppConfig::default()).analyze(&Document::html(html), now)
    }

    #[test]
    fn renders_resolved_analysis() {
        let text = render_analysis(&analysis(
            r#"<script type="application/ld+json">{"datePosted": "2025-08-01T10:30:00Z"}</script>"#,
        ));
        assert!(text.contains("2025-08-01 10:30 UTC (3 days ago)"));
        assert!(text.contains("structured-data (datePosted)"));
        assert!(text.contains("Tier:       fresh"));
        assert!(text.contains("APPLY (priority 9/10)"));
    }

    #[test]
    fn renders_undetermined_analysis() {
        let text = render_analysis(&analysis("<p>Come work with us</p>"));
        assert!(text.contains("Posted:     unknown"));
        assert!(text.contains("undetermined"));
        assert!(text.contains("MAYBE APPLY"));
    }

    #[test]
    fn batch_json_marks_failures() {
        let results = vec![
            ("https://a.example/1".to_string(), Ok(analysis(r#"<meta name="date" content="2025-08-01">"#))),
            (
                "https://b.example/2".to_string(),
                Err(PostdateError::Network("https://b.example/2: HTTP 404 Not Found".into())),
            ),
        ];
        let summary = BatchSummary::from_results(results.iter().map(|(_, r)| r));
        let value = batch_json(&results, &summary);

        assert_eq!(value["results"][0]["ok"], true);
        assert_eq!(value["results"][1]["ok"], false);
        assert!(value["results"][1]["error"].as_str().unwrap().contains("404"));
        assert_eq!(value["summary"]["failed"], 1);

        let text = render_batch(&results, &summary);
        assert!(text.contains("fresh"));
        assert!(text.contains("error"));
    }
}
