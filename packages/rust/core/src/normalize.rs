//! Date normalization: raw candidate text → absolute UTC timestamp.
//!
//! Parsers are tried in a fixed order:
//! 1. absolute forms (RFC 3339 / ISO-8601 variants, epoch numbers, PDF `D:` stamps)
//! 2. human-readable forms (RFC 2822, month names, numeric day/month/year)
//! 3. relative phrases, resolved against the injected analysis time
//!
//! Anything that fails to parse, or parses to an implausible date, is dropped.

use std::borrow::Cow;
use std::sync::LazyLock;

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc,
};
use postdate_shared::{NormalizedCandidate, PolicyConfig, RawCandidate};
use regex::Regex;
use tracing::debug;

/// Why a raw candidate produced no normalized candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DropReason {
    #[error("no recognized date format")]
    Unparsable,

    #[error("{hours_ahead}h after analysis time")]
    TooFarInFuture { hours_ahead: i64 },

    #[error("year {year} is before the plausibility floor")]
    TooOld { year: i32 },
}

/// Converts raw candidates into absolute timestamps relative to one analysis time.
#[derive(Debug, Clone)]
pub struct Normalizer {
    analysis_time: DateTime<Utc>,
    latest_plausible: DateTime<Utc>,
    min_year: i32,
}

impl Normalizer {
    /// Tolerances too large for chrono saturate to the end of its range.
    pub fn new(analysis_time: DateTime<Utc>, policy: &PolicyConfig) -> Self {
        let latest_plausible = Duration::try_hours(policy.future_tolerance_hours.max(0))
            .and_then(|tolerance| analysis_time.checked_add_signed(tolerance))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            analysis_time,
            latest_plausible,
            min_year: policy.min_year,
        }
    }

    pub fn analysis_time(&self) -> DateTime<Utc> {
        self.analysis_time
    }

    /// Parse `value` with every known format, without plausibility checks.
    pub fn parse_timestamp(&self, value: &str) -> Option<DateTime<Utc>> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        parse_absolute(value)
            .or_else(|| parse_human(value))
            .or_else(|| parse_relative(value, self.analysis_time))
    }

    /// Normalize one candidate, reporting why it was dropped.
    pub fn try_normalize(&self, raw: &RawCandidate) -> Result<NormalizedCandidate, DropReason> {
        let resolved_at = self
            .parse_timestamp(&raw.raw_value)
            .ok_or(DropReason::Unparsable)?;

        if resolved_at > self.latest_plausible {
            return Err(DropReason::TooFarInFuture {
                hours_ahead: (resolved_at - self.analysis_time).num_hours(),
            });
        }
        if resolved_at.year() < self.min_year {
            return Err(DropReason::TooOld {
                year: resolved_at.year(),
            });
        }

        Ok(NormalizedCandidate::from_raw(raw, resolved_at))
    }

    /// Normalize one candidate; drops are logged at debug level.
    pub fn normalize(&self, raw: &RawCandidate) -> Option<NormalizedCandidate> {
        match self.try_normalize(raw) {
            Ok(candidate) => Some(candidate),
            Err(reason) => {
                debug!(
                    source_kind = %raw.source_kind,
                    label = %raw.source_label,
                    value = %raw.raw_value,
                    %reason,
                    "dropped date candidate"
                );
                None
            }
        }
    }

    pub fn normalize_all(&self, raws: &[RawCandidate]) -> Vec<NormalizedCandidate> {
        raws.iter().filter_map(|raw| self.normalize(raw)).collect()
    }
}

// ---------------------------------------------------------------------------
// Absolute forms
// ---------------------------------------------------------------------------

/// Extended and basic ISO 8601 with a numeric offset. A `Z` designator is
/// rewritten to `+00:00` first, since `%z` only takes numeric offsets.
const OFFSET_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M%z",
    "%Y%m%dT%H%M%S%z",
    "%Y%m%dT%H%M%z",
];

const NAIVE_DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y%m%dT%H%M%S",
    "%Y%m%dT%H%M",
];

fn parse_absolute(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    let offset_value = zulu_as_offset(value);
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&offset_value, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(ndt.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return start_of_day(date);
    }
    if value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit()) {
        return NaiveDate::parse_from_str(value, "%Y%m%d")
            .ok()
            .and_then(start_of_day);
    }

    parse_epoch(value).or_else(|| parse_pdf_date(value))
}

/// `...10:30Z` becomes `...10:30+00:00`; anything else is returned as is.
fn zulu_as_offset(value: &str) -> Cow<'_, str> {
    match value.strip_suffix(['Z', 'z']) {
        Some(rest) if rest.ends_with(|c: char| c.is_ascii_digit()) => {
            Cow::Owned(format!("{rest}+00:00"))
        }
        _ => Cow::Borrowed(value),
    }
}

/// 10-digit epoch seconds or 13-digit epoch milliseconds.
fn parse_epoch(value: &str) -> Option<DateTime<Utc>> {
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let n: i64 = value.parse().ok()?;
    match value.len() {
        10 => DateTime::from_timestamp(n, 0),
        13 => DateTime::from_timestamp_millis(n),
        _ => None,
    }
}

/// PDF date string: `D:YYYY[MM[DD[HH[mm[SS]]]]][Z|±HH'mm']`.
fn parse_pdf_date(value: &str) -> Option<DateTime<Utc>> {
    static PDF_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(
            r"^D:(\d{4})(\d{2})?(\d{2})?(\d{2})?(\d{2})?(\d{2})?(?:(Z)|([+-])(\d{2})'?(\d{2})?'?)?$",
        )
        .expect("valid regex")
    });

    let caps = PDF_RE.captures(value)?;
    let num = |i: usize, default: u32| -> Option<u32> {
        match caps.get(i) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(default),
        }
    };

    let year: i32 = caps.get(1)?.as_str().parse().ok()?;
    let naive = NaiveDate::from_ymd_opt(year, num(2, 1)?, num(3, 1)?)?
        .and_hms_opt(num(4, 0)?, num(5, 0)?, num(6, 0)?)?;

    let offset_secs = match caps.get(8) {
        Some(sign) => {
            let secs = (num(9, 0)? * 3600 + num(10, 0)? * 60) as i32;
            if sign.as_str() == "-" { -secs } else { secs }
        }
        None => 0,
    };

    let offset = FixedOffset::east_opt(offset_secs)?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

// ---------------------------------------------------------------------------
// Human-readable forms
// ---------------------------------------------------------------------------

const HUMAN_DATETIME_FORMATS: [&str; 4] = [
    "%B %d %Y %H:%M:%S",
    "%B %d %Y %H:%M",
    "%d %B %Y %H:%M:%S",
    "%d %B %Y %H:%M",
];

/// Month-first before day-first for slashes; dots are day-first.
const HUMAN_DATE_FORMATS: [&str; 9] = [
    "%B %d %Y",
    "%d %B %Y",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d.%m.%Y",
    "%Y/%m/%d",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%Y.%m.%d",
];

fn parse_human(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc));
    }

    let cleaned = clean_human(value);

    for format in HUMAN_DATETIME_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(&cleaned, format) {
            return Some(ndt.and_utc());
        }
    }
    for format in HUMAN_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&cleaned, format) {
            return start_of_day(date);
        }
    }
    None
}

/// Strip weekdays, ordinal suffixes, commas and abbreviation dots, and widen
/// two-digit years so every format sees a single canonical shape.
fn clean_human(value: &str) -> String {
    static WEEKDAY_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?i)^(?:mon|tue|wed|thu|fri|sat|sun)[a-z]*\.?,?\s+").expect("valid regex")
    });
    static ORDINAL_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)(\d)(?:st|nd|rd|th)\b").expect("valid regex"));
    static SEPT_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)\bsept\b").expect("valid regex"));
    static ABBR_DOT_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"([A-Za-z])\.").expect("valid regex"));
    static SHORT_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^(\d{1,2})([/.-])(\d{1,2})([/.-])(\d{2})$").expect("valid regex")
    });

    let s = value.trim();
    let s = WEEKDAY_RE.replace(s, "");
    let s = ORDINAL_RE.replace_all(&s, "$1");
    let s = SEPT_RE.replace_all(&s, "Sep");
    let s = ABBR_DOT_RE.replace_all(&s, "$1");
    let s = s.replace(',', " ");
    let s = s.split_whitespace().collect::<Vec<_>>().join(" ");

    match SHORT_YEAR_RE.captures(&s) {
        Some(caps) => {
            let yy: u32 = caps[5].parse().unwrap_or(0);
            let century = if yy < 69 { 2000 } else { 1900 };
            format!("{}{}{}{}{}", &caps[1], &caps[2], &caps[3], &caps[4], century + yy)
        }
        None => s,
    }
}

// ---------------------------------------------------------------------------
// Relative phrases
// ---------------------------------------------------------------------------

/// Largest magnitude accepted in a relative phrase.
const MAX_RELATIVE_MAGNITUDE: i64 = 100_000;

fn parse_relative(value: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    static VERB_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^(?:posted|published|listed|added|reposted|active|updated)\s+(?:on\s+)?")
            .expect("valid regex")
    });
    static AGO_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(
            r"^(\d+|an?|one)\+?\s*(minute|min|hour|hr|day|week|wk|month|mo)s?\s+ago$",
        )
        .expect("valid regex")
    });

    let lower = value.trim().to_lowercase();
    let phrase = VERB_RE.replace(&lower, "");
    let phrase = phrase.trim();

    match phrase {
        "today" | "just now" | "just posted" => return Some(now),
        "yesterday" => return now.checked_sub_signed(Duration::days(1)),
        _ => {}
    }

    let caps = AGO_RE.captures(phrase)?;
    let magnitude: i64 = match &caps[1] {
        "a" | "an" | "one" => 1,
        digits => digits.parse().ok()?,
    };
    if magnitude > MAX_RELATIVE_MAGNITUDE {
        return None;
    }

    let delta = match &caps[2] {
        "minute" | "min" => Duration::minutes(magnitude),
        "hour" | "hr" => Duration::hours(magnitude),
        "day" => Duration::days(magnitude),
        "week" | "wk" => Duration::weeks(magnitude),
        "month" | "mo" => Duration::days(magnitude * 30),
        _ => return None,
    };
    now.checked_sub_signed(delta)
}

fn start_of_day(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0).map(|ndt| ndt.and_utc())
}
