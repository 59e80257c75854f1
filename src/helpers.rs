/// Numeric and string normalization helpers for dashboard values
///
/// Magnitude strings such as "$1.2B" / "$480M" / "$92K" parse to plain
/// numbers and format back with bounded precision. The mapping is lossy but
/// deterministic: one decimal for billions and millions, whole numbers for
/// thousands and below. `$1,234,000,000` formats to `"$1.2B"`, which parses
/// back to `1,200,000,000` - a documented precision band, not a true inverse.
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

/// Accepts `$1.2B`, `480M`, `$ 92k`, `-$3.4M`, `1,234,567`, `950`
static FINANCIAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?P<sign>-)?\s*\$?\s*(?P<num>[0-9][0-9,]*(?:\.[0-9]+)?)\s*(?P<suffix>[KkMmBbTt])?\s*$")
        .expect("financial pattern is valid")
});

const THOUSAND: f64 = 1_000.0;
const MILLION: f64 = 1_000_000.0;
const BILLION: f64 = 1_000_000_000.0;
const TRILLION: f64 = 1_000_000_000_000.0;

/// Parse a financial magnitude string into a plain dollar amount.
///
/// Returns `None` for anything that is not a recognizable magnitude string.
pub fn parse_financial_string(s: &str) -> Option<f64> {
    let caps = FINANCIAL_RE.captures(s)?;

    let digits = caps.name("num")?.as_str().replace(',', "");
    let base: f64 = digits.parse().ok()?;

    let multiplier = match caps.name("suffix").map(|m| m.as_str()) {
        Some("K") | Some("k") => THOUSAND,
        Some("M") | Some("m") => MILLION,
        Some("B") | Some("b") => BILLION,
        Some("T") | Some("t") => TRILLION,
        _ => 1.0,
    };

    let value = base * multiplier;
    if caps.name("sign").is_some() {
        Some(-value)
    } else {
        Some(value)
    }
}

/// Format a dollar amount as a compact magnitude string.
///
/// Precision band: one decimal for T/B/M (with a trailing `.0` trimmed),
/// whole numbers for K and below. `format_currency(parse_financial_string(s))`
/// reproduces `s` for strings already in this canonical form.
pub fn format_currency(value: f64) -> String {
    let (sign, abs) = if value < 0.0 {
        ("-", -value)
    } else {
        ("", value)
    };

    let formatted = if abs >= TRILLION {
        format!("{}T", trim_one_decimal(abs / TRILLION))
    } else if abs >= BILLION {
        format!("{}B", trim_one_decimal(abs / BILLION))
    } else if abs >= MILLION {
        format!("{}M", trim_one_decimal(abs / MILLION))
    } else if abs >= THOUSAND {
        format!("{}K", (abs / THOUSAND).round())
    } else {
        format!("{}", abs.round())
    };

    format!("{}${}", sign, formatted)
}

/// One decimal place with a trailing ".0" removed ("1.2", "480")
fn trim_one_decimal(value: f64) -> String {
    let s = format!("{:.1}", value);
    match s.strip_suffix(".0") {
        Some(trimmed) => trimmed.to_string(),
        None => s,
    }
}

/// Compact count formatting for award/event counters ("1.2K", "34")
pub fn format_count(count: u64) -> String {
    let count = count as f64;
    if count >= MILLION {
        format!("{}M", trim_one_decimal(count / MILLION))
    } else if count >= THOUSAND {
        format!("{}K", trim_one_decimal(count / THOUSAND))
    } else {
        format!("{}", count)
    }
}

/// Format a percentage value ("12.3%"); input is the percentage, not a ratio.
pub fn format_percent(pct: f64) -> String {
    format!("{:.1}%", pct)
}

static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Normalize a contractor legal name for display and comparison:
/// trims, collapses internal whitespace, and canonicalizes common legal
/// suffixes ("acme infrastructure llc" -> "acme infrastructure LLC").
pub fn normalize_entity_name(name: &str) -> String {
    let collapsed = WHITESPACE_RE.replace_all(name.trim(), " ");

    collapsed
        .split(' ')
        .map(canonicalize_suffix)
        .collect::<Vec<_>>()
        .join(" ")
}

fn canonicalize_suffix(token: &str) -> String {
    let stripped = token.trim_end_matches('.');
    match stripped.to_lowercase().as_str() {
        "llc" => "LLC".to_string(),
        "inc" => "Inc.".to_string(),
        "ltd" => "Ltd.".to_string(),
        "corp" => "Corp.".to_string(),
        "co" if token.ends_with('.') => "Co.".to_string(),
        _ => token.to_string(),
    }
}

pub fn format_duration_ago(from: DateTime<Utc>) -> String {
    let now = Utc::now();
    let diff = now.signed_duration_since(from);

    if diff.num_seconds() < 60 {
        format!("{}s ago", diff.num_seconds().max(0))
    } else if diff.num_minutes() < 60 {
        format!("{}m ago", diff.num_minutes())
    } else if diff.num_hours() < 24 {
        format!("{}h ago", diff.num_hours())
    } else {
        format!("{}d ago", diff.num_days())
    }
}
