//! Channel KPI extraction from metadata or free text.
//!
//! Each metric is an independent rule: a metadata key checked first, then a
//! labelled-quantity regex run against the analysis text. A miss leaves that
//! metric `None`; a rule table that fails to compile leaves all of them `None`.

use contentminer_core::{Error, KpiKey, KpiSet, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

/// One metric's lookup rule.
#[derive(Debug, Clone, Copy)]
pub struct KpiRule {
    pub key: KpiKey,
    /// Metadata field consulted before the text.
    pub metadata_key: Option<&'static str>,
    /// Case-insensitive pattern; capture group 1 is the value.
    pub pattern: &'static str,
}

pub const KPI_RULES: &[KpiRule] = &[
    KpiRule {
        key: KpiKey::Subscribers,
        metadata_key: Some("subscriber_count"),
        pattern: r"(\d+(?:,\d+)*|\d+(?:\.\d+)?[KMB]?)\s*subscribers?",
    },
    KpiRule {
        key: KpiKey::Videos,
        metadata_key: Some("video_count"),
        pattern: r"(\d+(?:,\d+)*)\s*videos?",
    },
    KpiRule {
        key: KpiKey::Views,
        metadata_key: Some("total_views"),
        pattern: r"(\d+(?:,\d+)*|\d+(?:\.\d+)?[KMB]?)\s*(?:total\s+)?views?",
    },
    KpiRule {
        key: KpiKey::AvgViews,
        metadata_key: None,
        pattern: r"(\d+(?:,\d+)*|\d+(?:\.\d+)?[KMB]?)\s*(?:average|avg)\s*views?",
    },
    KpiRule {
        key: KpiKey::Engagement,
        metadata_key: None,
        pattern: r"(\d+(?:\.\d+)?%)\s*engagement",
    },
    KpiRule {
        key: KpiKey::UploadFreq,
        metadata_key: None,
        pattern: r"(\d+(?:\.\d+)?)\s*(?:videos?\s+per\s+(?:week|month)|uploads?\s+per\s+(?:week|month))",
    },
];

/// A rule with its pattern compiled.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub rule: KpiRule,
    regex: Regex,
}

static DEFAULT_RULES: Lazy<std::result::Result<Vec<CompiledRule>, String>> =
    Lazy::new(|| compile_rules(KPI_RULES).map_err(|e| e.to_string()));

/// Compile a rule table.
pub fn compile_rules(rules: &[KpiRule]) -> Result<Vec<CompiledRule>> {
    rules
        .iter()
        .map(|rule| {
            Regex::new(&format!("(?i){}", rule.pattern))
                .map(|regex| CompiledRule { rule: *rule, regex })
                .map_err(|e| Error::Pattern(format!("{}: {}", rule.key.as_str(), e)))
        })
        .collect()
}

/// Extract all KPIs with the built-in rules. Never fails.
pub fn extract_kpis(metadata: Option<&Value>, text: &str) -> KpiSet {
    match DEFAULT_RULES.as_ref() {
        Ok(rules) => extract_with_rules(rules, metadata, text),
        Err(e) => {
            warn!("KPI rules unavailable, returning empty set: {}", e);
            KpiSet::default()
        }
    }
}

/// Extract KPIs with a custom rule table; a table that does not compile yields an all-`None` set.
pub fn extract_kpis_with(rules: &[KpiRule], metadata: Option<&Value>, text: &str) -> KpiSet {
    match compile_rules(rules) {
        Ok(compiled) => extract_with_rules(&compiled, metadata, text),
        Err(e) => {
            warn!("KPI extraction failed, returning empty set: {}", e);
            KpiSet::default()
        }
    }
}

/// Apply compiled rules. Each metric is resolved on its own.
pub fn extract_with_rules(rules: &[CompiledRule], metadata: Option<&Value>, text: &str) -> KpiSet {
    let mut kpis = KpiSet::default();
    for compiled in rules {
        let from_metadata = compiled
            .rule
            .metadata_key
            .and_then(|key| metadata_value(metadata, key));
        let value = from_metadata.or_else(|| {
            compiled
                .regex
                .captures(text)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
        });
        if value.is_none() {
            debug!("No value for KPI {}", compiled.rule.key.as_str());
        }
        kpis.set(compiled.rule.key, value);
    }
    kpis
}

/// Read and normalize a metadata field.
///
/// Numbers and strings are used; zero, empty strings, and any other JSON type
/// count as absent. Fractional values under 1,000 keep up to three decimals
/// (`999.9` → `"999.9"`); larger ones are truncated before compacting.
pub fn metadata_value(metadata: Option<&Value>, key: &str) -> Option<String> {
    let value = metadata?.as_object()?.get(key)?;
    match value {
        Value::Number(n) => {
            let count = if let Some(i) = n.as_i64() {
                i
            } else if let Some(u) = n.as_u64() {
                i64::try_from(u).ok()?
            } else {
                let f = n.as_f64()?;
                if f != 0.0 && f.abs() < 1_000.0 && f.fract() != 0.0 {
                    return Some(format_fraction(f));
                }
                f.trunc() as i64
            };
            (count != 0).then(|| format_count(count))
        }
        Value::String(s) if !s.trim().is_empty() => Some(format_metric(s)),
        _ => None,
    }
}

/// Normalize a count for display.
///
/// Strings already holding a `K`/`M`/`B` suffix pass through. Otherwise commas
/// are dropped and the leading integer formatted by [`format_count`]; strings
/// without one come back unchanged.
pub fn format_metric(value: &str) -> String {
    if value.contains(['K', 'M', 'B']) {
        return value.to_string();
    }
    match leading_integer(&value.replace(',', "")) {
        Some(n) => format_count(n),
        None => value.to_string(),
    }
}

/// `≥ 1,000,000` → `X.YM`, `≥ 1,000` → `X.YK` (half-up), else thousands-separated.
pub fn format_count(n: i64) -> String {
    if n >= 1_000_000 {
        compact(n, 1_000_000, 'M')
    } else if n >= 1_000 {
        compact(n, 1_000, 'K')
    } else {
        group_thousands(n)
    }
}

fn compact(n: i64, unit: i64, suffix: char) -> String {
    let tenths = (i128::from(n) * 10 + i128::from(unit) / 2) / i128::from(unit);
    format!("{}.{}{}", tenths / 10, tenths % 10, suffix)
}

/// Up to three decimals, trailing zeros dropped.
fn format_fraction(f: f64) -> String {
    let fixed = format!("{f:.3}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "0" || trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Integer prefix of `s`, like a lenient `parseInt`.
fn leading_integer(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let sign_len = usize::from(s.starts_with(['-', '+']));
    let digits = s[sign_len..].bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    s[..sign_len + digits].parse().ok()
}
