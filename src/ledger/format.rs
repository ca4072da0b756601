//! Display formatting for ledger numbers

use super::models::AggregateStats;

/// Grams below a kilogram, kilograms above (stats ticker style)
pub fn format_grams(grams: f64) -> String {
    if grams < 1000.0 {
        format!("{:.1}g", grams)
    } else {
        format!("{:.2}kg", grams / 1000.0)
    }
}

/// Tonnes, kilograms or grams from an amount in kilograms
pub fn format_carbon_kg(kg: f64) -> String {
    if kg >= 1000.0 {
        format!("{:.1}t", kg / 1000.0)
    } else if kg >= 1.0 {
        format!("{:.1}kg", kg)
    } else {
        format!("{:.0}g", kg * 1000.0)
    }
}

pub fn format_percent(pct: f64) -> String {
    format!("{:.0}%", pct)
}

/// Integer with thousands separators, e.g. 14230 -> "14,230"
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn format_compact(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        format_count(n)
    }
}

pub fn ticker_lines(stats: &AggregateStats) -> Vec<String> {
    vec![
        format!("{} CO₂ saved", format_grams(stats.total_carbon_saved_g)),
        format!("{} prompts routed sustainably", stats.total_prompts),
        format!("{} avg carbon reduction", format_percent(stats.avg_reduction)),
        format!(
            "{} tokens served from cache",
            format_count(stats.total_cache_hit_tokens)
        ),
    ]
}
