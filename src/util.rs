use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub fn format_usd(value: f64) -> String {
    if !value.is_finite() || value <= 0.0 {
        return "$—".to_owned();
    }
    if value >= 1000.0 {
        format!("${:.1}k", value / 1000.0)
    } else if value >= 1.0 {
        format!("${value:.2}")
    } else {
        format!("${value:.4}")
    }
}

pub fn format_ton(value: f64) -> String {
    if !value.is_finite() || value <= 0.0 {
        return "— TON".to_owned();
    }
    format!("{value:.2} TON")
}

/// Signed percent with two decimals, `+0.00%` for a missing change.
pub fn format_percent(change: Option<f64>) -> String {
    let change = change.filter(|change| change.is_finite()).unwrap_or(0.0);
    if change >= 0.0 {
        format!("+{change:.2}%")
    } else {
        format!("{change:.2}%")
    }
}

/// Deterministic pair in `[-1, 1]` derived from `id`.
pub fn stable_pair(id: &str) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}
