//! Number formatting for chart labels and metric cards.
//!
//! Kept apart from the aggregation code so label changes stay local.

/// Shown wherever an average or ratio has no rows behind it.
pub const NO_DATA: &str = "no data";

const SI_PREFIXES: [&str; 5] = ["", "k", "M", "G", "T"];

/// Whole pounds with thousands separators, e.g. `£1,234,568`.
pub fn gbp(value: f64) -> String {
    if !value.is_finite() {
        return NO_DATA.to_string();
    }
    let rounded = value.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}£{}", group_thousands(rounded.abs() as u64))
}

/// [`gbp`] for optional values (averages over possibly empty groups).
pub fn gbp_or_no_data(value: Option<f64>) -> String {
    value.map_or_else(|| NO_DATA.to_string(), gbp)
}

/// Two significant digits with an SI suffix, e.g. `1.2k`, `45k`, `3.0M`.
pub fn si(value: f64) -> String {
    if !value.is_finite() {
        return NO_DATA.to_string();
    }
    if value == 0.0 {
        return "0.0".to_string();
    }

    // Round to two significant digits first so 999 becomes 1.0k, not 999.
    let magnitude = value.abs().log10().floor() as i32;
    let step = 10f64.powi(magnitude - 1);
    let rounded = (value / step).round() * step;
    let magnitude = rounded.abs().log10().floor() as i32;

    let tier = (magnitude.div_euclid(3)).clamp(0, SI_PREFIXES.len() as i32 - 1);
    let scaled = rounded / 10f64.powi(tier * 3);
    let decimals = (1 - (magnitude - tier * 3)).max(0) as usize;
    format!("{scaled:.decimals$}{}", SI_PREFIXES[tier as usize])
}

/// Win-rate style percentage with two decimals.
pub fn percent(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.2}%")
    } else {
        NO_DATA.to_string()
    }
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
