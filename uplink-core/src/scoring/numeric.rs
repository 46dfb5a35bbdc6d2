//! Parsing and formatting for human-entered amounts. Inputs may carry
//! thousands separators or stray decoration; empty input means absent, not
//! zero, so display layers can tell the two apart.

/// Parse a raw amount string. Separators and any other non-numeric
/// characters are stripped first. Returns `None` for empty or unparseable
/// input and for non-finite results.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    match cleaned.parse::<f64>() {
        Ok(n) if n.is_finite() => Some(n),
        _ => None,
    }
}

/// Parse for aggregation contexts, where absence degrades to zero.
pub fn amount_or_zero(raw: &str) -> f64 {
    parse_amount(raw).unwrap_or(0.0)
}

/// Round to one decimal place, half away from zero. Applied to final values
/// only; intermediate sums stay at full precision.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// True when the value is expressible with at most one decimal digit.
pub fn has_at_most_one_decimal(value: f64) -> bool {
    (value - round1(value)).abs() <= 1e-9
}

/// Insert thousands separators into a plain digit string.
pub fn group_digits(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    let len = digits.len();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Format an amount for display: one decimal, thousands separators, `-` for
/// true absence.
pub fn format_amount(value: Option<f64>) -> String {
    let Some(n) = value else {
        return "-".to_string();
    };
    if !n.is_finite() {
        return "-".to_string();
    }

    let fixed = round1(n);
    let abs = fixed.abs();
    let mut int_part = abs.trunc() as i64;
    let mut frac = ((abs - abs.trunc()) * 10.0).round() as i64;
    if frac >= 10 {
        int_part += 1;
        frac = 0;
    }

    let mut out = String::new();
    if fixed < 0.0 {
        out.push('-');
    }
    out.push_str(&group_digits(&int_part.to_string()));
    if frac > 0 {
        out.push('.');
        out.push_str(&frac.to_string());
    }
    out
}
