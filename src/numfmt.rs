//! Number format application for displayed cell values.
//!
//! Excel number format codes are a mini-language. We support the codes that
//! matter for printed numbers and fall back to General for anything else:
//!
//! - `General` (and `@`)
//! - fixed decimals: `0`, `0.00`
//! - thousands separators: `#,##0`, `#,##0.00`
//! - percentages: `0%`, `0.00%`
//! - scientific: `0.00E+00`
//! - currency prefixes: `$`, `€`, `£`
//!
//! Codes may have up to three `;`-separated sections (`positive;negative;zero`).
//! Color and condition brackets (`[Red]`, `[>100]`) are stripped.

/// Format a numeric value using a format code.
#[allow(clippy::float_cmp)]
pub fn format_number(value: f64, format_code: &str) -> String {
    if !value.is_finite() {
        return format_general(value);
    }

    let sections: Vec<&str> = format_code.split(';').collect();
    let (section, negate) = match (sections.as_slice(), value) {
        ([_, negative, ..], v) if v < 0.0 => (*negative, true),
        ([_, _, zero, ..], v) if v == 0.0 => (*zero, false),
        ([positive, ..], _) => (*positive, false),
        ([], _) => ("General", false),
    };
    // The negative section carries its own sign (often parentheses).
    let value = if negate { -value } else { value };

    let code = strip_brackets(section);
    let code = code.trim();

    if code.is_empty() || code.eq_ignore_ascii_case("General") || code == "@" {
        return format_general(value);
    }

    if is_scientific_format(code) {
        return format_scientific(value, code);
    }

    if !code.contains(['0', '#', '?']) {
        // Literal-only section, e.g. `"n/a"`.
        return code.trim_matches('"').to_string();
    }

    let formatted = format_numeric(value, code);
    if negate && code.starts_with('(') && code.ends_with(')') {
        format!("({formatted})")
    } else if negate {
        format!("-{formatted}")
    } else {
        formatted
    }
}

/// Whether a format code is scientific notation.
pub fn is_scientific_format(format_code: &str) -> bool {
    let upper = format_code.to_ascii_uppercase();
    upper.contains("E+") || upper.contains("E-")
}

/// Remove `[...]` color/condition blocks.
fn strip_brackets(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    let mut depth = 0usize;
    for ch in code.chars() {
        match ch {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(ch),
            _ => {}
        }
    }
    out
}

/// General format - smart number display.
#[allow(clippy::float_cmp, clippy::cast_possible_truncation)]
fn format_general(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value == value.floor() && value.abs() < 1e11 {
        format!("{}", value as i64)
    } else if value.abs() >= 1e11 || (value.abs() < 1e-4 && value != 0.0) {
        format!("{value:.5E}")
    } else {
        let s = format!("{value:.10}");
        let s = s.trim_end_matches('0');
        let s = s.trim_end_matches('.');
        s.to_string()
    }
}

/// Format a number in scientific notation ("0.00E+00", "##0.0E-0").
#[allow(clippy::float_cmp, clippy::cast_possible_truncation)]
fn format_scientific(value: f64, format_code: &str) -> String {
    let upper = format_code.to_ascii_uppercase();
    let always_show_sign = upper.contains("E+");

    let e_pos = upper.find('E').unwrap_or(upper.len());
    let (mantissa_part, exponent_part) = upper.split_at(e_pos);

    let mantissa_decimals = mantissa_part.split_once('.').map_or(0, |(_, frac)| {
        frac.chars().filter(|&c| c == '0' || c == '?').count()
    });

    // Excel always uses at least 2 digits for the exponent
    let exponent_width = exponent_part
        .chars()
        .filter(|&c| c == '0' || c == '#')
        .count()
        .max(2);

    let (mantissa, exponent) = if value == 0.0 {
        (0.0, 0)
    } else {
        let exponent = value.abs().log10().floor() as i32;
        (value.abs() / 10_f64.powi(exponent), exponent)
    };

    let sign = if value < 0.0 { "-" } else { "" };
    let exp_sign = match (exponent < 0, always_show_sign) {
        (true, _) => "-",
        (false, true) => "+",
        (false, false) => "",
    };
    format!(
        "{sign}{mantissa:.prec$}E{exp_sign}{exp:0>width$}",
        prec = mantissa_decimals,
        exp = exponent.unsigned_abs(),
        width = exponent_width
    )
}

/// Fixed, thousands, percent and currency formats.
fn format_numeric(value: f64, format_code: &str) -> String {
    let percent = format_code.contains('%');
    let has_thousands = format_code.contains(',');

    let decimals = format_code
        .split_once('.')
        .map_or(0, |(_, frac)| frac.chars().filter(|&c| c == '0' || c == '#').count())
        .min(10);

    let base = if percent { value * 100.0 } else { value };
    let mut out = if has_thousands {
        format_with_thousands(base, decimals)
    } else {
        format!("{base:.decimals$}")
    };

    if let Some(currency) = ['$', '€', '£'].into_iter().find(|c| format_code.contains(*c)) {
        if out.starts_with('-') {
            out.insert(1, currency);
        } else {
            out.insert(0, currency);
        }
    }
    if percent {
        out.push('%');
    }
    out
}

/// Format number with thousands separators.
fn format_with_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.decimals$}", value.abs());
    let (int_part, dec_part) = match formatted.split_once('.') {
        Some((i, d)) => (i, Some(d)),
        None => (formatted.as_str(), None),
    };

    let mut with_sep = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_sep.push(',');
        }
        with_sep.push(c);
    }
    let mut result: String = with_sep.chars().rev().collect();
    if let Some(dec) = dec_part {
        result.push('.');
        result.push_str(dec);
    }

    if value < 0.0 && result.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-{result}")
    } else {
        result
    }
}
