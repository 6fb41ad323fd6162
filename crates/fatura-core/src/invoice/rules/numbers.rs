//! Brazilian-locale number handling (`1.234,56`).

use super::patterns::DECIMAL_TOKEN;

/// Parse a Brazilian-formatted number (e.g. "1.200,50").
///
/// Thousands separators are dropped and the decimal comma becomes a point.
/// Empty, unparseable and non-finite input all yield `0.0`.
pub fn parse_br_number(s: &str) -> f64 {
    let normalized = s.trim().replace('.', "").replace(',', ".");
    if normalized.is_empty() {
        return 0.0;
    }

    match normalized.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// Sum every decimal token (`d.ddd,dd`) found in the text.
pub fn sum_br_numbers(text: &str) -> f64 {
    DECIMAL_TOKEN
        .find_iter(text)
        .map(|m| parse_br_number(m.as_str()))
        .sum()
}

/// Format a value in Brazilian style with two decimals (1.234,56).
pub fn format_br_number(value: f64) -> String {
    let s = format!("{:.2}", value);
    let (sign, s) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.as_str()),
    };

    let Some((integer_part, decimal_part)) = s.split_once('.') else {
        return s.to_string();
    };

    // Add thousand separators
    let chars: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::new();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push('.');
        }
        formatted.push(*c);
    }

    format!("{}{},{}", sign, formatted, decimal_part)
}
