//! Compact display formatting for VND amounts on dashboard cards.

const SUFFIXES: [&str; 5] = ["", "K", "M", "B", "T"];

/// Formats an amount with a K/M/B/T suffix once it reaches a thousand.
///
/// Amounts below a thousand are printed as-is; scaled amounts keep one
/// decimal only when they are not whole. Anything beyond trillions stays in
/// trillions.
pub fn format_vnd(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }

    let tier = ((value.abs().log10() / 3.0).trunc() as i64).clamp(0, SUFFIXES.len() as i64 - 1);
    if tier == 0 {
        return group_thousands(&plain_number(value));
    }

    let scaled = value / 10f64.powi(tier as i32 * 3);
    let formatted = if scaled.fract() != 0.0 {
        format!("{:.1}", scaled)
    } else {
        plain_number(scaled)
    };
    group_thousands(&formatted) + SUFFIXES[tier as usize]
}

fn plain_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Inserts `,` between groups of three digits in the integer part.
fn group_thousands(number: &str) -> String {
    let (sign, unsigned) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };
    let (int_part, frac_part) = match unsigned.find('.') {
        Some(idx) => unsigned.split_at(idx),
        None => (unsigned, ""),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped}{frac_part}")
}
