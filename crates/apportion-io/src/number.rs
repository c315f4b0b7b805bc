//! Brazilian-style number parsing and formatting.
//!
//! Input amounts use a decimal comma and may carry a `R$` prefix and `.`
//! thousands separators. Output always rounds to two decimals; rounding only
//! happens here, at presentation time.

/// Parses an amount such as `"1.234,56"`, `"R$ 10,5"` or `"42.75"`.
///
/// When a comma is present it is the decimal mark and dots are thousands
/// separators; otherwise the text is read as a plain number. Returns `None`
/// for empty or non-numeric text and for NaN/infinite values.
pub fn parse_amount(text: &str) -> Option<f64> {
    let cleaned: String =
        text.replace("R$", "").chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return None;
    }

    let normalized =
        if cleaned.contains(',') { cleaned.replace('.', "").replace(',', ".") } else { cleaned };

    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// `1234.5` -> `"1234,50"`. Used in exports, where grouping would get in the
/// way of re-reading the file.
pub fn format_decimal(value: f64) -> String {
    let (negative, integer, fraction) = split_rounded(value);
    format!("{}{integer},{fraction}", if negative { "-" } else { "" })
}

/// `1234.5` -> `"1.234,50"`.
pub fn format_grouped(value: f64) -> String {
    let (negative, integer, fraction) = split_rounded(value);
    format!("{}{},{fraction}", if negative { "-" } else { "" }, group_thousands(&integer))
}

/// `1234.5` -> `"R$ 1.234,50"`.
pub fn format_currency(value: f64) -> String {
    let grouped = format_grouped(value);
    match grouped.strip_prefix('-') {
        Some(positive) => format!("-R$ {positive}"),
        None => format!("R$ {grouped}"),
    }
}

/// A proportion in `0..=1` as a percentage: `0.6` -> `"60,00%"`.
pub fn format_percent(proportion: f64) -> String {
    format!("{}%", format_decimal(proportion * 100.0))
}

/// Capitalizes the first letter of every word, lowercasing the rest.
pub fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut previous_is_letter = false;
    for c in name.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(c);
            previous_is_letter = false;
        }
    }
    out
}

fn split_rounded(value: f64) -> (bool, String, String) {
    let rendered = format!("{:.2}", value.abs());
    let (integer, fraction) = rendered.split_once('.').unwrap_or((rendered.as_str(), "00"));
    let negative = value < 0.0 && rendered != "0.00";
    (negative, integer.to_string(), fraction.to_string())
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}
