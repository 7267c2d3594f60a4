use std::sync::LazyLock;

use regex::Regex;

use crate::core_api::UNKNOWN_VALUE;

/// In-game colour markup: `|cAARRGGBB`, `|r`, `[RRGGBB]` and `[-]`.
static COLOR_CODE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\|c[0-9a-f]{8}|\|r|\[[0-9a-f]{6}\]|\[-\]").expect("valid colour regex")
});

pub fn strip_color_codes(raw: &str) -> String {
    COLOR_CODE_REGEX.replace_all(raw, "").into_owned()
}

pub fn trim_value(raw: &str) -> &str {
    raw.trim_matches(|c: char| c.is_whitespace() || c == '"' || c == '\'')
}

/// Colour-free, trimmed text for names, items and tags.
pub fn clean_text(raw: &str) -> String {
    trim_value(&strip_color_codes(raw)).to_string()
}

/// Parses an integer that may carry thousands separators or padding.
pub fn parse_integer(raw: &str) -> Option<i64> {
    let digits: String = trim_value(raw)
        .chars()
        .filter(|c| !matches!(c, ',' | '_' | ' '))
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<i64>().ok()
}

pub fn format_number_with_commas(n: i64) -> String {
    let s = n.unsigned_abs().to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3 + 1);
    if n < 0 {
        result.push('-');
    }
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i).is_multiple_of(3) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

/// Formats a raw numeric field; anything that is not an integer becomes
/// [`UNKNOWN_VALUE`].
pub fn format_numeric_field(raw: Option<&str>) -> String {
    raw.map(strip_color_codes)
        .as_deref()
        .and_then(parse_integer)
        .map(format_number_with_commas)
        .unwrap_or_else(|| UNKNOWN_VALUE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_both_colour_families() {
        assert_eq!(strip_color_codes("|cffff0000Aria|r"), "Aria");
        assert_eq!(strip_color_codes("[00ff00]Blade[-] of Dawn"), "Blade of Dawn");
        assert_eq!(strip_color_codes("|CFF00FF00Mixed|R"), "Mixed");
    }

    #[test]
    fn clean_text_trims_quotes_and_space() {
        assert_eq!(clean_text("  \"|cff112233Aria|r\" "), "Aria");
        assert_eq!(clean_text("'  '"), "");
    }

    #[test]
    fn formats_thousands() {
        assert_eq!(format_number_with_commas(0), "0");
        assert_eq!(format_number_with_commas(999), "999");
        assert_eq!(format_number_with_commas(1000), "1,000");
        assert_eq!(format_number_with_commas(1234567), "1,234,567");
        assert_eq!(format_number_with_commas(-45000), "-45,000");
    }

    #[test]
    fn numeric_field_falls_back_to_unknown() {
        assert_eq!(format_numeric_field(Some("12345")), "12,345");
        assert_eq!(format_numeric_field(Some("1,000")), "1,000");
        assert_eq!(format_numeric_field(Some("lots")), UNKNOWN_VALUE);
        assert_eq!(format_numeric_field(Some("")), UNKNOWN_VALUE);
        assert_eq!(format_numeric_field(None), UNKNOWN_VALUE);
    }

    #[test]
    fn parse_integer_accepts_separators() {
        assert_eq!(parse_integer("1,234"), Some(1234));
        assert_eq!(parse_integer(" 42 "), Some(42));
        assert_eq!(parse_integer("unknown"), None);
    }
}
