//! Cleanup of raw recognized text before field extraction.

use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

re!(re_spaces, r"[ \t\u{00a0}]+");
re!(re_number, r"(?P<grouped>\d{1,3}(?:,\d{3})+(?:\.\d+)?)|(?P<plain>\d+(?:[.,]\d+)?)");

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Normalize line endings, strip control characters and byte-order marks,
/// collapse horizontal whitespace and trim every line. Blank lines are kept.
pub fn clean(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    unified
        .split('\n')
        .map(|line| {
            let visible: String = line
                .chars()
                .filter(|c| *c == '\t' || (!c.is_control() && *c != BYTE_ORDER_MARK))
                .collect();
            re_spaces().replace_all(&visible, " ").trim().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Cleaned, non-empty lines in their original order.
pub fn clean_lines(text: &str) -> Vec<String> {
    clean(text)
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Every numeric token in `text`, in order of appearance. Comma-grouped
/// thousands (`1,234.56`) lose their commas; otherwise a comma is a decimal
/// separator (`12,99`).
pub fn extract_numbers(text: &str) -> Vec<Decimal> {
    re_number()
        .captures_iter(text)
        .filter_map(|caps| {
            let token = match (caps.name("grouped"), caps.name("plain")) {
                (Some(m), _) => m.as_str().replace(',', ""),
                (None, Some(m)) => m.as_str().replace(',', "."),
                (None, None) => return None,
            };
            Decimal::from_str(&token).ok()
        })
        .collect()
}
