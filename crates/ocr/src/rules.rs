//! Static recognizers and lexicons used by the field extractors.
//!
//! Every pattern family is an ordered list; callers rely on that order. The
//! regexes are compiled once on first use and shared read-only afterwards.

use std::sync::OnceLock;

use receipto_core::Money;
use regex::{Match, Regex};

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re_family {
    ($name:ident, [$($pat:expr),+ $(,)?]) => {
        pub fn $name() -> &'static [Regex] {
            static R: OnceLock<Vec<Regex>> = OnceLock::new();
            R.get_or_init(|| vec![$(Regex::new($pat).expect("invalid regex")),+])
        }
    };
}

re_family!(date_patterns, [
    // MM/DD/YYYY or DD/MM/YYYY
    r"\b(\d{1,2})[/\-.](\d{1,2})[/\-.](\d{4})\b",
    // MM/DD/YY
    r"\b(\d{1,2})[/\-.](\d{1,2})[/\-.](\d{2})\b",
    // YYYY-MM-DD
    r"\b(\d{4})[/\-.](\d{1,2})[/\-.](\d{1,2})\b",
    // Jan 15, 2025
    r"(?i)\b(Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)\w*\s+(\d{1,2}),?\s+(\d{4})\b",
]);

re_family!(time_patterns, [
    r"\b(\d{1,2}):(\d{2})(?::(\d{2}))?\s*(AM|PM|am|pm)?\b",
    // 24h without separator, e.g. 1730
    r"\b(\d{4})\b",
]);

// ASCII digits and boundaries only: `٣.٩٩` is not a price.
re_family!(price_patterns, [
    r"(?-u)\$\s*([0-9]+)[.,]([0-9]{2})\b",
    r"(?-u)\b([0-9]+)[.,]([0-9]{2})\b",
    r"(?-u)\b([0-9]+)\.([0-9])\b",
]);

re_family!(phone_patterns, [
    // (555) 123-4567
    r"\(?\d{3}\)?[\s.-]?\d{3}[\s.-]?\d{4}",
    // +1 555 123 4567
    r"\+?\d{1,3}[\s.-]?\d{3}[\s.-]?\d{3}[\s.-]?\d{4}",
]);

re_family!(transaction_id_patterns, [
    // Exactly one separator between keyword and digits.
    r"(?i)(?:trans|transaction|trans#|ref|reference)[:\s#](\d+)",
    r"(?i)(?:invoice|inv)[:\s#](\d+)",
]);

re_family!(cashier_patterns, [
    r"(?i)(?:cashier|served by|server|clerk)[:\s]+(.+?)(?:\n|$)",
    r"(?i)(?:your cashier was|cashier:)\s+(.+?)(?:\n|$)",
]);

// ── Lexicons ─────────────────────────────────────────────────────────────────
// Matched as case-insensitive substrings, never as whole words.

pub const ADDRESS_INDICATORS: &[&str] = &[
    "street", "st", "avenue", "ave", "road", "rd", "drive", "dr", "blvd", "boulevard", "lane",
    "ln", "plaza", "suite", "unit",
];

pub const STORE_NAME_EXCLUSIONS: &[&str] = &[
    "receipt", "invoice", "bill", "ticket", "order", "thank you", "thanks", "welcome", "goodbye",
];

pub const TOTAL_KEYWORDS: &[&str] = &[
    "total", "grand total", "amount due", "balance due", "amount", "net total", "final total",
    "gtotal", "g.total",
];

pub const SUBTOTAL_KEYWORDS: &[&str] = &[
    "subtotal", "sub-total", "sub total", "sub", "merchandise total", "item total",
];

pub const TAX_KEYWORDS: &[&str] = &[
    "tax", "sales tax", "gst", "vat", "hst", "state tax", "local tax", "sales", "levy",
];

pub const PAYMENT_KEYWORDS: &[&str] = &[
    "cash", "credit", "debit", "card", "visa", "mastercard", "amex", "discover", "payment",
    "paid", "tender",
];

/// Case-insensitive substring test against a lexicon.
pub fn contains_any(text: &str, keywords: &[&str]) -> bool {
    let lower = text.to_lowercase();
    keywords.iter().any(|k| lower.contains(k))
}

/// First lexicon entry contained in `text`, in lexicon order.
pub fn first_keyword_in(text: &str, keywords: &[&'static str]) -> Option<&'static str> {
    let lower = text.to_lowercase();
    keywords.iter().copied().find(|k| lower.contains(k))
}

// ── Item lines ───────────────────────────────────────────────────────────────

/// The price on a line: every price family is searched and the match that
/// starts furthest right wins. On equal start offsets the later family wins.
fn last_price_match(line: &str) -> Option<Match<'_>> {
    price_patterns()
        .iter()
        .filter_map(|re| re.find_iter(line).last())
        .max_by_key(|m| m.start())
}

/// Sole gate for item candidacy: some text, some price, no total or tax keyword.
pub fn is_likely_item_line(line: &str) -> bool {
    let line = line.trim();
    if line.chars().count() < 3 {
        return false;
    }

    let has_text = line.chars().any(char::is_alphabetic);
    let has_price = price_patterns().iter().any(|re| re.is_match(line));
    let has_excluded_keyword =
        contains_any(line, TOTAL_KEYWORDS) || contains_any(line, TAX_KEYWORDS);

    has_text && has_price && !has_excluded_keyword
}

pub fn extract_price_from_line(line: &str) -> Option<Money> {
    last_price_match(line)?.as_str().parse().ok()
}

/// Everything before the line's price, trimmed; at least two characters.
pub fn extract_item_name(line: &str) -> Option<String> {
    let price = last_price_match(line)?;
    let name = line[..price.start()].trim();
    (name.chars().count() >= 2).then(|| name.to_string())
}
