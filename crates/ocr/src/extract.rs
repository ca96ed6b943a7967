use chrono::{NaiveDate, NaiveTime};
use receipto_core::{Money, ParseFailure, ParseOutcome, ReceiptData, ReceiptItem};
use tracing::debug;

use crate::normalize;
use crate::rules;

/// Number of leading lines searched for the store name.
const STORE_NAME_SCAN_LINES: usize = 5;
const STORE_NAME_MIN_LEN: usize = 3;
const STORE_NAME_MAX_LEN: usize = 50;
const MAX_ADDRESS_LINES: usize = 2;

#[derive(Debug, Clone, Copy)]
enum DatePart {
    Month,
    Day,
    Year,
}

/// Field orders tried, in order, on a matched date after its `.` and `-`
/// separators have been turned into `/`. Month and day take exactly two
/// digits, the year at least four.
const CALENDAR_LAYOUTS: [([DatePart; 3], char); 5] = [
    ([DatePart::Month, DatePart::Day, DatePart::Year], '/'),
    ([DatePart::Day, DatePart::Month, DatePart::Year], '/'),
    ([DatePart::Year, DatePart::Month, DatePart::Day], '-'),
    ([DatePart::Month, DatePart::Day, DatePart::Year], '-'),
    ([DatePart::Day, DatePart::Month, DatePart::Year], '-'),
];

// ── Public extraction API ─────────────────────────────────────────────────────

/// Rule-based parser that turns recognized receipt text into a `ReceiptData`.
/// Stateless; every extractor is a pure read of the cleaned text.
pub struct ReceiptParser;

impl ReceiptParser {
    pub fn parse(raw_text: &str) -> ParseOutcome {
        if raw_text.trim().is_empty() {
            return ParseOutcome::failure(ParseFailure::EmptyText);
        }

        let clean_text = normalize::clean(raw_text);
        let lines = normalize::clean_lines(&clean_text);
        if lines.is_empty() {
            return ParseOutcome::failure(ParseFailure::NoReadableLines);
        }

        let data = ReceiptData {
            store_name: Self::extract_store_name(&lines),
            store_address: Self::extract_address(&lines),
            store_phone: Self::extract_phone(&clean_text),
            date: Self::extract_date(&clean_text),
            time: Self::extract_time(&clean_text),
            items: Self::extract_items(&lines),
            subtotal: Self::extract_subtotal(&lines),
            tax: Self::extract_tax(&lines),
            total: Self::extract_total(&lines, &clean_text),
            payment_method: Self::extract_payment_method(&clean_text),
            transaction_id: Self::extract_transaction_id(&clean_text),
            cashier: Self::extract_cashier(&clean_text),
            raw_text: raw_text.to_string(),
        };

        debug!(
            lines = lines.len(),
            items = data.items.len(),
            has_store = data.store_name.is_some(),
            has_total = data.total.is_some(),
            confidence = data.confidence(),
            "receipt fields extracted"
        );

        ParseOutcome::classify(data)
    }

    // ── Store ─────────────────────────────────────────────────────────────────

    fn extract_store_name(lines: &[String]) -> Option<String> {
        lines
            .iter()
            .take(STORE_NAME_SCAN_LINES)
            .map(|l| l.trim())
            .filter(|l| !rules::contains_any(l, rules::ADDRESS_INDICATORS))
            .filter(|l| !rules::contains_any(l, rules::STORE_NAME_EXCLUSIONS))
            .filter(|l| (STORE_NAME_MIN_LEN..=STORE_NAME_MAX_LEN).contains(&l.chars().count()))
            .find(|l| letter_ratio(l) > 0.5)
            .map(str::to_string)
    }

    fn extract_address(lines: &[String]) -> Option<String> {
        let address_lines: Vec<&str> = lines
            .iter()
            .map(String::as_str)
            .filter(|l| {
                rules::contains_any(l, rules::ADDRESS_INDICATORS)
                    || l.chars().any(|c| c.is_ascii_digit())
            })
            .take(MAX_ADDRESS_LINES)
            .collect();

        (!address_lines.is_empty()).then(|| address_lines.join(", "))
    }

    fn extract_phone(text: &str) -> Option<String> {
        rules::phone_patterns()
            .iter()
            .find_map(|re| re.find(text))
            .map(|m| m.as_str().to_string())
    }

    // ── Date & time ───────────────────────────────────────────────────────────

    /// Only the first date family that matches is considered. If its text fits
    /// no calendar layout the date is absent; later families are not tried.
    fn extract_date(text: &str) -> Option<NaiveDate> {
        let matched = rules::date_patterns().iter().find_map(|re| re.find(text))?;
        parse_calendar_date(matched.as_str())
    }

    /// Only the colon family is consulted, and only a strict `HH:MM` reading
    /// is accepted.
    fn extract_time(text: &str) -> Option<NaiveTime> {
        let matched = rules::time_patterns().first()?.find(text)?;
        let compact: String = matched.as_str().chars().filter(|c| !c.is_whitespace()).collect();
        let (hour, minute) = compact.split_once(':')?;
        if !is_fixed_digits(hour, 2) || !is_fixed_digits(minute, 2) {
            return None;
        }
        NaiveTime::from_hms_opt(hour.parse().ok()?, minute.parse().ok()?, 0)
    }

    // ── Items ─────────────────────────────────────────────────────────────────

    fn extract_items(lines: &[String]) -> Vec<ReceiptItem> {
        lines
            .iter()
            .filter(|l| rules::is_likely_item_line(l))
            .filter_map(|l| {
                let price = rules::extract_price_from_line(l)?;
                let name = rules::extract_item_name(l)?;
                Some(ReceiptItem::new(name, price))
            })
            .collect()
    }

    // ── Amounts ───────────────────────────────────────────────────────────────

    /// Largest price on any total line; without one, the largest number
    /// anywhere in the text.
    fn extract_total(lines: &[String], text: &str) -> Option<Money> {
        lines
            .iter()
            .filter(|l| rules::contains_any(l, rules::TOTAL_KEYWORDS))
            .filter_map(|l| rules::extract_price_from_line(l))
            .max()
            .or_else(|| {
                normalize::extract_numbers(text)
                    .into_iter()
                    .max()
                    .map(Money::from_decimal)
            })
    }

    fn extract_subtotal(lines: &[String]) -> Option<Money> {
        first_price_on_keyword_line(lines, rules::SUBTOTAL_KEYWORDS)
    }

    fn extract_tax(lines: &[String]) -> Option<Money> {
        first_price_on_keyword_line(lines, rules::TAX_KEYWORDS)
    }

    // ── Payment & bookkeeping ─────────────────────────────────────────────────

    fn extract_payment_method(text: &str) -> Option<String> {
        rules::first_keyword_in(text, rules::PAYMENT_KEYWORDS).map(capitalize_first)
    }

    fn extract_transaction_id(text: &str) -> Option<String> {
        rules::transaction_id_patterns()
            .iter()
            .find_map(|re| re.captures(text)?.get(1))
            .map(|m| m.as_str().to_string())
    }

    fn extract_cashier(text: &str) -> Option<String> {
        rules::cashier_patterns().iter().find_map(|re| {
            let name = re.captures(text)?.get(1)?.as_str().trim();
            (!name.is_empty()).then(|| name.to_string())
        })
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn letter_ratio(line: &str) -> f32 {
    let total = line.chars().count();
    if total == 0 {
        return 0.0;
    }
    line.chars().filter(|c| c.is_alphabetic()).count() as f32 / total as f32
}

fn first_price_on_keyword_line(lines: &[String], keywords: &[&str]) -> Option<Money> {
    lines
        .iter()
        .filter(|l| rules::contains_any(l, keywords))
        .find_map(|l| rules::extract_price_from_line(l))
}

fn parse_calendar_date(matched: &str) -> Option<NaiveDate> {
    let normalized = matched.replace(['.', '-'], "/");
    CALENDAR_LAYOUTS
        .iter()
        .find_map(|(order, separator)| parse_layout(&normalized, order, *separator))
}

fn parse_layout(text: &str, order: &[DatePart; 3], separator: char) -> Option<NaiveDate> {
    let fields: Vec<&str> = text.split(separator).collect();
    if fields.len() != 3 {
        return None;
    }

    let (mut year, mut month, mut day) = (None, None, None);
    for (part, field) in order.iter().zip(&fields) {
        match part {
            DatePart::Year if field.len() >= 4 && field.bytes().all(|b| b.is_ascii_digit()) => {
                year = field.parse::<i32>().ok();
            }
            DatePart::Month if is_fixed_digits(field, 2) => month = field.parse::<u32>().ok(),
            DatePart::Day if is_fixed_digits(field, 2) => day = field.parse::<u32>().ok(),
            _ => return None,
        }
    }
    resolve_date(year?, month?, day?)
}

/// A day that exists in no month is rejected; a day past the end of its
/// month is pulled back to the month's last day (`04/31` reads as `04/30`).
fn resolve_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    if year < 1 || !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }
    (1..=day).rev().find_map(|d| NaiveDate::from_ymd_opt(year, month, d))
}

fn is_fixed_digits(field: &str, width: usize) -> bool {
    field.len() == width && field.bytes().all(|b| b.is_ascii_digit())
}

fn capitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn data(text: &str) -> ReceiptData {
        ReceiptParser::parse(text)
            .into_data()
            .expect("expected a usable record")
    }

    // ── Outcome classification ───────────────────────────────────────────────

    #[test]
    fn blank_input_is_rejected() {
        for text in ["", "   ", "\n\t\n", " \r\n "] {
            assert_eq!(
                ReceiptParser::parse(text).failure_reason(),
                Some(ParseFailure::EmptyText),
                "input {text:?}"
            );
        }
    }

    #[test]
    fn unreadable_input_has_no_lines() {
        for text in ["\u{feff}", "\x01\x02\x03", "\u{feff}\x07"] {
            assert_eq!(
                ReceiptParser::parse(text).failure_reason(),
                Some(ParseFailure::NoReadableLines),
                "input {text:?}"
            );
        }
    }

    #[test]
    fn courtesy_text_alone_is_insufficient() {
        assert_eq!(
            ReceiptParser::parse("Thank you\n\n").failure_reason(),
            Some(ParseFailure::InsufficientData)
        );
    }

    #[test]
    fn supermart_receipt_is_complete() {
        let text = "SuperMart\n123 Main St\n01/15/2025\nMilk 3.99\nBread 2.50\nTOTAL 6.49";
        let outcome = ReceiptParser::parse(text);
        assert!(outcome.is_success(), "got {outcome:?}");

        let d = outcome.data().unwrap();
        assert_eq!(d.store_name.as_deref(), Some("SuperMart"));
        assert_eq!(d.date, NaiveDate::from_ymd_opt(2025, 1, 15));
        assert_eq!(d.items.len(), 2);
        assert_eq!(d.items[0].name, "Milk");
        assert_eq!(d.items[0].price, Money::from_cents(399));
        assert_eq!(d.items[1].name, "Bread");
        assert_eq!(d.items[1].price, Money::from_cents(250));
        assert_eq!(d.total, Some(Money::from_cents(649)));
        assert_eq!(d.tax, None);
        assert_eq!(d.raw_text, text);
    }

    #[test]
    fn missing_date_gives_partial_success() {
        let outcome = ReceiptParser::parse("CORNER CAFE\nLatte 4.50\nTOTAL 4.50");
        assert_eq!(outcome.warnings(), ["Could not parse date".to_string()]);
        assert!(outcome.data().is_some());
    }

    #[test]
    fn raw_text_is_kept_verbatim() {
        let text = "  SUPER   MART\r\n\tMilk  3.99\r\n";
        assert_eq!(data(text).raw_text, text);
    }

    // ── Store ─────────────────────────────────────────────────────────────────

    #[test]
    fn store_name_skips_excluded_and_address_lines() {
        let text = "RECEIPT\nWelcome!\n42 Elm Street\nGREEN LEAF GROCER\nApples 1.20";
        assert_eq!(data(text).store_name.as_deref(), Some("GREEN LEAF GROCER"));
    }

    #[test]
    fn store_name_requires_mostly_letters() {
        let text = "12345 67\nA1 B2 C3 D4\nFRESH FOODS\nBeans 0.99";
        assert_eq!(data(text).store_name.as_deref(), Some("FRESH FOODS"));
    }

    #[test]
    fn store_name_only_looks_at_first_five_lines() {
        let text = "1\n2\n3\n4\n5\nLATE STORE NAME\nTOTAL 3.00";
        assert_eq!(data(text).store_name, None);
    }

    #[test]
    fn address_takes_two_matching_lines() {
        let text = "SuperMart\n123 Main St\nSpringfield Blvd\n555 Other\nTOTAL 1.00";
        assert_eq!(
            data(text).store_address.as_deref(),
            Some("123 Main St, Springfield Blvd")
        );
    }

    #[test]
    fn phone_is_first_match() {
        let text = "CAFE\nTel: (555) 123-4567\nTOTAL 3.00";
        assert_eq!(data(text).store_phone.as_deref(), Some("(555) 123-4567"));
    }

    // ── Date & time ───────────────────────────────────────────────────────────

    #[test]
    fn day_first_dates_fall_through_to_second_layout() {
        assert_eq!(data("CAFE\n15.01.2025\nTOTAL 2.00").date, NaiveDate::from_ymd_opt(2025, 1, 15));
    }

    #[test]
    fn ambiguous_dates_read_month_first() {
        assert_eq!(data("CAFE\n03/04/2025\nTOTAL 2.00").date, NaiveDate::from_ymd_opt(2025, 3, 4));
    }

    #[test]
    fn dash_separated_dates_are_normalized() {
        assert_eq!(data("CAFE\n12-24-2024\nTOTAL 2.00").date, NaiveDate::from_ymd_opt(2024, 12, 24));
    }

    #[test]
    fn single_digit_date_fields_are_rejected() {
        let outcome = ReceiptParser::parse("CAFE\n1/5/2025\nTOTAL 2.00");
        assert_eq!(outcome.data().unwrap().date, None);
        assert_eq!(
            outcome.warnings(),
            ["Could not parse date".to_string(), "No items detected".to_string()]
        );
    }

    #[test]
    fn day_past_month_end_is_clamped() {
        assert_eq!(data("CAFE\n04/31/2025\nTOTAL 2.00").date, NaiveDate::from_ymd_opt(2025, 4, 30));
        assert_eq!(data("CAFE\n02/30/2025\nTOTAL 2.00").date, NaiveDate::from_ymd_opt(2025, 2, 28));
        assert_eq!(data("CAFE\n02/31/2024\nTOTAL 2.00").date, NaiveDate::from_ymd_opt(2024, 2, 29));
    }

    #[test]
    fn impossible_day_or_month_is_absent() {
        assert_eq!(data("CAFE\n00/10/2025\nTOTAL 2.00").date, None);
        assert_eq!(data("CAFE\n13/32/2025\nTOTAL 2.00").date, None);
    }

    #[test]
    fn matched_date_without_calendar_layout_is_absent() {
        // Matched by the two-digit-year, ISO and month-name families respectively.
        assert_eq!(data("CAFE\n01/15/25\nTOTAL 2.00").date, None);
        assert_eq!(data("CAFE\n2025-01-15\nTOTAL 2.00").date, None);
        assert_eq!(data("CAFE\nJan 15, 2025\nTOTAL 2.00").date, None);
    }

    #[test]
    fn first_matching_date_family_decides() {
        // The four-digit-year family matches an impossible date; no fallback.
        assert_eq!(data("CAFE\n31/31/2025\n01/02/2025\nTOTAL 2.00").date, None);
    }

    #[test]
    fn time_in_hours_and_minutes() {
        assert_eq!(data("CAFE\n01/15/2025 14:32\nTOTAL 2.00").time, NaiveTime::from_hms_opt(14, 32, 0));
    }

    #[test]
    fn single_digit_hour_is_absent() {
        assert_eq!(data("CAFE\n9:30\nTOTAL 2.00").time, None);
        assert_eq!(data("CAFE\n09:30\nTOTAL 2.00").time, NaiveTime::from_hms_opt(9, 30, 0));
    }

    #[test]
    fn out_of_range_time_is_absent() {
        assert_eq!(data("CAFE\n24:10\nTOTAL 2.00").time, None);
    }

    #[test]
    fn time_with_seconds_or_meridiem_is_absent() {
        assert_eq!(data("CAFE\n14:32:10\nTOTAL 2.00").time, None);
        assert_eq!(data("CAFE\n2:32 PM\nTOTAL 2.00").time, None);
    }

    #[test]
    fn bare_military_time_is_ignored() {
        assert_eq!(data("CAFE\nTime 1730\nTOTAL 2.00").time, None);
    }

    // ── Items ─────────────────────────────────────────────────────────────────

    #[test]
    fn last_price_on_item_line_wins() {
        let items = data("SHOP\nApples 1.50 2.00").items;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Apples 1.50");
        assert_eq!(items[0].price, Money::from_cents(200));
    }

    #[test]
    fn lines_without_usable_name_are_skipped() {
        let items = data("SHOP\nX 1.00\nEggs 2.10\nTOTAL 3.10").items;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Eggs");
    }

    #[test]
    fn total_and_tax_lines_are_not_items() {
        let items = data("SHOP\nSoap 1.00\nSUBTOTAL 1.00\nTAX 0.08\nTOTAL 1.08").items;
        assert_eq!(items.len(), 1);
    }

    // ── Amounts ───────────────────────────────────────────────────────────────

    #[test]
    fn total_is_largest_price_on_total_lines() {
        // "Subtotal" contains "total", so it competes with the grand total.
        let text = "SHOP\nSubtotal 9.00\nTax 0.72\nTotal 9.72";
        let d = data(text);
        assert_eq!(d.total, Some(Money::from_cents(972)));
        assert_eq!(d.subtotal, Some(Money::from_cents(900)));
        assert_eq!(d.tax, Some(Money::from_cents(72)));
    }

    #[test]
    fn total_falls_back_to_largest_number() {
        let d = data("SHOP\nWidget 5.00\nGadget 12.00");
        assert_eq!(d.total, Some(Money::from_cents(1200)));
    }

    #[test]
    fn total_fallback_sees_every_number() {
        // Without a total line the year is the largest number on the page.
        let d = data("SHOP\n01/15/2025\nWidget 5.00");
        assert_eq!(d.total, Some(Money::from_decimal(2025.into())));
    }

    #[test]
    fn tax_takes_first_line_with_a_price() {
        let d = data("SHOP\nTAX RATE EXEMPT\nSales Tax 0.40\nTax 0.90\nTotal 5.30");
        assert_eq!(d.tax, Some(Money::from_cents(40)));
    }

    #[test]
    fn subtotal_absent_without_keyword_price() {
        assert_eq!(data("SHOP\nSUBTOTAL\nTotal 3.00").subtotal, None);
    }

    // ── Payment & bookkeeping ─────────────────────────────────────────────────

    #[test]
    fn payment_keyword_is_capitalized() {
        assert_eq!(data("SHOP\nPAID CASH\nTotal 3.00").payment_method.as_deref(), Some("Cash"));
        assert_eq!(data("SHOP\nVISA 1234\nTotal 3.00").payment_method.as_deref(), Some("Visa"));
    }

    #[test]
    fn transaction_id_and_cashier() {
        let d = data("SHOP\nTrans#004512\nCashier: Maria\nTotal 3.00");
        assert_eq!(d.transaction_id.as_deref(), Some("004512"));
        assert_eq!(d.cashier.as_deref(), Some("Maria"));
    }

    #[test]
    fn transaction_id_takes_a_single_separator() {
        assert_eq!(data("SHOP\nTrans: 004512\nTotal 3.00").transaction_id, None);
        assert_eq!(data("SHOP\nRef 55\nTotal 3.00").transaction_id.as_deref(), Some("55"));
    }

    #[test]
    fn optional_fields_absent_when_not_printed() {
        let d = data("SHOP\nTotal 3.00");
        assert_eq!(d.store_phone, None);
        assert_eq!(d.payment_method, None);
        assert_eq!(d.transaction_id, None);
        assert_eq!(d.cashier, None);
    }

    // ── Helpers ───────────────────────────────────────────────────────────────

    #[test]
    fn capitalize_first_handles_empty() {
        assert_eq!(capitalize_first("visa"), "Visa");
        assert_eq!(capitalize_first(""), "");
    }

    #[test]
    fn no_panic_on_garbage_input() {
        let _ = ReceiptParser::parse("!@#$%^&*()\n\0\x01\x02");
        let _ = ReceiptParser::parse("ü\u{0301}ñ 1,5 $ 0.\n....");
    }
}
