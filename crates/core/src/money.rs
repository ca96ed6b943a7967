use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A monetary amount as printed on a receipt. Currency is not tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, 2))
    }

    pub fn from_decimal(decimal: Decimal) -> Self {
        Money(decimal.round_dp(2))
    }

    pub fn amount(self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

/// Parses receipt-style price text: an optional leading `$`, and either `.`
/// or `,` as the decimal separator (`$12.99`, `12,99`, `4.5`).
impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().trim_start_matches('$').trim().replace(',', ".");
        Decimal::from_str(&digits).map(Money::from_decimal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dollar_prefixed_price() {
        assert_eq!("$12.99".parse::<Money>().unwrap(), Money::from_cents(1299));
        assert_eq!("$ 3.50".parse::<Money>().unwrap(), Money::from_cents(350));
    }

    #[test]
    fn parses_comma_decimal_separator() {
        assert_eq!("12,99".parse::<Money>().unwrap(), Money::from_cents(1299));
    }

    #[test]
    fn single_decimal_compares_by_value() {
        assert_eq!("4.5".parse::<Money>().unwrap(), Money::from_cents(450));
    }

    #[test]
    fn rejects_non_numeric() {
        assert!("abc".parse::<Money>().is_err());
        assert!("".parse::<Money>().is_err());
    }

    #[test]
    fn display_pads_to_cents() {
        assert_eq!(Money::from_decimal(Decimal::new(45, 1)).to_string(), "$4.50");
        assert_eq!(Money::from_cents(0).to_string(), "$0.00");
    }

    #[test]
    fn ordering_follows_amount() {
        assert!(Money::from_cents(649) > Money::from_cents(399));
        assert_eq!(Money::from_cents(250).amount(), Decimal::new(25, 1));
    }
}
