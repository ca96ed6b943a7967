use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::Money;

// Completeness rubric, in percent. Sums to 100.
const STORE_NAME_WEIGHT: u32 = 20;
const DATE_WEIGHT: u32 = 15;
const TOTAL_WEIGHT: u32 = 30;
const ITEMS_WEIGHT: u32 = 25;
const TAX_WEIGHT: u32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptItem {
    pub name: String,
    pub quantity: Option<Decimal>,
    pub unit: Option<String>,
    pub unit_price: Option<Money>,
    pub price: Money,
    #[serde(default = "default_taxable")]
    pub taxable: bool,
}

fn default_taxable() -> bool {
    true
}

impl ReceiptItem {
    pub fn new(name: impl Into<String>, price: Money) -> Self {
        Self {
            name: name.into(),
            quantity: None,
            unit: None,
            unit_price: None,
            price,
            taxable: true,
        }
    }
}

/// Structured view of a single receipt. Built once per parse and never mutated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReceiptData {
    pub store_name: Option<String>,
    pub store_address: Option<String>,
    pub store_phone: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub items: Vec<ReceiptItem>,
    pub subtotal: Option<Money>,
    pub tax: Option<Money>,
    pub total: Option<Money>,
    pub payment_method: Option<String>,
    pub transaction_id: Option<String>,
    pub cashier: Option<String>,
    /// Recognized text exactly as it was handed to the parser.
    pub raw_text: String,
}

/// Fields whose absence is reported back to the caller as a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackedField {
    StoreName,
    Date,
    Total,
    Items,
}

impl TrackedField {
    pub const ALL: [TrackedField; 4] = [
        TrackedField::StoreName,
        TrackedField::Date,
        TrackedField::Total,
        TrackedField::Items,
    ];

    pub fn warning(self) -> &'static str {
        match self {
            TrackedField::StoreName => "Could not detect store name",
            TrackedField::Date => "Could not parse date",
            TrackedField::Total => "Could not find total amount",
            TrackedField::Items => "No items detected",
        }
    }
}

impl ReceiptData {
    /// A record is usable when it names a store, carries a total, or lists items.
    pub fn is_valid(&self) -> bool {
        self.store_name.is_some() || self.total.is_some() || !self.items.is_empty()
    }

    /// Completeness score in `[0, 1]`. Not a recognition confidence.
    pub fn confidence(&self) -> f32 {
        let achieved: u32 = [
            (self.store_name.is_some(), STORE_NAME_WEIGHT),
            (self.date.is_some(), DATE_WEIGHT),
            (self.total.is_some(), TOTAL_WEIGHT),
            (!self.items.is_empty(), ITEMS_WEIGHT),
            (self.tax.is_some(), TAX_WEIGHT),
        ]
        .iter()
        .filter(|(present, _)| *present)
        .map(|(_, weight)| weight)
        .sum();
        achieved as f32 / 100.0
    }

    pub fn missing_fields(&self) -> Vec<TrackedField> {
        TrackedField::ALL
            .into_iter()
            .filter(|field| match field {
                TrackedField::StoreName => self.store_name.is_none(),
                TrackedField::Date => self.date.is_none(),
                TrackedField::Total => self.total.is_none(),
                TrackedField::Items => self.items.is_empty(),
            })
            .collect()
    }

    pub fn items_sum(&self) -> Money {
        Money::from_decimal(self.items.iter().map(|i| i.price.amount()).sum())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
