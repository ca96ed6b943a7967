pub mod money;
pub mod outcome;
pub mod receipt;

pub use money::Money;
pub use outcome::{ParseFailure, ParseOutcome};
pub use receipt::{ReceiptData, ReceiptItem, TrackedField};
