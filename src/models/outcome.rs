use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::response::ResponseRecord;

/// Business result of a finished transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// The bank approved the transaction and the money was transferred.
    Approved,
    /// The buyer or the issuer declined or cancelled the payment.
    Cancelled,
    /// The same order was submitted twice. This is a merchant-side bug: every
    /// retry needs a fresh order identifier.
    Repeated,
    /// The code is missing or not recognised. Callers decide whether this is
    /// a pending state or an error.
    Unknown,
}

impl Status {
    /// Returns the status as a string for logging
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Approved => "approved",
            Status::Cancelled => "cancelled",
            Status::Repeated => "repeated",
            Status::Unknown => "unknown",
        }
    }
}

/// Verified and classified confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outcome {
    pub status: Status,
    /// Bank-side date and time of the operation
    pub sent: NaiveDateTime,
    pub record: ResponseRecord,
    pub is_card_payment: bool,
    pub response_code: i64,
}
