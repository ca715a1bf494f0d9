use serde::{Deserialize, Serialize};

/// Per-purchase data. Each payment attempt, retries included, needs a fresh
/// order identifier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionRequest {
    /// 4 digits followed by 8 alphanumeric characters, e.g. "00011234abcd"
    pub order: String,
    /// Amount in cents
    pub amount: u32,
    #[serde(default)]
    pub currency: Currency,
    /// Serialized as an empty language code when unset
    #[serde(default)]
    pub language: Option<Language>,
    /// Buyer name for the receipt, truncated to 59 characters on the wire
    #[serde(default)]
    pub client: String,
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub url_ok: String,
    #[serde(default)]
    pub url_ko: String,
    /// Echoed back untouched (percent-encoded) in the confirmation
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub transaction_type: TransactionType,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Currency {
    #[default]
    Euro,
}

impl Currency {
    /// ISO 4217 numeric code
    pub fn code(&self) -> u16 {
        match self {
            Currency::Euro => 978,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    Spanish,
    English,
    Catalan,
    French,
    German,
    Italian,
    Portuguese,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Spanish => "001",
            Language::English => "002",
            Language::Catalan => "003",
            Language::French => "004",
            Language::German => "005",
            Language::Italian => "007",
            Language::Portuguese => "009",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CreditCard,
    Bizum,
    Paypal,
}

impl PaymentMethod {
    pub fn code(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "C",
            PaymentMethod::Bizum => "z",
            PaymentMethod::Paypal => "P",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    #[default]
    SimpleAuthorization,
    PreAuthorization,
}

impl TransactionType {
    pub fn code(&self) -> u8 {
        match self {
            TransactionType::SimpleAuthorization => 0,
            TransactionType::PreAuthorization => 1,
        }
    }
}
