use serde::{Deserialize, Deserializer, Serialize};

/// Fields decoded from a bank confirmation. Only trustworthy once the
/// signature has been verified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRecord {
    #[serde(
        rename = "Ds_Order",
        alias = "Ds_Merchant_Order",
        default,
        deserialize_with = "null_as_empty"
    )]
    pub order: String,

    /// Response code as sent; empty while the bank has no result yet
    #[serde(rename = "Ds_Response", default, deserialize_with = "null_as_empty")]
    pub raw_response: String,

    /// Parsed `raw_response`, 0 when it was empty
    #[serde(skip)]
    pub response: i64,

    /// dd/mm/yyyy, possibly percent-encoded
    #[serde(rename = "Ds_Date", default, deserialize_with = "null_as_empty")]
    pub date: String,

    /// hh:mm, possibly percent-encoded
    #[serde(rename = "Ds_Hour", default, deserialize_with = "null_as_empty")]
    pub time: String,

    #[serde(rename = "Ds_Card_Country", default, deserialize_with = "null_as_empty")]
    pub card_country: String,

    /// Store it to reference the operation with the bank later on
    #[serde(rename = "Ds_AuthorisationCode", default, deserialize_with = "null_as_empty")]
    pub authorisation_code: String,

    #[serde(rename = "Ds_Card_Type", default, deserialize_with = "null_as_empty")]
    pub card_type: String,

    /// Caller metadata from the request, already unescaped
    #[serde(rename = "Ds_MerchantData", default, deserialize_with = "null_as_empty")]
    pub merchant_data: String,

    #[serde(rename = "Ds_Amount", default, deserialize_with = "null_as_empty")]
    pub amount: String,

    #[serde(rename = "Ds_Currency", default, deserialize_with = "null_as_empty")]
    pub currency: String,

    #[serde(rename = "Ds_MerchantCode", default, deserialize_with = "null_as_empty")]
    pub merchant_code: String,

    #[serde(rename = "Ds_Terminal", default, deserialize_with = "null_as_empty")]
    pub terminal: String,

    #[serde(rename = "Ds_TransactionType", default, deserialize_with = "null_as_empty")]
    pub transaction_type: String,

    #[serde(rename = "Ds_SecurePayment", default, deserialize_with = "null_as_empty")]
    pub secure_payment: String,

    #[serde(rename = "Ds_ConsumerLanguage", default, deserialize_with = "null_as_empty")]
    pub consumer_language: String,
}

impl ResponseRecord {
    /// Returns the response code, or `None` if the bank did not send one
    pub fn response_code(&self) -> Option<i64> {
        if self.raw_response.is_empty() {
            None
        } else {
            Some(self.response)
        }
    }
}

// The bank sends `null` for fields it has no value for
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
