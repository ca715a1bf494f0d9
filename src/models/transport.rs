use serde::{Deserialize, Serialize};

pub const SIGNATURE_VERSION: &str = "HMAC_SHA256_V1";

/// The signed envelope exchanged with the bank in both directions.
///
/// Field names match the form fields the bank posts, so a callback body can be
/// deserialized straight into this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportMessage {
    #[serde(rename = "Ds_Signature")]
    pub signature: String,

    #[serde(rename = "Ds_SignatureVersion")]
    pub signature_version: String,

    #[serde(rename = "Ds_MerchantParameters")]
    pub params: String,

    /// Outbound only: the payment page to post the other three fields to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}
