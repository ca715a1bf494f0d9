use base64::Engine;
use percent_encoding::percent_decode_str;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, TpvError};
use crate::models::{MerchantProfile, ResponseRecord, TransactionRequest};
use crate::services::order::is_valid_order_id;
use crate::services::profile::ProtocolProfile;

const MAX_CLIENT_CHARS: usize = 59;

/// Outbound field set, in the order it goes on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchantParameters {
    #[serde(rename = "Ds_Merchant_MerchantCode")]
    pub merchant_code: String,

    #[serde(rename = "Ds_Merchant_Terminal")]
    pub terminal: u32,

    #[serde(
        rename = "Ds_Merchant_TransactionType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub transaction_type: Option<u8>,

    #[serde(rename = "Ds_Merchant_Amount")]
    pub amount: u32,

    #[serde(rename = "Ds_Merchant_Currency")]
    pub currency: u16,

    #[serde(rename = "Ds_Merchant_Order")]
    pub order: String,

    #[serde(rename = "Ds_Merchant_MerchantURL")]
    pub notification_url: String,

    #[serde(rename = "Ds_Merchant_ProductDescription")]
    pub product: String,

    #[serde(rename = "Ds_Merchant_Titular")]
    pub client: String,

    #[serde(rename = "Ds_Merchant_ConsumerLanguage")]
    pub language: String,

    #[serde(rename = "Ds_Merchant_UrlOK")]
    pub url_ok: String,

    #[serde(rename = "Ds_Merchant_UrlKO")]
    pub url_ko: String,

    #[serde(rename = "Ds_Merchant_MerchantName")]
    pub merchant_name: String,

    #[serde(
        rename = "Ds_Merchant_MerchantData",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub data: Option<String>,

    #[serde(
        rename = "Ds_Merchant_PayMethods",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub payment_method: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EncodedParameters {
    /// Opaque value for `Ds_MerchantParameters`; this is what gets signed
    pub params: String,
    pub fields: MerchantParameters,
}

/// Builds the outbound field set and encodes it for transport.
pub fn encode(
    merchant: &MerchantProfile,
    request: &TransactionRequest,
    profile: ProtocolProfile,
) -> Result<EncodedParameters> {
    let spec = profile.spec();

    if spec.validates_order && !is_valid_order_id(&request.order) {
        return Err(TpvError::Validation(format!(
            "invalid order format {:?}",
            request.order
        )));
    }

    let client = if request.client.chars().count() > MAX_CLIENT_CHARS {
        request.client.chars().take(MAX_CLIENT_CHARS).collect()
    } else {
        request.client.clone()
    };

    let fields = MerchantParameters {
        merchant_code: merchant.code.clone(),
        terminal: merchant.terminal,
        transaction_type: spec
            .extended_fields
            .then(|| request.transaction_type.code()),
        amount: request.amount,
        currency: request.currency.code(),
        order: request.order.clone(),
        notification_url: merchant.notification_url.clone(),
        product: request.product.clone(),
        client,
        language: request
            .language
            .map(|language| language.code().to_string())
            .unwrap_or_default(),
        url_ok: request.url_ok.clone(),
        url_ko: request.url_ko.clone(),
        merchant_name: merchant.name.clone(),
        data: request.data.clone().filter(|data| !data.is_empty()),
        payment_method: request
            .payment_method
            .filter(|_| spec.extended_fields)
            .map(|method| method.code().to_string()),
    };

    let json = serde_json::to_vec(&fields)?;
    let params = spec.params_alphabet.engine().encode(json);

    Ok(EncodedParameters { params, fields })
}

/// Decodes the parameters of a bank confirmation.
///
/// All or nothing: any malformed piece fails the whole decode.
pub fn decode(params: &str, profile: ProtocolProfile) -> Result<ResponseRecord> {
    let json = profile.spec().params_alphabet.engine().decode(params)?;
    let mut record: ResponseRecord = from_json_object(&json)?;

    if !record.raw_response.is_empty() {
        record.response = record.raw_response.parse().map_err(|e| {
            TpvError::Encoding(format!(
                "Cannot parse response {:?}: {}",
                record.raw_response, e
            ))
        })?;
    }

    record.merchant_data = query_unescape(&record.merchant_data)?;

    Ok(record)
}

/// Decodes an outbound parameter string back to its field set
pub fn decode_request(params: &str, profile: ProtocolProfile) -> Result<MerchantParameters> {
    let json = profile.spec().params_alphabet.engine().decode(params)?;
    from_json_object(&json)
}

// Derived structs also accept JSON arrays positionally; the wire format is
// always an object.
fn from_json_object<T: DeserializeOwned>(json: &[u8]) -> Result<T> {
    let fields: Map<String, Value> = serde_json::from_slice(json)?;
    Ok(serde_json::from_value(Value::Object(fields))?)
}

/// Reverses form-style percent encoding: `+` is a space and every `%` must
/// start a two digit hex escape.
pub(crate) fn query_unescape(value: &str) -> Result<String> {
    let bytes = value.as_bytes();
    for (i, byte) in bytes.iter().enumerate() {
        if *byte != b'%' {
            continue;
        }
        let valid = bytes
            .get(i + 1..i + 3)
            .map_or(false, |hex| hex.iter().all(u8::is_ascii_hexdigit));
        if !valid {
            return Err(TpvError::Encoding(format!(
                "Invalid escape sequence in {:?}",
                value
            )));
        }
    }

    let spaced = value.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|e| TpvError::Encoding(format!("Cannot unescape {:?}: {}", value, e)))
}
