use base64::Engine;
use secrecy::ExposeSecret;

use crate::error::Result;
use crate::models::{MerchantProfile, TransactionRequest, TransportMessage, SIGNATURE_VERSION};
use crate::services::codec;
use crate::services::profile::ProtocolProfile;
use crate::services::signature::derive_key;

/// Signs a payment request for the bank.
///
/// This function:
/// 1. Encodes the merchant and request fields into `Ds_MerchantParameters`
/// 2. Derives the per-order key from the merchant secret
/// 3. Signs the encoded parameters
/// 4. Returns the envelope along with the endpoint to post it to
#[tracing::instrument(skip(merchant, request), fields(order = %request.order))]
pub fn sign(
    merchant: &MerchantProfile,
    request: &TransactionRequest,
    profile: ProtocolProfile,
) -> Result<TransportMessage> {
    let spec = profile.spec();

    let encoded = codec::encode(merchant, request, profile)?;
    let key = derive_key(merchant.secret.expose_secret(), &encoded.fields.order)?;
    let signature = spec
        .signature_alphabet
        .engine()
        .encode(key.sign(encoded.params.as_bytes()));

    tracing::debug!(
        amount = request.amount,
        params_len = encoded.params.len(),
        endpoint = merchant.endpoint(),
        "Signed payment request"
    );

    Ok(TransportMessage {
        signature,
        signature_version: SIGNATURE_VERSION.to_string(),
        params: encoded.params,
        endpoint: Some(merchant.endpoint().to_string()),
    })
}
