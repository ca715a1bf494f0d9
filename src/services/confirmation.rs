use base64::Engine;
use chrono::NaiveDateTime;

use crate::error::{Result, TpvError};
use crate::models::{Outcome, TransportMessage, SIGNATURE_VERSION};
use crate::services::classifier::classify;
use crate::services::codec::{self, query_unescape};
use crate::services::profile::ProtocolProfile;
use crate::services::signature::derive_key;

const SENT_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Authenticates a bank confirmation and classifies its result.
///
/// This function:
/// 1. Rejects unsupported signature versions
/// 2. Decodes `Ds_MerchantParameters`
/// 3. Derives the order key and checks the signature over the still encoded
///    parameters
/// 4. Parses the bank timestamp
/// 5. Classifies the response code
///
/// Any error means the message must be treated as forged or corrupt and none
/// of its content used.
#[tracing::instrument(skip(secret, message))]
pub fn confirm(secret: &str, message: &TransportMessage, profile: ProtocolProfile) -> Result<Outcome> {
    if message.signature_version != SIGNATURE_VERSION {
        tracing::warn!(version = %message.signature_version, "Unsupported signature version");
        return Err(TpvError::Protocol(format!(
            "unknown signature version: {}",
            message.signature_version
        )));
    }

    let record = codec::decode(&message.params, profile)?;
    let key = derive_key(secret, &record.order)?;

    let supplied = profile
        .spec()
        .signature_alphabet
        .engine()
        .decode(&message.signature)
        .unwrap_or_default();
    if !key.verify(message.params.as_bytes(), &supplied) {
        tracing::warn!(order = %record.order, "Confirmation signature mismatch");
        return Err(TpvError::SignatureMismatch {
            order: record.order,
        });
    }

    let date = query_unescape(&record.date)
        .map_err(|e| TpvError::Protocol(format!("Cannot unescape date: {}", e)))?;
    let time = query_unescape(&record.time)
        .map_err(|e| TpvError::Protocol(format!("Cannot unescape time: {}", e)))?;
    if !has_sent_layout(&date, &time) {
        return Err(TpvError::Protocol(format!(
            "Unexpected datetime layout {:?} {:?}",
            date, time
        )));
    }
    let sent = NaiveDateTime::parse_from_str(&format!("{} {}", date, time), SENT_FORMAT)
        .map_err(|e| {
            TpvError::Protocol(format!("Failed to parse datetime {:?} {:?}: {}", date, time, e))
        })?;

    let classification = classify(record.response_code(), &record.card_type, profile);

    tracing::info!(
        order = %record.order,
        response = record.response,
        status = classification.status.as_str(),
        "Confirmation verified"
    );

    Ok(Outcome {
        status: classification.status,
        sent,
        response_code: record.response,
        is_card_payment: classification.is_card_payment,
        record,
    })
}

/// Checks `dd/mm/yyyy` and `h:mm`/`hh:mm`; chrono alone also accepts
/// unpadded days, months and minutes.
fn has_sent_layout(date: &str, time: &str) -> bool {
    fn digits(part: &str, min: usize, max: usize) -> bool {
        (min..=max).contains(&part.len()) && part.bytes().all(|b| b.is_ascii_digit())
    }

    let date_ok = matches!(
        date.split('/').collect::<Vec<_>>().as_slice(),
        [day, month, year] if digits(day, 2, 2) && digits(month, 2, 2) && digits(year, 4, 4)
    );
    let time_ok = matches!(
        time.split(':').collect::<Vec<_>>().as_slice(),
        [hour, minute] if digits(hour, 1, 2) && digits(minute, 2, 2)
    );

    date_ok && time_ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Status;
    use base64::engine::general_purpose::{STANDARD, URL_SAFE};
    use chrono::{Datelike, Timelike};
    use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

    const SECRET: &str = "sq7HjrUOBfKmC576ILgskD5srU870gJ7";

    fn message(params: &str, signature: &str) -> TransportMessage {
        TransportMessage {
            signature: signature.to_string(),
            signature_version: SIGNATURE_VERSION.to_string(),
            params: STANDARD.encode(params),
            endpoint: None,
        }
    }

    /// Builds a confirmation signed the way the bank signs it
    fn bank_message(json: &str, order: &str) -> TransportMessage {
        let params = URL_SAFE.encode(json);
        let key = derive_key(SECRET, order).unwrap();
        TransportMessage {
            signature: URL_SAFE.encode(key.sign(params.as_bytes())),
            signature_version: SIGNATURE_VERSION.to_string(),
            params,
            endpoint: None,
        }
    }

    #[test]
    fn test_signature_version_unknown() {
        let mut message = message(r#"{"Ds_Order": "00order-code"}"#, "");
        message.signature_version = "foo".to_string();

        let result = confirm(SECRET, &message, ProtocolProfile::Current);
        match result {
            Err(err @ TpvError::Protocol(_)) => {
                assert_eq!(err.to_string(), "Protocol error: unknown signature version: foo")
            }
            other => panic!("expected protocol error, got {:?}", other),
        }
    }

    #[test]
    fn test_confirm_bad_signature() {
        let message = message(r#"{"Ds_Order": "00order-code"}"#, "foobarqu");

        let result = confirm(SECRET, &message, ProtocolProfile::Current);
        assert!(matches!(
            result,
            Err(TpvError::SignatureMismatch { ref order }) if order == "00order-code"
        ));

        let expected = derive_key(SECRET, "00order-code")
            .unwrap()
            .sign(message.params.as_bytes());
        assert_eq!(
            URL_SAFE.encode(expected),
            "cQ3etTziVy1Dzvs72w9KS8vDALtU0EPiDm0rWvb7mBU="
        );
    }

    #[test]
    fn test_confirm_undecodable_signature() {
        let message = message(r#"{"Ds_Order": "00order-code"}"#, "not base64!");

        let result = confirm(SECRET, &message, ProtocolProfile::Current);
        assert!(matches!(result, Err(TpvError::SignatureMismatch { .. })));
    }

    #[test]
    fn test_confirm_cancellations() {
        let message = message(
            r#"{"Ds_Order": "00order-code", "Ds_Response": "9915", "Ds_Date": "24/11/2021", "Ds_Hour": "08:00"}"#,
            "9X6rL8CmYglpb3CmXFR_8YFDAbEuvQ9YK-wA0yuuhFQ=",
        );

        let outcome = confirm(SECRET, &message, ProtocolProfile::Current).unwrap();
        assert_eq!(outcome.status, Status::Cancelled);
        assert_eq!(outcome.response_code, 9915);
    }

    #[test]
    fn test_confirm_repeated_transaction() {
        let message = message(
            r#"{"Ds_Order": "00order-code", "Ds_Response": "0913", "Ds_Date": "24/11/2021", "Ds_Hour": "08:00"}"#,
            "_vMwdgTbkrldjxmz5e1xOgfXx42gLkwe__CD6jOWBX0=",
        );

        let outcome = confirm(SECRET, &message, ProtocolProfile::Current).unwrap();
        assert_eq!(outcome.status, Status::Repeated);
    }

    #[test]
    fn test_confirm() {
        let message = message(
            r#"{"Ds_Order": "00order-code", "Ds_Response": "0", "Ds_Date": "24/11/2021", "Ds_Hour": "08:00", "Ds_Card_Country": "SPAIN", "Ds_AuthorisationCode": "123456", "Ds_Card_Type": "C"}"#,
            "KKr4Cjwr2w94_nkHMU7ijkHWiTHMrJm84Iho2eSlXlA=",
        );

        let outcome = confirm(SECRET, &message, ProtocolProfile::Current).unwrap();

        assert_eq!(outcome.status, Status::Approved);
        assert!(outcome.is_card_payment);
        assert_eq!(outcome.record.card_country, "SPAIN");
        assert_eq!(outcome.record.authorisation_code, "123456");
        assert_eq!(outcome.record.card_type, "C");
        assert_eq!(outcome.sent.day(), 24);
        assert_eq!(outcome.sent.month(), 11);
        assert_eq!(outcome.sent.year(), 2021);
        assert_eq!(outcome.sent.hour(), 8);
        assert_eq!(outcome.sent.minute(), 0);
    }

    #[test]
    fn test_confirm_escaped_datetime_and_metadata() {
        let data = utf8_percent_encode("orders/0000248d6206?retry=1", NON_ALPHANUMERIC).to_string();
        let json = format!(
            r#"{{"Ds_Order":"0000248d6206","Ds_Response":"0000","Ds_Date":"01%2F02%2F2025","Ds_Hour":"09%3A22","Ds_Card_Type":"D","Ds_MerchantData":"{}"}}"#,
            data
        );

        let outcome = confirm(SECRET, &bank_message(&json, "0000248d6206"), ProtocolProfile::Current)
            .unwrap();

        assert_eq!(outcome.status, Status::Approved);
        assert!(!outcome.is_card_payment);
        assert_eq!(outcome.sent.day(), 1);
        assert_eq!(outcome.sent.month(), 2);
        assert_eq!(outcome.sent.hour(), 9);
        assert_eq!(outcome.sent.minute(), 22);
        assert_eq!(outcome.record.merchant_data, "orders/0000248d6206?retry=1");
    }

    #[test]
    fn test_confirm_without_response_code_is_unknown() {
        let json = r#"{"Ds_Order":"00011234abcd","Ds_Date":"24/11/2021","Ds_Hour":"08:00"}"#;

        let outcome = confirm(SECRET, &bank_message(json, "00011234abcd"), ProtocolProfile::Current)
            .unwrap();

        assert_eq!(outcome.status, Status::Unknown);
        assert_eq!(outcome.response_code, 0);
    }

    #[test]
    fn test_confirm_invalid_datetime() {
        let json = r#"{"Ds_Order":"00011234abcd","Ds_Response":"0","Ds_Date":"2021-11-24","Ds_Hour":"08:00"}"#;

        let result = confirm(SECRET, &bank_message(json, "00011234abcd"), ProtocolProfile::Current);
        assert!(matches!(result, Err(TpvError::Protocol(_))));
    }

    #[test]
    fn test_confirm_rejects_unpadded_datetime() {
        for (date, hour) in [
            ("4/1/2021", "8:0"),
            ("4/01/2021", "08:00"),
            ("04/1/2021", "08:00"),
            ("04/01/21", "08:00"),
            ("04/01/2021", "08:0"),
        ] {
            let json = format!(
                r#"{{"Ds_Order":"00011234abcd","Ds_Response":"0","Ds_Date":"{}","Ds_Hour":"{}"}}"#,
                date, hour
            );
            let result = confirm(SECRET, &bank_message(&json, "00011234abcd"), ProtocolProfile::Current);
            assert!(
                matches!(result, Err(TpvError::Protocol(_))),
                "{} {} -> {:?}",
                date,
                hour,
                result
            );
        }
    }

    #[test]
    fn test_confirm_accepts_single_digit_hour() {
        let json = r#"{"Ds_Order":"00011234abcd","Ds_Response":"0","Ds_Date":"04/01/2021","Ds_Hour":"8:05"}"#;

        let outcome = confirm(SECRET, &bank_message(json, "00011234abcd"), ProtocolProfile::Current)
            .unwrap();
        assert_eq!(outcome.sent.day(), 4);
        assert_eq!(outcome.sent.month(), 1);
        assert_eq!(outcome.sent.hour(), 8);
        assert_eq!(outcome.sent.minute(), 5);
    }

    #[test]
    fn test_confirm_rejects_array_params() {
        let json = r#"["00011234abcd","0","24/11/2021","08:00","724","123456","C"]"#;

        let result = confirm(SECRET, &bank_message(json, "00011234abcd"), ProtocolProfile::Current);
        assert!(matches!(result, Err(TpvError::Encoding(_))), "{:?}", result);
    }

    #[test]
    fn test_confirm_propagates_decode_errors() {
        let mut message = bank_message(r#"{"Ds_Order":"00011234abcd"}"#, "00011234abcd");
        message.params = "not base64!".to_string();

        let result = confirm(SECRET, &message, ProtocolProfile::Current);
        assert!(matches!(result, Err(TpvError::Encoding(_))));
    }

    #[test]
    fn test_confirm_wrong_secret() {
        let json = r#"{"Ds_Order":"00011234abcd","Ds_Response":"0","Ds_Date":"24/11/2021","Ds_Hour":"08:00"}"#;
        let message = bank_message(json, "00011234abcd");

        let result = confirm("aqsY7A9EnU5k8VpuBeUJ6+k8VpuBeUJ6", &message, ProtocolProfile::Current);
        assert!(matches!(result, Err(TpvError::SignatureMismatch { .. })));
    }

    #[test]
    fn test_confirm_detects_re_encoded_params() {
        let json = r#"{"Ds_Order":"00011234abcd","Ds_Response":"9915","Ds_Date":"24/11/2021","Ds_Hour":"08:00"}"#;
        let genuine = bank_message(json, "00011234abcd");
        assert!(confirm(SECRET, &genuine, ProtocolProfile::Current).is_ok());

        // Same order and key, forged response code
        let forged = TransportMessage {
            params: URL_SAFE.encode(json.replace("9915", "0000")),
            ..genuine.clone()
        };
        let result = confirm(SECRET, &forged, ProtocolProfile::Current);
        assert!(matches!(result, Err(TpvError::SignatureMismatch { .. })));

        // Semantically identical JSON with different bytes
        let reformatted = TransportMessage {
            params: URL_SAFE.encode(json.replace(",", ", ")),
            ..genuine
        };
        let result = confirm(SECRET, &reformatted, ProtocolProfile::Current);
        assert!(matches!(result, Err(TpvError::SignatureMismatch { .. })));
    }

    #[test]
    fn test_confirm_detects_byte_flips() {
        let json = r#"{"Ds_Order":"00011234abcd","Ds_Response":"0","Ds_Date":"24/11/2021","Ds_Hour":"08:00","Ds_Card_Type":"C"}"#;
        let genuine = bank_message(json, "00011234abcd");
        assert!(confirm(SECRET, &genuine, ProtocolProfile::Current).is_ok());

        for i in 0..genuine.signature.len() {
            let mut tampered = genuine.clone();
            let mut bytes = tampered.signature.into_bytes();
            bytes[i] ^= 0x01;
            tampered.signature = String::from_utf8(bytes).unwrap();

            let result = confirm(SECRET, &tampered, ProtocolProfile::Current);
            assert!(
                matches!(result, Err(TpvError::SignatureMismatch { .. })),
                "signature byte {} -> {:?}",
                i,
                result
            );
        }

        for i in 0..genuine.params.len() {
            let mut tampered = genuine.clone();
            let mut bytes = tampered.params.into_bytes();
            bytes[i] ^= 0x01;
            tampered.params = String::from_utf8(bytes).unwrap();

            // A flip may break the encoding before the signature is checked,
            // but it must never be accepted.
            let result = confirm(SECRET, &tampered, ProtocolProfile::Current);
            assert!(
                matches!(
                    result,
                    Err(TpvError::SignatureMismatch { .. })
                        | Err(TpvError::Encoding(_))
                        | Err(TpvError::Crypto(_))
                ),
                "params byte {} -> {:?}",
                i,
                result
            );
        }
    }

    #[test]
    fn test_confirm_legacy_profile_uses_standard_alphabet() {
        let json = r#"{"Ds_Order":"00011234abcd","Ds_Response":"0","Ds_Date":"24/11/2021","Ds_Hour":"08:00"}"#;
        let params = STANDARD.encode(json);
        let key = derive_key(SECRET, "00011234abcd").unwrap();
        let message = TransportMessage {
            signature: STANDARD.encode(key.sign(params.as_bytes())),
            signature_version: SIGNATURE_VERSION.to_string(),
            params,
            endpoint: None,
        };

        let outcome = confirm(SECRET, &message, ProtocolProfile::Legacy).unwrap();
        assert_eq!(outcome.status, Status::Approved);
    }
}
