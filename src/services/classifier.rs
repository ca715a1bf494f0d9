use crate::models::Status;
use crate::services::profile::ProtocolProfile;

/// Card type marker the bank sends for credit cards
const CREDIT_CARD_TYPE: &str = "C";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub status: Status,
    pub is_card_payment: bool,
}

/// Maps a bank response code to its business outcome.
///
/// `None` means the confirmation carried no code at all. Anything not
/// explicitly recognised is `Unknown`.
pub fn classify(code: Option<i64>, card_type: &str, profile: ProtocolProfile) -> Classification {
    let spec = profile.spec();

    let status = match code {
        None => Status::Unknown,
        Some(code) if spec.repeated_codes.contains(&code) => Status::Repeated,
        Some(code) if spec.cancelled_codes.contains(&code) => Status::Cancelled,
        Some(0..=99) => Status::Approved,
        Some(_) => Status::Unknown,
    };

    Classification {
        status,
        is_card_payment: status == Status::Approved && card_type == CREDIT_CARD_TYPE,
    }
}
