use uuid::Uuid;

const ORDER_ID_LEN: usize = 12;
const ORDER_ID_DIGITS: usize = 4;

/// Checks the bank's order format: 4 digits followed by 8 alphanumerics
pub fn is_valid_order_id(order: &str) -> bool {
    let bytes = order.as_bytes();
    bytes.len() == ORDER_ID_LEN
        && bytes[..ORDER_ID_DIGITS].iter().all(u8::is_ascii_digit)
        && bytes[ORDER_ID_DIGITS..].iter().all(u8::is_ascii_alphanumeric)
}

/// Generates a fresh order identifier.
///
/// The bank rejects a reused order as a repeated transaction, so call this
/// again for every retry of the same purchase.
pub fn generate_order_id() -> String {
    let id = Uuid::new_v4();
    let prefix = id.as_u128() % 10_000;
    let simple = id.simple().to_string();

    format!("{:04}{}", prefix, &simple[simple.len() - 8..])
}
