use secrecy::Secret;

pub const ENDPOINT_PRODUCTION: &str = "https://sis.redsys.es/sis/realizarPago";
pub const ENDPOINT_SANDBOX: &str = "https://sis-t.redsys.es:25443/sis/realizarPago";

/// Merchant identity assigned by the bank during the integration.
#[derive(Debug, Clone)]
pub struct MerchantProfile {
    /// Merchant code (FUC) assigned by the bank.
    pub code: String,
    /// Name shown to the buyer on the payment page and receipt.
    pub name: String,
    pub terminal: u32,
    /// Base64-encoded shared secret used to derive per-order keys.
    pub secret: Secret<String>,
    /// Where the bank posts the asynchronous confirmation.
    pub notification_url: String,
    /// Target the sandbox endpoint instead of production.
    pub debug: bool,
}

impl MerchantProfile {
    /// Returns the payment page the signed parameters should be posted to
    pub fn endpoint(&self) -> &'static str {
        if self.debug {
            ENDPOINT_SANDBOX
        } else {
            ENDPOINT_PRODUCTION
        }
    }
}
