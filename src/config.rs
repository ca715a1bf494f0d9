use secrecy::Secret;

use crate::models::MerchantProfile;
use crate::services::ProtocolProfile;

#[derive(Debug, Clone)]
pub struct Config {
    // Merchant identity assigned by the bank
    pub merchant_code: String,
    pub merchant_name: String,
    pub terminal: u32,
    pub secret: Secret<String>,

    // Where the bank posts confirmations
    pub notification_url: String,

    // Use the sandbox endpoint
    pub debug: bool,

    pub profile: ProtocolProfile,
}

impl Config {
    /// Loads configuration from `TPV_*` environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        // Load .env file if it exists (for local development)
        let _ = dotenvy::dotenv();

        let config = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("TPV")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        Self::from_config(&config)
    }

    pub fn from_config(config: &config::Config) -> Result<Self, config::ConfigError> {
        let profile = match config.get::<String>("profile") {
            Ok(value) => value.parse().map_err(config::ConfigError::Message)?,
            Err(_) => ProtocolProfile::default(),
        };

        Ok(Self {
            merchant_code: config.get("merchant_code")?,
            merchant_name: config.get("merchant_name")?,
            terminal: config.get("terminal")?,
            secret: Secret::new(config.get("secret")?),

            notification_url: config.get("notification_url")?,

            debug: config.get("debug").unwrap_or(false),

            profile,
        })
    }

    pub fn merchant_profile(&self) -> MerchantProfile {
        MerchantProfile {
            code: self.merchant_code.clone(),
            name: self.merchant_name.clone(),
            terminal: self.terminal,
            secret: self.secret.clone(),
            notification_url: self.notification_url.clone(),
            debug: self.debug,
        }
    }
}
