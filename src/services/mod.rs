// Services module - Signing, verification and classification

pub mod checkout;
pub mod classifier;
pub mod codec;
pub mod confirmation;
pub mod order;
pub mod profile;
pub mod signature;

pub use checkout::sign;
pub use confirmation::confirm;
pub use profile::ProtocolProfile;
