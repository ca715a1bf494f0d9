// Models module - Protocol data types

pub mod merchant;
pub mod outcome;
pub mod response;
pub mod transaction;
pub mod transport;

pub use merchant::MerchantProfile;
pub use outcome::{Outcome, Status};
pub use response::ResponseRecord;
pub use transaction::{Currency, Language, PaymentMethod, TransactionRequest, TransactionType};
pub use transport::{TransportMessage, SIGNATURE_VERSION};
