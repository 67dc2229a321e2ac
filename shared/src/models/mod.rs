//! Entity records
//!
//! Plain records exchanged verbatim with the backends. All identifiers are
//! opaque `i64`; timestamps stay in whatever string form the backend sends.

pub mod affiliate;
pub mod inventory;
pub mod member;
pub mod order;
pub mod redemption;
pub mod status;
pub mod vendor;
pub mod voucher;

// Re-exports
pub use affiliate::*;
pub use inventory::*;
pub use member::*;
pub use order::*;
pub use redemption::*;
pub use status::*;
pub use vendor::*;
pub use voucher::*;
