//! Shared wire types for the marketplace admin client
//!
//! Entity records, status enums, auth/profile DTOs and the list/mutation
//! response envelopes exchanged with the REST backends.

pub mod auth;
pub mod envelope;
pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use auth::{Identity, LoginRequest, LoginResponse, ProfileResponse, Role};
pub use envelope::{ErrorBody, ListPage, MutationReply};
pub use error::{ModelError, ModelResult};
