//! Domain models for the Ziel Analytics dashboard
//!
//! Re-exports models from the shared crate

pub use shared::models::*;
pub use shared::types::*;
