//! `permgate-core` — shared primitives for the auth state and permission crates.
//!
//! No IO, no locking, no logging: just identifiers and the domain error model.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::PrincipalId;
