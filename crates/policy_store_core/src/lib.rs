//! Core types and port traits for the SQL policy store.
//!
//! The external enforcement engine is a collaborator, not a dependency:
//! it reaches the store only through [`ports::PolicyStoreAdapter`], and the
//! store reaches the engine's model only through [`model::PolicyModel`].

pub mod error;
pub mod filter;
pub mod model;
pub mod ports;
pub mod rule;

pub use error::{PolicyStoreError, Result};
pub use filter::{Column, FieldMatch, Filter};
pub use model::{MemoryModel, PolicyModel};
pub use ports::PolicyStoreAdapter;
pub use rule::{PolicyRule, MAX_FIELDS};
