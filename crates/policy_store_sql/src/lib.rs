//! sqlx implementation of the policy store port.
//!
//! All SQL is runtime-checked (`sqlx::query`, not `sqlx::query!`) to avoid
//! a compile-time database requirement. The backend is chosen by cargo
//! feature: `postgres` for the production stack, `sqlite` for embedded and
//! test use.

pub mod adapter;
pub mod backend;
pub mod config;
mod schema;

pub use adapter::SqlStoreAdapter;
pub use backend::{Db, StorePool};
pub use config::{StoreConfig, DEFAULT_TABLE_NAME};

pub use policy_store_core::{
    Column, FieldMatch, Filter, MemoryModel, PolicyModel, PolicyRule, PolicyStoreAdapter,
    PolicyStoreError, Result,
};
