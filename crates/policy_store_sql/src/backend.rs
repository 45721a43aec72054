//! Feature-selected database backend.
//!
//! Exactly one backend type is compiled in; `postgres` wins when both
//! features are enabled so a production build can keep `sqlite` on for
//! its test profile.

#[cfg(feature = "postgres")]
pub type Db = sqlx::Postgres;

#[cfg(all(feature = "sqlite", not(feature = "postgres")))]
pub type Db = sqlx::Sqlite;

#[cfg(not(any(feature = "postgres", feature = "sqlite")))]
compile_error!("policy_store_sql needs the `postgres` or `sqlite` feature");

pub type StorePool = sqlx::Pool<Db>;

/// The `n`-th bind placeholder (1-based) in the backend's syntax.
#[cfg(feature = "postgres")]
pub(crate) fn placeholder(n: usize) -> String {
    format!("${n}")
}

#[cfg(all(feature = "sqlite", not(feature = "postgres")))]
pub(crate) fn placeholder(_n: usize) -> String {
    "?".to_string()
}
