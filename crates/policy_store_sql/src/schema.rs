//! Idempotent table provisioning, run once at adapter construction.

use anyhow::anyhow;

use policy_store_core::{PolicyStoreError, Result};

use crate::backend::StorePool;

#[cfg(feature = "postgres")]
const ID_COLUMN_DDL: &str = "id BIGSERIAL PRIMARY KEY";

#[cfg(all(feature = "sqlite", not(feature = "postgres")))]
const ID_COLUMN_DDL: &str = "id INTEGER PRIMARY KEY AUTOINCREMENT";

/// Create the rule table if it does not exist. Re-running against an
/// existing table is a no-op; any other DDL failure is fatal.
pub(crate) async fn ensure_table(pool: &StorePool, table_name: &str) -> Result<()> {
    let ddl = format!(
        "CREATE TABLE IF NOT EXISTS {table_name} (\
         {ID_COLUMN_DDL}, \
         ptype TEXT, \
         v0 TEXT, v1 TEXT, v2 TEXT, v3 TEXT, v4 TEXT, v5 TEXT)"
    );
    sqlx::query(&ddl)
        .execute(pool)
        .await
        .map_err(|e| PolicyStoreError::Schema(anyhow!(e)))?;
    tracing::debug!(table_name, "rule table ensured");
    Ok(())
}
