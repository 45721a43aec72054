//! Adapter configuration.

use std::collections::BTreeMap;

use anyhow::anyhow;
use url::Url;

use policy_store_core::{PolicyStoreError, Result};

pub const DEFAULT_TABLE_NAME: &str = "casbin_rule";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Connection descriptor for [`crate::SqlStoreAdapter`].
///
/// `options` are passed through verbatim as URL query parameters for the
/// underlying driver; the adapter itself never interprets them.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub url: String,
    pub options: BTreeMap<String, String>,
    pub table_name: String,
    pub filtered: bool,
    pub max_connections: u32,
}

impl StoreConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            options: BTreeMap::new(),
            table_name: DEFAULT_TABLE_NAME.to_string(),
            filtered: false,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }

    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }

    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }

    /// Start the adapter with the filtered flag already set.
    pub fn with_filtered(mut self, filtered: bool) -> Self {
        self.filtered = filtered;
        self
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    /// The connection URL with `options` merged into its query string.
    /// A malformed URL surfaces as a connection error, matching the
    /// construction-time contract.
    pub(crate) fn connect_url(&self) -> Result<String> {
        if self.options.is_empty() {
            return Ok(self.url.clone());
        }
        let mut url =
            Url::parse(&self.url).map_err(|e| PolicyStoreError::Connection(anyhow!(e)))?;
        for (name, value) in &self.options {
            url.query_pairs_mut().append_pair(name, value);
        }
        Ok(url.into())
    }
}
