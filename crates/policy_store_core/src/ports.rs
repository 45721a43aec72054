//! Storage port trait for the policy store.
//! Implemented by `policy_store_sql` — core logic depends only on this trait.

use async_trait::async_trait;

use crate::error::Result;
use crate::filter::Filter;
use crate::model::PolicyModel;
use crate::rule::PolicyRule;

/// The adapter contract the external enforcement engine drives.
///
/// Every call is a fresh query against the store: no caching, no retries,
/// no background work. Store errors relay to the caller unchanged.
#[async_trait]
pub trait PolicyStoreAdapter: Send + Sync {
    /// Load every rule in the table into `model`, in the store's natural
    /// iteration order.
    async fn load_policy(&self, model: &mut (dyn PolicyModel + Send)) -> Result<()>;

    /// Whether the most recent load was a filtered (partial) load. False
    /// until `load_filtered_policy` succeeds; never reset afterwards.
    fn is_filtered(&self) -> bool;

    /// Load only rows matching `filter`, ascending by row id so repeated
    /// filtered loads over overlapping data are reproducible.
    async fn load_filtered_policy(
        &mut self,
        model: &mut (dyn PolicyModel + Send),
        filter: &Filter,
    ) -> Result<()>;

    /// Full replace: delete every row, then re-insert the model's `"p"`
    /// and `"g"` sections. Each section's inserts run in one transaction.
    async fn save_policy(&self, model: &(dyn PolicyModel + Sync)) -> Result<()>;

    /// Insert one rule. No duplicate check.
    async fn add_policy(&self, sec: &str, ptype: &str, rule: &PolicyRule) -> Result<()>;

    /// Insert a batch of rules as a single multi-row statement; the batch
    /// lands entirely or not at all, per the store's statement guarantee.
    async fn add_policies(&self, sec: &str, ptype: &str, rules: &[PolicyRule]) -> Result<()>;

    /// Delete every row whose ptype and populated columns match `rule`
    /// exactly. Returns whether any row was deleted.
    async fn remove_policy(&self, sec: &str, ptype: &str, rule: &PolicyRule) -> Result<bool>;

    /// Delete rows whose ptype matches and whose columns starting at
    /// `field_index` equal `field_values` in order.
    ///
    /// Out-of-bounds indices (`field_index` outside 0..=5, or
    /// `field_index + field_values.len()` outside 1..=6) report `false`
    /// without touching the store. Reports `true` only when exactly one
    /// row was deleted — deleting several rows reports `false` even though
    /// the store changed. That asymmetry is part of the contract.
    async fn remove_filtered_policy(
        &self,
        sec: &str,
        ptype: &str,
        field_index: isize,
        field_values: &[String],
    ) -> Result<bool>;
}
