//! The SQL policy store adapter.
//!
//! One pool, one table. Every operation is a fresh query; the only
//! adapter-side transaction is the per-section batch inside `save_policy`.

use anyhow::anyhow;
use async_trait::async_trait;
use sqlx::pool::PoolOptions;

use policy_store_core::{
    Column, FieldMatch, Filter, PolicyModel, PolicyRule, PolicyStoreAdapter, PolicyStoreError,
    Result, MAX_FIELDS,
};

use crate::backend::{placeholder, Db, StorePool};
use crate::config::StoreConfig;
use crate::schema;

const RULE_COLUMNS: &str = "ptype, v0, v1, v2, v3, v4, v5";

/// Section keys recognized by `save_policy`. Anything else in the model
/// contributes no rows.
const SECTIONS: [&str; 2] = ["p", "g"];

/// `(ptype, v0..v5)` as read back from the table.
type RuleRow = (
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
);

fn select_sql(table_name: &str) -> String {
    format!("SELECT {RULE_COLUMNS} FROM {table_name}")
}

/// Multi-row insert statement with sequentially numbered placeholders,
/// seven per row.
fn insert_sql(table_name: &str, row_count: usize) -> String {
    let mut next = 1;
    let rows: Vec<String> = (0..row_count)
        .map(|_| {
            let row: Vec<String> = (0..=MAX_FIELDS)
                .map(|_| {
                    let p = placeholder(next);
                    next += 1;
                    p
                })
                .collect();
            format!("({})", row.join(", "))
        })
        .collect();
    format!("INSERT INTO {table_name} ({RULE_COLUMNS}) VALUES {}", rows.join(", "))
}

/// Append `column = placeholder` clauses for `count` values occupying
/// consecutive value columns starting at `first`, numbering placeholders
/// from `next`. Returns false when a value would fall past the column
/// block and can therefore never match a row.
fn push_value_clauses(sql: &mut String, first: usize, count: usize, next: usize) -> bool {
    for offset in 0..count {
        let Some(column) = Column::value_at(first + offset) else {
            return false;
        };
        sql.push_str(&format!(
            " AND {} = {}",
            column.as_str(),
            placeholder(next + offset)
        ));
    }
    true
}

/// SQL-backed implementation of [`PolicyStoreAdapter`].
pub struct SqlStoreAdapter {
    pool: StorePool,
    table_name: String,
    filtered: bool,
}

impl SqlStoreAdapter {
    /// Connect and provision the rule table. A bad connection descriptor
    /// surfaces immediately; an existing table is left untouched.
    pub async fn new(config: StoreConfig) -> Result<Self> {
        let url = config.connect_url()?;
        let pool = PoolOptions::<Db>::new()
            .max_connections(config.max_connections)
            .connect(&url)
            .await
            .map_err(|e| PolicyStoreError::Connection(anyhow!(e)))?;
        schema::ensure_table(&pool, &config.table_name).await?;
        Ok(Self {
            pool,
            table_name: config.table_name,
            filtered: config.filtered,
        })
    }

    pub fn pool(&self) -> &StorePool {
        &self.pool
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Reconstruct a row's comma-joined line and hand it to the model.
    fn load_row(model: &mut (dyn PolicyModel + Send), row: RuleRow) {
        let (ptype, v0, v1, v2, v3, v4, v5) = row;
        let rule = PolicyRule::from_columns([v0, v1, v2, v3, v4, v5]);
        let line = rule.to_line(ptype.as_deref().unwrap_or(""));
        model.load_policy_line(&line);
    }
}

#[async_trait]
impl PolicyStoreAdapter for SqlStoreAdapter {
    async fn load_policy(&self, model: &mut (dyn PolicyModel + Send)) -> Result<()> {
        let sql = select_sql(&self.table_name);
        let rows = sqlx::query_as::<Db, RuleRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PolicyStoreError::Query(anyhow!(e)))?;
        tracing::debug!(table_name = %self.table_name, rows = rows.len(), "loaded policy");
        for row in rows {
            Self::load_row(model, row);
        }
        Ok(())
    }

    fn is_filtered(&self) -> bool {
        self.filtered
    }

    async fn load_filtered_policy(
        &mut self,
        model: &mut (dyn PolicyModel + Send),
        filter: &Filter,
    ) -> Result<()> {
        let mut sql = select_sql(&self.table_name);
        let mut binds: Vec<String> = Vec::new();
        if !filter.is_empty() {
            let mut clauses = Vec::new();
            for (column, matcher) in filter.entries() {
                match matcher {
                    FieldMatch::Equals(value) => {
                        clauses.push(format!(
                            "{} = {}",
                            column.as_str(),
                            placeholder(binds.len() + 1)
                        ));
                        binds.push(value.clone());
                    }
                    // An empty candidate set matches nothing.
                    FieldMatch::OneOf(values) if values.is_empty() => {
                        clauses.push("1 = 0".to_string());
                    }
                    FieldMatch::OneOf(values) => {
                        let placeholders: Vec<String> = values
                            .iter()
                            .map(|value| {
                                binds.push(value.clone());
                                placeholder(binds.len())
                            })
                            .collect();
                        clauses.push(format!(
                            "{} IN ({})",
                            column.as_str(),
                            placeholders.join(", ")
                        ));
                    }
                }
            }
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        // Filtered loads must replay insertion history deterministically.
        sql.push_str(" ORDER BY id");

        let mut query = sqlx::query_as::<Db, RuleRow>(&sql);
        for value in binds {
            query = query.bind(value);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PolicyStoreError::Query(anyhow!(e)))?;
        tracing::debug!(table_name = %self.table_name, rows = rows.len(), "loaded filtered policy");
        for row in rows {
            Self::load_row(model, row);
        }
        self.filtered = true;
        Ok(())
    }

    async fn save_policy(&self, model: &(dyn PolicyModel + Sync)) -> Result<()> {
        // Full replace. The delete is deliberately outside the insert
        // transactions, matching the adapter contract: concurrent savers
        // can interleave the two phases.
        let delete_sql = format!("DELETE FROM {}", self.table_name);
        sqlx::query(&delete_sql)
            .execute(&self.pool)
            .await
            .map_err(|e| PolicyStoreError::Query(anyhow!(e)))?;

        let row_sql = insert_sql(&self.table_name, 1);
        for sec in SECTIONS {
            let Some(section) = model.section(sec) else {
                continue;
            };
            let mut tx = self
                .pool
                .begin()
                .await
                .map_err(|e| PolicyStoreError::Query(anyhow!(e)))?;
            for (ptype, rules) in &section {
                for rule in rules {
                    let mut query = sqlx::query::<Db>(&row_sql).bind(ptype.clone());
                    for column in rule.to_columns() {
                        query = query.bind(column.map(str::to_string));
                    }
                    query
                        .execute(&mut *tx)
                        .await
                        .map_err(|e| PolicyStoreError::Query(anyhow!(e)))?;
                }
            }
            tx.commit()
                .await
                .map_err(|e| PolicyStoreError::Query(anyhow!(e)))?;
        }
        tracing::debug!(table_name = %self.table_name, "saved policy");
        Ok(())
    }

    async fn add_policy(&self, _sec: &str, ptype: &str, rule: &PolicyRule) -> Result<()> {
        let sql = insert_sql(&self.table_name, 1);
        let mut query = sqlx::query::<Db>(&sql).bind(ptype.to_string());
        for column in rule.to_columns() {
            query = query.bind(column.map(str::to_string));
        }
        query
            .execute(&self.pool)
            .await
            .map_err(|e| PolicyStoreError::Query(anyhow!(e)))?;
        Ok(())
    }

    async fn add_policies(&self, _sec: &str, ptype: &str, rules: &[PolicyRule]) -> Result<()> {
        if rules.is_empty() {
            return Ok(());
        }
        // One statement for the whole batch; atomicity is the store's
        // single-statement guarantee, nothing more.
        let sql = insert_sql(&self.table_name, rules.len());
        let mut query = sqlx::query::<Db>(&sql);
        for rule in rules {
            query = query.bind(ptype.to_string());
            for column in rule.to_columns() {
                query = query.bind(column.map(str::to_string));
            }
        }
        query
            .execute(&self.pool)
            .await
            .map_err(|e| PolicyStoreError::Query(anyhow!(e)))?;
        Ok(())
    }

    async fn remove_policy(&self, _sec: &str, ptype: &str, rule: &PolicyRule) -> Result<bool> {
        // Match on the populated prefix only; columns beyond the rule's
        // arity are unconstrained.
        let mut sql = format!(
            "DELETE FROM {} WHERE ptype = {}",
            self.table_name,
            placeholder(1)
        );
        if !push_value_clauses(&mut sql, 0, rule.len(), 2) {
            return Ok(false);
        }
        let mut query = sqlx::query::<Db>(&sql).bind(ptype.to_string());
        for field in rule.fields() {
            query = query.bind(field.clone());
        }
        let result = query
            .execute(&self.pool)
            .await
            .map_err(|e| PolicyStoreError::Query(anyhow!(e)))?;
        tracing::debug!(table_name = %self.table_name, removed = result.rows_affected(), "removed policy");
        Ok(result.rows_affected() > 0)
    }

    async fn remove_filtered_policy(
        &self,
        _sec: &str,
        ptype: &str,
        field_index: isize,
        field_values: &[String],
    ) -> Result<bool> {
        if !(0..=5).contains(&field_index) {
            return Ok(false);
        }
        let last_index = field_index + field_values.len() as isize;
        if !(1..=6).contains(&last_index) {
            return Ok(false);
        }

        let first = field_index as usize;
        let mut sql = format!(
            "DELETE FROM {} WHERE ptype = {}",
            self.table_name,
            placeholder(1)
        );
        if !push_value_clauses(&mut sql, first, field_values.len(), 2) {
            return Ok(false);
        }
        let mut query = sqlx::query::<Db>(&sql).bind(ptype.to_string());
        for value in field_values {
            query = query.bind(value.clone());
        }
        let result = query
            .execute(&self.pool)
            .await
            .map_err(|e| PolicyStoreError::Query(anyhow!(e)))?;
        // Reported as applied only for exactly one deleted row. Deleting
        // several rows still mutates the store but reports false.
        Ok(result.rows_affected() == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_sql_uses_the_given_table() {
        assert_eq!(
            select_sql("custom_rules"),
            "SELECT ptype, v0, v1, v2, v3, v4, v5 FROM custom_rules"
        );
    }

    #[test]
    fn insert_sql_numbers_placeholders_per_row() {
        let sql = insert_sql("casbin_rule", 2);
        assert!(sql.starts_with("INSERT INTO casbin_rule (ptype, v0, v1, v2, v3, v4, v5) VALUES"));
        assert_eq!(sql.matches('(').count(), 3); // column list + two rows
    }

    #[test]
    fn insert_sql_emits_seven_placeholders_per_row() {
        let sql = insert_sql("casbin_rule", 1);
        assert_eq!(sql.matches(',').count(), 12); // six in columns, six in values
    }

    #[test]
    fn value_clauses_walk_consecutive_columns() {
        let mut sql = String::new();
        assert!(push_value_clauses(&mut sql, 1, 2, 2));
        #[cfg(feature = "postgres")]
        assert_eq!(sql, " AND v1 = $2 AND v2 = $3");
        #[cfg(all(feature = "sqlite", not(feature = "postgres")))]
        assert_eq!(sql, " AND v1 = ? AND v2 = ?");
    }

    #[test]
    fn value_clauses_reject_overflow_past_the_column_block() {
        let mut sql = String::new();
        assert!(!push_value_clauses(&mut sql, 5, 2, 2));
    }
}
