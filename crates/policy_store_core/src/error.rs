use thiserror::Error;

pub type Result<T> = std::result::Result<T, PolicyStoreError>;

/// Error taxonomy of the store. The adapter is a thin relay: store errors
/// are carried unchanged inside the matching variant, never retried or
/// re-interpreted. Bounds violations in `remove_filtered_policy` are NOT
/// errors — they surface as a `false` result.
#[derive(Debug, Error)]
pub enum PolicyStoreError {
    #[error("connection failed: {0}")]
    Connection(anyhow::Error),

    #[error("schema provisioning failed: {0}")]
    Schema(anyhow::Error),

    #[error("query failed: {0}")]
    Query(anyhow::Error),

    #[error("invalid rule: {0}")]
    InvalidRule(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_connection() {
        let e = PolicyStoreError::Connection(anyhow::anyhow!("refused"));
        assert_eq!(e.to_string(), "connection failed: refused");
    }

    #[test]
    fn display_schema() {
        let e = PolicyStoreError::Schema(anyhow::anyhow!("permission denied"));
        assert_eq!(e.to_string(), "schema provisioning failed: permission denied");
    }

    #[test]
    fn display_query() {
        let e = PolicyStoreError::Query(anyhow::anyhow!("timeout"));
        assert_eq!(e.to_string(), "query failed: timeout");
    }

    #[test]
    fn display_invalid_rule() {
        let e = PolicyStoreError::InvalidRule("7 fields".into());
        assert_eq!(e.to_string(), "invalid rule: 7 fields");
    }
}
