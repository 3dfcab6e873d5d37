use thiserror::Error;

/// Failure reported by a `KeyValueStore` backend.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// The store operation that failed, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Read,
    Write,
    Remove,
}

impl std::fmt::Display for StoreOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StoreOp::Read => "read",
            StoreOp::Write => "write",
            StoreOp::Remove => "remove",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Malformed session record: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid session record: {0}")]
    InvalidRecord(String),

    #[error("Failed to {op} session key '{key}': {source}")]
    Persistence {
        op: StoreOp,
        key: String,
        #[source]
        source: StoreError,
    },
}

impl SessionError {
    pub fn persistence(op: StoreOp, key: &str, source: StoreError) -> Self {
        SessionError::Persistence {
            op,
            key: key.to_string(),
            source,
        }
    }

    /// True for storage failures, false for problems with the record itself
    pub fn is_persistence(&self) -> bool {
        matches!(self, SessionError::Persistence { .. })
    }

    /// Description safe for logs: says what was wrong with a record
    /// without quoting any of its values.
    pub fn redacted(&self) -> String {
        match self {
            SessionError::Parse(e) => format!(
                "{:?} error at line {} column {}",
                e.classify(),
                e.line(),
                e.column()
            ),
            other => other.to_string(),
        }
    }
}
