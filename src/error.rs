use thiserror::Error;

/// Domain error taxonomy. Validation/Reference/Conflict/Config are
/// caller-correctable; Storage wraps the underlying engine failure.
#[derive(Error, Debug)]
pub(crate) enum LedgerError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("reference error: {0}")]
    Reference(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("budget configuration error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

impl LedgerError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub(crate) fn reference(entity: &str, id: i64) -> Self {
        Self::Reference(format!("unknown {entity} id: {id}"))
    }

    /// Stable machine-readable tag for structured failure output.
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Reference(_) => "reference",
            Self::Conflict(_) => "conflict",
            Self::Config(_) => "config",
            Self::Storage(_) => "storage",
        }
    }
}

/// Classify a sqlite constraint failure; anything else is a storage error.
pub(crate) fn map_constraint(err: rusqlite::Error) -> LedgerError {
    if let rusqlite::Error::SqliteFailure(failure, ref msg) = err {
        let detail = msg.clone().unwrap_or_else(|| failure.to_string());
        match failure.extended_code {
            rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
            | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                return LedgerError::Conflict(detail);
            }
            rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                return LedgerError::Reference(detail);
            }
            _ => {}
        }
    }
    LedgerError::Storage(err)
}

pub(crate) type Result<T> = std::result::Result<T, LedgerError>;
