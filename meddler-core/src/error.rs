use crate::Error;

/// Defect in a record type or in the registry usage. Raised when building the field
/// metadata, never cached.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Field `{field}` of `{record}` is a primary key and cannot be nullable")]
    NullablePrimaryKey {
        record: &'static str,
        field: &'static str,
    },
    #[error("Field `{field}` of `{record}` is a primary key but it is not a signed integer")]
    NonIntegerPrimaryKey {
        record: &'static str,
        field: &'static str,
    },
    #[error("`{record}` declares more than one primary key (`{first}` and `{second}`)")]
    DuplicatePrimaryKey {
        record: &'static str,
        first: &'static str,
        second: &'static str,
    },
    #[error("Field `{field}` of `{record}` uses the unknown meddler `{meddler}`")]
    UnknownMeddler {
        record: &'static str,
        field: &'static str,
        meddler: String,
    },
    #[error("`{record}` maps more than one field to the column `{column}`")]
    DuplicateColumn {
        record: &'static str,
        column: &'static str,
    },
    #[error("Meddler `{meddler}` cannot handle field `{field}`: {reason}")]
    Unsupported {
        field: String,
        meddler: String,
        reason: String,
    },
    #[error("`{0}` is reserved and cannot be registered as a meddler name")]
    ReservedName(String),
    #[error("Column `{column}` is not an accessible field of `{record}`")]
    NotAccessible {
        record: &'static str,
        column: &'static str,
    },
}

/// Failure while converting the value of a single column.
#[derive(Debug, thiserror::Error)]
#[error("Error while converting column `{column}`")]
pub struct ConversionError {
    pub column: String,
    #[source]
    pub source: Error,
}

impl ConversionError {
    /// Attach the column to a hook failure. Schema errors raised by a hook are
    /// returned as they are, only filling in the field when the hook left it empty.
    pub fn wrap(column: impl Into<String>, error: Error) -> Error {
        match error.downcast::<SchemaError>() {
            Ok(SchemaError::Unsupported {
                field,
                meddler,
                reason,
            }) if field.is_empty() => SchemaError::Unsupported {
                field: column.into(),
                meddler,
                reason,
            }
            .into(),
            Ok(error) => error.into(),
            Err(error) => ConversionError {
                column: column.into(),
                source: error,
            }
            .into(),
        }
    }
}

/// The result set had no row to read.
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
#[error("No rows in the result set")]
pub struct NoRows;

pub fn is_no_rows(error: &Error) -> bool {
    error.is::<NoRows>()
}
