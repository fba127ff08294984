use thiserror::Error;

use crate::{DocId, TransactionId};

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_operation(name: impl Into<String>) -> Error {
        Error(ErrorKind::InvalidOperation { name: name.into() }.into())
    }

    pub fn ordinal_out_of_range(ordinal: usize, capacity: usize) -> Error {
        Error(ErrorKind::OrdinalOutOfRange { ordinal, capacity }.into())
    }

    pub fn empty_group_queue(operation: &'static str) -> Error {
        Error(ErrorKind::EmptyGroupQueue { operation }.into())
    }

    pub fn transaction_not_found(id: TransactionId) -> Error {
        Error(ErrorKind::TransactionNotFound { id }.into())
    }

    pub fn transaction_exists(id: TransactionId) -> Error {
        Error(ErrorKind::TransactionExists { id }.into())
    }

    pub fn missing_value(field: impl Into<String>, doc: DocId) -> Error {
        Error(
            ErrorKind::MissingValue {
                field: field.into(),
                doc,
            }
            .into(),
        )
    }

    pub fn field_not_found(field: impl Into<String>) -> Error {
        Error(
            ErrorKind::FieldNotFound {
                field: field.into(),
            }
            .into(),
        )
    }

    /// Returns `true` for errors caused by a caller violating the protocol of the
    /// transaction or scan APIs, as opposed to data-dependent failures.
    pub fn is_programming_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::InvalidArgument { .. }
                | ErrorKind::InvalidOperation { .. }
                | ErrorKind::OrdinalOutOfRange { .. }
                | ErrorKind::EmptyGroupQueue { .. }
        )
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("invalid operation {name}")]
    InvalidOperation { name: String },

    #[error("document ordinal {ordinal} exceeds visitation capacity {capacity}")]
    OrdinalOutOfRange { ordinal: usize, capacity: usize },

    #[error("{operation} called on an empty net delta queue")]
    EmptyGroupQueue { operation: &'static str },

    #[error("transaction {id} not found")]
    TransactionNotFound { id: TransactionId },

    #[error("transaction {id} already exists")]
    TransactionExists { id: TransactionId },

    #[error("no value for field '{field}' in document {doc}")]
    MissingValue { field: String, doc: DocId },

    #[error("field '{field}' not found")]
    FieldNotFound { field: String },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}
