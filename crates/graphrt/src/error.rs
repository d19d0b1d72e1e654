//! Fatal configuration and graph-consistency failures.
//!
//! Every variant of [`OpError`] is unrecoverable for the build that produced it: callers
//! propagate it and abandon the current graph.

use thiserror::Error;

use crate::device::AllocError;

/// Failure raised by registration, dispatch or operator initialization.
#[derive(Debug, Error)]
pub enum OpError {
    #[error("key already registered: {key}")]
    DuplicateRegistration { key: String },
    #[error("{op_type} operation is not registered")]
    UnregisteredOp { op_type: String },
    #[error("key not registered: {key}")]
    UnregisteredKey { key: String },
    #[error("op {op_type}: encountered a non-existing input tensor: {input}")]
    MissingInput { op_type: String, input: String },
    #[error("op {op_type}: operator output size != operator output type size ({outputs} vs {output_types})")]
    OutputTypeCountMismatch {
        op_type: String,
        outputs: usize,
        output_types: usize,
    },
    #[error("op {op_type}: failed to create output tensor {output}: {source}")]
    Allocation {
        op_type: String,
        output: String,
        #[source]
        source: AllocError,
    },
    #[error("argument {name} has an unexpected value: expected {expected}")]
    InvalidArgument { name: String, expected: &'static str },
    #[error("construct context is missing its {field}")]
    IncompleteContext { field: &'static str },
    #[error("op {op_type}: {message}")]
    Execution { op_type: String, message: String },
}

impl OpError {
    pub fn invalid_argument(name: impl Into<String>, expected: &'static str) -> Self {
        OpError::InvalidArgument {
            name: name.into(),
            expected,
        }
    }

    pub fn execution(op_type: impl Into<String>, message: impl Into<String>) -> Self {
        OpError::Execution {
            op_type: op_type.into(),
            message: message.into(),
        }
    }
}

/// Convenience alias for results returned by registry and operator routines.
pub type OpResult<T> = Result<T, OpError>;
