use serde::Serialize;
use thiserror::Error;

/// Structured error type for the registry. Discovery-time variants
/// (`UnsupportedType`, `MalformedCollectionShape`) are only ever used to exclude
/// commands; the rest are precondition failures reported to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "code", content = "detail")]
pub enum RegistryError {
    #[error("no handler registered for type `{type_name}`")]
    UnsupportedType { type_name: String },
    #[error("nested collection `{type_name}` is not supported")]
    MalformedCollectionShape { type_name: String },
    #[error("{what} index {index} out of range (len {len})")]
    IndexOutOfRange {
        what: String,
        index: usize,
        len: usize,
    },
    #[error("shape mismatch: expected {expected}, found {found}")]
    ShapeMismatch { expected: String, found: String },
    #[error("command handle from discovery pass {generation} is stale (current pass {current})")]
    StaleCommand { generation: u32, current: u32 },
    #[error("unknown command `{name}`")]
    UnknownCommand { name: String },
    #[error("handler for built-in type `{type_name}` cannot be replaced")]
    BuiltinHandler { type_name: String },
    #[error("invalid value `{input}` for {expected}")]
    InvalidValue { input: String, expected: String },
    #[error("collection length {requested} cannot be allocated")]
    CapacityExceeded { requested: usize },
    #[error("invalid settings: {message}")]
    InvalidSettings { message: String },
}

impl RegistryError {
    pub(crate) fn out_of_range(what: impl Into<String>, index: usize, len: usize) -> Self {
        RegistryError::IndexOutOfRange {
            what: what.into(),
            index,
            len,
        }
    }

    pub(crate) fn mismatch(expected: impl ToString, found: impl ToString) -> Self {
        RegistryError::ShapeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}

/// Allow converting to String for host surfaces that only carry text.
impl From<RegistryError> for String {
    fn from(e: RegistryError) -> String {
        e.to_string()
    }
}
