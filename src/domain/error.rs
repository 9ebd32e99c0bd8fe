//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Schema errors: a document is not valid JSON or does not have the
/// structure of a roadmap envelope / node.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("invalid JSON at line {line}, column {column}: {message}")]
    InvalidJson {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("expected a JSON object at {path}, found {found}")]
    NotAnObject { path: String, found: &'static str },

    #[error("missing field `{field}` in {context}")]
    MissingField {
        field: &'static str,
        context: &'static str,
    },

    #[error("`children` at {path} must be an array, found {found}")]
    ChildrenNotArray { path: String, found: &'static str },

    #[error("roadmap nests deeper than {limit} levels")]
    TooDeep { limit: usize },
}

impl From<serde_json::Error> for SchemaError {
    fn from(e: serde_json::Error) -> Self {
        SchemaError::InvalidJson {
            line: e.line(),
            column: e.column(),
            message: e.to_string(),
        }
    }
}

/// Human-readable name of a JSON value's type, for error messages.
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
