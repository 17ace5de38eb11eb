//! Error types for response parsing and lazy traversal.

use thiserror::Error;

use crate::responses::ResponseKind;

/// A structural lookup failure raised while walking a chain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// The key is absent, or the current value is not a mapping.
    #[error("missing key `{key}` at step {step}")]
    MissingKey { key: String, step: usize },

    /// The index is out of range, or the current value is not a sequence.
    #[error("index {index} out of range at step {step}")]
    IndexOutOfRange { index: usize, step: usize },
}

/// Errors surfaced by classification and children resolution.
///
/// Values are `Clone` because a failed children read is cached on the node
/// and handed out again on every later read.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResponseError {
    /// No registered kind accepted the raw value.
    #[error("no registered response kind matches value with keys [{keys}]")]
    NoMatchingKind { keys: String },

    /// A field was located but had the wrong shape, or a required field is missing.
    #[error("failed to parse {kind} field `{field}`: {reason}")]
    FieldParsing {
        kind: ResponseKind,
        field: &'static str,
        reason: String,
    },

    /// None of the kind's children chains resolved to a sequence.
    #[error("no children chain of {kind} matched the fetched response")]
    Children { kind: ResponseKind },

    /// The transport failed while fetching children.
    #[error("request for {kind} children failed: {message}")]
    Transport { kind: ResponseKind, message: String },

    /// Children were requested from a leaf node.
    #[error("tracks have no children")]
    Leaf,
}

impl ResponseError {
    pub(crate) fn field(kind: ResponseKind, field: &'static str, reason: impl ToString) -> Self {
        Self::FieldParsing {
            kind,
            field,
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ResponseError>;
