//! The uniform result envelope returned for every invocation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{ErrorKind, ToolError};

/// Lifecycle of one invocation.
///
/// `received → validating → executing → completed | failed`, or
/// `received → validating → rejected`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvocationState {
    /// Request accepted, nothing checked yet.
    Received,
    /// Resolving the operation and checking parameters.
    Validating,
    /// Components are running.
    Executing,
    /// Finished with a result.
    Completed,
    /// Refused before execution.
    Rejected,
    /// A component failed during execution.
    Failed,
}

impl InvocationState {
    /// Whether no further transition is possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Rejected | Self::Failed)
    }

    /// Whether `self → next` is a legal transition.
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Received, Self::Validating)
                | (Self::Validating, Self::Executing | Self::Rejected)
                | (Self::Executing, Self::Completed | Self::Failed)
        )
    }
}

/// Error payload of a failed envelope.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// Error class.
    pub kind: ErrorKind,
    /// Human-readable description.
    pub message: String,
    /// Suggested wait before retrying.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_ms: Option<u64>,
}

impl From<&ToolError> for ErrorBody {
    fn from(err: &ToolError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
            retry_after_ms: err.retry_after_ms(),
        }
    }
}

/// Outcome of one invocation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolEnvelope {
    /// Requested operation name.
    pub operation: String,
    /// Terminal state.
    pub state: InvocationState,
    /// Operation payload on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error on rejection or failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl ToolEnvelope {
    /// A completed envelope.
    pub fn completed(operation: impl Into<String>, result: Value) -> Self {
        Self {
            operation: operation.into(),
            state: InvocationState::Completed,
            result: Some(result),
            error: None,
        }
    }

    /// A rejected or failed envelope.
    pub fn errored(operation: impl Into<String>, state: InvocationState, err: &ToolError) -> Self {
        Self {
            operation: operation.into(),
            state,
            result: None,
            error: Some(err.into()),
        }
    }

    /// Whether the invocation ended in an error.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
