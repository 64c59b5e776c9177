//! Error types for the equivalency engine.
//!
//! [`EquivalencyFailure`] is the single terminal diagnostic handed back to
//! callers. [`EquivalencyError`] is what travels up the recursion while a
//! graph is being compared; the validator collapses it into a failure.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::steps::StepKind;

/// Category of a reported discrepancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Leaf values differ.
    ValueMismatch,
    /// The expected shape is violated: missing member, length mismatch,
    /// collection compared with a non-collection.
    StructuralMismatch,
    /// The subject recurs along its own ancestor chain.
    CyclicReference,
    /// The options cannot drive a comparison, e.g. no members selected.
    Configuration,
    /// Something unexpected escaped while traversing the graph.
    Internal,
}

/// A failed equivalency assertion.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct EquivalencyFailure {
    pub kind: FailureKind,
    /// Path of the node that failed; empty for the root.
    pub path: String,
    pub message: String,
}

impl EquivalencyFailure {
    pub fn new(kind: FailureKind, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Errors raised while walking an object graph.
#[derive(Debug, Error)]
pub enum EquivalencyError {
    /// A comparison failed; reported to the caller as is.
    #[error(transparent)]
    Failed(#[from] EquivalencyFailure),

    /// A member listed by a type descriptor could not be read.
    #[error("member `{member}` of `{type_name}` could not be read at `{path}`")]
    MemberAccess {
        path: String,
        type_name: String,
        member: String,
    },
}

impl EquivalencyError {
    /// Path of the node the error was raised at.
    pub fn path(&self) -> &str {
        match self {
            EquivalencyError::Failed(failure) => &failure.path,
            EquivalencyError::MemberAccess { path, .. } => path,
        }
    }
}

/// Result type for operations inside the engine.
pub type EquivalencyResult<T> = Result<T, EquivalencyError>;

/// A step plan edit that would break the plan's ordering invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("no `{0}` step found in the plan")]
    AnchorNotFound(StepKind),

    #[error("cannot place a step after the terminal `FinalEquality` step")]
    AfterTerminal,

    #[error("the plan already ends with a `FinalEquality` step")]
    DuplicateTerminal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_displays_its_message() {
        let failure = EquivalencyFailure::new(
            FailureKind::ValueMismatch,
            "total",
            "Expected member total to be 10, but found 12.",
        );
        assert_eq!(
            failure.to_string(),
            "Expected member total to be 10, but found 12."
        );
    }

    #[test]
    fn failure_converts_into_error() {
        let failure = EquivalencyFailure::new(FailureKind::CyclicReference, "next", "cycle");
        let error: EquivalencyError = failure.clone().into();
        assert!(matches!(error, EquivalencyError::Failed(f) if f == failure));
    }

    #[test]
    fn failure_report_shape() {
        let failure = EquivalencyFailure::new(FailureKind::StructuralMismatch, "items", "too short");
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["kind"], "structural_mismatch");
        assert_eq!(json["path"], "items");
        assert_eq!(json["message"], "too short");
    }

    #[test]
    fn plan_error_names_anchor() {
        let error = PlanError::AnchorNotFound(StepKind::StringEquality);
        assert_eq!(error.to_string(), "no `StringEquality` step found in the plan");
    }
}
