#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-equivalency/main/assets/layered-equivalency.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-equivalency/issues/"
)]

//! Structural equivalence engine for fluent assertions.
//!
//! Decides whether two object graphs are "equivalent" under a configurable
//! policy: members are selected and matched by rules, custom per-type
//! overrides can replace the default comparison, and an ordered plan of
//! comparison steps is tried for every pair of values in the graph.
//!
//! ## Overview
//!
//! ```
//! use std::sync::Arc;
//! use layered_equivalency::{check_equivalent, check_equivalent_with, describe_object};
//!
//! struct Account {
//!     name: String,
//!     password: String,
//! }
//!
//! describe_object!(Account {
//!     pub name: String,
//!     pub password: String,
//! });
//!
//! let subject = Arc::new(Account { name: "jane".into(), password: "hunter2".into() });
//! let expectation = Arc::new(Account { name: "jane".into(), password: "secret".into() });
//!
//! assert!(check_equivalent(&subject, &expectation).is_err());
//! assert!(check_equivalent_with(&subject, &expectation, |o| o.excluding("password")).is_ok());
//! ```
//!
//! ## Modules
//!
//! - [`value`] - Dynamically-typed values and the [`ToValue`] conversion
//! - [`object`] - Type descriptors: the members an [`Object`] exposes
//! - [`member`] - Members bound to a path, and [`SubjectInfo`]
//! - [`selection`] - Rules deciding which members participate
//! - [`matching`] - Rules locating the expectation-side member
//! - [`rules`] - Per-type or per-member assertion overrides
//! - [`options`] - The configuration of one comparison run
//! - [`plan`] - The ordered, process-wide or local, list of steps
//! - [`steps`] - Built-in comparison steps
//! - [`context`] - Traversal state for one node of the graph
//! - [`validator`] - Recursive orchestration of the step plan
//! - [`verification`] - Failure reporting with subject paths
//! - [`formatter`] - Printable, truncated rendering of values
//! - [`errors`] - Error types

pub mod context;
pub mod errors;
pub mod formatter;
mod global;
pub mod matching;
pub mod member;
pub mod object;
pub mod options;
pub mod plan;
pub mod rules;
pub mod selection;
pub mod steps;
pub mod validator;
pub mod value;
pub mod verification;

pub use context::EquivalencyContext;
pub use errors::{EquivalencyError, EquivalencyFailure, EquivalencyResult, FailureKind, PlanError};
pub use formatter::format_value;
pub use matching::{MatchingRule, MustMatchByName, TryMatchByName};
pub use member::{Member, SubjectInfo};
pub use object::{MemberInfo, Object, TypeDescriptor, TypeInfo, Visibility};
pub use options::{CyclicReferenceHandling, EquivalencyOptions};
pub use plan::EquivalencyStepPlan;
pub use rules::{AssertionContext, AssertionRule, FromValue, Restriction};
pub use selection::{
    AllDeclaredPublicMembers, AllRuntimePublicMembers, ExcludeMemberByPath,
    ExcludeMemberByPredicate, IncludeMemberByPath, IncludeMemberByPredicate, SelectionContext,
    SelectionRule,
};
pub use steps::{EquivalencyStep, Outcome, Step, StepKind};
pub use validator::EquivalencyValidator;
pub use value::{EnumValue, ObjectId, ObjectRef, ToValue, Value};
pub use verification::Verification;

/// Compares `subject` against `expectation` using the process-wide default options.
pub fn check_equivalent<S, E>(subject: &S, expectation: &E) -> Result<(), EquivalencyFailure>
where
    S: ToValue + ?Sized,
    E: ToValue + ?Sized,
{
    check_equivalent_with(subject, expectation, |options| options)
}

/// Compares `subject` against `expectation`, letting `configure` adjust a copy
/// of the process-wide default options first.
pub fn check_equivalent_with<S, E, F>(
    subject: &S,
    expectation: &E,
    configure: F,
) -> Result<(), EquivalencyFailure>
where
    S: ToValue + ?Sized,
    E: ToValue + ?Sized,
    F: FnOnce(EquivalencyOptions) -> EquivalencyOptions,
{
    let options = configure(EquivalencyOptions::default());
    EquivalencyValidator::for_options(&options).assert_equality(
        subject.to_value(),
        expectation.to_value(),
        &options,
    )
}

/// Panics with the failure message unless `subject` is equivalent to `expectation`.
#[track_caller]
pub fn assert_equivalent<S, E>(subject: &S, expectation: &E)
where
    S: ToValue + ?Sized,
    E: ToValue + ?Sized,
{
    if let Err(failure) = check_equivalent(subject, expectation) {
        panic!("{}", failure);
    }
}

/// Panicking counterpart of [`check_equivalent_with`].
#[track_caller]
pub fn assert_equivalent_with<S, E, F>(subject: &S, expectation: &E, configure: F)
where
    S: ToValue + ?Sized,
    E: ToValue + ?Sized,
    F: FnOnce(EquivalencyOptions) -> EquivalencyOptions,
{
    if let Err(failure) = check_equivalent_with(subject, expectation, configure) {
        panic!("{}", failure);
    }
}

#[cfg(test)]
mod tests {
    mod collections;
    mod cycles;
    mod equivalence;
    mod failures;
    mod fixtures;
    mod members;
    mod overrides;
    mod pipeline;
}
