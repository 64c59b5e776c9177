//! Built-in comparison steps.
//!
//! For every pair of comparands the validator asks each step of the plan, in
//! order, whether it can handle the pair. The first step that handles it
//! decides the outcome for that node; it may recurse into child nodes through
//! the validator.
//!
//! Default order:
//! 1. ReferenceEquality - same reference, or a `Null` expectation
//! 2. TryConversion - coerces the subject toward the expectation's type
//! 3. AssertionRuleOverride - user overrides for members
//! 4. StringEquality - text
//! 5. DateTimeEquality - date/times, by instant
//! 6. DictionaryEquality - maps, by key
//! 7. EnumerableEquality - sequences, by position
//! 8. ComplexTypeEquality - objects, member by member
//! 9. FinalEquality - plain equality; always last

use std::fmt;
use std::sync::Arc;

use crate::context::EquivalencyContext;
use crate::errors::EquivalencyResult;
use crate::validator::EquivalencyValidator;

mod assertion_rule;
mod complex;
mod conversion;
mod datetime;
mod dictionary;
mod enumerable;
mod final_equality;
mod reference;
mod string;

pub use assertion_rule::AssertionRuleOverrideStep;
pub use complex::ComplexTypeEqualityStep;
pub use conversion::TryConversionStep;
pub use datetime::DateTimeEqualityStep;
pub use dictionary::DictionaryEqualityStep;
pub use enumerable::EnumerableEqualityStep;
pub use final_equality::FinalEqualityStep;
pub use reference::ReferenceEqualityStep;
pub use string::StringEqualityStep;

/// Whether a step took responsibility for a pair of comparands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The pair is settled; later steps are skipped.
    Handled,
    /// Later steps are asked next.
    NotHandled,
}

/// A strategy for comparing one pair of comparands.
///
/// Steps hold no per-run state and are shared across threads.
pub trait EquivalencyStep: Send + Sync {
    /// Name used in plan anchors and log output.
    fn name(&self) -> &'static str;

    fn can_handle(&self, context: &EquivalencyContext<'_>) -> bool;

    /// Compares the comparands of `context`, recursing through `validator`
    /// for child nodes. A discrepancy is returned as an `Err`.
    fn handle(
        &self,
        context: &mut EquivalencyContext<'_>,
        validator: &EquivalencyValidator,
    ) -> EquivalencyResult<Outcome>;
}

/// An entry of a step plan.
#[derive(Clone)]
pub enum Step {
    ReferenceEquality,
    TryConversion,
    AssertionRuleOverride,
    StringEquality,
    DateTimeEquality,
    DictionaryEquality,
    EnumerableEquality,
    ComplexTypeEquality,
    FinalEquality,
    Custom(Arc<dyn EquivalencyStep>),
}

impl Step {
    pub fn custom(step: impl EquivalencyStep + 'static) -> Self {
        Step::Custom(Arc::new(step))
    }

    pub fn kind(&self) -> StepKind {
        match self {
            Step::ReferenceEquality => StepKind::ReferenceEquality,
            Step::TryConversion => StepKind::TryConversion,
            Step::AssertionRuleOverride => StepKind::AssertionRuleOverride,
            Step::StringEquality => StepKind::StringEquality,
            Step::DateTimeEquality => StepKind::DateTimeEquality,
            Step::DictionaryEquality => StepKind::DictionaryEquality,
            Step::EnumerableEquality => StepKind::EnumerableEquality,
            Step::ComplexTypeEquality => StepKind::ComplexTypeEquality,
            Step::FinalEquality => StepKind::FinalEquality,
            Step::Custom(step) => StepKind::Custom(step.name()),
        }
    }

    pub fn as_step(&self) -> &dyn EquivalencyStep {
        match self {
            Step::ReferenceEquality => &ReferenceEqualityStep,
            Step::TryConversion => &TryConversionStep,
            Step::AssertionRuleOverride => &AssertionRuleOverrideStep,
            Step::StringEquality => &StringEqualityStep,
            Step::DateTimeEquality => &DateTimeEqualityStep,
            Step::DictionaryEquality => &DictionaryEqualityStep,
            Step::EnumerableEquality => &EnumerableEqualityStep,
            Step::ComplexTypeEquality => &ComplexTypeEqualityStep,
            Step::FinalEquality => &FinalEqualityStep,
            Step::Custom(step) => step.as_ref(),
        }
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind())
    }
}

/// Identifies a step within a plan, e.g. as an anchor for insertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    ReferenceEquality,
    TryConversion,
    AssertionRuleOverride,
    StringEquality,
    DateTimeEquality,
    DictionaryEquality,
    EnumerableEquality,
    ComplexTypeEquality,
    FinalEquality,
    /// A user step, by [`EquivalencyStep::name`].
    Custom(&'static str),
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StepKind::ReferenceEquality => "ReferenceEquality",
            StepKind::TryConversion => "TryConversion",
            StepKind::AssertionRuleOverride => "AssertionRuleOverride",
            StepKind::StringEquality => "StringEquality",
            StepKind::DateTimeEquality => "DateTimeEquality",
            StepKind::DictionaryEquality => "DictionaryEquality",
            StepKind::EnumerableEquality => "EnumerableEquality",
            StepKind::ComplexTypeEquality => "ComplexTypeEquality",
            StepKind::FinalEquality => "FinalEquality",
            StepKind::Custom(name) => name,
        };
        f.write_str(name)
    }
}
