use crate::context::EquivalencyContext;
use crate::errors::{EquivalencyResult, FailureKind};
use crate::formatter::format_value;
use crate::validator::EquivalencyValidator;
use crate::value::Value;

use super::{EquivalencyStep, Outcome};

/// Compares sequences item by item, in order.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnumerableEqualityStep;

impl EquivalencyStep for EnumerableEqualityStep {
    fn name(&self) -> &'static str {
        "EnumerableEquality"
    }

    fn can_handle(&self, context: &EquivalencyContext<'_>) -> bool {
        matches!(context.subject(), Value::Sequence(_))
    }

    fn handle(
        &self,
        context: &mut EquivalencyContext<'_>,
        validator: &EquivalencyValidator,
    ) -> EquivalencyResult<Outcome> {
        let Value::Sequence(subject) = context.subject() else {
            return Ok(Outcome::NotHandled);
        };
        let structural = context
            .verification()
            .with_kind(FailureKind::StructuralMismatch);

        let Value::Sequence(expectation) = context.expectation() else {
            let failure = structural.fail_with(
                "Expected {context} to be {0}{reason}, but it is a collection and cannot be compared with a non-collection type.",
                &[format_value(context.expectation())],
            );
            return Err(failure.into());
        };

        if subject.len() != expectation.len() {
            let (difference, direction) = if subject.len() < expectation.len() {
                (expectation.len() - subject.len(), "less")
            } else {
                (subject.len() - expectation.len(), "more")
            };
            let failure = structural.fail_with(
                "Expected {context} to be a collection with {0} item(s){reason}, but {1} contains {2} item(s) {3} than {4}.",
                &[
                    expectation.len().to_string(),
                    format_value(context.subject()),
                    difference.to_string(),
                    direction.to_string(),
                    format_value(context.expectation()),
                ],
            );
            return Err(failure.into());
        }

        if context.is_root() || context.options().is_recursive() {
            for (idx, (item, expected)) in subject.iter().zip(expectation).enumerate() {
                let mut child = context.for_index(idx, item.clone(), expected.clone());
                validator.assert_equality_using(&mut child)?;
            }
            return Ok(Outcome::Handled);
        }

        if let Some(idx) = subject.iter().zip(expectation).position(|(s, e)| s != e) {
            let failure = context.verification().fail_with(
                "Expected {context} to be equal to {0}{reason}, but {1} differs at index {2}.",
                &[
                    format_value(context.expectation()),
                    format_value(context.subject()),
                    idx.to_string(),
                ],
            );
            return Err(failure.into());
        }

        Ok(Outcome::Handled)
    }
}
