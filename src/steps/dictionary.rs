use crate::context::EquivalencyContext;
use crate::errors::{EquivalencyResult, FailureKind};
use crate::formatter::format_value;
use crate::validator::EquivalencyValidator;
use crate::value::Value;

use super::{EquivalencyStep, Outcome};

/// Compares maps key by key, regardless of entry order.
#[derive(Debug, Clone, Copy, Default)]
pub struct DictionaryEqualityStep;

impl EquivalencyStep for DictionaryEqualityStep {
    fn name(&self) -> &'static str {
        "DictionaryEquality"
    }

    fn can_handle(&self, context: &EquivalencyContext<'_>) -> bool {
        matches!(context.subject(), Value::Map(_))
    }

    fn handle(
        &self,
        context: &mut EquivalencyContext<'_>,
        validator: &EquivalencyValidator,
    ) -> EquivalencyResult<Outcome> {
        let Value::Map(subject) = context.subject() else {
            return Ok(Outcome::NotHandled);
        };
        let structural = context
            .verification()
            .with_kind(FailureKind::StructuralMismatch);

        let Value::Map(expectation) = context.expectation() else {
            let failure = structural.fail_with(
                "Expected {context} to be {0}{reason}, but it is a dictionary and cannot be compared with a non-dictionary type.",
                &[format_value(context.expectation())],
            );
            return Err(failure.into());
        };

        if subject.len() != expectation.len() {
            let failure = structural.fail_with(
                "Expected {context} to be a dictionary with {0} item(s){reason}, but {1} contains {2} item(s).",
                &[
                    expectation.len().to_string(),
                    format_value(context.subject()),
                    subject.len().to_string(),
                ],
            );
            return Err(failure.into());
        }

        let descend = context.is_root() || context.options().is_recursive();
        for (key, value) in subject {
            let Some((_, expected)) = expectation.iter().find(|(k, _)| k == key) else {
                let failure = structural.fail_with(
                    "Expected {context} to be {0}{reason}, but it contains unexpected key {1}.",
                    &[format_value(context.expectation()), format_value(key)],
                );
                return Err(failure.into());
            };

            if descend {
                let mut child = context.for_key(key, value.clone(), expected.clone());
                validator.assert_equality_using(&mut child)?;
            } else if value != expected {
                let failure = context.verification().fail_with(
                    "Expected {context} to be {0}{reason}, but {1} differs at key {2}.",
                    &[
                        format_value(context.expectation()),
                        format_value(context.subject()),
                        format_value(key),
                    ],
                );
                return Err(failure.into());
            }
        }

        Ok(Outcome::Handled)
    }
}
