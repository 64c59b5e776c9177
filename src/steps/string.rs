use crate::context::EquivalencyContext;
use crate::errors::EquivalencyResult;
use crate::formatter::format_value;
use crate::validator::EquivalencyValidator;
use crate::value::Value;

use super::{EquivalencyStep, Outcome};

/// Characters of the subject shown around the first difference.
const NEAR_CHARS: usize = 3;

/// Ordinal comparison of text.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringEqualityStep;

impl EquivalencyStep for StringEqualityStep {
    fn name(&self) -> &'static str {
        "StringEquality"
    }

    fn can_handle(&self, context: &EquivalencyContext<'_>) -> bool {
        matches!(context.subject(), Value::Text(_))
    }

    fn handle(
        &self,
        context: &mut EquivalencyContext<'_>,
        _validator: &EquivalencyValidator,
    ) -> EquivalencyResult<Outcome> {
        let subject = context.subject().as_text().unwrap_or_default();
        let verification = context.verification();

        let Some(expected) = context.expectation().as_text() else {
            let failure = verification.fail_with(
                "Expected {context} to be {0}{reason}, but found {1}.",
                &[
                    format_value(context.expectation()),
                    format_value(context.subject()),
                ],
            );
            return Err(failure.into());
        };

        if subject == expected {
            return Ok(Outcome::Handled);
        }

        let subject_len = subject.chars().count();
        let expected_len = expected.chars().count();
        if subject_len != expected_len {
            let failure = verification.fail_with(
                "Expected {context} to be {0} with a length of {1}{reason}, but {2} has a length of {3}.",
                &[
                    format_value(context.expectation()),
                    expected_len.to_string(),
                    format_value(context.subject()),
                    subject_len.to_string(),
                ],
            );
            return Err(failure.into());
        }

        let index = subject
            .chars()
            .zip(expected.chars())
            .position(|(s, e)| s != e)
            .unwrap_or(0);
        let near: String = subject.chars().skip(index).take(NEAR_CHARS).collect();
        let failure = verification.fail_with(
            "Expected {context} to be {0}{reason}, but {1} differs near {2} (index {3}).",
            &[
                format_value(context.expectation()),
                format_value(context.subject()),
                format_value(&Value::Text(near)),
                index.to_string(),
            ],
        );
        Err(failure.into())
    }
}
