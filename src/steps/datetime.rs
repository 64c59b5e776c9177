use crate::context::EquivalencyContext;
use crate::errors::EquivalencyResult;
use crate::formatter::format_value;
use crate::validator::EquivalencyValidator;
use crate::value::Value;

use super::{EquivalencyStep, Outcome};

/// Compares date/times by the instant they denote, whatever their offsets.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimeEqualityStep;

impl EquivalencyStep for DateTimeEqualityStep {
    fn name(&self) -> &'static str {
        "DateTimeEquality"
    }

    fn can_handle(&self, context: &EquivalencyContext<'_>) -> bool {
        matches!(context.subject(), Value::DateTime(_))
    }

    fn handle(
        &self,
        context: &mut EquivalencyContext<'_>,
        _validator: &EquivalencyValidator,
    ) -> EquivalencyResult<Outcome> {
        let equal = match (context.subject(), context.expectation()) {
            (Value::DateTime(subject), Value::DateTime(expectation)) => subject == expectation,
            _ => false,
        };

        context.verification().for_condition(equal).fail_with(
            "Expected {context} to be {0}{reason}, but found {1}.",
            &[
                format_value(context.expectation()),
                format_value(context.subject()),
            ],
        )?;
        Ok(Outcome::Handled)
    }
}
