use crate::context::EquivalencyContext;
use crate::errors::EquivalencyResult;
use crate::formatter::format_value;
use crate::validator::EquivalencyValidator;

use super::{EquivalencyStep, Outcome};

/// Terminal step: plain equality of the comparands.
#[derive(Debug, Clone, Copy, Default)]
pub struct FinalEqualityStep;

impl EquivalencyStep for FinalEqualityStep {
    fn name(&self) -> &'static str {
        "FinalEquality"
    }

    fn can_handle(&self, _context: &EquivalencyContext<'_>) -> bool {
        true
    }

    fn handle(
        &self,
        context: &mut EquivalencyContext<'_>,
        _validator: &EquivalencyValidator,
    ) -> EquivalencyResult<Outcome> {
        context
            .verification()
            .for_condition(context.subject() == context.expectation())
            .fail_with(
                "Expected {context} to be {0}{reason}, but found {1}.",
                &[
                    format_value(context.expectation()),
                    format_value(context.subject()),
                ],
            )?;
        Ok(Outcome::Handled)
    }
}
