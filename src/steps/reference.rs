use crate::context::EquivalencyContext;
use crate::errors::EquivalencyResult;
use crate::formatter::format_value;
use crate::validator::EquivalencyValidator;

use super::{EquivalencyStep, Outcome};

/// Settles identical references and `Null` expectations.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceEqualityStep;

impl EquivalencyStep for ReferenceEqualityStep {
    fn name(&self) -> &'static str {
        "ReferenceEquality"
    }

    fn can_handle(&self, _context: &EquivalencyContext<'_>) -> bool {
        true
    }

    fn handle(
        &self,
        context: &mut EquivalencyContext<'_>,
        _validator: &EquivalencyValidator,
    ) -> EquivalencyResult<Outcome> {
        if context.subject().is_same_reference(context.expectation()) {
            return Ok(Outcome::Handled);
        }

        if context.expectation().is_null() {
            let failure = context.verification().fail_with(
                "Expected {context} to be <null>{reason}, but found {0}.",
                &[format_value(context.subject())],
            );
            return Err(failure.into());
        }

        Ok(Outcome::NotHandled)
    }
}
