use tracing::trace;

use crate::context::EquivalencyContext;
use crate::errors::EquivalencyResult;
use crate::validator::EquivalencyValidator;

use super::{EquivalencyStep, Outcome};

/// Runs the first applicable user override for nodes reached through a member.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssertionRuleOverrideStep;

impl EquivalencyStep for AssertionRuleOverrideStep {
    fn name(&self) -> &'static str {
        "AssertionRuleOverride"
    }

    fn can_handle(&self, context: &EquivalencyContext<'_>) -> bool {
        context.member().is_some() && !context.options().assertion_rules().is_empty()
    }

    fn handle(
        &self,
        context: &mut EquivalencyContext<'_>,
        _validator: &EquivalencyValidator,
    ) -> EquivalencyResult<Outcome> {
        for rule in context.options().assertion_rules() {
            if let Some(result) = rule.assert_equality(context) {
                trace!(path = context.path(), rule = %rule, "override applied");
                result?;
                return Ok(Outcome::Handled);
            }
        }
        Ok(Outcome::NotHandled)
    }
}
