use tracing::trace;

use crate::context::EquivalencyContext;
use crate::errors::{EquivalencyResult, FailureKind};
use crate::formatter::format_value;
use crate::member::Member;
use crate::selection::SelectionContext;
use crate::validator::EquivalencyValidator;
use crate::value::Value;

use super::{EquivalencyStep, Outcome};

/// Walks into objects and compares the selected members one by one.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComplexTypeEqualityStep;

impl EquivalencyStep for ComplexTypeEqualityStep {
    fn name(&self) -> &'static str {
        "ComplexTypeEquality"
    }

    fn can_handle(&self, context: &EquivalencyContext<'_>) -> bool {
        matches!(context.subject(), Value::Object(_))
            && (context.is_root() || context.options().is_recursive())
    }

    fn handle(
        &self,
        context: &mut EquivalencyContext<'_>,
        validator: &EquivalencyValidator,
    ) -> EquivalencyResult<Outcome> {
        let Some(subject) = context.subject().as_object() else {
            return Ok(Outcome::NotHandled);
        };
        let Some(expectation) = context.expectation().as_object() else {
            let failure = context
                .verification()
                .with_kind(FailureKind::StructuralMismatch)
                .fail_with(
                    "Expected {context} to be {0}{reason}, but found {1}.",
                    &[format_value(context.expectation()), format_value(context.subject())],
                );
            return Err(failure.into());
        };
        let options = context.options();

        let compile_time = subject.declared_descriptor();
        let runtime = subject.descriptor();
        let selection = SelectionContext {
            path: context.path(),
            compile_time: &compile_time,
            runtime: &runtime,
        };
        let members = options
            .selection_rules()
            .iter()
            .fold(Vec::new(), |candidates, rule| {
                rule.select_members(candidates, &selection)
            });

        let configuration = context.verification().with_kind(FailureKind::Configuration);
        if members.is_empty() {
            let failure = configuration.fail_with(
                "No members were found for comparison on {0}. Please specify some members to include in the comparison.",
                &[compile_time.type_info().to_string()],
            );
            return Err(failure.into());
        }

        let Some(matching) = options.matching_rules().first() else {
            let failure = configuration.fail_with(
                "No matching rule was configured for comparing members of {0}.",
                &[compile_time.type_info().to_string()],
            );
            return Err(failure.into());
        };

        let expectation_descriptor = expectation.descriptor();

        trace!(
            path = context.path(),
            type_name = %compile_time.type_info(),
            members = members.len(),
            "comparing members"
        );

        for info in members {
            let member = Member::new(info, context.path());
            let Some(expected_info) =
                matching.match_member(member.info(), &expectation_descriptor, context)?
            else {
                continue;
            };

            let subject_value = member.read(subject)?;
            let expected_value = Member::new(expected_info, context.path()).read(expectation)?;

            let mut child = context.for_member(&member, subject_value, expected_value);
            validator.assert_equality_using(&mut child)?;
        }

        Ok(Outcome::Handled)
    }
}
