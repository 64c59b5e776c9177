//! Recursive orchestration of the step plan.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::context::EquivalencyContext;
use crate::errors::{EquivalencyError, EquivalencyFailure, EquivalencyResult, FailureKind};
use crate::formatter::format_value;
use crate::options::{CyclicReferenceHandling, EquivalencyOptions};
use crate::plan::EquivalencyStepPlan;
use crate::steps::Outcome;
use crate::value::Value;

/// Runs the steps of a plan against every node of an object graph.
///
/// The plan is a snapshot taken when the validator is built; edits made to
/// the process-wide plan while a comparison runs do not affect it.
#[derive(Debug, Clone)]
pub struct EquivalencyValidator {
    plan: Arc<EquivalencyStepPlan>,
}

impl EquivalencyValidator {
    pub fn new(plan: Arc<EquivalencyStepPlan>) -> Self {
        Self { plan }
    }

    /// Validator for the plan `options` selects: its own, or the process-wide one.
    pub fn for_options(options: &EquivalencyOptions) -> Self {
        Self::new(options.step_plan())
    }

    pub fn plan(&self) -> &EquivalencyStepPlan {
        &self.plan
    }

    /// Compares two graphs from the root.
    ///
    /// Anything other than a comparison failure, including a panic raised by
    /// a member getter or a custom step, is reported as a single
    /// [`FailureKind::Internal`] failure that lists the options in effect.
    pub fn assert_equality(
        &self,
        subject: Value,
        expectation: Value,
        options: &EquivalencyOptions,
    ) -> Result<(), EquivalencyFailure> {
        debug!(steps = self.plan.steps().len(), "starting equivalency comparison");

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut context = EquivalencyContext::root(subject, expectation, options);
            self.assert_equality_using(&mut context)
        }));

        let result = match outcome {
            Ok(Ok(())) => Ok(()),
            Ok(Err(EquivalencyError::Failed(failure))) => Err(failure),
            Ok(Err(error)) => Err(internal_failure(
                error.path().to_string(),
                &error.to_string(),
                options,
            )),
            Err(payload) => Err(internal_failure(
                String::new(),
                &panic_message(payload.as_ref()),
                options,
            )),
        };

        debug!(equivalent = result.is_ok(), "finished equivalency comparison");
        result
    }

    /// Compares the comparands of `context`, recursing into children through
    /// the steps that handle them.
    pub fn assert_equality_using(&self, context: &mut EquivalencyContext<'_>) -> EquivalencyResult<()> {
        if context.is_cyclic() {
            return match context.options().cyclic_reference_handling() {
                CyclicReferenceHandling::ThrowException => {
                    let failure = context
                        .verification()
                        .with_kind(FailureKind::CyclicReference)
                        .fail_with(
                            "Expected {context} to be {0}{reason}, but it contains a cyclic reference.",
                            &[format_value(context.expectation())],
                        );
                    Err(failure.into())
                }
                CyclicReferenceHandling::Ignore => {
                    debug!(path = context.path(), "ignoring cyclic reference");
                    Ok(())
                }
            };
        }

        for step in self.plan.steps() {
            let step = step.as_step();
            if !step.can_handle(context) {
                continue;
            }
            if step.handle(context, self)? == Outcome::Handled {
                trace!(path = context.path(), step = step.name(), "comparands handled");
                return Ok(());
            }
        }

        warn!(
            path = context.path(),
            "no step handled the comparands, treating them as equivalent"
        );
        Ok(())
    }
}

fn internal_failure(path: String, detail: &str, options: &EquivalencyOptions) -> EquivalencyFailure {
    EquivalencyFailure::new(
        FailureKind::Internal,
        path,
        format!(
            "Equivalency comparison aborted: {}\n\nWith configuration:\n{}",
            detail, options
        ),
    )
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic with a non-string payload".to_string()
    }
}
