//! The ordered list of comparison steps.
//!
//! There is one process-wide plan, used by every comparison whose options do
//! not carry their own. Edits to it are copy-on-write: comparisons already
//! running keep the snapshot they started with.
//!
//! A plan always ends with exactly one [`Step::FinalEquality`]. Every edit
//! operation preserves that: steps are never placed after it, a second one is
//! rejected, and it survives [`remove`](EquivalencyStepPlan::remove) and
//! [`clear`](EquivalencyStepPlan::clear).

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::{debug, warn};

use crate::errors::PlanError;
use crate::global::Global;
use crate::steps::{Step, StepKind};

static GLOBAL_PLAN: Lazy<Global<EquivalencyStepPlan>> =
    Lazy::new(|| Global::new(EquivalencyStepPlan::factory_default()));

/// An ordered list of steps, ending with [`Step::FinalEquality`].
#[derive(Debug, Clone)]
pub struct EquivalencyStepPlan {
    steps: Vec<Step>,
}

impl Default for EquivalencyStepPlan {
    fn default() -> Self {
        Self::factory_default()
    }
}

impl EquivalencyStepPlan {
    /// The built-in steps in their default order.
    pub fn factory_default() -> Self {
        Self {
            steps: vec![
                Step::ReferenceEquality,
                Step::TryConversion,
                Step::AssertionRuleOverride,
                Step::StringEquality,
                Step::DateTimeEquality,
                Step::DictionaryEquality,
                Step::EnumerableEquality,
                Step::ComplexTypeEquality,
                Step::FinalEquality,
            ],
        }
    }

    /// Snapshot of the process-wide plan.
    pub fn global() -> Arc<Self> {
        GLOBAL_PLAN.snapshot()
    }

    /// Edits the process-wide plan. `edit` works on a private copy that is
    /// swapped in when it returns; no lock is held while it runs, so it may
    /// read [`global`](Self::global). A nested `update_global` made from
    /// inside `edit` is superseded by this one.
    ///
    /// ```
    /// use layered_equivalency::{EquivalencyStepPlan, StepKind};
    ///
    /// EquivalencyStepPlan::update_global(|plan| plan.remove(StepKind::TryConversion));
    /// assert!(!EquivalencyStepPlan::global().kinds().contains(&StepKind::TryConversion));
    /// EquivalencyStepPlan::reset_global();
    /// ```
    pub fn update_global<R>(edit: impl FnOnce(&mut Self) -> R) -> R {
        let result = GLOBAL_PLAN.update(edit);
        debug!(plan = %GLOBAL_PLAN.snapshot(), "global step plan updated");
        result
    }

    /// Restores the built-in plan process-wide.
    pub fn reset_global() {
        GLOBAL_PLAN.replace(Self::factory_default());
        debug!("global step plan reset");
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn kinds(&self) -> Vec<StepKind> {
        self.steps.iter().map(Step::kind).collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Places `step` first.
    pub fn insert(&mut self, step: Step) -> Result<(), PlanError> {
        reject_terminal(&step)?;
        self.steps.insert(0, step);
        Ok(())
    }

    /// Places `step` immediately before the first step of kind `anchor`.
    pub fn insert_before(&mut self, anchor: StepKind, step: Step) -> Result<(), PlanError> {
        reject_terminal(&step)?;
        let idx = self.position(anchor)?;
        self.steps.insert(idx, step);
        Ok(())
    }

    /// Places `step` immediately after the first step of kind `anchor`.
    pub fn insert_after(&mut self, anchor: StepKind, step: Step) -> Result<(), PlanError> {
        if anchor == StepKind::FinalEquality {
            warn!(step = %step.kind(), "rejected insertion after the terminal step");
            return Err(PlanError::AfterTerminal);
        }
        reject_terminal(&step)?;
        let idx = self.position(anchor)?;
        self.steps.insert(idx + 1, step);
        Ok(())
    }

    /// Appends `step` just before the terminal step.
    pub fn add(&mut self, step: Step) -> Result<(), PlanError> {
        reject_terminal(&step)?;
        let idx = match self.steps.last() {
            Some(last) if last.kind() == StepKind::FinalEquality => self.steps.len() - 1,
            _ => self.steps.len(),
        };
        self.steps.insert(idx, step);
        Ok(())
    }

    /// Removes every step of kind `kind`; returns whether any was removed.
    /// The terminal step is never removed.
    pub fn remove(&mut self, kind: StepKind) -> bool {
        if kind == StepKind::FinalEquality {
            warn!("the terminal step cannot be removed");
            return false;
        }

        let before = self.steps.len();
        self.steps.retain(|step| step.kind() != kind);
        let removed = self.steps.len() != before;
        if !removed {
            warn!(step = %kind, "no step to remove");
        }
        removed
    }

    /// Removes every step except the terminal one.
    pub fn clear(&mut self) {
        self.steps.retain(|step| step.kind() == StepKind::FinalEquality);
    }

    /// Restores the built-in steps.
    pub fn reset(&mut self) {
        *self = Self::factory_default();
    }

    fn position(&self, anchor: StepKind) -> Result<usize, PlanError> {
        self.steps
            .iter()
            .position(|step| step.kind() == anchor)
            .ok_or_else(|| {
                warn!(anchor = %anchor, "anchor step not found in plan");
                PlanError::AnchorNotFound(anchor)
            })
    }
}

fn reject_terminal(step: &Step) -> Result<(), PlanError> {
    if step.kind() == StepKind::FinalEquality {
        warn!("rejected a second terminal step");
        return Err(PlanError::DuplicateTerminal);
    }
    Ok(())
}

impl fmt::Display for EquivalencyStepPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, step) in self.steps.iter().enumerate() {
            if idx > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{}", step.kind())?;
        }
        Ok(())
    }
}
