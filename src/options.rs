//! The configuration of one comparison run.
//!
//! Every top-level comparison starts from a copy of the process-wide
//! defaults, adjusted by the caller through the consuming builders below.
//! The options are not modified while the graph is being walked.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::EquivalencyFailure;
use crate::global::Global;
use crate::matching::{MatchingRule, MustMatchByName, TryMatchByName};
use crate::member::SubjectInfo;
use crate::plan::EquivalencyStepPlan;
use crate::rules::{AssertionContext, AssertionRule, FromValue, Restriction};
use crate::selection::{
    AllDeclaredPublicMembers, AllRuntimePublicMembers, ExcludeMemberByPath,
    ExcludeMemberByPredicate, IncludeMemberByPath, IncludeMemberByPredicate, SelectionRule,
};

static GLOBAL_DEFAULTS: Lazy<Global<EquivalencyOptions>> =
    Lazy::new(|| Global::new(EquivalencyOptions::factory_default()));

/// What to do when a subject refers back to one of its own ancestors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclicReferenceHandling {
    /// Fail the comparison.
    #[default]
    ThrowException,
    /// Treat the repeated node as equivalent and stop descending.
    Ignore,
}

/// Options for a structural comparison.
#[derive(Clone)]
pub struct EquivalencyOptions {
    selection_rules: Vec<Arc<dyn SelectionRule>>,
    matching_rules: Vec<Arc<dyn MatchingRule>>,
    /// Most recently registered first.
    assertion_rules: Vec<Arc<dyn AssertionRule>>,
    recurse: bool,
    cyclic_reference_handling: CyclicReferenceHandling,
    steps: Option<Arc<EquivalencyStepPlan>>,
    because: String,
}

impl Default for EquivalencyOptions {
    /// A copy of the current process-wide defaults.
    fn default() -> Self {
        GLOBAL_DEFAULTS.snapshot().as_ref().clone()
    }
}

impl EquivalencyOptions {
    /// The built-in defaults: all declared public members, matched by name
    /// (or fail), nested objects compared structurally, cycles rejected.
    pub fn factory_default() -> Self {
        Self {
            selection_rules: vec![Arc::new(AllDeclaredPublicMembers)],
            matching_rules: vec![Arc::new(MustMatchByName)],
            assertion_rules: Vec::new(),
            recurse: true,
            cyclic_reference_handling: CyclicReferenceHandling::ThrowException,
            steps: None,
            because: String::new(),
        }
    }

    /// Replaces the process-wide defaults with `configure` applied to the
    /// current ones. Comparisons already running keep their copy.
    ///
    /// `configure` runs without holding the defaults' lock, so it may read
    /// them; a nested `set_global_defaults` call made from inside it is
    /// superseded by this one.
    pub fn set_global_defaults<F>(configure: F)
    where
        F: FnOnce(EquivalencyOptions) -> EquivalencyOptions,
    {
        GLOBAL_DEFAULTS.update(|options| *options = configure(options.clone()));
        debug!(options = %GLOBAL_DEFAULTS.snapshot(), "global equivalency defaults updated");
    }

    /// Restores the built-in defaults process-wide.
    pub fn reset_global_defaults() {
        GLOBAL_DEFAULTS.replace(Self::factory_default());
        debug!("global equivalency defaults reset");
    }

    // Member selection

    /// Excludes the member at `path`, e.g. `"orders.total"`.
    pub fn excluding(mut self, path: impl Into<String>) -> Self {
        self.selection_rules
            .push(Arc::new(ExcludeMemberByPath::new(path)));
        self
    }

    /// Excludes every member matching `predicate`.
    pub fn excluding_where<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&SubjectInfo) -> bool + Send + Sync + 'static,
    {
        self.selection_rules
            .push(Arc::new(ExcludeMemberByPredicate::new(Arc::new(predicate))));
        self
    }

    /// Includes the member at `path`, even if an earlier rule excluded it.
    pub fn including(mut self, path: impl Into<String>) -> Self {
        self.selection_rules
            .push(Arc::new(IncludeMemberByPath::new(path)));
        self
    }

    pub fn including_where<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&SubjectInfo) -> bool + Send + Sync + 'static,
    {
        self.selection_rules
            .push(Arc::new(IncludeMemberByPredicate::new(Arc::new(predicate))));
        self
    }

    /// Compares the members declared on the compile-time type. Replaces any
    /// selection rule registered so far.
    pub fn including_all_declared_members(mut self) -> Self {
        self.selection_rules.clear();
        self.selection_rules.push(Arc::new(AllDeclaredPublicMembers));
        self
    }

    /// Compares the members of the run-time type. Replaces any selection rule
    /// registered so far.
    pub fn including_all_runtime_members(mut self) -> Self {
        self.selection_rules.clear();
        self.selection_rules.push(Arc::new(AllRuntimePublicMembers));
        self
    }

    /// Starts member selection from scratch; follow with `including*`.
    pub fn without_selection_rules(mut self) -> Self {
        self.selection_rules.clear();
        self
    }

    pub fn with_selection_rule(mut self, rule: Arc<dyn SelectionRule>) -> Self {
        self.selection_rules.push(rule);
        self
    }

    // Member matching

    /// Skips subject members that the expectation does not have.
    pub fn excluding_missing_members(self) -> Self {
        self.with_matching_rule(Arc::new(TryMatchByName))
    }

    /// Fails on subject members that the expectation does not have.
    pub fn with_strict_matching(self) -> Self {
        self.with_matching_rule(Arc::new(MustMatchByName))
    }

    /// Replaces the active matching rule.
    pub fn with_matching_rule(mut self, rule: Arc<dyn MatchingRule>) -> Self {
        self.matching_rules.clear();
        self.matching_rules.push(rule);
        self
    }

    // Overrides

    /// Starts an override for comparands of type `T`. The returned
    /// [`Restriction`] registers it once a condition is attached.
    pub fn using<T>(
        self,
        action: impl Fn(&AssertionContext<T>) -> Result<(), EquivalencyFailure> + Send + Sync + 'static,
    ) -> Restriction<T>
    where
        T: FromValue + 'static,
    {
        Restriction::new(self, Arc::new(action))
    }

    /// Registers `rule` ahead of every override registered before it.
    pub fn with_assertion_rule(mut self, rule: Arc<dyn AssertionRule>) -> Self {
        self.assertion_rules.insert(0, rule);
        self
    }

    // Traversal

    pub fn including_nested_objects(mut self) -> Self {
        self.recurse = true;
        self
    }

    /// Compares nested objects and collection items with plain equality
    /// instead of walking into them.
    pub fn excluding_nested_objects(mut self) -> Self {
        self.recurse = false;
        self
    }

    pub fn ignoring_cyclic_references(mut self) -> Self {
        self.cyclic_reference_handling = CyclicReferenceHandling::Ignore;
        self
    }

    pub fn throwing_on_cyclic_references(mut self) -> Self {
        self.cyclic_reference_handling = CyclicReferenceHandling::ThrowException;
        self
    }

    /// Reason appended to failure messages, e.g. `"totals are rounded"`.
    pub fn because(mut self, reason: impl Into<String>) -> Self {
        self.because = reason.into();
        self
    }

    /// Uses `plan` for this comparison instead of the process-wide plan.
    pub fn with_step_plan(mut self, plan: EquivalencyStepPlan) -> Self {
        self.steps = Some(Arc::new(plan));
        self
    }

    // Accessors

    pub fn selection_rules(&self) -> &[Arc<dyn SelectionRule>] {
        &self.selection_rules
    }

    pub fn matching_rules(&self) -> &[Arc<dyn MatchingRule>] {
        &self.matching_rules
    }

    pub fn assertion_rules(&self) -> &[Arc<dyn AssertionRule>] {
        &self.assertion_rules
    }

    pub fn is_recursive(&self) -> bool {
        self.recurse
    }

    pub fn cyclic_reference_handling(&self) -> CyclicReferenceHandling {
        self.cyclic_reference_handling
    }

    /// The caller-local plan, or a snapshot of the process-wide one.
    pub fn step_plan(&self) -> Arc<EquivalencyStepPlan> {
        match &self.steps {
            Some(plan) => Arc::clone(plan),
            None => EquivalencyStepPlan::global(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.because
    }
}

impl fmt::Display for EquivalencyOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rule in &self.selection_rules {
            writeln!(f, "- {}", rule)?;
        }
        for rule in &self.matching_rules {
            writeln!(f, "- {}", rule)?;
        }
        for rule in &self.assertion_rules {
            writeln!(f, "- {}", rule)?;
        }
        if self.recurse {
            writeln!(f, "- Recurse into nested objects")?;
        } else {
            writeln!(f, "- Compare nested objects by equality")?;
        }
        match self.cyclic_reference_handling {
            CyclicReferenceHandling::ThrowException => write!(f, "- Throw on cyclic references"),
            CyclicReferenceHandling::Ignore => write!(f, "- Ignore cyclic references"),
        }
    }
}

impl fmt::Debug for EquivalencyOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
