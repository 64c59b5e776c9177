//! Failure reporting with subject paths.
//!
//! A [`Verification`] carries what a failure message needs besides the
//! values themselves: the human-readable description of the node being
//! compared, its path, and the caller's "because" clause.
//!
//! Templates use three kinds of placeholders:
//!
//! - `{context}` - the description of the node, e.g. `member orders[2].total`
//! - `{reason}` - the "because" clause, or nothing when none was given
//! - `{0}`, `{1}`, ... - positional arguments, usually formatted values
//!
//! Substitution is a single pass, so braces inside arguments (formatted
//! collections, for one) are never expanded again.

use crate::errors::{EquivalencyFailure, FailureKind};

/// Failure reporter for one node of the graph.
#[derive(Debug, Clone)]
pub struct Verification {
    context: String,
    path: String,
    reason: String,
    kind: FailureKind,
}

impl Verification {
    /// Reporter describing the node as `context`. Failures default to
    /// [`FailureKind::ValueMismatch`].
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            path: String::new(),
            reason: String::new(),
            kind: FailureKind::ValueMismatch,
        }
    }

    pub fn at_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Sets the "because" clause appended wherever `{reason}` appears.
    pub fn because(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    pub fn with_kind(mut self, kind: FailureKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    /// Starts a check that fails unless `condition` holds.
    pub fn for_condition(&self, condition: bool) -> Condition<'_> {
        Condition {
            verification: self,
            succeeded: condition,
        }
    }

    /// Builds the failure for `template` unconditionally.
    pub fn fail_with(&self, template: &str, args: &[String]) -> EquivalencyFailure {
        EquivalencyFailure::new(self.kind, self.path.clone(), self.render(template, args))
    }

    fn render(&self, template: &str, args: &[String]) -> String {
        let mut output = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            output.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let Some(close) = after.find('}') else {
                output.push_str(&rest[open..]);
                return output;
            };

            let token = &after[..close];
            match self.substitute(token, args) {
                Some(replacement) => output.push_str(&replacement),
                None => {
                    output.push('{');
                    output.push_str(token);
                    output.push('}');
                }
            }
            rest = &after[close + 1..];
        }

        output.push_str(rest);
        output
    }

    fn substitute(&self, token: &str, args: &[String]) -> Option<String> {
        match token {
            "context" => Some(self.context.clone()),
            "reason" => Some(self.rendered_reason()),
            _ => token
                .parse::<usize>()
                .ok()
                .and_then(|idx| args.get(idx))
                .cloned(),
        }
    }

    fn rendered_reason(&self) -> String {
        let reason = self.reason.trim();
        if reason.is_empty() {
            String::new()
        } else if reason.to_lowercase().starts_with("because ") {
            format!(" {}", reason)
        } else {
            format!(" because {}", reason)
        }
    }
}

/// A pending check created by [`Verification::for_condition`].
#[must_use = "a condition does nothing until `fail_with` is called"]
pub struct Condition<'a> {
    verification: &'a Verification,
    succeeded: bool,
}

impl Condition<'_> {
    /// `Ok(())` when the condition held, otherwise the rendered failure.
    pub fn fail_with(self, template: &str, args: &[String]) -> Result<(), EquivalencyFailure> {
        if self.succeeded {
            Ok(())
        } else {
            Err(self.verification.fail_with(template, args))
        }
    }
}
