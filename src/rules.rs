//! Per-type and per-member assertion overrides.
//!
//! An override replaces the remaining steps for the members it applies to:
//!
//! ```
//! use std::sync::Arc;
//! use layered_equivalency::{check_equivalent_with, describe_object};
//!
//! struct Measurement {
//!     value: f64,
//! }
//!
//! describe_object!(Measurement { pub value: f64 });
//!
//! let subject = Arc::new(Measurement { value: 0.3333 });
//! let expectation = Arc::new(Measurement { value: 0.33 });
//!
//! let result = check_equivalent_with(&subject, &expectation, |options| {
//!     options
//!         .using::<f64>(|ctx| ctx.be_approximately(0.01))
//!         .when_type_is::<f64>()
//! });
//! assert!(result.is_ok());
//! ```

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};

use crate::context::EquivalencyContext;
use crate::errors::EquivalencyFailure;
use crate::formatter::format_value;
use crate::member::{normalize, SubjectInfo};
use crate::object::TypeInfo;
use crate::options::EquivalencyOptions;
use crate::selection::MemberPredicate;
use crate::value::{EnumValue, ObjectRef, ToValue, Value};
use crate::verification::Verification;

/// Extraction of a typed value out of a [`Value`].
///
/// Extraction is strict: a rule for `f64` does not apply to an integer
/// comparand. Values that reach an override have already gone through
/// subject conversion, so mixed pairs are rare.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl FromValue for u64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::UInt(u) => Some(*u),
            _ => None,
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl FromValue for char {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Char(c) => Some(*c),
            _ => None,
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_text().map(str::to_owned)
    }
}

impl FromValue for DateTime<FixedOffset> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::DateTime(dt) => Some(dt.with_timezone(&Utc)),
            _ => None,
        }
    }
}

impl FromValue for EnumValue {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Enum(e) => Some(*e),
            _ => None,
        }
    }
}

impl FromValue for ObjectRef {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_object().cloned()
    }
}

/// The comparands handed to an override action.
pub struct AssertionContext<T> {
    pub subject: T,
    pub expectation: T,
    info: SubjectInfo,
    verification: Verification,
}

impl<T> AssertionContext<T> {
    pub fn new(subject: T, expectation: T, info: SubjectInfo, verification: Verification) -> Self {
        Self {
            subject,
            expectation,
            info,
            verification,
        }
    }

    pub fn subject_info(&self) -> &SubjectInfo {
        &self.info
    }

    pub fn path(&self) -> &str {
        &self.info.path
    }

    /// Reporter for the node, with the caller's reason already attached.
    pub fn verification(&self) -> &Verification {
        &self.verification
    }

    /// Fails with `template` unless `condition` holds.
    pub fn fail_unless(
        &self,
        condition: bool,
        template: &str,
        args: &[String],
    ) -> Result<(), EquivalencyFailure> {
        self.verification.for_condition(condition).fail_with(template, args)
    }
}

impl AssertionContext<f64> {
    /// Passes when the comparands differ by at most `precision`.
    pub fn be_approximately(&self, precision: f64) -> Result<(), EquivalencyFailure> {
        let difference = (self.subject - self.expectation).abs();
        self.fail_unless(
            difference <= precision,
            "Expected {context} to approximate {0} +/- {1}{reason}, but {2} differed by {3}.",
            &[
                format_value(&Value::Float(self.expectation)),
                format_value(&Value::Float(precision)),
                format_value(&Value::Float(self.subject)),
                format_value(&Value::Float(difference)),
            ],
        )
    }
}

impl AssertionContext<DateTime<FixedOffset>> {
    /// Passes when the comparands are at most `precision` apart, in either
    /// direction. Compared at millisecond resolution.
    pub fn be_close_to(&self, precision: chrono::Duration) -> Result<(), EquivalencyFailure> {
        let distance = self
            .subject
            .signed_duration_since(self.expectation)
            .num_milliseconds()
            .abs();
        self.fail_unless(
            distance <= precision.num_milliseconds(),
            "Expected {context} to be within {0}ms from {1}{reason}, but {2} was off by {3}ms.",
            &[
                precision.num_milliseconds().to_string(),
                format_value(&self.expectation.to_value()),
                format_value(&self.subject.to_value()),
                distance.to_string(),
            ],
        )
    }
}

/// Action run by a typed override.
pub type AssertionAction<T> =
    Arc<dyn Fn(&AssertionContext<T>) -> Result<(), EquivalencyFailure> + Send + Sync>;

/// A rule that may take over the comparison of a node reached through a member.
pub trait AssertionRule: fmt::Display + Send + Sync {
    /// `None` when the rule does not apply, otherwise the outcome of the
    /// rule's assertion.
    fn assert_equality(
        &self,
        context: &EquivalencyContext<'_>,
    ) -> Option<Result<(), EquivalencyFailure>>;
}

/// An override for comparands of type `T` that satisfy a predicate.
pub struct TypedAssertionRule<T> {
    predicate: MemberPredicate,
    action: AssertionAction<T>,
    description: String,
}

impl<T> TypedAssertionRule<T> {
    pub fn new(
        predicate: MemberPredicate,
        action: AssertionAction<T>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            predicate,
            action,
            description: description.into(),
        }
    }
}

impl<T: FromValue> AssertionRule for TypedAssertionRule<T> {
    fn assert_equality(
        &self,
        context: &EquivalencyContext<'_>,
    ) -> Option<Result<(), EquivalencyFailure>> {
        let info = context.subject_info();
        if !(self.predicate)(&info) {
            return None;
        }

        let subject = T::from_value(context.subject())?;
        let expectation = T::from_value(context.expectation())?;
        let assertion = AssertionContext::new(subject, expectation, info, context.verification());
        Some((self.action)(&assertion))
    }
}

impl<T> fmt::Display for TypedAssertionRule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

/// Builder returned by [`EquivalencyOptions::using`]; the override is only
/// registered once a condition is attached.
#[must_use = "call `when`, `when_type_is` or `when_path_is` to register the override"]
pub struct Restriction<T> {
    options: EquivalencyOptions,
    action: AssertionAction<T>,
}

impl<T> Restriction<T>
where
    T: FromValue + 'static,
{
    pub(crate) fn new(options: EquivalencyOptions, action: AssertionAction<T>) -> Self {
        Self { options, action }
    }

    /// Applies the action to members matching `predicate`.
    pub fn when<P>(self, predicate: P) -> EquivalencyOptions
    where
        P: Fn(&SubjectInfo) -> bool + Send + Sync + 'static,
    {
        let description = format!(
            "Invoke action for {} when a predicate matches",
            TypeInfo::of::<T>()
        );
        self.register(Arc::new(predicate), description)
    }

    /// Applies the action to members whose declared or run-time type is `M`.
    pub fn when_type_is<M: ?Sized + 'static>(self) -> EquivalencyOptions {
        let description = format!(
            "Invoke action for {} when type is {}",
            TypeInfo::of::<T>(),
            TypeInfo::of::<M>()
        );
        self.register(Arc::new(|info: &SubjectInfo| info.is_type::<M>()), description)
    }

    /// Applies the action to the member at `path`. A leading `[n]` segment
    /// of the member's path is ignored, as for exclusions.
    pub fn when_path_is(self, path: impl Into<String>) -> EquivalencyOptions {
        let path = path.into();
        let description = format!("Invoke action for {} at {}", TypeInfo::of::<T>(), path);
        self.register(
            Arc::new(move |info: &SubjectInfo| normalize(&info.path) == path),
            description,
        )
    }

    fn register(self, predicate: MemberPredicate, description: String) -> EquivalencyOptions {
        let rule = TypedAssertionRule::new(predicate, self.action, description);
        self.options.with_assertion_rule(Arc::new(rule))
    }
}
