//! Process-wide defaults and the process-wide step plan.
//!
//! Every test here mutates global state, so they hold `SERIAL` for their
//! whole duration and restore the built-in defaults before releasing it.

use std::sync::Arc;

use parking_lot::{const_mutex, Mutex, MutexGuard};

use layered_equivalency::{
    check_equivalent, check_equivalent_with, describe_object, EquivalencyContext,
    EquivalencyOptions, EquivalencyResult, EquivalencyStep, EquivalencyStepPlan,
    EquivalencyValidator, Outcome, Step, StepKind, Value,
};

static SERIAL: Mutex<()> = const_mutex(());

/// Holds the global-state lock; restores the built-in defaults on drop,
/// before the lock is released.
struct Serial(#[allow(dead_code)] MutexGuard<'static, ()>);

impl Drop for Serial {
    fn drop(&mut self) {
        EquivalencyOptions::reset_global_defaults();
        EquivalencyStepPlan::reset_global();
    }
}

fn serial() -> Serial {
    let guard = SERIAL.lock();
    EquivalencyOptions::reset_global_defaults();
    EquivalencyStepPlan::reset_global();
    Serial(guard)
}

struct Reading {
    sensor: String,
    value: f64,
}

describe_object!(Reading {
    pub sensor: String,
    pub value: f64,
});

fn reading(sensor: &str, value: f64) -> Arc<Reading> {
    Arc::new(Reading {
        sensor: sensor.to_string(),
        value,
    })
}

struct Lowercase;

impl EquivalencyStep for Lowercase {
    fn name(&self) -> &'static str {
        "Lowercase"
    }

    fn can_handle(&self, context: &EquivalencyContext<'_>) -> bool {
        matches!(context.subject(), Value::Text(_))
    }

    fn handle(
        &self,
        context: &mut EquivalencyContext<'_>,
        _validator: &EquivalencyValidator,
    ) -> EquivalencyResult<Outcome> {
        if let Some(text) = context.subject().as_text() {
            let lowered = Value::Text(text.to_lowercase());
            context.set_subject(lowered);
        }
        Ok(Outcome::NotHandled)
    }
}

struct Inert;

impl EquivalencyStep for Inert {
    fn name(&self) -> &'static str {
        "Inert"
    }

    fn can_handle(&self, _context: &EquivalencyContext<'_>) -> bool {
        false
    }

    fn handle(
        &self,
        _context: &mut EquivalencyContext<'_>,
        _validator: &EquivalencyValidator,
    ) -> EquivalencyResult<Outcome> {
        Ok(Outcome::NotHandled)
    }
}

#[test]
fn global_tolerance_policy() {
    let _serial = serial();
    let subject = reading("t1", 0.3333);
    let expectation = reading("t1", 0.33);
    assert!(check_equivalent(&subject, &expectation).is_err());

    EquivalencyOptions::set_global_defaults(|options| {
        options
            .using::<f64>(|ctx| ctx.be_approximately(0.01))
            .when_type_is::<f64>()
    });
    assert!(check_equivalent(&subject, &expectation).is_ok());

    EquivalencyOptions::reset_global_defaults();
    assert!(check_equivalent(&subject, &expectation).is_err());
}

#[test]
fn options_are_copied_from_the_defaults() {
    let _serial = serial();
    let before = EquivalencyOptions::default();

    EquivalencyOptions::set_global_defaults(|options| options.excluding_missing_members());

    assert!(before.to_string().contains("Match members by name (or fail)"));
    assert!(EquivalencyOptions::default()
        .to_string()
        .contains("Match members by name (or ignore)"));
}

#[test]
fn configure_may_read_and_nest_global_updates() {
    let _serial = serial();
    EquivalencyOptions::set_global_defaults(|options| {
        assert!(EquivalencyOptions::default()
            .to_string()
            .contains("Match members by name (or fail)"));
        EquivalencyOptions::set_global_defaults(|inner| inner.excluding("sensor"));
        options.excluding("value")
    });

    let defaults = EquivalencyOptions::default().to_string();
    assert!(defaults.contains("Exclude member value"));
    assert!(!defaults.contains("Exclude member sensor"));

    let removed = EquivalencyStepPlan::update_global(|plan| {
        let before = EquivalencyStepPlan::global().len();
        EquivalencyStepPlan::update_global(|inner| inner.clear());
        plan.remove(StepKind::TryConversion);
        before
    });
    assert_eq!(removed, 9);
    assert_eq!(EquivalencyStepPlan::global().len(), 8);
}

#[test]
fn caller_configuration_layers_on_global_defaults() {
    let _serial = serial();
    EquivalencyOptions::set_global_defaults(|options| options.excluding("value"));

    let subject = reading("t1", 1.0);
    let expectation = reading("t2", 2.0);
    let failure = check_equivalent(&subject, &expectation).unwrap_err();
    assert_eq!(failure.path, "sensor");

    assert!(check_equivalent_with(&subject, &expectation, |o| o.excluding("sensor")).is_ok());
}

#[test]
fn global_plan_edits_apply_to_later_comparisons() {
    let _serial = serial();
    assert!(check_equivalent(&"ABC", &"abc").is_err());

    EquivalencyStepPlan::update_global(|plan| {
        plan.insert_before(StepKind::StringEquality, Step::custom(Lowercase))
    })
    .unwrap();
    assert!(check_equivalent(&"ABC", &"abc").is_ok());

    EquivalencyStepPlan::reset_global();
    assert!(check_equivalent(&"ABC", &"abc").is_err());
}

#[test]
fn local_plan_ignores_global_edits() {
    let _serial = serial();
    let local = EquivalencyStepPlan::factory_default();
    EquivalencyStepPlan::update_global(|plan| {
        plan.insert_before(StepKind::StringEquality, Step::custom(Lowercase))
    })
    .unwrap();

    assert!(check_equivalent(&"ABC", &"abc").is_ok());
    assert!(check_equivalent_with(&"ABC", &"abc", |o| o.with_step_plan(local)).is_err());
}

#[test]
fn parallel_comparisons_against_the_global_plan() {
    let _serial = serial();
    let subject = reading("t1", 1.5);
    let expectation = reading("t1", 1.5);
    let different = reading("t1", 2.5);

    std::thread::scope(|scope| {
        scope.spawn(|| {
            for _ in 0..200 {
                EquivalencyStepPlan::update_global(|plan| plan.add(Step::custom(Inert))).unwrap();
                EquivalencyStepPlan::update_global(|plan| plan.remove(StepKind::Custom("Inert")));
            }
        });

        for _ in 0..8 {
            scope.spawn(|| {
                for i in 0..1_250 {
                    if i % 10 == 0 {
                        assert!(check_equivalent(&subject, &different).is_err());
                    } else {
                        assert!(check_equivalent(&subject, &expectation).is_ok());
                    }
                }
            });
        }
    });

    assert_eq!(EquivalencyStepPlan::global().len(), 9);
}
