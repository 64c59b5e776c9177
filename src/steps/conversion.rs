use chrono::DateTime;
use tracing::debug;

use crate::context::EquivalencyContext;
use crate::errors::EquivalencyResult;
use crate::validator::EquivalencyValidator;
use crate::value::Value;

use super::{EquivalencyStep, Outcome};

// Smallest power of two outside the i64 / u64 range; `as` casts saturate at it.
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;
const U64_LIMIT: f64 = 18_446_744_073_709_551_616.0;

/// Coerces the subject toward the run-time type of the expectation.
///
/// Never settles a pair by itself: when a conversion succeeds the subject of
/// the node is replaced and the remaining steps see the converted value.
#[derive(Debug, Clone, Copy, Default)]
pub struct TryConversionStep;

impl EquivalencyStep for TryConversionStep {
    fn name(&self) -> &'static str {
        "TryConversion"
    }

    fn can_handle(&self, context: &EquivalencyContext<'_>) -> bool {
        match (
            context.subject().runtime_type(),
            context.expectation().runtime_type(),
        ) {
            (Some(subject), Some(expectation)) => subject != expectation,
            _ => false,
        }
    }

    fn handle(
        &self,
        context: &mut EquivalencyContext<'_>,
        _validator: &EquivalencyValidator,
    ) -> EquivalencyResult<Outcome> {
        if let Some(converted) = convert(context.subject(), context.expectation()) {
            debug!(
                path = context.path(),
                from = ?context.subject(),
                to = ?converted,
                "converted subject to the expectation's type"
            );
            context.set_subject(converted);
        }
        Ok(Outcome::NotHandled)
    }
}

/// Converts `subject` into the variant of `expectation`, if that is lossless.
pub(crate) fn convert(subject: &Value, expectation: &Value) -> Option<Value> {
    match (subject, expectation) {
        (Value::Int(i), Value::UInt(_)) => u64::try_from(*i).ok().map(Value::UInt),
        (Value::UInt(u), Value::Int(_)) => i64::try_from(*u).ok().map(Value::Int),
        (Value::Int(i), Value::Float(_)) => Some(Value::Float(*i as f64)),
        (Value::UInt(u), Value::Float(_)) => Some(Value::Float(*u as f64)),
        (Value::Float(f), Value::Int(_)) => {
            (is_integral(*f) && *f >= -I64_LIMIT && *f < I64_LIMIT).then(|| Value::Int(*f as i64))
        }
        (Value::Float(f), Value::UInt(_)) => {
            (is_integral(*f) && *f >= 0.0 && *f < U64_LIMIT).then(|| Value::UInt(*f as u64))
        }
        (Value::Bool(b), Value::Int(_)) => Some(Value::Int(i64::from(*b))),
        (Value::Bool(b), Value::UInt(_)) => Some(Value::UInt(u64::from(*b))),
        (Value::Int(i), Value::Bool(_)) => int_to_bool(*i),
        (Value::UInt(u), Value::Bool(_)) => i64::try_from(*u).ok().and_then(int_to_bool),
        (Value::Text(text), _) => parse_text(text.trim(), expectation),
        (_, Value::Text(_)) => scalar_to_text(subject),
        _ => None,
    }
}

fn is_integral(f: f64) -> bool {
    f.is_finite() && f.fract() == 0.0
}

fn int_to_bool(i: i64) -> Option<Value> {
    match i {
        0 => Some(Value::Bool(false)),
        1 => Some(Value::Bool(true)),
        _ => None,
    }
}

fn parse_text(text: &str, expectation: &Value) -> Option<Value> {
    match expectation {
        Value::Int(_) => text.parse().ok().map(Value::Int),
        Value::UInt(_) => text.parse().ok().map(Value::UInt),
        Value::Float(_) => text.parse().ok().map(Value::Float),
        Value::Bool(_) => match text.to_lowercase().as_str() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        Value::Char(_) => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(Value::Char(c)),
                _ => None,
            }
        }
        Value::DateTime(_) => DateTime::parse_from_rfc3339(text).ok().map(Value::DateTime),
        Value::Enum(variant) if variant.variant() == text => Some(Value::Enum(*variant)),
        _ => None,
    }
}

fn scalar_to_text(subject: &Value) -> Option<Value> {
    let text = match subject {
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::UInt(u) => u.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Char(c) => c.to_string(),
        Value::DateTime(dt) => dt.to_rfc3339(),
        Value::Enum(variant) => variant.variant().to_string(),
        _ => return None,
    };
    Some(Value::Text(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_convert_when_in_range() {
        assert_eq!(convert(&Value::Int(5), &Value::UInt(0)), Some(Value::UInt(5)));
        assert_eq!(convert(&Value::Int(-5), &Value::UInt(0)), None);
        assert_eq!(convert(&Value::UInt(u64::MAX), &Value::Int(0)), None);
        assert_eq!(convert(&Value::Int(2), &Value::Float(0.0)), Some(Value::Float(2.0)));
    }

    #[test]
    fn floats_convert_only_when_integral() {
        assert_eq!(convert(&Value::Float(3.0), &Value::Int(0)), Some(Value::Int(3)));
        assert_eq!(convert(&Value::Float(3.5), &Value::Int(0)), None);
        assert_eq!(convert(&Value::Float(-1.0), &Value::UInt(0)), None);
        assert_eq!(convert(&Value::Float(f64::NAN), &Value::Int(0)), None);
        assert_eq!(convert(&Value::Float(I64_LIMIT), &Value::Int(0)), None);
    }

    #[test]
    fn text_parses_into_scalars() {
        assert_eq!(convert(&Value::Text(" 42 ".into()), &Value::Int(0)), Some(Value::Int(42)));
        assert_eq!(convert(&Value::Text("2.5".into()), &Value::Float(0.0)), Some(Value::Float(2.5)));
        assert_eq!(convert(&Value::Text("TRUE".into()), &Value::Bool(false)), Some(Value::Bool(true)));
        assert_eq!(convert(&Value::Text("x".into()), &Value::Char('y')), Some(Value::Char('x')));
        assert_eq!(convert(&Value::Text("xy".into()), &Value::Char('y')), None);
        assert_eq!(convert(&Value::Text("abc".into()), &Value::Int(0)), None);
    }

    #[test]
    fn text_parses_into_date_times() {
        let expected = DateTime::parse_from_rfc3339("2024-01-01T00:00:00+02:00").unwrap();
        let converted = convert(
            &Value::Text("2023-12-31T22:00:00Z".into()),
            &Value::DateTime(expected),
        );
        assert_eq!(converted, Some(Value::DateTime(expected)));
        assert_eq!(convert(&Value::Text("yesterday".into()), &Value::DateTime(expected)), None);
    }

    #[test]
    fn scalars_render_as_text() {
        let text = Value::Text(String::new());
        assert_eq!(convert(&Value::Int(1), &text), Some(Value::Text("1".into())));
        assert_eq!(convert(&Value::Float(1.5), &text), Some(Value::Text("1.5".into())));
        assert_eq!(convert(&Value::Bool(true), &text), Some(Value::Text("true".into())));
        assert_eq!(convert(&Value::Sequence(Vec::new()), &text), None);
    }

    #[test]
    fn booleans_and_integers() {
        assert_eq!(convert(&Value::Bool(true), &Value::Int(0)), Some(Value::Int(1)));
        assert_eq!(convert(&Value::Int(0), &Value::Bool(true)), Some(Value::Bool(false)));
        assert_eq!(convert(&Value::Int(2), &Value::Bool(true)), None);
    }
}
