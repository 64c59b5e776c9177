//! Dynamically-typed values compared by the engine.
//!
//! A [`Value`] is what a member getter hands back: a scalar, a sequence, a
//! map, or a shared reference to an [`Object`]. Only object references have
//! identity; everything else is compared by value.

use std::any::Any;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;
use std::hash::BuildHasher;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Offset, TimeZone};

use crate::formatter::format_value;
use crate::object::{Object, TypeDescriptor, TypeInfo};

/// A value taking part in an equivalency comparison.
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Char(char),
    Text(String),
    DateTime(DateTime<FixedOffset>),
    Enum(EnumValue),
    Sequence(Vec<Value>),
    /// Key/value pairs; keys are unique under `Value` equality.
    Map(Vec<(Value, Value)>),
    Object(ObjectRef),
}

impl Value {
    /// Wraps `object` in a new shared reference.
    pub fn object<T: Object>(object: T) -> Self {
        Value::Object(ObjectRef::new(Arc::new(object)))
    }

    pub fn from_object(object: Arc<dyn Object>) -> Self {
        Value::Object(ObjectRef::new(object))
    }

    /// The `variant` of enum type `E`.
    pub fn variant<E: 'static>(variant: &'static str) -> Self {
        Value::Enum(EnumValue::new::<E>(variant))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Identity of the referenced object, if this is an object reference.
    pub fn object_id(&self) -> Option<ObjectId> {
        self.as_object().map(ObjectRef::id)
    }

    /// `true` when both values are `Null` or reference the same object.
    pub fn is_same_reference(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Object(a), Value::Object(b)) => a.id() == b.id(),
            _ => false,
        }
    }

    /// Run-time type; `None` for `Null`.
    pub fn runtime_type(&self) -> Option<TypeInfo> {
        let info = match self {
            Value::Null => return None,
            Value::Bool(_) => TypeInfo::of::<bool>(),
            Value::Int(_) => TypeInfo::of::<i64>(),
            Value::UInt(_) => TypeInfo::of::<u64>(),
            Value::Float(_) => TypeInfo::of::<f64>(),
            Value::Char(_) => TypeInfo::of::<char>(),
            Value::Text(_) => TypeInfo::of::<String>(),
            Value::DateTime(_) => TypeInfo::of::<DateTime<FixedOffset>>(),
            Value::Enum(value) => value.type_info(),
            Value::Sequence(_) => TypeInfo::of::<Vec<Value>>(),
            Value::Map(_) => TypeInfo::of::<BTreeMap<Value, Value>>(),
            Value::Object(object) => object.type_info(),
        };
        Some(info)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::UInt(a), Value::UInt(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::Sequence(a), Value::Sequence(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(key, value)| b.iter().any(|(k, v)| k == key && v == value))
            }
            (Value::Object(a), Value::Object(b)) => {
                a.id() == b.id() || a.as_object().equals(b.as_object())
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_value(self))
    }
}

/// A variant of a fieldless enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumValue {
    type_info: TypeInfo,
    variant: &'static str,
}

impl EnumValue {
    pub fn new<E: 'static>(variant: &'static str) -> Self {
        Self {
            type_info: TypeInfo::of::<E>(),
            variant,
        }
    }

    pub fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    pub fn variant(&self) -> &'static str {
        self.variant
    }
}

/// Address of a shared object, used for reference identity and cycle detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(usize);

/// A shared reference to an [`Object`], optionally viewed through the
/// descriptor of its declared (compile-time) type.
#[derive(Clone)]
pub struct ObjectRef {
    object: Arc<dyn Object>,
    declared: Option<Arc<TypeDescriptor>>,
}

impl ObjectRef {
    pub fn new(object: Arc<dyn Object>) -> Self {
        Self {
            object,
            declared: None,
        }
    }

    /// Views the object through `descriptor`, e.g. a trait's member list
    /// when the holding field is typed as a trait object.
    pub fn declared_as(mut self, descriptor: TypeDescriptor) -> Self {
        self.declared = Some(Arc::new(descriptor));
        self
    }

    pub fn id(&self) -> ObjectId {
        ObjectId(Arc::as_ptr(&self.object) as *const () as usize)
    }

    pub fn as_object(&self) -> &dyn Object {
        self.object.as_ref()
    }

    pub fn type_info(&self) -> TypeInfo {
        self.object.type_info()
    }

    /// Descriptor of the run-time type.
    pub fn descriptor(&self) -> TypeDescriptor {
        self.object.descriptor()
    }

    /// Descriptor of the declared type, falling back to the run-time type.
    pub fn declared_descriptor(&self) -> TypeDescriptor {
        match &self.declared {
            Some(descriptor) => descriptor.as_ref().clone(),
            None => self.object.descriptor(),
        }
    }

    pub fn declared_type(&self) -> TypeInfo {
        match &self.declared {
            Some(descriptor) => descriptor.type_info(),
            None => self.type_info(),
        }
    }

    pub fn get(&self, member: &str) -> Option<Value> {
        self.object.get(member)
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.object.as_any().downcast_ref::<T>()
    }
}

/// Conversion into a [`Value`].
pub trait ToValue {
    fn to_value(&self) -> Value;
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue + ?Sized> ToValue for Box<T> {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

macro_rules! signed_to_value {
    ($($t:ty),*) => {
        $(impl ToValue for $t {
            fn to_value(&self) -> Value {
                Value::Int(i64::from(*self))
            }
        })*
    };
}

macro_rules! unsigned_to_value {
    ($($t:ty),*) => {
        $(impl ToValue for $t {
            fn to_value(&self) -> Value {
                Value::UInt(u64::from(*self))
            }
        })*
    };
}

signed_to_value!(i8, i16, i32, i64);
unsigned_to_value!(u8, u16, u32, u64);

impl ToValue for isize {
    fn to_value(&self) -> Value {
        Value::Int(*self as i64)
    }
}

impl ToValue for usize {
    fn to_value(&self) -> Value {
        Value::UInt(*self as u64)
    }
}

impl ToValue for f32 {
    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }
}

impl ToValue for f64 {
    fn to_value(&self) -> Value {
        Value::Float(*self)
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl ToValue for char {
    fn to_value(&self) -> Value {
        Value::Char(*self)
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::Text(self.to_owned())
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl<Tz: TimeZone> ToValue for DateTime<Tz> {
    fn to_value(&self) -> Value {
        let offset = self.offset().fix();
        Value::DateTime(self.with_timezone(&offset))
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(value) => value.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: ToValue> ToValue for [T] {
    fn to_value(&self) -> Value {
        Value::Sequence(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: ToValue, const N: usize> ToValue for [T; N] {
    fn to_value(&self) -> Value {
        self[..].to_value()
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        self[..].to_value()
    }
}

impl<T: ToValue> ToValue for VecDeque<T> {
    fn to_value(&self) -> Value {
        Value::Sequence(self.iter().map(ToValue::to_value).collect())
    }
}

impl<K: ToValue, V: ToValue, S: BuildHasher> ToValue for HashMap<K, V, S> {
    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(key, value)| (key.to_value(), value.to_value()))
                .collect(),
        )
    }
}

impl<K: ToValue, V: ToValue> ToValue for BTreeMap<K, V> {
    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(key, value)| (key.to_value(), value.to_value()))
                .collect(),
        )
    }
}

impl<T: Object> ToValue for Arc<T> {
    fn to_value(&self) -> Value {
        let object: Arc<dyn Object> = self.clone();
        Value::from_object(object)
    }
}

impl<T: ToValue + ?Sized> ToValue for parking_lot::RwLock<T> {
    fn to_value(&self) -> Value {
        ToValue::to_value(&*self.read())
    }
}

impl<T: ToValue + ?Sized> ToValue for parking_lot::Mutex<T> {
    fn to_value(&self) -> Value {
        ToValue::to_value(&*self.lock())
    }
}
