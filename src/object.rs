//! Type descriptors: the gettable, named members a type exposes.
//!
//! The engine never inspects a Rust value directly. Anything that takes part
//! in a structural comparison implements [`Object`], which lists the members
//! of its run-time type and reads one by name. Plain structs get an
//! implementation from [`describe_object!`](crate::describe_object).

use std::any::{Any, TypeId};
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::value::Value;

static PATH_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z_][A-Za-z0-9_]*::").expect("module path pattern is valid")
});

/// Identity and name of a Rust type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    id: TypeId,
    name: &'static str,
}

impl TypeInfo {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified name, as reported by [`std::any::type_name`].
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Name without module paths: `Vec<String>` rather than
    /// `alloc::vec::Vec<alloc::string::String>`.
    pub fn short_name(&self) -> String {
        PATH_PREFIX.replace_all(self.name, "").into_owned()
    }

    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short_name())
    }
}

/// Visibility of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    /// `pub(crate)`, `pub(super)` and friends.
    Restricted,
    Private,
}

impl Visibility {
    /// Maps a visibility keyword as written in source (`""`, `"pub"`,
    /// `"pub(crate)"`) onto a [`Visibility`].
    pub fn from_keyword(keyword: &str) -> Self {
        let keyword = keyword.trim();
        if keyword == "pub" {
            Visibility::Public
        } else if keyword.starts_with("pub") {
            Visibility::Restricted
        } else {
            Visibility::Private
        }
    }
}

/// A named, typed member declared on a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    name: String,
    declaring_type: TypeInfo,
    member_type: TypeInfo,
    visibility: Visibility,
    readable: bool,
    indexer: bool,
}

impl MemberInfo {
    /// A public, readable member.
    pub fn new(name: impl Into<String>, declaring_type: TypeInfo, member_type: TypeInfo) -> Self {
        Self {
            name: name.into(),
            declaring_type,
            member_type,
            visibility: Visibility::Public,
            readable: true,
            indexer: false,
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Marks the member as having no getter.
    pub fn write_only(mut self) -> Self {
        self.readable = false;
        self
    }

    /// Marks the member as an indexer (takes arguments, never selected).
    pub fn as_indexer(mut self) -> Self {
        self.indexer = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declaring_type(&self) -> TypeInfo {
        self.declaring_type
    }

    /// Declared (compile-time) type of the member.
    pub fn member_type(&self) -> TypeInfo {
        self.member_type
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    pub fn is_readable(&self) -> bool {
        self.readable
    }

    pub fn is_indexer(&self) -> bool {
        self.indexer
    }
}

/// The member list of a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    type_info: TypeInfo,
    members: Vec<MemberInfo>,
}

impl TypeDescriptor {
    /// Descriptor with no members.
    pub fn new(type_info: TypeInfo) -> Self {
        Self {
            type_info,
            members: Vec::new(),
        }
    }

    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::new(TypeInfo::of::<T>())
    }

    /// Adds a public, readable member of type `M` declared on this type.
    pub fn member<M: ?Sized + 'static>(self, name: impl Into<String>) -> Self {
        let member = MemberInfo::new(name, self.type_info, TypeInfo::of::<M>());
        self.with_member(member)
    }

    pub fn with_member(mut self, member: MemberInfo) -> Self {
        self.members.push(member);
        self
    }

    pub fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    pub fn members(&self) -> &[MemberInfo] {
        &self.members
    }

    pub fn find(&self, name: &str) -> Option<&MemberInfo> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// A value whose members can be enumerated and read at run time.
///
/// # Example
///
/// ```
/// use std::any::Any;
/// use layered_equivalency::{Object, ToValue, TypeDescriptor, Value};
///
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// impl Object for Point {
///     fn descriptor(&self) -> TypeDescriptor {
///         TypeDescriptor::of::<Point>().member::<i32>("x").member::<i32>("y")
///     }
///
///     fn get(&self, member: &str) -> Option<Value> {
///         match member {
///             "x" => Some(self.x.to_value()),
///             "y" => Some(self.y.to_value()),
///             _ => None,
///         }
///     }
///
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
/// }
/// ```
pub trait Object: Send + Sync + 'static {
    /// Descriptor of the run-time type.
    fn descriptor(&self) -> TypeDescriptor;

    /// Reads a member; `None` when the type has no such readable member.
    fn get(&self, member: &str) -> Option<Value>;

    fn as_any(&self) -> &dyn Any;

    fn type_info(&self) -> TypeInfo {
        self.descriptor().type_info()
    }

    /// Plain equality used when nested objects are not compared
    /// structurally. Reference identity is checked before this is called.
    fn equals(&self, other: &dyn Object) -> bool {
        let _ = other;
        false
    }
}

/// Implements [`Object`] for a struct by listing its members.
///
/// Each listed field must implement [`ToValue`](crate::ToValue). The
/// visibility written in front of a field is what selection rules see.
///
/// ```
/// use layered_equivalency::{describe_object, Object, Visibility};
///
/// struct Customer {
///     name: String,
///     age: u32,
///     token: String,
/// }
///
/// describe_object!(Customer {
///     pub name: String,
///     pub age: u32,
///     token: String,
/// });
///
/// let customer = Customer { name: "Jane".into(), age: 42, token: "t".into() };
/// let descriptor = customer.descriptor();
/// assert_eq!(descriptor.members().len(), 3);
/// assert_eq!(descriptor.find("token").unwrap().visibility(), Visibility::Private);
/// ```
#[macro_export]
macro_rules! describe_object {
    ($ty:ty { $($vis:vis $field:ident : $fty:ty),* $(,)? }) => {
        impl $crate::Object for $ty {
            fn descriptor(&self) -> $crate::TypeDescriptor {
                $crate::TypeDescriptor::of::<$ty>()
                    $(.with_member(
                        $crate::MemberInfo::new(
                            stringify!($field),
                            $crate::TypeInfo::of::<$ty>(),
                            $crate::TypeInfo::of::<$fty>(),
                        )
                        .with_visibility($crate::Visibility::from_keyword(stringify!($vis))),
                    ))*
            }

            fn get(&self, member: &str) -> ::std::option::Option<$crate::Value> {
                match member {
                    $(stringify!($field) => ::std::option::Option::Some(
                        $crate::ToValue::to_value(&self.$field),
                    ),)*
                    _ => ::std::option::Option::None,
                }
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn type_info(&self) -> $crate::TypeInfo {
                $crate::TypeInfo::of::<$ty>()
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Sample;

    #[test]
    fn short_name_strips_module_paths() {
        assert_eq!(TypeInfo::of::<Vec<String>>().short_name(), "Vec<String>");
        assert_eq!(TypeInfo::of::<Sample>().short_name(), "Sample");
        assert_eq!(TypeInfo::of::<u32>().to_string(), "u32");
    }

    #[test]
    fn visibility_from_keyword() {
        assert_eq!(Visibility::from_keyword("pub"), Visibility::Public);
        assert_eq!(Visibility::from_keyword("pub(crate)"), Visibility::Restricted);
        assert_eq!(Visibility::from_keyword(""), Visibility::Private);
    }

    #[test]
    fn descriptor_builder_sets_declaring_type() {
        let descriptor = TypeDescriptor::of::<Sample>()
            .member::<i32>("x")
            .with_member(MemberInfo::new("secret", TypeInfo::of::<Sample>(), TypeInfo::of::<String>()).write_only());

        let x = descriptor.find("x").unwrap();
        assert!(x.declaring_type().is::<Sample>());
        assert!(x.member_type().is::<i32>());
        assert!(x.is_public());
        assert!(!descriptor.find("secret").unwrap().is_readable());
        assert!(descriptor.find("missing").is_none());
    }
}
