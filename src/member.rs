//! Members bound to a position in the object graph.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{EquivalencyError, EquivalencyResult};
use crate::object::{MemberInfo, TypeInfo};
use crate::value::{ObjectRef, Value};

static LEADING_INDEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[[0-9]+\]\.?").expect("index pattern is valid"));

/// Appends a member name to a path: `order` + `total` = `order.total`.
pub fn combine(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", path, name)
    }
}

/// Appends an element index: `lines` + `2` = `lines[2]`.
pub fn index(path: &str, idx: usize) -> String {
    format!("{}[{}]", path, idx)
}

/// Appends a map key segment: `prices` + `eur` = `prices[eur]`.
pub fn key(path: &str, key: &str) -> String {
    format!("{}[{}]", path, key)
}

/// Strips a leading `[n]` segment so that paths recorded below the elements
/// of a root collection match paths configured without the index.
pub fn normalize(path: &str) -> String {
    LEADING_INDEX.replace(path, "").into_owned()
}

/// A member located at a path, with a getter.
#[derive(Debug, Clone)]
pub struct Member {
    info: MemberInfo,
    path: String,
}

impl Member {
    /// Binds `info` below the node at `parent_path`.
    pub fn new(info: MemberInfo, parent_path: &str) -> Self {
        let path = combine(parent_path, info.name());
        Self { info, path }
    }

    pub fn info(&self) -> &MemberInfo {
        &self.info
    }

    pub fn name(&self) -> &str {
        self.info.name()
    }

    /// Full path from the root.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Reads the member from `object`.
    pub fn read(&self, object: &ObjectRef) -> EquivalencyResult<Value> {
        object.get(self.info.name()).ok_or_else(|| EquivalencyError::MemberAccess {
            path: self.path.clone(),
            type_name: object.type_info().short_name(),
            member: self.info.name().to_string(),
        })
    }
}

/// What is known about the node being compared; handed to exclusion and
/// override predicates.
#[derive(Debug, Clone)]
pub struct SubjectInfo {
    /// Full path from the root; empty for the root itself.
    pub path: String,
    /// The member the node was reached through, if any.
    pub member: Option<MemberInfo>,
    pub compile_time_type: Option<TypeInfo>,
    pub runtime_type: Option<TypeInfo>,
}

impl SubjectInfo {
    pub fn name(&self) -> Option<&str> {
        self.member.as_ref().map(MemberInfo::name)
    }

    pub fn declaring_type(&self) -> Option<TypeInfo> {
        self.member.as_ref().map(MemberInfo::declaring_type)
    }

    /// `true` when either the declared or the run-time type is `T`.
    pub fn is_type<T: ?Sized + 'static>(&self) -> bool {
        self.compile_time_type.map_or(false, |t| t.is::<T>())
            || self.runtime_type.map_or(false, |t| t.is::<T>())
    }
}
