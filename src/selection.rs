//! Rules deciding which members of an object participate in a comparison.
//!
//! Rules run in registration order. Each one receives the candidates left by
//! the previous rule and returns the new set, so a later rule can undo what an
//! earlier one did. The fold starts from an empty set.

use std::fmt;
use std::sync::Arc;

use crate::member::{combine, normalize, SubjectInfo};
use crate::object::{MemberInfo, TypeDescriptor};

/// Predicate over the member being considered.
pub type MemberPredicate = Arc<dyn Fn(&SubjectInfo) -> bool + Send + Sync>;

/// Where the members being selected live.
#[derive(Debug, Clone, Copy)]
pub struct SelectionContext<'a> {
    /// Path of the object whose members are selected; empty for the root.
    pub path: &'a str,
    /// Descriptor of the declared type of the object.
    pub compile_time: &'a TypeDescriptor,
    /// Descriptor of the run-time type of the object.
    pub runtime: &'a TypeDescriptor,
}

impl SelectionContext<'_> {
    /// What exclusion and inclusion predicates see for `member`.
    pub fn subject_info(&self, member: &MemberInfo) -> SubjectInfo {
        SubjectInfo {
            path: combine(self.path, member.name()),
            member: Some(member.clone()),
            compile_time_type: Some(member.member_type()),
            runtime_type: None,
        }
    }
}

/// Decides which members take part in a structural comparison.
pub trait SelectionRule: fmt::Display + Send + Sync {
    fn select_members(
        &self,
        candidates: Vec<MemberInfo>,
        context: &SelectionContext<'_>,
    ) -> Vec<MemberInfo>;
}

fn selectable(members: &[MemberInfo]) -> Vec<MemberInfo> {
    members
        .iter()
        .filter(|m| m.is_public() && m.is_readable() && !m.is_indexer())
        .cloned()
        .collect()
}

fn add_unique(candidates: &mut Vec<MemberInfo>, member: &MemberInfo) {
    if !candidates.iter().any(|c| c.name() == member.name()) {
        candidates.push(member.clone());
    }
}

/// Selects every public, readable member declared on the compile-time type.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllDeclaredPublicMembers;

impl SelectionRule for AllDeclaredPublicMembers {
    fn select_members(
        &self,
        _candidates: Vec<MemberInfo>,
        context: &SelectionContext<'_>,
    ) -> Vec<MemberInfo> {
        selectable(context.compile_time.members())
    }
}

impl fmt::Display for AllDeclaredPublicMembers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Include all declared public members")
    }
}

/// Selects every public, readable member of the run-time type.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllRuntimePublicMembers;

impl SelectionRule for AllRuntimePublicMembers {
    fn select_members(
        &self,
        _candidates: Vec<MemberInfo>,
        context: &SelectionContext<'_>,
    ) -> Vec<MemberInfo> {
        selectable(context.runtime.members())
    }
}

impl fmt::Display for AllRuntimePublicMembers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Include all run-time public members")
    }
}

/// Adds the run-time member found at `path`, even when an earlier rule
/// excluded it.
#[derive(Debug, Clone)]
pub struct IncludeMemberByPath {
    path: String,
}

impl IncludeMemberByPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl SelectionRule for IncludeMemberByPath {
    fn select_members(
        &self,
        mut candidates: Vec<MemberInfo>,
        context: &SelectionContext<'_>,
    ) -> Vec<MemberInfo> {
        for member in context.runtime.members() {
            if normalize(&combine(context.path, member.name())) == self.path {
                add_unique(&mut candidates, member);
            }
        }
        candidates
    }
}

impl fmt::Display for IncludeMemberByPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Include member {}", self.path)
    }
}

/// Adds every readable run-time member matching a predicate.
#[derive(Clone)]
pub struct IncludeMemberByPredicate {
    predicate: MemberPredicate,
    description: String,
}

impl IncludeMemberByPredicate {
    pub fn new(predicate: MemberPredicate) -> Self {
        Self {
            predicate,
            description: "Include members matching a predicate".to_string(),
        }
    }

    /// Replaces the generic description shown in the options listing.
    pub fn described_as(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl SelectionRule for IncludeMemberByPredicate {
    fn select_members(
        &self,
        mut candidates: Vec<MemberInfo>,
        context: &SelectionContext<'_>,
    ) -> Vec<MemberInfo> {
        for member in context.runtime.members() {
            if member.is_readable()
                && !member.is_indexer()
                && (self.predicate)(&context.subject_info(member))
            {
                add_unique(&mut candidates, member);
            }
        }
        candidates
    }
}

impl fmt::Display for IncludeMemberByPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

/// Removes the member whose full path, without a leading `[n]` segment,
/// equals `path`.
#[derive(Debug, Clone)]
pub struct ExcludeMemberByPath {
    path: String,
}

impl ExcludeMemberByPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl SelectionRule for ExcludeMemberByPath {
    fn select_members(
        &self,
        candidates: Vec<MemberInfo>,
        context: &SelectionContext<'_>,
    ) -> Vec<MemberInfo> {
        candidates
            .into_iter()
            .filter(|m| normalize(&combine(context.path, m.name())) != self.path)
            .collect()
    }
}

impl fmt::Display for ExcludeMemberByPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Exclude member {}", self.path)
    }
}

/// Removes every member matching a predicate.
#[derive(Clone)]
pub struct ExcludeMemberByPredicate {
    predicate: MemberPredicate,
    description: String,
}

impl ExcludeMemberByPredicate {
    pub fn new(predicate: MemberPredicate) -> Self {
        Self {
            predicate,
            description: "Exclude members matching a predicate".to_string(),
        }
    }

    pub fn described_as(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl SelectionRule for ExcludeMemberByPredicate {
    fn select_members(
        &self,
        candidates: Vec<MemberInfo>,
        context: &SelectionContext<'_>,
    ) -> Vec<MemberInfo> {
        candidates
            .into_iter()
            .filter(|m| !(self.predicate)(&context.subject_info(m)))
            .collect()
    }
}

impl fmt::Display for ExcludeMemberByPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}
