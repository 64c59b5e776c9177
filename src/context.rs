//! Traversal state for one node of the object graph.

use crate::formatter::format_value;
use crate::member::{self, Member, SubjectInfo};
use crate::object::{MemberInfo, TypeDescriptor};
use crate::options::EquivalencyOptions;
use crate::value::{ObjectId, Value};
use crate::verification::Verification;

/// The comparands at one point of the traversal, with their path and the
/// objects visited on the way down.
///
/// Child contexts are derived with [`for_member`](Self::for_member),
/// [`for_index`](Self::for_index) and [`for_key`](Self::for_key); each child
/// carries its own copy of the ancestor chain, so a reference shared by two
/// sibling branches is not mistaken for a cycle.
#[derive(Debug, Clone)]
pub struct EquivalencyContext<'a> {
    subject: Value,
    expectation: Value,
    path: String,
    member: Option<MemberInfo>,
    options: &'a EquivalencyOptions,
    ancestors: Vec<ObjectId>,
    is_root: bool,
}

impl<'a> EquivalencyContext<'a> {
    pub fn root(subject: Value, expectation: Value, options: &'a EquivalencyOptions) -> Self {
        Self {
            subject,
            expectation,
            path: String::new(),
            member: None,
            options,
            ancestors: Vec::new(),
            is_root: true,
        }
    }

    pub fn subject(&self) -> &Value {
        &self.subject
    }

    pub fn expectation(&self) -> &Value {
        &self.expectation
    }

    /// Path from the root; empty for the root itself.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The member this node was reached through; `None` for the root and for
    /// collection items.
    pub fn member(&self) -> Option<&MemberInfo> {
        self.member.as_ref()
    }

    pub fn options(&self) -> &'a EquivalencyOptions {
        self.options
    }

    pub fn is_root(&self) -> bool {
        self.is_root
    }

    /// Identities of the subject objects between the root and this node.
    pub fn ancestors(&self) -> &[ObjectId] {
        &self.ancestors
    }

    /// Replaces the subject of this node, e.g. after a type conversion.
    pub fn set_subject(&mut self, subject: Value) {
        self.subject = subject;
    }

    /// `true` when the subject is an object already visited on this branch.
    pub fn is_cyclic(&self) -> bool {
        self.subject
            .object_id()
            .map_or(false, |id| self.ancestors.contains(&id))
    }

    pub fn for_member(&self, member: &Member, subject: Value, expectation: Value) -> Self {
        self.child(
            subject,
            expectation,
            member.path().to_string(),
            Some(member.info().clone()),
        )
    }

    pub fn for_index(&self, index: usize, subject: Value, expectation: Value) -> Self {
        self.child(subject, expectation, member::index(&self.path, index), None)
    }

    pub fn for_key(&self, key: &Value, subject: Value, expectation: Value) -> Self {
        let key = match key {
            Value::Text(text) => text.clone(),
            other => format_value(other),
        };
        self.child(subject, expectation, member::key(&self.path, &key), None)
    }

    fn child(
        &self,
        subject: Value,
        expectation: Value,
        path: String,
        member: Option<MemberInfo>,
    ) -> Self {
        let mut ancestors = self.ancestors.clone();
        if let Some(id) = self.subject.object_id() {
            ancestors.push(id);
        }
        Self {
            subject,
            expectation,
            path,
            member,
            options: self.options,
            ancestors,
            is_root: false,
        }
    }

    /// Descriptor of the subject's declared type, when the subject is an object.
    pub fn compile_time_descriptor(&self) -> Option<TypeDescriptor> {
        self.subject.as_object().map(|object| object.declared_descriptor())
    }

    pub fn subject_info(&self) -> SubjectInfo {
        let compile_time_type = match (&self.member, &self.subject) {
            (Some(member), _) => Some(member.member_type()),
            (None, Value::Object(object)) => Some(object.declared_type()),
            (None, subject) => subject.runtime_type(),
        };
        SubjectInfo {
            path: self.path.clone(),
            member: self.member.clone(),
            compile_time_type,
            runtime_type: self.subject.runtime_type(),
        }
    }

    /// How failure messages refer to this node.
    pub fn description(&self) -> String {
        if self.path.is_empty() {
            "subject".to_string()
        } else if self.path.starts_with('[') {
            format!("item{}", self.path)
        } else {
            format!("member {}", self.path)
        }
    }

    /// Failure reporter for this node, carrying the caller's reason.
    pub fn verification(&self) -> Verification {
        Verification::new(self.description())
            .at_path(self.path.clone())
            .because(self.options.reason())
    }
}
