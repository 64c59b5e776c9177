//! Rules locating the expectation-side counterpart of a subject member.

use std::fmt;

use crate::context::EquivalencyContext;
use crate::errors::{EquivalencyFailure, FailureKind};
use crate::member::combine;
use crate::object::{MemberInfo, TypeDescriptor};

/// Finds the member of the expectation that a subject member is compared with.
pub trait MatchingRule: fmt::Display + Send + Sync {
    /// `Ok(None)` skips the member, an `Err` fails the comparison.
    fn match_member(
        &self,
        member: &MemberInfo,
        expectation: &TypeDescriptor,
        context: &EquivalencyContext<'_>,
    ) -> Result<Option<MemberInfo>, EquivalencyFailure>;
}

fn find_readable<'a>(expectation: &'a TypeDescriptor, name: &str) -> Option<&'a MemberInfo> {
    expectation.find(name).filter(|m| m.is_readable())
}

/// Matches by name and fails when the expectation has no such member.
#[derive(Debug, Clone, Copy, Default)]
pub struct MustMatchByName;

impl MatchingRule for MustMatchByName {
    fn match_member(
        &self,
        member: &MemberInfo,
        expectation: &TypeDescriptor,
        context: &EquivalencyContext<'_>,
    ) -> Result<Option<MemberInfo>, EquivalencyFailure> {
        if let Some(found) = find_readable(expectation, member.name()) {
            return Ok(Some(found.clone()));
        }

        let path = combine(context.path(), member.name());
        Err(context
            .verification()
            .at_path(path.clone())
            .with_kind(FailureKind::StructuralMismatch)
            .fail_with(
                "Subject has member {0} that the other object does not have{reason}.",
                &[path],
            ))
    }
}

impl fmt::Display for MustMatchByName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Match members by name (or fail)")
    }
}

/// Matches by name and skips members the expectation does not have.
#[derive(Debug, Clone, Copy, Default)]
pub struct TryMatchByName;

impl MatchingRule for TryMatchByName {
    fn match_member(
        &self,
        member: &MemberInfo,
        expectation: &TypeDescriptor,
        _context: &EquivalencyContext<'_>,
    ) -> Result<Option<MemberInfo>, EquivalencyFailure> {
        Ok(find_readable(expectation, member.name()).cloned())
    }
}

impl fmt::Display for TryMatchByName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Match members by name (or ignore)")
    }
}
