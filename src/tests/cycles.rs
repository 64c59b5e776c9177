use std::sync::Arc;

use super::fixtures::{customer, link, node, self_loop, Pair};
use crate::{check_equivalent, check_equivalent_with, FailureKind};

#[test]
fn self_reference_fails_by_default() {
    let subject = self_loop("a");
    let expectation = self_loop("a");

    let failure = check_equivalent(&subject, &expectation).unwrap_err();
    assert_eq!(failure.kind, FailureKind::CyclicReference);
    assert_eq!(failure.path, "next");
    insta::assert_snapshot!(failure.message, @r###"Expected member next to be Node { name = "a", next = {cyclic reference to Node} }, but it contains a cyclic reference."###);
}

#[test]
fn self_reference_ignored_on_request() {
    let subject = self_loop("a");
    let expectation = self_loop("a");
    assert!(check_equivalent_with(&subject, &expectation, |o| o.ignoring_cyclic_references()).is_ok());
}

#[test]
fn same_graph_is_settled_by_reference_first() {
    let subject = self_loop("a");
    assert!(check_equivalent(&subject, &subject).is_ok());
}

#[test]
fn longer_cycle_is_detected() {
    let (a, b) = (node("a"), node("b"));
    link(&a, &b);
    link(&b, &a);
    let (x, y) = (node("a"), node("b"));
    link(&x, &y);
    link(&y, &x);

    let failure = check_equivalent(&a, &x).unwrap_err();
    assert_eq!(failure.kind, FailureKind::CyclicReference);
    assert_eq!(failure.path, "next.next");
}

#[test]
fn ignored_cycle_still_compares_the_rest() {
    let (a, b) = (node("a"), node("b"));
    link(&a, &b);
    link(&b, &a);
    let (x, y) = (node("a"), node("c"));
    link(&x, &y);
    link(&y, &x);

    let failure =
        check_equivalent_with(&a, &x, |o| o.ignoring_cyclic_references()).unwrap_err();
    assert_eq!(failure.path, "next.name");
}

#[test]
fn shared_sibling_reference_is_not_a_cycle() {
    let shared = customer("Jane", 42, "x");
    let subject = Arc::new(Pair {
        left: shared.clone(),
        right: shared,
    });
    let other = customer("Jane", 42, "x");
    let expectation = Arc::new(Pair {
        left: other.clone(),
        right: other,
    });

    assert!(check_equivalent(&subject, &expectation).is_ok());
}
