use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::fixtures::{customer, line, Order};
use crate::{check_equivalent, check_equivalent_with, describe_object, FailureKind};

fn order(lines: Vec<Arc<super::fixtures::OrderLine>>) -> Arc<Order> {
    Arc::new(Order {
        id: 7,
        customer: customer("Jane", 42, "x"),
        lines,
    })
}

struct PriceList {
    prices: BTreeMap<String, i32>,
}

describe_object!(PriceList { pub prices: BTreeMap<String, i32> });

fn prices(entries: &[(&str, i32)]) -> Arc<PriceList> {
    Arc::new(PriceList {
        prices: entries
            .iter()
            .map(|(key, value)| (key.to_string(), *value))
            .collect(),
    })
}

// ============ Sequences ============

#[test]
fn order_matters() {
    let failure = check_equivalent(&vec![1, 2, 3], &vec![3, 2, 1]).unwrap_err();
    assert_eq!(failure.path, "[0]");
    insta::assert_snapshot!(failure.message, @"Expected item[0] to be 3, but found 1.");
}

#[test]
fn shorter_subject() {
    let failure = check_equivalent(&vec![1, 2], &vec![1, 2, 3]).unwrap_err();
    assert_eq!(failure.kind, FailureKind::StructuralMismatch);
    assert!(failure.message.contains("1 item(s) less"));
    insta::assert_snapshot!(failure.message, @"Expected subject to be a collection with 3 item(s), but {1, 2} contains 1 item(s) less than {1, 2, 3}.");
}

#[test]
fn longer_subject() {
    let failure = check_equivalent(&[1, 2, 3, 4], &[1, 2]).unwrap_err();
    assert!(failure.message.contains("2 item(s) more than {1, 2}"));
}

#[test]
fn collection_against_scalar() {
    let failure = check_equivalent(&vec![1], &1).unwrap_err();
    assert_eq!(failure.kind, FailureKind::StructuralMismatch);
    insta::assert_snapshot!(failure.message, @"Expected subject to be 1, but it is a collection and cannot be compared with a non-collection type.");
}

#[test]
fn nested_item_member_path() {
    let subject = order(vec![line("apple", 1), line("pear", 2)]);
    let expectation = order(vec![line("apple", 1), line("pear", 3)]);

    let failure = check_equivalent(&subject, &expectation).unwrap_err();
    assert_eq!(failure.path, "lines[1].quantity");
    insta::assert_snapshot!(failure.message, @"Expected member lines[1].quantity to be 3, but found 2.");
}

#[test]
fn root_collection_of_objects_with_exclusion() {
    let subject = vec![customer("Jane", 42, "a"), customer("John", 40, "b")];
    let expectation = vec![customer("Jane", 42, "c"), customer("John", 40, "d")];

    assert!(check_equivalent(&subject, &expectation).is_err());
    assert!(check_equivalent_with(&subject, &expectation, |o| o.excluding("password")).is_ok());
}

#[test]
fn flat_comparison_without_recursion() {
    let shared = line("apple", 1);
    let subject = order(vec![shared.clone()]);
    let expectation = Arc::new(Order {
        id: 7,
        customer: subject.customer.clone(),
        lines: vec![shared],
    });
    assert!(check_equivalent_with(&subject, &expectation, |o| o.excluding_nested_objects()).is_ok());

    let copied = order(vec![line("apple", 1)]);
    let failure = check_equivalent_with(&subject, &copied, |o| {
        o.excluding_nested_objects().excluding("customer")
    })
    .unwrap_err();
    assert_eq!(failure.path, "lines");
    assert!(failure.message.contains("differs at index 0."));
}

// ============ Dictionaries ============

#[test]
fn dictionaries_ignore_entry_order() {
    let subject: HashMap<&str, i32> = [("eur", 1), ("usd", 2)].into_iter().collect();
    let expectation: HashMap<&str, i32> = [("usd", 2), ("eur", 1)].into_iter().collect();
    assert!(check_equivalent(&subject, &expectation).is_ok());
}

#[test]
fn dictionary_value_path() {
    let failure =
        check_equivalent(&prices(&[("eur", 1), ("usd", 2)]), &prices(&[("eur", 1), ("usd", 3)]))
            .unwrap_err();
    assert_eq!(failure.path, "prices[usd]");
    insta::assert_snapshot!(failure.message, @"Expected member prices[usd] to be 3, but found 2.");
}

#[test]
fn dictionary_count_mismatch() {
    let subject: BTreeMap<&str, i32> = [("eur", 1)].into_iter().collect();
    let expectation: BTreeMap<&str, i32> = [("eur", 1), ("usd", 2)].into_iter().collect();

    let failure = check_equivalent(&subject, &expectation).unwrap_err();
    assert_eq!(failure.kind, FailureKind::StructuralMismatch);
    insta::assert_snapshot!(failure.message, @r###"Expected subject to be a dictionary with 2 item(s), but {["eur"] = 1} contains 1 item(s)."###);
}

#[test]
fn dictionary_unexpected_key() {
    let subject: BTreeMap<&str, i32> = [("gbp", 1)].into_iter().collect();
    let expectation: BTreeMap<&str, i32> = [("eur", 1)].into_iter().collect();

    let failure = check_equivalent(&subject, &expectation).unwrap_err();
    insta::assert_snapshot!(failure.message, @r###"Expected subject to be {["eur"] = 1}, but it contains unexpected key "gbp"."###);
}

#[test]
fn dictionary_against_sequence() {
    let subject: BTreeMap<&str, i32> = [("eur", 1)].into_iter().collect();
    let failure = check_equivalent(&subject, &vec![1]).unwrap_err();
    assert_eq!(failure.kind, FailureKind::StructuralMismatch);
    assert!(failure.message.ends_with("cannot be compared with a non-dictionary type."));
}

#[test]
fn flat_dictionary_comparison_names_the_key() {
    let failure = check_equivalent_with(
        &prices(&[("eur", 1)]),
        &prices(&[("eur", 2)]),
        |o| o.excluding_nested_objects(),
    )
    .unwrap_err();
    assert_eq!(failure.path, "prices");
    insta::assert_snapshot!(failure.message, @r###"Expected member prices to be {["eur"] = 2}, but {["eur"] = 1} differs at key "eur"."###);
}
