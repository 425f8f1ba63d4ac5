//! Tests for query evaluation against fact views

use super::helpers::*;
use crate::config::QuerySettings;
use crate::properties::TodoState;
use crate::query::ast::{ClauseKind, GroupMod};
use crate::query::matcher::{evaluate, evaluate_with};
use crate::query::parser::parse_query_text;
use enumset::EnumSet;
use test_log::test;

#[test]
fn test_tag_clause_round_trip() {
    let query = parse_query_text("Notes with #parent").unwrap();
    let matching = TestFacts::named("A note").with_tags(&["parent/child"]);
    let other = TestFacts::named("A note").with_tags(&["other"]);
    assert!(evaluate(&query, &matching));
    assert!(!evaluate(&query, &other));
}

#[test]
fn test_bare_tag_marker_matches_any_tag() {
    let query = parse_query_text("Notes with #").unwrap();
    let tagged = TestFacts::named("x").with_tags(&["anything"]);
    let untagged = TestFacts::named("x");
    assert!(evaluate(&query, &tagged));
    assert!(!evaluate(&query, &untagged));
}

#[test]
fn test_group_negation_inverts_result() {
    let query = parse_query_text("Notes with #a").unwrap();
    let mut inverted = query.clone();
    inverted.group.modifier = Some(GroupMod::Not);

    for facts in [
        TestFacts::named("x").with_tags(&["a"]),
        TestFacts::named("x").with_tags(&["b"]),
        TestFacts::named("x"),
    ] {
        assert_eq!(evaluate(&query, &facts), !evaluate(&inverted, &facts));
    }
}

#[test]
fn test_negated_clause_inverts_result() {
    let query = parse_query_text("Notes not with #a").unwrap();
    assert!(!evaluate(&query, &TestFacts::named("x").with_tags(&["a"])));
    assert!(evaluate(&query, &TestFacts::named("x").with_tags(&["b"])));
}

#[test]
fn test_named_text_is_case_insensitive() {
    let query = parse_query_text("Notes named 'plan'").unwrap();
    assert!(evaluate(&query, &TestFacts::named("Project PLAN")));
    assert!(!evaluate(&query, &TestFacts::named("Project journal")));
}

#[test]
fn test_named_regex_is_case_insensitive() {
    let query = parse_query_text("Notes named /^pro/").unwrap();
    assert!(evaluate(&query, &TestFacts::named("PROJECT")));
    assert!(!evaluate(&query, &TestFacts::named("A project")));
}

#[test]
fn test_empty_text_matches_everything() {
    let query = parse_query_text("Notes named ''").unwrap();
    assert!(evaluate(&query, &TestFacts::named("anything at all")));
    assert!(evaluate(&query, &TestFacts::named("")));
}

#[test]
fn test_content_text_containment() {
    let query = parse_query_text("Notes with 'Kernel'").unwrap();
    let matching = TestFacts::named("x").with_content("notes about the kernel scheduler");
    let other = TestFacts::named("x").with_content("gardening");
    assert!(evaluate(&query, &matching));
    assert!(!evaluate(&query, &other));
}

#[test]
fn test_todo_state_matching() {
    let open = parse_query_text("Notes with open todos").unwrap();
    let closed = parse_query_text("Notes with closed todos").unwrap();

    let has_open = TestFacts::named("x").with_todos(&[TodoState::Open]);
    let has_canceled = TestFacts::named("x").with_todos(&[TodoState::Canceled]);
    let has_complete = TestFacts::named("x").with_todos(&[TodoState::Complete]);

    assert!(evaluate(&open, &has_open));
    assert!(!evaluate(&open, &has_canceled));
    // Closed covers both complete and canceled.
    assert!(evaluate(&closed, &has_canceled));
    assert!(evaluate(&closed, &has_complete));
    assert!(!evaluate(&closed, &has_open));
}

#[test]
fn test_any_todos_requires_at_least_one() {
    let query = parse_query_text("Notes with any todos").unwrap();
    assert!(evaluate(
        &query,
        &TestFacts::named("x").with_todos(&[TodoState::Open])
    ));
    assert!(!evaluate(&query, &TestFacts::named("x")));
}

#[test]
fn test_linked_from_reference() {
    let query = parse_query_text("Notes linked from [[Journal]]").unwrap();
    assert!(evaluate(
        &query,
        &TestFacts::named("x").with_inbound(&["Journal"])
    ));
    assert!(!evaluate(
        &query,
        &TestFacts::named("x").with_inbound(&["Archive"])
    ));
}

#[test]
fn test_in_scope_reference() {
    let query = parse_query_text("Notes in [[Projects]]").unwrap();
    assert!(evaluate(
        &query,
        &TestFacts::named("x").with_scopes(&["Projects"])
    ));
    assert!(!evaluate(&query, &TestFacts::named("x")));
}

#[test]
fn test_subquery_any_and_all_selection() {
    let facts = TestFacts::named("x")
        .with_inbound(&["A"])
        .with_resolutions(&["A", "B"]);

    let any = parse_query_text("Notes linked from any { Drafts }").unwrap();
    let all = parse_query_text("Notes linked from all { Drafts }").unwrap();
    assert!(evaluate(&any, &facts));
    assert!(!evaluate(&all, &facts));

    let both = TestFacts::named("x")
        .with_inbound(&["A", "B"])
        .with_resolutions(&["A", "B"]);
    assert!(evaluate(&all, &both));
}

#[test]
fn test_all_selection_falls_back_when_kind_not_configured() {
    let facts = TestFacts::named("x")
        .with_inbound(&["A"])
        .with_resolutions(&["A", "B"]);
    let all = parse_query_text("Notes linked from all { Drafts }").unwrap();

    let settings = QuerySettings {
        multi_target: EnumSet::only(ClauseKind::In),
    };
    // LinkedFrom is excluded from multi-target selection, so `all`
    // degrades to `any` and the single inbound match suffices.
    assert!(evaluate_with(&settings, &all, &facts));
}

#[test]
fn test_empty_target_set_selection() {
    let facts = TestFacts::named("x").with_inbound(&["A"]);
    let any = parse_query_text("Notes linked from any { Drafts }").unwrap();
    let all = parse_query_text("Notes linked from all { Drafts }").unwrap();
    assert!(!evaluate(&any, &facts));
    assert!(evaluate(&all, &facts));
}

#[test]
fn test_or_group_short_circuits_to_true() {
    let query = parse_query_text("Notes with #a or named 'x'").unwrap();
    assert!(evaluate(&query, &TestFacts::named("y").with_tags(&["a"])));
    assert!(evaluate(&query, &TestFacts::named("x")));
    assert!(!evaluate(&query, &TestFacts::named("y").with_tags(&["b"])));
}

#[test]
fn test_not_group_evaluation() {
    let query = parse_query_text("Notes not (with #a or with #b)").unwrap();
    assert!(!evaluate(&query, &TestFacts::named("x").with_tags(&["a"])));
    assert!(evaluate(&query, &TestFacts::named("x").with_tags(&["c"])));
}

#[test]
fn test_mixed_precedence_evaluation() {
    // (with #a and #b) or named 'solo'
    let query = parse_query_text("Notes with #a and #b or named 'solo'").unwrap();
    assert!(evaluate(
        &query,
        &TestFacts::named("x").with_tags(&["a", "b"])
    ));
    assert!(evaluate(&query, &TestFacts::named("solo note")));
    assert!(!evaluate(&query, &TestFacts::named("x").with_tags(&["a"])));
}
