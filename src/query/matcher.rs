//! Boolean evaluation of parsed queries against per-note fact views.

use crate::config::QuerySettings;
use crate::properties::TodoState;
use crate::query::ast::{
    Clause, ClauseGroup, ClauseKind, ClauseMod, ClauseOrGroup, ClauseValue, GroupMod, Join, Query,
};
use crate::tags::TagName;

/// Facts about one candidate note, supplied by a collaborator. The matcher
/// never mutates anything; implementations may consult the note map (for
/// incoming connections) or a workspace index (for containment and nested
/// query expansion).
pub trait NoteFacts {
    fn display_name(&self) -> &str;
    fn content(&self) -> &str;
    fn tags(&self) -> &[TagName];
    fn todo_states(&self) -> &[TodoState];
    /// Whether this note lies within the container or path named by
    /// `reference`.
    fn in_scope(&self, reference: &str) -> bool;
    /// Whether the node named by `reference` appears among this note's
    /// incoming connections.
    fn linked_from(&self, reference: &str) -> bool;
    /// Expand a nested query into the set of target references it matches.
    fn resolve(&self, query: &Query) -> Vec<String>;
}

/// Evaluate with default [QuerySettings].
pub fn evaluate(query: &Query, facts: &dyn NoteFacts) -> bool {
    evaluate_with(&QuerySettings::default(), query, facts)
}

pub fn evaluate_with(settings: &QuerySettings, query: &Query, facts: &dyn NoteFacts) -> bool {
    evaluate_group(settings, &query.group, facts)
}

/// `and` requires every child, `or` at least one; both short-circuit. The
/// group's `not` modifier inverts the combined result afterward.
pub fn evaluate_group(settings: &QuerySettings, group: &ClauseGroup, facts: &dyn NoteFacts) -> bool {
    let joined = match group.join {
        Join::And => group
            .clauses
            .iter()
            .all(|child| evaluate_item(settings, child, facts)),
        Join::Or => group
            .clauses
            .iter()
            .any(|child| evaluate_item(settings, child, facts)),
    };
    match group.modifier {
        Some(GroupMod::Not) => !joined,
        None => joined,
    }
}

fn evaluate_item(settings: &QuerySettings, item: &ClauseOrGroup, facts: &dyn NoteFacts) -> bool {
    match item {
        ClauseOrGroup::Clause(clause) => evaluate_clause(settings, clause, facts),
        ClauseOrGroup::Group(group) => evaluate_group(settings, group, facts),
    }
}

pub fn evaluate_clause(settings: &QuerySettings, clause: &Clause, facts: &dyn NoteFacts) -> bool {
    match &clause.value {
        ClauseValue::Not(inner) => !evaluate_item(settings, inner, facts),
        ClauseValue::Tag(tag) => match clause.kind {
            ClauseKind::With => facts.tags().iter().any(|candidate| tag.contains(candidate)),
            kind => unsupported(kind, "tag"),
        },
        ClauseValue::Todo(state) => match clause.kind {
            // `Any` still requires the note to carry at least one todo.
            ClauseKind::With => facts.todo_states().iter().any(|s| state.matches(*s)),
            kind => unsupported(kind, "todo"),
        },
        ClauseValue::Text(text) => match clause.kind {
            ClauseKind::Named => contains_ci(facts.display_name(), text),
            ClauseKind::With => contains_ci(facts.content(), text),
            ClauseKind::In => facts.in_scope(text),
            ClauseKind::LinkedFrom => facts.linked_from(text),
        },
        ClauseValue::Regex(pattern) => match clause.kind {
            ClauseKind::Named => pattern.is_match(facts.display_name()),
            ClauseKind::With => pattern.is_match(facts.content()),
            kind => unsupported(kind, "regex"),
        },
        ClauseValue::Reference(reference) => reference_test(clause.kind, reference, facts),
        ClauseValue::Query(query) => {
            let targets = facts.resolve(query);
            let selection = effective_selection(settings, clause);
            match selection {
                // An empty target set fails `any` and vacuously passes `all`.
                ClauseMod::Any => targets
                    .iter()
                    .any(|target| reference_test(clause.kind, target, facts)),
                ClauseMod::All => targets
                    .iter()
                    .all(|target| reference_test(clause.kind, target, facts)),
            }
        }
    }
}

/// Which `Any`/`All` selection actually applies, honoring the per-kind
/// multi-target configuration.
fn effective_selection(settings: &QuerySettings, clause: &Clause) -> ClauseMod {
    let selection = clause.modifier.unwrap_or(ClauseMod::Any);
    if settings.multi_target.contains(clause.kind) {
        selection
    } else {
        if selection == ClauseMod::All {
            tracing::warn!(
                "'all' selection is not enabled for '{}' clauses; falling back to 'any'",
                clause.kind
            );
        }
        ClauseMod::Any
    }
}

fn reference_test(kind: ClauseKind, reference: &str, facts: &dyn NoteFacts) -> bool {
    match kind {
        ClauseKind::In => facts.in_scope(reference),
        ClauseKind::LinkedFrom => facts.linked_from(reference),
        ClauseKind::Named => facts.display_name().to_lowercase() == reference.to_lowercase(),
        ClauseKind::With => contains_ci(facts.content(), reference),
    }
}

/// Case-insensitive containment. An empty needle matches everything,
/// mirroring the tag model's vacuous containment.
fn contains_ci(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn unsupported(kind: ClauseKind, value_kind: &str) -> bool {
    tracing::warn!("A '{value_kind}' value cannot be evaluated for a '{kind}' clause");
    false
}
