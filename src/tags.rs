//! Hierarchical tag names and containment tests.
//!
//! Tags form a hierarchy through their names: `#parent/child` is contained by
//! `#parent`. Both `/` and `.` act as segment separators. Containment is
//! whole-segment prefix containment; there is no substring matching.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// An ordered sequence of tag path segments. A valid tag's segment list is
/// never empty; an empty list only appears as a query-side "any tag" wildcard.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagName {
    pub names: Vec<String>,
}

impl TagName {
    pub fn new(names: Vec<String>) -> Self {
        TagName { names }
    }

    /// Whether this tag (as a query) contains `candidate`. See
    /// [tag_contains_tag].
    pub fn contains(&self, candidate: &TagName) -> bool {
        tag_contains_tag(&self.names, &candidate.names)
    }
}

impl From<&str> for TagName {
    fn from(raw: &str) -> Self {
        TagName {
            names: tokenize_tag_name(raw),
        }
    }
}

impl Display for TagName {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "#{}", self.names.join("/"))
    }
}

/// Split a raw tag string into its path segments on `/` and `.`. A string
/// with no separators yields a single-element sequence.
pub fn tokenize_tag_name(raw: &str) -> Vec<String> {
    raw.split(['/', '.'])
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whether `query`'s segments are a whole-segment prefix of `candidate`'s.
///
/// An empty query vacuously matches any candidate; this is how a tag clause
/// with no name restriction ("any tag present") evaluates. `parent` matches
/// `parent` and `parent/child` but not `other/parent`.
pub fn tag_contains_tag(query: &[String], candidate: &[String]) -> bool {
    if query.len() > candidate.len() {
        return false;
    }
    query.iter().zip(candidate.iter()).all(|(q, c)| q == c)
}
