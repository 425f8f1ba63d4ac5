//! Abstract syntax tree for the query language.
//!
//! The serde shapes mirror the interchange format consumed by search
//! surfaces: a clause is `{type, mod?, <value key>: ...}`, a group is
//! `{join, mod?, clauses}`, and a query flattens its group alongside a
//! `forms` list. In Rust the distinction between a bare [ClauseGroup] and a
//! [Query] is an explicit wrapper type rather than field-presence checks.

use std::{
    fmt,
    hash::{Hash, Hasher},
    ops::{Deref, DerefMut},
};

use enumset::*;
use regex::{escape as re_escape, Error as RegexError, Regex, RegexBuilder};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::{properties::TodoState, tags::TagName};

/// The kind of test a clause performs.
#[derive(Debug, Serialize, Deserialize, PartialOrd, Ord, Hash, EnumSetType)]
#[enumset(serialize_repr = "list")]
pub enum ClauseKind {
    #[serde(rename = "in")]
    In,
    #[serde(rename = "named")]
    Named,
    #[serde(rename = "with")]
    With,
    #[serde(rename = "linked from")]
    LinkedFrom,
}

impl fmt::Display for ClauseKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ClauseKind::In => write!(f, "in"),
            ClauseKind::Named => write!(f, "named"),
            ClauseKind::With => write!(f, "with"),
            ClauseKind::LinkedFrom => write!(f, "linked from"),
        }
    }
}

/// Selection over a clause whose value denotes multiple targets.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ClauseMod {
    Any,
    All,
}

/// The only group-level modifier: invert the group's combined result.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GroupMod {
    Not,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Join {
    #[default]
    And,
    Or,
}

/// The todo-state restriction a clause can carry. `Closed` is the union of
/// `Complete` and `Canceled`; `Any` asks only that the note carry todos.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TodoQueryState {
    Any,
    Open,
    Complete,
    Canceled,
    Closed,
}

impl TodoQueryState {
    pub fn matches(&self, state: TodoState) -> bool {
        match self {
            TodoQueryState::Any => true,
            TodoQueryState::Open => state == TodoState::Open,
            TodoQueryState::Complete => state == TodoState::Complete,
            TodoQueryState::Canceled => state == TodoState::Canceled,
            TodoQueryState::Closed => (TodoState::Complete | TodoState::Canceled).contains(state),
        }
    }
}

/// A compiled pattern value. All query patterns are case-insensitive; an
/// empty pattern matches everything, mirroring the tag model's vacuous
/// containment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WrappedRegex(
    #[serde(serialize_with = "serialize_regex")]
    #[serde(deserialize_with = "deserialize_regex")]
    Regex,
);

impl WrappedRegex {
    /// Compile a user-supplied pattern. Compilation failures surface at
    /// parse time, never at match time.
    pub fn pattern(source: &str) -> Result<WrappedRegex, RegexError> {
        Ok(WrappedRegex(compile(source)?))
    }

    /// Compile a plain-text literal as an escaped pattern.
    pub fn literal(text: &str) -> WrappedRegex {
        WrappedRegex(
            compile(&re_escape(text)).expect("An escaped string to always succeed as a regex"),
        )
    }
}

fn compile(source: &str) -> Result<Regex, RegexError> {
    RegexBuilder::new(source)
        .unicode(true)
        .case_insensitive(true)
        .build()
}

fn serialize_regex<S>(re: &Regex, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(re.as_str())
}

struct ReVisitor;

impl<'de> de::Visitor<'de> for ReVisitor {
    type Value = Regex;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(
            formatter,
            "A regex string, as validated by the Rust regex crate (https://docs.rs/regex/latest/regex/index.html)",
        )
    }

    fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        compile(s).map_err(|_e| E::invalid_value(de::Unexpected::Str(s), &self))
    }
}

fn deserialize_regex<'de, D>(deserializer: D) -> Result<Regex, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_str(ReVisitor)
}

impl Hash for WrappedRegex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.as_str().hash(state);
    }
}

impl PartialEq for WrappedRegex {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_str() == other.0.as_str()
    }
}

impl Eq for WrappedRegex {}

impl Deref for WrappedRegex {
    type Target = Regex;
    fn deref(&self) -> &Regex {
        &self.0
    }
}

/// The value half of a clause. Exactly one variant accompanies each clause
/// kind; the serde key (`text`, `regex`, `reference`, `query`, `tag`,
/// `todo`, `clause`) doubles as the interchange discriminator.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ClauseValue {
    Text(String),
    Regex(WrappedRegex),
    Reference(String),
    Query(Box<Query>),
    Tag(TagName),
    Todo(TodoQueryState),
    /// A negated sub-clause: evaluates the wrapped clause or group and
    /// inverts its result.
    #[serde(rename = "clause")]
    Not(Box<ClauseOrGroup>),
}

/// A single atomic test condition: kind, optional selection modifier, value.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Clause {
    #[serde(rename = "type")]
    pub kind: ClauseKind,
    #[serde(rename = "mod", default, skip_serializing_if = "Option::is_none")]
    pub modifier: Option<ClauseMod>,
    #[serde(flatten)]
    pub value: ClauseValue,
}

impl Clause {
    pub fn new(kind: ClauseKind, value: ClauseValue) -> Self {
        Clause {
            kind,
            modifier: None,
            value,
        }
    }

    pub fn with_mod(kind: ClauseKind, modifier: ClauseMod, value: ClauseValue) -> Self {
        Clause {
            kind,
            modifier: Some(modifier),
            value,
        }
    }
}

/// Either leaf of a group's child list.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum ClauseOrGroup {
    Clause(Clause),
    Group(ClauseGroup),
}

impl From<Clause> for ClauseOrGroup {
    fn from(clause: Clause) -> Self {
        ClauseOrGroup::Clause(clause)
    }
}

impl From<ClauseGroup> for ClauseOrGroup {
    fn from(group: ClauseGroup) -> Self {
        ClauseOrGroup::Group(group)
    }
}

/// A boolean combination of clauses and nested groups.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ClauseGroup {
    pub join: Join,
    #[serde(rename = "mod", default, skip_serializing_if = "Option::is_none")]
    pub modifier: Option<GroupMod>,
    pub clauses: Vec<ClauseOrGroup>,
}

impl ClauseGroup {
    pub fn new(join: Join, clauses: Vec<ClauseOrGroup>) -> Self {
        ClauseGroup {
            join,
            modifier: None,
            clauses,
        }
    }

    pub fn negated(mut self) -> Self {
        self.modifier = Some(GroupMod::Not);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

/// A full query: a clause group plus the ordered free-text `forms` naming
/// the expected result category (e.g. "Notes"). Forms never affect boolean
/// matching; they are carried through for downstream consumption.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Query {
    #[serde(default)]
    pub forms: Vec<String>,
    #[serde(flatten)]
    pub group: ClauseGroup,
}

impl Query {
    pub fn new(forms: Vec<String>, group: ClauseGroup) -> Self {
        Query { forms, group }
    }
}

impl Deref for Query {
    type Target = ClauseGroup;
    fn deref(&self) -> &ClauseGroup {
        &self.group
    }
}

impl DerefMut for Query {
    fn deref_mut(&mut self) -> &mut ClauseGroup {
        &mut self.group
    }
}

impl From<Query> for ClauseGroup {
    fn from(query: Query) -> ClauseGroup {
        query.group
    }
}
