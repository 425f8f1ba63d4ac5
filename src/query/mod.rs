//! The structured query language over the note workspace.
//!
//! A query string such as `Notes with #project/active and named 'plan'` is
//! parsed ([parser]) into an abstract syntax tree ([ast]) and evaluated
//! ([matcher]) against per-note fact views supplied by a collaborator. The
//! parser is deterministic and side-effect-free; all pattern values are
//! compiled at parse time so matching never fails.

pub mod ast;
pub mod matcher;
pub mod parser;

pub use ast::{
    Clause, ClauseGroup, ClauseKind, ClauseMod, ClauseOrGroup, ClauseValue, GroupMod, Join, Query,
    TodoQueryState, WrappedRegex,
};
pub use matcher::{evaluate, evaluate_clause, evaluate_group, evaluate_with, NoteFacts};
pub use parser::{parse_query_text, ParseError, Span};
