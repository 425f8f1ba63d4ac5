//! Tokenizer and recursive-descent parser for query text.
//!
//! The surface grammar is a constrained natural-language form:
//! `[forms...] (in|named|with|linked from) <value> [and|or [not] ...]` with
//! `#tag` markers, `'text'`/`"text"` literals, `/regex/` literals,
//! `[[reference]]` targets, `{ subquery }` nesting, and `( ... )` grouping.
//! Leading bare words before the first clause keyword are collected as the
//! query's `forms`.
//!
//! Precedence is `not` > `and` > `or`, left-associative; a mixed
//! `a and b or c` sequence restructures into an `or` of `and` chunks. A
//! joiner followed directly by a value token reuses the clause kind of the
//! preceding clause, so `with #a and #b` yields two `with` clauses.
//!
//! Parsing is deterministic and side-effect-free. All failures are
//! [ParseError]s carrying the byte span of the offending token; the parser
//! never silently recovers.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::query::ast::{
    Clause, ClauseGroup, ClauseKind, ClauseMod, ClauseOrGroup, ClauseValue, Join, Query,
    TodoQueryState, WrappedRegex,
};
use crate::tags::TagName;

/// Byte range of a token within the source query text.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "bytes {}..{}", self.start, self.end)
    }
}

/// Malformed query text. Non-fatal: callers surface the message and span to
/// the user and decide what to display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message} ({span})")]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        ParseError {
            message: message.into(),
            span,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum TokenKind {
    /// Bare word: a form, keyword, or todo-state word.
    Word(String),
    /// `#`-prefixed tag name, stored without the marker.
    Tag(String),
    /// Quoted text literal, quotes stripped and escapes resolved.
    Text(String),
    /// `/regex/` literal source, delimiters stripped.
    Pattern(String),
    /// `[[reference]]` target, brackets stripped.
    Reference(String),
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
}

#[derive(Clone, Debug)]
struct Token {
    kind: TokenKind,
    span: Span,
}

static CLAUSE_KEYWORDS: Lazy<BTreeMap<&'static str, ClauseKind>> = Lazy::new(|| {
    BTreeMap::from([
        ("in", ClauseKind::In),
        ("named", ClauseKind::Named),
        ("with", ClauseKind::With),
        // "linked" must be followed by "from"; the parser enforces that.
        ("linked", ClauseKind::LinkedFrom),
    ])
});

static TODO_STATES: Lazy<BTreeMap<&'static str, TodoQueryState>> = Lazy::new(|| {
    BTreeMap::from([
        ("any", TodoQueryState::Any),
        ("open", TodoQueryState::Open),
        ("complete", TodoQueryState::Complete),
        ("completed", TodoQueryState::Complete),
        ("done", TodoQueryState::Complete),
        ("canceled", TodoQueryState::Canceled),
        ("cancelled", TodoQueryState::Canceled),
        ("closed", TodoQueryState::Closed),
    ])
});

fn is_reserved(lower: &str) -> bool {
    CLAUSE_KEYWORDS.contains_key(lower) || matches!(lower, "and" | "or" | "not")
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '-' || ch == '_'
}

fn is_tag_char(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '-' | '_' | '/' | '.')
}

fn tokenize(src: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = src.char_indices().peekable();

    while let Some((start, ch)) = chars.next() {
        match ch {
            c if c.is_whitespace() => continue,
            '(' => tokens.push(Token {
                kind: TokenKind::OpenParen,
                span: Span::new(start, start + 1),
            }),
            ')' => tokens.push(Token {
                kind: TokenKind::CloseParen,
                span: Span::new(start, start + 1),
            }),
            '{' => tokens.push(Token {
                kind: TokenKind::OpenBrace,
                span: Span::new(start, start + 1),
            }),
            '}' => tokens.push(Token {
                kind: TokenKind::CloseBrace,
                span: Span::new(start, start + 1),
            }),
            '#' => {
                let mut end = start + 1;
                while let Some((i, c)) = chars.peek().copied() {
                    if is_tag_char(c) {
                        end = i + c.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token {
                    kind: TokenKind::Tag(src[start + 1..end].to_string()),
                    span: Span::new(start, end),
                });
            }
            quote @ ('\'' | '"') => {
                let mut value = String::new();
                let mut closed = false;
                while let Some((i, c)) = chars.next() {
                    if c == quote {
                        tokens.push(Token {
                            kind: TokenKind::Text(value),
                            span: Span::new(start, i + c.len_utf8()),
                        });
                        closed = true;
                        break;
                    } else if c == '\\' {
                        match chars.next() {
                            Some((_, escaped)) => value.push(escaped),
                            None => break,
                        }
                    } else {
                        value.push(c);
                    }
                }
                if !closed {
                    return Err(ParseError::new(
                        "Unterminated text literal",
                        Span::new(start, src.len()),
                    ));
                }
            }
            '/' => {
                let mut source = String::new();
                let mut closed = false;
                while let Some((i, c)) = chars.next() {
                    if c == '/' {
                        tokens.push(Token {
                            kind: TokenKind::Pattern(source),
                            span: Span::new(start, i + 1),
                        });
                        closed = true;
                        break;
                    } else if c == '\\' {
                        source.push('\\');
                        if let Some((_, escaped)) = chars.next() {
                            source.push(escaped);
                        }
                    } else {
                        source.push(c);
                    }
                }
                if !closed {
                    return Err(ParseError::new(
                        "Unterminated regex literal",
                        Span::new(start, src.len()),
                    ));
                }
            }
            '[' => {
                if !matches!(chars.peek(), Some((_, '['))) {
                    return Err(ParseError::new(
                        "Unrecognized character '['; references are written [[like this]]",
                        Span::new(start, start + 1),
                    ));
                }
                chars.next();
                let mut value = String::new();
                let mut closed = false;
                while let Some((i, c)) = chars.next() {
                    if c == ']' && matches!(chars.peek(), Some((_, ']'))) {
                        chars.next();
                        tokens.push(Token {
                            kind: TokenKind::Reference(value),
                            span: Span::new(start, i + 2),
                        });
                        closed = true;
                        break;
                    }
                    value.push(c);
                }
                if !closed {
                    return Err(ParseError::new(
                        "Unterminated reference",
                        Span::new(start, src.len()),
                    ));
                }
            }
            c if is_word_char(c) => {
                let mut end = start + c.len_utf8();
                while let Some((i, next)) = chars.peek().copied() {
                    if is_word_char(next) {
                        end = i + next.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token {
                    kind: TokenKind::Word(src[start..end].to_string()),
                    span: Span::new(start, end),
                });
            }
            other => {
                return Err(ParseError::new(
                    format!("Unrecognized character '{other}'"),
                    Span::new(start, start + other.len_utf8()),
                ));
            }
        }
    }

    Ok(tokens)
}

struct Cursor {
    tokens: Vec<Token>,
    pos: usize,
    src_len: usize,
}

impl Cursor {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).cloned()
    }

    fn peek_word(&self) -> Option<String> {
        match self.tokens.get(self.pos) {
            Some(Token {
                kind: TokenKind::Word(w),
                ..
            }) => Some(w.to_lowercase()),
            _ => None,
        }
    }

    fn peek2_word(&self) -> Option<String> {
        match self.tokens.get(self.pos + 1) {
            Some(Token {
                kind: TokenKind::Word(w),
                ..
            }) => Some(w.to_lowercase()),
            _ => None,
        }
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eof_span(&self) -> Span {
        Span::new(self.src_len, self.src_len)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Terminator {
    Eof,
    Paren,
    Brace,
}

/// Parse query text into a [Query].
///
/// Identical input always yields a structurally identical AST; all pattern
/// values compile here so matching never fails downstream.
pub fn parse_query_text(text: &str) -> Result<Query, ParseError> {
    let tokens = tokenize(text)?;
    let mut cursor = Cursor {
        tokens,
        pos: 0,
        src_len: text.len(),
    };

    let forms = take_forms(&mut cursor);
    if cursor.peek().is_none() {
        return Ok(Query::new(forms, ClauseGroup::default()));
    }

    let mut kind_ctx = None;
    let group = parse_group(&mut cursor, Terminator::Eof, &mut kind_ctx)?;
    Ok(Query::new(forms, group))
}

/// Leading bare words become result-category forms until the first reserved
/// keyword or non-word token.
fn take_forms(cursor: &mut Cursor) -> Vec<String> {
    let mut forms = Vec::new();
    while let Some(token) = cursor.peek() {
        match &token.kind {
            TokenKind::Word(w) if !is_reserved(&w.to_lowercase()) => {
                forms.push(w.clone());
                cursor.bump();
            }
            _ => break,
        }
    }
    forms
}

fn parse_group(
    cursor: &mut Cursor,
    terminator: Terminator,
    kind_ctx: &mut Option<ClauseKind>,
) -> Result<ClauseGroup, ParseError> {
    let mut entries: Vec<(Join, ClauseOrGroup)> = Vec::new();
    let mut explicit_or = false;

    loop {
        match cursor.peek() {
            None => {
                if terminator == Terminator::Eof {
                    break;
                }
                return Err(ParseError::new(
                    "Unterminated group; expected a closing delimiter",
                    cursor.eof_span(),
                ));
            }
            Some(token) => match token.kind {
                TokenKind::CloseParen => {
                    if terminator == Terminator::Paren {
                        cursor.bump();
                        break;
                    }
                    return Err(ParseError::new("Unmatched ')'", token.span));
                }
                TokenKind::CloseBrace => {
                    if terminator == Terminator::Brace {
                        cursor.bump();
                        break;
                    }
                    return Err(ParseError::new("Unmatched '}'", token.span));
                }
                _ => {}
            },
        }

        let join = match cursor.peek_word().as_deref() {
            Some(joiner @ ("and" | "or")) => {
                if entries.is_empty() {
                    let token = cursor.peek().expect("peeked word token to be present");
                    return Err(ParseError::new(
                        format!("'{joiner}' with no preceding clause"),
                        token.span,
                    ));
                }
                let or = joiner == "or";
                cursor.bump();
                if or {
                    explicit_or = true;
                    Join::Or
                } else {
                    Join::And
                }
            }
            _ => Join::And,
        };

        let element = parse_element(cursor, kind_ctx)?;
        entries.push((join, element));
    }

    Ok(restructure(entries, explicit_or))
}

/// Apply the `and` > `or` precedence: split the flat entry list on `or` into
/// `and` chunks. A list without explicit `or` stays a flat `and` group.
fn restructure(entries: Vec<(Join, ClauseOrGroup)>, explicit_or: bool) -> ClauseGroup {
    if !explicit_or {
        return ClauseGroup::new(Join::And, entries.into_iter().map(|(_, el)| el).collect());
    }

    let mut chunks: Vec<Vec<ClauseOrGroup>> = Vec::new();
    for (join, element) in entries {
        if join == Join::Or || chunks.is_empty() {
            chunks.push(vec![element]);
        } else {
            chunks
                .last_mut()
                .expect("chunks to be non-empty after the first push")
                .push(element);
        }
    }

    let clauses = chunks
        .into_iter()
        .map(|mut chunk| {
            if chunk.len() == 1 {
                chunk.remove(0)
            } else {
                ClauseOrGroup::Group(ClauseGroup::new(Join::And, chunk))
            }
        })
        .collect();
    ClauseGroup::new(Join::Or, clauses)
}

fn parse_element(
    cursor: &mut Cursor,
    kind_ctx: &mut Option<ClauseKind>,
) -> Result<ClauseOrGroup, ParseError> {
    let Some(token) = cursor.peek() else {
        return Err(ParseError::new("Expected a clause", cursor.eof_span()));
    };

    match &token.kind {
        TokenKind::Word(w) if w.eq_ignore_ascii_case("not") => {
            cursor.bump();
            if matches!(
                cursor.peek().map(|t| t.kind),
                Some(TokenKind::OpenParen)
            ) {
                cursor.bump();
                let group = parse_group(cursor, Terminator::Paren, kind_ctx)?;
                return Ok(ClauseOrGroup::Group(group.negated()));
            }
            match parse_element(cursor, kind_ctx)? {
                ClauseOrGroup::Clause(inner) => Ok(ClauseOrGroup::Clause(Clause::new(
                    inner.kind,
                    ClauseValue::Not(Box::new(inner.into())),
                ))),
                ClauseOrGroup::Group(group) => Ok(ClauseOrGroup::Group(group.negated())),
            }
        }
        TokenKind::OpenParen => {
            cursor.bump();
            let group = parse_group(cursor, Terminator::Paren, kind_ctx)?;
            Ok(ClauseOrGroup::Group(group))
        }
        TokenKind::Word(w) => {
            let lower = w.to_lowercase();
            if let Some(kind) = CLAUSE_KEYWORDS.get(lower.as_str()).copied() {
                let keyword_span = token.span;
                cursor.bump();
                if kind == ClauseKind::LinkedFrom {
                    match cursor.peek_word().as_deref() {
                        Some("from") => {
                            cursor.bump();
                        }
                        _ => {
                            return Err(ParseError::new(
                                "Expected 'from' after 'linked'",
                                keyword_span,
                            ));
                        }
                    }
                }
                *kind_ctx = Some(kind);
                let modifier = take_modifier(cursor);
                let value = parse_value(cursor, kind, keyword_span)?;
                Ok(ClauseOrGroup::Clause(Clause {
                    kind,
                    modifier,
                    value,
                }))
            } else if is_value_start(&token.kind) {
                let Some(kind) = *kind_ctx else {
                    return Err(ParseError::new(
                        format!("Expected a clause keyword (in, named, with, linked from) before '{w}'"),
                        token.span,
                    ));
                };
                let value = parse_value(cursor, kind, token.span)?;
                Ok(ClauseOrGroup::Clause(Clause::new(kind, value)))
            } else {
                Err(ParseError::new(
                    format!("Unrecognized keyword '{w}'"),
                    token.span,
                ))
            }
        }
        _ if is_value_start(&token.kind) => {
            let Some(kind) = *kind_ctx else {
                return Err(ParseError::new(
                    "Expected a clause keyword (in, named, with, linked from) before value",
                    token.span,
                ));
            };
            let value = parse_value(cursor, kind, token.span)?;
            Ok(ClauseOrGroup::Clause(Clause::new(kind, value)))
        }
        _ => Err(ParseError::new("Expected a clause", token.span)),
    }
}

fn is_value_start(kind: &TokenKind) -> bool {
    match kind {
        TokenKind::Tag(_)
        | TokenKind::Text(_)
        | TokenKind::Pattern(_)
        | TokenKind::Reference(_)
        | TokenKind::OpenBrace => true,
        TokenKind::Word(w) => {
            let lower = w.to_lowercase();
            TODO_STATES.contains_key(lower.as_str()) || matches!(lower.as_str(), "todos" | "todo")
        }
        _ => false,
    }
}

/// An `any`/`all` word directly after a clause keyword is a selection
/// modifier, except `any todos`, where it belongs to the todo value.
fn take_modifier(cursor: &mut Cursor) -> Option<ClauseMod> {
    let word = cursor.peek_word()?;
    let modifier = match word.as_str() {
        "any" => ClauseMod::Any,
        "all" => ClauseMod::All,
        _ => return None,
    };
    if modifier == ClauseMod::Any
        && matches!(cursor.peek2_word().as_deref(), Some("todos" | "todo"))
    {
        return None;
    }
    cursor.bump();
    Some(modifier)
}

fn parse_value(
    cursor: &mut Cursor,
    kind: ClauseKind,
    keyword_span: Span,
) -> Result<ClauseValue, ParseError> {
    let Some(token) = cursor.peek() else {
        return Err(ParseError::new(
            format!("Clause '{kind}' is missing its value"),
            keyword_span,
        ));
    };

    match &token.kind {
        TokenKind::Tag(raw) => {
            cursor.bump();
            Ok(ClauseValue::Tag(TagName::from(raw.as_str())))
        }
        TokenKind::Text(text) => {
            cursor.bump();
            Ok(ClauseValue::Text(text.clone()))
        }
        TokenKind::Pattern(source) => {
            cursor.bump();
            WrappedRegex::pattern(source)
                .map(ClauseValue::Regex)
                .map_err(|err| ParseError::new(format!("Invalid regex: {err}"), token.span))
        }
        TokenKind::Reference(reference) => {
            cursor.bump();
            Ok(ClauseValue::Reference(reference.clone()))
        }
        TokenKind::OpenBrace => {
            cursor.bump();
            let forms = take_forms(cursor);
            let mut sub_ctx = None;
            let group = parse_group(cursor, Terminator::Brace, &mut sub_ctx)?;
            Ok(ClauseValue::Query(Box::new(Query::new(forms, group))))
        }
        TokenKind::Word(w) => {
            let lower = w.to_lowercase();
            if matches!(lower.as_str(), "todos" | "todo") {
                cursor.bump();
                Ok(ClauseValue::Todo(TodoQueryState::Any))
            } else if let Some(state) = TODO_STATES.get(lower.as_str()).copied() {
                cursor.bump();
                match cursor.peek_word().as_deref() {
                    Some("todos" | "todo") => {
                        cursor.bump();
                        Ok(ClauseValue::Todo(state))
                    }
                    _ => Err(ParseError::new(
                        format!("Expected 'todos' after '{w}'"),
                        token.span,
                    )),
                }
            } else {
                Err(ParseError::new(
                    format!("Expected a value for clause '{kind}', found '{w}'"),
                    token.span,
                ))
            }
        }
        _ => Err(ParseError::new(
            format!("Clause '{kind}' is missing its value"),
            token.span,
        )),
    }
}
