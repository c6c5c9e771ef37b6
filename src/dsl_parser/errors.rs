use nom::error::{ContextError, ErrorKind, ParseError as NomParseError};
use std::fmt;
use thiserror::Error;

use super::ast::SourcePosition;
use super::common::skip_trivia;

/// Borrowed error accumulated while nom unwinds. Each entry pairs the input
/// remaining at the failure point with a human readable expectation.
#[derive(Debug, PartialEq)]
pub struct DslParsingError<'a> {
    pub errors: Vec<(&'a str, &'static str)>,
}

impl<'a> DslParsingError<'a> {
    pub fn new(input: &'a str, message: &'static str) -> Self {
        DslParsingError {
            errors: vec![(input, message)],
        }
    }

    /// Remaining input at the deepest point any alternative reached.
    fn furthest(&self) -> Option<&'a str> {
        self.errors
            .iter()
            .map(|(input, _)| *input)
            .min_by_key(|input| input.len())
    }

    /// The most specific message: the first named expectation recorded at
    /// the furthest position, falling back to the generic kind description.
    fn best_message(&self) -> &'static str {
        let furthest_len = self.furthest().map(str::len).unwrap_or(0);
        self.errors
            .iter()
            .filter(|(input, message)| input.len() == furthest_len && !message.is_empty())
            .map(|(_, message)| *message)
            .find(|message| *message != GENERIC_MESSAGE)
            .or_else(|| {
                self.errors
                    .iter()
                    .map(|(_, message)| *message)
                    .find(|message| *message != GENERIC_MESSAGE)
            })
            .unwrap_or(GENERIC_MESSAGE)
    }
}

const GENERIC_MESSAGE: &str = "unexpected input";

impl<'a> NomParseError<&'a str> for DslParsingError<'a> {
    fn from_error_kind(input: &'a str, kind: ErrorKind) -> Self {
        let message = match kind {
            ErrorKind::Eof => "unexpected end of input",
            _ => GENERIC_MESSAGE,
        };
        DslParsingError::new(input, message)
    }

    fn append(_input: &'a str, _kind: ErrorKind, other: Self) -> Self {
        other
    }

    fn or(self, other: Self) -> Self {
        // keep whichever alternative consumed more input
        match (self.furthest(), other.furthest()) {
            (Some(mine), Some(theirs)) if mine.len() < theirs.len() => self,
            _ => other,
        }
    }
}

impl<'a> ContextError<&'a str> for DslParsingError<'a> {
    fn add_context(input: &'a str, ctx: &'static str, mut other: Self) -> Self {
        other.errors.push((input, ctx));
        other
    }
}

impl fmt::Display for DslParsingError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (input, ctx) in &self.errors {
            writeln!(f, "{}: {}", ctx, input)?;
        }
        Ok(())
    }
}

/// Owned parse failure handed to callers of `parse_program`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Parse error at line {line}, column {column} near `{token}`: {message}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub token: String,
    pub message: String,
}

impl ParseError {
    /// Builds an error located where `rest` starts inside `source`.
    pub fn at(source: &str, rest: &str, message: impl Into<String>) -> Self {
        let rest = skip_trivia(rest);
        let position = position_of(source, rest);
        ParseError {
            line: position.line,
            column: position.column,
            token: offending_token(rest),
            message: message.into(),
        }
    }

    pub(crate) fn from_parsing_error(source: &str, error: &DslParsingError<'_>) -> Self {
        let rest = error.furthest().unwrap_or("");
        ParseError::at(source, rest, error.best_message())
    }

    pub fn position(&self) -> SourcePosition {
        SourcePosition {
            line: self.line,
            column: self.column,
        }
    }
}

/// Line and column (both 1-based) of the first character of `rest`, which
/// must be a suffix of `source`.
pub fn position_of(source: &str, rest: &str) -> SourcePosition {
    let offset = source.len().saturating_sub(rest.len());
    let consumed = source.get(..offset).unwrap_or(source);
    let line = consumed.matches('\n').count() + 1;
    let line_start = consumed.rfind('\n').map(|idx| idx + 1).unwrap_or(0);
    let column = consumed[line_start..].chars().count() + 1;
    SourcePosition { line, column }
}

fn offending_token(rest: &str) -> String {
    let word: String = rest
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    if !word.is_empty() {
        return word;
    }
    match rest.chars().next() {
        Some(c) => c.to_string(),
        None => "end of input".to_string(),
    }
}
