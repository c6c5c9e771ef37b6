//! Parser for the schema and data-manipulation DSL.
//!
//! A script is a sequence of `;`-terminated statements. `parse_program` either
//! returns every statement or the first syntax error with its line, column and
//! offending token; nothing is partially returned.

use ast::{Program, Statement};
use common::{identifier, skip_trivia, symbol, PResult};
use errors::{position_of, DslParsingError};

pub use errors::ParseError;

pub mod ast;
pub mod common;
mod condition;
mod connect_statement;
mod delete_statement;
mod display;
mod entity_def;
pub mod errors;
mod insert_statement;
pub mod literal;
mod match_statement;
mod path_pattern;
mod relationship_def;
mod update_statement;

pub fn parse_program(input: &str) -> Result<Program<'_>, ParseError> {
    let mut statements = Vec::new();
    let mut positions = Vec::new();
    let mut rest = skip_trivia(input);

    while !rest.is_empty() {
        let position = position_of(input, rest);
        let (remaining, statement) = match parse_statement(rest) {
            Ok(parsed) => parsed,
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
                return Err(ParseError::from_parsing_error(input, &e))
            }
            Err(nom::Err::Incomplete(_)) => {
                return Err(ParseError::at(input, rest, "incomplete input"))
            }
        };
        let remaining = match symbol(";")(remaining) {
            Ok((after, _)) => after,
            Err(_) => {
                return Err(ParseError::at(
                    input,
                    remaining,
                    "expected `;` after statement",
                ))
            }
        };
        statements.push(statement);
        positions.push(position);
        rest = skip_trivia(remaining);
    }

    Ok(Program {
        statements,
        positions,
    })
}

/// Parses one statement (without its terminating `;`), dispatching on the
/// leading keyword.
pub fn parse_statement(input: &str) -> PResult<'_, Statement<'_>> {
    let input = skip_trivia(input);
    let leading = identifier(input).map(|(_, word)| word).unwrap_or("");
    match leading.to_ascii_uppercase().as_str() {
        "ENTITY" => entity_def::parse_entity_def(input)
            .map(|(rest, def)| (rest, Statement::EntityDef(def))),
        "RELATIONSHIP" => relationship_def::parse_relationship_def(input)
            .map(|(rest, def)| (rest, Statement::RelationshipDef(def))),
        "INSERT" => insert_statement::parse_insert_statement(input)
            .map(|(rest, insert)| (rest, Statement::InsertEntity(insert))),
        "CONNECT" => connect_statement::parse_connect_statement(input)
            .map(|(rest, connect)| (rest, Statement::ConnectRel(connect))),
        "UPDATE" => update_statement::parse_update_statement(input)
            .map(|(rest, update)| (rest, Statement::Update(update))),
        "DELETE" => delete_statement::parse_delete_statement(input)
            .map(|(rest, delete)| (rest, Statement::Delete(delete))),
        "MATCH" => match_statement::parse_match_statement(input)
            .map(|(rest, query)| (rest, Statement::Query(query))),
        _ => Err(nom::Err::Error(DslParsingError::new(
            input,
            "expected a statement (ENTITY, RELATIONSHIP, INSERT, CONNECT, UPDATE, DELETE or MATCH)",
        ))),
    }
}
