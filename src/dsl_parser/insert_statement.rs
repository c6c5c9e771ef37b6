use nom::{
    combinator::{cut, map, opt},
    error::context,
    sequence::{pair, preceded},
    Parser,
};

use super::{
    ast::{Assignment, InsertEntity},
    common::{braced_list, expecting, identifier, keyword, symbol, PResult},
    literal::parse_assign_value,
};

pub fn parse_insert_statement(input: &str) -> PResult<'_, InsertEntity<'_>> {
    let (input, _) = keyword("INSERT")(input)?;
    context("Error in INSERT statement", cut(parse_insert_body)).parse(input)
}

fn parse_insert_body(input: &str) -> PResult<'_, InsertEntity<'_>> {
    map(
        (
            identifier,
            parse_assignment_block,
            opt(preceded(keyword("AS"), cut(identifier))),
        ),
        |(type_name, assignments, alias)| InsertEntity {
            type_name,
            assignments,
            alias,
        },
    )
    .parse(input)
}

pub fn parse_assignment_block(input: &str) -> PResult<'_, Vec<Assignment<'_>>> {
    braced_list("expected `,` or `}` after assignment", parse_assignment).parse(input)
}

/// `IDENT "=" value`
pub fn parse_assignment(input: &str) -> PResult<'_, Assignment<'_>> {
    map(
        pair(
            expecting("expected a field name", identifier),
            cut(preceded(symbol("="), parse_assign_value)),
        ),
        |(field, value)| Assignment { field, value },
    )
    .parse(input)
}
