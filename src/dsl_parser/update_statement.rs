use nom::{
    branch::alt,
    combinator::{cut, map},
    error::context,
    multi::separated_list1,
    sequence::{delimited, pair, preceded},
    Parser,
};

use super::{
    ast::{TargetRef, UpdateStmt},
    common::{expecting, identifier, keyword, symbol, PResult},
    condition::parse_condition,
    insert_statement::parse_assignment,
    literal::parse_alias_or_id,
};

pub fn parse_update_statement(input: &str) -> PResult<'_, UpdateStmt<'_>> {
    let (input, _) = keyword("UPDATE")(input)?;
    context("Error in UPDATE statement", cut(parse_update_body)).parse(input)
}

/// `target SET assignment ("," assignment)*`
fn parse_update_body(input: &str) -> PResult<'_, UpdateStmt<'_>> {
    map(
        pair(
            parse_target_ref,
            preceded(
                keyword("SET"),
                separated_list1(symbol(","), cut(parse_assignment)),
            ),
        ),
        |(target, assignments)| UpdateStmt {
            target,
            assignments,
        },
    )
    .parse(input)
}

/// `IDENT "{" condition "}"`, an alias, or a numeric element id.
pub fn parse_target_ref(input: &str) -> PResult<'_, TargetRef<'_>> {
    expecting(
        "expected an alias, a numeric id or `Type { condition }`",
        alt((
            map(
                pair(
                    identifier,
                    delimited(symbol("{"), cut(parse_condition), cut(symbol("}"))),
                ),
                |(type_name, condition)| TargetRef::Pattern {
                    type_name,
                    condition,
                },
            ),
            map(parse_alias_or_id, TargetRef::Element),
        )),
    )(input)
}
