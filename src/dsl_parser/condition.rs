use nom::{
    branch::alt,
    combinator::{cut, map, opt, value},
    multi::many0,
    sequence::{pair, preceded},
    Parser,
};

use super::{
    ast::{Condition, LogicalOperator, PropertyEquals, PropertyPath},
    common::{expecting, identifier, keyword, symbol, PResult},
    literal::parse_literal,
};

/// `prop_eq ((AND | OR) prop_eq)*`
pub fn parse_condition(input: &str) -> PResult<'_, Condition<'_>> {
    map(
        pair(
            parse_property_equals,
            many0(pair(parse_logical_operator, cut(parse_property_equals))),
        ),
        |(first, rest)| Condition { first, rest },
    )
    .parse(input)
}

fn parse_logical_operator(input: &str) -> PResult<'_, LogicalOperator> {
    alt((
        value(LogicalOperator::And, keyword("AND")),
        value(LogicalOperator::Or, keyword("OR")),
    ))
    .parse(input)
}

/// `[alias "."] property "=" literal`
pub fn parse_property_equals(input: &str) -> PResult<'_, PropertyEquals<'_>> {
    map(
        (
            parse_property_path,
            cut(preceded(
                expecting(
                    "expected `=`; conditions only support equality",
                    symbol("="),
                ),
                parse_literal,
            )),
        ),
        |(path, value)| PropertyEquals { path, value },
    )
    .parse(input)
}

fn parse_property_path(input: &str) -> PResult<'_, PropertyPath<'_>> {
    map(
        pair(
            expecting("expected a property condition", identifier),
            opt(preceded(symbol("."), cut(identifier))),
        ),
        |(first, property)| match property {
            Some(property) => PropertyPath {
                alias: Some(first),
                property,
            },
            None => PropertyPath {
                alias: None,
                property: first,
            },
        },
    )
    .parse(input)
}
