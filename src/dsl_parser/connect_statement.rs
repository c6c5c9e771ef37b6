use nom::{
    combinator::{cut, map, opt},
    error::context,
    Parser,
};

use super::{
    ast::ConnectRel,
    common::{identifier, keyword, symbol, PResult},
    insert_statement::parse_assignment_block,
    literal::parse_alias_or_id,
};

pub fn parse_connect_statement(input: &str) -> PResult<'_, ConnectRel<'_>> {
    let (input, _) = keyword("CONNECT")(input)?;
    context("Error in CONNECT statement", cut(parse_connect_body)).parse(input)
}

/// `(IDENT | INT) "-" IDENT "->" (IDENT | INT) [assignment block]`
fn parse_connect_body(input: &str) -> PResult<'_, ConnectRel<'_>> {
    map(
        (
            parse_alias_or_id,
            symbol("-"),
            identifier,
            symbol("->"),
            parse_alias_or_id,
            opt(parse_assignment_block),
        ),
        |(source, _, relationship, _, target, properties)| ConnectRel {
            source,
            relationship,
            target,
            properties: properties.unwrap_or_default(),
        },
    )
    .parse(input)
}
