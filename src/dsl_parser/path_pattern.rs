use nom::{
    branch::alt,
    combinator::{cut, map, opt, value},
    multi::many0,
    sequence::{delimited, pair, preceded, terminated},
    Parser,
};

use super::{
    ast::{Condition, Direction, NodePattern, PathPattern, RelationshipPattern},
    common::{expecting, identifier, symbol, PResult},
    condition::parse_condition,
};

/// `node (edge node)*`
pub fn parse_path_pattern(input: &str) -> PResult<'_, PathPattern<'_>> {
    map(
        pair(
            parse_node_pattern,
            many0(pair(parse_relationship_pattern, cut(parse_node_pattern))),
        ),
        |(start, hops)| PathPattern { start, hops },
    )
    .parse(input)
}

/// `"(" [IDENT] [":" IDENT] ["{" condition "}"] ")"`
pub fn parse_node_pattern(input: &str) -> PResult<'_, NodePattern<'_>> {
    map(
        delimited(
            expecting("expected a node pattern `(...)`", symbol("(")),
            parse_element_body,
            cut(symbol(")")),
        ),
        |(name, label, properties)| NodePattern {
            name,
            label,
            properties,
        },
    )
    .parse(input)
}

/// `-[..]->`, `<-[..]-` or `-[..]-`
pub fn parse_relationship_pattern(input: &str) -> PResult<'_, RelationshipPattern<'_>> {
    let incoming = map(
        preceded(symbol("<-"), cut(terminated(parse_edge_body, symbol("-")))),
        |body| (body, Direction::Incoming),
    );
    let outgoing_or_either = preceded(
        symbol("-"),
        cut(pair(
            parse_edge_body,
            expecting(
                "expected `->` or `-`",
                alt((
                    value(Direction::Outgoing, symbol("->")),
                    value(Direction::Either, symbol("-")),
                )),
            ),
        )),
    );
    map(
        alt((incoming, outgoing_or_either)),
        |((name, label, properties), direction)| RelationshipPattern {
            name,
            label,
            properties,
            direction,
        },
    )
    .parse(input)
}

type ElementBody<'a> = (Option<&'a str>, Option<&'a str>, Option<Condition<'a>>);

fn parse_edge_body(input: &str) -> PResult<'_, ElementBody<'_>> {
    delimited(symbol("["), parse_element_body, symbol("]")).parse(input)
}

fn parse_element_body(input: &str) -> PResult<'_, ElementBody<'_>> {
    (
        opt(identifier),
        opt(preceded(symbol(":"), cut(identifier))),
        opt(delimited(
            symbol("{"),
            cut(parse_condition),
            cut(symbol("}")),
        )),
    )
        .parse(input)
}
