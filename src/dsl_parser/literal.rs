use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{anychar, char, digit1, none_of, satisfy},
    combinator::{cut, map, not, opt, recognize, value},
    multi::{many0, separated_list1},
    sequence::{pair, preceded, terminated},
    Parser,
};

use super::{
    ast::{AliasOrId, AssignValue, Literal},
    common::{
        expecting, identifier, integer, is_identifier_char, keyword, skip_trivia, symbol, ws,
        PResult,
    },
    errors::DslParsingError,
};

pub fn parse_literal(input: &str) -> PResult<'_, Literal<'_>> {
    expecting(
        "expected a literal value",
        alt((
            parse_string_literal,
            parse_number_literal,
            value(Literal::Boolean(true), keyword("TRUE")),
            value(Literal::Boolean(false), keyword("FALSE")),
            value(Literal::Null, keyword("NULL")),
        )),
    )(input)
}

/// Double-quoted string. The returned body keeps escape sequences verbatim
/// so the source text can be reproduced exactly.
fn parse_string_literal(input: &str) -> PResult<'_, Literal<'_>> {
    let opening = skip_trivia(input);
    let body = recognize(many0(alt((
        preceded(char('\\'), anychar),
        none_of("\\\""),
    ))));
    ws(map(
        preceded(char('"'), cut(terminated(body, char('"')))),
        Literal::String,
    ))(input)
    .map_err(|e| match e {
        nom::Err::Failure(_) => nom::Err::Failure(DslParsingError::new(
            opening,
            "unterminated string literal",
        )),
        other => other,
    })
}

fn parse_number_literal(input: &str) -> PResult<'_, Literal<'_>> {
    let (rest, text) = expecting(
        "expected a number",
        ws(terminated(
            recognize((opt(tag("-")), digit1, opt(pair(tag("."), digit1)))),
            not(satisfy(is_identifier_char)),
        )),
    )(input)?;
    let literal = if text.contains('.') {
        text.parse::<f64>().map(Literal::Float).map_err(|_| {
            nom::Err::Failure(DslParsingError::new(text, "invalid float literal"))
        })?
    } else {
        text.parse::<i64>().map(Literal::Integer).map_err(|_| {
            nom::Err::Failure(DslParsingError::new(text, "integer literal out of range"))
        })?
    };
    Ok((rest, literal))
}

/// Right-hand side of an assignment: literal, alias reference or array.
pub fn parse_assign_value(input: &str) -> PResult<'_, AssignValue<'_>> {
    expecting(
        "expected a literal, alias or array value",
        alt((
            parse_array,
            map(parse_literal, AssignValue::Literal),
            map(identifier, AssignValue::Reference),
        )),
    )(input)
}

fn parse_array(input: &str) -> PResult<'_, AssignValue<'_>> {
    map(
        preceded(
            symbol("["),
            cut(alt((
                value(Vec::new(), symbol("]")),
                terminated(
                    separated_list1(symbol(","), cut(parse_assign_value)),
                    expecting("expected `,` or `]` in array", symbol("]")),
                ),
            ))),
        ),
        AssignValue::Array,
    )
    .parse(input)
}

/// Either a numeric element id or an alias bound earlier in the script.
pub fn parse_alias_or_id(input: &str) -> PResult<'_, AliasOrId<'_>> {
    expecting(
        "expected an alias or a numeric id",
        alt((map(integer, AliasOrId::Id), map(identifier, AliasOrId::Alias))),
    )(input)
}

/// Resolves backslash escapes in a string literal body.
pub fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
