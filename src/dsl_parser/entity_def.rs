use nom::{
    combinator::{cut, map, opt},
    error::context,
    sequence::{pair, preceded},
    Parser,
};

use super::{
    ast::{DataType, EntityDef, FieldDecl, PrimitiveType},
    common::{braced_list, expecting, identifier, keyword, symbol, PResult},
    errors::DslParsingError,
};

pub fn parse_entity_def(input: &str) -> PResult<'_, EntityDef<'_>> {
    let (input, _) = keyword("ENTITY")(input)?;
    context("Error in ENTITY definition", cut(parse_entity_body)).parse(input)
}

fn parse_entity_body(input: &str) -> PResult<'_, EntityDef<'_>> {
    let (input, (name, leading, fields, trailing)) = (
        identifier,
        opt(parse_extends),
        parse_field_block,
        opt(parse_extends),
    )
        .parse(input)?;

    let extends = match (leading, trailing) {
        (Some(_), Some(_)) => {
            return Err(nom::Err::Failure(DslParsingError::new(
                input,
                "EXTENDS may appear only once",
            )))
        }
        (leading, trailing) => leading.or(trailing),
    };

    Ok((
        input,
        EntityDef {
            name,
            fields,
            extends,
        },
    ))
}

fn parse_extends(input: &str) -> PResult<'_, &str> {
    preceded(keyword("EXTENDS"), cut(identifier)).parse(input)
}

pub fn parse_field_block(input: &str) -> PResult<'_, Vec<FieldDecl<'_>>> {
    braced_list(
        "expected `,` or `}` after field declaration",
        parse_field_decl,
    )
    .parse(input)
}

/// `IDENT ":" type`
fn parse_field_decl(input: &str) -> PResult<'_, FieldDecl<'_>> {
    map(
        pair(
            expecting("expected a field name", identifier),
            cut(preceded(symbol(":"), parse_data_type)),
        ),
        |(name, data_type)| FieldDecl { name, data_type },
    )
    .parse(input)
}

/// Primitive keyword or entity name, optionally followed by `[]`.
pub fn parse_data_type(input: &str) -> PResult<'_, DataType<'_>> {
    let (input, (word, brackets)) = pair(
        expecting("expected a field type", identifier),
        opt(pair(symbol("["), cut(symbol("]")))),
    )
    .parse(input)?;
    let data_type = match (PrimitiveType::from_keyword(word), brackets.is_some()) {
        (Some(kind), false) => DataType::Primitive(kind),
        (Some(kind), true) => DataType::PrimitiveArray(kind),
        (None, false) => DataType::EntityRef(word),
        (None, true) => DataType::EntityRefArray(word),
    };
    Ok((input, data_type))
}
