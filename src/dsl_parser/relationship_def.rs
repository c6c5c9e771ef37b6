use nom::{
    branch::alt,
    combinator::{cut, map, opt, value},
    error::context,
    Parser,
};

use super::{
    ast::{Multiplicity, RelationshipDef},
    common::{identifier, keyword, symbol, PResult},
    entity_def::parse_field_block,
};

pub fn parse_relationship_def(input: &str) -> PResult<'_, RelationshipDef<'_>> {
    let (input, _) = keyword("RELATIONSHIP")(input)?;
    context(
        "Error in RELATIONSHIP definition",
        cut(parse_relationship_body),
    )
    .parse(input)
}

/// `IDENT "(" IDENT [mult] "->" IDENT [mult] ")" [field block]`
fn parse_relationship_body(input: &str) -> PResult<'_, RelationshipDef<'_>> {
    let (
        input,
        (name, _, source, source_multiplicity, _, target, target_multiplicity, _, fields),
    ) = (
        identifier,
        symbol("("),
        identifier,
        parse_multiplicity,
        symbol("->"),
        identifier,
        parse_multiplicity,
        symbol(")"),
        opt(parse_field_block),
    )
        .parse(input)?;

    Ok((
        input,
        RelationshipDef {
            name,
            source,
            source_multiplicity,
            target,
            target_multiplicity,
            fields: fields.unwrap_or_default(),
        },
    ))
}

/// `*` or `1`; a missing marker means one.
fn parse_multiplicity(input: &str) -> PResult<'_, Multiplicity> {
    map(
        opt(alt((
            value(Multiplicity::Many, symbol("*")),
            value(Multiplicity::One, symbol("1")),
        ))),
        |multiplicity| multiplicity.unwrap_or(Multiplicity::One),
    )
    .parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl_parser::ast::{DataType, PrimitiveType};

    #[test]
    fn test_relationship_with_fields() {
        let (rest, def) = parse_relationship_def(
            "RELATIONSHIP IN_DOCUMENT (Document * -> Epic 1) { page_number: INT };",
        )
        .unwrap();
        assert_eq!(rest, ";");
        assert_eq!(def.name, "IN_DOCUMENT");
        assert_eq!(def.source, "Document");
        assert_eq!(def.source_multiplicity, Multiplicity::Many);
        assert_eq!(def.target, "Epic");
        assert_eq!(def.target_multiplicity, Multiplicity::One);
        assert_eq!(
            def.fields[0].data_type,
            DataType::Primitive(PrimitiveType::Int)
        );
    }

    #[test]
    fn test_relationship_defaults() {
        let (_, def) = parse_relationship_def("RELATIONSHIP KNOWS(Person->Person)").unwrap();
        assert_eq!(def.source_multiplicity, Multiplicity::One);
        assert_eq!(def.target_multiplicity, Multiplicity::One);
        assert!(def.fields.is_empty());
    }

    #[test]
    fn test_missing_arrow_is_failure() {
        assert!(matches!(
            parse_relationship_def("RELATIONSHIP R (A B)"),
            Err(nom::Err::Failure(_))
        ));
    }
}
