use nom::{
    combinator::{cut, map, opt},
    error::context,
    multi::separated_list1,
    sequence::{pair, preceded},
    Parser,
};

use super::{
    ast::{QueryStmt, ReturnItem},
    common::{identifier, keyword, symbol, PResult},
    condition::parse_condition,
    path_pattern::parse_path_pattern,
};

pub fn parse_match_statement(input: &str) -> PResult<'_, QueryStmt<'_>> {
    let (input, _) = keyword("MATCH")(input)?;
    context("Error in MATCH statement", cut(parse_match_body)).parse(input)
}

/// `path [WHERE condition] [RETURN item ("," item)*]`
fn parse_match_body(input: &str) -> PResult<'_, QueryStmt<'_>> {
    map(
        (
            parse_path_pattern,
            opt(preceded(keyword("WHERE"), cut(parse_condition))),
            opt(preceded(keyword("RETURN"), cut(parse_return_items))),
        ),
        |(pattern, where_clause, return_items)| QueryStmt {
            pattern,
            where_clause,
            return_items: return_items.unwrap_or_default(),
        },
    )
    .parse(input)
}

fn parse_return_items(input: &str) -> PResult<'_, Vec<ReturnItem<'_>>> {
    context(
        "Error in RETURN clause",
        separated_list1(symbol(","), cut(parse_return_item)),
    )
    .parse(input)
}

/// `IDENT ["." IDENT]`
fn parse_return_item(input: &str) -> PResult<'_, ReturnItem<'_>> {
    map(
        pair(identifier, opt(preceded(symbol("."), cut(identifier)))),
        |(alias, property)| ReturnItem { alias, property },
    )
    .parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_with_where_and_return() {
        let (rest, query) = parse_match_statement(
            "MATCH (e:Employee)-[:manager]->(m:Employee) WHERE m.name = \"Alice\" RETURN e.name, m;",
        )
        .unwrap();
        assert_eq!(rest, ";");
        assert_eq!(query.pattern.hops.len(), 1);
        assert!(query.where_clause.is_some());
        assert_eq!(query.return_items.len(), 2);
        assert_eq!(query.return_items[0].label(), "e.name");
        assert_eq!(query.return_items[1].label(), "m");
    }

    #[test]
    fn test_match_without_return() {
        let (_, query) = parse_match_statement("MATCH (n)").unwrap();
        assert!(query.return_items.is_empty());
        assert!(query.where_clause.is_none());
    }

    #[test]
    fn test_trailing_comma_in_return_is_failure() {
        let Err(nom::Err::Failure(e)) = parse_match_statement("MATCH (n) RETURN n.name, ;")
        else {
            panic!("dangling comma must be a failure");
        };
        assert_eq!(e.errors[0], (";", "expected an identifier"));
    }

    #[test]
    fn test_empty_return_is_failure() {
        assert!(matches!(
            parse_match_statement("MATCH (n) RETURN ;"),
            Err(nom::Err::Failure(_))
        ));
    }
}
