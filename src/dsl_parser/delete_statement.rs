use nom::{
    combinator::{cut, map},
    error::context,
    Parser,
};

use super::{
    ast::DeleteStmt,
    common::{keyword, PResult},
    update_statement::parse_target_ref,
};

pub fn parse_delete_statement(input: &str) -> PResult<'_, DeleteStmt<'_>> {
    let (input, _) = keyword("DELETE")(input)?;
    context(
        "Error in DELETE statement",
        cut(map(parse_target_ref, |target| DeleteStmt { target })),
    )
    .parse(input)
}
