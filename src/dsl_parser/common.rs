use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while},
    character::complete::{digit1, satisfy},
    combinator::{cut, not, opt, peek, recognize},
    multi::many0,
    sequence::{delimited, pair, terminated},
    IResult, Parser,
};

use super::errors::DslParsingError;

pub type PResult<'a, O> = IResult<&'a str, O, DslParsingError<'a>>;

/// Skips whitespace plus `//` and `--` line comments.
pub fn skip_trivia(mut input: &str) -> &str {
    loop {
        input = input.trim_start();
        if input.starts_with("//") || input.starts_with("--") {
            input = match input.find('\n') {
                Some(idx) => &input[idx + 1..],
                None => "",
            };
        } else {
            return input;
        }
    }
}

/// Runs `inner` with trivia skipped on both sides.
pub fn ws<'a, O, F>(mut inner: F) -> impl FnMut(&'a str) -> PResult<'a, O>
where
    F: Parser<&'a str, Output = O, Error = DslParsingError<'a>>,
{
    move |input: &'a str| {
        let (rest, output) = inner.parse(skip_trivia(input))?;
        Ok((skip_trivia(rest), output))
    }
}

/// Replaces a recoverable error of `inner` with `message`, reported where
/// `inner` started. Failures pass through untouched.
pub fn expecting<'a, O, F>(
    message: &'static str,
    mut inner: F,
) -> impl FnMut(&'a str) -> PResult<'a, O>
where
    F: Parser<&'a str, Output = O, Error = DslParsingError<'a>>,
{
    move |input: &'a str| match inner.parse(input) {
        Err(nom::Err::Error(_)) => Err(nom::Err::Error(DslParsingError::new(
            skip_trivia(input),
            message,
        ))),
        other => other,
    }
}

/// `"{" [item ("," item)* [","]] "}"`. Once an item is parsed it must be
/// followed by `,` or `}`, otherwise the block fails with `separator_message`.
pub fn braced_list<'a, O, F>(
    separator_message: &'static str,
    item: F,
) -> impl Parser<&'a str, Output = Vec<O>, Error = DslParsingError<'a>>
where
    F: Parser<&'a str, Output = O, Error = DslParsingError<'a>>,
{
    delimited(
        symbol("{"),
        many0(terminated(
            item,
            cut(expecting(
                separator_message,
                alt((symbol(","), peek(symbol("}")))),
            )),
        )),
        cut(symbol("}")),
    )
}

pub fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Case-insensitive keyword that must not run into a following identifier
/// character (`INSERTX` is not `INSERT`).
pub fn keyword<'a>(kw: &'static str) -> impl FnMut(&'a str) -> PResult<'a, &'a str> {
    expecting(
        keyword_expectation(kw),
        ws(terminated(tag_no_case(kw), not(satisfy(is_identifier_char)))),
    )
}

/// Punctuation token surrounded by optional trivia.
pub fn symbol<'a>(sym: &'static str) -> impl FnMut(&'a str) -> PResult<'a, &'a str> {
    expecting(symbol_expectation(sym), ws(tag(sym)))
}

pub fn identifier(input: &str) -> PResult<'_, &str> {
    expecting(
        "expected an identifier",
        ws(recognize(pair(
            satisfy(is_identifier_start),
            take_while(is_identifier_char),
        ))),
    )(input)
}

/// Signed integer without a fractional part.
pub fn integer(input: &str) -> PResult<'_, i64> {
    let (rest, digits) = expecting(
        "expected an integer",
        ws(terminated(
            recognize(pair(opt(tag("-")), digit1)),
            not(satisfy(|c| c == '.' || is_identifier_char(c))),
        )),
    )(input)?;
    let value = digits.parse::<i64>().map_err(|_| {
        nom::Err::Failure(DslParsingError::new(
            skip_trivia(input),
            "integer literal out of range",
        ))
    })?;
    Ok((rest, value))
}

fn keyword_expectation(kw: &'static str) -> &'static str {
    match kw {
        "ENTITY" => "expected `ENTITY`",
        "RELATIONSHIP" => "expected `RELATIONSHIP`",
        "EXTENDS" => "expected `EXTENDS`",
        "INSERT" => "expected `INSERT`",
        "AS" => "expected `AS`",
        "CONNECT" => "expected `CONNECT`",
        "UPDATE" => "expected `UPDATE`",
        "SET" => "expected `SET`",
        "DELETE" => "expected `DELETE`",
        "MATCH" => "expected `MATCH`",
        "WHERE" => "expected `WHERE`",
        "RETURN" => "expected `RETURN`",
        "AND" | "OR" => "expected `AND` or `OR`",
        "TRUE" | "FALSE" | "NULL" => "expected a literal value",
        _ => "expected a keyword",
    }
}

fn symbol_expectation(sym: &'static str) -> &'static str {
    match sym {
        "{" => "expected `{`",
        "}" => "expected `}`",
        "(" => "expected `(`",
        ")" => "expected `)`",
        "[" => "expected `[`",
        "]" => "expected `]`",
        ":" => "expected `:`",
        ";" => "expected `;` after statement",
        "," => "expected `,`",
        "=" => "expected `=`",
        "." => "expected `.`",
        "->" => "expected `->`",
        "<-" => "expected `<-`",
        "-" => "expected `-`",
        "*" | "1" => "expected multiplicity `1` or `*`",
        _ => "expected a symbol",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_trivia_removes_comments() {
        let input = "  // first\n -- second\n\tINSERT";
        assert_eq!(skip_trivia(input), "INSERT");
        assert_eq!(skip_trivia("// only a comment"), "");
    }

    #[test]
    fn test_keyword_is_case_insensitive_and_bounded() {
        let (rest, matched) = keyword("INSERT")("insert Employee").unwrap();
        assert_eq!(matched, "insert");
        assert_eq!(rest, "Employee");
        assert!(keyword("INSERT")("INSERTED x").is_err());
    }

    #[test]
    fn test_identifier() {
        let (rest, name) = identifier("  _emp_1 {").unwrap();
        assert_eq!(name, "_emp_1");
        assert_eq!(rest, "{");
        assert!(identifier("1abc").is_err());
    }

    #[test]
    fn test_integer_rejects_fractions() {
        assert_eq!(integer("-42 ").unwrap().1, -42);
        assert!(integer("4.2").is_err());
        assert!(matches!(
            integer("99999999999999999999"),
            Err(nom::Err::Failure(_))
        ));
    }

    #[test]
    fn test_expecting_relabels_errors_at_start() {
        let err = expecting("expected a type name", identifier)("  // note\n 42").unwrap_err();
        let nom::Err::Error(e) = err else {
            panic!("expected a recoverable error");
        };
        assert_eq!(e.errors, vec![("42", "expected a type name")]);
        assert!(matches!(
            expecting("expected an integer", integer)("99999999999999999999"),
            Err(nom::Err::Failure(_))
        ));
    }

    #[test]
    fn test_symbol_skips_surrounding_trivia() {
        let (rest, _) = symbol("->")(" -> // arrow\n b").unwrap();
        assert_eq!(rest, "b");
    }
}
