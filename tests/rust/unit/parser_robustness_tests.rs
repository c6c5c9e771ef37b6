//! Malformed scripts must come back as positioned parse errors, never panics
//! and never partial programs.

use complexgraph::dsl_parser::parse_program;
use test_case::test_case;

#[test]
fn test_malformed_scripts_no_panic() {
    let malformed = vec![
        "ENTITY",
        "ENTITY {",
        "ENTITY A {",
        "ENTITY A { name: }",
        "ENTITY A { name STRING };",
        "RELATIONSHIP R (A -> );",
        "RELATIONSHIP R A -> B;",
        "INSERT",
        "INSERT A { x = [1, 2 };",
        "INSERT A { x = \"unterminated };",
        "CONNECT a - -> b;",
        "UPDATE SET x = 1;",
        "DELETE;",
        "MATCH (",
        "MATCH (n)-[",
        "MATCH (n)-[:R]-> RETURN n;",
        "MATCH (n) WHERE RETURN n;",
        "MATCH (n) RETURN n.;",
        ";",
        "\"",
    ];

    for script in malformed {
        let result = parse_program(script);
        assert!(result.is_err(), "expected a parse error for: {}", script);
    }
}

#[test_case("ENTITY A { name: STRING }", 1 ; "missing terminator at end of input")]
#[test_case("ENTITY A {};\nINSERT A { x = };", 2 ; "error on second line")]
#[test_case("ENTITY A {};\n\n  MATCH (n RETURN n;", 3 ; "error on third line")]
#[test_case("-- header\n// more\nBOGUS;", 3 ; "unknown keyword after comments")]
fn test_error_line(script: &str, line: usize) {
    let err = parse_program(script).unwrap_err();
    assert_eq!(err.line, line, "{:?}", err);
    assert!(err.column >= 1);
    assert!(!err.message.is_empty());
}

#[test_case("entity a {};" ; "lower case keyword")]
#[test_case("EnTiTy A { n: string, m: Int[] };" ; "mixed case keywords and types")]
#[test_case("ENTITY A { n: STRING, };" ; "trailing comma in field block")]
#[test_case("INSERT A {};" ; "empty assignment block")]
#[test_case("INSERT A { n = -5, f = -0.5, b = false, z = null };" ; "signed and keyword literals")]
#[test_case("CONNECT 1 - R -> 2;" ; "numeric endpoints")]
#[test_case("UPDATE 7 SET n = 1;" ; "update by id")]
#[test_case("DELETE A { n = \"x\" OR n = \"y\" };" ; "delete by condition")]
#[test_case("MATCH (n);" ; "query without return")]
#[test_case("MATCH (a)-[r]-(b) RETURN r;" ; "undirected anonymous edge")]
fn test_valid_scripts_parse(script: &str) {
    let program = parse_program(script).unwrap();
    assert_eq!(program.statements.len(), 1);
}

#[test]
fn test_identifiers_are_case_sensitive() {
    let program = parse_program("ENTITY Employee {};\nENTITY employee {};").unwrap();
    let rendered = program.to_string();
    assert!(rendered.contains("ENTITY Employee"));
    assert!(rendered.contains("ENTITY employee"));
}

#[test]
fn test_statement_positions_follow_comments() {
    let script = "// schema\nENTITY A {};   -- trailing\n\n   INSERT A {} AS a;";
    let program = parse_program(script).unwrap();
    assert_eq!(program.positions.len(), 2);
    assert_eq!((program.positions[0].line, program.positions[0].column), (2, 1));
    assert_eq!((program.positions[1].line, program.positions[1].column), (4, 4));
}

#[test]
fn test_first_error_wins() {
    let err = parse_program("INSERT A { x = };\nINSERT B { y = };").unwrap_err();
    assert_eq!(err.line, 1);
}
