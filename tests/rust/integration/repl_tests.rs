//! The interactive shell driven from an in-memory input buffer.

use std::io::Cursor;

use complexgraph::repl::run_repl;

use super::common::engine;

async fn session(input: &str) -> String {
    let (engine, _store) = engine();
    let mut output = Vec::new();
    run_repl(&engine, Cursor::new(input), &mut output)
        .await
        .unwrap();
    String::from_utf8(output).unwrap()
}

#[tokio::test]
async fn test_multi_line_statements() {
    let output = session(
        "ENTITY Person { name: STRING };\n\
         INSERT Person {\n\
           name = \"Ann\"\n\
         } AS ann;\n\
         MATCH (p:Person)\n\
         RETURN p.name;\n",
    )
    .await;
    assert!(output.contains("OK"), "{}", output);
    assert!(output.contains("as ann"), "{}", output);
    assert!(output.contains("p.name"), "{}", output);
    assert!(output.contains("\"Ann\""), "{}", output);
    assert!(output.contains("(1 row)"), "{}", output);
}

#[tokio::test]
async fn test_schema_persists_between_statements() {
    let output = session(
        "ENTITY Person { name: STRING };\n\
         ENTITY Manager EXTENDS Person { level: INT };\n\
         .schema\n",
    )
    .await;
    assert!(output.contains("ENTITY Person { name: STRING }"), "{}", output);
    assert!(
        output.contains("ENTITY Manager EXTENDS Person { name: STRING, level: INT }"),
        "{}",
        output
    );
}

#[tokio::test]
async fn test_errors_do_not_end_the_session() {
    let output = session(
        "MATCH (;\n\
         INSERT Nobody {};\n\
         .bogus\n\
         .help\n\
         .exit\n\
         ENTITY Never {};\n",
    )
    .await;
    assert!(output.contains("ParseError at line 1"), "{}", output);
    assert!(output.contains("SemanticError at line 1"), "{}", output);
    assert!(output.contains("Unknown command `.bogus`"), "{}", output);
    assert!(output.contains(".schema"), "{}", output);
    assert!(!output.contains("OK"), "{}", output);
}

#[tokio::test]
async fn test_unterminated_input_is_reported() {
    let output = session("ENTITY Person { name: STRING }\n").await;
    assert!(output.contains("Discarded unterminated input"), "{}", output);
}

#[tokio::test]
async fn test_trailing_comment_after_semicolon_ends_statement() {
    let output = session(
        "ENTITY Person { name: STRING }; -- people\n\
         INSERT Person { name = \"Ann -- not a comment\" } AS ann; // first\n\
         .schema\n",
    )
    .await;
    assert!(output.contains("OK"), "{}", output);
    assert!(output.contains("as ann"), "{}", output);
    assert!(output.contains("ENTITY Person { name: STRING }"), "{}", output);
    assert!(!output.contains("Discarded unterminated input"), "{}", output);
}
