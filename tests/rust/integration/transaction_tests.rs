//! A script either takes effect completely or not at all.

use complexgraph::engine::{ComplexError, ErrorKind, StatementResult};
use complexgraph::graph_catalog::SchemaView;
use complexgraph::statement_compiler::SemanticError;

use super::common::{engine, run, COMPANY_SCHEMA};

#[tokio::test]
async fn test_compile_failure_rolls_back_earlier_statements() {
    let (engine, store) = engine();
    run(&engine, COMPANY_SCHEMA).await;
    let before = store.stats().await;

    let err = engine
        .execute(
            r#"
            INSERT Employee { name = "Ghost" } AS ghost;
            ENTITY Temp { value: INT };
            INSERT Employee { nickname = "boo" };
            "#,
        )
        .await
        .unwrap_err();
    match &err {
        ComplexError::Semantic { source, location } => {
            assert!(matches!(source, SemanticError::UnknownField { .. }), "{:?}", source);
            assert_eq!(location.index, 2);
            assert_eq!(location.position.line, 4);
        }
        other => panic!("unexpected error {:?}", other),
    }

    assert_eq!(store.stats().await, before);
    assert!(engine.schema().await.entity("Temp").is_none());
    let results = run(&engine, "MATCH (e:Employee) RETURN e.name;").await;
    assert!(results[0].rows().unwrap().is_empty());
}

#[tokio::test]
async fn test_run_time_failure_rolls_back_created_elements() {
    let (engine, store) = engine();
    run(&engine, COMPANY_SCHEMA).await;
    run(&engine, "RELATIONSHIP MENTORS (Employee -> Employee);").await;
    let before = store.stats().await;

    let err = engine
        .execute(
            r#"
            INSERT Employee { name = "Mia" } AS mia;
            INSERT Employee { name = "Noa", manager = mia } AS noa;
            CONNECT mia - MENTORS -> 9999;
            "#,
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Semantic);

    assert_eq!(store.stats().await, before);
    assert_eq!(store.count_edges("manager").await, 0);
}

#[tokio::test]
async fn test_duplicate_alias_fails_on_second_insert() {
    let (engine, store) = engine();
    run(&engine, COMPANY_SCHEMA).await;
    let err = engine
        .execute(
            r#"
            INSERT Employee { name = "A" } AS twin;
            INSERT Employee { name = "B" } AS twin;
            "#,
        )
        .await
        .unwrap_err();
    match err {
        ComplexError::Semantic {
            source: SemanticError::DuplicateAlias { alias },
            location,
        } => {
            assert_eq!(alias, "twin");
            assert_eq!(location.index, 1);
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(store.stats().await.vertices, 0);
}

#[tokio::test]
async fn test_aliases_do_not_outlive_their_script() {
    let (engine, _store) = engine();
    run(&engine, COMPANY_SCHEMA).await;
    run(&engine, r#"INSERT Employee { name = "Alice" } AS alice;"#).await;

    let err = engine
        .execute(r#"INSERT Employee { name = "Bob", manager = alice };"#)
        .await
        .unwrap_err();
    assert!(
        matches!(
            err,
            ComplexError::Semantic {
                source: SemanticError::UnknownAlias { .. },
                ..
            }
        ),
        "{:?}",
        err
    );
}

#[tokio::test]
async fn test_parse_error_runs_nothing() {
    let (engine, store) = engine();
    let err = engine
        .execute("ENTITY Person { name: STRING };\nINSERT Person { name = };")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
    assert_eq!(err.position().map(|p| p.line), Some(2));
    assert!(engine.schema().await.entity("Person").is_none());
    assert_eq!(store.stats().await.vertex_labels, 0);
}

#[tokio::test]
async fn test_redefinition_is_rejected_across_scripts() {
    let (engine, _store) = engine();
    run(&engine, "ENTITY Person { name: STRING };").await;
    let err = engine
        .execute("ENTITY Person { nick: STRING };")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Semantic);

    let results = run(&engine, "ENTITY Robot { serial: STRING };").await;
    assert_eq!(results, vec![StatementResult::Acknowledged]);
}

#[tokio::test]
async fn test_empty_script_has_no_results() {
    let (engine, _store) = engine();
    assert!(run(&engine, "  // nothing\n").await.is_empty());
}
