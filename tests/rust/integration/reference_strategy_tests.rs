//! Entity references stored as edges versus as id properties.

use complexgraph::config::ReferenceMode;
use complexgraph::engine::{ComplexError, StatementResult};
use complexgraph::statement_compiler::SemanticError;
use complexgraph::store::Value;

use super::common::{engine_with, inserted_id, run, COMPANY_SCHEMA};

const ALICE_AND_BOB: &str = r#"
    INSERT Employee { name = "Alice" } AS alice;
    INSERT Employee { name = "Bob", manager = alice } AS bob;
"#;

#[tokio::test]
async fn test_edge_mapped_reference_creates_one_edge() {
    let (engine, store) = engine_with(ReferenceMode::EdgeMapped);
    run(&engine, COMPANY_SCHEMA).await;
    run(&engine, ALICE_AND_BOB).await;

    let stats = store.stats().await;
    assert_eq!(stats.vertices, 2);
    assert_eq!(stats.edges, 1);
    assert_eq!(store.count_edges("manager").await, 1);

    let results = run(&engine, r#"MATCH (e:Employee { name = "Bob" }) RETURN e.manager;"#).await;
    assert_eq!(
        results[0].rows().unwrap().column("e.manager"),
        vec![&Value::Null]
    );
}

#[tokio::test]
async fn test_scalar_reference_stores_id() {
    let (engine, store) = engine_with(ReferenceMode::ScalarId);
    run(&engine, COMPANY_SCHEMA).await;
    let results = run(&engine, ALICE_AND_BOB).await;
    let alice = inserted_id(&results[0]);

    let stats = store.stats().await;
    assert_eq!(stats.vertices, 2);
    assert_eq!(stats.edges, 0);

    let results = run(&engine, r#"MATCH (e:Employee { name = "Bob" }) RETURN e.manager;"#).await;
    assert_eq!(
        results[0].rows().unwrap().column("e.manager"),
        vec![&Value::Int(alice)]
    );
}

#[tokio::test]
async fn test_scalar_reference_array() {
    let (engine, store) = engine_with(ReferenceMode::ScalarId);
    run(&engine, COMPANY_SCHEMA).await;
    let results = run(
        &engine,
        r#"
        INSERT Employee { name = "Bob" } AS bob;
        INSERT Employee { name = "Eve" } AS eve;
        INSERT Employee { name = "Carol", reports = [bob, eve] };
        "#,
    )
    .await;
    let (bob, eve) = (inserted_id(&results[0]), inserted_id(&results[1]));
    assert_eq!(store.stats().await.edges, 0);

    let results = run(&engine, r#"MATCH (e:Employee { name = "Carol" }) RETURN e.reports;"#).await;
    assert_eq!(
        results[0].rows().unwrap().column("e.reports"),
        vec![&Value::List(vec![Value::Int(bob), Value::Int(eve)])]
    );
}

#[tokio::test]
async fn test_numeric_reference_is_checked_at_run_time() {
    let (engine, store) = engine_with(ReferenceMode::EdgeMapped);
    run(&engine, COMPANY_SCHEMA).await;
    let results = run(&engine, r#"INSERT Document { title = "Spec" } AS doc;"#).await;
    let doc = inserted_id(&results[0]);

    let err = engine
        .execute(&format!(r#"INSERT Employee {{ name = "Zed", manager = {} }};"#, doc))
        .await
        .unwrap_err();
    assert!(matches!(err, ComplexError::Semantic { .. }), "{:?}", err);

    let err = engine
        .execute(r#"INSERT Employee { name = "Zed", manager = 4242 };"#)
        .await
        .unwrap_err();
    assert!(
        matches!(
            err,
            ComplexError::Semantic {
                source: SemanticError::UnresolvedId { id: 4242 },
                ..
            }
        ),
        "{:?}",
        err
    );
    assert_eq!(store.stats().await.vertices, 1);
}

#[tokio::test]
async fn test_alias_reference_type_is_checked() {
    let (engine, _store) = engine_with(ReferenceMode::EdgeMapped);
    run(&engine, COMPANY_SCHEMA).await;
    let err = engine
        .execute(
            r#"
            INSERT Document { title = "Spec" } AS doc;
            INSERT Employee { name = "Zed", manager = doc };
            "#,
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind().to_string(), "SemanticError");
    assert_eq!(err.position().map(|p| p.line), Some(3));
}

#[tokio::test]
async fn test_update_reference_replaces_edge() {
    let (engine, store) = engine_with(ReferenceMode::EdgeMapped);
    run(&engine, COMPANY_SCHEMA).await;
    let results = run(
        &engine,
        r#"
        INSERT Employee { name = "Alice" } AS alice;
        INSERT Employee { name = "Carol" } AS carol;
        INSERT Employee { name = "Bob", manager = alice } AS bob;
        UPDATE bob SET manager = carol;
        "#,
    )
    .await;
    assert_eq!(results[3], StatementResult::Affected { count: 1 });
    assert_eq!(store.count_edges("manager").await, 1);

    let results = run(
        &engine,
        "MATCH (e:Employee)-[:manager]->(m:Employee) RETURN e.name, m.name;",
    )
    .await;
    let rows = results[0].rows().unwrap();
    assert_eq!(rows.column("e.name"), vec![&Value::from("Bob")]);
    assert_eq!(rows.column("m.name"), vec![&Value::from("Carol")]);
}
