//! End-to-end scenarios over the Employee/Document/Epic model.

use complexgraph::engine::StatementResult;
use complexgraph::graph_catalog::SchemaView;
use complexgraph::store::Value;

use super::common::{engine, run, strings, COMPANY_SCHEMA};

const STAFF: &str = r#"
    INSERT Employee { name = "Alice" } AS alice;
    INSERT Employee { name = "Bob", manager = alice } AS bob;
    INSERT Employee { name = "Carol", manager = alice, reports = [bob] } AS carol;
"#;

#[tokio::test]
async fn test_company_scenario() {
    let (engine, store) = engine();
    let schema_results = run(&engine, COMPANY_SCHEMA).await;
    assert!(schema_results
        .iter()
        .all(|r| *r == StatementResult::Acknowledged));

    let results = run(&engine, STAFF).await;
    assert_eq!(results.len(), 3);
    match &results[2] {
        StatementResult::Inserted { alias, .. } => assert_eq!(alias.as_deref(), Some("carol")),
        other => panic!("unexpected result {:?}", other),
    }

    let mut names = strings(&engine, "MATCH (e:Employee) RETURN e.name;", "e.name").await;
    names.sort();
    assert_eq!(names, vec!["Alice", "Bob", "Carol"]);

    let results = run(
        &engine,
        "MATCH (m:Employee)<-[:manager]-(e:Employee) RETURN m.name, e.name;",
    )
    .await;
    let rows = results[0].rows().unwrap();
    assert_eq!(rows.columns, vec!["m.name", "e.name"]);
    let mut pairs: Vec<(String, String)> = rows
        .rows
        .iter()
        .map(|row| {
            (
                row.get("m.name").unwrap().as_str().unwrap().to_string(),
                row.get("e.name").unwrap().as_str().unwrap().to_string(),
            )
        })
        .collect();
    pairs.sort();
    assert_eq!(
        pairs,
        vec![
            ("Alice".to_string(), "Bob".to_string()),
            ("Alice".to_string(), "Carol".to_string()),
        ]
    );

    assert_eq!(store.count_edges("manager").await, 2);
    assert_eq!(store.count_edges("reports").await, 1);
}

#[tokio::test]
async fn test_relationship_with_edge_property() {
    let (engine, _store) = engine();
    run(&engine, COMPANY_SCHEMA).await;
    let results = run(
        &engine,
        r#"
        RELATIONSHIP IN_DOCUMENT (Epic 1 -> Document *) { page_number: INT };
        INSERT Epic { name = "Checkout" } AS epic;
        INSERT Document { title = "Payments", sections = ["intro", "flows"] } AS doc;
        CONNECT epic - IN_DOCUMENT -> doc { page_number = 42 };
        MATCH (ep:Epic)-[r:IN_DOCUMENT]->(d:Document) RETURN r.page_number, d.title;
        "#,
    )
    .await;

    assert_eq!(results[3], StatementResult::Acknowledged);
    let rows = results[4].rows().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows.column("r.page_number"), vec![&Value::Int(42)]);
    assert_eq!(rows.column("d.title"), vec![&Value::from("Payments")]);
}

#[tokio::test]
async fn test_connect_rejects_wrong_endpoint_type() {
    let (engine, _store) = engine();
    run(&engine, COMPANY_SCHEMA).await;
    let err = engine
        .execute(
            r#"
            RELATIONSHIP IN_DOCUMENT (Epic -> Document);
            INSERT Document { title = "A" } AS a;
            INSERT Document { title = "B" } AS b;
            CONNECT a - IN_DOCUMENT -> b;
            "#,
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind().to_string(), "SemanticError");
    assert_eq!(err.position().map(|p| p.line), Some(5));
}

#[tokio::test]
async fn test_update_by_pattern() {
    let (engine, _store) = engine();
    run(&engine, COMPANY_SCHEMA).await;
    run(&engine, STAFF).await;

    let results = run(
        &engine,
        r#"UPDATE Employee { name = "Alice" } SET department = "Senior Engineering";"#,
    )
    .await;
    assert_eq!(results, vec![StatementResult::Affected { count: 1 }]);

    let departments = strings(
        &engine,
        r#"MATCH (e:Employee { name = "Alice" }) RETURN e.department;"#,
        "e.department",
    )
    .await;
    assert_eq!(departments, vec!["Senior Engineering"]);
}

#[tokio::test]
async fn test_update_and_delete_by_alias_and_id() {
    let (engine, store) = engine();
    run(&engine, COMPANY_SCHEMA).await;
    let results = run(
        &engine,
        r#"
        INSERT Employee { name = "Dan" } AS dan;
        UPDATE dan SET department = "Ops";
        "#,
    )
    .await;
    let dan = super::common::inserted_id(&results[0]);
    assert_eq!(results[1], StatementResult::Affected { count: 1 });

    let results = run(&engine, &format!("DELETE {};", dan)).await;
    assert_eq!(results, vec![StatementResult::Affected { count: 1 }]);
    assert_eq!(store.stats().await.vertices, 0);

    let results = run(&engine, &format!("DELETE {};", dan)).await;
    assert_eq!(results, vec![StatementResult::Affected { count: 0 }]);
}

#[tokio::test]
async fn test_delete_by_condition_is_left_fold() {
    let (engine, _store) = engine();
    run(&engine, COMPANY_SCHEMA).await;
    run(&engine, STAFF).await;
    run(
        &engine,
        r#"UPDATE Employee { name = "Bob" } SET department = "Ops";"#,
    )
    .await;

    // (name = Alice OR name = Bob) AND department = Ops
    let results = run(
        &engine,
        r#"DELETE Employee { name = "Alice" OR name = "Bob" AND department = "Ops" };"#,
    )
    .await;
    assert_eq!(results, vec![StatementResult::Affected { count: 1 }]);

    let mut names = strings(&engine, "MATCH (e:Employee) RETURN e.name;", "e.name").await;
    names.sort();
    assert_eq!(names, vec!["Alice", "Carol"]);
}

#[tokio::test]
async fn test_extends_requires_defined_parent() {
    let (engine, _store) = engine();
    let err = engine
        .execute("ENTITY Manager EXTENDS Person { level: INT };")
        .await
        .unwrap_err();
    assert_eq!(err.kind().to_string(), "SemanticError");
    assert!(engine.schema().await.entity("Manager").is_none());

    run(
        &engine,
        "ENTITY Person { name: STRING };\nENTITY Manager EXTENDS Person { level: INT };",
    )
    .await;
    let schema = engine.schema().await;
    assert!(schema.is_a("Manager", "Person"));
    let fields: Vec<String> = schema
        .effective_fields("Manager")
        .unwrap()
        .into_iter()
        .map(|field| field.name)
        .collect();
    assert_eq!(fields, vec!["name", "level"]);
}

#[tokio::test]
async fn test_supertype_pattern_matches_subtypes() {
    let (engine, _store) = engine();
    run(
        &engine,
        r#"
        ENTITY Person { name: STRING };
        ENTITY Manager { level: INT } EXTENDS Person;
        INSERT Person { name = "Pat" };
        INSERT Manager { name = "Max", level = 3 };
        "#,
    )
    .await;

    let mut people = strings(&engine, "MATCH (p:Person) RETURN p.name;", "p.name").await;
    people.sort();
    assert_eq!(people, vec!["Max", "Pat"]);

    let managers = strings(&engine, "MATCH (m:Manager) RETURN m.name;", "m.name").await;
    assert_eq!(managers, vec!["Max"]);
}

#[tokio::test]
async fn test_returned_nodes_hide_type_family() {
    let (engine, _store) = engine();
    run(&engine, "ENTITY Person { name: STRING };").await;
    let results = run(
        &engine,
        r#"INSERT Person { name = "Pat" }; MATCH (p:Person) RETURN p;"#,
    )
    .await;
    let rows = results[1].rows().unwrap();
    match rows.column("p")[0] {
        Value::Node(node) => {
            assert_eq!(node.label, "Person");
            assert_eq!(node.properties.len(), 1);
            assert_eq!(node.properties.get("name"), Some(&Value::from("Pat")));
        }
        other => panic!("expected a node, got {:?}", other),
    }
}

#[tokio::test]
async fn test_typed_literals_are_normalized() {
    let (engine, _store) = engine();
    run(
        &engine,
        r#"
        ENTITY Event { day: DATE, at: DATETIME, ref: UUID, score: FLOAT, meta: JSON };
        INSERT Event {
            day = "2024-02-29",
            at = "2024-02-29T10:00:00+02:00",
            ref = "67E55044-10B1-426F-9247-BB680E5FE0C8",
            score = 3,
            meta = "{ \"a\": [1, 2] }"
        };
        "#,
    )
    .await;
    let results = run(
        &engine,
        "MATCH (e:Event) RETURN e.day, e.at, e.ref, e.score, e.meta;",
    )
    .await;
    let row = &results[0].rows().unwrap().rows[0];
    assert_eq!(row.get("e.day"), Some(&Value::from("2024-02-29")));
    assert_eq!(row.get("e.at"), Some(&Value::from("2024-02-29T10:00:00+02:00")));
    assert_eq!(
        row.get("e.ref"),
        Some(&Value::from("67e55044-10b1-426f-9247-bb680e5fe0c8"))
    );
    assert_eq!(row.get("e.score"), Some(&Value::Float(3.0)));
    assert_eq!(row.get("e.meta"), Some(&Value::from(r#"{"a":[1,2]}"#)));

    let err = engine
        .execute(r#"INSERT Event { day = "29/02/2024" };"#)
        .await
        .unwrap_err();
    assert_eq!(err.kind().to_string(), "SemanticError");
}

#[tokio::test]
async fn test_query_without_return_is_acknowledged() {
    let (engine, _store) = engine();
    run(&engine, COMPANY_SCHEMA).await;
    let results = run(&engine, "MATCH (e:Employee);").await;
    assert_eq!(results, vec![StatementResult::Acknowledged]);
}

#[tokio::test]
async fn test_integer_condition_matches_float_field() {
    let (engine, _store) = engine();
    run(
        &engine,
        r#"
        ENTITY Event { name: STRING, score: FLOAT };
        INSERT Event { name = "a", score = 3 };
        INSERT Event { name = "b", score = 3.5 };
        "#,
    )
    .await;

    let names = strings(&engine, "MATCH (e:Event { score = 3 }) RETURN e.name;", "e.name").await;
    assert_eq!(names, vec!["a"]);
    let names = strings(&engine, "MATCH (e:Event) WHERE e.score = 3.0 RETURN e.name;", "e.name").await;
    assert_eq!(names, vec!["a"]);

    let results = run(&engine, "UPDATE Event { score = 3 } SET name = \"c\";").await;
    assert_eq!(results, vec![StatementResult::Affected { count: 1 }]);
}
