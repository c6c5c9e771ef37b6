//! Parsing the rendered text of a parsed script yields the same statements.

use complexgraph::dsl_parser::parse_program;
use test_case::test_case;

fn assert_round_trip(script: &str) {
    let first = parse_program(script).unwrap();
    let rendered = first.to_string();
    let second = parse_program(&rendered)
        .unwrap_or_else(|e| panic!("rendered text does not parse: {}\n{}", e, rendered));
    assert_eq!(first.statements, second.statements, "rendered:\n{}", rendered);
    // Rendering is canonical, so a second pass is a fixed point.
    assert_eq!(second.to_string(), rendered);
}

#[test_case("ENTITY Employee { name: STRING, manager: Employee, reports: Employee[] };" ; "entity with references")]
#[test_case("ENTITY Manager EXTENDS Employee { level: INT };" ; "leading extends")]
#[test_case("ENTITY Manager { level: INT } EXTENDS Employee;" ; "trailing extends")]
#[test_case("ENTITY Doc { tags: STRING[], at: DATETIME, raw: BLOB, id: UUID, meta: JSON, day: DATE, ok: BOOL, score: FLOAT };" ; "every primitive")]
#[test_case("RELATIONSHIP IN_DOCUMENT (Epic 1 -> Document *) { page_number: INT };" ; "relationship with fields")]
#[test_case("RELATIONSHIP KNOWS (Person -> Person);" ; "relationship defaults")]
#[test_case("INSERT Employee { name = \"Carol\", manager = alice, reports = [bob, 12] } AS carol;" ; "insert with references")]
#[test_case("INSERT Note { body = \"say \\\"hi\\\" \\\\ bye\" };" ; "escaped string")]
#[test_case("INSERT M { a = 1, b = -2.25, c = TRUE, d = NULL, e = [] };" ; "literal kinds")]
#[test_case("CONNECT epic - IN_DOCUMENT -> doc { page_number = 42 };" ; "connect with properties")]
#[test_case("CONNECT 3 - KNOWS -> 4;" ; "connect ids")]
#[test_case("UPDATE Employee { name = \"Alice\" } SET department = \"Senior Engineering\";" ; "update by pattern")]
#[test_case("UPDATE bob SET manager = carol, level = 2;" ; "update by alias")]
#[test_case("DELETE Employee { name = \"A\" AND level = 1 OR name = \"B\" };" ; "delete with left fold")]
#[test_case("DELETE 10;" ; "delete by id")]
#[test_case("MATCH (m:Employee)<-[:manager]-(e:Employee) RETURN m.name, e.name;" ; "incoming edge")]
#[test_case("MATCH (ep:Epic)-[r:IN_DOCUMENT { page_number = 42 }]->(d:Document) WHERE d.title = \"x\" RETURN r.page_number, d;" ; "edge filter and where")]
#[test_case("MATCH (a)-[]-(b)-[:R]->(c { n = 1 });" ; "multi hop without return")]
fn test_round_trip(script: &str) {
    assert_round_trip(script);
}

#[test]
fn test_round_trip_whole_script() {
    assert_round_trip(
        "ENTITY Employee { name: STRING, manager: Employee, reports: Employee[] };\n\
         ENTITY Document { title: STRING, sections: STRING[] };\n\
         ENTITY Epic { name: STRING, parent: Epic[], specification: Document };\n\
         INSERT Employee { name = \"Alice\" } AS alice;\n\
         INSERT Employee { name = \"Bob\", manager = alice } AS bob;\n\
         MATCH (e:Employee) RETURN e.name;",
    );
}
