pub mod errors;
pub mod registry;
pub mod schema_types;

pub use errors::GraphSchemaError;
pub use registry::{SchemaOverlay, SchemaRegistry, SchemaView};
pub use schema_types::{EntityType, FieldSchema, FieldType, RelationshipType, TYPES_PROPERTY};
