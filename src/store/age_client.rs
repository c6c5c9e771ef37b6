//! Apache AGE backend.
//!
//! Each graph operation is rendered to Cypher and wrapped in
//! `SELECT ... FROM cypher('<graph>', $tag$ ... $tag$) AS (...)`. Result
//! columns are cast to text and decoded as agtype. Every connection loads the
//! AGE extension and puts `ag_catalog` on the search path when it is opened.

use async_trait::async_trait;
use log::{debug, info, warn};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{PgPool, Postgres, Row as SqlxRow, Transaction};

use super::agtype::parse_agtype;
use super::errors::StoreError;
use super::value::Row;
use super::{GraphStore, GraphTransaction};
use crate::config::EngineConfig;
use crate::cypher_generator::{to_cypher::is_identifier, GraphQuery};

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db) => {
                let code = db.code().map(|c| c.to_string());
                let message = db.message().to_string();
                match code.as_deref() {
                    Some(c) if c.starts_with("08") => StoreError::Connection { message, code },
                    _ => StoreError::Query { message, code },
                }
            }
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Configuration(_) => StoreError::Connection {
                message: err.to_string(),
                code: None,
            },
            other => StoreError::Query {
                message: other.to_string(),
                code: None,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct AgeGraphStore {
    pool: PgPool,
    graph_name: String,
}

impl AgeGraphStore {
    /// Opens the connection pool and creates the graph if it does not exist.
    pub async fn connect(config: &EngineConfig) -> Result<Self, StoreError> {
        let connection = &config.connection;
        if !is_identifier(&config.graph_name) {
            return Err(StoreError::Connection {
                message: format!("invalid graph name `{}`", config.graph_name),
                code: None,
            });
        }
        info!(
            "Connecting to AGE at {}:{}/{} as {} (graph `{}`)",
            connection.host,
            connection.port,
            connection.database,
            connection.user,
            config.graph_name
        );

        let options = PgConnectOptions::new()
            .host(&connection.host)
            .port(connection.port)
            .database(&connection.database)
            .username(&connection.user)
            .password(&connection.password);

        let pool = PgPoolOptions::new()
            .max_connections(connection.max_connections)
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    sqlx::query("LOAD 'age'").execute(&mut *conn).await?;
                    sqlx::query("SET search_path = ag_catalog, \"$user\", public")
                        .execute(&mut *conn)
                        .await?;
                    Ok(())
                })
            })
            .connect_with(options)
            .await
            .map_err(|e| {
                warn!("Failed to connect to AGE: {}", e);
                StoreError::Connection {
                    message: e.to_string(),
                    code: None,
                }
            })?;

        let store = AgeGraphStore {
            pool,
            graph_name: config.graph_name.clone(),
        };
        store.ensure_graph().await?;
        Ok(store)
    }

    async fn ensure_graph(&self) -> Result<(), StoreError> {
        let exists: i64 =
            sqlx::query("SELECT count(*) FROM ag_catalog.ag_graph WHERE name::text = $1")
                .bind(&self.graph_name)
                .fetch_one(&self.pool)
                .await?
                .try_get(0)?;
        if exists == 0 {
            info!("Creating graph `{}`", self.graph_name);
            sqlx::query(&format!(
                "SELECT ag_catalog.create_graph('{}')",
                self.graph_name
            ))
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }

    pub fn graph_name(&self) -> &str {
        &self.graph_name
    }
}

#[async_trait]
impl GraphStore for AgeGraphStore {
    async fn begin(&self) -> Result<Box<dyn GraphTransaction>, StoreError> {
        let tx = self.pool.begin().await.map_err(|e| StoreError::Connection {
            message: e.to_string(),
            code: None,
        })?;
        Ok(Box::new(AgeTransaction {
            tx,
            graph_name: self.graph_name.clone(),
        }))
    }

    fn backend_name(&self) -> &'static str {
        "age"
    }
}

pub struct AgeTransaction {
    tx: Transaction<'static, Postgres>,
    graph_name: String,
}

/// Dollar-quote tag that does not occur in `text`.
fn dollar_tag(text: &str) -> String {
    let mut tag = "$cypher$".to_string();
    let mut n = 0;
    while text.contains(&tag) {
        n += 1;
        tag = format!("$cypher{}$", n);
    }
    tag
}

/// Wraps Cypher text in AGE's `cypher()` table function.
pub fn wrap_cypher(graph_name: &str, cypher: &str, columns: usize) -> String {
    let tag = dollar_tag(cypher);
    let select = (0..columns)
        .map(|i| format!("c{}::text", i))
        .collect::<Vec<_>>()
        .join(", ");
    let definitions = (0..columns)
        .map(|i| format!("c{} agtype", i))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "SELECT {} FROM ag_catalog.cypher('{}', {}{}{}) AS ({})",
        select, graph_name, tag, cypher, tag, definitions
    )
}

impl AgeTransaction {
    async fn ensure_label(&mut self, label: &str, kind: &str) -> Result<(), StoreError> {
        if !is_identifier(label) {
            return Err(StoreError::query(format!("invalid label `{}`", label)));
        }
        let existing: i64 = sqlx::query(
            "SELECT count(*) FROM ag_catalog.ag_label l JOIN ag_catalog.ag_graph g ON l.graph = g.graphid \
             WHERE g.name::text = $1 AND l.name::text = $2",
        )
        .bind(&self.graph_name)
        .bind(label)
        .fetch_one(&mut *self.tx)
        .await?
        .try_get(0)?;
        if existing == 0 {
            debug!("Creating {} label {}", kind, label);
            sqlx::query(&format!(
                "SELECT ag_catalog.create_{}label('{}', '{}')",
                kind, self.graph_name, label
            ))
            .execute(&mut *self.tx)
            .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl GraphTransaction for AgeTransaction {
    async fn run(&mut self, query: &GraphQuery) -> Result<Vec<Row>, StoreError> {
        match query {
            GraphQuery::EnsureVertexLabel { label } => {
                self.ensure_label(label, "v").await?;
                return Ok(Vec::new());
            }
            GraphQuery::EnsureEdgeLabel { label } => {
                self.ensure_label(label, "e").await?;
                return Ok(Vec::new());
            }
            _ => {}
        }

        let cypher = query
            .to_cypher_query()
            .map_err(|e| StoreError::query(e.to_string()))?;
        let sql = wrap_cypher(&self.graph_name, &cypher.text, cypher.columns.len());
        debug!("AGE query: {}", sql);

        let rows = sqlx::query(&sql).fetch_all(&mut *self.tx).await?;
        rows.iter()
            .map(|row| -> Result<Row, StoreError> {
                let mut columns = Vec::with_capacity(cypher.columns.len());
                for (index, name) in cypher.columns.iter().enumerate() {
                    let text: Option<String> = row.try_get(index)?;
                    columns.push((name.clone(), parse_agtype(text.as_deref())?));
                }
                Ok(Row::new(columns))
            })
            .collect()
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(StoreError::from)
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.rollback().await.map_err(StoreError::from)
    }
}
