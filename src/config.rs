use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use validator::{Validate, ValidationError};

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// How entity-reference fields are persisted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceMode {
    /// One edge per referenced entity, labelled with the field name.
    #[default]
    EdgeMapped,
    /// The referenced element id(s) stored as a plain property.
    ScalarId,
}

impl ReferenceMode {
    pub fn from_flag(edge_references: bool) -> Self {
        if edge_references {
            ReferenceMode::EdgeMapped
        } else {
            ReferenceMode::ScalarId
        }
    }
}

/// PostgreSQL connection settings for the AGE backend
#[derive(Clone, Debug, Validate, Serialize, Deserialize)]
pub struct ConnectionConfig {
    #[validate(length(min = 1, message = "Database host cannot be empty"))]
    pub host: String,

    /// Database port (1-65535)
    #[validate(range(
        min = 1,
        max = 65535,
        message = "Database port must be between 1 and 65535"
    ))]
    pub port: u16,

    #[validate(length(min = 1, message = "Database name cannot be empty"))]
    pub database: String,

    #[validate(length(min = 1, message = "Database user cannot be empty"))]
    pub user: String,

    pub password: String,

    /// Upper bound on pooled physical connections
    #[validate(range(
        min = 1,
        max = 100,
        message = "Pool size must be between 1 and 100"
    ))]
    pub max_connections: u32,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            database: "postgres".to_string(),
            user: "postgres".to_string(),
            password: "password".to_string(),
            max_connections: 5,
        }
    }
}

/// Engine configuration with validation
#[derive(Clone, Debug, Validate, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Name of the AGE graph all statements run against
    #[validate(custom(function = "validate_graph_name"))]
    pub graph_name: String,

    pub reference_mode: ReferenceMode,

    #[validate(nested)]
    pub connection: ConnectionConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            graph_name: "complex_graph".to_string(),
            reference_mode: ReferenceMode::EdgeMapped,
            connection: ConnectionConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Create configuration from environment variables with validation
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            graph_name: env::var("COMPLEX_GRAPH_NAME")
                .unwrap_or_else(|_| "complex_graph".to_string()),
            reference_mode: ReferenceMode::from_flag(parse_flag_env_var("EDGE_REFERENCES", true)?),
            connection: ConnectionConfig {
                host: env::var("COMPLEX_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
                port: parse_env_var("COMPLEX_DB_PORT", "5432")?,
                database: env::var("COMPLEX_DB_NAME").unwrap_or_else(|_| "postgres".to_string()),
                user: env::var("COMPLEX_DB_USER").unwrap_or_else(|_| "postgres".to_string()),
                password: env::var("COMPLEX_DB_PASSWORD")
                    .unwrap_or_else(|_| "password".to_string()),
                max_connections: parse_env_var("COMPLEX_DB_POOL_SIZE", "5")?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from YAML file
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            field: "yaml_file".to_string(),
            value: "file read failed".to_string(),
            source: Box::new(e),
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            field: "yaml_content".to_string(),
            value: content,
            source: Box::new(e),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply command line overrides on top of this configuration
    pub fn with_cli(mut self, cli: CliConfig) -> Result<Self, ConfigError> {
        if let Some(graph_name) = cli.graph_name {
            self.graph_name = graph_name;
        }
        if cli.scalar_references {
            self.reference_mode = ReferenceMode::ScalarId;
        }
        self.validate()?;
        Ok(self)
    }
}

/// CLI overrides (parsed from command line arguments)
#[derive(Clone, Debug, Default)]
pub struct CliConfig {
    pub graph_name: Option<String>,
    pub scalar_references: bool,
}

fn validate_graph_name(name: &str) -> Result<(), ValidationError> {
    let mut chars = name.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        let mut error = ValidationError::new("graph_name");
        error.message = Some("Graph name must be a plain identifier".into());
        Err(error)
    }
}

/// Parse an environment variable with a default value
fn parse_env_var<T: std::str::FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    value.parse().map_err(|e| ConfigError::Parse {
        field: key.to_string(),
        value,
        source: Box::new(e),
    })
}

/// Boolean flag accepting true/1/yes/on and false/0/no/off, any case
fn parse_flag_env_var(key: &str, default: bool) -> Result<bool, ConfigError> {
    let Ok(value) = env::var(key) else {
        return Ok(default);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::Parse {
            field: key.to_string(),
            value: value.clone(),
            source: format!("`{}` is not a boolean flag", value).into(),
        }),
    }
}
