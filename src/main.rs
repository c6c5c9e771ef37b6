use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use complexgraph::config::{self, EngineConfig};
use complexgraph::engine::Engine;
use complexgraph::repl::{format_error, print_results, run_repl};
use complexgraph::store::{GraphStore, MemoryGraphStore};

/// ComplexGraph - schema and data DSL for Apache AGE
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Graph to operate on (overrides COMPLEX_GRAPH_NAME)
    #[arg(long, global = true)]
    graph: Option<String>,

    /// Store entity references as id properties instead of edges
    #[arg(long, global = true)]
    scalar_references: bool,

    /// Use an in-process graph instead of connecting to PostgreSQL
    #[arg(long, global = true)]
    memory: bool,

    /// Read configuration from a YAML file instead of the environment
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Execute a script file as one transaction
    Run { file: PathBuf },
    /// Start an interactive shell
    Repl,
}

impl From<&Cli> for config::CliConfig {
    fn from(cli: &Cli) -> Self {
        config::CliConfig {
            graph_name: cli.graph.clone(),
            scalar_references: cli.scalar_references,
        }
    }
}

fn load_config(cli: &Cli) -> Result<EngineConfig, config::ConfigError> {
    let base = match &cli.config {
        Some(path) => EngineConfig::from_yaml_file(path)?,
        None => EngineConfig::from_env()?,
    };
    base.with_cli(cli.into())
}

async fn open_store(cli: &Cli, config: &EngineConfig) -> anyhow::Result<Arc<dyn GraphStore>> {
    if cli.memory {
        return Ok(Arc::new(MemoryGraphStore::new()));
    }
    #[cfg(feature = "age")]
    {
        let store = complexgraph::store::age_client::AgeGraphStore::connect(config).await?;
        Ok(Arc::new(store))
    }
    #[cfg(not(feature = "age"))]
    {
        let _ = config;
        anyhow::bail!("built without the `age` feature; use --memory")
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    // Defaults to INFO level, can be overridden with RUST_LOG env var
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let store = match open_store(&cli, &config).await {
        Ok(store) => store,
        Err(e) => {
            eprintln!("ConnectionError: {}", e);
            std::process::exit(1);
        }
    };
    let engine = Engine::new(store, config);

    match &cli.command {
        Command::Run { file } => {
            let script = match std::fs::read_to_string(file) {
                Ok(script) => script,
                Err(e) => {
                    eprintln!("Cannot read {}: {}", file.display(), e);
                    std::process::exit(1);
                }
            };
            match engine.execute(&script).await {
                Ok(results) => {
                    if let Err(e) = print_results(&mut io::stdout().lock(), &results) {
                        eprintln!("{}", e);
                        std::process::exit(1);
                    }
                }
                Err(e) => {
                    eprintln!("{}", format_error(&e));
                    std::process::exit(1);
                }
            }
        }
        Command::Repl => {
            println!(
                "\nComplexGraph v{} - type .help for help\n",
                env!("CARGO_PKG_VERSION")
            );
            let stdin = io::stdin();
            if let Err(e) = run_repl(&engine, stdin.lock(), io::stdout()).await {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        }
    }
}
