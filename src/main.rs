//! # legal-mcp CLI
//!
//! The `legal-mcp` binary is the primary interface for the German legal text
//! search service. It provides commands for schema management, imports,
//! search, section retrieval, and starting the HTTP API and MCP servers.
//!
//! ## Usage
//!
//! ```bash
//! legal-mcp [--config ./legal-mcp.toml] <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `legal-mcp init` | Create the schema (idempotent) |
//! | `legal-mcp migrate revert` | Revert the most recent migration |
//! | `legal-mcp serve api` | Start the HTTP API |
//! | `legal-mcp serve mcp` | Start the MCP Streamable HTTP bridge |
//! | `legal-mcp import <code>` | Import a legal code via the API |
//! | `legal-mcp search "<query>"` | Semantic search |
//! | `legal-mcp get <code> <section>` | Retrieve one section in full |
//! | `legal-mcp list codes` | List imported codes |
//! | `legal-mcp list catalog` | List importable codes |
//!
//! ## Examples
//!
//! ```bash
//! # Initialize the schema
//! legal-mcp init
//!
//! # Start the API, then import the civil code
//! legal-mcp serve api &
//! legal-mcp import bgb
//!
//! # Search across all imported codes
//! legal-mcp search "Kündigungsfrist Mietvertrag"
//!
//! # Search one code, machine-readable
//! legal-mcp search "Notwehr" --code stgb --json
//!
//! # Read § 823 BGB
//! legal-mcp get bgb "§ 823"
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use legal_mcp::{config, db, get, import, list, mcp, migrate, search, server};

/// German legal text search — semantic search over gesetze-im-internet.de.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file; environment variables override file values.
#[derive(Parser)]
#[command(
    name = "legal-mcp",
    about = "Semantic search over German federal law (gesetze-im-internet.de)",
    version,
    long_about = "legal-mcp imports German federal law from the official gesetze-im-internet.de \
    XML archives, embeds each statutory section with an Ollama model, and stores the vectors in \
    Postgres with pgvector. Search, retrieval, and imports are exposed via an HTTP API, this CLI, \
    and an MCP-compatible bridge for AI tools."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Optional; when absent, defaults plus environment variables apply.
    #[arg(long, global = true, default_value = "./legal-mcp.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Enables the pgvector extension and creates all tables. Idempotent —
    /// running it multiple times is safe.
    Init,

    /// Manage schema migrations.
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },

    /// Semantic search over imported legal texts.
    ///
    /// Embeds the query and ranks stored sections by cosine distance.
    /// Requires a running API server (`legal-mcp serve api`).
    Search {
        /// The search query (German works best).
        query: String,

        /// Restrict results to one legal code (e.g. `bgb`, `stgb`).
        #[arg(short, long)]
        code: Option<String>,

        /// Maximum number of results (1-100).
        #[arg(short, long, default_value_t = 10)]
        limit: i64,

        /// Maximum cosine distance to include (0-2). Lower is stricter.
        #[arg(short = 'x', long, default_value_t = 0.7)]
        cutoff: f64,

        /// Print the raw JSON response.
        #[arg(long)]
        json: bool,

        /// Base URL of the API server.
        #[arg(long, env = "LEGAL_API_BASE_URL")]
        api_url: Option<String>,
    },

    /// Retrieve one statutory section in full.
    ///
    /// Prints every stored sub-section of the given section.
    Get {
        /// Legal code identifier, e.g. `bgb`.
        code: String,

        /// Section identifier, e.g. `§ 823` or `Art 1`.
        section: String,

        /// Print the raw JSON response.
        #[arg(long)]
        json: bool,

        /// Base URL of the API server.
        #[arg(long, env = "LEGAL_API_BASE_URL")]
        api_url: Option<String>,
    },

    /// List imported or importable legal codes.
    List {
        #[command(subcommand)]
        what: ListWhat,
    },

    /// Import a legal code from gesetze-im-internet.de.
    ///
    /// Downloads the code's XML archive, parses its sections, embeds them,
    /// and upserts them into the store. Re-importing updates in place.
    Import {
        /// Legal code identifier from the catalog, e.g. `bgb`.
        code: String,

        /// Base URL of the API server.
        #[arg(long, env = "LEGAL_API_BASE_URL")]
        api_url: Option<String>,
    },

    /// Start a server.
    Serve {
        #[command(subcommand)]
        service: ServeService,
    },
}

/// Migration subcommands.
#[derive(Subcommand)]
enum MigrateAction {
    /// Revert the most recent applied migration.
    Revert,
}

/// `list` subcommands.
#[derive(Subcommand)]
enum ListWhat {
    /// Legal codes currently imported and searchable.
    Codes {
        /// Print the raw JSON response.
        #[arg(long)]
        json: bool,

        /// Base URL of the API server.
        #[arg(long, env = "LEGAL_API_BASE_URL")]
        api_url: Option<String>,
    },
    /// Legal codes available for import from the official catalog.
    Catalog {
        /// Print the raw JSON response.
        #[arg(long)]
        json: bool,

        /// Base URL of the API server.
        #[arg(long, env = "LEGAL_API_BASE_URL")]
        api_url: Option<String>,
    },
}

/// Server subcommands.
#[derive(Subcommand)]
enum ServeService {
    /// Start the HTTP API.
    ///
    /// Binds to the address configured in `[server].bind` and serves the
    /// search, retrieval, catalog, and import endpoints.
    Api {
        /// Override the bind address, e.g. `127.0.0.1:8000`.
        #[arg(long)]
        bind: Option<String>,
    },

    /// Start the MCP Streamable HTTP bridge.
    ///
    /// Binds to `[server].mcp_bind` and forwards every tool call to a
    /// running API server.
    Mcp {
        /// Override the bind address, e.g. `127.0.0.1:8001`.
        #[arg(long)]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(Some(&cli.config))?;

    match cli.command {
        Commands::Init => {
            let pool = db::connect(&cfg).await?;
            migrate::run_migrations(&pool, cfg.embedding.dimension).await?;
            println!("Database initialized successfully.");
        }
        Commands::Migrate { action } => match action {
            MigrateAction::Revert => {
                let pool = db::connect(&cfg).await?;
                let reverted = migrate::revert_last(&pool, cfg.embedding.dimension).await?;
                println!("Reverted migration {}.", reverted);
            }
        },
        Commands::Search {
            query,
            code,
            limit,
            cutoff,
            json,
            api_url,
        } => {
            let api_url = api_url.unwrap_or_else(|| cfg.api.base_url.clone());
            search::run_search(&api_url, &query, code, limit, cutoff, json).await?;
        }
        Commands::Get {
            code,
            section,
            json,
            api_url,
        } => {
            let api_url = api_url.unwrap_or_else(|| cfg.api.base_url.clone());
            get::run_get(&api_url, &code, &section, json).await?;
        }
        Commands::List { what } => match what {
            ListWhat::Codes { json, api_url } => {
                let api_url = api_url.unwrap_or_else(|| cfg.api.base_url.clone());
                list::run_list_codes(&api_url, json).await?;
            }
            ListWhat::Catalog { json, api_url } => {
                let api_url = api_url.unwrap_or_else(|| cfg.api.base_url.clone());
                list::run_list_catalog(&api_url, json).await?;
            }
        },
        Commands::Import { code, api_url } => {
            let api_url = api_url.unwrap_or_else(|| cfg.api.base_url.clone());
            import::run_import(&api_url, &code).await?;
        }
        Commands::Serve { service } => {
            init_tracing();
            let mut cfg = cfg;
            match service {
                ServeService::Api { bind } => {
                    if let Some(bind) = bind {
                        cfg.server.bind = bind;
                    }
                    server::run_server(&cfg).await?;
                }
                ServeService::Mcp { bind } => {
                    if let Some(bind) = bind {
                        cfg.server.mcp_bind = bind;
                    }
                    let api_url = cfg.api.base_url.clone();
                    mcp::run_mcp_server(&cfg, &api_url).await?;
                }
            }
        }
    }

    Ok(())
}

/// Structured logging for the long-running server commands. CLI commands
/// print their results directly and stay quiet otherwise.
fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
