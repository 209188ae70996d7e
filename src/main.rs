//! Role Catalog - browse job roles with their knowledge, soft skills and learning pathways.

use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use role_catalog::catalog::{bootstrap, CatalogResolver, CatalogStore};
use role_catalog::config::{CatalogConfig, ConfigLoader, DatabaseConfig};
use role_catalog::display;
use role_catalog::server::CatalogServer;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Parser)]
#[command(
    name = "role-catalog",
    about = "Browse job roles with their knowledge, soft skills and learning pathways",
    version
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Config file to use instead of the default search paths.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file (`:memory:` for an in-memory store).
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the catalog over HTTP.
    Serve {
        /// Host address to bind to.
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on.
        #[arg(short, long)]
        port: Option<u16>,
        /// Directory with the static pages.
        #[arg(long)]
        static_dir: Option<PathBuf>,
        /// Do not seed an empty store before serving.
        #[arg(long)]
        no_seed: bool,
    },
    /// Create the schema and seed an empty store.
    Seed {
        /// TOML seed file (defaults to the built-in catalog).
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Print catalog entries to the terminal.
    Show {
        #[command(subcommand)]
        target: ShowTarget,
        /// Do not truncate descriptions.
        #[arg(long, global = true)]
        raw: bool,
    },
}

#[derive(Subcommand)]
enum ShowTarget {
    /// List all roles.
    Roles,
    /// Show one role by id.
    Role { id: i64 },
    /// Show one quality by name.
    Quality { name: String },
    /// Show one knowledge item by name.
    Knowledge { name: String },
    /// Show one pathway by name.
    Pathway { name: String },
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

async fn open_store(database: &DatabaseConfig) -> Result<CatalogStore, BoxError> {
    let store = if database.is_in_memory() {
        CatalogStore::open_in_memory().await?
    } else {
        CatalogStore::open(database.resolved_path()).await?
    };
    Ok(store)
}

fn load_config(cli: &Cli) -> Result<CatalogConfig, BoxError> {
    let loader = match &cli.config {
        Some(path) => ConfigLoader::with_path(path.clone()),
        None => ConfigLoader::new(),
    };
    let loaded = loader.load()?;
    if let Some(file) = &loaded.file {
        tracing::info!(path = %file.display(), "Using config file");
    }
    let mut config = loaded.config;
    if let Some(db) = &cli.db {
        config.database.path = Some(db.clone());
    }
    Ok(config)
}

async fn serve(config: CatalogConfig) -> Result<(), BoxError> {
    let store = open_store(&config.database).await?;
    if config.database.seed_on_start {
        bootstrap(&store, config.database.seed_file.as_deref()).await?;
    }

    let cancel = CancellationToken::new();
    let server = CatalogServer::new(CatalogResolver::new(store))
        .with_config(config.server)
        .with_cancel(cancel.clone());

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received Ctrl-C");
            cancel.cancel();
        }
    });

    server.run().await?;
    Ok(())
}

async fn show(config: CatalogConfig, target: ShowTarget, raw: bool) -> Result<(), BoxError> {
    let store = open_store(&config.database).await?;
    if config.database.seed_on_start {
        bootstrap(&store, config.database.seed_file.as_deref()).await?;
    }
    let resolver = CatalogResolver::new(store);
    let mut out = io::stdout();

    match target {
        ShowTarget::Roles => {
            let roles = resolver.store().list_roles().await?;
            display::write_entity_list(&mut out, "Roles", &roles, raw)?;
        }
        ShowTarget::Role { id } => {
            let detail = resolver.role_detail(id).await?;
            display::write_role_detail(&mut out, &detail, raw)?;
        }
        ShowTarget::Quality { name } => {
            let detail = resolver.quality_detail(&name).await?;
            display::write_quality_detail(&mut out, &detail, raw)?;
        }
        ShowTarget::Knowledge { name } => {
            let detail = resolver.knowledge_detail(&name).await?;
            display::write_knowledge_detail(&mut out, &detail, raw)?;
        }
        ShowTarget::Pathway { name } => {
            let detail = resolver.pathway_detail(&name).await?;
            display::write_pathway_detail(&mut out, &detail, raw)?;
        }
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<(), BoxError> {
    let mut config = load_config(&cli)?;

    match cli.command {
        Commands::Serve {
            host,
            port,
            static_dir,
            no_seed,
        } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(static_dir) = static_dir {
                config.server.static_dir = static_dir;
            }
            if no_seed {
                config.database.seed_on_start = false;
            }
            tracing::info!(
                address = %config.server.address(),
                database = %config.database.resolved_path().display(),
                "Starting role catalog"
            );
            serve(config).await
        }
        Commands::Seed { file } => {
            let store = open_store(&config.database).await?;
            let seed_file = file.or(config.database.seed_file);
            let seeded = bootstrap(&store, seed_file.as_deref()).await?;
            let roles = store.count_roles().await?;
            if seeded {
                println!("Seeded catalog with {roles} roles");
            } else {
                println!("Catalog already populated ({roles} roles), nothing written");
            }
            Ok(())
        }
        Commands::Show { target, raw } => show(config, target, raw).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        tracing::error!(error = %e, "Command failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
