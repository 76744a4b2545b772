use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use dotenv::dotenv;
use lireddit_server::{
    app,
    config::Config,
    context::session_key,
    db::Database,
    graphql::{get_schema, LiredditSchema},
    memory::MemoryStore,
    AppState,
};
use tokio::net::TcpListener;

#[derive(Debug, Parser)]
#[command(version, about = "GraphQL server for posts and users")]
struct Cli {
    /// Overrides HOST.
    #[arg(long)]
    host: Option<String>,

    /// Overrides PORT.
    #[arg(long)]
    port: Option<u16>,

    /// Keep data in process memory instead of Postgres.
    #[arg(long)]
    in_memory: bool,

    /// Don't run pending migrations on startup.
    #[arg(long)]
    skip_migrations: bool,
}

impl Cli {
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine, the environment may already be set.
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    cli.apply_overrides(&mut config);

    let schema = build_schema(&cli, &config).await?;
    let state = AppState {
        schema,
        session_key: session_key(config.session_secret.as_deref())?,
    };
    let router = app(state, config.cors_origin.as_deref())?;

    let address = config.address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("cannot bind {address}"))?;
    log::info!("Serving on http://{address}");
    axum::serve(listener, router).await?;
    Ok(())
}

async fn build_schema(cli: &Cli, config: &Config) -> anyhow::Result<LiredditSchema> {
    if cli.in_memory {
        log::info!("using in-memory store");
        return Ok(get_schema(Arc::new(MemoryStore::new()), config.clone()));
    }

    let db = Database::connect(config)
        .await
        .context("cannot connect to the database")?;
    if !cli.skip_migrations {
        db.migrate().await?;
    }
    Ok(get_schema(Arc::new(db), config.clone()))
}
