use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chirpy::auth::session;
use chirpy::cli::{Cli, Commands};
use chirpy::config::{self, Config};
use chirpy::store::memory::MemoryStore;
use chirpy::store::postgres::PgStore;
use chirpy::store::Store;
use chirpy::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use opentelemetry::KeyValue;
    use opentelemetry_sdk::{trace as sdktrace, Resource};

    // OTLP export only when a collector is configured.
    let telemetry_layer = if std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").is_ok() {
        let tracer = opentelemetry_otlp::new_pipeline()
            .tracing()
            .with_exporter(opentelemetry_otlp::new_exporter().tonic())
            .with_trace_config(sdktrace::config().with_resource(Resource::new(vec![
                KeyValue::new("service.name", "chirpy"),
            ])))
            .install_batch(opentelemetry_sdk::runtime::Tokio)
            .context("failed to install OpenTelemetry tracer")?;
        Some(tracing_opentelemetry::layer().with_tracer(tracer))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "chirpy=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .with(telemetry_layer)
        .init();

    let args = Cli::parse();
    let cfg = config::load()?;

    let result = match args.command {
        Some(Commands::Serve { port, memory }) => run_server(cfg, port, memory).await,
        Some(Commands::Migrate) => {
            let db = connect_pg(&cfg).await?;
            db.migrate().await?;
            println!("Migrations applied.");
            Ok(())
        }
        Some(Commands::Revoke { token }) => {
            let db = connect_pg(&cfg).await?;
            match session::revoke(&db, &token).await {
                Ok(()) => {
                    println!("Refresh token revoked.");
                    Ok(())
                }
                Err(e) => Err(anyhow::anyhow!("revoke failed: {}", e)),
            }
        }
        None => run_server(cfg, None, false).await,
    };

    if let Err(ref e) = result {
        eprintln!("Error: {:?}", e);
    }
    result
}

async fn connect_pg(cfg: &Config) -> anyhow::Result<PgStore> {
    let url = cfg
        .database_url
        .as_deref()
        .context("DB_URL (or DATABASE_URL) must be set; use `serve --memory` to run without a database")?;
    PgStore::connect(url).await
}

async fn run_server(cfg: Config, port: Option<u16>, memory: bool) -> anyhow::Result<()> {
    let db: Arc<dyn Store> = if memory {
        tracing::warn!("Using in-memory store; all data is lost on exit");
        Arc::new(MemoryStore::new())
    } else {
        tracing::info!("Connecting to database...");
        let db = connect_pg(&cfg).await?;

        tracing::info!("Running migrations...");
        db.migrate().await?;
        Arc::new(db)
    };

    let port = port.unwrap_or(cfg.port);
    let platform = cfg.platform.clone();
    let state = Arc::new(AppState::new(db, cfg));
    let app = chirpy::api::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(platform = %platform, "Chirpy listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
