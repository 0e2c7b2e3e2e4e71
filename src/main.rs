//! media-catalog - music catalog server
//!
//! Serves the artists/albums/tracks REST API with role-aware listings and
//! image uploads.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use media_catalog::api;
use media_catalog::config::{Paths, ServerConfig};
use media_catalog::db::{DbEngine, UserTable};
use media_catalog::state::AppState;
use media_catalog::utils::tools::apply_setup_file;

/// media-catalog - music catalog server
#[derive(Parser, Debug)]
#[command(name = "media-catalog")]
#[command(version)]
#[command(about = "Music catalog server with role-aware listings")]
struct Args {
    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(long, default_value_t = 8000)]
    port: u16,

    /// Enable debug mode
    #[arg(long)]
    debug: bool,

    /// Path to config directory
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON setup file: settings plus an admin account to seed
    #[arg(long)]
    setup_config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };

    // sqlx logs every statement at info
    let filter = tracing_subscriber::EnvFilter::new(format!(
        "{},sqlx=warn,actix_server=warn,h2=warn,hyper=warn",
        log_level
    ));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    info!("media-catalog v{} starting...", env!("CARGO_PKG_VERSION"));

    let paths = Paths::new(args.config)?;
    info!("Config directory: {:?}", paths.config_dir());

    let state = run_setup(paths, args.setup_config).await?;
    serve(state, args.host, args.port).await
}

async fn run_setup(paths: Paths, setup_config: Option<PathBuf>) -> Result<AppState> {
    let db = DbEngine::open(&paths.db_path()).await?;

    let mut config = match setup_config {
        Some(path) => {
            info!("Applying setup from file: {:?}", path);
            apply_setup_file(&path, &paths, db.pool()).await?
        }
        None => ServerConfig::load(&paths)?,
    };

    if config.ensure_server_id() {
        config.save(&paths)?;
    }

    // the allow-list env var wins on every start, not only the first
    config.apply_env_overrides();

    if UserTable::count(db.pool()).await? == 0 {
        tracing::warn!(
            "No users yet. Register through the API, or pass --setup-config \
             with adminUsername/adminPassword to seed an admin."
        );
    }

    Ok(AppState::new(db, paths, config))
}

async fn serve(state: AppState, host: String, port: u16) -> Result<()> {
    use actix_cors::Cors;
    use actix_files::Files;
    use actix_web::{middleware, web, App, HttpServer};

    let addr = format!("{}:{}", host, port);
    info!("Server listening on http://{}", addr);

    let images_dir = state.paths.images_dir();
    let data = web::Data::new(state);

    HttpServer::new(move || {
        let origins = &data.config.allowed_origins;
        let mut cors = Cors::default()
            .allow_any_method()
            .allow_any_header()
            .supports_credentials()
            .max_age(3600);

        if origins.is_empty() {
            cors = cors.allow_any_origin();
        } else {
            for origin in origins {
                cors = cors.allowed_origin(origin);
            }
        }

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .app_data(data.clone())
            .service(Files::new("/images", images_dir.clone()))
            .configure(api::configure)
    })
    .bind(&addr)
    .with_context(|| format!("Failed to bind {}", addr))?
    .run()
    .await?;

    Ok(())
}
