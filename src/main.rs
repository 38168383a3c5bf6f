use clap::Parser;
use feedandeat::{
    api::{handlers::AppState, routes},
    cli::{Cli, Commands},
    config::Settings,
    db,
    import::{self, SystemUser},
    Error, Result,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    // Silently ignore if file doesn't exist
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,feedandeat=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let settings = Settings::from_env()?;
    settings.validate()?;

    // Handle commands
    match cli.command {
        Commands::Serve { port, host } => {
            serve(settings, port, host).await?;
        }
        Commands::Migrate => {
            migrate(settings).await?;
        }
        Commands::ImportRecipes {
            file,
            system_email,
            system_username,
            replace,
        } => {
            import_recipes(settings, file, system_email, system_username, replace).await?;
        }
        Commands::ImportTags { file } => {
            import_tags(settings, file).await?;
        }
        Commands::Search {
            query,
            tags,
            sort,
            limit,
        } => {
            search_recipes(settings, query, tags, sort, limit).await?;
        }
    }

    Ok(())
}

async fn serve(mut settings: Settings, port: Option<u16>, host: Option<String>) -> Result<()> {
    // Override settings with CLI arguments
    if let Some(port) = port {
        settings.server.port = port;
    }
    if let Some(host) = host {
        settings.server.host = host;
    }

    info!("Starting FeedAndEat server");
    info!("Database: {}", settings.database.url);
    info!("Server: {}:{}", settings.server.host, settings.server.port);

    // Initialize database with connection pooling configuration
    let pool = db::init_pool_with_config(&settings.database).await?;
    info!(
        "Database connection established (max_connections: {}, min_connections: {})",
        settings.database.max_connections, settings.database.min_connections
    );

    // Run migrations
    db::run_migrations(&pool).await?;
    info!("Database migrations completed");

    tokio::fs::create_dir_all(&settings.media.media_dir).await?;
    info!("Media directory: {}", settings.media.media_dir.display());

    // Create application state
    let state = AppState {
        pool,
        settings: settings.clone(),
    };

    // Create router with rate limiting
    let app = routes::create_router(state, &settings);

    // Start server
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::Internal(format!("Failed to bind to {addr}: {e}")))?;

    println!("\n========================================");
    println!("FeedAndEat API Server");
    println!("========================================");
    println!("Status: Running");
    println!("Address: http://{addr}");
    println!("Database: Connected");
    println!("\nAPI Endpoints:");
    println!("  POST /auth/register, /auth/login, /auth/token");
    println!("  GET  /recipes/search");
    println!("  GET  /recipes/top, /recipes/latest, /recipes/low_calorie, /recipes/daily");
    println!("  GET  /recipes/:id");
    println!("  GET  /collections/my, /collections/:id");
    println!("  GET  /tags");
    println!("\nPress Ctrl+C to stop");
    println!("========================================\n");

    info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| Error::Internal(format!("Server error: {e}")))?;

    info!("Shutting down...");
    Ok(())
}

async fn migrate(settings: Settings) -> Result<()> {
    info!("Running database migrations");

    let pool = db::init_pool(&settings.database.url).await?;
    db::run_migrations(&pool).await?;

    println!("\u{2713} Database migrations completed successfully");
    Ok(())
}

async fn import_recipes(
    settings: Settings,
    file: PathBuf,
    system_email: String,
    system_username: String,
    replace: bool,
) -> Result<()> {
    let pool = db::init_pool(&settings.database.url).await?;
    db::run_migrations(&pool).await?;

    let system = SystemUser {
        email: system_email,
        username: system_username,
    };
    let count = import::import_recipes(
        &pool,
        &file,
        &system,
        settings.auth.bcrypt_cost,
        replace,
    )
    .await?;

    println!("\u{2713} Imported {count} recipes");
    Ok(())
}

async fn import_tags(settings: Settings, file: PathBuf) -> Result<()> {
    let pool = db::init_pool(&settings.database.url).await?;
    db::run_migrations(&pool).await?;

    let added = import::import_tags(&pool, &file).await?;

    println!("\u{2713} Added {added} tags");
    Ok(())
}

async fn search_recipes(
    settings: Settings,
    query: Option<String>,
    tags: Option<String>,
    sort: Option<String>,
    limit: Option<i64>,
) -> Result<()> {
    let server_url = settings
        .server
        .external_url
        .unwrap_or_else(|| format!("http://{}:{}", settings.server.host, settings.server.port));

    feedandeat::cli::commands::search(
        &server_url,
        query.as_deref(),
        tags.as_deref(),
        sort.as_deref(),
        limit,
    )
    .await
}
