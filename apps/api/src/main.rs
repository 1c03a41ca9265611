use std::net::SocketAddr;

use anyhow::{Context, Result};
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use clap::{Parser, Subcommand};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use habayta_api::auth::token::TokenIssuer;
use habayta_api::config::{Config, SmtpConfig};
use habayta_api::db::{create_pool, run_migrations};
use habayta_api::email::{build_mailer, verify_smtp_relay};
use habayta_api::routes::build_router;
use habayta_api::scraped::ScrapedCatalog;
use habayta_api::state::AppState;

#[derive(Parser)]
#[command(name = "habayta-api", version, about = "Habayta Jobs API server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Check that the configured SMTP relay accepts connections
    SmtpCheck,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve().await,
        Command::SmtpCheck => smtp_check().await,
    }
}

async fn serve() -> Result<()> {
    let config = Config::from_env()?;
    info!("Starting Habayta API v{}", env!("CARGO_PKG_VERSION"));

    // PostgreSQL
    let db = create_pool(&config.database_url).await?;
    run_migrations(&db).await?;

    // Redis (verification tokens)
    let redis = redis::Client::open(config.redis_url.clone())?;
    info!("Redis client initialized");

    // S3 / MinIO (resumes, logos)
    let s3 = build_s3_client(&config).await;
    info!("S3 client initialized");

    let tokens = TokenIssuer::new(&config.jwt_secret, config.jwt_ttl_hours);
    let mailer = build_mailer(config.smtp.as_ref())?;

    // Scraped listings are normalized once and shared read-only
    let scraped = ScrapedCatalog::load(&config.scraped_datasets)?;

    let state = AppState {
        db,
        redis,
        s3,
        config: config.clone(),
        tokens,
        mailer,
        scraped,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn smtp_check() -> Result<()> {
    let smtp = SmtpConfig::from_env()?
        .context("SMTP_HOST is not set; nothing to check")?;
    info!("Checking SMTP relay {}:{}", smtp.host, smtp.port);

    verify_smtp_relay(smtp).await?;
    println!("SMTP connection OK");
    Ok(())
}

/// S3 client for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "habayta-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::from_conf(
        aws_sdk_s3::config::Builder::from(&s3_config)
            .force_path_style(true)
            .build(),
    )
}
