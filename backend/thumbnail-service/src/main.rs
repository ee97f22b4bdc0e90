use actix_web::{web, App, HttpServer};
use anyhow::{anyhow, Context, Result};
use s3_utils::S3Client;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use thumbnail_service::{
    config::Config,
    db::{CreditLedger, GenerationStore, PgCreditLedger, PgGenerationStore},
    handlers,
    providers::{NebiusImageGenerator, OpenAiChatClient, ReplicateImageGenerator},
    services::{
        ImageAnalyzer, ImagePipeline, PromptEnhancer, S3ArtifactStore, ThumbnailGenerator,
    },
    AppState,
};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("thumbnail_service=info,actix_web=info"));

    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    info!("Starting thumbnail-service");

    let config = Config::from_env().context("Failed to load configuration")?;
    config
        .validate()
        .map_err(|e| anyhow!("Invalid configuration: {}", e))?;
    info!(
        app_env = %config.app_env,
        port = config.port,
        primary_timeout_secs = config.primary_generation_timeout_secs,
        "Configuration loaded"
    );
    let config = Arc::new(config);

    // Database
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    info!("Database pool initialized");

    info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    info!("Migrations completed successfully");

    // Object storage
    let s3 = Arc::new(
        S3Client::from_env()
            .await
            .context("Failed to initialize S3 client")?,
    );
    if let Err(e) = s3.health_check().await {
        tracing::warn!(bucket = %s3.config().bucket, error = %e, "S3 bucket not reachable at startup");
    }

    // Outbound HTTP
    let http = reqwest::Client::builder()
        .timeout(config.http_client_timeout())
        .build()
        .context("Failed to build HTTP client")?;

    let chat = Arc::new(OpenAiChatClient::new(
        http.clone(),
        &config.groq_base_url,
        &config.groq_api_key,
    ));
    let primary = Arc::new(NebiusImageGenerator::new(
        http.clone(),
        &config.nebius_base_url,
        &config.nebius_api_key,
        &config.nebius_image_model,
    ));
    let fallback = Arc::new(ReplicateImageGenerator::new(
        http.clone(),
        &config.replicate_base_url,
        &config.replicate_api_token,
        &config.replicate_model,
        config.replicate_poll_timeout(),
    ));

    let ledger: Arc<dyn CreditLedger> = Arc::new(PgCreditLedger::new(pool.clone()));
    let generations: Arc<dyn GenerationStore> = Arc::new(PgGenerationStore::new(pool));

    let generator = Arc::new(ThumbnailGenerator::new(
        ledger.clone(),
        generations.clone(),
        PromptEnhancer::new(chat.clone(), config.prompt_model.clone()),
        ImageAnalyzer::new(chat, config.vision_model.clone()),
        ImagePipeline::new(primary, fallback, config.primary_generation_timeout()),
        Arc::new(S3ArtifactStore::new(http, s3)),
        config.credit_costs(),
    ));

    let state = AppState {
        config: config.clone(),
        generator,
        ledger,
        generations,
    };

    let bind_address = format!("{}:{}", config.host, config.port);
    info!("Starting HTTP server at {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(handlers::configure)
    })
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run()
    .await
    .context("HTTP server error")?;

    info!("thumbnail-service stopped");
    Ok(())
}
