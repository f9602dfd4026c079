use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vidhost_api::services::thumbnails::{FsThumbnailStore, ThumbnailStore};
use vidhost_api::services::upload::UploadPipeline;
use vidhost_api::{build_router, AppState};
use vidhost_core::Config;
use vidhost_db::PgVideoRecords;
use vidhost_processing::{ContainerRewriter, FfmpegRewriter, FfprobeInspector, MediaInspector};
use vidhost_storage::create_storage;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    config.validate()?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;
    vidhost_db::run_migrations(&pool).await?;
    tracing::info!("Database migrations applied");

    let records = Arc::new(PgVideoRecords::new(pool));
    let storage = create_storage(&config).await?;

    let thumbnails = FsThumbnailStore::new(&config.assets_root, &config.assets_base_url);
    thumbnails.ensure_root().await?;
    let thumbnails: Arc<dyn ThumbnailStore> = Arc::new(thumbnails);

    let inspector: Arc<dyn MediaInspector> =
        Arc::new(FfprobeInspector::new(config.ffprobe_path.clone()));
    let rewriter: Arc<dyn ContainerRewriter> =
        Arc::new(FfmpegRewriter::new(config.ffmpeg_path.clone()));

    let pipeline = UploadPipeline::new(
        records.clone(),
        storage.clone(),
        inspector,
        rewriter,
        thumbnails.clone(),
    );

    let state = Arc::new(AppState {
        config: config.clone(),
        records,
        storage,
        thumbnails,
        pipeline,
    });

    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
