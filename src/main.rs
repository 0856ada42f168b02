use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use async_cached_image::application::ImagePipeline;
use async_cached_image::domain::entities::ImageStatus;
use async_cached_image::domain::{CacheStorePort, ResourceKey};
use async_cached_image::infrastructure::{
    AppConfig, CliArgs, DiskCacheStore, HttpFetcher, LayeredCacheStore, MemoryCacheStore,
    RasterDecoder, StorageManager,
};
use async_cached_image::presentation::{CachedImageView, Displayed};

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = &config.log_path {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

fn load_config(args: &CliArgs) -> Result<AppConfig> {
    let storage = StorageManager::new().wrap_err("Failed to locate config directory")?;
    let mut config = storage
        .load_config(args.config.as_deref())
        .wrap_err("Failed to load configuration")?;
    config.merge_with_args(args);
    Ok(config)
}

fn build_cache(config: &AppConfig) -> Result<Arc<LayeredCacheStore>> {
    let memory = Arc::new(MemoryCacheStore::new(config.cache.memory_entries));

    if !config.cache.disk_enabled {
        return Ok(Arc::new(LayeredCacheStore::memory_only(memory)));
    }

    let disk = match config.effective_cache_dir() {
        Some(dir) => Some(Arc::new(
            DiskCacheStore::new(dir, config.cache.disk_max_bytes)
                .wrap_err("Failed to open disk cache")?,
        )),
        None => {
            warn!("No cache directory available, using memory cache only");
            None
        }
    };

    Ok(Arc::new(LayeredCacheStore::new(memory, disk)))
}

fn build_pipeline(config: &AppConfig, cache: Arc<LayeredCacheStore>) -> Result<ImagePipeline> {
    let fetcher = HttpFetcher::new(&config.network.fetcher_config())?;
    let decoder = config
        .decode
        .max_size()
        .map_or_else(RasterDecoder::new, |(width, height)| {
            RasterDecoder::new().with_max_size(width, height)
        });

    Ok(ImagePipeline::new(
        cache,
        Arc::new(fetcher),
        Arc::new(decoder),
    ))
}

/// Loads one image through its own view, giving up after `wait`.
async fn load_one(pipeline: ImagePipeline, url: String, wait: Duration) -> String {
    let mut view = CachedImageView::new(&pipeline, Some(ResourceKey::new(url.clone())));
    view.on_appear().await;

    if tokio::time::timeout(wait, view.settle()).await.is_err() {
        warn!(url = %url, "Image did not load in time, cancelling");
        view.on_disappear();
        return format!("{url}: timed out after {}s", wait.as_secs());
    }

    match (view.displayed(), view.status()) {
        (Displayed::Image(image), _) => format!("{url}: {}x{}", image.width(), image.height()),
        (Displayed::Placeholder, ImageStatus::Failed(error)) => format!("{url}: {error}"),
        (Displayed::Placeholder, _) => format!("{url}: no image"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = CliArgs::parse();
    let config = load_config(&args)?;
    init_logging(&config)?;

    info!(version = async_cached_image::VERSION, "Starting image loader");

    let cache = build_cache(&config)?;
    if args.clear_cache {
        cache.clear();
        info!("Cache cleared");
    }

    let pipeline = build_pipeline(&config, cache.clone())?;
    let wait = Duration::from_secs(args.wait_secs);

    let tasks: Vec<_> = args
        .urls
        .iter()
        .cloned()
        .map(|url| tokio::spawn(load_one(pipeline.clone(), url, wait)))
        .collect();

    for task in tasks {
        let line = task.await.wrap_err("Image load task panicked")?;
        println!("{line}");
    }

    info!(stats = %cache.memory_stats(), "Finished");
    Ok(())
}
