use super::app_config::LogLevel;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "async-cached-image",
    version,
    about = "Load remote images through a shared cache, fetching only on a miss",
    long_about = None
)]
pub struct CliArgs {
    /// Image URLs to load.
    #[arg(value_name = "URL", required_unless_present = "clear_cache")]
    pub urls: Vec<String>,

    /// Configuration file path.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Disk cache directory.
    #[arg(long, value_name = "PATH")]
    pub cache_dir: Option<PathBuf>,

    /// Keep the cache in memory only.
    #[arg(long)]
    pub no_disk_cache: bool,

    /// Clear the cache before loading.
    #[arg(long)]
    pub clear_cache: bool,

    /// Request timeout in seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Seconds to wait for each image before cancelling its load.
    #[arg(long, default_value_t = 60)]
    pub wait_secs: u64,

    /// Maximum decoded width.
    #[arg(long)]
    pub max_width: Option<u32>,

    /// Maximum decoded height.
    #[arg(long)]
    pub max_height: Option<u32>,
}
