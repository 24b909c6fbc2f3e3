use clap::Parser;
use log::{error, info, warn};
use prowl_notification::config::{self, default_cache_path, default_config_path};
use prowl_notification::host::FileHost;
use prowl_notification::notification::ProwlClient;
use prowl_notification::platform::{PLATFORM_NAME, PLUGIN_NAME, ProwlPlatform};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;

/// Run Prowl notification switches against a file-backed host.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Host configuration file (defaults to ~/.homebridge/config.json)
    #[arg(long, env = "PROWL_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Accessory cache file (defaults to <config dir>/accessories/cachedAccessories)
    #[arg(long, env = "PROWL_CACHE_PATH")]
    cache: Option<PathBuf>,

    /// Turn a switch on once after startup; may be repeated
    #[arg(long = "trigger", value_name = "NAME")]
    triggers: Vec<String>,
}

fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

#[tokio::main]
async fn main() {
    init_logger();
    let args = Args::parse();

    let config_path = args.config.unwrap_or_else(default_config_path);
    let cache_path = args
        .cache
        .unwrap_or_else(|| default_cache_path(&config_path));

    info!("Starting Prowl notification platform");
    info!("  Config: {:?}", config_path);
    info!("  Cache: {:?}", cache_path);

    let platform_config = match config::load_host_config(&config_path)
        .and_then(|c| c.require_platform(PLATFORM_NAME))
    {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    info!("  Switches: {}", platform_config.switches.len());

    let transport = match ProwlClient::new() {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("Failed to create HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    let host = Arc::new(FileHost::new(config_path, cache_path));
    let platform = ProwlPlatform::new(platform_config, host.clone(), transport);

    for accessory in host.restore_cached_accessories(PLUGIN_NAME, PLATFORM_NAME) {
        platform.configure_accessory(accessory);
    }
    platform.did_finish_launching();

    for name in &args.triggers {
        info!("Triggering {}", name);
        if let Err(e) = platform.trigger(name) {
            warn!("Trigger {} failed: {}", name, e);
        }
    }

    info!("Prowl notification platform is running");
    info!("  - Press Ctrl+C to exit");

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Received shutdown signal");
        }
        Err(e) => {
            error!("Failed to listen for shutdown signal: {}", e);
        }
    }

    if let Err(e) = host.save() {
        error!("Failed to save accessory cache: {}", e);
    }

    info!("Prowl notification platform stopped");
}
