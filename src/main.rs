//! Tiered Cache - process entry point
//!
//! Boots one cache coordinator for the lifetime of the process and tears it
//! down on SIGINT/SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tiered_cache::{CacheCoordinator, Config, DistributedCache, MemoryBackend};

/// Main entry point.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Attach the distributed tier (in-memory backend) unless disabled
/// 4. Create the coordinator, which starts the in-process sweep
/// 5. Log cache statistics periodically
/// 6. Shut the coordinator down on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tiered_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting tiered cache");

    let config = Config::from_env();
    info!(
        "Configuration loaded: l1_ttl_ceiling={}s, l1_ttl={}s, l2_ttl={}s, sweep_interval={}s, l2_enabled={}",
        config.l1_ttl_ceiling,
        config.default_l1_ttl,
        config.default_l2_ttl,
        config.sweep_interval,
        config.l2_enabled
    );

    let backend: Option<Arc<dyn DistributedCache>> = config.l2_enabled.then(|| {
        Arc::new(MemoryBackend::new(Duration::from_secs(config.sweep_interval)))
            as Arc<dyn DistributedCache>
    });
    let cache = Arc::new(CacheCoordinator::new(config.cache_config(), backend));

    let reporter = {
        let cache = cache.clone();
        let every = Duration::from_secs(config.stats_interval.max(1));
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(every).await;
                let stats = cache.stats();
                info!(
                    l1_hits = stats.l1_hits,
                    l1_misses = stats.l1_misses,
                    l2_hits = stats.l2_hits,
                    l2_misses = stats.l2_misses,
                    hit_rate = stats.hit_rate,
                    "cache statistics"
                );
            }
        })
    };

    shutdown_signal().await?;

    reporter.abort();
    cache.shutdown();
    info!("Shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() -> anyhow::Result<()> {
    let ctrl_c = async { signal::ctrl_c().await.context("failed to install Ctrl+C handler") };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("failed to install SIGTERM handler")?
            .recv()
            .await;
        Ok::<(), anyhow::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<anyhow::Result<()>>();

    tokio::select! {
        result = ctrl_c => {
            result?;
            info!("Received Ctrl+C, initiating shutdown...");
        }
        result = terminate => {
            result?;
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
    Ok(())
}
