//! LRU TTL Cache - load driver
//!
//! Hammers a `Cache<String>` from several threads with write-then-read pairs
//! and reports the resulting statistics as JSON.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tokio::signal;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lru_ttl_cache::{Cache, CacheConfig, LoadConfig};

/// Value written by every operation, suffixed with the operation number
const PAYLOAD: &str = r#"{"id":12125925,"ids":[-2147483648,2147483647],"title":"cache load","titles":["hello","world"],"price":40.8,"prices":[-0.1,0.1],"hot":true,"hots":[true,true,true],"author":{"name":"json","age":99,"male":true},"weights":[]}"#;

/// Main entry point for the load driver.
///
/// # Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load cache and workload configuration from environment variables
/// 3. Build the cache, which starts its expiration sweeper
/// 4. Run the workers until done or until Ctrl+C/SIGTERM
/// 5. Stop the sweeper and print statistics
#[tokio::main]
async fn main() -> Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lru_ttl_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting cache load driver");

    let cache_config = CacheConfig::from_env();
    let load = LoadConfig::from_env();
    info!(
        "Configuration loaded: capacity_bytes={:?}, sweep_interval={:?}, workers={}, ops_per_worker={}, ttl={:?}",
        cache_config.capacity_bytes,
        cache_config.sweep_interval,
        load.workers,
        load.ops_per_worker,
        load.ttl
    );

    let cache: Arc<Cache<String>> =
        Arc::new(Cache::new(cache_config).context("Failed to build cache")?);
    let stop = Arc::new(AtomicBool::new(false));

    let mismatches = tokio::select! {
        result = run_workload(cache.clone(), &load, stop.clone()) => Some(result?),
        _ = shutdown_signal() => {
            stop.store(true, Ordering::Relaxed);
            None
        }
    };

    cache.shutdown().await;

    let stats = cache.stats();
    println!(
        "{}",
        serde_json::to_string_pretty(&stats).context("Failed to serialize statistics")?
    );

    match mismatches {
        Some(0) => info!("Load run complete, hit rate {:.3}", stats.hit_rate()),
        Some(count) => bail!("{count} reads did not return the value just written"),
        None => warn!("Load run interrupted"),
    }

    Ok(())
}

/// Runs every worker on the blocking pool and sums their mismatches.
async fn run_workload(
    cache: Arc<Cache<String>>,
    load: &LoadConfig,
    stop: Arc<AtomicBool>,
) -> Result<u64> {
    let workers: Vec<_> = (0..load.workers)
        .map(|worker| {
            let cache = cache.clone();
            let stop = stop.clone();
            let (ops, ttl) = (load.ops_per_worker, load.ttl);
            tokio::task::spawn_blocking(move || run_worker(&cache, worker, ops, ttl, &stop))
        })
        .collect();

    let mut mismatches = 0;
    for worker in workers {
        mismatches += worker.await.context("Worker panicked")?;
    }
    Ok(mismatches)
}

/// Writes then reads back `ops` unique keys, counting reads that missed.
fn run_worker(
    cache: &Cache<String>,
    worker: usize,
    ops: usize,
    ttl: Duration,
    stop: &AtomicBool,
) -> u64 {
    let mut mismatches = 0;
    for op in 0..ops {
        if stop.load(Ordering::Relaxed) {
            break;
        }
        let key = format!("worker-{worker}-{op}");
        let value = format!("{PAYLOAD}{op}");
        cache.set(&key, value.clone(), ttl);

        if cache.get(&key).as_deref() != Some(value.as_str()) {
            mismatches += 1;
        }
    }
    debug!(worker, mismatches, "Worker finished");
    mismatches
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(%err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(%err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, stopping workers...");
        }
        _ = terminate => {
            info!("Received SIGTERM, stopping workers...");
        }
    }
}
