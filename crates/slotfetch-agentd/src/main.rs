mod catalog;

use std::{sync::Arc, time::Duration};

use tracing::info;

use slotfetch_core::{Dispatcher, DispatcherConfig, MetricsHandle};
use slotfetch_observe::{LoggerConfig, LoggerLevel, init_logger};
use slotfetch_prometheus::{Encoder, PrometheusMetrics, TextEncoder};

use crate::catalog::RecipeCatalog;

const API_KEY: &str = "demo-key";

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    // 1) logger
    let cfg = LoggerConfig {
        level: LoggerLevel::new("info,slotfetch_core=debug")?,
        ..Default::default()
    }
    .with_env_overrides()?;
    init_logger(&cfg)?;
    info!("logger initialized");

    // 2) metrics
    let metrics = PrometheusMetrics::new()?;
    let metrics_handle: MetricsHandle = Arc::new(metrics.clone());

    // 3) dispatcher
    let remote = RecipeCatalog::new(API_KEY, Duration::from_millis(200));
    let config = DispatcherConfig::new(API_KEY).with_timeout_ms(1_000);
    let dispatcher = Dispatcher::builder(remote, config)
        .with_metrics(metrics_handle)
        .build()?;

    // 4) observers
    dispatcher.search_results().observe(|list| {
        let titles: Vec<&str> = list
            .iter()
            .flatten()
            .map(|r| r.title.as_str())
            .collect();
        info!(?titles, "search results changed");
    });
    dispatcher.item_result().observe(|item| {
        info!(item = ?item.as_ref().map(|r| &r.title), "item changed");
    });
    dispatcher.timed_out().observe(|flag| info!(timed_out = *flag, "timeout flag changed"));

    // 5) search: page 1 replaces, page 2 appends
    dispatcher.start_search("tomato", 1)?;
    tokio::time::sleep(Duration::from_millis(400)).await;
    dispatcher.start_search("tomato", 2)?;
    tokio::time::sleep(Duration::from_millis(400)).await;

    // 6) fetch: hit, miss, then one that times out
    dispatcher.start_fetch_by_id("r-005")?;
    tokio::time::sleep(Duration::from_millis(400)).await;
    dispatcher.start_fetch_by_id("r-404")?;
    tokio::time::sleep(Duration::from_millis(400)).await;
    dispatcher.start_fetch_by_id("slow-r-001")?;
    tokio::time::sleep(Duration::from_millis(1_500)).await;

    // 7) cancelled search never publishes
    dispatcher.start_search("lentil", 1)?;
    dispatcher.cancel_all();
    tokio::time::sleep(Duration::from_millis(400)).await;

    // 8) metrics dump
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&metrics.gather(), &mut buffer)?;
    println!("{}", String::from_utf8(buffer)?);

    info!("demo finished");
    Ok(())
}
