use kingston_happenings::aggregator::{EventAggregator, Summary};
use kingston_happenings::classifier::CategoryClassifier;
use kingston_happenings::config::env_loader::load_config;
use kingston_happenings::config::model::Config;
use kingston_happenings::error::ConfigError;
use kingston_happenings::normalizer::EventNormalizer;
use kingston_happenings::sources::adapter::SourceAdapter;
use kingston_happenings::sources::http::HttpClient;
use kingston_happenings::sources::registry::{
    build_adapters, demo_adapters, load_source_definitions,
};
use kingston_happenings::tracing::setup_logging;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let loki = setup_logging().await;

    let exit_code = run().await;

    if let Some((controller, handle)) = loki {
        controller.shutdown().await;
        if let Err(err) = handle.await {
            eprintln!("Loki background task failed: {}", err);
        }
    }

    exit_code
}

async fn run() -> ExitCode {
    info!("Kingston Happenings event scraper");

    let config = match load_config() {
        Ok(config) => config,
        Err(err) => {
            error!("{}", err);
            return ExitCode::from(2);
        }
    };

    let (classifier, adapters) = match prepare(&config) {
        Ok(prepared) => prepared,
        Err(err) => {
            error!("{}", err);
            return ExitCode::from(2);
        }
    };

    let cancelled = Arc::new(AtomicBool::new(false));
    listen_for_cancellation(cancelled.clone());

    let normalizer = EventNormalizer::new(classifier).with_adapter_timeout(config.adapter_timeout);
    let mut report = normalizer.run_until_cancelled(&adapters, &cancelled).await;

    let mut aggregator = EventAggregator::new();
    aggregator.add(std::mem::take(&mut report.events));

    log_summary(&aggregator.summary());

    let failed: Vec<&str> = report
        .failed_adapters()
        .map(|adapter| adapter.name.as_str())
        .collect();
    if !failed.is_empty() {
        warn!("{} adapters failed: {}", failed.len(), failed.join(", "));
    }

    let skipped = report.skipped_records();
    if skipped > 0 {
        warn!("{} records were skipped", skipped);
    }

    if report.all_adapters_failed() {
        error!("Every adapter failed, keeping the previous snapshot");
        return ExitCode::FAILURE;
    }

    if let Err(err) = aggregator.export_to_path(&config.snapshot_path) {
        error!("{}", err);
        return ExitCode::FAILURE;
    }

    if report.cancelled {
        warn!("Run was cancelled, the snapshot only has the adapters that completed");
    }

    ExitCode::SUCCESS
}

fn prepare(
    config: &Config,
) -> Result<(CategoryClassifier, Vec<Box<dyn SourceAdapter>>), ConfigError> {
    let classifier = match &config.category_keywords_file {
        Some(path) => CategoryClassifier::from_json_file(path)?,
        None => CategoryClassifier::default(),
    };

    let adapters = match &config.sources_file {
        Some(path) => {
            let definitions = load_source_definitions(path)?;
            let client = HttpClient::new(&config.http)?;

            build_adapters(&definitions, &client)?
        }
        None => {
            info!("No sources file configured, using the demo sources");
            demo_adapters()
        }
    };

    Ok((classifier, adapters))
}

fn listen_for_cancellation(cancelled: Arc<AtomicBool>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Cancellation requested, finishing the current adapter");
            cancelled.store(true, Ordering::SeqCst);
        }
    });
}

fn log_summary(summary: &Summary) {
    info!("Scraping complete!");
    info!("Total events found: {}", summary.total);

    info!("Events by category:");
    for (category, count) in &summary.by_category {
        info!("  - {}: {}", category, count);
    }

    info!("Events by venue:");
    for (venue, count) in &summary.by_venue {
        info!("  - {}: {}", venue, count);
    }
}
