//! `run` command implementation.

use std::time::Instant;

use anyhow::{Context, Result};
use contracts::PublishClient;
use dispatcher::{create_dispatcher, Dispatcher, LogPublisher};
use tracing::{info, warn};

use super::load_config;
use crate::cli::RunArgs;
use crate::pipeline::{EventSource, RunStats};

/// Execute the `run` command
pub async fn run_publish(args: &RunArgs) -> Result<()> {
    let config = load_config(&args.config, &args.overrides)?;

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
        info!("Metrics endpoint available on port {}", args.metrics_port);
    }

    if !args.dry_publish {
        #[cfg(feature = "gcp")]
        return publish_events(dispatcher::create_pubsub_output(&config).await?, args).await;

        #[cfg(not(feature = "gcp"))]
        warn!("Built without the `gcp` feature, messages will only be logged");
    }

    let output = create_dispatcher(&config.pubsub, &config.template, |_| async {
        Ok(LogPublisher::new("dry-publish"))
    })
    .await?;

    publish_events(output, args).await
}

async fn publish_events<C>(output: Option<Dispatcher<C>>, args: &RunArgs) -> Result<()>
where
    C: PublishClient + Sync + 'static,
{
    let Some(output) = output else {
        anyhow::bail!("Pub/Sub output is disabled: credentials and project_id are required");
    };

    let mut source = EventSource::open(args.input.as_deref())
        .await
        .context("Failed to open event input")?;

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    info!(client = %output.client().name(), "Publishing events...");

    let start_time = Instant::now();
    let mut events_sent = 0u64;

    loop {
        tokio::select! {
            next = source.next_event() => match next? {
                Some(event) => {
                    output.send(Some(event));
                    events_sent += 1;
                }
                None => {
                    info!("End of input");
                    break;
                }
            },
            _ = &mut shutdown => {
                warn!("Received shutdown signal, draining in-flight publishes...");
                break;
            }
        }
    }

    output.shutdown().await;

    let stats = RunStats {
        events_sent,
        events_skipped: source.skipped(),
        duration: start_time.elapsed(),
        publish: observability::PublishSummary::from_counts(output.metrics().snapshot()),
    };

    info!(
        events_sent = stats.events_sent,
        events_skipped = stats.events_skipped,
        requests = stats.publish.total_requests,
        errors = stats.publish.total_errors,
        duration_secs = stats.duration.as_secs_f64(),
        "Event Pub/Sub finished"
    );
    stats.print_summary();

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
