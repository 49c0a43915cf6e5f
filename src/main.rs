use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use vidstream::analysis::{are_gops_fixed, average_gop_size, split_frames_by_missing};
use vidstream::config::{CollectMode, Config, ProbeConfig, SourceConfig};
use vidstream::probe::{self, ProbeError, StopReason};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("vidstream=debug".parse()?))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    tracing::info!("loaded {} source(s)", config.sources.len());

    let probe_config = Arc::new(config.probe);
    let mut handles = Vec::new();

    for source in config.sources {
        let probe_config = Arc::clone(&probe_config);
        let source_id = source.id.clone();

        let handle = tokio::spawn(async move { run_source(&source, &probe_config).await });

        handles.push((source_id, handle));
    }

    for (source_id, handle) in handles {
        tokio::select! {
            result = handle => {
                match result {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => tracing::error!(source = %source_id, "probe failed: {}", e),
                    Err(e) => tracing::error!(source = %source_id, "probe task failed: {}", e),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutdown signal received");
                break;
            }
        }
    }

    tracing::info!("shutdown complete");

    Ok(())
}

async fn run_source(source: &SourceConfig, config: &ProbeConfig) -> Result<(), ProbeError> {
    tracing::info!(
        source = %source.id,
        url = %source.url,
        mode = ?source.mode,
        count = source.count,
        "probing"
    );

    match source.mode {
        CollectMode::Qmap => {
            let result = probe::get_n_qmaps(&source.url, source.count, config).await?;
            for (index, frame) in result.items.iter().enumerate() {
                tracing::info!(
                    source = %source.id,
                    index,
                    frame_type = %frame.frame_type,
                    macroblocks = frame.qmap.len(),
                    average_qp = ?frame.average_qp(),
                    "qmap frame"
                );
            }
            report(source, result.complete, result.items.len(), result.stop);
        }
        CollectMode::Frames => {
            let result = probe::get_n_frames(&source.url, source.count, config).await?;
            match split_frames_by_missing(&result.items) {
                Ok(runs) => tracing::info!(
                    source = %source.id,
                    runs = runs.len(),
                    missing = runs.len() > 1,
                    "frame sequence"
                ),
                Err(e) => tracing::warn!(source = %source.id, error = %e, "frame sequence unusable"),
            }
            report(source, result.complete, result.items.len(), result.stop);
        }
        CollectMode::Gops => {
            let result = probe::get_n_gops(&source.url, source.count, config).await?;
            tracing::info!(
                source = %source.id,
                average_size = ?average_gop_size(&result.items),
                fixed = ?are_gops_fixed(&result.items),
                "gop stats"
            );
            report(source, result.complete, result.items.len(), result.stop);
        }
    }

    Ok(())
}

fn report(source: &SourceConfig, complete: bool, collected: usize, stop: Option<StopReason>) {
    if complete {
        tracing::info!(source = %source.id, collected, "got requested number of items");
    } else {
        tracing::warn!(
            source = %source.id,
            collected,
            requested = source.count,
            stop = ?stop,
            "failed to retrieve requested number of items"
        );
    }
}
