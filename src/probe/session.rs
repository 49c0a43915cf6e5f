use tokio::process::Command;
use tracing::Instrument;

use crate::collect::{FixedCount, GopCollector};
use crate::config::ProbeConfig;
use crate::frame::{Frame, Gop, QmapFrame};
use crate::parse::{FrameParser, LineParser, QmapParser};

use super::process::{FfprobeProcess, ProbeError, ProbeMode};
use super::pump::{OutputPump, PumpLimits, StopReason};

/// What a collection run produced. Partial results are kept on failure.
#[derive(Debug)]
pub struct Collection<T> {
    /// Exactly the requested number of items were collected.
    pub complete: bool,
    pub items: Vec<T>,
    /// `None` when nothing had to be run.
    pub stop: Option<StopReason>,
}

impl<T> Collection<T> {
    fn nothing_requested() -> Self {
        Self {
            complete: true,
            items: Vec::new(),
            stop: None,
        }
    }
}

/// Collects the quantizer maps of the first `n` frames of `source`.
pub async fn get_n_qmaps(
    source: &str,
    n: usize,
    config: &ProbeConfig,
) -> Result<Collection<QmapFrame>, ProbeError> {
    if n == 0 {
        return Ok(Collection::nothing_requested());
    }
    let cmd = ProbeMode::Qmap.command(&config.ffprobe, source);
    collect_qmaps(cmd, n, config.limits(n))
        .instrument(tracing::info_span!("probe", source = %source, mode = "qmap"))
        .await
}

/// Collects the first `n` video frames of `source`.
pub async fn get_n_frames(
    source: &str,
    n: usize,
    config: &ProbeConfig,
) -> Result<Collection<Frame>, ProbeError> {
    if n == 0 {
        return Ok(Collection::nothing_requested());
    }
    let cmd = ProbeMode::Frames.command(&config.ffprobe, source);
    collect_frames(cmd, n, config.limits(n))
        .instrument(tracing::info_span!("probe", source = %source, mode = "frames"))
        .await
}

/// Collects the first `n` complete GOPs of `source`.
pub async fn get_n_gops(
    source: &str,
    n: usize,
    config: &ProbeConfig,
) -> Result<Collection<Gop>, ProbeError> {
    if n == 0 {
        return Ok(Collection::nothing_requested());
    }
    let cmd = ProbeMode::Frames.command(&config.ffprobe, source);
    collect_gops(cmd, n, config.limits(n))
        .instrument(tracing::info_span!("probe", source = %source, mode = "gops"))
        .await
}

async fn collect_qmaps(
    cmd: Command,
    n: usize,
    limits: PumpLimits,
) -> Result<Collection<QmapFrame>, ProbeError> {
    let mut parser = QmapParser::new(FixedCount::new(n));
    let stop = run_probe(cmd, ProbeMode::Qmap, &mut parser, limits).await?;
    let collector = parser.into_collector();
    let complete = collector.is_complete();
    Ok(finish(complete, collector.into_items(), stop))
}

async fn collect_frames(
    cmd: Command,
    n: usize,
    limits: PumpLimits,
) -> Result<Collection<Frame>, ProbeError> {
    let mut parser = FrameParser::new(FixedCount::new(n));
    let stop = run_probe(cmd, ProbeMode::Frames, &mut parser, limits).await?;
    let collector = parser.into_collector();
    let complete = collector.is_complete();
    Ok(finish(complete, collector.into_items(), stop))
}

async fn collect_gops(
    cmd: Command,
    n: usize,
    limits: PumpLimits,
) -> Result<Collection<Gop>, ProbeError> {
    let mut parser = FrameParser::new(GopCollector::new(n));
    let stop = run_probe(cmd, ProbeMode::Frames, &mut parser, limits).await?;
    let collector = parser.into_collector();
    let complete = collector.is_complete();
    Ok(finish(complete, collector.into_gops(), stop))
}

async fn run_probe<L: LineParser>(
    cmd: Command,
    mode: ProbeMode,
    parser: &mut L,
    limits: PumpLimits,
) -> Result<StopReason, ProbeError> {
    let (mut process, output) = FfprobeProcess::spawn(cmd, mode)?;
    tracing::debug!("probe started");

    let (lines, producer) = output.spawn_producer();
    Ok(OutputPump::new(&mut process, lines, producer, limits)
        .run(parser)
        .await)
}

fn finish<T>(complete: bool, items: Vec<T>, stop: StopReason) -> Collection<T> {
    if complete {
        tracing::info!(collected = items.len(), "collection complete");
    } else {
        tracing::warn!(collected = items.len(), stop = ?stop, "collection incomplete");
    }
    Collection {
        complete,
        items,
        stop: Some(stop),
    }
}
