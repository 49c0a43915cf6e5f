use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::collect::Flow;
use crate::parse::LineParser;

use super::process::ProcessHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PumpLimits {
    /// How long a single receive may wait for the next line.
    pub line_timeout: Duration,
    /// Timeouts tolerated over the whole run, not just in a row.
    pub max_timeouts: u32,
    /// Consecutive unrecognized lines tolerated.
    pub max_noise: u32,
    /// How long to wait for the line producer after stopping.
    pub join_grace: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// End marker seen, or the collector had what it wanted.
    ParserRequestedStop,
    ProcessExited,
    TimeoutBudgetExceeded,
    NoiseBudgetExceeded,
    ParserFault,
}

/// Drains probe output into a parser until something says stop.
pub struct OutputPump<'a, P> {
    process: &'a mut P,
    lines: mpsc::UnboundedReceiver<String>,
    producer: JoinHandle<()>,
    limits: PumpLimits,
    timeouts: u32,
    closed: bool,
}

impl<'a, P: ProcessHandle> OutputPump<'a, P> {
    pub fn new(
        process: &'a mut P,
        lines: mpsc::UnboundedReceiver<String>,
        producer: JoinHandle<()>,
        limits: PumpLimits,
    ) -> Self {
        Self {
            process,
            lines,
            producer,
            limits,
            timeouts: 0,
            closed: false,
        }
    }

    /// Runs to a stop condition, interrupts the process and joins the producer.
    pub async fn run<L: LineParser>(mut self, parser: &mut L) -> StopReason {
        let reason = self.drain(parser).await;

        tracing::debug!(
            stop = ?reason,
            timeouts = self.timeouts,
            noise = parser.noise(),
            "stopping probe"
        );

        if let Err(e) = self.process.interrupt() {
            tracing::warn!(error = %e, "failed to interrupt probe process");
        }
        self.join_producer().await;

        reason
    }

    async fn drain<L: LineParser>(&mut self, parser: &mut L) -> StopReason {
        loop {
            let Some(line) = self.next_line().await else {
                if !self.process.is_alive() {
                    tracing::warn!("probe process exited unexpectedly");
                    return StopReason::ProcessExited;
                }
                self.timeouts += 1;
                tracing::debug!(timeouts = self.timeouts, "timeout while waiting for line");
                if self.timeouts > self.limits.max_timeouts {
                    return StopReason::TimeoutBudgetExceeded;
                }
                continue;
            };

            match parser.parse_line(&line) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Stop) => return StopReason::ParserRequestedStop,
                Err(e) => {
                    tracing::error!(error = %e, line = %line, "failed to parse probe output");
                    return StopReason::ParserFault;
                }
            }

            if parser.noise() > self.limits.max_noise {
                tracing::warn!(noise = parser.noise(), "too much unrecognized output");
                return StopReason::NoiseBudgetExceeded;
            }
        }
    }

    /// `None` when the wait window passed without a line.
    async fn next_line(&mut self) -> Option<String> {
        if !self.closed {
            match timeout(self.limits.line_timeout, self.lines.recv()).await {
                Ok(Some(line)) => return Some(line),
                Ok(None) => {
                    tracing::debug!("probe output closed");
                    self.closed = true;
                }
                Err(_) => return None,
            }
        }

        // Nothing can arrive any more; give the process the window to exit.
        tokio::time::sleep(self.limits.line_timeout).await;
        None
    }

    async fn join_producer(self) {
        let Self {
            lines,
            mut producer,
            limits,
            ..
        } = self;
        drop(lines);

        match timeout(limits.join_grace, &mut producer).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "line producer failed"),
            Err(_) => {
                tracing::warn!("line producer still running, aborting");
                producer.abort();
            }
        }
    }
}
