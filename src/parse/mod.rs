mod json;
mod qmap;

pub use json::FrameParser;
pub use qmap::QmapParser;

use thiserror::Error;

use crate::collect::Flow;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid frame record: {0}")]
    InvalidRecord(String),
}

/// Incremental parser fed one line of probe output at a time.
pub trait LineParser {
    /// Consumes one line. `Flow::Stop` means an end marker was seen or the
    /// collector has everything it wants.
    fn parse_line(&mut self, line: &str) -> Result<Flow, ParseError>;

    /// Unrecognized lines seen since the last recognized one.
    fn noise(&self) -> u32;
}
