use serde::Deserialize;
use serde_json::Value;

use crate::collect::{Collector, Flow};
use crate::frame::{Frame, FrameType};

use super::{LineParser, ParseError};

/// Closing brace of the `{"frames": [...]}` container.
const END_MARKER: &str = "}";

#[derive(Deserialize)]
struct VideoFrameRecord {
    key_frame: u8,
    pict_type: FrameType,
    width: u32,
    height: u32,
    #[serde(default)]
    coded_picture_number: Option<u64>,
}

impl From<VideoFrameRecord> for Frame {
    fn from(r: VideoFrameRecord) -> Self {
        Frame {
            frame_type: r.pict_type,
            key_frame: r.key_frame == 1,
            width: r.width,
            height: r.height,
            coded_picture_number: r.coded_picture_number,
        }
    }
}

/// Parses `-show_frames -print_format json=compact=1` output, one frame
/// object per line.
pub struct FrameParser<C> {
    collector: C,
    noise: u32,
}

impl<C: Collector<Frame>> FrameParser<C> {
    pub fn new(collector: C) -> Self {
        Self {
            collector,
            noise: 0,
        }
    }

    pub fn into_collector(self) -> C {
        self.collector
    }
}

impl<C: Collector<Frame>> LineParser for FrameParser<C> {
    fn parse_line(&mut self, line: &str) -> Result<Flow, ParseError> {
        let line = line.trim();
        if line == END_MARKER {
            return Ok(Flow::Stop);
        }

        let body = line.strip_suffix(',').unwrap_or(line);
        let record = match serde_json::from_str::<Value>(body) {
            Ok(v @ Value::Object(_)) => v,
            _ => {
                self.noise += 1;
                return Ok(Flow::Continue);
            }
        };

        if record.get("media_type").and_then(Value::as_str) != Some("video") {
            return Ok(Flow::Continue);
        }

        // "?" and "S" frames carry nothing the collectors can use
        match record.get("pict_type").and_then(Value::as_str) {
            Some(t) if FrameType::from_pict_type(t).is_none() => {
                tracing::debug!(pict_type = t, "skipping frame of unknown type");
                return Ok(Flow::Continue);
            }
            _ => {}
        }

        let frame: Frame = serde_json::from_value::<VideoFrameRecord>(record)
            .map_err(|e| ParseError::InvalidRecord(e.to_string()))?
            .into();
        self.noise = 0;
        Ok(self.collector.offer(frame))
    }

    fn noise(&self) -> u32 {
        self.noise
    }
}
