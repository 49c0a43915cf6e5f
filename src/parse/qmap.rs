use crate::collect::{Collector, Flow};
use crate::frame::{FrameType, QmapFrame};

use super::{LineParser, ParseError};

// helper.
macro_rules! regex {
    ($re:literal $(,)?) => {{
        static RE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
        RE.get_or_init(|| regex::Regex::new($re).unwrap())
    }};
}

/// Parses the `-debug qp` output ffprobe writes to stderr.
///
/// Every line carries a `[codec @ 0x...]` prefix. A frame is only complete
/// once the next `New frame` marker shows up, so the last frame before the
/// end marker never reaches the collector.
pub struct QmapParser<C> {
    collector: C,
    current: Option<QmapFrame>,
    noise: u32,
}

impl<C: Collector<QmapFrame>> QmapParser<C> {
    pub fn new(collector: C) -> Self {
        Self {
            collector,
            current: None,
            noise: 0,
        }
    }

    pub fn into_collector(self) -> C {
        self.collector
    }

    fn start_frame(&mut self, frame_type: FrameType) -> Flow {
        let next = QmapFrame {
            frame_type,
            qmap: Vec::new(),
        };
        match self.current.replace(next) {
            Some(done) => {
                tracing::trace!(
                    frame_type = %done.frame_type,
                    macroblocks = done.qmap.len(),
                    "qmap frame complete"
                );
                self.collector.offer(done)
            }
            None => Flow::Continue,
        }
    }

    fn append_qps(&mut self, digits: &str) {
        let Some(frame) = self.current.as_mut() else {
            tracing::debug!(len = digits.len(), "qp values before first frame marker, dropping");
            return;
        };
        frame.qmap.extend(
            digits
                .as_bytes()
                .chunks_exact(2)
                .map(|pair| (pair[0] - b'0') * 10 + (pair[1] - b'0')),
        );
    }
}

impl<C: Collector<QmapFrame>> LineParser for QmapParser<C> {
    fn parse_line(&mut self, line: &str) -> Result<Flow, ParseError> {
        let line = line.trim_end();

        if regex!(r"^\[.*\] All info found$").is_match(line) {
            self.noise = 0;
            return Ok(Flow::Stop);
        }

        if let Some(caps) = regex!(r"^\[.*\] New frame, type: ([IPB])$").captures(line) {
            self.noise = 0;
            let frame_type = FrameType::from_pict_type(&caps[1])
                .ok_or_else(|| ParseError::InvalidRecord(format!("frame type {}", &caps[1])))?;
            return Ok(self.start_frame(frame_type));
        }

        if let Some(caps) = regex!(r"^\[.*\] ([0-9]*)$").captures(line) {
            let digits = &caps[1];
            if digits.len() % 2 == 0 {
                self.noise = 0;
                self.append_qps(digits);
                return Ok(Flow::Continue);
            }
        }

        self.noise += 1;
        Ok(Flow::Continue)
    }

    fn noise(&self) -> u32 {
        self.noise
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::FixedCount;

    fn feed<C: Collector<QmapFrame>>(parser: &mut QmapParser<C>, lines: &[&str]) -> Vec<Flow> {
        lines
            .iter()
            .map(|l| parser.parse_line(l).unwrap())
            .collect()
    }

    #[test]
    fn test_frame_flushed_on_next_marker() {
        let mut parser = QmapParser::new(FixedCount::new(10));
        feed(
            &mut parser,
            &[
                "[h264 @ 0x55d0c8] New frame, type: I\n",
                "[h264 @ 0x55d0c8] 252627\n",
                "[h264 @ 0x55d0c8] 0899\n",
                "[h264 @ 0x55d0c8] New frame, type: P\n",
            ],
        );

        let frames = parser.into_collector().into_items();
        assert_eq!(
            frames,
            vec![QmapFrame {
                frame_type: FrameType::I,
                qmap: vec![25, 26, 27, 8, 99],
            }]
        );
    }

    #[test]
    fn test_end_marker_stops_without_flush() {
        let mut parser = QmapParser::new(FixedCount::new(10));
        let flows = feed(
            &mut parser,
            &[
                "[h264 @ 0x1] New frame, type: B",
                "[h264 @ 0x1] 30",
                "[h264 @ 0x1] All info found",
            ],
        );
        assert_eq!(flows.last(), Some(&Flow::Stop));
        assert!(parser.into_collector().into_items().is_empty());
    }

    #[test]
    fn test_collector_stop_propagates() {
        let mut parser = QmapParser::new(FixedCount::new(1));
        let flows = feed(
            &mut parser,
            &["[h264 @ 0x1] New frame, type: I", "[h264 @ 0x1] New frame, type: P"],
        );
        assert_eq!(flows, vec![Flow::Continue, Flow::Stop]);
    }

    #[test]
    fn test_noise_counts_and_resets() {
        let mut parser = QmapParser::new(FixedCount::new(10));
        feed(
            &mut parser,
            &[
                "Input #0, rtsp, from 'rtsp://example.org':",
                "  Duration: N/A, start: 0.000000, bitrate: N/A",
                "[h264 @ 0x1] 123",
            ],
        );
        assert_eq!(parser.noise(), 3);

        feed(&mut parser, &["[h264 @ 0x1] New frame, type: P"]);
        assert_eq!(parser.noise(), 0);
    }

    #[test]
    fn test_digits_before_first_marker_are_dropped() {
        let mut parser = QmapParser::new(FixedCount::new(10));
        feed(
            &mut parser,
            &[
                "[h264 @ 0x1] 1111",
                "[h264 @ 0x1] New frame, type: I",
                "[h264 @ 0x1] 22",
                "[h264 @ 0x1] New frame, type: I",
            ],
        );
        assert_eq!(parser.noise(), 0);
        let frames = parser.into_collector().into_items();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].qmap, vec![22]);
    }
}
