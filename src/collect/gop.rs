use crate::frame::{Frame, Gop};

use super::{Collector, Flow};

/// Accumulates frames into closed GOPs until `target` of them are complete.
pub struct GopCollector {
    target: usize,
    current_gop: Option<Gop>,
    gops: Vec<Gop>,
    discarded: usize,
}

impl GopCollector {
    pub fn new(target: usize) -> Self {
        Self {
            target,
            current_gop: None,
            gops: Vec::with_capacity(target),
            discarded: 0,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.gops.len() == self.target
    }

    /// Closed groups only; a group still waiting for its successor key frame is dropped.
    pub fn into_gops(self) -> Vec<Gop> {
        self.gops
    }

    fn handle_frame(&mut self, frame: Frame) {
        match Gop::open(frame) {
            Ok(gop) => {
                // a new key frame closes the running group
                if let Some(done) = self.current_gop.replace(gop) {
                    tracing::debug!(frames = done.frame_count(), "GOP closed");
                    self.gops.push(done);
                }
            }
            Err(frame) => match self.current_gop {
                Some(ref mut gop) => gop.append_frame(frame),
                None => {
                    self.discarded += 1;
                    tracing::trace!(
                        discarded = self.discarded,
                        "frame before first key frame, discarding"
                    );
                }
            },
        }
    }
}

impl Collector<Frame> for GopCollector {
    fn offer(&mut self, frame: Frame) -> Flow {
        if self.is_complete() {
            return Flow::Stop;
        }
        self.handle_frame(frame);
        if self.is_complete() {
            Flow::Stop
        } else {
            Flow::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameType;

    fn frame(frame_type: FrameType, key_frame: bool) -> Frame {
        Frame {
            frame_type,
            key_frame,
            width: 1280,
            height: 720,
            coded_picture_number: None,
        }
    }

    fn i() -> Frame {
        frame(FrameType::I, true)
    }

    fn p() -> Frame {
        frame(FrameType::P, false)
    }

    #[test]
    fn test_groups_on_key_frames() {
        let mut collector = GopCollector::new(2);
        for f in [i(), p(), p(), i(), p()] {
            assert_eq!(collector.offer(f), Flow::Continue);
        }
        assert_eq!(collector.offer(i()), Flow::Stop);

        let gops = collector.into_gops();
        assert_eq!(gops.len(), 2);
        assert_eq!(gops[0].frame_count(), 3);
        assert_eq!(gops[1].frame_count(), 2);
        assert!(gops.iter().all(|g| g.key_frame().starts_gop()));
    }

    #[test]
    fn test_discards_frames_before_first_gop() {
        let mut collector = GopCollector::new(1);
        collector.offer(p());
        collector.offer(frame(FrameType::B, false));
        collector.offer(i());
        collector.offer(p());
        assert_eq!(collector.offer(i()), Flow::Stop);

        let gops = collector.into_gops();
        assert_eq!(gops.len(), 1);
        assert_eq!(gops[0].frames(), &[i(), p()]);
    }

    #[test]
    fn test_non_i_key_frame_does_not_split() {
        let mut collector = GopCollector::new(1);
        collector.offer(i());
        collector.offer(frame(FrameType::P, true));
        collector.offer(frame(FrameType::I, false));
        collector.offer(i());

        let gops = collector.into_gops();
        assert_eq!(gops[0].frame_count(), 3);
    }

    #[test]
    fn test_open_gop_is_not_complete() {
        let mut collector = GopCollector::new(1);
        collector.offer(i());
        collector.offer(p());
        assert!(!collector.is_complete());
        assert!(collector.into_gops().is_empty());
    }
}
