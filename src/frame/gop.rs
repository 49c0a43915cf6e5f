use super::Frame;

/// A group of pictures: an I key frame followed by the frames that depend on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gop {
    frames: Vec<Frame>,
}

impl Gop {
    /// Opens a group on `frame`, or hands the frame back if it cannot start one.
    pub fn open(frame: Frame) -> Result<Self, Frame> {
        if !frame.starts_gop() {
            return Err(frame);
        }
        Ok(Self {
            frames: vec![frame],
        })
    }

    pub fn append_frame(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn key_frame(&self) -> &Frame {
        &self.frames[0]
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}
