use std::fmt;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum FrameType {
    I,
    P,
    B,
}

impl FrameType {
    pub fn from_pict_type(s: &str) -> Option<Self> {
        match s {
            "I" => Some(Self::I),
            "P" => Some(Self::P),
            "B" => Some(Self::B),
            _ => None,
        }
    }
}

impl fmt::Display for FrameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::I => "I",
            Self::P => "P",
            Self::B => "B",
        };
        f.write_str(s)
    }
}

/// Descriptive metadata for one decoded video frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub frame_type: FrameType,
    pub key_frame: bool,
    pub width: u32,
    pub height: u32,
    /// Decoder-assigned coding order. Recent ffprobe builds stopped printing it.
    pub coded_picture_number: Option<u64>,
}

impl Frame {
    /// True for frames that can open a group of pictures.
    pub fn starts_gop(&self) -> bool {
        self.key_frame && self.frame_type == FrameType::I
    }
}

/// Per-macroblock quantizer values of one frame, in raster order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QmapFrame {
    pub frame_type: FrameType,
    pub qmap: Vec<u8>,
}

impl QmapFrame {
    pub fn average_qp(&self) -> Option<f64> {
        if self.qmap.is_empty() {
            return None;
        }
        let sum: u64 = self.qmap.iter().map(|&qp| qp as u64).sum();
        Some(sum as f64 / self.qmap.len() as f64)
    }
}
