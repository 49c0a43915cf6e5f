mod gop;
mod model;

pub use gop::Gop;
pub use model::{Frame, FrameType, QmapFrame};
