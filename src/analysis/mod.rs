mod gaps;
mod stats;

pub use gaps::{are_frames_missing, split_frames_by_missing, SequenceError};
pub use stats::{are_gops_fixed, average_gop_size};
