//! Frame metadata and quantizer maps pulled out of ffprobe's diagnostic output.

pub mod analysis;
pub mod collect;
pub mod config;
pub mod frame;
pub mod parse;
pub mod probe;
