mod process;
mod producer;
mod pump;
mod session;

pub use process::{FfprobeProcess, ProbeError, ProbeMode, ProcessHandle};
pub use pump::{OutputPump, PumpLimits, StopReason};
pub use session::{get_n_frames, get_n_gops, get_n_qmaps, Collection};
