use std::io;
use std::path::Path;
use std::process::Stdio;

use thiserror::Error;
use tokio::process::{Child, ChildStderr, ChildStdout, Command};

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("ffprobe not found")]
    FfprobeNotFound,
    #[error("failed to capture {0}")]
    MissingPipe(&'static str),
}

/// What the probe is asked to print, and where it prints it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeMode {
    /// `-debug qp`, written to stderr
    Qmap,
    /// `-show_frames` as compact JSON, written to stdout
    Frames,
}

impl ProbeMode {
    pub fn command(self, ffprobe: &Path, source: &str) -> Command {
        let mut cmd = Command::new(ffprobe);
        cmd.arg("-hide_banner");
        match self {
            Self::Qmap => cmd.args(["-debug", "qp"]),
            Self::Frames => cmd.args([
                "-loglevel",
                "error",
                "-select_streams",
                "v:0",
                "-show_frames",
                "-print_format",
                "json=compact=1",
            ]),
        };
        cmd.arg(source);
        self.pipe(&mut cmd);
        cmd
    }

    /// Pipes the stream this mode parses and discards the other one.
    pub fn pipe(self, cmd: &mut Command) -> &mut Command {
        let (stdout, stderr) = match self {
            Self::Qmap => (Stdio::null(), Stdio::piped()),
            Self::Frames => (Stdio::piped(), Stdio::null()),
        };
        cmd.stdin(Stdio::null()).stdout(stdout).stderr(stderr)
    }
}

/// Control surface the drain loop needs over the external process.
pub trait ProcessHandle {
    fn is_alive(&mut self) -> bool;

    /// Asks the process to wrap up. Never waits for it to exit.
    fn interrupt(&mut self) -> io::Result<()>;
}

/// Output pipe of a running probe.
pub enum ProbeOutput {
    Stdout(ChildStdout),
    Stderr(ChildStderr),
}

pub struct FfprobeProcess {
    child: Child,
}

impl FfprobeProcess {
    /// Spawns `cmd` and takes the pipe `mode` reads from.
    pub fn spawn(mut cmd: Command, mode: ProbeMode) -> Result<(Self, ProbeOutput), ProbeError> {
        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ProbeError::FfprobeNotFound
            } else {
                ProbeError::Io(e)
            }
        })?;

        let output = match mode {
            ProbeMode::Qmap => child
                .stderr
                .take()
                .map(ProbeOutput::Stderr)
                .ok_or(ProbeError::MissingPipe("stderr")),
            ProbeMode::Frames => child
                .stdout
                .take()
                .map(ProbeOutput::Stdout)
                .ok_or(ProbeError::MissingPipe("stdout")),
        };

        let mut process = Self { child };
        match output {
            Ok(output) => Ok((process, output)),
            Err(e) => {
                let _ = process.interrupt();
                Err(e)
            }
        }
    }
}

impl ProcessHandle for FfprobeProcess {
    fn is_alive(&mut self) -> bool {
        self.child.try_wait().ok().flatten().is_none()
    }

    #[cfg(unix)]
    fn interrupt(&mut self) -> io::Result<()> {
        // id() is None once the child has been reaped
        let Some(pid) = self.child.id() else {
            return Ok(());
        };
        // the runtime reaps the dropped `kill` child; the drain loop never waits on it
        Command::new("kill")
            .args(["-INT", &pid.to_string()])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(drop)
    }

    #[cfg(not(unix))]
    fn interrupt(&mut self) -> io::Result<()> {
        self.child.start_kill()
    }
}
