//! Subprocess invocation for the external tools the pipelines shell out to.
//!
//! All integration is against the tools' plain-text output; no structured
//! interface is used. Tool binaries are resolved from the environment
//! (`OBJDUMP`, `ADB`) with conventional defaults so cross builds can point
//! at prefixed toolchains.

use std::env;
use std::ffi::OsStr;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

/// Failure modes when running an external tool. No retries are attempted;
/// these are one-shot developer tools and the human re-runs.
#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("failed to run {tool}: {source}")]
    Io {
        tool: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{tool} exited with {status}: {stderr}")]
    ExitStatus {
        tool: String,
        status: ExitStatus,
        stderr: String,
    },
    #[error("{tool} exceeded the {limit:?} wall-clock limit")]
    Timeout { tool: String, limit: Duration },
}

/// Resolve the objdump binary, honoring an `OBJDUMP` override.
pub fn objdump_path() -> PathBuf {
    env::var_os("OBJDUMP").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("objdump"))
}

/// Resolve the adb binary, honoring an `ADB` override.
pub fn adb_path() -> PathBuf {
    env::var_os("ADB").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("adb"))
}

/// Extra adb arguments selecting a device when `ANDROID_SERIAL` is set.
///
/// adb itself honors the variable, but passing `-s` explicitly keeps the
/// echoed command reproducible when copy-pasted into another shell.
pub fn adb_device_args() -> Vec<String> {
    match env::var("ANDROID_SERIAL") {
        Ok(serial) if !serial.is_empty() => vec!["-s".to_string(), serial],
        _ => Vec::new(),
    }
}

/// Runs one external command per call, synchronously, capturing stdout.
///
/// An optional hard wall-clock bound can be set; a child that exceeds it is
/// killed and the call fails with [`InvokeError::Timeout`].
#[derive(Debug, Clone, Default)]
pub struct ToolInvoker {
    timeout: Option<Duration>,
}

impl ToolInvoker {
    pub fn new() -> Self {
        Self { timeout: None }
    }

    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    /// Run `program` with `args`, wait for completion, and return captured
    /// stdout as (lossy) UTF-8 text.
    pub fn run<I, S>(&self, program: &OsStr, args: I) -> Result<String, InvokeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let tool = program.to_string_lossy().to_string();
        let mut cmd = Command::new(program);
        cmd.args(args).stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());
        tracing::debug!("executing: {}", render_command(&cmd));

        match self.timeout {
            None => {
                let output =
                    cmd.output().map_err(|source| InvokeError::Io { tool: tool.clone(), source })?;
                if !output.status.success() {
                    return Err(InvokeError::ExitStatus {
                        tool,
                        status: output.status,
                        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                    });
                }
                Ok(String::from_utf8_lossy(&output.stdout).to_string())
            }
            Some(limit) => self.run_with_deadline(cmd, tool, limit),
        }
    }

    fn run_with_deadline(
        &self,
        mut cmd: Command,
        tool: String,
        limit: Duration,
    ) -> Result<String, InvokeError> {
        let mut child =
            cmd.spawn().map_err(|source| InvokeError::Io { tool: tool.clone(), source })?;

        // Drain the pipes on helper threads so a chatty child cannot block
        // on a full pipe buffer while we poll for exit.
        let stdout_pipe = child.stdout.take();
        let stdout_handle = thread::spawn(move || drain_pipe(stdout_pipe));
        let stderr_pipe = child.stderr.take();
        let stderr_handle = thread::spawn(move || drain_pipe(stderr_pipe));

        let deadline = Instant::now() + limit;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {}
                Err(source) => return Err(InvokeError::Io { tool: tool.clone(), source }),
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return Err(InvokeError::Timeout { tool: tool.clone(), limit });
            }
            thread::sleep(Duration::from_millis(20));
        };

        let stdout = stdout_handle.join().unwrap_or_default();
        let stderr = stderr_handle.join().unwrap_or_default();
        if !status.success() {
            return Err(InvokeError::ExitStatus {
                tool,
                status,
                stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&stdout).to_string())
    }
}

fn drain_pipe<R: Read>(pipe: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(&mut buf);
    }
    buf
}

/// Render a command line roughly as a shell would show it, for echoing and
/// for dry runs.
pub fn render_command(cmd: &Command) -> String {
    let mut parts = vec![cmd.get_program().to_string_lossy().to_string()];
    parts.extend(cmd.get_args().map(|a| a.to_string_lossy().to_string()));
    parts.join(" ")
}
