use crate::error::{BblError, Result};
use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Locate an external tool on `PATH`
pub fn require_binary(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| {
        BblError::DependencyMissing(format!("'{}' was not found on PATH", name))
    })
}

/// Where a child's stdout and stderr go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Streams {
    Captured,
    Inherited,
}

/// Run to completion and hand back the raw output, whatever the exit status.
///
/// Callers that interpret stderr themselves (the aws CLI adapter) use this.
pub fn capture(cmd: &mut Command, timeout: Duration) -> Result<Output> {
    execute(cmd, Streams::Captured, timeout)
}

/// Run with captured output; a non-zero exit becomes
/// [`BblError::SystemCommandFailed`] carrying the trimmed stderr.
pub fn capture_success(cmd: &mut Command, label: &str, timeout: Duration) -> Result<Output> {
    let output = capture(cmd, timeout)?;
    if !output.status.success() {
        return Err(BblError::SystemCommandFailed {
            command: label.to_string(),
            reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(output)
}

/// Run with the child's output shown on the terminal as it happens.
pub fn stream_success(cmd: &mut Command, label: &str, timeout: Duration) -> Result<()> {
    let output = execute(cmd, Streams::Inherited, timeout)?;
    if !output.status.success() {
        return Err(BblError::SystemCommandFailed {
            command: label.to_string(),
            reason: format!("exited with {}", output.status),
        });
    }
    Ok(())
}

fn execute(cmd: &mut Command, streams: Streams, timeout: Duration) -> Result<Output> {
    let command = describe(cmd);
    let failed = |reason: String| BblError::SystemCommandFailed {
        command: command.clone(),
        reason,
    };

    let stdio = || match streams {
        Streams::Captured => Stdio::piped(),
        Streams::Inherited => Stdio::inherit(),
    };
    cmd.stdin(Stdio::null()).stdout(stdio()).stderr(stdio());

    let mut child = cmd.spawn().map_err(|e| failed(e.to_string()))?;

    // Pipes are drained while waiting so a chatty child cannot block on a full buffer.
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let status = match wait_until(&mut child, timeout) {
        Ok(Some(status)) => status,
        Ok(None) => {
            let _ = child.kill();
            let _ = child.wait();
            collect(stdout);
            collect(stderr);
            return Err(failed(format!(
                "Command timed out after {} seconds",
                timeout.as_secs()
            )));
        }
        Err(e) => return Err(failed(e.to_string())),
    };

    Ok(Output {
        status,
        stdout: collect(stdout),
        stderr: collect(stderr),
    })
}

/// `None` once the deadline passes with the child still running
fn wait_until(child: &mut Child, timeout: Duration) -> std::io::Result<Option<ExitStatus>> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            buf
        })
    })
}

fn collect(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}

/// Program and arguments only; environment may carry credentials.
fn describe(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|part| part.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}
