//! Time-limited process execution.

use super::ProbeResult;
use std::io::Read;
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

const READ_CHUNK: usize = 4096;

/// Output read from the child's stdout or stderr.
enum Chunk {
    Data(Vec<u8>),
    Closed,
}

/// Run `command` (program followed by arguments) and wait at most `timeout`.
///
/// Stdout and stderr are read on detached threads that forward chunks over
/// one channel, so the combined output keeps the order in which the two
/// streams produced it. On success the combined output is trimmed.
///
/// The whole call, including draining the pipes, is bounded by `timeout`:
/// a child that outlives it is killed, and a descendant still holding a
/// pipe after the child exits is abandoned. Spawn errors, timeouts and
/// non-zero exits all map to [`ProbeResult::Failure`] with code 1.
pub fn run_with_timeout(command: &[String], timeout: Duration) -> ProbeResult {
    let Some((program, args)) = command.split_first() else {
        return ProbeResult::failure(1, "empty command");
    };

    let mut child = match Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => return ProbeResult::failure(1, format!("{program}: {e}")),
    };

    let (tx, rx) = mpsc::channel();
    let mut open_streams = 0;
    if let Some(stdout) = child.stdout.take() {
        drain(stdout, tx.clone());
        open_streams += 1;
    }
    if let Some(stderr) = child.stderr.take() {
        drain(stderr, tx.clone());
        open_streams += 1;
    }
    drop(tx);

    let start = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if start.elapsed() >= timeout => {
                let _ = child.kill();
                let _ = child.wait();
                tracing::warn!(program = %program, ?timeout, "probe timed out");
                return timed_out(command, timeout);
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                let _ = child.kill();
                return ProbeResult::failure(1, format!("wait for {program} failed: {e}"));
            }
        }
    };

    let mut combined = Vec::new();
    while open_streams > 0 {
        match rx.recv_timeout(timeout.saturating_sub(start.elapsed())) {
            Ok(Chunk::Data(bytes)) => combined.extend_from_slice(&bytes),
            Ok(Chunk::Closed) => open_streams -= 1,
            Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!(program = %program, ?timeout, "output still open after exit");
                return timed_out(command, timeout);
            }
        }
    }
    let combined = String::from_utf8_lossy(&combined).trim().to_string();

    if status.success() {
        return ProbeResult::Success(combined);
    }
    let code = status.code();
    tracing::debug!(program = %program, ?code, "probe exited non-zero");
    let output = if combined.is_empty() {
        match code {
            Some(code) => format!("command '{}' exited with status {code}", command.join(" ")),
            None => format!("command '{}' was terminated by a signal", command.join(" ")),
        }
    } else {
        combined
    };
    ProbeResult::failure(1, output)
}

fn timed_out(command: &[String], timeout: Duration) -> ProbeResult {
    ProbeResult::failure(
        1,
        format!(
            "command '{}' timed out after {:.1}s",
            command.join(" "),
            timeout.as_secs_f64()
        ),
    )
}

/// Forward everything `reader` yields to `tx`, then a final [`Chunk::Closed`].
fn drain<R: Read + Send + 'static>(mut reader: R, tx: Sender<Chunk>) {
    thread::spawn(move || {
        let mut buf = [0u8; READ_CHUNK];
        loop {
            match reader.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    if tx.send(Chunk::Data(buf[..n].to_vec())).is_err() {
                        return;
                    }
                }
            }
        }
        let _ = tx.send(Chunk::Closed);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".to_string(), "-c".to_string(), script.to_string()]
    }

    #[test]
    fn empty_command_fails() {
        let result = run_with_timeout(&[], Duration::from_secs(1));
        assert_eq!(result, ProbeResult::failure(1, "empty command"));
    }

    #[test]
    fn missing_binary_fails_with_code_one() {
        let result = run_with_timeout(
            &["readyaudit-no-such-binary".to_string()],
            Duration::from_secs(1),
        );
        assert_eq!(result.code(), 1);
        assert!(result.output().contains("readyaudit-no-such-binary"));
    }

    #[cfg(unix)]
    #[test]
    fn success_output_is_trimmed() {
        let result = run_with_timeout(&sh("echo '  hello  '"), Duration::from_secs(5));
        assert_eq!(result, ProbeResult::Success("hello".to_string()));
    }

    #[cfg(unix)]
    #[test]
    fn stderr_is_included() {
        let result = run_with_timeout(&sh("echo out; echo err >&2"), Duration::from_secs(5));
        assert!(result.output().contains("out"));
        assert!(result.output().contains("err"));
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_code_one_with_output() {
        let result = run_with_timeout(&sh("echo broken; exit 3"), Duration::from_secs(5));
        assert_eq!(result, ProbeResult::failure(1, "broken"));
    }

    #[cfg(unix)]
    #[test]
    fn silent_failure_describes_exit() {
        let result = run_with_timeout(&sh("exit 4"), Duration::from_secs(5));
        assert_eq!(result.code(), 1);
        assert!(result.output().contains("exited with status 4"));
    }

    #[cfg(unix)]
    #[test]
    fn streams_keep_production_order() {
        let result = run_with_timeout(
            &sh("echo 'warning: stale config' >&2; sleep 0.2; echo 'v1.2.3'"),
            Duration::from_secs(5),
        );
        assert_eq!(result.first_line(), Some("warning: stale config"));
        assert!(result.output().ends_with("v1.2.3"));
    }

    #[cfg(unix)]
    #[test]
    fn timeout_kills_and_fails() {
        let start = Instant::now();
        let result = run_with_timeout(&sh("exec sleep 5"), Duration::from_millis(200));
        assert!(start.elapsed() < Duration::from_secs(4));
        assert!(!result.is_success());
        assert!(result.output().contains("timed out"));
    }

    #[cfg(unix)]
    #[test]
    fn background_descendant_holding_pipe_is_bounded() {
        let start = Instant::now();
        let result = run_with_timeout(&sh("sleep 6 & echo hi"), Duration::from_millis(500));
        assert!(start.elapsed() < Duration::from_secs(3));
        assert_eq!(result.code(), 1);
        assert!(result.output().contains("timed out"));
    }
}
