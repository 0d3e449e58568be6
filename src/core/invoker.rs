use crate::core::config::ResolvedClient;
use crate::error::{ProvisionError, Result};
use crate::utils::shell;
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(50);
/// How long output is still collected after a timed out client was killed.
const DRAIN_GRACE: Duration = Duration::from_secs(1);

/// A fully assembled icgc-get invocation.
///
/// Arguments go straight to the executable; no shell sits in between and
/// nothing is escaped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientCommand {
    program: String,
    args: Vec<String>,
}

/// Why a started client did not finish cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WaitFailure {
    Interrupted { message: String },
    TimedOut { timeout: Duration },
}

impl WaitFailure {
    pub fn into_error(self, command: String) -> ProvisionError {
        match self {
            WaitFailure::Interrupted { message } => {
                ProvisionError::ProcessInterrupted { command, message }
            }
            WaitFailure::TimedOut { timeout } => ProvisionError::ProcessTimedOut { command, timeout },
        }
    }
}

/// What one run of the client left behind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandResult {
    /// The wait completed, whatever the exit status. False after an
    /// interrupted wait, a timeout, or a failed stream capture.
    pub exited_cleanly: bool,
    pub failure: Option<WaitFailure>,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandResult {
    /// icgc-get signals failure on stderr; the exit status is not consulted.
    pub fn succeeded(&self) -> bool {
        self.exited_cleanly && self.stderr.is_empty()
    }
}

impl ClientCommand {
    /// `<client> --config <config> download <object-id> --output <staging-dir>`
    ///
    /// An unset object id becomes an empty argument.
    pub fn download(client: &ResolvedClient, object_id: Option<&str>, staging_dir: &Path) -> Self {
        Self {
            program: client.client_path.clone(),
            args: vec![
                "--config".to_string(),
                client.config_path.clone(),
                "download".to_string(),
                object_id.unwrap_or_default().to_string(),
                "--output".to_string(),
                staging_dir.to_string_lossy().to_string(),
            ],
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn command_line(&self) -> String {
        shell::render_command(&self.program, &self.args)
    }

    /// Run the client to completion and capture both output streams.
    ///
    /// Blocks until the process exits, or until `timeout` elapses when one
    /// is given, in which case the client and everything it started are
    /// killed. Only a failure to start the process is an error.
    pub fn run(&self, timeout: Option<Duration>) -> Result<CommandResult> {
        let command_line = self.command_line();
        tracing::info!(command = %command_line, "Running icgc-get");

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // A process group of its own lets a timeout take down wrappers and
        // whatever they forked.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            if timeout.is_some() {
                command.process_group(0);
            }
        }

        let mut child = command.spawn().map_err(|source| {
            tracing::error!(command = %command_line, error = %source, "Could not execute command");
            ProvisionError::ProcessLaunchFailure {
                command: command_line.clone(),
                source,
            }
        })?;

        // Both pipes are drained while the child runs so a chatty client
        // cannot block on a full pipe.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let mut failure = None;
        let exit_code = match wait_child(&mut child, timeout) {
            Ok(status) => status.code(),
            Err(e) => {
                tracing::error!(command = %command_line, failure = ?e, "icgc-get did not finish cleanly");
                failure = Some(e);
                None
            }
        };

        let grace = match failure {
            Some(WaitFailure::TimedOut { .. }) => Some(DRAIN_GRACE),
            _ => None,
        };
        let stdout = collect(stdout, "stdout", grace, &mut failure);
        let stderr = collect(stderr, "stderr", grace, &mut failure);

        if stderr.is_empty() {
            tracing::debug!("icgc-get wrote nothing to stderr");
        } else {
            tracing::warn!(stderr = %stderr, "Error String");
        }
        tracing::info!(stdout = %stdout, exit_code = ?exit_code, "Input String");

        Ok(CommandResult {
            exited_cleanly: failure.is_none(),
            failure,
            exit_code,
            stdout,
            stderr,
        })
    }
}

type Captured = Receiver<std::io::Result<Vec<u8>>>;

fn drain<R>(stream: Option<R>) -> Option<Captured>
where
    R: Read + Send + 'static,
{
    stream.map(|mut stream| {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut buf = Vec::new();
            let read = stream.read_to_end(&mut buf).map(|_| buf);
            // The receiver is gone once the grace period ran out.
            let _ = tx.send(read);
        });
        rx
    })
}

/// Wait for one drained stream. With a `grace` period, give up after it.
fn collect(
    captured: Option<Captured>,
    stream: &str,
    grace: Option<Duration>,
    failure: &mut Option<WaitFailure>,
) -> String {
    let Some(captured) = captured else {
        return String::new();
    };

    let bytes = match grace {
        Some(grace) => captured.recv_timeout(grace).map_err(|e| e.to_string()),
        None => captured.recv().map_err(|e| e.to_string()),
    };

    match bytes {
        Ok(Ok(bytes)) => String::from_utf8_lossy(&bytes).into_owned(),
        Ok(Err(e)) => {
            tracing::error!(stream, error = %e, "Could not read icgc-get output");
            failure.get_or_insert(WaitFailure::Interrupted {
                message: format!("reading {stream}: {e}"),
            });
            String::new()
        }
        Err(e) => {
            tracing::warn!(stream, error = %e, "Gave up on icgc-get output");
            failure.get_or_insert(WaitFailure::Interrupted {
                message: format!("reading {stream}: {e}"),
            });
            String::new()
        }
    }
}

fn wait_child(
    child: &mut Child,
    timeout: Option<Duration>,
) -> std::result::Result<ExitStatus, WaitFailure> {
    let interrupted = |e: std::io::Error| WaitFailure::Interrupted {
        message: e.to_string(),
    };

    let Some(timeout) = timeout else {
        return child.wait().map_err(interrupted);
    };

    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait().map_err(interrupted)? {
            return Ok(status);
        }

        let now = Instant::now();
        if now >= deadline {
            kill_client(child);
            // Reap it so no zombie is left behind.
            let _ = child.wait();
            return Err(WaitFailure::TimedOut { timeout });
        }

        thread::sleep(POLL_INTERVAL.min(deadline - now));
    }
}

fn kill_client(child: &mut Child) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;

        match killpg(Pid::from_raw(child.id() as i32), Signal::SIGKILL) {
            Ok(()) => return,
            Err(e) => tracing::warn!(error = %e, "Could not kill icgc-get process group"),
        }
    }

    if let Err(e) = child.kill() {
        tracing::warn!(error = %e, "Could not kill timed out icgc-get");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn resolved(client: &Path) -> ResolvedClient {
        ResolvedClient {
            client_path: client.to_string_lossy().to_string(),
            config_path: "/etc/icgc-get.yaml".to_string(),
        }
    }

    #[test]
    fn test_download_arguments() {
        let client = ResolvedClient {
            client_path: "/usr/bin/icgc-get".to_string(),
            config_path: "/home/me/.icgc-get/config.yaml".to_string(),
        };

        let command = ClientCommand::download(&client, Some("FI509397"), Path::new("/out/tmp"));

        assert_eq!(command.program(), "/usr/bin/icgc-get");
        assert_eq!(
            command.args(),
            [
                "--config",
                "/home/me/.icgc-get/config.yaml",
                "download",
                "FI509397",
                "--output",
                "/out/tmp"
            ]
        );
        assert_eq!(
            command.command_line(),
            "/usr/bin/icgc-get --config /home/me/.icgc-get/config.yaml download FI509397 --output /out/tmp"
        );
    }

    #[test]
    fn test_download_arguments_without_object_id() {
        let command = ClientCommand::download(&resolved(Path::new("icgc-get")), None, Path::new("tmp"));
        assert_eq!(command.args()[3], "");
    }

    #[test]
    fn test_succeeded_ignores_exit_code() {
        let result = CommandResult {
            exited_cleanly: true,
            failure: None,
            exit_code: Some(2),
            stdout: String::new(),
            stderr: String::new(),
        };
        assert!(result.succeeded());

        let result = CommandResult {
            exit_code: Some(0),
            stderr: "warning".to_string(),
            ..result
        };
        assert!(!result.succeeded());
    }

    #[test]
    fn test_run_missing_client() {
        let dir = tempfile::tempdir().unwrap();
        let command = ClientCommand::download(
            &resolved(&dir.path().join("no-such-client")),
            Some("FI1"),
            dir.path(),
        );

        let err = command.run(None).unwrap_err();
        assert!(matches!(err, ProvisionError::ProcessLaunchFailure { .. }));
    }

    #[cfg(unix)]
    mod process {
        use super::*;
        use crate::test_support::{fake_client, spawn_guard};
        use pretty_assertions::assert_eq;

        fn run_script(body: &str, timeout: Option<Duration>) -> CommandResult {
            let _guard = spawn_guard();
            let dir = tempfile::tempdir().unwrap();
            let client = fake_client(dir.path(), body);
            ClientCommand::download(&resolved(&client), Some("FI509397"), &dir.path().join("tmp"))
                .run(timeout)
                .unwrap()
        }

        #[test]
        fn test_run_passes_arguments() {
            let result = run_script(r#"printf '%s|' "$@""#, None);

            assert!(result.succeeded());
            assert_eq!(result.exit_code, Some(0));
            assert!(result
                .stdout
                .starts_with("--config|/etc/icgc-get.yaml|download|FI509397|--output|"));
        }

        #[test]
        fn test_run_nonzero_exit_with_empty_stderr_succeeds() {
            let result = run_script("echo partial; exit 3", None);

            assert!(result.succeeded());
            assert_eq!(result.exit_code, Some(3));
            assert_eq!(result.stdout, "partial\n");
        }

        #[test]
        fn test_run_stderr_with_zero_exit_fails() {
            let result = run_script("echo 'object not found' >&2; exit 0", None);

            assert!(!result.succeeded());
            assert!(result.exited_cleanly);
            assert_eq!(result.exit_code, Some(0));
            assert_eq!(result.stderr, "object not found\n");
        }

        #[test]
        fn test_run_drains_large_output() {
            let result = run_script(
                "head -c 1048576 /dev/zero | tr '\\0' o\nhead -c 1048576 /dev/zero | tr '\\0' e >&2",
                None,
            );

            assert_eq!(result.stdout.len(), 1_048_576);
            assert_eq!(result.stderr.len(), 1_048_576);
            assert!(!result.succeeded());
        }

        #[test]
        fn test_run_timeout_kills_client() {
            let started = Instant::now();
            let result = run_script("exec sleep 30", Some(Duration::from_millis(200)));

            assert!(started.elapsed() < Duration::from_secs(20));
            assert!(!result.exited_cleanly);
            assert!(!result.succeeded());
            assert_eq!(result.exit_code, None);
            assert_eq!(
                result.failure,
                Some(WaitFailure::TimedOut {
                    timeout: Duration::from_millis(200)
                })
            );
        }

        #[test]
        fn test_run_timeout_kills_forked_children() {
            let started = Instant::now();
            let result = run_script(
                "sleep 30\necho done",
                Some(Duration::from_millis(200)),
            );

            assert!(started.elapsed() < Duration::from_secs(5));
            assert!(!result.succeeded());
            assert_eq!(result.stdout, "");
            assert!(matches!(
                result.failure,
                Some(WaitFailure::TimedOut { .. })
            ));
        }

        #[test]
        fn test_run_timeout_error() {
            let failure = WaitFailure::TimedOut {
                timeout: Duration::from_secs(3),
            };
            let err = failure.into_error("icgc-get download FI1".to_string());
            assert!(matches!(err, ProvisionError::ProcessTimedOut { timeout, .. } if timeout == Duration::from_secs(3)));
        }

        #[test]
        fn test_run_within_timeout() {
            let result = run_script("exit 0", Some(Duration::from_secs(30)));
            assert!(result.succeeded());
        }
    }
}
