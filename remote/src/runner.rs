//! Command execution.
//!
//! [`CommandRunner`] is the seam between the IBM i command builders and the
//! transport. [`ProcessRunner`] runs a local program with the command as its
//! last argument; [`SshRunner`] configures one to run `ssh` (or
//! `sshpass -e ssh`) against the configured host.

use std::io::Read;
use std::process::{Command, Stdio};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{debug, warn};
use wait_timeout::ChildExt;

use crate::config::HostConfig;
use crate::error::{RemoteError, Result};

/// Runs one command and returns its standard output.
pub trait CommandRunner: Send + Sync {
    /// Runs `command` to completion.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::CommandFailed`] when the command exits with a
    /// non-zero status and wrote to stderr, or [`RemoteError::Timeout`] when
    /// it did not finish in time.
    fn run(&self, command: &str) -> Result<String>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, command: &str) -> Result<String> {
        (**self).run(command)
    }
}

/// Runs a local program, passing the command as its final argument.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use svp_dict_remote::{CommandRunner, ProcessRunner};
///
/// let sh = ProcessRunner::new("sh").arg("-c").timeout(Duration::from_secs(5));
/// assert_eq!(sh.run("echo hola").unwrap(), "hola\n");
/// ```
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    program: String,
    args: Vec<String>,
    envs: Vec<(String, String)>,
    timeout: Duration,
}

impl ProcessRunner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
            timeout: Duration::from_millis(crate::config::DEFAULT_TIMEOUT_MS),
        }
    }

    /// Appends a fixed argument placed before the command.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Sets an environment variable for the child.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, command: &str) -> Result<String> {
        debug!(program = %self.program, command, "running command");
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(command)
            .envs(self.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // Drain both pipes on their own threads so a chatty child cannot
        // block on a full pipe buffer before it exits.
        let stdout_thread = child.stdout.take().map(drain);
        let stderr_thread = child.stderr.take().map(drain);

        let status = match child.wait_timeout(self.timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                let timeout_ms = self.timeout.as_millis() as u64;
                warn!(program = %self.program, timeout_ms, "command timed out, killing process");
                let _ = child.kill();
                let _ = child.wait();
                return Err(RemoteError::Timeout { timeout_ms });
            }
            Err(err) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(err.into());
            }
        };

        let stdout = collect(stdout_thread)?;
        let stderr = collect(stderr_thread)?;

        if !status.success() && !stderr.trim().is_empty() {
            return Err(RemoteError::CommandFailed {
                status: status.code().unwrap_or(-1),
                stderr,
            });
        }
        if stdout.is_empty() {
            Ok("\n".to_string())
        } else {
            Ok(stdout)
        }
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<std::io::Result<Vec<u8>>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        pipe.read_to_end(&mut buf)?;
        Ok(buf)
    })
}

fn collect(handle: Option<JoinHandle<std::io::Result<Vec<u8>>>>) -> Result<String> {
    let buf = match handle.map(JoinHandle::join) {
        Some(Ok(result)) => result?,
        Some(Err(_)) => {
            return Err(RemoteError::IoError(std::io::Error::other(
                "output reader thread panicked",
            )));
        }
        None => Vec::new(),
    };
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Runs commands on the remote host through the `ssh` client.
#[derive(Debug, Clone)]
pub struct SshRunner {
    process: ProcessRunner,
}

impl SshRunner {
    /// Builds the `ssh` invocation for `config`.
    ///
    /// Key authentication runs with `BatchMode=yes` so a missing key fails
    /// instead of prompting. With `password_env` the password is read from
    /// that variable and handed to `sshpass -e`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::MissingHost`] or [`RemoteError::MissingUser`]
    /// when the connection is not fully configured, and
    /// [`RemoteError::MissingPassword`] when the password variable is unset.
    pub fn from_config(config: &HostConfig) -> Result<Self> {
        let host = config
            .host
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or(RemoteError::MissingHost)?;
        let user = config
            .user
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or(RemoteError::MissingUser)?;

        let mut process = match &config.password_env {
            Some(var) => {
                let password =
                    std::env::var(var).map_err(|_| RemoteError::MissingPassword(var.clone()))?;
                ProcessRunner::new("sshpass")
                    .arg("-e")
                    .arg("ssh")
                    .env("SSHPASS", password)
            }
            None => ProcessRunner::new("ssh").arg("-o").arg("BatchMode=yes"),
        };

        process = process
            .arg("-o")
            .arg(format!("ConnectTimeout={}", config.timeout_ms.div_ceil(1000).max(1)))
            .arg("-p")
            .arg(config.port.to_string());
        if let Some(key) = &config.key {
            process = process.arg("-i").arg(key.to_string_lossy());
        }
        process = process
            .arg(format!("{user}@{host}"))
            .timeout(Duration::from_millis(config.timeout_ms));

        Ok(Self { process })
    }

    /// The underlying local invocation.
    pub fn process(&self) -> &ProcessRunner {
        &self.process
    }
}

impl CommandRunner for SshRunner {
    fn run(&self, command: &str) -> Result<String> {
        self.process.run(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> HostConfig {
        HostConfig {
            host: Some("as400.example.com".into()),
            user: Some("QPGMR".into()),
            ..HostConfig::default()
        }
    }

    #[test]
    fn test_ssh_requires_host_and_user() {
        let err = SshRunner::from_config(&HostConfig::default()).unwrap_err();
        assert!(matches!(err, RemoteError::MissingHost));

        let config = HostConfig {
            host: Some("as400".into()),
            user: Some("  ".into()),
            ..HostConfig::default()
        };
        assert!(matches!(
            SshRunner::from_config(&config).unwrap_err(),
            RemoteError::MissingUser
        ));
    }

    #[test]
    fn test_ssh_key_invocation() {
        let config = HostConfig {
            key: Some("/keys/id_rsa".into()),
            port: 2222,
            ..host()
        };
        let runner = SshRunner::from_config(&config).unwrap();
        let process = runner.process();
        assert_eq!(process.program(), "ssh");
        assert_eq!(
            process.args(),
            [
                "-o",
                "BatchMode=yes",
                "-o",
                "ConnectTimeout=60",
                "-p",
                "2222",
                "-i",
                "/keys/id_rsa",
                "QPGMR@as400.example.com"
            ]
        );
    }

    #[test]
    fn test_ssh_password_missing_variable() {
        let config = HostConfig {
            password_env: Some("SVP_DICT_TEST_UNSET_PASSWORD_VAR".into()),
            ..host()
        };
        let err = SshRunner::from_config(&config).unwrap_err();
        assert!(matches!(err, RemoteError::MissingPassword(var) if var == "SVP_DICT_TEST_UNSET_PASSWORD_VAR"));
    }

    #[test]
    fn test_ssh_password_uses_sshpass() {
        let config = HostConfig {
            password_env: Some("PATH".into()),
            ..host()
        };
        let runner = SshRunner::from_config(&config).unwrap();
        assert_eq!(runner.process().program(), "sshpass");
        assert_eq!(&runner.process().args()[..2], ["-e", "ssh"]);
        assert!(!runner.process().args().iter().any(|a| a == "BatchMode=yes"));
    }
}
