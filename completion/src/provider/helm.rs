use std::io::{self, Read};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::{ValueTreeProvider, parse_values};
use crate::cancel::CancelToken;
use crate::error::{FetchError, FetchErrorKind};
use crate::value::ValueNode;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Fetches chart defaults by running `helm show values <chart>`.
///
/// The command and its leading arguments are configurable; the chart
/// reference is always passed last.
#[derive(Debug, Clone)]
pub struct HelmProvider {
    pub command: String,
    pub args: Vec<String>,
    pub timeout: Option<Duration>,
}

impl Default for HelmProvider {
    fn default() -> Self {
        HelmProvider {
            command: "helm".to_string(),
            args: vec!["show".to_string(), "values".to_string()],
            timeout: None,
        }
    }
}

impl HelmProvider {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        HelmProvider {
            command: command.into(),
            args,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn run(&self, chart_ref: &str, cancel: &CancelToken) -> Result<String, FetchError> {
        debug!(command = %self.command, args = ?self.args, chart_ref, "running values command");
        let mut child = Command::new(&self.command)
            .args(&self.args)
            .arg(chart_ref)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| {
                FetchError::execution(chart_ref, format!("cannot run `{}`: {}", self.command, err))
            })?;

        // Drain both pipes concurrently so a chatty child never blocks on a full pipe.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let started = Instant::now();
        let status = loop {
            if cancel.is_cancelled() {
                kill(&mut child, chart_ref);
                return Err(FetchError::cancelled(chart_ref));
            }
            if let Some(timeout) = self.timeout {
                if started.elapsed() >= timeout {
                    kill(&mut child, chart_ref);
                    return Err(FetchError::new(
                        FetchErrorKind::TimedOut,
                        chart_ref,
                        format!("no result after {} ms", timeout.as_millis()),
                    ));
                }
            }
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(err) => {
                    kill(&mut child, chart_ref);
                    return Err(FetchError::execution(chart_ref, err.to_string()));
                }
            }
        };

        let stdout = collect(stdout, chart_ref, "stdout")?;
        let stderr = collect(stderr, chart_ref, "stderr")?;
        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr);
            let detail = stderr.trim();
            let message = if detail.is_empty() {
                format!("`{}` exited with {}", self.command, status)
            } else {
                format!("`{}` exited with {}: {}", self.command, status, detail)
            };
            return Err(FetchError::execution(chart_ref, message));
        }
        String::from_utf8(stdout).map_err(|err| {
            FetchError::parse(chart_ref, format!("output is not valid UTF-8: {}", err))
        })
    }
}

impl ValueTreeProvider for HelmProvider {
    fn fetch(&self, chart_ref: &str, cancel: &CancelToken) -> Result<ValueNode, FetchError> {
        let output = self.run(chart_ref, cancel)?;
        parse_values(chart_ref, &output)
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf)?;
        }
        Ok(buf)
    })
}

/// Wait for a drain thread. A failed read is a parse failure: the output
/// cannot be trusted as values.
fn collect(
    handle: thread::JoinHandle<io::Result<Vec<u8>>>,
    chart_ref: &str,
    stream: &str,
) -> Result<Vec<u8>, FetchError> {
    match handle.join() {
        Ok(Ok(bytes)) => Ok(bytes),
        Ok(Err(err)) => Err(FetchError::parse(
            chart_ref,
            format!("cannot read {}: {}", stream, err),
        )),
        Err(_) => Err(FetchError::execution(
            chart_ref,
            format!("{} reader thread panicked", stream),
        )),
    }
}

fn kill(child: &mut Child, chart_ref: &str) {
    if let Err(err) = child.kill() {
        warn!(chart_ref, error = %err, "failed to kill values command");
    }
    let _ = child.wait();
}
