//! Running R scripts over serialized values.
//!
//! Each run gets a scratch directory. Inputs are written there as
//! uncompressed RDS files, a driver script loads them under their names,
//! evaluates the user script, and saves its value to `output.rds`, which is
//! read back once the interpreter exits successfully.

use std::io::{ErrorKind as IoErrorKind, Read};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use rtable_foundation::{Error, ErrorContext, ErrorKind, Result};
use rtable_rdata::{RValue, read_file, write_file};
use tracing::{debug, info, warn};

use crate::config::ExecutionConfig;

const SCRIPT_FILE: &str = "script.R";
const OUTPUT_FILE: &str = "output.rds";
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How long output is still collected after the interpreter was killed.
const KILL_GRACE: Duration = Duration::from_millis(250);

/// Runs R scripts through an external interpreter.
#[derive(Clone, Debug, Default)]
pub struct RExecutor {
    config: ExecutionConfig,
}

struct Finished {
    status: Option<ExitStatus>,
    stdout: String,
    stderr: String,
}

impl RExecutor {
    /// Creates an executor with the given configuration.
    #[must_use]
    pub const fn new(config: ExecutionConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// Evaluates `script` with each input bound to its name and returns the
    /// value of the script's last expression.
    ///
    /// # Errors
    ///
    /// Returns `ProcessTimeout` if the interpreter outlives the configured
    /// timeout, `ProcessFailed` if it exits unsuccessfully, and I/O or
    /// format errors for the scratch files.
    pub fn execute(&self, script: &str, inputs: &[(String, RValue)]) -> Result<RValue> {
        let dir = tempfile::Builder::new()
            .prefix("rtable-")
            .keep(self.config.keep_temp_files)
            .tempdir()
            .map_err(|e| Error::io(format!("failed to create scratch directory: {e}")))?;
        if self.config.keep_temp_files {
            info!(dir = %dir.path().display(), "keeping scratch directory");
        }

        let mut input_files = Vec::with_capacity(inputs.len());
        for (i, (name, value)) in inputs.iter().enumerate() {
            let file = format!("input_{i}.rds");
            write_file(dir.path().join(&file), value)?;
            input_files.push((name.as_str(), file));
        }
        let script_path = dir.path().join(SCRIPT_FILE);
        std::fs::write(&script_path, driver_script(script, &input_files)).map_err(|e| {
            Error::from(e).with_context(ErrorContext::new().with_source(script_path.display().to_string()))
        })?;

        let finished = self.run(dir.path(), &script_path)?;
        match finished.status {
            None => Err(Error::new(ErrorKind::ProcessTimeout {
                timeout: self.config.timeout,
                stdout: finished.stdout,
                stderr: finished.stderr,
            })),
            Some(status) if !status.success() => Err(Error::new(ErrorKind::ProcessFailed {
                status: status.to_string(),
                stdout: finished.stdout,
                stderr: finished.stderr,
            })),
            Some(_) => {
                if !finished.stderr.is_empty() {
                    debug!(stderr = %finished.stderr, "interpreter wrote to stderr");
                }
                read_file(dir.path().join(OUTPUT_FILE))
            }
        }
    }

    /// Runs the interpreter in `dir`, draining both pipes, until it exits or
    /// the timeout passes. A `None` status means it was killed.
    fn run(&self, dir: &Path, script_path: &Path) -> Result<Finished> {
        let deadline = Instant::now() + self.config.timeout;
        let mut child = Command::new(&self.config.rscript)
            .args(&self.config.args)
            .arg(script_path)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                Error::io(format!(
                    "failed to start {}: {e}",
                    self.config.rscript.display()
                ))
            })?;
        debug!(pid = child.id(), rscript = %self.config.rscript.display(), "started interpreter");

        let stdout = Drain::spawn(child.stdout.take());
        let stderr = Drain::spawn(child.stderr.take());
        let status = wait_until(&mut child, deadline, self.config.timeout)?;

        // Processes the interpreter started may still hold the pipes open.
        let readers_deadline = match status {
            Some(_) => deadline,
            None => Instant::now() + KILL_GRACE,
        };
        Ok(Finished {
            status,
            stdout: stdout.finish(readers_deadline),
            stderr: stderr.finish(readers_deadline),
        })
    }
}

/// A pipe read on its own thread into a shared buffer.
struct Drain {
    buffer: Arc<Mutex<Vec<u8>>>,
    done: Receiver<()>,
}

impl Drain {
    fn spawn<R: Read + Send + 'static>(stream: Option<R>) -> Self {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let (tx, done) = mpsc::channel();
        let shared = Arc::clone(&buffer);
        thread::spawn(move || {
            if let Some(mut stream) = stream {
                let mut chunk = [0u8; 8192];
                loop {
                    match stream.read(&mut chunk) {
                        Ok(0) => break,
                        Ok(n) => shared
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .extend_from_slice(&chunk[..n]),
                        Err(e) if e.kind() == IoErrorKind::Interrupted => {}
                        Err(e) => {
                            warn!("failed to read interpreter output: {e}");
                            break;
                        }
                    }
                }
            }
            let _ = tx.send(());
        });
        Self { buffer, done }
    }

    /// Waits for end of stream until `deadline`, then returns whatever was
    /// read. A reader still blocked after the deadline is abandoned.
    fn finish(self, deadline: Instant) -> String {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if let Err(RecvTimeoutError::Timeout) = self.done.recv_timeout(remaining) {
            warn!("interpreter output still open, abandoning the reader");
        }
        let bytes = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

fn wait_until(child: &mut Child, deadline: Instant, timeout: Duration) -> Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            debug!(%status, "interpreter exited");
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            warn!(timeout_secs = timeout.as_secs_f64(), "interpreter timed out, killing it");
            if let Err(e) = child.kill() {
                warn!("failed to kill interpreter: {e}");
            }
            child.wait()?;
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Quotes text as an R string literal.
fn r_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Quotes a name as a backticked R symbol.
fn r_symbol(name: &str) -> String {
    format!("`{}`", name.replace('\\', "\\\\").replace('`', "\\`"))
}

fn driver_script(script: &str, inputs: &[(&str, String)]) -> String {
    let mut out = String::new();
    for (name, file) in inputs {
        out.push_str(&format!("{} <- readRDS({})\n", r_symbol(name), r_string(file)));
    }
    out.push_str(".rtable_result <- local({\n");
    out.push_str(script);
    out.push_str("\n})\n");
    out.push_str(&format!(
        "saveRDS(.rtable_result, {}, compress = FALSE)\n",
        r_string(OUTPUT_FILE)
    ));
    out
}
