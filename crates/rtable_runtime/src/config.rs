//! Configuration for running the R interpreter.

use std::path::PathBuf;
use std::time::Duration;

use rtable_foundation::{Error, ErrorKind, Result};

/// Environment variable naming the interpreter executable.
pub const RSCRIPT_ENV: &str = "RTABLE_RSCRIPT";

/// Environment variable holding the timeout in whole seconds.
pub const TIMEOUT_ENV: &str = "RTABLE_TIMEOUT_SECS";

/// Default time an R script may run.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// How [`crate::RExecutor`] starts and supervises the interpreter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionConfig {
    /// Interpreter executable. The script path is passed as its last argument.
    pub rscript: PathBuf,

    /// Arguments placed before the script path.
    pub args: Vec<String>,

    /// Time after which the interpreter is killed.
    pub timeout: Duration,

    /// Leave the scratch directory in place after the run.
    pub keep_temp_files: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            rscript: PathBuf::from("Rscript"),
            args: vec!["--vanilla".to_owned()],
            timeout: DEFAULT_TIMEOUT,
            keep_temp_files: false,
        }
    }
}

impl ExecutionConfig {
    /// Defaults overridden by `RTABLE_RSCRIPT` and `RTABLE_TIMEOUT_SECS`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the timeout is not a whole number
    /// of seconds.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`ExecutionConfig::from_env`], reading variables through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the timeout is not a whole number
    /// of seconds.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(rscript) = lookup(RSCRIPT_ENV).filter(|s| !s.is_empty()) {
            config.rscript = PathBuf::from(rscript);
        }
        if let Some(secs) = lookup(TIMEOUT_ENV) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                Error::new(ErrorKind::Config(format!(
                    "{TIMEOUT_ENV} must be a whole number of seconds, got \"{secs}\""
                )))
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    /// Builder method to set the interpreter.
    #[must_use]
    pub fn with_rscript(mut self, rscript: impl Into<PathBuf>) -> Self {
        self.rscript = rscript.into();
        self
    }

    /// Builder method to replace the interpreter arguments.
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method to set the timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder method to keep the scratch directory.
    #[must_use]
    pub const fn with_keep_temp_files(mut self, keep: bool) -> Self {
        self.keep_temp_files = keep;
        self
    }
}
