//! Executor configuration.
//!
//! Controls parallelism, partial-failure tolerance, retry behavior, and
//! per-node timeouts.

use serde::{Deserialize, Serialize};

/// Configuration for the adaptive executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Maximum number of nodes running concurrently within a wave.
    ///
    /// Default: number of logical CPUs.
    #[serde(default = "default_max_parallelism")]
    pub max_parallelism: usize,

    /// Tolerate node failures: record error markers, keep independent
    /// branches running, and return the partial result instead of an
    /// `Execution` error.
    ///
    /// Default: false (all-or-nothing).
    #[serde(default)]
    pub allow_partial: bool,

    /// Maximum number of retry attempts for failed nodes.
    ///
    /// 0 means no retries, nodes fail immediately.
    ///
    /// Default: 0
    #[serde(default)]
    pub max_retries: u32,

    /// Initial backoff delay in milliseconds for retries.
    ///
    /// The actual delay grows exponentially: initial_delay * 2^attempt
    ///
    /// Default: 250ms
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Maximum backoff delay in milliseconds.
    ///
    /// Caps the exponential growth of retry delays.
    ///
    /// Default: 30000ms (30 seconds)
    #[serde(default = "default_retry_backoff_max_ms")]
    pub retry_backoff_max_ms: u64,

    /// Per-node execution timeout in milliseconds.
    ///
    /// 0 means no timeout.
    ///
    /// Default: 0 (unlimited)
    #[serde(default)]
    pub node_timeout_ms: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_parallelism: default_max_parallelism(),
            allow_partial: false,
            max_retries: 0,
            retry_backoff_ms: default_retry_backoff_ms(),
            retry_backoff_max_ms: default_retry_backoff_max_ms(),
            node_timeout_ms: 0,
        }
    }
}

impl ExecutorConfig {
    /// Create a new executor configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum intra-wave parallelism.
    pub fn with_max_parallelism(mut self, max_parallelism: usize) -> Self {
        self.max_parallelism = max_parallelism;
        self
    }

    /// Opt into partial-result tolerance.
    pub fn with_allow_partial(mut self, allow_partial: bool) -> Self {
        self.allow_partial = allow_partial;
        self
    }

    /// Set the maximum retry attempts.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the retry backoff parameters.
    pub fn with_retry_backoff(mut self, initial_ms: u64, max_ms: u64) -> Self {
        self.retry_backoff_ms = initial_ms;
        self.retry_backoff_max_ms = max_ms;
        self
    }

    /// Set the per-node timeout.
    pub fn with_node_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.node_timeout_ms = timeout_ms;
        self
    }

    /// Validate the configuration.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_parallelism == 0 {
            return Err("max_parallelism must be > 0".to_string());
        }

        if self.retry_backoff_ms == 0 {
            return Err("retry_backoff_ms must be > 0".to_string());
        }

        if self.retry_backoff_max_ms < self.retry_backoff_ms {
            return Err("retry_backoff_max_ms must be >= retry_backoff_ms".to_string());
        }

        Ok(())
    }
}

// Default functions for serde
fn default_max_parallelism() -> usize {
    num_cpus::get().max(1)
}

fn default_retry_backoff_ms() -> u64 {
    250
}

fn default_retry_backoff_max_ms() -> u64 {
    30_000
}
