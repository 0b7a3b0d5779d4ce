use crate::error::{Error, Result};

/// Dispatch topology a pool runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchPolicy {
    /// One shared nonblocking queue; workers poll it and yield when empty.
    SharedSpin,
    /// One shared blocking queue; workers sleep until notified.
    SharedBlocking,
    /// A private nonblocking queue per worker with random placement and no
    /// stealing.
    PerWorker,
    /// An intake queue relayed by a scheduler thread onto per-worker queues,
    /// with stealing across sibling queues.
    WorkStealing,
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        DispatchPolicy::WorkStealing
    }
}

/// Pool construction parameters.
#[derive(Debug, Clone)]
pub struct Config {
    /// Worker count; `None` means one per hardware thread.
    pub num_threads: Option<usize>,
    /// Which dispatch topology to run.
    pub dispatch: DispatchPolicy,
    /// Seed for the placement RNG; `None` draws one from the OS. Fixing the
    /// seed makes random placement reproducible in tests.
    pub seed: Option<u64>,
    /// Prefix for worker thread names.
    pub thread_name_prefix: String,
    /// Stack size per pool thread; `None` uses the platform default.
    pub stack_size: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            num_threads: None,
            dispatch: DispatchPolicy::default(),
            seed: None,
            thread_name_prefix: "varipool-worker".to_string(),
            stack_size: None,
        }
    }
}

impl Config {
    /// Start building a config.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Check the configuration for nonsense values.
    pub fn validate(&self) -> Result<()> {
        if let Some(n) = self.num_threads {
            if n == 0 {
                return Err(Error::config("num_threads must be > 0"));
            }
            if n > 1024 {
                return Err(Error::config("num_threads too large (max 1024)"));
            }
        }
        if self.thread_name_prefix.is_empty() {
            return Err(Error::config("thread_name_prefix must not be empty"));
        }
        Ok(())
    }

    /// Resolved worker count.
    pub fn worker_threads(&self) -> usize {
        self.num_threads.unwrap_or_else(|| num_cpus::get().max(1))
    }
}

/// Builder for [`Config`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Start from the default configuration.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Set the worker count.
    pub fn num_threads(mut self, n: usize) -> Self {
        self.config.num_threads = Some(n);
        self
    }

    /// Set the dispatch topology.
    pub fn dispatch(mut self, policy: DispatchPolicy) -> Self {
        self.config.dispatch = policy;
        self
    }

    /// Fix the placement RNG seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Set the thread name prefix.
    pub fn thread_name_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.config.thread_name_prefix = prefix.into();
        self
    }

    /// Set the per-thread stack size.
    pub fn stack_size(mut self, size: usize) -> Self {
        self.config.stack_size = Some(size);
        self
    }

    /// Validate and produce the config.
    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_resolves_at_least_one_worker() {
        let config = Config::default();
        assert!(config.worker_threads() >= 1);
    }

    #[test]
    fn zero_threads_is_rejected() {
        let result = Config::builder().num_threads(0).build();
        assert!(result.is_err());
    }

    #[test]
    fn oversized_thread_count_is_rejected() {
        let result = Config::builder().num_threads(4096).build();
        assert!(result.is_err());
    }

    #[test]
    fn builder_sets_all_fields() {
        let config = Config::builder()
            .num_threads(3)
            .dispatch(DispatchPolicy::PerWorker)
            .seed(99)
            .thread_name_prefix("t")
            .stack_size(1 << 20)
            .build()
            .unwrap();

        assert_eq!(config.worker_threads(), 3);
        assert_eq!(config.dispatch, DispatchPolicy::PerWorker);
        assert_eq!(config.seed, Some(99));
        assert_eq!(config.thread_name_prefix, "t");
        assert_eq!(config.stack_size, Some(1 << 20));
    }
}
