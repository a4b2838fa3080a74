/// ## Engine limits and policy
///
/// ```
/// use basic::mach::Config;
/// let config = Config::default().with_max_gosub_depth(64).with_strict_variables(true);
/// assert_eq!(config.max_gosub_depth, 64);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub max_for_depth: usize,
    pub max_gosub_depth: usize,
    /// How often one backward GOTO edge may abandon active loops before
    /// the run is stopped as a FOR/NEXT deadlock.
    pub deadlock_threshold: usize,
    /// Statements or instructions executed between cancellation polls.
    pub cancel_interval: usize,
    pub strict_variables: bool,
    /// Run the line interpreter when the program can't be compiled.
    pub compile_fallback: bool,
    pub output_capacity: usize,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            max_for_depth: 1000,
            max_gosub_depth: 1000,
            deadlock_threshold: 1_000_000,
            cancel_interval: 1024,
            strict_variables: false,
            compile_fallback: true,
            output_capacity: 1024,
        }
    }
}

impl Config {
    pub fn with_max_for_depth(mut self, depth: usize) -> Config {
        self.max_for_depth = depth;
        self
    }

    pub fn with_max_gosub_depth(mut self, depth: usize) -> Config {
        self.max_gosub_depth = depth;
        self
    }

    pub fn with_deadlock_threshold(mut self, threshold: usize) -> Config {
        self.deadlock_threshold = threshold;
        self
    }

    pub fn with_cancel_interval(mut self, interval: usize) -> Config {
        self.cancel_interval = interval.max(1);
        self
    }

    pub fn with_strict_variables(mut self, strict: bool) -> Config {
        self.strict_variables = strict;
        self
    }

    pub fn with_compile_fallback(mut self, fallback: bool) -> Config {
        self.compile_fallback = fallback;
        self
    }

    pub fn with_output_capacity(mut self, capacity: usize) -> Config {
        self.output_capacity = capacity;
        self
    }

    pub(crate) fn poll_every(&self) -> usize {
        self.cancel_interval.max(1)
    }
}
