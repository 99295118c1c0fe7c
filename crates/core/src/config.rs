use std::time::Duration;

pub const DEFAULT_DEBOUNCE_MS: u64 = 200;

/// Options for opening a [`ProjectResolver`](crate::resolver::ProjectResolver).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Keep references up to date by watching the manifest.
    pub watch: bool,
    /// Quiet period used to coalesce bursts of change events.
    pub debounce: Duration,
}

impl ResolverOptions {
    pub fn watching() -> Self {
        Self {
            watch: true,
            ..Self::default()
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

impl Default for ResolverOptions {
    /// Reads the debounce interval from `REFSCOPE_DEBOUNCE_MS` when set.
    fn default() -> Self {
        let debounce_ms = std::env::var("REFSCOPE_DEBOUNCE_MS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_DEBOUNCE_MS);

        Self {
            watch: false,
            debounce: Duration::from_millis(debounce_ms),
        }
    }
}
