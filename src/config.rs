use crate::error::{Result, ScanError};
use std::time::Duration;

pub const DEFAULT_WORKERS: usize = 100;
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
pub const DEFAULT_BANNER_TIMEOUT: Duration = Duration::from_secs(2);
pub const DEFAULT_BANNER_BYTES: usize = 1024;

/// Best-effort banner read performed after a successful connect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannerConfig {
    pub enabled: bool,
    pub timeout: Duration,
    pub max_bytes: usize,
}

impl Default for BannerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout: DEFAULT_BANNER_TIMEOUT,
            max_bytes: DEFAULT_BANNER_BYTES,
        }
    }
}

impl BannerConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

/// Settings shared by every per-target scan of one invocation.
///
/// `workers` sizes each target's pool independently, so up to
/// `targets * workers` connects can be in flight at once. Set `max_in_flight`
/// to put a process-wide ceiling on that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    pub workers: usize,
    pub connect_timeout: Duration,
    pub banner: BannerConfig,
    pub max_in_flight: Option<usize>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            banner: BannerConfig::default(),
            max_in_flight: None,
        }
    }
}

impl ScanConfig {
    pub fn new(workers: usize, connect_timeout: Duration) -> Self {
        Self {
            workers,
            connect_timeout,
            ..Self::default()
        }
    }

    pub fn with_banner(mut self, banner: BannerConfig) -> Self {
        self.banner = banner;
        self
    }

    pub fn with_max_in_flight(mut self, limit: Option<usize>) -> Self {
        self.max_in_flight = limit;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(ScanError::config("worker count must be at least 1"));
        }
        if self.connect_timeout.is_zero() {
            return Err(ScanError::config("connect timeout must be greater than zero"));
        }
        if self.banner.enabled && self.banner.max_bytes == 0 {
            return Err(ScanError::config("banner buffer size must be greater than zero"));
        }
        if self.max_in_flight == Some(0) {
            return Err(ScanError::config("max in-flight connections must be at least 1"));
        }
        Ok(())
    }
}
