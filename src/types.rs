use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use tracing::warn;

/// One `host:port` connection target. IPv6 literals are bracketed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScanTask(String);

impl ScanTask {
    pub fn new(host: &str, port: u16) -> Self {
        if host.contains(':') && !host.starts_with('[') {
            Self(format!("[{host}]:{port}"))
        } else {
            Self(format!("{host}:{port}"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ScanTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Completion counter for one target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressState {
    pub completed: u64,
    pub total: u64,
}

impl ProgressState {
    pub fn new(total: u64) -> Self {
        Self { completed: 0, total }
    }

    /// Count one processed task and return the new percentage.
    ///
    /// Each task must be counted exactly once. An extra call panics in debug
    /// builds; release builds log it and stay at `total`.
    pub fn record_completion(&mut self) -> f64 {
        debug_assert!(
            self.completed < self.total,
            "completion recorded past total ({}/{})",
            self.completed,
            self.total
        );
        if self.completed < self.total {
            self.completed += 1;
        } else {
            warn!(total = self.total, "completion recorded past total");
        }
        self.percent()
    }

    /// An empty scan counts as fully done.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        self.completed as f64 / self.total as f64 * 100.0
    }

    pub fn is_done(&self) -> bool {
        self.completed == self.total
    }
}

/// Per-target outcome. Serializes to the structured output record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanResult {
    pub target: String,
    pub open_ports: Vec<String>,
    pub port_count: usize,
    #[serde(rename = "time_taken", serialize_with = "serialize_elapsed")]
    pub elapsed: Duration,
    pub total_ports: usize,
    #[serde(rename = "progress")]
    pub progress_percent: f64,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub banners: BTreeMap<String, String>,
}

impl ScanResult {
    pub fn new(target: impl Into<String>, total_ports: usize) -> Self {
        Self {
            target: target.into(),
            open_ports: Vec::new(),
            port_count: 0,
            elapsed: Duration::ZERO,
            total_ports,
            progress_percent: 0.0,
            banners: BTreeMap::new(),
        }
    }

    pub fn push_open(&mut self, address: String, banner: Option<String>) {
        if let Some(b) = banner {
            self.banners.insert(address.clone(), b);
        }
        self.open_ports.push(address);
        self.port_count = self.open_ports.len();
    }

    pub fn time_taken(&self) -> String {
        format_elapsed(self.elapsed)
    }
}

/// Human-readable duration, e.g. `1.503s` or `250ms`.
pub fn format_elapsed(d: Duration) -> String {
    format!("{d:?}")
}

fn serialize_elapsed<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format_elapsed(*d))
}

/// All finalized per-target results, in completion order.
pub type ResultSet = Vec<ScanResult>;
