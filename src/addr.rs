use crate::types::ScanTask;

/// Lazily yield one [`ScanTask`] per port, in the order given.
///
/// Ports are not deduplicated here; a repeated port produces a repeated task.
pub fn generate_tasks<'a>(
    host: &'a str,
    ports: &'a [u16],
) -> impl Iterator<Item = ScanTask> + 'a {
    ports.iter().map(move |&port| ScanTask::new(host, port))
}

/// Build the inclusive range `start..=end`, or nothing when `start > end`.
pub fn port_range(start: u16, end: u16) -> Vec<u16> {
    if start > end {
        return Vec::new();
    }
    (start..=end).collect()
}
