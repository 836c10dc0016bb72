use crate::addr::port_range;
use crate::error::{Result, ScanError};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::warn;

pub const DEFAULT_START_PORT: u16 = 1;
pub const DEFAULT_END_PORT: u16 = 1024;

/// Ports accepted from user input plus the entries that were thrown out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPorts {
    pub ports: Vec<u16>,
    pub rejected: Vec<RejectedPort>,
}

/// A rejected entry and the reason, kept for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedPort {
    pub entry: String,
    pub reason: String,
}

impl ParsedPorts {
    fn push_entry(&mut self, entry: &str, seen: &mut HashSet<u16>) {
        match parse_entry(entry) {
            Ok(ports) => {
                for p in ports {
                    if seen.insert(p) {
                        self.ports.push(p);
                    }
                }
            }
            Err(e) => {
                warn!(%entry, error = %e, "skipping port entry");
                let reason = match e {
                    ScanError::InvalidPort { reason, .. } => reason,
                    other => other.to_string(),
                };
                self.rejected.push(RejectedPort {
                    entry: entry.to_string(),
                    reason,
                });
            }
        }
    }
}

/// Parse a port list such as `22,80 443 8000-8010`.
///
/// Entries are separated by commas or whitespace. Each is a port (1..=65535)
/// or an inclusive `start-end` range. Bad entries are logged and collected
/// in `rejected`; the rest are kept, deduplicated in first-seen order.
pub fn parse_port_spec(s: &str) -> ParsedPorts {
    let mut out = ParsedPorts::default();
    let mut seen = HashSet::new();
    for entry in s
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|e| !e.is_empty())
    {
        out.push_entry(entry, &mut seen);
    }
    out
}

/// Parse ports-file content: one entry per line, `#` starts a comment.
pub fn parse_ports_str(s: &str) -> ParsedPorts {
    let mut out = ParsedPorts::default();
    let mut seen = HashSet::new();
    for raw_line in s.lines() {
        let line = raw_line.split('#').next().map(str::trim).unwrap_or("");
        if line.is_empty() {
            continue;
        }
        out.push_entry(line, &mut seen);
    }
    out
}

/// Load a ports list from a file path. Errors only if the file cannot be read.
pub fn load_ports_from_path(path: impl AsRef<Path>) -> Result<ParsedPorts> {
    let content = fs::read_to_string(path.as_ref())?;
    Ok(parse_ports_str(&content))
}

/// Combine the port sources given on the command line.
///
/// `spec` and `file` are merged in that order, deduplicated. Bad entries in
/// either are logged once by the parser and skipped. With neither source the
/// inclusive range `start..=end` is used, which must be non-empty and start
/// above 0.
pub fn resolve_ports(
    spec: Option<&str>,
    file: Option<&Path>,
    start: u16,
    end: u16,
) -> Result<Vec<u16>> {
    if spec.is_none() && file.is_none() {
        if start == 0 || start > end {
            return Err(ScanError::port(
                format!("{start}-{end}"),
                "start must be between 1 and the end port",
            ));
        }
        return Ok(port_range(start, end));
    }

    let mut ports = spec.map(|s| parse_port_spec(s).ports).unwrap_or_default();
    if let Some(path) = file {
        for p in load_ports_from_path(path)?.ports {
            if !ports.contains(&p) {
                ports.push(p);
            }
        }
    }
    if ports.is_empty() {
        warn!("no valid ports given, nothing to scan");
    }
    Ok(ports)
}

/// The range scanned when no ports are given.
pub fn default_ports() -> Vec<u16> {
    port_range(DEFAULT_START_PORT, DEFAULT_END_PORT)
}

fn parse_entry(entry: &str) -> Result<Vec<u16>> {
    if let Some((a, b)) = entry.split_once('-') {
        let start = parse_port_str(a.trim()).map_err(|r| ScanError::port(entry, r))?;
        let end = parse_port_str(b.trim()).map_err(|r| ScanError::port(entry, r))?;
        if start > end {
            return Err(ScanError::port(entry, format!("range start {start} is after end {end}")));
        }
        return Ok(port_range(start, end));
    }
    let p = parse_port_str(entry).map_err(|r| ScanError::port(entry, r))?;
    Ok(vec![p])
}

fn parse_port_str(s: &str) -> std::result::Result<u16, String> {
    let val: u32 = s.parse::<u32>().map_err(|e| format!("'{s}' is not a port number: {e}"))?;
    if val == 0 || val > 65535 {
        return Err(format!("port out of range: {val}"));
    }
    Ok(val as u16)
}
