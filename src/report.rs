use crate::error::Result;
use crate::types::ScanResult;
use std::fmt::Write as _;
use std::fs::File;
use std::path::Path;
use time::{format_description::well_known, OffsetDateTime};

const BANNER_SNIPPET: usize = 60;

/// Pretty JSON array, one record per target.
pub fn render_json(results: &[ScanResult]) -> Result<String> {
    Ok(serde_json::to_string_pretty(results)?)
}

/// Human-readable per-target blocks followed by a completion line.
pub fn render_text(results: &[ScanResult], started_at: OffsetDateTime) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Scan started at {}", rfc3339(started_at));
    for r in results {
        let _ = writeln!(out);
        let _ = writeln!(out, "Target: {}", r.target);
        if r.open_ports.is_empty() {
            let _ = writeln!(out, "  Open ports: none");
        } else {
            let _ = writeln!(out, "  Open ports:");
            for addr in &r.open_ports {
                match r.banners.get(addr) {
                    Some(b) => {
                        let _ = writeln!(out, "    {addr}  {}", snippet(b));
                    }
                    None => {
                        let _ = writeln!(out, "    {addr}");
                    }
                }
            }
        }
        let _ = writeln!(out, "  Open port count: {}", r.port_count);
        let _ = writeln!(out, "  Time taken: {}", r.time_taken());
        let _ = writeln!(out, "  Total ports scanned: {}", r.total_ports);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "All scans complete!");
    out
}

/// Write the JSON form to `path`.
pub fn write_results_json(path: &Path, results: &[ScanResult]) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, results)?;
    Ok(())
}

fn snippet(banner: &str) -> String {
    banner.chars().take(BANNER_SNIPPET).collect()
}

fn rfc3339(t: OffsetDateTime) -> String {
    t.format(&well_known::Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}
