use crate::error::{Result, ScanError};
use ipnet::IpNet;

pub const DEFAULT_TARGET: &str = "localhost";

/// Widest IPv4 network accepted for expansion (65 534 hosts).
pub const MIN_CIDR_PREFIX: u8 = 16;

/// Expand one target argument into host strings.
///
/// Hostnames and IP literals pass through unchanged. An IPv4 CIDR such as
/// `192.168.1.0/30` becomes its host addresses, excluding network and
/// broadcast. IPv6 networks and IPv4 networks wider than
/// [`MIN_CIDR_PREFIX`] are refused.
pub fn expand_target(raw: &str) -> Result<Vec<String>> {
    let t = raw.trim();
    if t.is_empty() {
        return Err(ScanError::target(raw, "empty target"));
    }
    if !t.contains('/') {
        return Ok(vec![t.to_string()]);
    }
    let net = t
        .parse::<IpNet>()
        .map_err(|e| ScanError::target(t, format!("invalid CIDR: {e}")))?;
    match net {
        IpNet::V4(n4) if n4.prefix_len() < MIN_CIDR_PREFIX => Err(ScanError::target(
            t,
            format!("network is wider than /{MIN_CIDR_PREFIX}"),
        )),
        IpNet::V4(n4) => Ok(n4.hosts().map(|ip| ip.to_string()).collect()),
        IpNet::V6(_) => Err(ScanError::target(t, "IPv6 networks are not expanded")),
    }
}

/// Expand every argument, splitting comma-separated lists, keeping order.
pub fn expand_targets<S: AsRef<str>>(raw: &[S]) -> Result<Vec<String>> {
    let mut out = Vec::new();
    for arg in raw {
        for part in arg.as_ref().split(',').filter(|p| !p.trim().is_empty()) {
            out.extend(expand_target(part)?);
        }
    }
    Ok(out)
}
