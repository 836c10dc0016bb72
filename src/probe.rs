use crate::config::BannerConfig;
use std::io;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::time;
use tracing::{debug, warn};

/// Result of a single connect attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Open { banner: Option<String> },
    Closed { diagnostic: String },
}

impl ProbeOutcome {
    pub fn is_open(&self) -> bool {
        matches!(self, ProbeOutcome::Open { .. })
    }
}

/// Connect to `address` within `connect_timeout`, then optionally read a banner.
///
/// Refusal, timeout, resolution and network errors all come back as
/// [`ProbeOutcome::Closed`]. The socket is dropped before returning on every path.
pub async fn probe(address: &str, connect_timeout: Duration, banner: &BannerConfig) -> ProbeOutcome {
    let mut stream = match time::timeout(connect_timeout, TcpStream::connect(address)).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(e)) => {
            if is_resource_exhaustion(&e) {
                warn!(%address, error = %e, "out of sockets while connecting");
            }
            return closed(address, format!("failed to connect to {address}: {e}"));
        }
        Err(_) => {
            return closed(
                address,
                format!("failed to connect to {address}: timed out after {connect_timeout:?}"),
            );
        }
    };

    let banner = if banner.enabled {
        let b = read_banner(&mut stream, banner.timeout, banner.max_bytes).await;
        if b.is_none() {
            debug!(%address, "no banner");
        }
        b
    } else {
        None
    };
    drop(stream);

    debug!(%address, "connection succeeded");
    ProbeOutcome::Open { banner }
}

fn closed(address: &str, diagnostic: String) -> ProbeOutcome {
    debug!(%address, %diagnostic, "port closed");
    ProbeOutcome::Closed { diagnostic }
}

/// Read up to `max_bytes` within `timeout` and convert to lossy UTF-8 with
/// line breaks escaped. Silence, EOF and read errors all give `None`.
async fn read_banner(stream: &mut TcpStream, timeout: Duration, max_bytes: usize) -> Option<String> {
    let mut buf = vec![0u8; max_bytes];
    match time::timeout(timeout, stream.read(&mut buf)).await {
        Ok(Ok(n)) if n > 0 => {
            buf.truncate(n);
            let s = String::from_utf8_lossy(&buf)
                .trim_end_matches(&['\r', '\n'][..])
                .replace('\n', "\\n")
                .replace('\r', "\\r");
            Some(s)
        }
        _ => None,
    }
}

/// EMFILE / ENFILE: the process or system ran out of descriptors.
fn is_resource_exhaustion(e: &io::Error) -> bool {
    matches!(e.raw_os_error(), Some(23) | Some(24)) || e.kind() == io::ErrorKind::OutOfMemory
}
