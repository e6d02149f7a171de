//! Game server reachability probe.
//!
//! Opens a TCP connection to the configured address and reports whether the
//! server accepted it in time. Refusals and timeouts are results, not errors.

use std::time::{Duration, Instant};
use tokio::{net::TcpStream, time::timeout};
use tracing::{debug, instrument};

/// Outcome of a single probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerStatus {
    /// The server accepted a connection
    Online {
        /// Time taken to connect
        latency: Duration,
    },
    /// The server could not be reached
    Offline {
        /// Why the connection failed
        reason: String,
    },
}

impl ServerStatus {
    /// Whether the server accepted the connection.
    #[must_use]
    pub const fn is_online(&self) -> bool {
        matches!(self, Self::Online { .. })
    }
}

/// Attempts a TCP connection to `address` (`host:port`) within `limit`.
#[instrument]
pub async fn probe(address: &str, limit: Duration) -> ServerStatus {
    let started = Instant::now();
    let status = match timeout(limit, TcpStream::connect(address)).await {
        Ok(Ok(_stream)) => ServerStatus::Online {
            latency: started.elapsed(),
        },
        Ok(Err(e)) => ServerStatus::Offline {
            reason: e.to_string(),
        },
        Err(_) => ServerStatus::Offline {
            reason: format!("no answer within {}ms", limit.as_millis()),
        },
    };
    debug!(?status, "Probe finished");
    status
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_probe_reports_listening_server_online() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();

        let status = probe(&address, Duration::from_secs(2)).await;
        assert!(status.is_online());
    }

    #[tokio::test]
    async fn test_probe_reports_closed_port_offline() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        drop(listener);

        let status = probe(&address, Duration::from_secs(2)).await;
        assert!(matches!(status, ServerStatus::Offline { .. }));
    }

    #[tokio::test]
    async fn test_probe_reports_unresolvable_host_offline() {
        let status = probe("not a host name", Duration::from_secs(2)).await;
        assert!(!status.is_online());
    }
}
