//! Live socket probe

use std::io::ErrorKind;
use std::net::{Ipv4Addr, SocketAddr, TcpListener, TcpStream};
use std::time::Duration;

use super::{PortProbe, PortStatus};

/// Checks the host's socket table by connecting and then binding.
///
/// A listener on loopback answers the connect; a port published on all
/// interfaces (e.g. by Docker) makes the bind fail with `AddrInUse`. Any
/// other bind failure means we cannot tell.
#[derive(Debug, Clone)]
pub struct SocketProbe {
    connect_timeout: Duration,
}

impl Default for SocketProbe {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_millis(200),
        }
    }
}

impl PortProbe for SocketProbe {
    fn probe(&self, port: u16) -> PortStatus {
        let loopback = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
        if TcpStream::connect_timeout(&loopback, self.connect_timeout).is_ok() {
            return PortStatus::InUse;
        }

        match TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)) {
            Ok(_) => PortStatus::Free,
            Err(e) if e.kind() == ErrorKind::AddrInUse => PortStatus::InUse,
            Err(e) => {
                tracing::debug!(port, error = %e, "port probe unavailable");
                PortStatus::Unknown
            }
        }
    }
}
