//! Port registry
//!
//! Answers "is this host port free?" for the wizard. Several probes are
//! combined: the live socket table, ports published by sibling Rocketdoo
//! projects, and ports already claimed earlier in the same wizard run.

mod probe;
mod reservations;

pub use probe::SocketProbe;
pub use reservations::{host_ports, ComposeReservations};

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

/// Lowest port the wizard accepts
pub const MIN_PORT: u16 = 1024;

/// Result of probing one port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortStatus {
    Free,
    InUse,
    /// The probe mechanism itself failed; never treated as free
    Unknown,
}

impl fmt::Display for PortStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortStatus::Free => write!(f, "free"),
            PortStatus::InUse => write!(f, "in use"),
            PortStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// A read-only source of port occupancy
pub trait PortProbe {
    fn probe(&self, port: u16) -> PortStatus;
}

/// Combines probes; the most pessimistic answer wins
pub struct PortRegistry {
    probes: Vec<Box<dyn PortProbe>>,
    claimed: BTreeSet<u16>,
}

impl PortRegistry {
    pub fn new() -> Self {
        Self {
            probes: Vec::new(),
            claimed: BTreeSet::new(),
        }
    }

    /// Live sockets plus ports reserved by neighbouring projects
    pub fn for_project(project_dir: &Path) -> Self {
        Self::new()
            .with_probe(SocketProbe::default())
            .with_probe(ComposeReservations::scan(project_dir))
    }

    pub fn with_probe(mut self, probe: impl PortProbe + 'static) -> Self {
        self.probes.push(Box::new(probe));
        self
    }

    /// Mark a port as taken by an earlier answer of this run
    pub fn claim(&mut self, port: u16) {
        self.claimed.insert(port);
    }

    pub fn status(&self, port: u16) -> PortStatus {
        if self.claimed.contains(&port) {
            return PortStatus::InUse;
        }

        let mut status = PortStatus::Free;
        for probe in &self.probes {
            match probe.probe(port) {
                PortStatus::InUse => return PortStatus::InUse,
                PortStatus::Unknown => status = PortStatus::Unknown,
                PortStatus::Free => {}
            }
        }
        status
    }

    pub fn is_free(&self, port: u16) -> bool {
        self.status(port) == PortStatus::Free
    }

    /// Next port at or above `port` that is reported free
    pub fn suggest(&self, port: u16) -> Option<u16> {
        (port.max(MIN_PORT)..=u16::MAX).find(|p| self.is_free(*p))
    }
}

impl Default for PortRegistry {
    fn default() -> Self {
        Self::new()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::StaticProbe;
    use super::*;

    #[test]
    fn test_free_port_unchanged() {
        let registry = PortRegistry::new().with_probe(StaticProbe::busy(&[8069]));
        assert!(registry.is_free(8888));
        assert_eq!(registry.suggest(8888), Some(8888));
    }

    #[test]
    fn test_suggest_next_free() {
        let registry = PortRegistry::new().with_probe(StaticProbe::busy(&[8069]));
        assert!(!registry.is_free(8069));
        assert_eq!(registry.suggest(8069), Some(8070));
    }

    #[test]
    fn test_suggest_linear_probing() {
        let registry = PortRegistry::new().with_probe(StaticProbe::busy(&[8069, 8070, 8071]));
        let suggested = registry.suggest(8069).unwrap();
        assert_eq!(suggested, 8072);
        assert!(registry.is_free(suggested));
    }

    #[test]
    fn test_unknown_is_not_free() {
        let registry =
            PortRegistry::new().with_probe(StaticProbe::default().with_unknown(&[9000]));
        assert_eq!(registry.status(9000), PortStatus::Unknown);
        assert!(!registry.is_free(9000));
        assert_eq!(registry.suggest(9000), Some(9001));
    }

    #[test]
    fn test_in_use_beats_unknown() {
        let registry = PortRegistry::new()
            .with_probe(StaticProbe::default().with_unknown(&[8069]))
            .with_probe(StaticProbe::busy(&[8069]));
        assert_eq!(registry.status(8069), PortStatus::InUse);
    }

    #[test]
    fn test_claimed_ports_conflict() {
        let mut registry = PortRegistry::new();
        registry.claim(8069);
        assert_eq!(registry.status(8069), PortStatus::InUse);
        assert_eq!(registry.suggest(8069), Some(8070));
    }

    #[test]
    fn test_suggest_exhausted() {
        let registry = PortRegistry::new().with_probe(StaticProbe::busy(&[u16::MAX]));
        assert_eq!(registry.suggest(u16::MAX), None);
    }
}
