//! Ports reserved by other projects' compose files
//!
//! A stopped neighbouring project does not hold its sockets, but starting it
//! later would collide. We scan sibling directories for compose files and
//! collect their published host ports.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_yaml::Value;

use super::{PortProbe, PortStatus};

const COMPOSE_NAMES: &[&str] = &["docker-compose.yaml", "docker-compose.yml"];

/// Host ports published by sibling projects, keyed by port
#[derive(Debug, Default, Clone)]
pub struct ComposeReservations {
    reserved: BTreeMap<u16, String>,
}

impl ComposeReservations {
    /// Scan the siblings of `project_dir`; unreadable files are skipped
    pub fn scan(project_dir: &Path) -> Self {
        let mut reservations = Self::default();

        let own = project_dir.canonicalize().unwrap_or_else(|_| project_dir.to_path_buf());
        let Some(parent) = own.parent() else {
            return reservations;
        };
        let Ok(entries) = fs::read_dir(parent) else {
            return reservations;
        };

        for entry in entries.flatten() {
            let dir = entry.path();
            if !dir.is_dir() || dir == own {
                continue;
            }
            for name in COMPOSE_NAMES {
                let file = dir.join(name);
                if file.is_file() {
                    reservations.load_file(&file);
                }
            }
        }

        reservations
    }

    fn load_file(&mut self, file: &Path) {
        let project = file
            .parent()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let parsed = fs::read_to_string(file)
            .ok()
            .and_then(|text| serde_yaml::from_str::<Value>(&text).ok());
        if let Some(doc) = parsed {
            for port in host_ports(&doc) {
                self.reserved.entry(port).or_insert_with(|| project.clone());
            }
        }
    }

    /// Project that reserves `port`, if any
    pub fn owner(&self, port: u16) -> Option<&str> {
        self.reserved.get(&port).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.reserved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reserved.is_empty()
    }
}

impl PortProbe for ComposeReservations {
    fn probe(&self, port: u16) -> PortStatus {
        match self.owner(port) {
            Some(project) => {
                tracing::debug!(port, project, "port reserved by another project");
                PortStatus::InUse
            }
            None => PortStatus::Free,
        }
    }
}

/// Published host ports of every service in a compose document
pub fn host_ports(doc: &Value) -> Vec<u16> {
    let Some(services) = doc.get("services").and_then(Value::as_mapping) else {
        return Vec::new();
    };

    let mut ports = Vec::new();
    for service in services.values() {
        let Some(list) = service.get("ports").and_then(Value::as_sequence) else {
            continue;
        };
        for mapping in list {
            let host = match mapping {
                Value::String(s) => parse_short_mapping(s),
                Value::Mapping(_) => mapping.get("published").and_then(|p| match p {
                    Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
                    Value::String(s) => s.parse().ok(),
                    _ => None,
                }),
                _ => None,
            };
            if let Some(port) = host {
                ports.push(port);
            }
        }
    }
    ports
}

/// `"8069:8069"`, `"127.0.0.1:8069:8069/tcp"` -> 8069; a bare container port has no host side
fn parse_short_mapping(mapping: &str) -> Option<u16> {
    let without_proto = mapping.split('/').next().unwrap_or(mapping);
    let parts: Vec<&str> = without_proto.split(':').collect();
    if parts.len() < 2 {
        return None;
    }
    parts[parts.len() - 2].trim().parse().ok()
}
