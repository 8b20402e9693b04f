//! Fixture configuration for the emulator.
//!
//! A fixture document seeds the read-only lookup tables and the scripted mock
//! bundles before any request is served. YAML is the primary format; since
//! YAML is a superset of JSON, JSON documents load as well.
//!
//! ```yaml
//! flavors:
//!   - { id: f-1, name: m1.small, ram: 2048, vcpus: 1, disk: 20 }
//! ports:
//!   - { id: p-1, name: node-1, network_id: net-1 }
//! volume_types:
//!   - { id: fast, name: fast }
//! servers:
//!   create:
//!     - { created: 2024-01-01T00:00:00Z, updated: 2024-01-01T00:00:00Z, launched_at: 2024-01-01T00:00:01Z }
//!   update: []
//! volumes:
//!   create:
//!     - { created_at: 2024-01-01T00:00:00Z, updated_at: 2024-01-01T00:00:00Z }
//! ```

use crate::mocks::{
    ExtraMocks, ServerCreateMocks, ServerUpdateMocks, VolumeCreateMocks, VolumeUpdateMocks,
};
use crate::model::{Flavor, Port, VolumeType};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Fixtures {
    pub flavors: Vec<Flavor>,
    pub ports: Vec<Port>,
    pub volume_types: Vec<VolumeType>,
    pub servers: ExtraMocks<ServerCreateMocks, ServerUpdateMocks>,
    pub volumes: ExtraMocks<VolumeCreateMocks, VolumeUpdateMocks>,
}

impl Fixtures {
    /// Load fixtures from a YAML or JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, anyhow::Error> {
        let fixtures: Fixtures = serde_yaml::from_str(contents)?;
        fixtures.validate()?;
        Ok(fixtures)
    }

    /// Reject documents that would silently shadow their own entries.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        ensure_unique("flavor", self.flavors.iter().map(|f| f.id.as_str()))?;
        ensure_unique("port", self.ports.iter().map(|p| p.id.as_str()))?;
        ensure_unique("volume type", self.volume_types.iter().map(|t| t.id.as_str()))?;
        Ok(())
    }
}

fn ensure_unique<'a>(
    what: &str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), anyhow::Error> {
    let mut seen = HashSet::new();
    for id in ids {
        if id.is_empty() {
            anyhow::bail!("{what} entry without an id");
        }
        if !seen.insert(id) {
            anyhow::bail!("duplicate {what} id '{id}'");
        }
    }
    Ok(())
}
