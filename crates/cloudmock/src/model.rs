//! Resource types held by the stores, plus the request bodies that create and
//! update them.
//!
//! Field names follow the provider's wire schema. Timestamps are kept out of
//! the derived serialization (`#[serde(skip)]` or standard RFC 3339) because
//! the provider formats some of them without a zone suffix; the composite
//! views in [`crate::encode`] add them back in the provider's format.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Entry of the flavor lookup table populated by fixtures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Flavor {
    pub id: String,
    pub name: String,
    pub ram: u64,
    pub vcpus: u64,
    pub disk: u64,
    pub ephemeral: u64,
}

/// Copy of a flavor embedded in a server at creation time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlavorSnapshot {
    pub id: String,
    pub name: String,
    pub original_name: String,
    pub ram: u64,
    pub vcpus: u64,
    pub disk: u64,
    pub ephemeral: u64,
}

impl FlavorSnapshot {
    /// Overwrite everything but the id with the given flavor's values.
    pub fn resize_to(&mut self, flavor: &Flavor) {
        self.name = flavor.name.clone();
        self.original_name = flavor.name.clone();
        self.ram = flavor.ram;
        self.vcpus = flavor.vcpus;
        self.disk = flavor.disk;
        self.ephemeral = flavor.ephemeral;
    }
}

impl From<&Flavor> for FlavorSnapshot {
    fn from(flavor: &Flavor) -> Self {
        Self {
            id: flavor.id.clone(),
            name: flavor.name.clone(),
            original_name: flavor.name.clone(),
            ram: flavor.ram,
            vcpus: flavor.vcpus,
            disk: flavor.disk,
            ephemeral: flavor.ephemeral,
        }
    }
}

/// Network address assigned to a server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Address {
    #[serde(rename = "OS-EXT-IPS:type")]
    pub address_type: String,
    pub addr: String,
}

impl Address {
    pub fn fixed(addr: &str) -> Self {
        Self {
            address_type: "fixed".to_string(),
            addr: addr.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityGroupRef {
    #[serde(default)]
    pub name: String,
}

/// A compute instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Server {
    pub id: String,
    pub name: String,
    pub status: String,
    #[serde(serialize_with = "crate::encode::serialize_rfc3339")]
    pub created: DateTime<FixedOffset>,
    #[serde(serialize_with = "crate::encode::serialize_rfc3339")]
    pub updated: DateTime<FixedOffset>,
    pub image: BTreeMap<String, String>,
    pub flavor: FlavorSnapshot,
    pub addresses: BTreeMap<String, Vec<Address>>,
    pub metadata: HashMap<String, String>,
    pub security_groups: Vec<SecurityGroupRef>,
    pub tags: Vec<String>,
    pub key_name: String,
    #[serde(rename = "OS-EXT-AZ:availability_zone")]
    pub availability_zone: String,
    #[serde(skip)]
    pub launched_at: DateTime<FixedOffset>,
}

/// A block-storage volume.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Volume {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: String,
    pub size: u64,
    pub availability_zone: String,
    pub volume_type: String,
    pub snapshot_id: String,
    pub source_volid: String,
    pub bootable: String,
    pub multiattach: bool,
    pub encrypted: bool,
    pub attachments: Vec<serde_json::Value>,
    pub metadata: HashMap<String, String>,
    #[serde(skip)]
    pub created_at: DateTime<FixedOffset>,
    #[serde(skip)]
    pub updated_at: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeType {
    pub id: String,
    pub name: String,
}

impl VolumeType {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Network port known to the port directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Port {
    pub id: String,
    pub name: String,
    pub network_id: String,
    pub device_id: String,
}

// =============================================================================
// Request bodies
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ServerCreateRequest {
    pub server: ServerCreateOpts,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ServerCreateOpts {
    pub name: String,
    #[serde(rename = "imageRef")]
    pub image_ref: String,
    #[serde(rename = "flavorRef")]
    pub flavor_ref: String,
    pub availability_zone: String,
    pub networks: Vec<NetworkRef>,
    pub metadata: HashMap<String, String>,
    pub security_groups: Vec<SecurityGroupRef>,
    pub key_name: String,
    pub tags: Vec<String>,
}

/// Only `port` is used; network uuids and fixed IPs are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NetworkRef {
    pub port: String,
}

#[derive(Debug, Deserialize)]
pub struct ServerUpdateRequest {
    pub server: ServerUpdateOpts,
}

/// The name is replaced wholesale; a request without one blanks it.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ServerUpdateOpts {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct VolumeCreateRequest {
    pub volume: VolumeCreateOpts,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VolumeCreateOpts {
    pub size: u64,
    pub name: String,
    pub description: String,
    pub availability_zone: String,
    pub volume_type: String,
    pub snapshot_id: String,
    pub source_volid: String,
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct VolumeUpdateRequest {
    pub volume: VolumeUpdateOpts,
}

/// Only metadata is honoured; name and description are accepted and dropped.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VolumeUpdateOpts {
    pub metadata: Option<HashMap<String, String>>,
}
