//! Provider wire encoding.
//!
//! Stored resources serialize their plain fields directly; the views here add
//! the timestamps that the provider renders without a zone suffix
//! (`2006-01-02T15:04:05`), and wrap results in the `{"volume": {...}}` /
//! `{"volumes": [...]}` envelopes.

use crate::error::{FatalError, ResourceKind};
use crate::model::{Server, Volume, VolumeType};
use bytes::Bytes;
use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::{Serialize, Serializer};

/// Timestamp layout used by the provider for "extended" fields.
pub const NO_ZONE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Serialize a timestamp as its wall-clock time in the offset it was supplied
/// with, without zone suffix or fractional seconds.
pub fn serialize_no_zone<S: Serializer>(
    timestamp: &DateTime<FixedOffset>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&timestamp.format(NO_ZONE_FORMAT))
}

/// RFC 3339 keeping the supplied offset; a zero offset is written as `Z`.
pub fn serialize_rfc3339<S: Serializer>(
    timestamp: &DateTime<FixedOffset>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

/// Server plus the fields the provider reports in its own format.
#[derive(Debug, Serialize)]
pub struct ServerView<'a> {
    #[serde(flatten)]
    pub server: &'a Server,
    #[serde(rename = "OS-SRV-USG:launched_at", serialize_with = "serialize_no_zone")]
    pub launched_at: DateTime<FixedOffset>,
}

impl<'a> From<&'a Server> for ServerView<'a> {
    fn from(server: &'a Server) -> Self {
        Self {
            server,
            launched_at: server.launched_at,
        }
    }
}

/// Volume plus its zone-less creation and update timestamps.
#[derive(Debug, Serialize)]
pub struct VolumeView<'a> {
    #[serde(flatten)]
    pub volume: &'a Volume,
    #[serde(serialize_with = "serialize_no_zone")]
    pub created_at: DateTime<FixedOffset>,
    #[serde(serialize_with = "serialize_no_zone")]
    pub updated_at: DateTime<FixedOffset>,
}

impl<'a> From<&'a Volume> for VolumeView<'a> {
    fn from(volume: &'a Volume) -> Self {
        Self {
            volume,
            created_at: volume.created_at,
            updated_at: volume.updated_at,
        }
    }
}

/// Resources that know their kind and how to present themselves on the wire.
pub trait WireResource {
    const KIND: ResourceKind;
    type View<'a>: Serialize
    where
        Self: 'a;

    fn view(&self) -> Self::View<'_>;
}

impl WireResource for Server {
    const KIND: ResourceKind = ResourceKind::Server;
    type View<'a> = ServerView<'a>;

    fn view(&self) -> ServerView<'_> {
        ServerView::from(self)
    }
}

impl WireResource for Volume {
    const KIND: ResourceKind = ResourceKind::Volume;
    type View<'a> = VolumeView<'a>;

    fn view(&self) -> VolumeView<'_> {
        VolumeView::from(self)
    }
}

impl WireResource for VolumeType {
    const KIND: ResourceKind = ResourceKind::VolumeType;
    type View<'a> = &'a VolumeType;

    fn view(&self) -> &VolumeType {
        self
    }
}

fn to_bytes(kind: ResourceKind, value: &serde_json::Value) -> Result<Bytes, FatalError> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(|source| FatalError::Encode { kind, source })
}

/// Encode `{"<kind>": {...}}`.
pub fn encode_one<R: WireResource>(resource: &R) -> Result<Bytes, FatalError> {
    let view = serde_json::to_value(resource.view())
        .map_err(|source| FatalError::Encode { kind: R::KIND, source })?;
    let mut envelope = serde_json::Map::new();
    envelope.insert(R::KIND.singular_key().to_string(), view);
    to_bytes(R::KIND, &serde_json::Value::Object(envelope))
}

/// Encode `{"<kind>s": [...]}`.
pub fn encode_many<'r, R: WireResource + 'r>(
    resources: impl IntoIterator<Item = &'r R>,
) -> Result<Bytes, FatalError> {
    let views = resources
        .into_iter()
        .map(|resource| serde_json::to_value(resource.view()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| FatalError::Encode { kind: R::KIND, source })?;
    let mut envelope = serde_json::Map::new();
    envelope.insert(
        R::KIND.plural_key().to_string(),
        serde_json::Value::Array(views),
    );
    to_bytes(R::KIND, &serde_json::Value::Object(envelope))
}
