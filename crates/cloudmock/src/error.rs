//! Error types for the emulator.
//!
//! Recoverable outcomes (unknown identifier, unsupported method) never show up
//! here: handlers turn them into a status code where they are detected. A
//! [`FatalError`] means the test harness or the client library is broken, and
//! the HTTP layer aborts the process when it sees one.

use std::fmt;
use thiserror::Error;

/// Resource kinds served by the emulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Server,
    Volume,
    VolumeType,
}

impl ResourceKind {
    /// Key wrapping a single resource in a response envelope.
    pub fn singular_key(self) -> &'static str {
        match self {
            ResourceKind::Server => "server",
            ResourceKind::Volume => "volume",
            ResourceKind::VolumeType => "volume_type",
        }
    }

    /// Key wrapping a collection in a response envelope.
    pub fn plural_key(self) -> &'static str {
        match self {
            ResourceKind::Server => "servers",
            ResourceKind::Volume => "volumes",
            ResourceKind::VolumeType => "volume_types",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Server => write!(f, "server"),
            ResourceKind::Volume => write!(f, "volume"),
            ResourceKind::VolumeType => write!(f, "volume type"),
        }
    }
}

/// Mutating operations that consume mock bundles or decode request bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Update,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Create => write!(f, "create"),
            Operation::Update => write!(f, "update"),
        }
    }
}

/// Unrecoverable emulator failures.
#[derive(Debug, Error)]
pub enum FatalError {
    #[error("{kind} {operation} request #{requested} but only {supplied} mock bundle(s) were supplied")]
    MockExhausted {
        kind: ResourceKind,
        operation: Operation,
        requested: usize,
        supplied: usize,
    },
    #[error("error decoding {operation} {kind} request: {source}")]
    MalformedBody {
        kind: ResourceKind,
        operation: Operation,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to marshal {kind} response: {source}")]
    Encode {
        kind: ResourceKind,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure reported by a [`PortAttacher`](crate::ports::PortAttacher).
#[derive(Debug, Error)]
pub enum PortAttachError {
    #[error("port {0} not found")]
    UnknownPort(String),
    #[error("port {port} is already attached to {device}")]
    AlreadyAttached { port: String, device: String },
}
