//! Per-kind request handlers.
//!
//! Handlers run with the emulator lock held (the router takes it before
//! calling in) and never suspend. Recoverable outcomes come back as a
//! [`MockResponse`](crate::api::MockResponse) carrying the status code;
//! anything returned as `Err` is fatal.

pub(crate) mod instance_actions;
pub(crate) mod servers;
pub(crate) mod volume_types;
pub(crate) mod volumes;

use crate::error::{FatalError, Operation, ResourceKind};
use crate::ids::IdGenerator;
use crate::ports::PortAttacher;
use crate::state::CloudState;
use serde::de::DeserializeOwned;

/// What a handler gets to work with while the lock is held.
pub(crate) struct HandlerContext<'a> {
    pub state: &'a mut CloudState,
    pub ids: &'a dyn IdGenerator,
    pub ports: &'a dyn PortAttacher,
}

/// Decode a request body. Clients are assumed to be well-behaved libraries,
/// so a body that does not decode is fatal rather than a 400.
pub(crate) fn decode_body<T: DeserializeOwned>(
    kind: ResourceKind,
    operation: Operation,
    body: &[u8],
) -> Result<T, FatalError> {
    serde_json::from_slice(body).map_err(|source| FatalError::MalformedBody {
        kind,
        operation,
        source,
    })
}
