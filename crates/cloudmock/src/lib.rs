//! Stateful, in-process emulation of a subset of the OpenStack REST API:
//! compute servers, block-storage volumes and volume types.
//!
//! Requests mutate an in-memory model guarded by a single lock. Fields the
//! emulator cannot decide deterministically (timestamps, the flavor a resize
//! lands on) come from mock bundles supplied up front, consumed in request
//! arrival order.

pub mod api;
pub mod config;
pub mod encode;
pub mod error;
pub mod filter;
pub mod ids;
pub mod mocks;
pub mod model;
pub mod ports;
pub mod state;
pub mod store;

pub use api::{MockRequest, MockResponse, MockServer};
pub use config::Fixtures;
pub use error::{FatalError, Operation, ResourceKind};
pub use state::{CloudMock, CloudState};
