//! HTTP surface of the emulator.
//!
//! This module provides:
//! - `router`: path/method dispatch to the per-kind handlers
//! - `handlers`: servers, volumes, volume types and instance actions
//! - `server`: the hyper listener running one task per connection
//! - `types`: request/response values and hyper conversions

mod handlers;
mod router;
mod server;
mod types;

pub use router::dispatch;
pub use server::MockServer;
pub use types::{MockRequest, MockResponse};
