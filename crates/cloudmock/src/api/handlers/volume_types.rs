//! Volume type handlers. The collection is read-only.

use super::HandlerContext;
use crate::api::types::MockResponse;
use crate::encode::{encode_many, encode_one};
use crate::error::FatalError;
use hyper::StatusCode;

/// GET /types
pub(crate) fn handle_list(ctx: &HandlerContext<'_>) -> Result<MockResponse, FatalError> {
    Ok(MockResponse::json(
        StatusCode::OK,
        encode_many(ctx.state.volume_types.list())?,
    ))
}

/// GET /types/:id
pub(crate) fn handle_get(ctx: &HandlerContext<'_>, id: &str) -> Result<MockResponse, FatalError> {
    match ctx.state.volume_types.get(id) {
        Some(volume_type) => Ok(MockResponse::json(StatusCode::OK, encode_one(volume_type)?)),
        None => Ok(MockResponse::not_found()),
    }
}
