//! Block-storage volume handlers.

use super::{decode_body, HandlerContext};
use crate::api::types::MockResponse;
use crate::encode::{encode_many, encode_one};
use crate::error::{FatalError, Operation, ResourceKind};
use crate::filter::{ListQuery, QueryParams};
use crate::model::{Volume, VolumeCreateRequest, VolumeUpdateRequest};
use hyper::StatusCode;
use tracing::info;

/// GET /volumes and GET /volumes/detail
pub(crate) fn handle_list(
    ctx: &HandlerContext<'_>,
    query: Option<&str>,
) -> Result<MockResponse, FatalError> {
    let filter = match query {
        Some(query) => ListQuery::for_volumes(&QueryParams::parse(Some(query))),
        None => ListQuery::all(),
    };
    let matched = filter.apply(ctx.state.volumes.list(), |v| (v.name.as_str(), &v.metadata));
    Ok(MockResponse::json(StatusCode::OK, encode_many(matched)?))
}

/// GET /volumes/:id
pub(crate) fn handle_get(ctx: &HandlerContext<'_>, id: &str) -> Result<MockResponse, FatalError> {
    match ctx.state.volumes.get(id) {
        Some(volume) => Ok(MockResponse::json(StatusCode::OK, encode_one(volume)?)),
        None => Ok(MockResponse::not_found()),
    }
}

/// POST /volumes
pub(crate) fn handle_create(
    ctx: &mut HandlerContext<'_>,
    body: &[u8],
) -> Result<MockResponse, FatalError> {
    let request: VolumeCreateRequest = decode_body(ResourceKind::Volume, Operation::Create, body)?;
    let opts = request.volume;
    let mocks = ctx.state.mocks.volumes.next_create()?;

    let volume = Volume {
        id: ctx.ids.next_id(),
        name: opts.name,
        description: opts.description,
        status: String::new(),
        size: opts.size,
        availability_zone: opts.availability_zone,
        volume_type: opts.volume_type,
        snapshot_id: opts.snapshot_id,
        source_volid: opts.source_volid,
        bootable: "false".to_string(),
        multiattach: false,
        encrypted: false,
        attachments: Vec::new(),
        metadata: opts.metadata,
        created_at: mocks.created_at,
        updated_at: mocks.updated_at,
    };

    info!("Created volume {} ({})", volume.id, volume.name);
    let body = encode_one(&volume)?;
    ctx.state.volumes.put(volume.id.clone(), volume);
    Ok(MockResponse::json(StatusCode::ACCEPTED, body))
}

/// PUT /volumes/:id
///
/// Metadata comes from the request; size, type and update time from the next
/// update bundle, which is consumed even when the volume does not exist.
pub(crate) fn handle_update(
    ctx: &mut HandlerContext<'_>,
    id: &str,
    body: &[u8],
) -> Result<MockResponse, FatalError> {
    let mocks = ctx.state.mocks.volumes.next_update()?;

    let Some(volume) = ctx.state.volumes.get_mut(id) else {
        return Ok(MockResponse::not_found());
    };
    let request: VolumeUpdateRequest = decode_body(ResourceKind::Volume, Operation::Update, body)?;

    volume.metadata = request.volume.metadata.unwrap_or_default();
    volume.updated_at = mocks.updated_at;
    volume.volume_type = mocks.volume_type;
    volume.size = mocks.size;

    Ok(MockResponse::json(StatusCode::OK, encode_one(&*volume)?))
}

/// DELETE /volumes/:id
pub(crate) fn handle_delete(ctx: &mut HandlerContext<'_>, id: &str) -> MockResponse {
    match ctx.state.volumes.delete(id) {
        Some(volume) => {
            info!("Deleted volume {} ({})", volume.id, volume.name);
            MockResponse::status(StatusCode::OK)
        }
        None => MockResponse::not_found(),
    }
}
