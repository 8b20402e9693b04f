use crate::api::types::MockResponse;
use crate::error::{FatalError, ResourceKind};
use bytes::Bytes;
use hyper::StatusCode;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct InstanceActionsResponse {
    #[serde(rename = "instanceActions")]
    instance_actions: Vec<serde_json::Value>,
}

/// GET /servers/:id/os-instance-actions
///
/// No actions are ever recorded; the server id is not checked.
pub(crate) fn handle_list(_server_id: &str) -> Result<MockResponse, FatalError> {
    let body = serde_json::to_vec(&InstanceActionsResponse {
        instance_actions: Vec::new(),
    })
    .map_err(|source| FatalError::Encode {
        kind: ResourceKind::Server,
        source,
    })?;
    Ok(MockResponse::json(StatusCode::OK, Bytes::from(body)))
}
