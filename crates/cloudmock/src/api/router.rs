//! Route dispatch logic for the emulated API.
//!
//! Each resource kind is a flat collection. A path is matched by stripping the
//! collection prefix and a single trailing slash; what remains is the raw
//! identifier-or-verb segment: empty for the collection root, `detail` for the
//! filtered list, anything else an identifier.

use crate::api::handlers::{instance_actions, servers, volume_types, volumes, HandlerContext};
use crate::api::types::{MockRequest, MockResponse};
use crate::error::FatalError;
use crate::state::CloudMock;
use hyper::Method;

const SERVERS: &str = "/servers";
const VOLUMES: &str = "/volumes";
const VOLUME_TYPES: &str = "/types";
const INSTANCE_ACTIONS: &str = "os-instance-actions";

/// Parsed route: the owning collection and the trailing segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Route<'a> {
    Servers(&'a str),
    /// `/servers/{id}/os-instance-actions`
    InstanceActions(&'a str),
    Volumes(&'a str),
    VolumeTypes(&'a str),
}

impl<'a> Route<'a> {
    pub(crate) fn parse(path: &'a str) -> Option<Self> {
        if let Some(segment) = strip_collection(path, SERVERS) {
            if let Some((server_id, INSTANCE_ACTIONS)) = segment.split_once('/') {
                return Some(Route::InstanceActions(server_id));
            }
            return Some(Route::Servers(segment));
        }
        if let Some(segment) = strip_collection(path, VOLUMES) {
            return Some(Route::Volumes(segment));
        }
        strip_collection(path, VOLUME_TYPES).map(Route::VolumeTypes)
    }
}

/// `/servers`, `/servers/` -> `""`; `/servers/abc/` -> `"abc"`.
fn strip_collection<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = path.strip_prefix(prefix)?;
    if rest.is_empty() {
        return Some(rest);
    }
    let rest = rest.strip_prefix('/')?;
    Some(rest.strip_suffix('/').unwrap_or(rest))
}

/// Route a request and run its handler under the emulator lock.
///
/// Paths outside the emulated collections are answered without taking the
/// lock.
pub fn dispatch(mock: &CloudMock, request: &MockRequest) -> Result<MockResponse, FatalError> {
    let Some(route) = Route::parse(&request.path) else {
        return Ok(MockResponse::unrouted());
    };

    let mut state = mock.lock();
    let mut ctx = HandlerContext {
        state: &mut *state,
        ids: mock.ids(),
        ports: mock.ports(),
    };

    let method = &request.method;
    match route {
        Route::Servers(segment) => match *method {
            Method::GET => match segment {
                "" => servers::handle_list(&mut ctx, None),
                "detail" => servers::handle_list(&mut ctx, request.query.as_deref()),
                id => servers::handle_get(&mut ctx, id),
            },
            Method::POST if segment.is_empty() => servers::handle_create(&mut ctx, &request.body),
            Method::PUT => servers::handle_update(&mut ctx, segment, &request.body),
            Method::DELETE => Ok(servers::handle_delete(&mut ctx, segment)),
            _ => Ok(MockResponse::bad_request()),
        },
        Route::InstanceActions(server_id) => match *method {
            Method::GET => instance_actions::handle_list(server_id),
            _ => Ok(MockResponse::bad_request()),
        },
        Route::Volumes(segment) => match *method {
            Method::GET => match segment {
                "" => volumes::handle_list(&mut ctx, None),
                "detail" => volumes::handle_list(&mut ctx, request.query.as_deref()),
                id => volumes::handle_get(&mut ctx, id),
            },
            Method::POST if segment.is_empty() => volumes::handle_create(&mut ctx, &request.body),
            Method::PUT => volumes::handle_update(&mut ctx, segment, &request.body),
            Method::DELETE => Ok(volumes::handle_delete(&mut ctx, segment)),
            _ => Ok(MockResponse::bad_request()),
        },
        Route::VolumeTypes(segment) => match *method {
            Method::GET if segment.is_empty() => volume_types::handle_list(&mut ctx),
            Method::GET => volume_types::handle_get(&mut ctx, segment),
            _ => Ok(MockResponse::bad_request()),
        },
    }
}
