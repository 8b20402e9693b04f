//! Compute server handlers.

use super::{decode_body, HandlerContext};
use crate::api::types::MockResponse;
use crate::encode::{encode_many, encode_one};
use crate::error::{FatalError, Operation, ResourceKind};
use crate::filter::{ListQuery, QueryParams};
use crate::model::{
    Address, FlavorSnapshot, Server, ServerCreateRequest, ServerUpdateRequest,
};
use hyper::StatusCode;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Every server gets this single fixed address on the `private` network.
const PRIVATE_NETWORK: &str = "private";
const FIXED_ADDRESS: &str = "192.168.1.1";

/// GET /servers and GET /servers/detail
pub(crate) fn handle_list(
    ctx: &HandlerContext<'_>,
    query: Option<&str>,
) -> Result<MockResponse, FatalError> {
    let filter = ListQuery::for_servers(&QueryParams::parse(query));
    let matched = filter.apply(ctx.state.servers.list(), |s| (s.name.as_str(), &s.metadata));
    Ok(MockResponse::json(StatusCode::OK, encode_many(matched)?))
}

/// GET /servers/:id
pub(crate) fn handle_get(ctx: &HandlerContext<'_>, id: &str) -> Result<MockResponse, FatalError> {
    match ctx.state.servers.get(id) {
        Some(server) => Ok(MockResponse::json(StatusCode::OK, encode_one(server)?)),
        None => Ok(MockResponse::not_found()),
    }
}

/// POST /servers
pub(crate) fn handle_create(
    ctx: &mut HandlerContext<'_>,
    body: &[u8],
) -> Result<MockResponse, FatalError> {
    let request: ServerCreateRequest = decode_body(ResourceKind::Server, Operation::Create, body)?;
    let opts = request.server;

    let Some(network) = opts.networks.first() else {
        debug!("Rejecting server '{}' without networks", opts.name);
        return Ok(MockResponse::bad_request());
    };

    let mocks = ctx.state.mocks.servers.next_create()?;

    let flavor = match ctx.state.flavors.get(&opts.flavor_ref) {
        Some(flavor) => FlavorSnapshot::from(flavor),
        None => {
            warn!(
                flavor = %opts.flavor_ref,
                "Unknown flavor for server '{}', using an empty flavor", opts.name
            );
            FlavorSnapshot::default()
        }
    };

    let image = if opts.image_ref.is_empty() {
        BTreeMap::new()
    } else {
        BTreeMap::from([("id".to_string(), opts.image_ref.clone())])
    };

    let server = Server {
        id: ctx.ids.next_id(),
        name: opts.name,
        status: "ACTIVE".to_string(),
        created: mocks.created,
        updated: mocks.updated,
        image,
        flavor,
        addresses: BTreeMap::from([(
            PRIVATE_NETWORK.to_string(),
            vec![Address::fixed(FIXED_ADDRESS)],
        )]),
        metadata: opts.metadata,
        security_groups: opts.security_groups,
        tags: opts.tags,
        key_name: opts.key_name,
        availability_zone: opts.availability_zone,
        launched_at: mocks.launched_at,
    };

    if !network.port.is_empty() {
        if let Err(e) = ctx.ports.attach(&network.port, &server.id) {
            warn!(server = %server.id, "Port attach failed: {}", e);
        }
    }

    info!("Created server {} ({})", server.id, server.name);
    let body = encode_one(&server)?;
    ctx.state.servers.put(server.id.clone(), server);
    Ok(MockResponse::json(StatusCode::ACCEPTED, body))
}

/// PUT /servers/:id
///
/// The update bundle is taken before the lookup, so a request against an
/// unknown id still uses up its bundle.
pub(crate) fn handle_update(
    ctx: &mut HandlerContext<'_>,
    id: &str,
    body: &[u8],
) -> Result<MockResponse, FatalError> {
    let mocks = ctx.state.mocks.servers.next_update()?;

    let Some(server) = ctx.state.servers.get_mut(id) else {
        return Ok(MockResponse::not_found());
    };
    let request: ServerUpdateRequest = decode_body(ResourceKind::Server, Operation::Update, body)?;

    server.name = request.server.name;
    server.updated = mocks.updated;
    server.flavor.resize_to(&mocks.flavor);

    Ok(MockResponse::json(StatusCode::OK, encode_one(&*server)?))
}

/// DELETE /servers/:id
pub(crate) fn handle_delete(ctx: &mut HandlerContext<'_>, id: &str) -> MockResponse {
    match ctx.state.servers.delete(id) {
        Some(server) => {
            info!("Deleted server {} ({})", server.id, server.name);
            MockResponse::status(StatusCode::NO_CONTENT)
        }
        None => MockResponse::not_found(),
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{get_with_query, mock_with, send, ts};
    use crate::config::Fixtures;
    use crate::error::{FatalError, Operation, ResourceKind};
    use crate::mocks::{ExtraMocks, ServerCreateMocks, ServerUpdateMocks};
    use crate::model::{Flavor, Port};
    use crate::ports::PortTable;
    use crate::state::CloudMock;
    use hyper::{Method, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn small() -> Flavor {
        Flavor {
            id: "f-1".to_string(),
            name: "m1.small".to_string(),
            ram: 2048,
            vcpus: 1,
            disk: 20,
            ephemeral: 0,
        }
    }

    fn large() -> Flavor {
        Flavor {
            id: "f-2".to_string(),
            name: "m1.large".to_string(),
            ram: 8192,
            vcpus: 4,
            disk: 80,
            ephemeral: 5,
        }
    }

    fn create_mocks(n: u32) -> Vec<ServerCreateMocks> {
        (1..=n)
            .map(|i| ServerCreateMocks {
                created: ts(i, 0),
                updated: ts(i, 1),
                launched_at: ts(i, 2),
            })
            .collect()
    }

    fn update_mocks(n: u32) -> Vec<ServerUpdateMocks> {
        (1..=n)
            .map(|i| ServerUpdateMocks {
                updated: ts(10 + i, 0),
                flavor: Flavor {
                    name: format!("resized-{i}"),
                    ..large()
                },
            })
            .collect()
    }

    fn mock(creates: u32, updates: u32) -> CloudMock {
        mock_with(Fixtures {
            flavors: vec![small(), large()],
            servers: ExtraMocks {
                create: create_mocks(creates),
                update: update_mocks(updates),
            },
            ..Default::default()
        })
    }

    fn create_body(name: &str) -> Value {
        json!({
            "server": {
                "name": name,
                "flavorRef": "f-1",
                "imageRef": "img-1",
                "networks": [{"port": "p-1"}],
                "metadata": {"KubernetesCluster": "test"},
                "security_groups": [{"name": "nodes"}],
            }
        })
    }

    fn create(mock: &CloudMock, name: &str) -> Value {
        let resp = send(mock, Method::POST, "/servers", Some(create_body(name))).unwrap();
        assert_eq!(resp.status, StatusCode::ACCEPTED);
        resp.body_json()["server"].clone()
    }

    #[test]
    fn test_create_server() {
        let mock = mock(1, 0);
        let server = create(&mock, "node-1");
        assert_eq!(server["id"], "id-1");
        assert_eq!(server["name"], "node-1");
        assert_eq!(server["status"], "ACTIVE");
        assert_eq!(server["created"], "2024-03-01T12:00:00Z");
        assert_eq!(server["updated"], "2024-03-01T12:00:01Z");
        assert_eq!(server["OS-SRV-USG:launched_at"], "2024-03-01T12:00:02");
        assert_eq!(server["image"], json!({"id": "img-1"}));
        assert_eq!(
            server["flavor"],
            json!({
                "id": "f-1", "name": "m1.small", "original_name": "m1.small",
                "ram": 2048, "vcpus": 1, "disk": 20, "ephemeral": 0
            })
        );
        assert_eq!(
            server["addresses"],
            json!({"private": [{"OS-EXT-IPS:type": "fixed", "addr": "192.168.1.1"}]})
        );
        assert_eq!(server["security_groups"], json!([{"name": "nodes"}]));
        assert_eq!(server["metadata"], json!({"KubernetesCluster": "test"}));
    }

    #[test]
    fn test_create_round_trips_through_get() {
        let mock = mock(1, 0);
        let created = create(&mock, "node-1");
        let resp = send(&mock, Method::GET, "/servers/id-1", None).unwrap();
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(resp.body_json()["server"], created);
    }

    #[test]
    fn test_create_without_networks_is_rejected() {
        let mock = mock(1, 0);
        let body = json!({"server": {"name": "node-1", "flavorRef": "f-1"}});
        let resp = send(&mock, Method::POST, "/servers", Some(body)).unwrap();
        assert_eq!(resp.status, StatusCode::BAD_REQUEST);
        assert!(mock.lock().servers.is_empty());
        // The create bundle is still available.
        assert_eq!(mock.lock().mocks.servers.create.remaining(), 1);
    }

    #[test]
    fn test_create_with_unknown_flavor_uses_empty_snapshot() {
        let mock = mock(1, 0);
        let mut body = create_body("node-1");
        body["server"]["flavorRef"] = json!("missing");
        let resp = send(&mock, Method::POST, "/servers", Some(body)).unwrap();
        assert_eq!(resp.status, StatusCode::ACCEPTED);
        assert_eq!(resp.body_json()["server"]["flavor"]["ram"], 0);
        assert_eq!(resp.body_json()["server"]["flavor"]["name"], "");
    }

    #[test]
    fn test_create_attaches_port() {
        let ports = Arc::new(PortTable::with_ports([Port {
            id: "p-1".to_string(),
            ..Default::default()
        }]));
        let mock = mock(1, 0).with_port_attacher(ports.clone());
        create(&mock, "node-1");
        assert_eq!(ports.get("p-1").unwrap().device_id, "id-1");
    }

    #[test]
    fn test_create_with_unknown_port_still_succeeds() {
        let mock = mock(1, 0);
        let server = create(&mock, "node-1");
        assert_eq!(server["id"], "id-1");
    }

    #[test]
    fn test_create_malformed_body_is_fatal() {
        let mock = mock(1, 0);
        let request = crate::api::MockRequest::new(Method::POST, "/servers").with_body("{not json");
        assert!(matches!(
            mock.handle(&request),
            Err(FatalError::MalformedBody {
                kind: ResourceKind::Server,
                operation: Operation::Create,
                ..
            })
        ));
    }

    #[test]
    fn test_create_exhaustion_is_fatal() {
        let mock = mock(1, 0);
        create(&mock, "node-1");
        let result = send(&mock, Method::POST, "/servers", Some(create_body("node-2")));
        assert!(matches!(
            result,
            Err(FatalError::MockExhausted {
                kind: ResourceKind::Server,
                operation: Operation::Create,
                ..
            })
        ));
        assert_eq!(mock.lock().servers.len(), 1);
    }

    #[test]
    fn test_update_changes_name_and_flavor_only() {
        let mock = mock(1, 1);
        let before = create(&mock, "node-1");
        let body = json!({"server": {"name": "node-renamed"}});
        let resp = send(&mock, Method::PUT, "/servers/id-1", Some(body)).unwrap();
        assert_eq!(resp.status, StatusCode::OK);

        let after = resp.body_json()["server"].clone();
        assert_eq!(after["name"], "node-renamed");
        assert_eq!(after["updated"], "2024-03-11T12:00:00Z");
        assert_eq!(after["flavor"]["id"], "f-1");
        assert_eq!(after["flavor"]["name"], "resized-1");
        assert_eq!(after["flavor"]["original_name"], "resized-1");
        assert_eq!(after["flavor"]["ram"], 8192);
        assert_eq!(after["flavor"]["ephemeral"], 5);

        for field in ["id", "created", "OS-SRV-USG:launched_at", "metadata", "addresses", "status"] {
            assert_eq!(after[field], before[field], "field {field} changed");
        }
    }

    #[test]
    fn test_update_without_name_blanks_name() {
        let mock = mock(1, 1);
        create(&mock, "node-1");
        let resp = send(&mock, Method::PUT, "/servers/id-1", Some(json!({"server": {}}))).unwrap();
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(resp.body_json()["server"]["name"], "");
    }

    #[test]
    fn test_update_bundles_follow_arrival_order() {
        let mock = mock(2, 3);
        create(&mock, "node-1");
        create(&mock, "node-2");

        // Targets alternate; bundles are consumed strictly in order.
        let targets = ["id-2", "id-1", "id-2"];
        for (i, target) in targets.iter().enumerate() {
            let body = json!({"server": {"name": "x"}});
            let resp = send(&mock, Method::PUT, &format!("/servers/{target}"), Some(body)).unwrap();
            let server = resp.body_json()["server"].clone();
            assert_eq!(server["flavor"]["name"], format!("resized-{}", i + 1));
            assert_eq!(server["updated"], format!("2024-03-{}T12:00:00Z", 11 + i));
        }
    }

    #[test]
    fn test_update_unknown_server_consumes_bundle() {
        let mock = mock(0, 1);
        let body = json!({"server": {"name": "x"}});
        let resp = send(&mock, Method::PUT, "/servers/missing", Some(body.clone())).unwrap();
        assert_eq!(resp.status, StatusCode::NOT_FOUND);
        assert!(matches!(
            send(&mock, Method::PUT, "/servers/missing", Some(body)),
            Err(FatalError::MockExhausted { .. })
        ));
    }

    #[test]
    fn test_delete_server() {
        let mock = mock(1, 1);
        create(&mock, "node-1");
        let resp = send(&mock, Method::DELETE, "/servers/id-1", None).unwrap();
        assert_eq!(resp.status, StatusCode::NO_CONTENT);
        assert!(resp.body.is_empty());

        let resp = send(&mock, Method::GET, "/servers/id-1", None).unwrap();
        assert_eq!(resp.status, StatusCode::NOT_FOUND);
        let resp = send(&mock, Method::DELETE, "/servers/id-1", None).unwrap();
        assert_eq!(resp.status, StatusCode::NOT_FOUND);
        let resp = send(&mock, Method::PUT, "/servers/id-1", Some(json!({"server": {}}))).unwrap();
        assert_eq!(resp.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_list_detail_with_anchored_prefix() {
        let mock = mock(3, 0);
        create(&mock, "node-1");
        create(&mock, "node-2");
        create(&mock, "master-1");

        let resp = get_with_query(&mock, "/servers/detail", "name=%5Enode-%24");
        assert_eq!(resp.status, StatusCode::OK);
        let mut names: Vec<String> = resp.body_json()["servers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["name"].as_str().unwrap().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["node-1", "node-2"]);
    }

    #[test]
    fn test_list_all() {
        let mock = mock(2, 0);
        create(&mock, "node-1");
        create(&mock, "master-1");
        for path in ["/servers", "/servers/", "/servers/detail"] {
            let resp = send(&mock, Method::GET, path, None).unwrap();
            assert_eq!(resp.body_json()["servers"].as_array().unwrap().len(), 2);
        }
    }

    #[test]
    fn test_unsupported_method() {
        let mock = mock(0, 0);
        let resp = send(&mock, Method::PATCH, "/servers/id-1", None).unwrap();
        assert_eq!(resp.status, StatusCode::BAD_REQUEST);
        let resp = send(&mock, Method::POST, "/servers/id-1", None).unwrap();
        assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_created_ids_are_distinct() {
        let mock = CloudMock::from_fixtures(Fixtures {
            flavors: vec![small()],
            servers: ExtraMocks {
                create: create_mocks(20),
                update: Vec::new(),
            },
            ..Default::default()
        });
        let mut ids: Vec<String> = (0..20)
            .map(|i| create(&mock, &format!("node-{i}"))["id"].as_str().unwrap().to_string())
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 20);
    }
}
