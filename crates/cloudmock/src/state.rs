//! Shared emulator state and its single lock.

use crate::api::{dispatch, MockRequest, MockResponse};
use crate::config::Fixtures;
use crate::error::FatalError;
use crate::ids::{IdGenerator, UuidGenerator};
use crate::mocks::MockQueues;
use crate::model::{Flavor, Server, Volume, VolumeType};
use crate::ports::{PortAttacher, PortTable};
use crate::store::Store;
use parking_lot::{Mutex, MutexGuard};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Identifier and name of the volume type every deployment has.
pub const DEFAULT_VOLUME_TYPE: &str = "standard";

/// Everything a handler may read or mutate. Only reachable through
/// [`CloudMock::lock`].
#[derive(Debug, Default)]
pub struct CloudState {
    pub servers: Store<Server>,
    pub volumes: Store<Volume>,
    pub volume_types: Store<VolumeType>,
    pub flavors: HashMap<String, Flavor>,
    pub mocks: MockQueues,
}

impl CloudState {
    /// Seed the default volume type unless one with that id already exists.
    /// Safe to call any number of times.
    pub fn register_volume_types(&mut self) {
        if self.volume_types.put_if_absent(
            DEFAULT_VOLUME_TYPE,
            VolumeType::new(DEFAULT_VOLUME_TYPE, DEFAULT_VOLUME_TYPE),
        ) {
            debug!("Seeded default volume type '{}'", DEFAULT_VOLUME_TYPE);
        }
    }

    pub fn add_flavor(&mut self, flavor: Flavor) {
        self.flavors.insert(flavor.id.clone(), flavor);
    }
}

/// The emulator: resource stores and mock queues behind one process-wide
/// mutex, plus the external collaborators handlers call into.
pub struct CloudMock {
    state: Mutex<CloudState>,
    ids: Arc<dyn IdGenerator>,
    ports: Arc<dyn PortAttacher>,
}

impl Default for CloudMock {
    fn default() -> Self {
        Self::new()
    }
}

impl CloudMock {
    /// Empty emulator: no flavors, no ports, no mock bundles.
    pub fn new() -> Self {
        Self::from_fixtures(Fixtures::default())
    }

    pub fn from_fixtures(fixtures: Fixtures) -> Self {
        let mut state = CloudState::default();
        for flavor in fixtures.flavors {
            state.add_flavor(flavor);
        }
        for volume_type in fixtures.volume_types {
            state.volume_types.put(volume_type.id.clone(), volume_type);
        }
        state.mocks.load_servers(fixtures.servers);
        state.mocks.load_volumes(fixtures.volumes);
        state.register_volume_types();

        Self {
            state: Mutex::new(state),
            ids: Arc::new(UuidGenerator),
            ports: Arc::new(PortTable::with_ports(fixtures.ports)),
        }
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_port_attacher(mut self, ports: Arc<dyn PortAttacher>) -> Self {
        self.ports = ports;
        self
    }

    /// Exclusive access to the stores and mock queues. The guard releases the
    /// lock on every exit path, unwinding included.
    pub fn lock(&self) -> MutexGuard<'_, CloudState> {
        self.state.lock()
    }

    pub fn ids(&self) -> &dyn IdGenerator {
        self.ids.as_ref()
    }

    pub fn ports(&self) -> &dyn PortAttacher {
        self.ports.as_ref()
    }

    /// Route and execute one request.
    pub fn handle(&self, request: &MockRequest) -> Result<MockResponse, FatalError> {
        dispatch(self, request)
    }
}
