//! Network ports and the attach side effect of server creation.
//!
//! Creating a server binds its first requested port to the new server. The
//! result never influences the create response: failures are logged and
//! dropped.

use crate::error::PortAttachError;
use crate::model::Port;
use parking_lot::Mutex;
use std::collections::HashMap;

/// External capability that marks a port as used by a device.
pub trait PortAttacher: Send + Sync {
    fn attach(&self, port_id: &str, device_id: &str) -> Result<(), PortAttachError>;
}

/// In-memory port directory populated from fixtures.
///
/// Has its own lock; it is only ever taken while the emulator lock is already
/// held, never the other way round.
#[derive(Debug, Default)]
pub struct PortTable {
    ports: Mutex<HashMap<String, Port>>,
}

impl PortTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ports(ports: impl IntoIterator<Item = Port>) -> Self {
        let table = Self::new();
        for port in ports {
            table.insert(port);
        }
        table
    }

    pub fn insert(&self, port: Port) {
        self.ports.lock().insert(port.id.clone(), port);
    }

    pub fn get(&self, port_id: &str) -> Option<Port> {
        self.ports.lock().get(port_id).cloned()
    }
}

impl PortAttacher for PortTable {
    fn attach(&self, port_id: &str, device_id: &str) -> Result<(), PortAttachError> {
        let mut ports = self.ports.lock();
        let port = ports
            .get_mut(port_id)
            .ok_or_else(|| PortAttachError::UnknownPort(port_id.to_string()))?;
        if !port.device_id.is_empty() && port.device_id != device_id {
            return Err(PortAttachError::AlreadyAttached {
                port: port_id.to_string(),
                device: port.device_id.clone(),
            });
        }
        port.device_id = device_id.to_string();
        Ok(())
    }
}
