//! Scripted field values for things the emulator must not compute itself.
//!
//! Timestamps (and the flavor/size/type an update lands on) come from bundles
//! supplied by the test before any request arrives. Each kind has one ordered
//! queue for creates and one for updates; every matching request consumes the
//! next bundle, so the i-th update against a kind sees the i-th update bundle
//! no matter which identifier it targets. Consumption happens under the same
//! lock as the store mutation, which makes arrival order and consumption order
//! identical.

use crate::error::{FatalError, Operation, ResourceKind};
use crate::model::Flavor;
use chrono::{DateTime, FixedOffset};
use serde::Deserialize;

/// Values stamped on a newly created server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerCreateMocks {
    pub created: DateTime<FixedOffset>,
    pub updated: DateTime<FixedOffset>,
    pub launched_at: DateTime<FixedOffset>,
}

/// Values applied by a server update (a resize, as far as the flavor goes).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerUpdateMocks {
    pub updated: DateTime<FixedOffset>,
    #[serde(default)]
    pub flavor: Flavor,
}

/// Values stamped on a newly created volume.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VolumeCreateMocks {
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

/// Values applied by a volume update.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VolumeUpdateMocks {
    pub updated_at: DateTime<FixedOffset>,
    #[serde(default)]
    pub volume_type: String,
    #[serde(default)]
    pub size: u64,
}

/// Ordered, consume-once sequence of bundles for one (kind, operation) pair.
#[derive(Debug, Clone)]
pub struct MockQueue<T> {
    kind: ResourceKind,
    operation: Operation,
    bundles: Vec<T>,
    cursor: usize,
}

impl<T: Clone> MockQueue<T> {
    pub fn new(kind: ResourceKind, operation: Operation, bundles: Vec<T>) -> Self {
        Self {
            kind,
            operation,
            bundles,
            cursor: 0,
        }
    }

    /// Take the next bundle. Running past the end means the test supplied
    /// fewer bundles than it issued requests, which is fatal.
    pub fn next_bundle(&mut self) -> Result<T, FatalError> {
        let bundle = self
            .bundles
            .get(self.cursor)
            .cloned()
            .ok_or(FatalError::MockExhausted {
                kind: self.kind,
                operation: self.operation,
                requested: self.cursor + 1,
                supplied: self.bundles.len(),
            })?;
        self.cursor += 1;
        Ok(bundle)
    }

    pub fn extend(&mut self, bundles: impl IntoIterator<Item = T>) {
        self.bundles.extend(bundles);
    }

    /// Number of bundles consumed so far.
    pub fn consumed(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.bundles.len() - self.cursor
    }
}

/// Create and update queues for one resource kind.
#[derive(Debug, Clone)]
pub struct KindMocks<C, U> {
    pub create: MockQueue<C>,
    pub update: MockQueue<U>,
}

impl<C: Clone, U: Clone> KindMocks<C, U> {
    pub fn new(kind: ResourceKind, create: Vec<C>, update: Vec<U>) -> Self {
        Self {
            create: MockQueue::new(kind, Operation::Create, create),
            update: MockQueue::new(kind, Operation::Update, update),
        }
    }

    pub fn next_create(&mut self) -> Result<C, FatalError> {
        self.create.next_bundle()
    }

    pub fn next_update(&mut self) -> Result<U, FatalError> {
        self.update.next_bundle()
    }
}

pub type ServerMocks = KindMocks<ServerCreateMocks, ServerUpdateMocks>;
pub type VolumeMocks = KindMocks<VolumeCreateMocks, VolumeUpdateMocks>;

/// Bundles as supplied by a test, before they become queues.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "C: Deserialize<'de>, U: Deserialize<'de>"))]
pub struct ExtraMocks<C, U> {
    #[serde(default = "Vec::new")]
    pub create: Vec<C>,
    #[serde(default = "Vec::new")]
    pub update: Vec<U>,
}

impl<C, U> Default for ExtraMocks<C, U> {
    fn default() -> Self {
        Self {
            create: Vec::new(),
            update: Vec::new(),
        }
    }
}

/// All mock queues of the emulator.
#[derive(Debug, Clone)]
pub struct MockQueues {
    pub servers: ServerMocks,
    pub volumes: VolumeMocks,
}

impl Default for MockQueues {
    fn default() -> Self {
        Self {
            servers: KindMocks::new(ResourceKind::Server, Vec::new(), Vec::new()),
            volumes: KindMocks::new(ResourceKind::Volume, Vec::new(), Vec::new()),
        }
    }
}

impl MockQueues {
    pub fn load_servers(&mut self, mocks: ExtraMocks<ServerCreateMocks, ServerUpdateMocks>) {
        self.servers.create.extend(mocks.create);
        self.servers.update.extend(mocks.update);
    }

    pub fn load_volumes(&mut self, mocks: ExtraMocks<VolumeCreateMocks, VolumeUpdateMocks>) {
        self.volumes.create.extend(mocks.create);
        self.volumes.update.extend(mocks.update);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn at(hour: u32) -> DateTime<FixedOffset> {
        Utc.with_ymd_and_hms(2024, 1, 2, hour, 0, 0).unwrap().fixed_offset()
    }

    fn update(hour: u32, size: u64) -> VolumeUpdateMocks {
        VolumeUpdateMocks {
            updated_at: at(hour),
            volume_type: "fast".to_string(),
            size,
        }
    }

    #[test]
    fn test_bundles_consumed_in_order() {
        let mut queue = MockQueue::new(
            ResourceKind::Volume,
            Operation::Update,
            vec![update(1, 10), update(2, 20), update(3, 30)],
        );
        assert_eq!(queue.next_bundle().unwrap().size, 10);
        assert_eq!(queue.next_bundle().unwrap().size, 20);
        assert_eq!(queue.consumed(), 2);
        assert_eq!(queue.remaining(), 1);
        assert_eq!(queue.next_bundle().unwrap().updated_at, at(3));
    }

    #[test]
    fn test_exhaustion_is_fatal() {
        let mut queue = MockQueue::new(ResourceKind::Volume, Operation::Update, vec![update(1, 1)]);
        queue.next_bundle().unwrap();
        match queue.next_bundle() {
            Err(FatalError::MockExhausted {
                kind,
                operation,
                requested,
                supplied,
            }) => {
                assert_eq!(kind, ResourceKind::Volume);
                assert_eq!(operation, Operation::Update);
                assert_eq!(requested, 2);
                assert_eq!(supplied, 1);
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
        // Cursor does not move past the end.
        assert_eq!(queue.consumed(), 1);
    }

    #[test]
    fn test_empty_queue_fails_on_first_use() {
        let mut mocks = MockQueues::default();
        assert!(mocks.servers.next_create().is_err());
        assert!(mocks.volumes.next_update().is_err());
    }

    #[test]
    fn test_create_and_update_cursors_are_independent() {
        let mut mocks = MockQueues::default();
        mocks.load_volumes(ExtraMocks {
            create: vec![VolumeCreateMocks {
                created_at: at(1),
                updated_at: at(1),
            }],
            update: vec![update(2, 5)],
        });
        assert_eq!(mocks.volumes.next_update().unwrap().size, 5);
        assert_eq!(mocks.volumes.next_create().unwrap().created_at, at(1));
        assert_eq!(mocks.volumes.create.remaining(), 0);
        assert_eq!(mocks.volumes.update.remaining(), 0);
    }

    #[test]
    fn test_extra_mocks_from_yaml() {
        let yaml = r#"
create:
  - created: 2024-01-02T03:04:05Z
    updated: 2024-01-02T03:04:05Z
    launched_at: 2024-01-02T03:04:06Z
update:
  - updated: 2024-01-03T00:00:00Z
    flavor:
      id: f-2
      name: m1.large
      ram: 8192
      vcpus: 4
"#;
        let mocks: ExtraMocks<ServerCreateMocks, ServerUpdateMocks> =
            serde_yaml::from_str(yaml).unwrap();
        assert_eq!(mocks.create.len(), 1);
        assert_eq!(mocks.update[0].flavor.name, "m1.large");
        assert_eq!(mocks.update[0].flavor.disk, 0);
    }
}
