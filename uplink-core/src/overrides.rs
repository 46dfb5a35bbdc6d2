//! Local persistence for admin-entered fields. The backend's save endpoint
//! shape is not guaranteed, so the last successfully saved snapshot is kept
//! per project id and layered under pending edits when computing scores.

use std::collections::HashMap;
use std::sync::RwLock;

use uplink_api::domain::AdminInfoPayload;

pub trait OverrideStore: Send + Sync {
    fn load(&self, project_id: i64) -> Option<AdminInfoPayload>;
    fn store(&self, project_id: i64, snapshot: &AdminInfoPayload);
    fn clear(&self, project_id: i64);
}

/// In-memory store, also the default backing for tests. A persistent
/// implementation only needs to keep one snapshot per project id.
#[derive(Default)]
pub struct MemoryOverrideStore {
    inner: RwLock<HashMap<i64, AdminInfoPayload>>,
}

impl MemoryOverrideStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OverrideStore for MemoryOverrideStore {
    fn load(&self, project_id: i64) -> Option<AdminInfoPayload> {
        self.inner.read().unwrap().get(&project_id).cloned()
    }

    fn store(&self, project_id: i64, snapshot: &AdminInfoPayload) {
        self.inner
            .write()
            .unwrap()
            .insert(project_id, snapshot.clone());
    }

    fn clear(&self, project_id: i64) {
        self.inner.write().unwrap().remove(&project_id);
    }
}
