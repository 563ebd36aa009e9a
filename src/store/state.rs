//! Authoritative preference state.
//!
//! The store task is the only writer; the state is shared so the session
//! and tests can inspect it while the store runs.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::prefs::{FieldUpdate, PrefField, Preferences};
use crate::window::SurfaceId;

/// One request as received by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestRecord {
    pub name: &'static str,
    /// Value carried by a field write.
    pub update: Option<FieldUpdate>,
}

#[derive(Clone)]
pub struct PreferenceState {
    inner: Arc<RwLock<PreferenceStateInner>>,
}

struct PreferenceStateInner {
    prefs: Preferences,
    /// Open shadow surfaces, in creation order.
    shadows: Vec<SurfaceId>,
    shadow_counter: u32,
    /// Every request received, in arrival order.
    requests: Vec<RequestRecord>,
    commits: u64,
}

impl PreferenceState {
    pub fn new(prefs: Preferences) -> Self {
        Self {
            inner: Arc::new(RwLock::new(PreferenceStateInner {
                prefs,
                shadows: Vec::new(),
                shadow_counter: 0,
                requests: Vec::new(),
                commits: 0,
            })),
        }
    }

    pub fn snapshot(&self) -> Preferences {
        self.inner.read().prefs.clone()
    }

    pub fn read(&self, field: PrefField) -> FieldUpdate {
        FieldUpdate::read(field, &self.inner.read().prefs)
    }

    pub fn is_locked(&self) -> bool {
        self.inner.read().prefs.locked
    }

    /// Apply one field write. Returns false when the value was already set.
    pub fn apply(&self, update: &FieldUpdate) -> bool {
        update.apply_to(&mut self.inner.write().prefs)
    }

    pub fn replace(&self, prefs: Preferences) {
        self.inner.write().prefs = prefs;
    }

    pub fn set_position(&self, x: i32, y: i32) {
        let mut inner = self.inner.write();
        inner.prefs.position_x = Some(x);
        inner.prefs.position_y = Some(y);
    }

    /// Allocate the next shadow label. Labels are never reused.
    pub fn next_shadow_id(&self) -> SurfaceId {
        let mut inner = self.inner.write();
        inner.shadow_counter += 1;
        SurfaceId::shadow(inner.shadow_counter)
    }

    pub fn add_shadow(&self, id: SurfaceId) {
        self.inner.write().shadows.push(id);
    }

    pub fn remove_shadow(&self, id: &SurfaceId) -> bool {
        let mut inner = self.inner.write();
        let before = inner.shadows.len();
        inner.shadows.retain(|shadow| shadow != id);
        inner.shadows.len() != before
    }

    pub fn take_shadows(&self) -> Vec<SurfaceId> {
        std::mem::take(&mut self.inner.write().shadows)
    }

    pub fn shadows(&self) -> Vec<SurfaceId> {
        self.inner.read().shadows.clone()
    }

    pub fn shadow_count(&self) -> usize {
        self.inner.read().shadows.len()
    }

    pub fn record(&self, name: &'static str, update: Option<FieldUpdate>) {
        self.inner.write().requests.push(RequestRecord { name, update });
    }

    pub fn requests(&self) -> Vec<RequestRecord> {
        self.inner.read().requests.clone()
    }

    /// How many requests named `name` were received.
    pub fn request_count(&self, name: &str) -> usize {
        self.inner
            .read()
            .requests
            .iter()
            .filter(|record| record.name == name)
            .count()
    }

    pub fn record_commit(&self) {
        self.inner.write().commits += 1;
    }

    /// Successful commits so far.
    pub fn commit_count(&self) -> u64 {
        self.inner.read().commits
    }
}
