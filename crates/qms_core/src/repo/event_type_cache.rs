//! Caller-owned memo of event-type name lookups.
//!
//! # Invariants
//! - Only positive lookups are cached; a missing type is re-queried.
//! - Any event-type write must be followed by `invalidate()`.

use super::event_repo::EventStore;
use super::RepoResult;
use crate::model::event::EventTypeId;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct EventTypeCache {
    by_name: HashMap<String, EventTypeId>,
}

impl EventTypeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves `name` to an id, consulting `store` on a miss.
    pub fn resolve<E: EventStore + ?Sized>(
        &mut self,
        store: &E,
        name: &str,
    ) -> RepoResult<Option<EventTypeId>> {
        let key = name.trim();
        if let Some(id) = self.by_name.get(key) {
            return Ok(Some(*id));
        }

        let found = store.find_event_type_by_name(key)?;
        if let Some(event_type) = &found {
            self.by_name.insert(key.to_string(), event_type.id);
        }
        Ok(found.map(|event_type| event_type.id))
    }

    pub fn invalidate(&mut self) {
        self.by_name.clear();
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
