use std::sync::Arc;

use dashmap::DashMap;

/// Study rooms: name to ordered member ids. Membership is append-only.
#[derive(Clone, Default)]
pub struct RoomRegistry {
    rooms: Arc<DashMap<String, Vec<u64>>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the room on demand and appends the creator.
    pub fn create(&self, name: &str, user_id: u64) {
        self.rooms.entry(name.to_string()).or_default().push(user_id);
    }

    /// Returns false when the room does not exist.
    pub fn join(&self, name: &str, user_id: u64) -> bool {
        match self.rooms.get_mut(name) {
            Some(mut members) => {
                members.push(user_id);
                true
            }
            None => false,
        }
    }

    pub fn members(&self, name: &str) -> Option<Vec<u64>> {
        self.rooms.get(name).map(|m| m.value().clone())
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.rooms.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}
