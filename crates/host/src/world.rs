//! World handles and on-disk level data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to a loaded world.
///
/// `instance` is assigned by the host each time the world is loaded, so two
/// handles with the same name but different instances refer to different
/// loads of the same world directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct World {
    /// World name, also its directory name
    pub name: String,
    /// Load instance number
    pub instance: u64,
}

impl World {
    pub fn new(name: impl Into<String>, instance: u64) -> Self {
        Self { name: name.into(), instance }
    }
}

impl fmt::Display for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.instance)
    }
}

/// Contents of a world's `level.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    /// World name
    pub name: String,
    /// When the world directory was created
    pub created_at: DateTime<Utc>,
    /// Last successful save
    #[serde(default)]
    pub last_saved: Option<DateTime<Utc>>,
    /// Number of saves performed
    #[serde(default)]
    pub save_count: u64,
}

impl LevelData {
    /// Fresh level data for a newly created world
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created_at: Utc::now(),
            last_saved: None,
            save_count: 0,
        }
    }

    /// Record a save at the current time
    pub fn mark_saved(&mut self) {
        self.last_saved = Some(Utc::now());
        self.save_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_display() {
        let world = World::new("world_nether", 3);
        assert_eq!(world.to_string(), "world_nether#3");
    }

    #[test]
    fn test_level_data_mark_saved() {
        let mut level = LevelData::new("world");
        assert!(level.last_saved.is_none());

        level.mark_saved();
        level.mark_saved();

        assert_eq!(level.save_count, 2);
        assert!(level.last_saved.unwrap() >= level.created_at);
    }

    #[test]
    fn test_level_data_defaults() {
        let json = r#"{"name":"world","created_at":"2024-01-01T00:00:00Z"}"#;
        let level: LevelData = serde_json::from_str(json).unwrap();
        assert_eq!(level.name, "world");
        assert_eq!(level.save_count, 0);
        assert!(level.last_saved.is_none());
    }
}
