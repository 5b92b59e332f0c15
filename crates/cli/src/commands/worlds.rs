//! World directory commands
//!
//! `worldctl worlds list` and `worldctl worlds create` work directly on the
//! worlds directory, without a running service.

use anyhow::{Context, Result};
use std::path::Path;
use worldctl_host::{DirectoryHost, LevelData, WorldRegistry};

/// Print every world in `worlds_dir` with its level data
pub fn list_worlds(worlds_dir: &Path) -> Result<()> {
    let levels = read_levels(worlds_dir)?;
    if levels.is_empty() {
        println!("No worlds in {}", worlds_dir.display());
        return Ok(());
    }

    println!("🌍 Worlds in {}:", worlds_dir.display());
    for level in levels {
        let last_saved = level
            .last_saved
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "never".to_string());
        println!(
            "   {}  created {}  last saved {}  ({} saves)",
            level.name,
            level.created_at.to_rfc3339(),
            last_saved,
            level.save_count
        );
    }
    Ok(())
}

/// Create a new world directory
pub fn create_world(worlds_dir: &Path, name: &str) -> Result<()> {
    let host = DirectoryHost::open(worlds_dir, false)
        .with_context(|| format!("Failed to open worlds directory: {}", worlds_dir.display()))?;
    host.create_world(name)
        .with_context(|| format!("Failed to create world '{}'", name))?;

    println!("✅ Created world '{}' in {}", name, worlds_dir.display());
    Ok(())
}

fn read_levels(worlds_dir: &Path) -> Result<Vec<LevelData>> {
    let host = DirectoryHost::open(worlds_dir, false)
        .with_context(|| format!("Failed to open worlds directory: {}", worlds_dir.display()))?;

    host.known_worlds()?
        .iter()
        .map(|name| Ok(host.level_data(name)?))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_then_list() {
        let temp_dir = TempDir::new().unwrap();

        create_world(temp_dir.path(), "world").unwrap();
        create_world(temp_dir.path(), "world_nether").unwrap();
        assert!(create_world(temp_dir.path(), "world").is_err());

        let names: Vec<String> = read_levels(temp_dir.path())
            .unwrap()
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names, vec!["world", "world_nether"]);
        assert!(list_worlds(temp_dir.path()).is_ok());
    }

    #[test]
    fn test_create_invalid_name() {
        let temp_dir = TempDir::new().unwrap();
        assert!(create_world(temp_dir.path(), "../escape").is_err());
    }
}
