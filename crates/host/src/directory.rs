//! Directory-backed Host
//!
//! A [`WorldRegistry`] that keeps each world in its own directory under a
//! worlds root. A directory is a world when it contains `level.json`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::errors::HostError;
use crate::registry::WorldRegistry;
use crate::world::{LevelData, World};
use crate::Result;

/// File marking a directory as a world
pub const LEVEL_FILE: &str = "level.json";

/// A world currently registered with the host
#[derive(Debug, Clone)]
struct LoadedWorld {
    instance: u64,
    level: LevelData,
}

/// World registry over a directory of world folders
#[derive(Debug)]
pub struct DirectoryHost {
    /// Directory holding one sub-directory per world
    root: PathBuf,
    /// Registered worlds keyed by name
    loaded: BTreeMap<String, LoadedWorld>,
    /// Next load instance number
    next_instance: u64,
    /// Set once `shutdown` has run
    shut_down: bool,
}

impl DirectoryHost {
    /// Open a worlds root, creating it if missing.
    ///
    /// With `autoload` every known world is loaded immediately, the way a
    /// game server brings its worlds up at startup.
    pub fn open(root: impl Into<PathBuf>, autoload: bool) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| HostError::io(&root, e))?;

        let mut host = Self {
            root,
            loaded: BTreeMap::new(),
            next_instance: 1,
            shut_down: false,
        };

        if autoload {
            for name in host.known_worlds()? {
                match host.recreate(&name) {
                    Ok(world) => debug!("Autoloaded world {}", world),
                    Err(e) => warn!("Skipping world '{}' at startup: {}", name, e),
                }
            }
        }

        info!(
            "Opened worlds root {} ({} loaded)",
            host.root.display(),
            host.loaded.len()
        );
        Ok(host)
    }

    /// Whether `shutdown` has completed
    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Create a new world directory with fresh level data.
    ///
    /// The world is not loaded; call [`WorldRegistry::recreate`] for that.
    pub fn create_world(&self, name: &str) -> Result<LevelData> {
        validate_world_name(name)?;
        let dir = self.root.join(name);
        if dir.join(LEVEL_FILE).exists() {
            return Err(HostError::Other {
                reason: format!("World '{}' already exists", name),
            });
        }

        fs::create_dir_all(&dir).map_err(|e| HostError::io(&dir, e))?;
        let level = LevelData::new(name);
        write_level(&dir, &level)?;

        info!("Created world '{}' in {}", name, dir.display());
        Ok(level)
    }

    /// Read a world's level data from disk
    pub fn level_data(&self, name: &str) -> Result<LevelData> {
        validate_world_name(name)?;
        read_level(&self.root.join(name), name)
    }

    fn ensure_running(&self) -> Result<()> {
        if self.shut_down {
            return Err(HostError::ShutDown);
        }
        Ok(())
    }

    fn loaded_mut(&mut self, world: &World) -> Result<&mut LoadedWorld> {
        match self.loaded.get_mut(&world.name) {
            Some(loaded) if loaded.instance == world.instance => Ok(loaded),
            _ => Err(HostError::NotLoaded { name: world.name.clone() }),
        }
    }

    fn save_loaded(root: &Path, name: &str, loaded: &mut LoadedWorld) -> Result<()> {
        let mut level = loaded.level.clone();
        level.mark_saved();
        write_level(&root.join(name), &level)?;
        loaded.level = level;
        Ok(())
    }
}

impl WorldRegistry for DirectoryHost {
    fn list_worlds(&self) -> Vec<World> {
        self.loaded
            .iter()
            .map(|(name, loaded)| World::new(name.clone(), loaded.instance))
            .collect()
    }

    fn known_worlds(&self) -> Result<Vec<String>> {
        self.ensure_running()?;
        let entries = fs::read_dir(&self.root).map_err(|e| HostError::io(&self.root, e))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| HostError::io(&self.root, e))?;
            let path = entry.path();
            if !path.join(LEVEL_FILE).is_file() {
                continue;
            }

            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                warn!("Skipping world directory with non-UTF-8 name: {}", path.display());
                continue;
            };
            if let Err(e) = validate_world_name(&name) {
                warn!("Skipping world directory {}: {}", path.display(), e);
                continue;
            }
            names.push(name);
        }

        names.sort();
        Ok(names)
    }

    fn save(&mut self, world: &World) -> Result<()> {
        self.ensure_running()?;
        let root = self.root.clone();
        let loaded = self.loaded_mut(world)?;
        Self::save_loaded(&root, &world.name, loaded)?;
        debug!("Saved world {}", world);
        Ok(())
    }

    fn recreate(&mut self, name: &str) -> Result<World> {
        self.ensure_running()?;
        validate_world_name(name)?;

        if let Some(loaded) = self.loaded.get(name) {
            return Ok(World::new(name, loaded.instance));
        }

        let level = read_level(&self.root.join(name), name)?;
        let instance = self.next_instance;
        self.next_instance += 1;
        self.loaded.insert(name.to_string(), LoadedWorld { instance, level });

        let world = World::new(name, instance);
        debug!("Loaded world {}", world);
        Ok(world)
    }

    fn unload(&mut self, world: &World, force_save: bool) -> Result<()> {
        self.ensure_running()?;
        let root = self.root.clone();
        let loaded = self.loaded_mut(world)?;
        if force_save {
            Self::save_loaded(&root, &world.name, loaded)?;
        }
        self.loaded.remove(&world.name);
        debug!("Unloaded world {}", world);
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        if self.shut_down {
            return Ok(());
        }

        // Every world is unloaded even when an earlier save failed; the first
        // failure is reported.
        let mut first_failure = None;
        for world in self.list_worlds() {
            if let Err(e) = self.unload(&world, true) {
                warn!("Failed to save world {} during shutdown: {}", world, e);
                first_failure.get_or_insert(HostError::ShutdownSave {
                    name: world.name.clone(),
                    source: Box::new(e),
                });
            }
        }
        self.loaded.clear();
        self.shut_down = true;

        match first_failure {
            Some(e) => Err(e),
            None => {
                info!("Host shut down");
                Ok(())
            }
        }
    }
}

/// Reject names that are not a single plain path component
pub fn validate_world_name(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\'])
        || name.chars().any(char::is_control);

    if invalid {
        return Err(HostError::InvalidName { name: name.to_string() });
    }
    Ok(())
}

fn read_level(dir: &Path, name: &str) -> Result<LevelData> {
    let path = dir.join(LEVEL_FILE);
    let bytes = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(HostError::WorldNotFound { name: name.to_string() });
        }
        Err(e) => return Err(HostError::io(path, e)),
    };

    let mut level: LevelData = serde_json::from_slice(&bytes).map_err(|source| HostError::Corrupt {
        name: name.to_string(),
        source,
    })?;

    // The directory name is authoritative; a renamed folder keeps its data.
    if level.name != name {
        debug!("World directory '{}' has level name '{}'; using directory name", name, level.name);
        level.name = name.to_string();
    }
    Ok(level)
}

fn write_level(dir: &Path, level: &LevelData) -> Result<()> {
    let path = dir.join(LEVEL_FILE);
    let tmp = dir.join(format!("{}.tmp", LEVEL_FILE));

    let json = serde_json::to_vec_pretty(level).map_err(|source| HostError::Corrupt {
        name: level.name.clone(),
        source,
    })?;
    fs::write(&tmp, json).map_err(|e| HostError::io(&tmp, e))?;
    fs::rename(&tmp, &path).map_err(|e| HostError::io(&path, e))?;
    Ok(())
}
