//! The host capability handed to the control service.

use crate::world::World;
use crate::Result;

/// World lifecycle operations provided by the host.
///
/// Implementations are not required to be `Sync`: every call happens on the
/// host's single execution context (see [`crate::HostExecutor`]), never
/// concurrently with another call or with the simulation tick.
pub trait WorldRegistry: Send {
    /// Worlds that are currently loaded
    fn list_worlds(&self) -> Vec<World>;

    /// Names of every world the host can load, loaded or not
    fn known_worlds(&self) -> Result<Vec<String>>;

    /// Persist a loaded world
    fn save(&mut self, world: &World) -> Result<()>;

    /// Load a world from its directory and register it.
    ///
    /// Recreating a world that is already loaded returns the registered
    /// instance instead of registering a second one.
    fn recreate(&mut self, name: &str) -> Result<World>;

    /// Unload a world, saving it first when `force_save` is set
    fn unload(&mut self, world: &World, force_save: bool) -> Result<()>;

    /// Save and unload everything, then refuse further operations
    fn shutdown(&mut self) -> Result<()>;
}
