//! Persistent store collaborator
//!
//! The game core only needs keyed get/set with read-your-writes per key.
//! Any backend failure is reported as `StoreUnavailable`.

pub mod memory;

pub use memory::MemoryStore;

use crate::core::error::Result;
use crate::core::types::{ActionKind, PlayerId, Tick};
use crate::player::{Inventory, PlayerProfile};

pub trait Store: Send + Sync {
    fn profile(&self, id: PlayerId) -> Result<Option<PlayerProfile>>;

    fn put_profile(&self, profile: &PlayerProfile) -> Result<()>;

    /// Every stored profile, in no particular order
    fn profiles(&self) -> Result<Vec<PlayerProfile>>;

    fn cooldown(&self, id: PlayerId, action: ActionKind) -> Result<Option<Tick>>;

    fn put_cooldown(&self, id: PlayerId, action: ActionKind, at: Tick) -> Result<()>;

    fn inventory(&self, id: PlayerId) -> Result<Option<Inventory>>;

    fn put_inventory(&self, id: PlayerId, inventory: &Inventory) -> Result<()>;
}
