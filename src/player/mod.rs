pub mod inventory;
pub mod profile;

pub use inventory::{Inventory, ItemKind};
pub use profile::{Breathing, PlayerProfile};
