//! Spawned demons and who gets to fight them

pub mod manager;
pub mod monster;

pub use manager::{Encounter, EncounterManager, EncounterStatus, EncounterSweep};
pub use monster::{monster_at, spawn_weights, MonsterCategory, MonsterHp, MonsterProfile, ROSTER};
