//! In-memory store with JSON snapshots and failure injection

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SlayerError};
use crate::core::types::{ActionKind, PlayerId, Tick};
use crate::player::{Inventory, PlayerProfile};
use crate::store::Store;

#[derive(Default)]
struct Tables {
    profiles: AHashMap<PlayerId, PlayerProfile>,
    cooldowns: AHashMap<(PlayerId, ActionKind), Tick>,
    inventories: AHashMap<PlayerId, Inventory>,
}

/// On-disk form; tuple keys do not survive as JSON object keys
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    profiles: Vec<PlayerProfile>,
    cooldowns: Vec<(PlayerId, ActionKind, Tick)>,
    inventories: Vec<(PlayerId, Inventory)>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with `StoreUnavailable` (or recover)
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn tables(&self) -> Result<std::sync::MutexGuard<'_, Tables>> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(SlayerError::StoreUnavailable("memory store offline".into()));
        }
        Ok(self.tables.lock().unwrap_or_else(|e| e.into_inner()))
    }

    /// Write every table to a JSON file
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let snapshot = {
            let tables = self.tables()?;
            Snapshot {
                profiles: tables.profiles.values().cloned().collect(),
                cooldowns: tables
                    .cooldowns
                    .iter()
                    .map(|((id, action), at)| (*id, *action, *at))
                    .collect(),
                inventories: tables
                    .inventories
                    .iter()
                    .map(|(id, inv)| (*id, inv.clone()))
                    .collect(),
            }
        };
        let json = serde_json::to_string_pretty(&snapshot)?;
        std::fs::write(path, json)?;
        tracing::info!(path = %path.display(), players = snapshot.profiles.len(), "Saved store snapshot");
        Ok(())
    }

    /// Build a store from a JSON file written by `save_json`
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&content)?;
        let store = Self::new();
        {
            let mut tables = store.tables()?;
            for profile in snapshot.profiles {
                tables.profiles.insert(profile.id, profile);
            }
            for (id, action, at) in snapshot.cooldowns {
                tables.cooldowns.insert((id, action), at);
            }
            for (id, inventory) in snapshot.inventories {
                tables.inventories.insert(id, inventory);
            }
            tracing::info!(path = %path.display(), players = tables.profiles.len(), "Loaded store snapshot");
        }
        Ok(store)
    }
}

impl Store for MemoryStore {
    fn profile(&self, id: PlayerId) -> Result<Option<PlayerProfile>> {
        Ok(self.tables()?.profiles.get(&id).cloned())
    }

    fn put_profile(&self, profile: &PlayerProfile) -> Result<()> {
        self.tables()?.profiles.insert(profile.id, profile.clone());
        Ok(())
    }

    fn profiles(&self) -> Result<Vec<PlayerProfile>> {
        Ok(self.tables()?.profiles.values().cloned().collect())
    }

    fn cooldown(&self, id: PlayerId, action: ActionKind) -> Result<Option<Tick>> {
        Ok(self.tables()?.cooldowns.get(&(id, action)).copied())
    }

    fn put_cooldown(&self, id: PlayerId, action: ActionKind, at: Tick) -> Result<()> {
        self.tables()?.cooldowns.insert((id, action), at);
        Ok(())
    }

    fn inventory(&self, id: PlayerId) -> Result<Option<Inventory>> {
        Ok(self.tables()?.inventories.get(&id).cloned())
    }

    fn put_inventory(&self, id: PlayerId, inventory: &Inventory) -> Result<()> {
        self.tables()?.inventories.insert(id, inventory.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::ItemKind;

    #[test]
    fn test_read_your_writes() {
        let store = MemoryStore::new();
        let profile = PlayerProfile::new(PlayerId(1), "kanao", 100, 0);
        store.put_profile(&profile).unwrap();
        assert_eq!(store.profile(PlayerId(1)).unwrap(), Some(profile));
        assert_eq!(store.profile(PlayerId(2)).unwrap(), None);

        store.put_cooldown(PlayerId(1), ActionKind::SpawnDemon, 42).unwrap();
        assert_eq!(store.cooldown(PlayerId(1), ActionKind::SpawnDemon).unwrap(), Some(42));
        assert_eq!(store.cooldown(PlayerId(1), ActionKind::Exchange).unwrap(), None);
    }

    #[test]
    fn test_unavailable_store_fails_every_call() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        assert!(matches!(
            store.profile(PlayerId(1)),
            Err(SlayerError::StoreUnavailable(_))
        ));
        store.set_unavailable(false);
        assert!(store.profile(PlayerId(1)).is_ok());
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let store = MemoryStore::new();
        store
            .put_profile(&PlayerProfile::new(PlayerId(5), "inosuke", 80, 12))
            .unwrap();
        store.put_cooldown(PlayerId(5), ActionKind::ClaimStamina, 9).unwrap();
        let mut inventory = Inventory::new();
        inventory.add(ItemKind::BeastClaw, 2);
        store.put_inventory(PlayerId(5), &inventory).unwrap();

        let path = std::env::temp_dir().join(format!("slayer-{}.json", uuid::Uuid::new_v4()));
        store.save_json(&path).unwrap();
        let loaded = MemoryStore::load_json(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.profile(PlayerId(5)).unwrap().unwrap().coins, 12);
        assert_eq!(loaded.cooldown(PlayerId(5), ActionKind::ClaimStamina).unwrap(), Some(9));
        assert_eq!(
            loaded.inventory(PlayerId(5)).unwrap().unwrap().count(ItemKind::BeastClaw),
            2
        );
    }
}
