//! Inventory - per-player item counts

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Everything a player can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    BeginnerSword,
    Sword,
    StaminaPotion,
    ExpBoost,
    DemonHorn,
    BeastClaw,
    SpiderThread,
    LowerMoonEye,
    UpperMoonEye,
}

impl ItemKind {
    pub fn name(&self) -> &'static str {
        match self {
            ItemKind::BeginnerSword => "Beginner Sword",
            ItemKind::Sword => "Sword",
            ItemKind::StaminaPotion => "Stamina Potion",
            ItemKind::ExpBoost => "EXP Boost",
            ItemKind::DemonHorn => "Demon Horn",
            ItemKind::BeastClaw => "Beast Claw",
            ItemKind::SpiderThread => "Spider Thread",
            ItemKind::LowerMoonEye => "Lower Moon Eye",
            ItemKind::UpperMoonEye => "Upper Moon Eye",
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    items: AHashMap<ItemKind, u32>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, item: ItemKind) -> u32 {
        self.items.get(&item).copied().unwrap_or(0)
    }

    pub fn has(&self, item: ItemKind) -> bool {
        self.count(item) > 0
    }

    /// Add items, saturating at `u32::MAX`
    pub fn add(&mut self, item: ItemKind, amount: u32) {
        let entry = self.items.entry(item).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    /// Non-empty stacks in a stable order
    pub fn stacks(&self) -> Vec<(ItemKind, u32)> {
        let mut stacks: Vec<_> = self
            .items
            .iter()
            .filter(|(_, n)| **n > 0)
            .map(|(k, n)| (*k, *n))
            .collect();
        stacks.sort();
        stacks
    }

    pub fn is_empty(&self) -> bool {
        self.items.values().all(|n| *n == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inventory_add_and_count() {
        let mut inventory = Inventory::new();
        assert!(inventory.is_empty());
        inventory.add(ItemKind::Sword, 2);
        inventory.add(ItemKind::Sword, 1);
        inventory.add(ItemKind::DemonHorn, 1);
        assert_eq!(inventory.count(ItemKind::Sword), 3);
        assert!(inventory.has(ItemKind::DemonHorn));
        assert!(!inventory.has(ItemKind::ExpBoost));
    }

    #[test]
    fn test_stacks_sorted() {
        let mut inventory = Inventory::new();
        inventory.add(ItemKind::UpperMoonEye, 1);
        inventory.add(ItemKind::BeginnerSword, 1);
        assert_eq!(
            inventory.stacks(),
            vec![(ItemKind::BeginnerSword, 1), (ItemKind::UpperMoonEye, 1)]
        );
    }

    #[test]
    fn test_inventory_json_roundtrip_keys() {
        let mut inventory = Inventory::new();
        inventory.add(ItemKind::StaminaPotion, 4);
        let json = serde_json::to_string(&inventory).unwrap();
        assert!(json.contains("stamina_potion"));
        let back: Inventory = serde_json::from_str(&json).unwrap();
        assert_eq!(back, inventory);
    }
}
