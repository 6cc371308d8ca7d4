//! Static demon roster
//!
//! Ten fixed profiles with spawn weights. Weights sum to 100, so a weight
//! reads directly as a spawn percentage.

use serde::Serialize;

use crate::player::ItemKind;

/// Broad family of a demon; decides the item it drops
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MonsterCategory {
    Lesser,
    Beast,
    Spider,
    LowerMoon,
    UpperMoon,
}

impl MonsterCategory {
    pub fn drop_item(&self) -> ItemKind {
        match self {
            MonsterCategory::Lesser => ItemKind::DemonHorn,
            MonsterCategory::Beast => ItemKind::BeastClaw,
            MonsterCategory::Spider => ItemKind::SpiderThread,
            MonsterCategory::LowerMoon => ItemKind::LowerMoonEye,
            MonsterCategory::UpperMoon => ItemKind::UpperMoonEye,
        }
    }
}

/// How a demon's starting HP is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MonsterHp {
    Fixed(u32),
    /// `base + per_level * claimant level`
    Scaled { base: u32, per_level: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonsterProfile {
    pub name: &'static str,
    pub rank: u8,
    pub category: MonsterCategory,
    pub spawn_weight: u32,
    pub hp: MonsterHp,
    /// Counter-attacks deal `roll(1..=attack)`
    pub attack: u32,
    pub reward_experience: u64,
    pub reward_stamina: u64,
}

impl MonsterProfile {
    pub fn starting_hp(&self, claimant_level: u32) -> i64 {
        match self.hp {
            MonsterHp::Fixed(hp) => hp as i64,
            MonsterHp::Scaled { base, per_level } => {
                base as i64 + per_level as i64 * claimant_level as i64
            }
        }
    }

    pub fn drop_item(&self) -> ItemKind {
        self.category.drop_item()
    }
}

pub const ROSTER: [MonsterProfile; 10] = [
    MonsterProfile {
        name: "Rogue Demon",
        rank: 1,
        category: MonsterCategory::Lesser,
        spawn_weight: 25,
        hp: MonsterHp::Fixed(45),
        attack: 8,
        reward_experience: 30,
        reward_stamina: 10,
    },
    MonsterProfile {
        name: "Swamp Demon",
        rank: 2,
        category: MonsterCategory::Lesser,
        spawn_weight: 18,
        hp: MonsterHp::Fixed(60),
        attack: 10,
        reward_experience: 45,
        reward_stamina: 12,
    },
    MonsterProfile {
        name: "Hand Demon",
        rank: 3,
        category: MonsterCategory::Beast,
        spawn_weight: 14,
        hp: MonsterHp::Fixed(80),
        attack: 12,
        reward_experience: 60,
        reward_stamina: 15,
    },
    MonsterProfile {
        name: "Temari Demon",
        rank: 3,
        category: MonsterCategory::Lesser,
        spawn_weight: 12,
        hp: MonsterHp::Fixed(70),
        attack: 12,
        reward_experience: 55,
        reward_stamina: 14,
    },
    MonsterProfile {
        name: "Arrow Demon",
        rank: 3,
        category: MonsterCategory::Beast,
        spawn_weight: 10,
        hp: MonsterHp::Fixed(70),
        attack: 13,
        reward_experience: 55,
        reward_stamina: 14,
    },
    MonsterProfile {
        name: "Mother Spider Demon",
        rank: 4,
        category: MonsterCategory::Spider,
        spawn_weight: 8,
        hp: MonsterHp::Scaled { base: 60, per_level: 10 },
        attack: 14,
        reward_experience: 80,
        reward_stamina: 20,
    },
    MonsterProfile {
        name: "Father Spider Demon",
        rank: 5,
        category: MonsterCategory::Spider,
        spawn_weight: 6,
        hp: MonsterHp::Scaled { base: 90, per_level: 12 },
        attack: 16,
        reward_experience: 110,
        reward_stamina: 25,
    },
    MonsterProfile {
        name: "Rui, Lower Moon Five",
        rank: 6,
        category: MonsterCategory::LowerMoon,
        spawn_weight: 4,
        hp: MonsterHp::Scaled { base: 120, per_level: 15 },
        attack: 18,
        reward_experience: 150,
        reward_stamina: 30,
    },
    MonsterProfile {
        name: "Enmu, Lower Moon One",
        rank: 7,
        category: MonsterCategory::LowerMoon,
        spawn_weight: 2,
        hp: MonsterHp::Scaled { base: 140, per_level: 15 },
        attack: 20,
        reward_experience: 200,
        reward_stamina: 35,
    },
    MonsterProfile {
        name: "Akaza, Upper Moon Three",
        rank: 9,
        category: MonsterCategory::UpperMoon,
        spawn_weight: 1,
        hp: MonsterHp::Scaled { base: 220, per_level: 20 },
        attack: 26,
        reward_experience: 400,
        reward_stamina: 50,
    },
];

pub fn spawn_weights() -> [u32; 10] {
    ROSTER.map(|m| m.spawn_weight)
}

/// Roster entry for a weighted-draw index (out-of-range maps to the first entry)
pub fn monster_at(index: usize) -> &'static MonsterProfile {
    ROSTER.get(index).unwrap_or(&ROSTER[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_sum_to_100() {
        assert_eq!(spawn_weights().iter().sum::<u32>(), 100);
    }

    #[test]
    fn test_roster_is_sane() {
        for monster in ROSTER.iter() {
            assert!(monster.attack > 0, "{}", monster.name);
            assert!(monster.spawn_weight > 0, "{}", monster.name);
            assert!(monster.starting_hp(0) > 0, "{}", monster.name);
        }
    }

    #[test]
    fn test_rogue_demon_rewards() {
        let rogue = monster_at(0);
        assert_eq!(rogue.name, "Rogue Demon");
        assert_eq!(rogue.reward_experience, 30);
        assert_eq!(rogue.reward_stamina, 10);
        assert_eq!(rogue.drop_item(), ItemKind::DemonHorn);
    }

    #[test]
    fn test_scaled_hp_follows_level() {
        let akaza = monster_at(9);
        assert_eq!(akaza.starting_hp(0), 220);
        assert_eq!(akaza.starting_hp(5), 320);
        assert_eq!(monster_at(0).starting_hp(5), 45);
    }

    #[test]
    fn test_out_of_range_index() {
        assert_eq!(monster_at(42).name, "Rogue Demon");
    }
}
