//! Player profile record and the breathing trait table

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SlayerError};
use crate::core::types::PlayerId;

/// Permanent combat style a player rolls once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Breathing {
    Water,
    Thunder,
    Beast,
    Mist,
    Sun,
}

impl Breathing {
    /// Roll table: (trait, weight). Weights sum to 100.
    pub const TABLE: [(Breathing, u32); 5] = [
        (Breathing::Water, 50),
        (Breathing::Thunder, 20),
        (Breathing::Beast, 15),
        (Breathing::Mist, 10),
        (Breathing::Sun, 5),
    ];

    pub fn weights() -> [u32; 5] {
        Self::TABLE.map(|(_, w)| w)
    }

    pub fn from_index(index: usize) -> Breathing {
        Self::TABLE
            .get(index)
            .map(|(b, _)| *b)
            .unwrap_or(Breathing::Water)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Breathing::Water => "Water Breathing",
            Breathing::Thunder => "Thunder Breathing",
            Breathing::Beast => "Beast Breathing",
            Breathing::Mist => "Mist Breathing",
            Breathing::Sun => "Sun Breathing",
        }
    }
}

impl std::fmt::Display for Breathing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Persistent per-player record
///
/// Numeric fields are unsigned so negativity is unrepresentable; the
/// ledger is the only writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub id: PlayerId,
    pub username: String,
    pub level: u32,
    pub experience: u64,
    pub stamina: u64,
    pub coins: u64,
    breathing: Option<Breathing>,
    pub registered: bool,
}

impl PlayerProfile {
    /// Fresh profile as created by registration
    pub fn new(id: PlayerId, username: impl Into<String>, stamina: u64, coins: u64) -> Self {
        Self {
            id,
            username: username.into(),
            level: 0,
            experience: 0,
            stamina,
            coins,
            breathing: None,
            registered: true,
        }
    }

    pub fn breathing(&self) -> Option<Breathing> {
        self.breathing
    }

    /// Set the breathing trait; it can never be replaced
    pub fn set_breathing(&mut self, breathing: Breathing) -> Result<()> {
        if self.breathing.is_some() {
            return Err(SlayerError::BreathingAlreadyRolled(self.id));
        }
        self.breathing = Some(breathing);
        Ok(())
    }
}
