//! Game configuration with documented constants
//!
//! All tunable numbers are collected here. Durations are in ticks
//! (one tick = one second of wall time under `SystemClock`).

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::{Result, SlayerError};
use crate::core::types::Tick;

/// How experience is converted into levels after a reward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelingPolicy {
    /// At most one level per reward event, however far past the threshold
    SingleStep,
    /// Keep leveling while `experience >= level * step`
    Iterative,
}

/// Configuration for every game subsystem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === ENCOUNTERS ===
    /// Minimum ticks between two spawns by the same player
    pub spawn_cooldown: Tick,

    /// Ticks an unclaimed encounter stays claimable
    ///
    /// Claimed and expired encounters are kept for the same window so late
    /// claimers get `AlreadyClaimed` instead of "not found".
    pub encounter_expiry: Tick,

    // === COMBAT ===
    /// Ticks a fight waits for the next attack before it is abandoned
    pub combat_input_timeout: Tick,

    /// Player HP at level 0
    pub base_player_hp: u32,

    /// Extra player HP per level
    pub hp_per_level: u32,

    /// Player damage is `roll(1..=player_damage_die) + level`
    pub player_damage_die: u32,

    // === PROGRESSION ===
    /// Experience needed per level: level L advances once `experience >= L * step`
    pub level_step: u64,

    /// Single increment per reward (source behaviour) or iterate to the right level
    pub leveling: LevelingPolicy,

    /// Stamina a freshly registered player starts with
    pub starting_stamina: u64,

    /// Coins a freshly registered player starts with
    pub starting_coins: u64,

    /// Coins granted by the level-0 starter pack
    pub starter_coins: u64,

    /// Stamina granted by the level-0 starter pack
    pub starter_stamina: u64,

    /// Minimum ticks between two stamina claims
    pub claim_stamina_cooldown: Tick,

    /// Upper bound of the stamina claim roll (lower bound is 1)
    pub claim_stamina_max: u32,

    // === EXCHANGE APPROVAL ===
    /// Ticks each pending phase (evidence, approval) may stay open
    pub approval_deadline: Tick,

    /// Smallest exchange amount accepted
    pub exchange_min: u64,

    /// Largest exchange amount accepted
    pub exchange_max: u64,

    /// Minimum ticks between two exchange proposals by the same player
    pub exchange_cooldown: Tick,

    // === HOUSEKEEPING ===
    /// Seconds between two sweeps of expired encounters, fights and requests
    pub sweep_interval_secs: u64,

    /// Default number of rows on the leaderboard
    pub leaderboard_size: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            spawn_cooldown: 15,
            encounter_expiry: 120,

            combat_input_timeout: 60,
            base_player_hp: 100,
            hp_per_level: 10,
            player_damage_die: 20,

            level_step: 100,
            leveling: LevelingPolicy::Iterative,
            starting_stamina: 100,
            starting_coins: 0,
            starter_coins: 100,
            starter_stamina: 100,
            claim_stamina_cooldown: 60,
            claim_stamina_max: 50,

            approval_deadline: 60,
            exchange_min: 1,
            exchange_max: 10_000,
            exchange_cooldown: 30,

            sweep_interval_secs: 5,
            leaderboard_size: 10,
        }
    }
}

impl GameConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document; missing keys fall back to defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: GameConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.encounter_expiry == 0 || self.combat_input_timeout == 0 || self.approval_deadline == 0
        {
            return Err(SlayerError::Config(
                "expiry, combat timeout and approval deadline must be positive".into(),
            ));
        }

        if self.player_damage_die == 0 || self.claim_stamina_max == 0 {
            return Err(SlayerError::Config("dice must have at least one face".into()));
        }

        if self.level_step == 0 {
            return Err(SlayerError::Config("level_step must be positive".into()));
        }

        if self.exchange_min == 0 || self.exchange_min > self.exchange_max {
            return Err(SlayerError::Config(format!(
                "exchange bounds invalid: {}..={}",
                self.exchange_min, self.exchange_max
            )));
        }

        if self.exchange_max > i64::MAX as u64 {
            return Err(SlayerError::Config("exchange_max does not fit a signed delta".into()));
        }

        if self.sweep_interval_secs == 0 {
            return Err(SlayerError::Config("sweep_interval_secs must be positive".into()));
        }

        Ok(())
    }

    /// Player HP at the start of a fight
    pub fn player_max_hp(&self, level: u32) -> i64 {
        self.base_player_hp as i64 + self.hp_per_level as i64 * level as i64
    }
}
