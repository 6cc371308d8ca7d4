//! Progression ledger - the only mutation path for player economy
//!
//! Every operation loads the profile, mutates a copy and writes it back
//! inside the player's critical section. A failed operation writes nothing.

use std::sync::Arc;

use serde::Serialize;

use crate::core::config::{GameConfig, LevelingPolicy};
use crate::core::error::{Resource, Result, SlayerError};
use crate::core::keyed::KeyedLocks;
use crate::core::types::PlayerId;
use crate::player::{Inventory, ItemKind, PlayerProfile};
use crate::store::Store;

/// Result of a combat reward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RewardOutcome {
    pub experience: u64,
    pub stamina: u64,
    pub level: u32,
    pub levels_gained: u32,
}

/// Level after a reward, given the level before it
///
/// Thresholds are cumulative: level L advances once `experience >= L * step`.
pub fn level_after_reward(level: u32, experience: u64, step: u64, policy: LevelingPolicy) -> u32 {
    match policy {
        LevelingPolicy::SingleStep => {
            if experience >= (level as u64).saturating_mul(step) {
                level.saturating_add(1)
            } else {
                level
            }
        }
        LevelingPolicy::Iterative => {
            // First level whose threshold is still out of reach
            let target = experience
                .checked_div(step)
                .map_or(u64::MAX, |full| full.saturating_add(1))
                .min(u32::MAX as u64) as u32;
            level.max(target)
        }
    }
}

/// Add a signed delta to an unsigned balance without going negative
pub(crate) fn apply_delta(current: u64, delta: i64, resource: Resource) -> Result<u64> {
    if delta >= 0 {
        current
            .checked_add(delta as u64)
            .ok_or(SlayerError::ValueOverflow(match resource {
                Resource::Stamina => "stamina",
                Resource::Coins => "coins",
            }))
    } else {
        current
            .checked_sub(delta.unsigned_abs())
            .ok_or(SlayerError::InsufficientResource {
                resource,
                have: current,
                delta,
            })
    }
}

pub struct ProgressionLedger {
    pub(crate) store: Arc<dyn Store>,
    pub(crate) config: Arc<GameConfig>,
    pub(crate) locks: KeyedLocks<PlayerId>,
}

impl ProgressionLedger {
    pub fn new(store: Arc<dyn Store>, config: Arc<GameConfig>) -> Self {
        Self {
            store,
            config,
            locks: KeyedLocks::new(),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Registered profile or `NotRegistered`
    pub fn profile(&self, player: PlayerId) -> Result<PlayerProfile> {
        match self.store.profile(player)? {
            Some(profile) if profile.registered => Ok(profile),
            _ => Err(SlayerError::NotRegistered(player)),
        }
    }

    pub fn is_registered(&self, player: PlayerId) -> Result<bool> {
        Ok(matches!(self.store.profile(player)?, Some(p) if p.registered))
    }

    /// Current inventory (empty if nothing was ever granted)
    pub fn inventory(&self, player: PlayerId) -> Result<Inventory> {
        self.profile(player)?;
        Ok(self.store.inventory(player)?.unwrap_or_default())
    }

    /// Read-modify-write of one profile inside the player's critical section
    pub(crate) fn mutate<R>(
        &self,
        player: PlayerId,
        f: impl FnOnce(&mut PlayerProfile) -> Result<R>,
    ) -> Result<R> {
        self.locks.with(&player, || {
            let mut profile = self.profile(player)?;
            let result = f(&mut profile)?;
            self.store.put_profile(&profile)?;
            Ok(result)
        })
    }

    /// Like `mutate`, but the profile and inventory commit together
    ///
    /// The inventory is written first; if the profile write then fails the
    /// previous inventory is restored.
    pub(crate) fn mutate_with_inventory<R>(
        &self,
        player: PlayerId,
        f: impl FnOnce(&mut PlayerProfile, &mut Inventory) -> Result<R>,
    ) -> Result<R> {
        self.locks.with(&player, || {
            let mut profile = self.profile(player)?;
            let before = self.store.inventory(player)?;
            let mut inventory = before.clone().unwrap_or_default();
            let result = f(&mut profile, &mut inventory)?;

            self.store.put_inventory(player, &inventory)?;
            if let Err(e) = self.store.put_profile(&profile) {
                let restore = before.unwrap_or_default();
                if let Err(restore_err) = self.store.put_inventory(player, &restore) {
                    tracing::warn!(%player, error = %restore_err, "Failed to restore inventory after profile write error");
                }
                return Err(e);
            }
            Ok(result)
        })
    }

    /// Add `delta` stamina; fails without side effects if the result would be negative
    pub fn apply_stamina_delta(&self, player: PlayerId, delta: i64) -> Result<u64> {
        let stamina = self.mutate(player, |p| {
            p.stamina = apply_delta(p.stamina, delta, Resource::Stamina)?;
            Ok(p.stamina)
        })?;
        tracing::debug!(%player, delta, stamina, "Stamina updated");
        Ok(stamina)
    }

    /// Add `delta` coins; fails without side effects if the result would be negative
    pub fn apply_coins_delta(&self, player: PlayerId, delta: i64) -> Result<u64> {
        let coins = self.mutate(player, |p| {
            p.coins = apply_delta(p.coins, delta, Resource::Coins)?;
            Ok(p.coins)
        })?;
        tracing::debug!(%player, delta, coins, "Coins updated");
        Ok(coins)
    }

    /// Deduct `cost` coins if the player can afford it
    pub fn spend(&self, player: PlayerId, cost: u64) -> Result<u64> {
        let coins = self.mutate(player, |p| debit(p, cost))?;
        tracing::debug!(%player, cost, coins, "Coins spent");
        Ok(coins)
    }

    /// Grant experience and stamina, then re-evaluate the level
    pub fn apply_combat_reward(
        &self,
        player: PlayerId,
        exp_gain: u64,
        stamina_gain: u64,
    ) -> Result<RewardOutcome> {
        let outcome = self.mutate(player, |p| self.reward(p, exp_gain, stamina_gain))?;
        self.log_reward(player, exp_gain, &outcome);
        Ok(outcome)
    }

    /// Combat reward plus an item drop, committed as one step
    pub fn award_victory(
        &self,
        player: PlayerId,
        exp_gain: u64,
        stamina_gain: u64,
        drop: ItemKind,
    ) -> Result<RewardOutcome> {
        let outcome = self.mutate_with_inventory(player, |p, inventory| {
            let outcome = self.reward(p, exp_gain, stamina_gain)?;
            inventory.add(drop, 1);
            Ok(outcome)
        })?;
        self.log_reward(player, exp_gain, &outcome);
        Ok(outcome)
    }

    fn reward(&self, p: &mut PlayerProfile, exp_gain: u64, stamina_gain: u64) -> Result<RewardOutcome> {
        p.experience = p
            .experience
            .checked_add(exp_gain)
            .ok_or(SlayerError::ValueOverflow("experience"))?;
        p.stamina = p
            .stamina
            .checked_add(stamina_gain)
            .ok_or(SlayerError::ValueOverflow("stamina"))?;

        let before = p.level;
        p.level = level_after_reward(p.level, p.experience, self.config.level_step, self.config.leveling);

        Ok(RewardOutcome {
            experience: p.experience,
            stamina: p.stamina,
            level: p.level,
            levels_gained: p.level - before,
        })
    }

    fn log_reward(&self, player: PlayerId, exp_gain: u64, outcome: &RewardOutcome) {
        if outcome.levels_gained > 0 {
            tracing::info!(%player, level = outcome.level, gained = outcome.levels_gained, "Level up");
        }
        tracing::debug!(%player, exp_gain, experience = outcome.experience, "Combat reward applied");
    }
}

pub(crate) fn debit(p: &mut PlayerProfile, cost: u64) -> Result<u64> {
    p.coins = p.coins.checked_sub(cost).ok_or(SlayerError::InsufficientFunds {
        have: p.coins,
        cost,
    })?;
    Ok(p.coins)
}
