//! Registration and early-game grants

use crate::core::error::{Resource, Result, SlayerError};
use crate::core::random::Dice;
use crate::core::types::PlayerId;
use crate::ledger::progression::{apply_delta, ProgressionLedger};
use crate::player::{Breathing, ItemKind, PlayerProfile};

impl ProgressionLedger {
    /// Create a profile with the configured starting balances
    pub fn register(&self, player: PlayerId, username: &str) -> Result<PlayerProfile> {
        let profile = self.locks.with(&player, || {
            if self.is_registered(player)? {
                return Err(SlayerError::AlreadyRegistered(player));
            }
            let profile = PlayerProfile::new(
                player,
                username,
                self.config.starting_stamina,
                self.config.starting_coins,
            );
            self.store.put_profile(&profile)?;
            Ok(profile)
        })?;
        tracing::info!(%player, username, "Player registered");
        Ok(profile)
    }

    /// Roll the permanent breathing trait; only the first roll sticks
    pub fn roll_breathing(&self, player: PlayerId, dice: &Dice) -> Result<Breathing> {
        let breathing = self.mutate(player, |p| {
            if p.breathing().is_some() {
                return Err(SlayerError::BreathingAlreadyRolled(player));
            }
            let rolled = Breathing::from_index(dice.weighted_index(&Breathing::weights()));
            p.set_breathing(rolled)?;
            Ok(rolled)
        })?;
        tracing::info!(%player, %breathing, "Breathing rolled");
        Ok(breathing)
    }

    /// Stamina top-up of `roll(1..=claim_stamina_max)`
    ///
    /// Rate limiting is the caller's job (see `CooldownTracker::gate`).
    pub fn claim_stamina(&self, player: PlayerId, dice: &Dice) -> Result<(u64, u64)> {
        let (gain, stamina) = self.mutate(player, |p| {
            let gain = dice.roll(1, self.config.claim_stamina_max) as u64;
            p.stamina = apply_delta(p.stamina, gain as i64, Resource::Stamina)?;
            Ok((gain, p.stamina))
        })?;
        tracing::debug!(%player, gain, stamina, "Stamina claimed");
        Ok((gain, stamina))
    }

    /// One-time level-0 pack: coins, stamina and a beginner sword
    pub fn claim_starter_pack(&self, player: PlayerId) -> Result<PlayerProfile> {
        let coins = self.config.starter_coins;
        let stamina = self.config.starter_stamina;
        let profile = self.mutate_with_inventory(player, |p, inventory| {
            if p.level != 0 || inventory.has(ItemKind::BeginnerSword) {
                return Err(SlayerError::StarterPackUnavailable(player));
            }
            p.coins = apply_delta(p.coins, coins as i64, Resource::Coins)?;
            p.stamina = apply_delta(p.stamina, stamina as i64, Resource::Stamina)?;
            inventory.add(ItemKind::BeginnerSword, 1);
            Ok(p.clone())
        })?;
        tracing::info!(%player, "Starter pack granted");
        Ok(profile)
    }
}
