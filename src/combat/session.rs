//! Combat session state machine
//!
//! `Active -> Won | Lost` on an HP crossing, `Active -> Abandoned` when the
//! claimant stops attacking for longer than the input timeout. Terminal
//! states absorb every further input.

use serde::Serialize;

use crate::core::config::GameConfig;
use crate::core::error::{Result, SlayerError};
use crate::core::random::Dice;
use crate::core::types::{EncounterId, PlayerId, SessionId, Tick};
use crate::encounter::MonsterProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionStatus {
    Active,
    Won,
    Lost,
    Abandoned,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionStatus::Active)
    }
}

/// One exchange of blows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Round {
    pub number: u32,
    pub player_damage: u32,
    /// `None` when the player's blow was lethal
    pub monster_damage: Option<u32>,
    pub player_hp: i64,
    pub monster_hp: i64,
    pub status: SessionStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct CombatSession {
    pub id: SessionId,
    pub encounter: EncounterId,
    pub claimant: PlayerId,
    pub monster: &'static MonsterProfile,
    pub player_level: u32,
    pub player_hp: i64,
    pub player_max_hp: i64,
    pub monster_hp: i64,
    pub monster_max_hp: i64,
    pub status: SessionStatus,
    pub rounds: u32,
    pub last_input_at: Tick,
    pub input_timeout: Tick,
    pub closed_at: Option<Tick>,
}

impl CombatSession {
    pub fn new(
        encounter: EncounterId,
        claimant: PlayerId,
        monster: &'static MonsterProfile,
        player_level: u32,
        now: Tick,
        config: &GameConfig,
    ) -> Self {
        let player_max_hp = config.player_max_hp(player_level);
        let monster_max_hp = monster.starting_hp(player_level);
        Self {
            id: SessionId::new(),
            encounter,
            claimant,
            monster,
            player_level,
            player_hp: player_max_hp,
            player_max_hp,
            monster_hp: monster_max_hp,
            monster_max_hp,
            status: SessionStatus::Active,
            rounds: 0,
            last_input_at: now,
            input_timeout: config.combat_input_timeout,
            closed_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// Last tick at which an attack is still accepted
    pub fn deadline(&self) -> Tick {
        self.last_input_at.saturating_add(self.input_timeout)
    }

    /// Abandon the fight if the input deadline has passed; true if this call closed it
    pub fn expire_if_idle(&mut self, now: Tick) -> bool {
        if self.is_active() && now > self.deadline() {
            self.close(SessionStatus::Abandoned, now);
            return true;
        }
        false
    }

    fn close(&mut self, status: SessionStatus, now: Tick) {
        self.status = status;
        self.closed_at = Some(now);
    }

    /// Resolve one attack by `player`
    ///
    /// The player strikes first; a lethal blow ends the fight before the
    /// demon can counter.
    pub fn resolve_attack(
        &mut self,
        player: PlayerId,
        now: Tick,
        dice: &Dice,
        damage_die: u32,
    ) -> Result<Round> {
        if self.status.is_terminal() || now > self.deadline() {
            return Err(SlayerError::SessionClosed(self.id));
        }
        if player != self.claimant {
            return Err(SlayerError::NotParticipant {
                player,
                session: self.id,
            });
        }

        self.rounds += 1;
        self.last_input_at = now;

        let player_damage = dice.roll(1, damage_die).saturating_add(self.player_level);
        self.monster_hp -= player_damage as i64;
        if self.monster_hp <= 0 {
            self.close(SessionStatus::Won, now);
            return Ok(self.round(player_damage, None));
        }

        let monster_damage = dice.roll(1, self.monster.attack);
        self.player_hp -= monster_damage as i64;
        if self.player_hp <= 0 {
            self.close(SessionStatus::Lost, now);
        }
        Ok(self.round(player_damage, Some(monster_damage)))
    }

    fn round(&self, player_damage: u32, monster_damage: Option<u32>) -> Round {
        Round {
            number: self.rounds,
            player_damage,
            monster_damage,
            player_hp: self.player_hp,
            monster_hp: self.monster_hp,
            status: self.status,
        }
    }
}
