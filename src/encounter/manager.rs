//! Encounter spawning and first-claim-wins arbitration

use std::sync::{Arc, Mutex};

use ahash::AHashMap;
use serde::Serialize;

use crate::combat::{CombatArena, CombatSession};
use crate::cooldown::CooldownTracker;
use crate::core::config::GameConfig;
use crate::core::error::{Result, SlayerError};
use crate::core::random::Dice;
use crate::core::types::{ActionKind, EncounterId, PlayerId, SessionId, Tick};
use crate::encounter::monster::{monster_at, spawn_weights, MonsterProfile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EncounterStatus {
    Open,
    Claimed,
    Expired,
}

#[derive(Debug, Clone, Serialize)]
pub struct Encounter {
    pub id: EncounterId,
    pub monster: &'static MonsterProfile,
    pub spawned_by: PlayerId,
    pub created_at: Tick,
    pub expires_at: Tick,
    pub status: EncounterStatus,
    pub claimed_by: Option<PlayerId>,
    pub session: Option<SessionId>,
}

impl Encounter {
    pub fn is_claimable(&self, now: Tick) -> bool {
        self.status == EncounterStatus::Open && now < self.expires_at
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EncounterSweep {
    pub expired: Vec<EncounterId>,
    pub purged: usize,
}

pub struct EncounterManager {
    cooldowns: Arc<CooldownTracker>,
    dice: Arc<Dice>,
    arena: Arc<CombatArena>,
    config: Arc<GameConfig>,
    encounters: Mutex<AHashMap<EncounterId, Encounter>>,
}

impl EncounterManager {
    pub fn new(
        cooldowns: Arc<CooldownTracker>,
        dice: Arc<Dice>,
        arena: Arc<CombatArena>,
        config: Arc<GameConfig>,
    ) -> Self {
        Self {
            cooldowns,
            dice,
            arena,
            config,
            encounters: Mutex::new(AHashMap::new()),
        }
    }

    fn encounters(&self) -> std::sync::MutexGuard<'_, AHashMap<EncounterId, Encounter>> {
        self.encounters.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Spawn a demon for everyone to see, rate limited per triggering player
    pub fn spawn(&self, player: PlayerId, now: Tick) -> Result<Encounter> {
        let encounter = self.cooldowns.gate(
            player,
            ActionKind::SpawnDemon,
            self.config.spawn_cooldown,
            now,
            || {
                let monster = monster_at(self.dice.weighted_index(&spawn_weights()));
                Ok(Encounter {
                    id: EncounterId::new(),
                    monster,
                    spawned_by: player,
                    created_at: now,
                    expires_at: now.saturating_add(self.config.encounter_expiry),
                    status: EncounterStatus::Open,
                    claimed_by: None,
                    session: None,
                })
            },
        )?;

        self.encounters().insert(encounter.id, encounter.clone());
        tracing::info!(
            encounter = %encounter.id,
            %player,
            monster = encounter.monster.name,
            rank = encounter.monster.rank,
            "Demon spawned"
        );
        Ok(encounter)
    }

    /// Claim an open encounter and start the fight
    ///
    /// The status check, the fight creation and the `Claimed` transition
    /// happen under one lock; of any number of simultaneous claims exactly
    /// one can succeed. If the fight cannot start (claimant busy or not
    /// registered) the encounter stays open for others.
    pub fn claim(&self, id: EncounterId, player: PlayerId, now: Tick) -> Result<(Encounter, CombatSession)> {
        let mut encounters = self.encounters();
        let encounter = encounters
            .get_mut(&id)
            .ok_or(SlayerError::EncounterNotFound(id))?;

        // Anything no longer open is reported as claimed; the log keeps the reason
        match encounter.status {
            EncounterStatus::Claimed => return Err(SlayerError::AlreadyClaimed(id)),
            EncounterStatus::Expired => {
                tracing::debug!(encounter = %id, %player, "Claim on expired encounter");
                return Err(SlayerError::AlreadyClaimed(id));
            }
            EncounterStatus::Open if now >= encounter.expires_at => {
                encounter.status = EncounterStatus::Expired;
                tracing::info!(encounter = %id, %player, "Encounter expired before claim");
                return Err(SlayerError::AlreadyClaimed(id));
            }
            EncounterStatus::Open => {}
        }

        let session = self.arena.open(id, player, encounter.monster, now)?;
        encounter.status = EncounterStatus::Claimed;
        encounter.claimed_by = Some(player);
        encounter.session = Some(session.id);

        tracing::info!(encounter = %id, %player, session = %session.id, "Encounter claimed");
        Ok((encounter.clone(), session))
    }

    /// Expire unclaimed encounters and drop settled ones after a further window
    pub fn sweep(&self, now: Tick) -> EncounterSweep {
        let mut encounters = self.encounters();
        let mut report = EncounterSweep::default();

        for encounter in encounters.values_mut() {
            if encounter.status == EncounterStatus::Open && now >= encounter.expires_at {
                encounter.status = EncounterStatus::Expired;
                report.expired.push(encounter.id);
            }
        }

        let retention = self.config.encounter_expiry;
        let before = encounters.len();
        encounters.retain(|_, e| {
            e.status == EncounterStatus::Open || now < e.expires_at.saturating_add(retention)
        });
        report.purged = before - encounters.len();

        if !report.expired.is_empty() {
            tracing::info!(count = report.expired.len(), "Unclaimed demons vanished");
        }
        report
    }

    pub fn get(&self, id: EncounterId) -> Option<Encounter> {
        self.encounters().get(&id).cloned()
    }

    /// The single encounter `reference` points at (full id or short prefix)
    pub fn resolve(&self, reference: &str) -> Result<EncounterId> {
        let encounters = self.encounters();
        let mut matches = encounters.keys().filter(|id| id.matches_ref(reference));
        match (matches.next(), matches.next()) {
            (Some(id), None) => Ok(*id),
            _ => Err(SlayerError::UnknownReference(reference.to_string())),
        }
    }

    /// Claimable encounters, oldest first
    pub fn open_encounters(&self, now: Tick) -> Vec<Encounter> {
        let mut open: Vec<_> = self
            .encounters()
            .values()
            .filter(|e| e.is_claimable(now))
            .cloned()
            .collect();
        open.sort_by_key(|e| e.created_at);
        open
    }

    /// Most recently spawned claimable encounter
    pub fn latest_open(&self, now: Tick) -> Option<Encounter> {
        self.open_encounters(now).pop()
    }
}
