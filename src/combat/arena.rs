//! Registry of combat sessions
//!
//! Sessions are keyed by id, with a second index from claimant to their
//! active session. That index is what enforces one live fight per player;
//! there is no global "fight in progress" flag.

use std::sync::{Arc, Mutex};

use ahash::AHashMap;
use serde::Serialize;

use crate::combat::session::{CombatSession, Round, SessionStatus};
use crate::core::config::GameConfig;
use crate::core::error::{Result, SlayerError};
use crate::core::random::Dice;
use crate::core::types::{EncounterId, PlayerId, SessionId, Tick};
use crate::encounter::MonsterProfile;
use crate::ledger::{ProgressionLedger, RewardOutcome};
use crate::player::ItemKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VictoryReward {
    pub experience_gained: u64,
    pub stamina_gained: u64,
    pub item: ItemKind,
    pub outcome: RewardOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttackReport {
    pub session: SessionId,
    pub monster: &'static str,
    pub round: Round,
    pub reward: Option<VictoryReward>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArenaSweep {
    pub abandoned: Vec<SessionId>,
    pub purged: usize,
}

#[derive(Default)]
struct ArenaState {
    sessions: AHashMap<SessionId, CombatSession>,
    active: AHashMap<PlayerId, SessionId>,
}

pub struct CombatArena {
    ledger: Arc<ProgressionLedger>,
    dice: Arc<Dice>,
    config: Arc<GameConfig>,
    state: Mutex<ArenaState>,
}

impl CombatArena {
    pub fn new(ledger: Arc<ProgressionLedger>, dice: Arc<Dice>, config: Arc<GameConfig>) -> Self {
        Self {
            ledger,
            dice,
            config,
            state: Mutex::new(ArenaState::default()),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, ArenaState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Start a fight for `claimant`, unless they already have one running
    pub fn open(
        &self,
        encounter: EncounterId,
        claimant: PlayerId,
        monster: &'static MonsterProfile,
        now: Tick,
    ) -> Result<CombatSession> {
        let level = self.ledger.profile(claimant)?.level;

        let mut guard = self.state();
        let ArenaState { sessions, active } = &mut *guard;

        if let Some(current) = active.get(&claimant).copied() {
            if let Some(session) = sessions.get_mut(&current) {
                if !session.expire_if_idle(now) && session.is_active() {
                    return Err(SlayerError::FightInProgress(claimant));
                }
                tracing::info!(session = %current, player = %claimant, "Stale fight abandoned");
            }
            active.remove(&claimant);
        }

        let session = CombatSession::new(encounter, claimant, monster, level, now, &self.config);
        active.insert(claimant, session.id);
        sessions.insert(session.id, session.clone());

        tracing::info!(
            session = %session.id,
            player = %claimant,
            monster = monster.name,
            player_hp = session.player_hp,
            monster_hp = session.monster_hp,
            "Fight started"
        );
        Ok(session)
    }

    /// Resolve one attack; a winning blow pays out before the session commits
    ///
    /// If the payout fails the session stays exactly as it was.
    pub fn attack(&self, session_id: SessionId, player: PlayerId, now: Tick) -> Result<AttackReport> {
        let mut guard = self.state();
        let ArenaState { sessions, active } = &mut *guard;

        let session = sessions
            .get_mut(&session_id)
            .ok_or(SlayerError::SessionNotFound(session_id))?;

        if session.expire_if_idle(now) {
            active.remove(&session.claimant);
            tracing::info!(session = %session_id, "Fight abandoned on late input");
            return Err(SlayerError::SessionClosed(session_id));
        }

        let mut next = session.clone();
        let round = next.resolve_attack(player, now, &self.dice, self.config.player_damage_die)?;

        let reward = if round.status == SessionStatus::Won {
            let monster = next.monster;
            let item = monster.drop_item();
            let outcome = self.ledger.award_victory(
                player,
                monster.reward_experience,
                monster.reward_stamina,
                item,
            )?;
            Some(VictoryReward {
                experience_gained: monster.reward_experience,
                stamina_gained: monster.reward_stamina,
                item,
                outcome,
            })
        } else {
            None
        };

        let monster = next.monster.name;
        *session = next;
        if round.status.is_terminal() {
            active.remove(&player);
        }

        match round.status {
            SessionStatus::Won => {
                tracing::info!(session = %session_id, %player, monster, rounds = round.number, "Demon slain")
            }
            SessionStatus::Lost => {
                tracing::info!(session = %session_id, %player, monster, rounds = round.number, "Slayer defeated")
            }
            _ => tracing::debug!(
                session = %session_id,
                player_hp = round.player_hp,
                monster_hp = round.monster_hp,
                "Round resolved"
            ),
        }

        Ok(AttackReport {
            session: session_id,
            monster,
            round,
            reward,
        })
    }

    /// Abandon idle fights and forget closed ones past their retention window
    pub fn sweep(&self, now: Tick) -> ArenaSweep {
        let mut guard = self.state();
        let ArenaState { sessions, active } = &mut *guard;
        let mut report = ArenaSweep::default();

        for session in sessions.values_mut() {
            if session.expire_if_idle(now) {
                active.remove(&session.claimant);
                report.abandoned.push(session.id);
            }
        }

        let retention = self.config.combat_input_timeout;
        let before = sessions.len();
        sessions.retain(|_, s| match s.closed_at {
            Some(closed) => closed.saturating_add(retention) > now,
            None => true,
        });
        report.purged = before - sessions.len();

        if !report.abandoned.is_empty() {
            tracing::info!(count = report.abandoned.len(), "Idle fights abandoned");
        }
        report
    }

    pub fn session(&self, id: SessionId) -> Option<CombatSession> {
        self.state().sessions.get(&id).cloned()
    }

    /// The claimant's running fight, if any
    pub fn active_session(&self, player: PlayerId) -> Option<CombatSession> {
        let state = self.state();
        state
            .active
            .get(&player)
            .and_then(|id| state.sessions.get(id))
            .filter(|s| s.is_active())
            .cloned()
    }

    pub fn active_count(&self) -> usize {
        self.state().active.len()
    }
}
