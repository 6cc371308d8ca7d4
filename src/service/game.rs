//! Service façade
//!
//! Stamps every operation with the service clock and checks registration
//! before rate-limited actions so a rejected command never burns a cooldown.

use std::sync::Arc;

use serde::Serialize;

use crate::combat::{ArenaSweep, AttackReport, CombatArena, CombatSession};
use crate::confirm::{ApprovalRequest, ConfirmationWorkflow, ExchangeDirection, RequestSweep};
use crate::cooldown::CooldownTracker;
use crate::core::clock::Clock;
use crate::core::config::GameConfig;
use crate::core::error::{Result, SlayerError};
use crate::core::random::Dice;
use crate::core::types::{ActionKind, EncounterId, PlayerId, RequestId, Tick};
use crate::encounter::{Encounter, EncounterManager, EncounterSweep};
use crate::ledger::{ProgressionLedger, Purchase, Standing};
use crate::player::{Breathing, Inventory, PlayerProfile};
use crate::store::Store;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub at: Tick,
    pub encounters: EncounterSweep,
    pub fights: ArenaSweep,
    pub requests: RequestSweep,
}

impl SweepReport {
    pub fn is_quiet(&self) -> bool {
        self.encounters.expired.is_empty()
            && self.fights.abandoned.is_empty()
            && self.requests.expired.is_empty()
    }
}

pub struct GameService {
    config: Arc<GameConfig>,
    clock: Arc<dyn Clock>,
    dice: Arc<Dice>,
    ledger: Arc<ProgressionLedger>,
    cooldowns: Arc<CooldownTracker>,
    arena: Arc<CombatArena>,
    encounters: EncounterManager,
    workflow: ConfirmationWorkflow,
}

impl GameService {
    pub fn new(
        config: GameConfig,
        store: Arc<dyn Store>,
        clock: Arc<dyn Clock>,
        dice: Dice,
    ) -> Result<Self> {
        config.validate()?;
        let config = Arc::new(config);
        let dice = Arc::new(dice);
        let ledger = Arc::new(ProgressionLedger::new(store.clone(), config.clone()));
        let cooldowns = Arc::new(CooldownTracker::new(store));
        let arena = Arc::new(CombatArena::new(ledger.clone(), dice.clone(), config.clone()));
        let encounters =
            EncounterManager::new(cooldowns.clone(), dice.clone(), arena.clone(), config.clone());
        let workflow = ConfirmationWorkflow::new(ledger.clone(), config.clone());

        Ok(Self {
            config,
            clock,
            dice,
            ledger,
            cooldowns,
            arena,
            encounters,
            workflow,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn now(&self) -> Tick {
        self.clock.now()
    }

    pub fn ledger(&self) -> &ProgressionLedger {
        &self.ledger
    }

    pub fn arena(&self) -> &CombatArena {
        &self.arena
    }

    pub fn encounters(&self) -> &EncounterManager {
        &self.encounters
    }

    pub fn workflow(&self) -> &ConfirmationWorkflow {
        &self.workflow
    }

    fn require_registered(&self, player: PlayerId) -> Result<()> {
        self.ledger.profile(player).map(|_| ())
    }

    // === PLAYER RECORD ===

    pub fn register(&self, player: PlayerId, username: &str) -> Result<PlayerProfile> {
        self.ledger.register(player, username)
    }

    pub fn roll_breathing(&self, player: PlayerId) -> Result<Breathing> {
        self.ledger.roll_breathing(player, &self.dice)
    }

    pub fn status(&self, player: PlayerId) -> Result<(PlayerProfile, Inventory)> {
        Ok((self.ledger.profile(player)?, self.ledger.inventory(player)?))
    }

    pub fn claim_stamina(&self, player: PlayerId) -> Result<(u64, u64)> {
        self.require_registered(player)?;
        self.cooldowns.gate(
            player,
            ActionKind::ClaimStamina,
            self.config.claim_stamina_cooldown,
            self.now(),
            || self.ledger.claim_stamina(player, &self.dice),
        )
    }

    pub fn claim_starter_pack(&self, player: PlayerId) -> Result<PlayerProfile> {
        self.ledger.claim_starter_pack(player)
    }

    pub fn buy(&self, player: PlayerId, item_number: u32, quantity: i64) -> Result<Purchase> {
        self.ledger.buy(player, item_number, quantity)
    }

    pub fn leaderboard(&self) -> Result<Vec<Standing>> {
        self.ledger.leaderboard(self.config.leaderboard_size)
    }

    // === ENCOUNTERS & COMBAT ===

    pub fn spawn(&self, player: PlayerId) -> Result<Encounter> {
        self.require_registered(player)?;
        self.encounters.spawn(player, self.now())
    }

    /// Claim `encounter`, or the newest claimable one when `None`
    pub fn claim(
        &self,
        encounter: Option<EncounterId>,
        player: PlayerId,
    ) -> Result<(Encounter, CombatSession)> {
        let now = self.now();
        let id = match encounter {
            Some(id) => id,
            None => self
                .encounters
                .latest_open(now)
                .map(|e| e.id)
                .ok_or(SlayerError::NoOpenEncounter)?,
        };
        self.encounters.claim(id, player, now)
    }

    /// Attack in the player's current fight
    pub fn attack(&self, player: PlayerId) -> Result<AttackReport> {
        self.require_registered(player)?;
        let session = self
            .arena
            .active_session(player)
            .ok_or(SlayerError::NoActiveFight(player))?;
        self.arena.attack(session.id, player, self.now())
    }

    // === EXCHANGES ===

    pub fn propose_exchange(
        &self,
        player: PlayerId,
        amount: i64,
        direction: ExchangeDirection,
        requires_evidence: bool,
    ) -> Result<ApprovalRequest> {
        self.require_registered(player)?;
        let now = self.now();
        self.cooldowns.gate(
            player,
            ActionKind::Exchange,
            self.config.exchange_cooldown,
            now,
            || self.workflow.propose(player, amount, direction, requires_evidence, now),
        )
    }

    pub fn submit_evidence(
        &self,
        request: RequestId,
        player: PlayerId,
        evidence: &str,
    ) -> Result<ApprovalRequest> {
        self.workflow.submit_evidence(request, player, evidence, self.now())
    }

    pub fn decide(
        &self,
        request: RequestId,
        approver: PlayerId,
        approved: bool,
        is_authorized: bool,
    ) -> Result<ApprovalRequest> {
        self.workflow
            .decide(request, approver, approved, is_authorized, self.now())
    }

    pub fn pending_requests(&self) -> Vec<ApprovalRequest> {
        self.workflow.pending_approval(self.now())
    }

    // === HOUSEKEEPING ===

    /// Release every entity whose deadline has passed
    pub fn sweep(&self) -> SweepReport {
        let at = self.now();
        let report = SweepReport {
            at,
            encounters: self.encounters.sweep(at),
            fights: self.arena.sweep(at),
            requests: self.workflow.sweep(at),
        };
        if !report.is_quiet() {
            tracing::debug!(
                at,
                encounters = report.encounters.expired.len(),
                fights = report.fights.abandoned.len(),
                requests = report.requests.expired.len(),
                "Sweep released pending state"
            );
        }
        report
    }
}
