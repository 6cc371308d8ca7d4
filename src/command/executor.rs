//! Command execution - runs a parsed command against the game service

use crate::command::parser::Command;
use crate::command::reply::Reply;
use crate::core::error::Result;
use crate::core::types::PlayerId;
use crate::ledger::PRICE_LIST;
use crate::service::GameService;

/// Who issued a command, as vouched for by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoker {
    pub player: PlayerId,
    pub username: String,
    /// May approve or reject exchange requests
    pub is_admin: bool,
}

impl Invoker {
    pub fn new(player: PlayerId, username: impl Into<String>) -> Self {
        Self {
            player,
            username: username.into(),
            is_admin: false,
        }
    }

    pub fn admin(mut self) -> Self {
        self.is_admin = true;
        self
    }
}

/// Execute a command; failures come back as `Reply::Failure`
pub fn execute(service: &GameService, invoker: &Invoker, command: Command) -> Reply {
    let result = run(service, invoker, command);
    if let Err(e) = &result {
        tracing::debug!(player = %invoker.player, error = %e, "Command rejected");
    }
    result.unwrap_or_else(Reply::from)
}

fn run(service: &GameService, invoker: &Invoker, command: Command) -> Result<Reply> {
    let player = invoker.player;

    let reply = match command {
        Command::Register => Reply::Registered {
            profile: service.register(player, &invoker.username)?,
        },
        Command::RollBreathing => Reply::BreathingRolled {
            breathing: service.roll_breathing(player)?,
        },
        Command::Status => {
            let (profile, inventory) = service.status(player)?;
            Reply::Status {
                breathing: profile.breathing(),
                profile,
                items: inventory.stacks(),
            }
        }
        Command::ClaimStamina => {
            let (gained, stamina) = service.claim_stamina(player)?;
            Reply::StaminaClaimed { gained, stamina }
        }
        Command::StarterPack => Reply::StarterPack {
            profile: service.claim_starter_pack(player)?,
        },
        Command::PriceList => Reply::PriceList {
            items: PRICE_LIST.to_vec(),
        },
        Command::Buy { item, quantity } => Reply::Purchased {
            purchase: service.buy(player, item, quantity)?,
        },
        Command::Leaderboard => Reply::Leaderboard {
            standings: service.leaderboard()?,
        },
        Command::Spawn => Reply::Spawned {
            encounter: service.spawn(player)?,
        },
        Command::Fight { encounter } => {
            let id = encounter
                .map(|reference| service.encounters().resolve(&reference))
                .transpose()?;
            let (encounter, session) = service.claim(id, player)?;
            Reply::FightStarted { encounter, session }
        }
        Command::Attack => Reply::Attacked {
            report: service.attack(player)?,
        },
        Command::Exchange {
            direction,
            amount,
            evidence,
        } => {
            let mut request = service.propose_exchange(player, amount, direction, true)?;
            if let Some(evidence) = evidence {
                request = service.submit_evidence(request.id, player, &evidence)?;
            }
            Reply::Exchange { request }
        }
        Command::Evidence { request, evidence } => {
            let id = service.workflow().resolve(&request)?;
            Reply::Exchange {
                request: service.submit_evidence(id, player, &evidence)?,
            }
        }
        Command::Approve { request } => decide(service, invoker, &request, true)?,
        Command::Reject { request } => decide(service, invoker, &request, false)?,
        Command::Pending => Reply::Pending {
            requests: service.pending_requests(),
        },
    };
    Ok(reply)
}

fn decide(service: &GameService, invoker: &Invoker, reference: &str, approved: bool) -> Result<Reply> {
    let id = service.workflow().resolve(reference)?;
    let request = service.decide(id, invoker.player, approved, invoker.is_admin)?;
    Ok(Reply::Exchange { request })
}
