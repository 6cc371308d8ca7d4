use thiserror::Error;

use crate::core::types::{ActionKind, EncounterId, PlayerId, RequestId, SessionId, Tick};

/// Which player resource an economy precondition refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Stamina,
    Coins,
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resource::Stamina => write!(f, "stamina"),
            Resource::Coins => write!(f, "coins"),
        }
    }
}

#[derive(Error, Debug)]
pub enum SlayerError {
    #[error("Player not registered: {0}")]
    NotRegistered(PlayerId),

    #[error("Player already registered: {0}")]
    AlreadyRegistered(PlayerId),

    #[error("Not enough {resource}: have {have}, change of {delta} would go negative")]
    InsufficientResource {
        resource: Resource,
        have: u64,
        delta: i64,
    },

    #[error("Insufficient funds: have {have} coins, need {cost}")]
    InsufficientFunds { have: u64, cost: u64 },

    #[error("Value overflow while updating {0}")]
    ValueOverflow(&'static str),

    #[error("{action} is on cooldown for another {remaining} ticks")]
    OnCooldown { action: ActionKind, remaining: Tick },

    #[error("Breathing already rolled for {0}")]
    BreathingAlreadyRolled(PlayerId),

    #[error("Starter pack not available for {0}")]
    StarterPackUnavailable(PlayerId),

    #[error("Unknown item number: {0}")]
    UnknownItem(u32),

    #[error("Quantity must be positive, got {0}")]
    InvalidQuantity(i64),

    #[error("Encounter not found: {0}")]
    EncounterNotFound(EncounterId),

    #[error("No demon is waiting to be fought")]
    NoOpenEncounter,

    #[error("Encounter already claimed: {0}")]
    AlreadyClaimed(EncounterId),

    #[error("Combat session not found: {0}")]
    SessionNotFound(SessionId),

    #[error("Combat session closed: {0}")]
    SessionClosed(SessionId),

    #[error("{player} is not the claimant of session {session}")]
    NotParticipant { player: PlayerId, session: SessionId },

    #[error("Fight already in progress for {0}")]
    FightInProgress(PlayerId),

    #[error("{0} is not in a fight")]
    NoActiveFight(PlayerId),

    #[error("Approval request not found: {0}")]
    RequestNotFound(RequestId),

    #[error("Approval request {request} is {state}, operation not allowed")]
    InvalidState { request: RequestId, state: String },

    #[error("Amount {amount} outside allowed range {min}..={max}")]
    InvalidAmount { amount: i64, min: u64, max: u64 },

    #[error("Approver {0} is not authorized")]
    Unauthorized(PlayerId),

    #[error("Approval request already resolved: {0}")]
    AlreadyResolved(RequestId),

    #[error("Nothing matches '{0}'")]
    UnknownReference(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl SlayerError {
    /// Only collaborator failures warrant a retry at the transport layer;
    /// everything else is reported to the player as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SlayerError::StoreUnavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, SlayerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_store_failures_are_retryable() {
        assert!(SlayerError::StoreUnavailable("down".into()).is_retryable());
        assert!(!SlayerError::FightInProgress(PlayerId(1)).is_retryable());
        assert!(!SlayerError::InsufficientFunds { have: 1, cost: 2 }.is_retryable());
    }

    #[test]
    fn test_cooldown_message_names_action() {
        let err = SlayerError::OnCooldown {
            action: ActionKind::SpawnDemon,
            remaining: 7,
        };
        assert_eq!(err.to_string(), "spawn_demon is on cooldown for another 7 ticks");
    }
}
