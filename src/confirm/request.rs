//! Approval request record and its state machine

use serde::{Deserialize, Serialize};

use crate::core::types::{PlayerId, RequestId, Tick};

/// Which way coins move when an exchange is approved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeDirection {
    /// Coins out for external currency; coins are deducted on approval
    Withdraw,
    /// External currency in for coins; coins are credited on approval
    Deposit,
}

impl std::str::FromStr for ExchangeDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "withdraw" | "sell" | "out" => Ok(ExchangeDirection::Withdraw),
            "deposit" | "buy" | "in" => Ok(ExchangeDirection::Deposit),
            other => Err(format!("unknown exchange direction '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    PendingEvidence,
    PendingApproval,
    Approved,
    Rejected,
    Expired,
}

impl RequestStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RequestStatus::Approved | RequestStatus::Rejected | RequestStatus::Expired
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::PendingEvidence => "pending_evidence",
            RequestStatus::PendingApproval => "pending_approval",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
            RequestStatus::Expired => "expired",
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalRequest {
    pub id: RequestId,
    pub requester: PlayerId,
    pub amount: u64,
    pub direction: ExchangeDirection,
    pub status: RequestStatus,
    pub created_at: Tick,
    /// Last tick the current pending phase may still be acted on
    pub deadline: Tick,
    pub evidence: Option<String>,
    pub decided_by: Option<PlayerId>,
    pub resolved_at: Option<Tick>,
}

impl ApprovalRequest {
    pub fn is_overdue(&self, now: Tick) -> bool {
        !self.status.is_terminal() && now > self.deadline
    }

    /// Move to `Expired` if the deadline passed; true if this call expired it
    pub fn expire_if_overdue(&mut self, now: Tick) -> bool {
        if self.is_overdue(now) {
            self.status = RequestStatus::Expired;
            self.resolved_at = Some(now);
            return true;
        }
        false
    }
}
