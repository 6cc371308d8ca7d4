//! Two-party confirmation workflow
//!
//! A requester proposes, optionally attaches evidence, and an authorized
//! approver decides. Settlement through the ledger happens at most once,
//! only on approval, and inside the same critical section as the
//! `Approved` transition.

use std::sync::{Arc, Mutex};

use ahash::AHashMap;
use serde::Serialize;

use crate::confirm::request::{ApprovalRequest, ExchangeDirection, RequestStatus};
use crate::core::config::GameConfig;
use crate::core::error::{Result, SlayerError};
use crate::core::types::{PlayerId, RequestId, Tick};
use crate::ledger::ProgressionLedger;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequestSweep {
    pub expired: Vec<RequestId>,
    pub purged: usize,
}

pub struct ConfirmationWorkflow {
    ledger: Arc<ProgressionLedger>,
    config: Arc<GameConfig>,
    requests: Mutex<AHashMap<RequestId, ApprovalRequest>>,
}

impl ConfirmationWorkflow {
    pub fn new(ledger: Arc<ProgressionLedger>, config: Arc<GameConfig>) -> Self {
        Self {
            ledger,
            config,
            requests: Mutex::new(AHashMap::new()),
        }
    }

    fn requests(&self) -> std::sync::MutexGuard<'_, AHashMap<RequestId, ApprovalRequest>> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Open a request; withdrawals must be affordable at proposal time
    pub fn propose(
        &self,
        requester: PlayerId,
        amount: i64,
        direction: ExchangeDirection,
        requires_evidence: bool,
        now: Tick,
    ) -> Result<ApprovalRequest> {
        let (min, max) = (self.config.exchange_min, self.config.exchange_max);
        let amount = u64::try_from(amount)
            .ok()
            .filter(|a| (min..=max).contains(a))
            .ok_or(SlayerError::InvalidAmount { amount, min, max })?;

        let profile = self.ledger.profile(requester)?;
        if direction == ExchangeDirection::Withdraw && profile.coins < amount {
            return Err(SlayerError::InsufficientFunds {
                have: profile.coins,
                cost: amount,
            });
        }

        let status = if requires_evidence {
            RequestStatus::PendingEvidence
        } else {
            RequestStatus::PendingApproval
        };
        let request = ApprovalRequest {
            id: RequestId::new(),
            requester,
            amount,
            direction,
            status,
            created_at: now,
            deadline: now.saturating_add(self.config.approval_deadline),
            evidence: None,
            decided_by: None,
            resolved_at: None,
        };
        self.requests().insert(request.id, request.clone());

        tracing::info!(
            request = %request.id,
            player = %requester,
            amount,
            ?direction,
            %status,
            "Exchange proposed"
        );
        Ok(request)
    }

    /// Attach the requester's evidence and hand the request to approvers
    ///
    /// The approval phase gets a fresh deadline.
    pub fn submit_evidence(
        &self,
        id: RequestId,
        requester: PlayerId,
        evidence: &str,
        now: Tick,
    ) -> Result<ApprovalRequest> {
        let mut requests = self.requests();
        let request = requests.get_mut(&id).ok_or(SlayerError::RequestNotFound(id))?;

        if request.expire_if_overdue(now) {
            tracing::info!(request = %id, "Exchange expired awaiting evidence");
        }
        if request.status.is_terminal() {
            return Err(SlayerError::AlreadyResolved(id));
        }
        if request.status != RequestStatus::PendingEvidence {
            return Err(SlayerError::InvalidState {
                request: id,
                state: request.status.to_string(),
            });
        }
        if request.requester != requester {
            return Err(SlayerError::Unauthorized(requester));
        }

        request.evidence = Some(evidence.to_string());
        request.status = RequestStatus::PendingApproval;
        request.deadline = now.saturating_add(self.config.approval_deadline);

        tracing::info!(request = %id, "Evidence attached");
        Ok(request.clone())
    }

    /// Approve or reject a pending request
    ///
    /// `is_authorized` comes from the platform's permission model; the
    /// requester can never approve their own request.
    pub fn decide(
        &self,
        id: RequestId,
        approver: PlayerId,
        approved: bool,
        is_authorized: bool,
        now: Tick,
    ) -> Result<ApprovalRequest> {
        let mut requests = self.requests();
        let request = requests.get_mut(&id).ok_or(SlayerError::RequestNotFound(id))?;

        if request.expire_if_overdue(now) {
            tracing::info!(request = %id, "Exchange expired awaiting decision");
        }
        if request.status.is_terminal() {
            return Err(SlayerError::AlreadyResolved(id));
        }
        if request.status != RequestStatus::PendingApproval {
            return Err(SlayerError::InvalidState {
                request: id,
                state: request.status.to_string(),
            });
        }
        if !is_authorized || approver == request.requester {
            tracing::warn!(request = %id, %approver, "Unauthorized approval attempt");
            return Err(SlayerError::Unauthorized(approver));
        }

        if approved {
            self.settle(request)?;
            request.status = RequestStatus::Approved;
        } else {
            request.status = RequestStatus::Rejected;
        }
        request.decided_by = Some(approver);
        request.resolved_at = Some(now);

        tracing::info!(
            request = %id,
            %approver,
            status = %request.status,
            amount = request.amount,
            "Exchange decided"
        );
        Ok(request.clone())
    }

    fn settle(&self, request: &ApprovalRequest) -> Result<u64> {
        match request.direction {
            ExchangeDirection::Withdraw => self.ledger.spend(request.requester, request.amount),
            ExchangeDirection::Deposit => {
                // amount <= exchange_max, which validate() keeps within i64
                self.ledger
                    .apply_coins_delta(request.requester, request.amount as i64)
            }
        }
    }

    /// Expire overdue requests and forget resolved ones after a further deadline
    pub fn sweep(&self, now: Tick) -> RequestSweep {
        let mut requests = self.requests();
        let mut report = RequestSweep::default();

        for request in requests.values_mut() {
            if request.expire_if_overdue(now) {
                report.expired.push(request.id);
            }
        }

        let retention = self.config.approval_deadline;
        let before = requests.len();
        requests.retain(|_, r| match r.resolved_at {
            Some(at) => now < at.saturating_add(retention),
            None => true,
        });
        report.purged = before - requests.len();

        if !report.expired.is_empty() {
            tracing::info!(count = report.expired.len(), "Exchange requests expired");
        }
        report
    }

    pub fn get(&self, id: RequestId) -> Option<ApprovalRequest> {
        self.requests().get(&id).cloned()
    }

    /// The single request `reference` points at (full id or short prefix)
    pub fn resolve(&self, reference: &str) -> Result<RequestId> {
        let requests = self.requests();
        let mut matches = requests.keys().filter(|id| id.matches_ref(reference));
        match (matches.next(), matches.next()) {
            (Some(id), None) => Ok(*id),
            _ => Err(SlayerError::UnknownReference(reference.to_string())),
        }
    }

    /// Requests waiting on an approver, oldest first
    pub fn pending_approval(&self, now: Tick) -> Vec<ApprovalRequest> {
        let mut pending: Vec<_> = self
            .requests()
            .values()
            .filter(|r| r.status == RequestStatus::PendingApproval && !r.is_overdue(now))
            .cloned()
            .collect();
        pending.sort_by_key(|r| r.created_at);
        pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    const ADMIN: PlayerId = PlayerId(100);

    fn workflow(coins: i64) -> (ConfirmationWorkflow, Arc<ProgressionLedger>) {
        let config = Arc::new(GameConfig::default());
        let ledger = Arc::new(ProgressionLedger::new(Arc::new(MemoryStore::new()), config.clone()));
        ledger.register(PlayerId(1), "tanjiro").unwrap();
        if coins > 0 {
            ledger.apply_coins_delta(PlayerId(1), coins).unwrap();
        }
        (ConfirmationWorkflow::new(ledger.clone(), config), ledger)
    }

    #[test]
    fn test_amount_bounds() {
        let (workflow, _) = workflow(0);
        for amount in [0, -5, 10_001] {
            assert!(matches!(
                workflow.propose(PlayerId(1), amount, ExchangeDirection::Deposit, false, 0),
                Err(SlayerError::InvalidAmount { .. })
            ));
        }
    }

    #[test]
    fn test_withdraw_requires_funds_up_front() {
        let (workflow, _) = workflow(50);
        assert!(matches!(
            workflow.propose(PlayerId(1), 80, ExchangeDirection::Withdraw, false, 0),
            Err(SlayerError::InsufficientFunds { have: 50, cost: 80 })
        ));
    }

    #[test]
    fn test_deposit_credits_on_approval() {
        let (workflow, ledger) = workflow(0);
        let request = workflow
            .propose(PlayerId(1), 300, ExchangeDirection::Deposit, false, 0)
            .unwrap();
        assert_eq!(request.status, RequestStatus::PendingApproval);

        let decided = workflow.decide(request.id, ADMIN, true, true, 10).unwrap();
        assert_eq!(decided.status, RequestStatus::Approved);
        assert_eq!(decided.decided_by, Some(ADMIN));
        assert_eq!(ledger.profile(PlayerId(1)).unwrap().coins, 300);
    }

    #[test]
    fn test_rejection_has_no_ledger_effect() {
        let (workflow, ledger) = workflow(200);
        let request = workflow
            .propose(PlayerId(1), 100, ExchangeDirection::Withdraw, false, 0)
            .unwrap();
        let decided = workflow.decide(request.id, ADMIN, false, true, 1).unwrap();
        assert_eq!(decided.status, RequestStatus::Rejected);
        assert_eq!(ledger.profile(PlayerId(1)).unwrap().coins, 200);
    }

    #[test]
    fn test_requester_cannot_self_approve() {
        let (workflow, _) = workflow(0);
        let request = workflow
            .propose(PlayerId(1), 10, ExchangeDirection::Deposit, false, 0)
            .unwrap();
        assert!(matches!(
            workflow.decide(request.id, PlayerId(1), true, true, 1),
            Err(SlayerError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_settlement_failure_keeps_request_pending() {
        let (workflow, ledger) = workflow(100);
        let request = workflow
            .propose(PlayerId(1), 100, ExchangeDirection::Withdraw, false, 0)
            .unwrap();
        ledger.spend(PlayerId(1), 60).unwrap();

        assert!(matches!(
            workflow.decide(request.id, ADMIN, true, true, 1),
            Err(SlayerError::InsufficientFunds { .. })
        ));
        assert_eq!(workflow.get(request.id).unwrap().status, RequestStatus::PendingApproval);
        assert_eq!(ledger.profile(PlayerId(1)).unwrap().coins, 40);
    }

    #[test]
    fn test_decision_after_deadline_expires() {
        let (workflow, ledger) = workflow(0);
        let request = workflow
            .propose(PlayerId(1), 10, ExchangeDirection::Deposit, false, 0)
            .unwrap();
        assert!(matches!(
            workflow.decide(request.id, ADMIN, true, true, 61),
            Err(SlayerError::AlreadyResolved(_))
        ));
        assert_eq!(workflow.get(request.id).unwrap().status, RequestStatus::Expired);
        assert_eq!(ledger.profile(PlayerId(1)).unwrap().coins, 0);
    }

    #[test]
    fn test_evidence_restarts_deadline() {
        let (workflow, _) = workflow(0);
        let request = workflow
            .propose(PlayerId(1), 10, ExchangeDirection::Deposit, true, 0)
            .unwrap();
        let updated = workflow
            .submit_evidence(request.id, PlayerId(1), "receipt.png", 50)
            .unwrap();
        assert_eq!(updated.deadline, 110);
        assert_eq!(updated.evidence.as_deref(), Some("receipt.png"));
        assert!(workflow.decide(request.id, ADMIN, true, true, 100).is_ok());
    }

    #[test]
    fn test_evidence_only_from_requester() {
        let (workflow, _) = workflow(0);
        let request = workflow
            .propose(PlayerId(1), 10, ExchangeDirection::Deposit, true, 0)
            .unwrap();
        assert!(matches!(
            workflow.submit_evidence(request.id, PlayerId(2), "fake.png", 1),
            Err(SlayerError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_sweep_expires_and_purges() {
        let (workflow, _) = workflow(0);
        let request = workflow
            .propose(PlayerId(1), 10, ExchangeDirection::Deposit, true, 0)
            .unwrap();
        assert!(workflow.pending_approval(0).is_empty());

        let sweep = workflow.sweep(61);
        assert_eq!(sweep.expired, vec![request.id]);
        let sweep = workflow.sweep(121);
        assert_eq!(sweep.purged, 1);
        assert!(workflow.get(request.id).is_none());
    }
}
