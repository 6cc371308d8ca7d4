//! Cooldown tracker
//!
//! The gate check and the timestamp write happen inside one critical
//! section per `(player, action)`, so two near-simultaneous attempts can
//! never both pass.

use std::sync::Arc;

use crate::core::error::{Result, SlayerError};
use crate::core::keyed::KeyedLocks;
use crate::core::types::{ActionKind, PlayerId, Tick};
use crate::store::Store;

pub struct CooldownTracker {
    store: Arc<dyn Store>,
    locks: KeyedLocks<(PlayerId, ActionKind)>,
}

impl CooldownTracker {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            locks: KeyedLocks::new(),
        }
    }

    /// Ticks left before `action` is allowed again (0 if ready)
    pub fn remaining(
        &self,
        player: PlayerId,
        action: ActionKind,
        duration: Tick,
        now: Tick,
    ) -> Result<Tick> {
        let last = self.store.cooldown(player, action)?;
        Ok(remaining_after(last, duration, now))
    }

    /// Record `now` as the latest use of `action`, or fail with `OnCooldown`
    pub fn try_consume(
        &self,
        player: PlayerId,
        action: ActionKind,
        duration: Tick,
        now: Tick,
    ) -> Result<()> {
        self.gate(player, action, duration, now, || Ok(()))
    }

    /// Run `f` only if `action` is off cooldown, and start the cooldown only if `f` succeeds
    ///
    /// A failing `f` leaves the previous timestamp in place.
    pub fn gate<R>(
        &self,
        player: PlayerId,
        action: ActionKind,
        duration: Tick,
        now: Tick,
        f: impl FnOnce() -> Result<R>,
    ) -> Result<R> {
        self.locks.with(&(player, action), || {
            let last = self.store.cooldown(player, action)?;
            let remaining = remaining_after(last, duration, now);
            if remaining > 0 {
                tracing::debug!(%player, %action, remaining, "Action on cooldown");
                return Err(SlayerError::OnCooldown { action, remaining });
            }
            let result = f()?;
            self.store.put_cooldown(player, action, now)?;
            Ok(result)
        })
    }
}

fn remaining_after(last: Option<Tick>, duration: Tick, now: Tick) -> Tick {
    match last {
        Some(last) => duration.saturating_sub(now.saturating_sub(last)),
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn tracker() -> CooldownTracker {
        CooldownTracker::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_first_use_always_allowed() {
        let tracker = tracker();
        assert!(tracker.try_consume(PlayerId(1), ActionKind::SpawnDemon, 15, 0).is_ok());
    }

    #[test]
    fn test_second_use_within_window_rejected() {
        let tracker = tracker();
        tracker.try_consume(PlayerId(1), ActionKind::SpawnDemon, 15, 100).unwrap();
        let err = tracker
            .try_consume(PlayerId(1), ActionKind::SpawnDemon, 15, 104)
            .unwrap_err();
        assert!(matches!(err, SlayerError::OnCooldown { remaining: 11, .. }));

        assert!(tracker.try_consume(PlayerId(1), ActionKind::SpawnDemon, 15, 115).is_ok());
    }

    #[test]
    fn test_actions_and_players_are_independent() {
        let tracker = tracker();
        tracker.try_consume(PlayerId(1), ActionKind::SpawnDemon, 15, 0).unwrap();
        assert!(tracker.try_consume(PlayerId(1), ActionKind::ClaimStamina, 15, 1).is_ok());
        assert!(tracker.try_consume(PlayerId(2), ActionKind::SpawnDemon, 15, 1).is_ok());
    }

    #[test]
    fn test_failed_gate_does_not_start_cooldown() {
        let tracker = tracker();
        let result: Result<()> = tracker.gate(PlayerId(1), ActionKind::Exchange, 30, 0, || {
            Err(SlayerError::NotRegistered(PlayerId(1)))
        });
        assert!(result.is_err());
        assert_eq!(tracker.remaining(PlayerId(1), ActionKind::Exchange, 30, 1).unwrap(), 0);
    }

    #[test]
    fn test_remaining_counts_down() {
        let tracker = tracker();
        tracker.try_consume(PlayerId(1), ActionKind::ClaimStamina, 60, 10).unwrap();
        assert_eq!(tracker.remaining(PlayerId(1), ActionKind::ClaimStamina, 60, 40).unwrap(), 30);
        assert_eq!(tracker.remaining(PlayerId(1), ActionKind::ClaimStamina, 60, 90).unwrap(), 0);
    }

    #[test]
    fn test_concurrent_consumers_only_one_wins() {
        let tracker = Arc::new(tracker());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let tracker = tracker.clone();
                std::thread::spawn(move || {
                    tracker
                        .try_consume(PlayerId(7), ActionKind::SpawnDemon, 15, 50)
                        .is_ok()
                })
            })
            .collect();
        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(wins, 1);
    }
}
