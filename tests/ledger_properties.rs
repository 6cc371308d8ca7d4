//! Property tests for the progression ledger
//!
//! Random operation sequences never drive a balance negative, and a failed
//! operation leaves the stored record untouched.

use std::sync::{Arc, Barrier};
use std::thread;

use proptest::prelude::*;

use demon_slayer::core::{GameConfig, LevelingPolicy, PlayerId, SlayerError};
use demon_slayer::ledger::{level_after_reward, ProgressionLedger};
use demon_slayer::store::MemoryStore;

#[derive(Debug, Clone)]
enum Op {
    Stamina(i64),
    Coins(i64),
    Spend(u64),
    Reward(u64, u64),
    Buy(u32, i64),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (-300i64..300).prop_map(Op::Stamina),
        (-300i64..300).prop_map(Op::Coins),
        (0u64..400).prop_map(Op::Spend),
        (0u64..250, 0u64..60).prop_map(|(exp, stamina)| Op::Reward(exp, stamina)),
        (0u32..5, -2i64..4).prop_map(|(item, qty)| Op::Buy(item, qty)),
    ]
}

fn ledger() -> ProgressionLedger {
    let ledger = ProgressionLedger::new(
        Arc::new(MemoryStore::new()),
        Arc::new(GameConfig::default()),
    );
    ledger.register(PlayerId(1), "giyu").unwrap();
    ledger
}

proptest! {
    #[test]
    fn prop_failed_ops_are_no_ops(ops in prop::collection::vec(op(), 1..40)) {
        let ledger = ledger();
        let player = PlayerId(1);

        for op in ops {
            let before = ledger.profile(player).unwrap();
            let inventory_before = ledger.inventory(player).unwrap();

            let failed = match op {
                Op::Stamina(delta) => ledger.apply_stamina_delta(player, delta).is_err(),
                Op::Coins(delta) => ledger.apply_coins_delta(player, delta).is_err(),
                Op::Spend(cost) => ledger.spend(player, cost).is_err(),
                Op::Reward(exp, stamina) => ledger.apply_combat_reward(player, exp, stamina).is_err(),
                Op::Buy(item, qty) => ledger.buy(player, item, qty).is_err(),
            };

            let after = ledger.profile(player).unwrap();
            if failed {
                prop_assert_eq!(&after, &before);
                prop_assert_eq!(ledger.inventory(player).unwrap(), inventory_before);
            }
            prop_assert!(after.level >= before.level);
            prop_assert!(after.experience >= before.experience);
        }
    }

    #[test]
    fn prop_stamina_delta_matches_arithmetic(start in 0u64..500, delta in -600i64..600) {
        let ledger = ledger();
        let player = PlayerId(1);
        let base = ledger.profile(player).unwrap().stamina as i64;
        ledger.apply_stamina_delta(player, start as i64 - base).unwrap();

        let expected = start as i64 + delta;
        match ledger.apply_stamina_delta(player, delta) {
            Ok(stamina) => {
                prop_assert!(expected >= 0);
                prop_assert_eq!(stamina as i64, expected);
            }
            Err(_) => {
                prop_assert!(expected < 0);
                prop_assert_eq!(ledger.profile(player).unwrap().stamina, start);
            }
        }
    }

    #[test]
    fn prop_iterative_level_is_fixpoint(level in 0u32..20, experience in 0u64..5_000) {
        let next = level_after_reward(level, experience, 100, LevelingPolicy::Iterative);
        prop_assert!(next >= level);
        // No further advance is possible from the result
        prop_assert_eq!(
            level_after_reward(next, experience, 100, LevelingPolicy::Iterative),
            next
        );
        // Single step never outruns the iterative policy
        let single = level_after_reward(level, experience, 100, LevelingPolicy::SingleStep);
        prop_assert!(single <= next);
        prop_assert!(single <= level + 1);
    }

    #[test]
    fn prop_iterative_level_matches_repeated_single_steps(
        level in 0u32..40,
        experience in 0u64..10_000,
        step in 1u64..500,
    ) {
        let mut walked = level;
        loop {
            let next = level_after_reward(walked, experience, step, LevelingPolicy::SingleStep);
            if next == walked {
                break;
            }
            walked = next;
        }
        prop_assert_eq!(
            level_after_reward(level, experience, step, LevelingPolicy::Iterative),
            walked
        );
    }
}

/// 32 racing spends of 10 against 100 coins: exactly ten land
#[test]
fn test_concurrent_spends_never_overdraw() {
    const THREADS: usize = 32;
    let ledger = Arc::new(ledger());
    let player = PlayerId(1);
    ledger.apply_coins_delta(player, 100).unwrap();

    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let ledger = Arc::clone(&ledger);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                ledger.spend(player, 10)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 10);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, SlayerError::InsufficientFunds { cost: 10, .. })));
    assert_eq!(ledger.profile(player).unwrap().coins, 0);
}
