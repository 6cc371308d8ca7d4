//! Per-key critical sections
//!
//! Read-modify-write sequences against the store must not interleave for
//! the same key, but unrelated keys should never wait on each other.
//! A key's slot lives only while some caller holds or waits on it.

use std::hash::Hash;
use std::sync::{Arc, Mutex};

use dashmap::DashMap;

type Slot = Arc<Mutex<()>>;

/// One mutex per key currently in use
pub struct KeyedLocks<K: Eq + Hash> {
    slots: DashMap<K, Slot>,
}

/// Releases a slot reference and drops the table entry once unreferenced
struct Held<'a, K: Eq + Hash> {
    slots: &'a DashMap<K, Slot>,
    key: &'a K,
    slot: Option<Slot>,
}

impl<K: Eq + Hash> Drop for Held<'_, K> {
    fn drop(&mut self) {
        self.slot.take();
        // Clones only happen under the shard lock, so a count of one means
        // no other caller can still reach this slot
        self.slots
            .remove_if(self.key, |_, slot| Arc::strong_count(slot) == 1);
    }
}

impl<K: Eq + Hash + Clone> KeyedLocks<K> {
    pub fn new() -> Self {
        Self {
            slots: DashMap::new(),
        }
    }

    /// Run `f` while holding the lock for `key`
    pub fn with<R>(&self, key: &K, f: impl FnOnce() -> R) -> R {
        let slot = Arc::clone(self.slots.entry(key.clone()).or_default().value());
        let held = Held {
            slots: &self.slots,
            key,
            slot: Some(slot),
        };
        let _guard = held
            .slot
            .as_ref()
            .map(|slot| slot.lock().unwrap_or_else(|e| e.into_inner()));
        f()
    }

    /// Number of keys currently held or awaited
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<K: Eq + Hash + Clone> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::thread;

    #[test]
    fn test_same_key_is_serialized() {
        let locks = Arc::new(KeyedLocks::<u32>::new());
        let counter = Arc::new(AtomicU32::new(0));
        let inside = Arc::new(AtomicU32::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let locks = locks.clone();
                let counter = counter.clone();
                let inside = inside.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        locks.with(&1, || {
                            assert_eq!(inside.fetch_add(1, Ordering::SeqCst), 0);
                            counter.fetch_add(1, Ordering::SeqCst);
                            inside.fetch_sub(1, Ordering::SeqCst);
                        });
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(counter.load(Ordering::SeqCst), 800);
        assert!(locks.is_empty());
    }

    #[test]
    fn test_slot_released_after_section() {
        let locks = KeyedLocks::<&str>::new();
        assert!(locks.is_empty());
        locks.with(&"a", || {
            assert_eq!(locks.len(), 1);
            locks.with(&"b", || assert_eq!(locks.len(), 2));
            assert_eq!(locks.len(), 1);
        });
        assert_eq!(locks.len(), 0);
    }

    #[test]
    fn test_one_shot_keys_do_not_accumulate() {
        let locks = KeyedLocks::<u64>::new();
        for key in 0..10_000 {
            locks.with(&key, || ());
        }
        assert_eq!(locks.len(), 0);
    }

    #[test]
    fn test_slot_released_after_panic() {
        let locks = KeyedLocks::<u32>::new();
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            locks.with(&7, || panic!("section failed"))
        }));
        assert!(outcome.is_err());
        assert!(locks.is_empty());
        assert_eq!(locks.with(&7, || 42), 42);
    }
}
