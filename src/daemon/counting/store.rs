use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

/// Process wide key press counters. Both fields live behind one lock, so the total is always the
/// sum of the per key counts, no matter how many handlers record at the same time.
#[derive(Debug, Default)]
pub struct CounterStore {
    inner: Mutex<Counts>,
}

#[derive(Debug, Default)]
struct Counts {
    counts: HashMap<Arc<str>, u64>,
    total: u64,
}

impl CounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one press of `key` and returns the total amount of presses including this one.
    pub fn record(&self, key: &str) -> u64 {
        let mut guard = self.lock();
        let inner = &mut *guard;
        match inner.counts.get_mut(key) {
            Some(count) => *count += 1,
            None => {
                inner.counts.insert(key.into(), 1);
            }
        }
        inner.total += 1;
        inner.total
    }

    pub fn total(&self) -> u64 {
        self.lock().total
    }

    /// Copies the current state. Recording can continue while the copy is being rendered.
    pub fn snapshot(&self) -> CounterSnapshot {
        let inner = self.lock();
        CounterSnapshot {
            counts: inner.counts.clone(),
            total: inner.total,
        }
    }

    // A panic while holding the lock can't leave the counters half updated, so the poisoned
    // state is still valid.
    fn lock(&self) -> MutexGuard<'_, Counts> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Immutable point-in-time copy of [CounterStore].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    counts: HashMap<Arc<str>, u64>,
    total: u64,
}

impl CounterSnapshot {
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn get(&self, key: &str) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn distinct_keys(&self) -> usize {
        self.counts.len()
    }

    /// Keys that were pressed at least once, most frequent first. Keys with the same count are
    /// ordered by name.
    pub fn ranked(&self) -> Vec<(&str, u64)> {
        let mut ranked = self
            .counts
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(key, count)| (key.as_ref(), *count))
            .collect::<Vec<_>>();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked
    }
}

impl<K: Into<Arc<str>>> FromIterator<(K, u64)> for CounterSnapshot {
    fn from_iter<T: IntoIterator<Item = (K, u64)>>(iter: T) -> Self {
        let mut counts = HashMap::<Arc<str>, u64>::new();
        for (key, count) in iter {
            *counts.entry(key.into()).or_default() += count;
        }
        let total = counts.values().sum();
        Self { counts, total }
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use super::{CounterSnapshot, CounterStore};

    #[test]
    fn test_record_basic() {
        let store = CounterStore::new();
        for key in ["a", "a", "b", "a"] {
            store.record(key);
        }

        let snapshot = store.snapshot();
        assert_eq!(snapshot.get("a"), 3);
        assert_eq!(snapshot.get("b"), 1);
        assert_eq!(snapshot.get("c"), 0);
        assert_eq!(snapshot.total(), 4);
        assert_eq!(snapshot.distinct_keys(), 2);
    }

    #[test]
    fn test_record_returns_running_total() {
        let store = CounterStore::new();
        let totals = ["x", "y", "x"].map(|key| store.record(key));
        assert_eq!(totals, [1, 2, 3]);
        assert_eq!(store.total(), 3);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let store = CounterStore::new();
        store.record("a");
        let snapshot = store.snapshot();
        store.record("a");
        store.record("b");

        assert_eq!(snapshot.get("a"), 1);
        assert_eq!(snapshot.total(), 1);
        assert_eq!(store.snapshot().total(), 3);
    }

    #[test]
    fn test_concurrent_recording_conserves_total() {
        let store = Arc::new(CounterStore::new());
        let keys = ["a", "b", "c", "Enter"];

        let handles = (0..8)
            .map(|thread_index| {
                let store = store.clone();
                thread::spawn(move || {
                    for i in 0..1000 {
                        store.record(keys[(thread_index + i) % keys.len()]);
                    }
                })
            })
            .collect::<Vec<_>>();

        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = store.snapshot();
        assert_eq!(snapshot.total(), 8000);
        let sum: u64 = keys.iter().map(|key| snapshot.get(key)).sum();
        assert_eq!(sum, snapshot.total());
        for key in keys {
            assert_eq!(snapshot.get(key), 2000);
        }
    }

    #[test]
    fn test_counts_never_decrease() {
        let store = CounterStore::new();
        let mut previous = store.snapshot();
        for key in ["a", "b", "a", "c", "a", "b"] {
            store.record(key);
            let current = store.snapshot();
            assert!(current.total() > previous.total());
            for key in ["a", "b", "c"] {
                assert!(current.get(key) >= previous.get(key));
            }
            previous = current;
        }
    }

    #[test]
    fn test_ranked_orders_by_count() {
        let snapshot = CounterSnapshot::from_iter([("A", 3), ("B", 7), ("C", 7), ("D", 1)]);
        let keys = snapshot
            .ranked()
            .into_iter()
            .map(|(key, _)| key)
            .collect::<Vec<_>>();

        assert_eq!(keys.len(), 4);
        assert!(keys[..2].contains(&"B"));
        assert!(keys[..2].contains(&"C"));
        assert_eq!(keys[2..], ["A", "D"]);
    }

    #[test]
    fn test_ranked_skips_zero_counts() {
        let snapshot = CounterSnapshot::from_iter([("A", 0), ("B", 2)]);
        assert_eq!(snapshot.ranked(), vec![("B", 2)]);
        assert_eq!(snapshot.total(), 2);
    }
}
