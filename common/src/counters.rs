use dashmap::DashMap;
use std::{collections::BTreeMap, fmt};

type CounterKey = (String, String);

/// Named counters, accumulated by `(name, subkey)` across a whole run.
///
/// Increments from concurrent reducers only lock the shard holding their
/// entry, so unrelated subkeys never contend.
#[derive(Debug, Default)]
pub struct Counters {
    inner: DashMap<CounterKey, i64>,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn incr(&self, name: &str, subkey: &str, delta: i64) {
        *self
            .inner
            .entry((name.to_owned(), subkey.to_owned()))
            .or_insert(0) += delta;
    }

    pub fn get(&self, name: &str, subkey: &str) -> Option<i64> {
        self.inner
            .get(&(name.to_owned(), subkey.to_owned()))
            .map(|v| *v)
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        let mut groups = BTreeMap::<String, BTreeMap<String, i64>>::new();
        for pair in self.inner.iter() {
            let (name, subkey) = pair.key();
            groups
                .entry(name.clone())
                .or_default()
                .insert(subkey.clone(), *pair.value());
        }
        CounterSnapshot { groups }
    }
}

/// Counter totals as reported once a run completes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    groups: BTreeMap<String, BTreeMap<String, i64>>,
}

impl CounterSnapshot {
    /// Totals of one counter group, by subkey.
    pub fn group(&self, name: &str) -> BTreeMap<String, i64> {
        self.groups.get(name).cloned().unwrap_or_default()
    }

    pub fn get(&self, name: &str, subkey: &str) -> Option<i64> {
        self.groups.get(name)?.get(subkey).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl fmt::Display for CounterSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, subkeys) in &self.groups {
            writeln!(f, "{}", name)?;
            for (subkey, value) in subkeys {
                writeln!(f, "\t{}={}", subkey, value)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Counters;
    use rayon::prelude::*;

    #[test]
    fn incr_sums_by_name_and_subkey() {
        let counters = Counters::new();
        counters.incr("records", "2012-08-25", 2);
        counters.incr("records", "2012-08-25", 3);
        counters.incr("records", "2012-08-26", 1);
        counters.incr("other", "2012-08-25", 7);

        assert_eq!(counters.get("records", "2012-08-25"), Some(5));
        assert_eq!(counters.get("records", "2012-08-26"), Some(1));
        assert_eq!(counters.get("other", "2012-08-25"), Some(7));
        assert_eq!(counters.get("records", "2012-08-27"), None);
    }

    #[test]
    fn concurrent_increments() {
        let counters = Counters::new();
        (0..1000).into_par_iter().for_each(|i| {
            counters.incr("c", if i % 2 == 0 { "even" } else { "odd" }, 1);
        });

        let snapshot = counters.snapshot();
        assert_eq!(snapshot.get("c", "even"), Some(500));
        assert_eq!(snapshot.get("c", "odd"), Some(500));
    }

    #[test]
    fn snapshot_display() {
        let counters = Counters::new();
        counters.incr("b", "y", 2);
        counters.incr("b", "x", 1);
        counters.incr("a", "z", -4);

        let snapshot = counters.snapshot();
        assert_eq!(snapshot.to_string(), "a\n\tz=-4\nb\n\tx=1\n\ty=2\n");
        assert_eq!(snapshot.group("b").len(), 2);
        assert!(snapshot.group("missing").is_empty());
    }
}
