use crate::KeyValue;
use itertools::Itertools;
use std::collections::HashMap;

/// All values emitted under one key, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedEntry {
    pub key: String,
    pub values: Vec<String>,
}

/// In-process multimap standing in for the shuffle stage: collects every
/// emitted value under its key.
#[derive(Debug, Default)]
pub struct Shuffle {
    groups: HashMap<String, Vec<String>>,
}

impl Shuffle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, key: String, value: String) {
        self.groups.entry(key).or_default().push(value);
    }

    /// Appends `other`'s values after ours, key by key. Merging partial
    /// shuffles left to right keeps the overall emission order.
    pub fn merge(mut self, other: Shuffle) -> Shuffle {
        if self.groups.is_empty() {
            return other;
        }
        for (key, values) in other.groups {
            self.groups.entry(key).or_default().extend(values);
        }
        self
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Drains into one entry per key, ordered by key.
    pub fn into_groups(self) -> Vec<GroupedEntry> {
        self.groups
            .into_iter()
            .sorted_by(|a, b| a.0.cmp(&b.0))
            .map(|(key, values)| GroupedEntry { key, values })
            .collect()
    }
}

impl Extend<KeyValue> for Shuffle {
    fn extend<T: IntoIterator<Item = KeyValue>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.emit(k, v);
        }
    }
}
