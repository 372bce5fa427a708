use common::declare_app;
use common::{App, Counters, KeyValue};
use itertools::Itertools;

/// Groups words that are anagrams of each other.
#[derive(Debug, Default)]
pub struct AnagramApp;

/// Grouping key of a word: its characters sorted by scalar value.
pub fn anagram_key(word: &str) -> String {
    word.chars().sorted().collect()
}

impl App for AnagramApp {
    fn map(&self, record: &str) -> Vec<KeyValue> {
        record
            .split_whitespace()
            .map(|word| (anagram_key(word), word.to_owned()))
            .collect()
    }

    // Singleton groups are kept, and words are neither sorted nor deduplicated.
    fn reduce(&self, _key: &str, words: Vec<String>, _: &Counters) -> Vec<String> {
        vec![words.join("^")]
    }
}

declare_app!(AnagramApp::default);
