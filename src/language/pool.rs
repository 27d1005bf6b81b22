use itertools::Itertools;
use std::collections::HashMap;

/// Multiset of characters a user supplies to constrain which words are practiced.
///
/// Stored as a frequency map, so the order the characters were entered in is
/// irrelevant to matching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterPool {
    counts: HashMap<char, usize>,
}

impl CharacterPool {
    pub fn new(chars: &str) -> Self {
        chars.chars().collect()
    }

    /// Total number of character occurrences in the pool.
    pub fn len(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn count(&self, c: char) -> usize {
        self.counts.get(&c).copied().unwrap_or(0)
    }

    /// Whether every character of `script` can be matched to a distinct,
    /// unused occurrence of the same character in the pool.
    ///
    /// Works on a private copy of the counts and rejects on the first
    /// character with nothing left to consume.
    pub fn can_spell(&self, script: &str) -> bool {
        let mut remaining = self.counts.clone();
        for c in script.chars() {
            match remaining.get_mut(&c) {
                Some(n) if *n > 0 => *n -= 1,
                _ => return false,
            }
        }
        true
    }
}

impl FromIterator<char> for CharacterPool {
    fn from_iter<I: IntoIterator<Item = char>>(iter: I) -> Self {
        Self {
            counts: iter.into_iter().counts(),
        }
    }
}

/// A parsed `chars` query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterQuery {
    /// No parameter: every word matches.
    All,
    /// Parameter present, possibly empty: only spellable words match.
    Pool(CharacterPool),
}

impl FilterQuery {
    /// `raw` is the already URL-decoded parameter. A present but empty value
    /// is an empty pool, not an absent filter.
    pub fn from_param(raw: Option<&str>) -> Self {
        match raw {
            Some(chars) => FilterQuery::Pool(CharacterPool::new(chars)),
            None => FilterQuery::All,
        }
    }

    pub fn pool(&self) -> Option<&CharacterPool> {
        match self {
            FilterQuery::Pool(pool) => Some(pool),
            FilterQuery::All => None,
        }
    }
}
