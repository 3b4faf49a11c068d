// Insertion-ordered counting shared by batch reports and replay.
use std::collections::HashMap;
use std::hash::Hash;

/// Counter that remembers the order in which keys were first seen, so that
/// rankings break ties by first appearance.
#[derive(Debug, Clone)]
pub struct Tally<K> {
    order: Vec<K>,
    counts: HashMap<K, usize>,
}

impl<K> Default for Tally<K> {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            counts: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> Tally<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: K) {
        self.add_n(key, 1);
    }

    pub fn add_n(&mut self, key: K, n: usize) {
        match self.counts.get_mut(&key) {
            Some(c) => *c += n,
            None => {
                self.order.push(key.clone());
                self.counts.insert(key, n);
            }
        }
    }

    #[cfg(test)]
    pub fn get<Q>(&self, key: &Q) -> usize
    where
        K: std::borrow::Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.counts.clear();
    }

    /// Entries in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, usize)> + '_ {
        self.order.iter().map(move |k| (k, self.counts[k]))
    }

    /// Entries by count descending; equal counts keep first-appearance order.
    pub fn ranked(&self) -> Vec<(K, usize)> {
        let mut rows: Vec<(K, usize)> = self.iter().map(|(k, c)| (k.clone(), c)).collect();
        // `sort_by` is stable.
        rows.sort_by(|a, b| b.1.cmp(&a.1));
        rows
    }
}

impl<K: Eq + Hash + Clone> FromIterator<K> for Tally<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tally = Tally::new();
        for key in iter {
            tally.add(key);
        }
        tally
    }
}
