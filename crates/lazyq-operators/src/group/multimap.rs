//! Order-preserving multimap: the single primitive behind grouping and both
//! joins.

use std::collections::HashMap;
use std::hash::Hash;

use futures::{Stream, StreamExt};

/// Buckets of values per key, iterated in first-encounter order of the keys.
#[derive(Debug, Clone)]
pub struct MultiMap<K, V> {
    index: HashMap<K, usize>,
    buckets: Vec<(K, Vec<V>)>,
    rows: usize,
}

impl<K: Eq + Hash + Clone, V> MultiMap<K, V> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            index: HashMap::with_capacity(capacity),
            buckets: Vec::with_capacity(capacity),
            rows: 0,
        }
    }

    /// One pass over `(key, value)` pairs.
    pub fn from_pairs<I>(pairs: I, capacity: usize) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut map = Self::with_capacity(capacity);
        for (k, v) in pairs {
            map.insert(k, v);
        }
        map
    }

    /// Async twin of [`MultiMap::from_pairs`].
    pub async fn from_pairs_async<S>(pairs: S, capacity: usize) -> Self
    where
        S: Stream<Item = (K, V)>,
    {
        let mut map = Self::with_capacity(capacity);
        futures::pin_mut!(pairs);
        while let Some((k, v)) = pairs.next().await {
            map.insert(k, v);
        }
        map
    }

    /// Bucket whole values by `key`.
    pub fn build<I, F>(values: I, key: F, capacity: usize) -> Self
    where
        I: IntoIterator<Item = V>,
        F: Fn(&V) -> K,
    {
        Self::from_pairs(values.into_iter().map(|v| (key(&v), v)), capacity)
    }

    /// Async twin of [`MultiMap::build`].
    pub async fn build_async<S, F>(values: S, key: F, capacity: usize) -> Self
    where
        S: Stream<Item = V>,
        F: Fn(&V) -> K,
    {
        Self::from_pairs_async(values.map(|v| (key(&v), v)), capacity).await
    }

    pub fn insert(&mut self, key: K, value: V) {
        self.rows += 1;
        match self.index.get(&key) {
            Some(&i) => self.buckets[i].1.push(value),
            None => {
                self.index.insert(key.clone(), self.buckets.len());
                self.buckets.push((key, vec![value]));
            }
        }
    }

    pub fn position(&self, key: &K) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub fn get(&self, key: &K) -> Option<&[V]> {
        self.position(key).map(|i| self.bucket(i))
    }

    pub fn bucket(&self, i: usize) -> &[V] {
        &self.buckets[i].1
    }
}

impl<K, V> MultiMap<K, V> {
    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Number of values across all buckets.
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn into_buckets(self) -> std::vec::IntoIter<(K, Vec<V>)> {
        self.buckets.into_iter()
    }
}
