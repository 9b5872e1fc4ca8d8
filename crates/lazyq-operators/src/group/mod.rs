//! `group_by`: one [`Grouping`] per distinct key, in first-encounter order.

mod multimap;

use std::hash::Hash;
use std::rc::Rc;

use futures::stream::{self, StreamExt};
use lazyq_core::cursor::{deferred, deferred_stream, AsyncCursor, Cursor};
use lazyq_core::metrics;

pub use multimap::MultiMap;

use crate::plan::NodePlan;
use crate::traits::{AsyncNode, AsyncQueryNode, Node, QueryNode};

/// A key and the values that share it, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grouping<K, V> {
    key: K,
    values: Vec<V>,
}

impl<K, V> Grouping<K, V> {
    pub fn new(key: K, values: Vec<V>) -> Self {
        Self { key, values }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn values(&self) -> &[V] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, V> {
        self.values.iter()
    }

    pub fn into_parts(self) -> (K, Vec<V>) {
        (self.key, self.values)
    }
}

impl<K, V> IntoIterator for Grouping<K, V> {
    type Item = V;
    type IntoIter = std::vec::IntoIter<V>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a, K, V> IntoIterator for &'a Grouping<K, V> {
    type Item = &'a V;
    type IntoIter = std::slice::Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

fn into_groupings<K, V>(map: MultiMap<K, V>) -> impl Iterator<Item = Grouping<K, V>> {
    map.into_buckets().map(|(k, vs)| Grouping::new(k, vs))
}

pub struct Grouped<T, K, V> {
    source: Node<T>,
    key: Rc<dyn Fn(&T) -> K>,
    value: Rc<dyn Fn(T) -> V>,
    capacity: usize,
}

impl<T, K, V> Grouped<T, K, V> {
    pub fn new(
        source: Node<T>,
        key: impl Fn(&T) -> K + 'static,
        value: impl Fn(T) -> V + 'static,
        capacity: usize,
    ) -> Self {
        Self {
            source,
            key: Rc::new(key),
            value: Rc::new(value),
            capacity,
        }
    }
}

impl<T, K, V> QueryNode<Grouping<K, V>> for Grouped<T, K, V>
where
    T: 'static,
    K: Eq + Hash + Clone + 'static,
    V: 'static,
{
    fn name(&self) -> &'static str {
        "group"
    }

    fn cursor(&self) -> Cursor<'_, Grouping<K, V>> {
        deferred(move || {
            let pairs = self.source.cursor().map(|t| ((self.key)(&t), (self.value)(t)));
            let map = MultiMap::from_pairs(pairs, self.capacity);
            metrics::materialized("group", map.rows(), Some(map.len()));
            into_groupings(map)
        })
    }

    fn describe(&self) -> NodePlan {
        NodePlan::new(self.name(), None).with_input(self.source.describe())
    }
}

pub struct AsyncGrouped<T, K, V> {
    source: AsyncNode<T>,
    key: Rc<dyn Fn(&T) -> K>,
    value: Rc<dyn Fn(T) -> V>,
    capacity: usize,
}

impl<T, K, V> AsyncGrouped<T, K, V> {
    pub fn new(
        source: AsyncNode<T>,
        key: impl Fn(&T) -> K + 'static,
        value: impl Fn(T) -> V + 'static,
        capacity: usize,
    ) -> Self {
        Self {
            source,
            key: Rc::new(key),
            value: Rc::new(value),
            capacity,
        }
    }
}

impl<T, K, V> AsyncQueryNode<Grouping<K, V>> for AsyncGrouped<T, K, V>
where
    T: 'static,
    K: Eq + Hash + Clone + 'static,
    V: 'static,
{
    fn name(&self) -> &'static str {
        "group"
    }

    fn stream(&self) -> AsyncCursor<'_, Grouping<K, V>> {
        deferred_stream(async move {
            let pairs = self.source.stream().map(|t| ((self.key)(&t), (self.value)(t)));
            let map = MultiMap::from_pairs_async(pairs, self.capacity).await;
            metrics::materialized("group", map.rows(), Some(map.len()));
            stream::iter(into_groupings(map))
        })
    }

    fn describe(&self) -> NodePlan {
        NodePlan::new(self.name(), None).with_input(self.source.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    use crate::source::{Collection, IterStream};

    #[test]
    fn groups_keep_first_encounter_order() {
        let src: Node<&str> = Rc::new(Collection::new(vec!["apple", "bob", "avocado", "cat", "bee"]));
        let grouped = Grouped::new(src, |s: &&str| s.as_bytes()[0], |s| s, 16);
        let groups: Vec<_> = grouped.cursor().collect();
        assert_eq!(groups.len(), 3);
        assert_eq!(*groups[0].key(), b'a');
        assert_eq!(groups[0].values(), &["apple", "avocado"]);
        assert_eq!(groups[1].values(), &["bob", "bee"]);
        assert_eq!(groups[2].values(), &["cat"]);
    }

    #[test]
    fn value_selector_projects_members() {
        let src: Node<i32> = Rc::new(Collection::new(vec![1, 2, 3, 4]));
        let grouped = Grouped::new(src, |n: &i32| n % 2 == 0, |n| n * 10, 2);
        let groups: Vec<_> = grouped.cursor().map(Grouping::into_parts).collect();
        assert_eq!(groups, vec![(false, vec![10, 30]), (true, vec![20, 40])]);
    }

    #[test]
    fn async_groups_match_sync() {
        let src: AsyncNode<i32> = Rc::new(IterStream::new(vec![5, 8, 1, 4, 9]));
        let grouped = AsyncGrouped::new(src, |n: &i32| n % 2, |n| n.to_string(), 4);
        let groups: Vec<_> = block_on(grouped.stream().map(Grouping::into_parts).collect());
        assert_eq!(
            groups,
            vec![
                (1, vec!["5".to_string(), "1".to_string(), "9".to_string()]),
                (0, vec!["8".to_string(), "4".to_string()]),
            ]
        );
    }
}
