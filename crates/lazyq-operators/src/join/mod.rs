//! Hash joins on the shared multimap.
//!
//! Both joins build a multimap over the inner side on the first pull, then
//! stream the outer side through it. `Join` is an inner join (cross product
//! per key, unmatched outer elements dropped); `GroupJoin` yields exactly once
//! per outer element with all of its matches, possibly none.

use std::hash::Hash;
use std::rc::Rc;

use futures::stream::{self, StreamExt};
use lazyq_core::cursor::{deferred, deferred_stream, AsyncCursor, Cursor};
use lazyq_core::metrics;

use crate::group::MultiMap;
use crate::plan::NodePlan;
use crate::traits::{AsyncNode, AsyncQueryNode, Node, QueryNode};

/// Key selectors and capacity shared by both joins.
pub struct JoinKeys<O, I, K> {
    outer_key: Rc<dyn Fn(&O) -> K>,
    inner_key: Rc<dyn Fn(&I) -> K>,
    capacity: usize,
}

impl<O, I, K> Clone for JoinKeys<O, I, K> {
    fn clone(&self) -> Self {
        Self {
            outer_key: Rc::clone(&self.outer_key),
            inner_key: Rc::clone(&self.inner_key),
            capacity: self.capacity,
        }
    }
}

impl<O, I, K> JoinKeys<O, I, K> {
    pub fn new(
        outer_key: impl Fn(&O) -> K + 'static,
        inner_key: impl Fn(&I) -> K + 'static,
        capacity: usize,
    ) -> Self {
        Self {
            outer_key: Rc::new(outer_key),
            inner_key: Rc::new(inner_key),
            capacity,
        }
    }
}

/// Walks the matches of the current outer element.
struct Matches<O, I, K> {
    map: MultiMap<K, I>,
    current: Option<(O, usize, usize)>,
}

impl<O, I, K: Eq + Hash + Clone> Matches<O, I, K> {
    fn new(map: MultiMap<K, I>) -> Self {
        metrics::materialized("join", map.rows(), Some(map.len()));
        Self { map, current: None }
    }

    fn feed(&mut self, outer: O, key: &K) {
        self.current = self.map.position(key).map(|b| (outer, b, 0));
    }

    fn next_match<R>(&mut self, result: &dyn Fn(&O, &I) -> R) -> Option<R> {
        let (outer, bucket, pos) = self.current.as_mut()?;
        let values = self.map.bucket(*bucket);
        if let Some(inner) = values.get(*pos) {
            *pos += 1;
            return Some(result(outer, inner));
        }
        self.current = None;
        None
    }
}

pub struct Join<O, I, K, R> {
    outer: Node<O>,
    inner: Node<I>,
    keys: JoinKeys<O, I, K>,
    result: Rc<dyn Fn(&O, &I) -> R>,
}

impl<O, I, K, R> Join<O, I, K, R> {
    pub fn new(
        outer: Node<O>,
        inner: Node<I>,
        keys: JoinKeys<O, I, K>,
        result: impl Fn(&O, &I) -> R + 'static,
    ) -> Self {
        Self {
            outer,
            inner,
            keys,
            result: Rc::new(result),
        }
    }
}

struct JoinCursor<'a, O, I, K, R> {
    node: &'a Join<O, I, K, R>,
    outer: Cursor<'a, O>,
    matches: Option<Matches<O, I, K>>,
}

impl<O, I, K, R> Iterator for JoinCursor<'_, O, I, K, R>
where
    O: 'static,
    I: 'static,
    K: Eq + Hash + Clone + 'static,
{
    type Item = R;

    fn next(&mut self) -> Option<R> {
        let node = self.node;
        let matches = self.matches.get_or_insert_with(|| {
            let keys = &node.keys;
            Matches::new(MultiMap::build(
                node.inner.cursor(),
                |i| (keys.inner_key)(i),
                keys.capacity,
            ))
        });
        loop {
            if let Some(r) = matches.next_match(&*node.result) {
                return Some(r);
            }
            let o = self.outer.next()?;
            let k = (node.keys.outer_key)(&o);
            matches.feed(o, &k);
        }
    }
}

impl<O, I, K, R> QueryNode<R> for Join<O, I, K, R>
where
    O: 'static,
    I: 'static,
    K: Eq + Hash + Clone + 'static,
    R: 'static,
{
    fn name(&self) -> &'static str {
        "join"
    }

    fn cursor(&self) -> Cursor<'_, R> {
        Box::new(JoinCursor {
            node: self,
            outer: self.outer.cursor(),
            matches: None,
        })
    }

    fn describe(&self) -> NodePlan {
        NodePlan::new(self.name(), None)
            .with_input(self.outer.describe())
            .with_input(self.inner.describe())
    }
}

pub struct AsyncJoin<O, I, K, R> {
    outer: AsyncNode<O>,
    inner: AsyncNode<I>,
    keys: JoinKeys<O, I, K>,
    result: Rc<dyn Fn(&O, &I) -> R>,
}

impl<O, I, K, R> AsyncJoin<O, I, K, R> {
    pub fn new(
        outer: AsyncNode<O>,
        inner: AsyncNode<I>,
        keys: JoinKeys<O, I, K>,
        result: impl Fn(&O, &I) -> R + 'static,
    ) -> Self {
        Self {
            outer,
            inner,
            keys,
            result: Rc::new(result),
        }
    }
}

impl<O, I, K, R> AsyncQueryNode<R> for AsyncJoin<O, I, K, R>
where
    O: 'static,
    I: 'static,
    K: Eq + Hash + Clone + 'static,
    R: 'static,
{
    fn name(&self) -> &'static str {
        "join"
    }

    fn stream(&self) -> AsyncCursor<'_, R> {
        deferred_stream(async move {
            let keys = &self.keys;
            let map =
                MultiMap::build_async(self.inner.stream(), |i| (keys.inner_key)(i), keys.capacity)
                    .await;
            let state = (self.outer.stream(), Matches::new(map));
            stream::unfold(state, move |(mut outer, mut matches)| async move {
                loop {
                    if let Some(r) = matches.next_match(&*self.result) {
                        return Some((r, (outer, matches)));
                    }
                    let Some(o) = outer.next().await else {
                        return None;
                    };
                    let k = (self.keys.outer_key)(&o);
                    matches.feed(o, &k);
                }
            })
        })
    }

    fn describe(&self) -> NodePlan {
        NodePlan::new(self.name(), None)
            .with_input(self.outer.describe())
            .with_input(self.inner.describe())
    }
}

pub struct GroupJoin<O, I, K, R> {
    outer: Node<O>,
    inner: Node<I>,
    keys: JoinKeys<O, I, K>,
    result: Rc<dyn Fn(O, &[I]) -> R>,
}

impl<O, I, K, R> GroupJoin<O, I, K, R> {
    pub fn new(
        outer: Node<O>,
        inner: Node<I>,
        keys: JoinKeys<O, I, K>,
        result: impl Fn(O, &[I]) -> R + 'static,
    ) -> Self {
        Self {
            outer,
            inner,
            keys,
            result: Rc::new(result),
        }
    }
}

impl<O, I, K, R> QueryNode<R> for GroupJoin<O, I, K, R>
where
    O: 'static,
    I: 'static,
    K: Eq + Hash + Clone + 'static,
    R: 'static,
{
    fn name(&self) -> &'static str {
        "group_join"
    }

    fn cursor(&self) -> Cursor<'_, R> {
        deferred(move || {
            let keys = &self.keys;
            let map = MultiMap::build(self.inner.cursor(), |i| (keys.inner_key)(i), keys.capacity);
            metrics::materialized("group_join", map.rows(), Some(map.len()));
            self.outer.cursor().map(move |o| {
                let k = (keys.outer_key)(&o);
                (self.result)(o, map.get(&k).unwrap_or(&[]))
            })
        })
    }

    fn len_hint(&self) -> Option<usize> {
        self.outer.len_hint()
    }

    fn describe(&self) -> NodePlan {
        NodePlan::new(self.name(), self.len_hint())
            .with_input(self.outer.describe())
            .with_input(self.inner.describe())
    }
}

pub struct AsyncGroupJoin<O, I, K, R> {
    outer: AsyncNode<O>,
    inner: AsyncNode<I>,
    keys: JoinKeys<O, I, K>,
    result: Rc<dyn Fn(O, &[I]) -> R>,
}

impl<O, I, K, R> AsyncGroupJoin<O, I, K, R> {
    pub fn new(
        outer: AsyncNode<O>,
        inner: AsyncNode<I>,
        keys: JoinKeys<O, I, K>,
        result: impl Fn(O, &[I]) -> R + 'static,
    ) -> Self {
        Self {
            outer,
            inner,
            keys,
            result: Rc::new(result),
        }
    }
}

impl<O, I, K, R> AsyncQueryNode<R> for AsyncGroupJoin<O, I, K, R>
where
    O: 'static,
    I: 'static,
    K: Eq + Hash + Clone + 'static,
    R: 'static,
{
    fn name(&self) -> &'static str {
        "group_join"
    }

    fn stream(&self) -> AsyncCursor<'_, R> {
        deferred_stream(async move {
            let keys = &self.keys;
            let map =
                MultiMap::build_async(self.inner.stream(), |i| (keys.inner_key)(i), keys.capacity)
                    .await;
            metrics::materialized("group_join", map.rows(), Some(map.len()));
            self.outer.stream().map(move |o| {
                let k = (keys.outer_key)(&o);
                (self.result)(o, map.get(&k).unwrap_or(&[]))
            })
        })
    }

    fn len_hint(&self) -> Option<usize> {
        self.outer.len_hint()
    }

    fn describe(&self) -> NodePlan {
        NodePlan::new(self.name(), self.len_hint())
            .with_input(self.outer.describe())
            .with_input(self.inner.describe())
    }
}
