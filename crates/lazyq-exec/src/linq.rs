//! The sync query handle.
//!
//! `Linq<T>` pairs a shared node with the config it was built under. Every
//! composition method returns a new handle over a new node; nothing runs until
//! one of the terminal methods (see `terminal.rs`) reads it.

use std::any::Any;
use std::cmp::Ordering;
use std::hash::Hash;
use std::rc::Rc;

use lazyq_core::cursor::Cursor;
use lazyq_core::text::{default_compare, ToText};
use lazyq_core::QueryConfig;
use lazyq_operators::concat::Concat;
use lazyq_operators::distinct::Distinct;
use lazyq_operators::fusion::Extend;
use lazyq_operators::group::{Grouped, Grouping};
use lazyq_operators::join::{GroupJoin, Join, JoinKeys};
use lazyq_operators::partition::Partition;
use lazyq_operators::plan::NodePlan;
use lazyq_operators::sort::{Ordered, SortKey};
use lazyq_operators::source::{Collection, Empty, FromFn, Lifted, Once, Range, Repeat};
use lazyq_operators::zip::Zip;
use lazyq_operators::{Node, QueryNode};
use serde_json::{Map, Value};

use crate::async_linq::AsyncLinq;
use crate::ordered::OrderedLinq;

pub struct Linq<T> {
    pub(crate) node: Node<T>,
    pub(crate) config: Rc<QueryConfig>,
}

impl<T> Clone for Linq<T> {
    fn clone(&self) -> Self {
        Self {
            node: Rc::clone(&self.node),
            config: Rc::clone(&self.config),
        }
    }
}

impl<T: 'static> Linq<T> {
    pub fn from_node(node: Node<T>) -> Self {
        Self {
            node,
            config: Rc::new(QueryConfig::default()),
        }
    }

    /// Same query, different config. Derived handles inherit it.
    pub fn with_config(&self, config: QueryConfig) -> Self {
        Self {
            node: Rc::clone(&self.node),
            config: Rc::new(config),
        }
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    pub fn node(&self) -> &Node<T> {
        &self.node
    }

    pub(crate) fn derive<U>(&self, node: impl QueryNode<U> + 'static) -> Linq<U> {
        Linq {
            node: Rc::new(node),
            config: Rc::clone(&self.config),
        }
    }

    /// Fresh cursor; every call reads the source again.
    pub fn iter(&self) -> Cursor<'_, T> {
        self.node.cursor()
    }

    pub fn len_hint(&self) -> Option<usize> {
        self.node.len_hint()
    }

    pub fn explain(&self) -> NodePlan {
        self.node.describe()
    }

    pub fn to_async(&self) -> AsyncLinq<T> {
        AsyncLinq::from_parts(Rc::new(Lifted::new(Rc::clone(&self.node))), Rc::clone(&self.config))
    }

    // Sources.

    pub fn empty() -> Self {
        Self::from_node(Rc::new(Empty::new()))
    }

    /// `make` runs once per read and must return a fresh iterator.
    pub fn from_fn<F, I>(make: F) -> Self
    where
        F: Fn() -> I + 'static,
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
    {
        Self::from_node(Rc::new(FromFn::new(make)))
    }

    /// Wrap an iterator instance. Only the first read sees its elements.
    pub fn once<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
    {
        Self::from_node(Rc::new(Once::new(iter.into_iter())))
    }

    /// Entries of a JSON object, projected by `f`.
    pub fn from_object_with<F>(object: Map<String, Value>, f: F) -> Self
    where
        F: Fn((String, Value)) -> T + 'static,
    {
        Linq::from_object(object).select(f)
    }

    // Fusion: select / filter / select_many extend one pipeline.

    fn extend(&self) -> Extend<T> {
        match self.node.as_extend() {
            Some(e) => e.clone(),
            None => Extend::over(Rc::clone(&self.node)),
        }
    }

    pub fn select<U, F>(&self, f: F) -> Linq<U>
    where
        U: 'static,
        F: Fn(T) -> U + 'static,
    {
        self.derive(self.extend().project(f))
    }

    /// LINQ `where`.
    pub fn filter<F>(&self, predicate: F) -> Linq<T>
    where
        F: Fn(&T) -> bool + 'static,
    {
        self.derive(self.extend().filter(predicate))
    }

    /// Flattens exactly one level.
    pub fn select_many<U, I, F>(&self, f: F) -> Linq<U>
    where
        U: 'static,
        I: IntoIterator<Item = U>,
        I::IntoIter: 'static,
        F: Fn(T) -> I + 'static,
    {
        self.derive(self.extend().flatten(f))
    }

    // Partition / concat / zip.

    pub fn skip(&self, n: usize) -> Linq<T> {
        self.derive(Partition::skip(&self.node, n))
    }

    pub fn take(&self, n: usize) -> Linq<T> {
        self.derive(Partition::take(&self.node, n))
    }

    pub fn concat(&self, other: &Linq<T>) -> Linq<T> {
        self.concat_all([other.clone()])
    }

    pub fn concat_all(&self, others: impl IntoIterator<Item = Linq<T>>) -> Linq<T> {
        self.derive(Concat::new(&self.node, others.into_iter().map(|q| q.node)))
    }

    pub fn zip<U, R, F>(&self, other: &Linq<U>, combine: F) -> Linq<R>
    where
        U: 'static,
        R: 'static,
        F: Fn(T, U) -> R + 'static,
    {
        self.derive(Zip::new(
            Rc::clone(&self.node),
            Rc::clone(&other.node),
            combine,
        ))
    }

    pub fn distinct(&self) -> Linq<T>
    where
        T: Eq + Hash + Clone,
    {
        self.derive(Distinct::new(Rc::clone(&self.node)))
    }

    // Ordering. Each of these starts a new chain over the current node.

    fn ordered(&self, key: SortKey<T>) -> OrderedLinq<T> {
        OrderedLinq::new(
            Ordered::new(Rc::clone(&self.node), key),
            Rc::clone(&self.config),
        )
    }

    /// Elements by their text form.
    pub fn order(&self) -> OrderedLinq<T>
    where
        T: ToText,
    {
        self.ordered(SortKey::with(default_compare::<T>, false))
    }

    pub fn order_desc(&self) -> OrderedLinq<T>
    where
        T: ToText,
    {
        self.ordered(SortKey::with(default_compare::<T>, true))
    }

    pub fn order_with<C>(&self, cmp: C) -> OrderedLinq<T>
    where
        C: Fn(&T, &T) -> Ordering + 'static,
    {
        self.ordered(SortKey::with(cmp, false))
    }

    pub fn order_desc_with<C>(&self, cmp: C) -> OrderedLinq<T>
    where
        C: Fn(&T, &T) -> Ordering + 'static,
    {
        self.ordered(SortKey::with(cmp, true))
    }

    pub fn order_by<K, S>(&self, key: S) -> OrderedLinq<T>
    where
        K: ToText + 'static,
        S: Fn(&T) -> K + 'static,
    {
        self.ordered(SortKey::by(key, default_compare::<K>, false))
    }

    pub fn order_by_desc<K, S>(&self, key: S) -> OrderedLinq<T>
    where
        K: ToText + 'static,
        S: Fn(&T) -> K + 'static,
    {
        self.ordered(SortKey::by(key, default_compare::<K>, true))
    }

    pub fn order_by_with<K, S, C>(&self, key: S, cmp: C) -> OrderedLinq<T>
    where
        S: Fn(&T) -> K + 'static,
        C: Fn(&K, &K) -> Ordering + 'static,
    {
        self.ordered(SortKey::by(key, cmp, false))
    }

    pub fn order_by_desc_with<K, S, C>(&self, key: S, cmp: C) -> OrderedLinq<T>
    where
        S: Fn(&T) -> K + 'static,
        C: Fn(&K, &K) -> Ordering + 'static,
    {
        self.ordered(SortKey::by(key, cmp, true))
    }

    // Grouping and joins.

    pub fn group_by<K, S>(&self, key: S) -> Linq<Grouping<K, T>>
    where
        K: Eq + Hash + Clone + 'static,
        S: Fn(&T) -> K + 'static,
    {
        self.group_by_with(key, |t| t)
    }

    /// Group, keeping `value(element)` in each bucket.
    pub fn group_by_with<K, V, S, P>(&self, key: S, value: P) -> Linq<Grouping<K, V>>
    where
        K: Eq + Hash + Clone + 'static,
        V: 'static,
        S: Fn(&T) -> K + 'static,
        P: Fn(T) -> V + 'static,
    {
        self.derive(Grouped::new(
            Rc::clone(&self.node),
            key,
            value,
            self.config.group_capacity,
        ))
    }

    /// Inner join yielding `(outer, inner)` pairs.
    pub fn join<I, K, OK, IK>(&self, inner: &Linq<I>, outer_key: OK, inner_key: IK) -> Linq<(T, I)>
    where
        T: Clone,
        I: Clone + 'static,
        K: Eq + Hash + Clone + 'static,
        OK: Fn(&T) -> K + 'static,
        IK: Fn(&I) -> K + 'static,
    {
        self.join_with(inner, outer_key, inner_key, |o: &T, i: &I| (o.clone(), i.clone()))
    }

    pub fn join_with<I, K, R, OK, IK, F>(
        &self,
        inner: &Linq<I>,
        outer_key: OK,
        inner_key: IK,
        result: F,
    ) -> Linq<R>
    where
        I: 'static,
        K: Eq + Hash + Clone + 'static,
        R: 'static,
        OK: Fn(&T) -> K + 'static,
        IK: Fn(&I) -> K + 'static,
        F: Fn(&T, &I) -> R + 'static,
    {
        self.derive(Join::new(
            Rc::clone(&self.node),
            Rc::clone(&inner.node),
            JoinKeys::new(outer_key, inner_key, self.config.group_capacity),
            result,
        ))
    }

    /// One `(outer, matches)` per outer element; `matches` may be empty.
    pub fn group_join<I, K, OK, IK>(
        &self,
        inner: &Linq<I>,
        outer_key: OK,
        inner_key: IK,
    ) -> Linq<(T, Vec<I>)>
    where
        I: Clone + 'static,
        K: Eq + Hash + Clone + 'static,
        OK: Fn(&T) -> K + 'static,
        IK: Fn(&I) -> K + 'static,
    {
        self.group_join_with(inner, outer_key, inner_key, |o: T, is: &[I]| (o, is.to_vec()))
    }

    pub fn group_join_with<I, K, R, OK, IK, F>(
        &self,
        inner: &Linq<I>,
        outer_key: OK,
        inner_key: IK,
        result: F,
    ) -> Linq<R>
    where
        I: 'static,
        K: Eq + Hash + Clone + 'static,
        R: 'static,
        OK: Fn(&T) -> K + 'static,
        IK: Fn(&I) -> K + 'static,
        F: Fn(T, &[I]) -> R + 'static,
    {
        self.derive(GroupJoin::new(
            Rc::clone(&self.node),
            Rc::clone(&inner.node),
            JoinKeys::new(outer_key, inner_key, self.config.group_capacity),
            result,
        ))
    }
}

impl<T: Clone + 'static> Linq<T> {
    pub fn from_vec(items: Vec<T>) -> Self {
        Self::from_node(Rc::new(Collection::new(items)))
    }

    pub fn repeat(value: T, count: usize) -> Self {
        Self::from_node(Rc::new(Repeat::new(value, count)))
    }
}

impl Linq<i64> {
    /// `count` consecutive integers from `start`.
    pub fn range(start: i64, count: usize) -> Self {
        Self::range_step(start, count, 1)
    }

    pub fn range_step(start: i64, count: usize, step: i64) -> Self {
        Self::from_node(Rc::new(Range::new(start, count, step)))
    }
}

impl Linq<(String, Value)> {
    pub fn from_object(object: Map<String, Value>) -> Self {
        Self::from_node(Rc::new(Collection::new(object)))
    }
}

impl Linq<Box<dyn Any>> {
    /// Keep the elements whose concrete type is `U`.
    pub fn of_type<U: 'static>(&self) -> Linq<U> {
        self.select_many(|v: Box<dyn Any>| v.downcast::<U>().ok().map(|b| *b))
    }
}

impl<T: Clone + 'static> From<Vec<T>> for Linq<T> {
    fn from(items: Vec<T>) -> Self {
        Self::from_vec(items)
    }
}

impl<T: Clone + 'static> FromIterator<T> for Linq<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_node(Rc::new(Collection::new(iter)))
    }
}

impl<'a, T: 'static> IntoIterator for &'a Linq<T> {
    type Item = T;
    type IntoIter = Cursor<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
