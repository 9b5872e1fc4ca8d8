//! The async query handle: the same composition surface as `Linq<T>`, read
//! through `Stream`s.

use std::any::Any;
use std::cmp::Ordering;
use std::hash::Hash;
use std::rc::Rc;

use futures::stream::{self, Stream};
use lazyq_core::cursor::AsyncCursor;
use lazyq_core::text::{default_compare, ToText};
use lazyq_core::QueryConfig;
use lazyq_operators::concat::AsyncConcat;
use lazyq_operators::distinct::AsyncDistinct;
use lazyq_operators::fusion::AsyncExtend;
use lazyq_operators::group::{AsyncGrouped, Grouping};
use lazyq_operators::join::{AsyncGroupJoin, AsyncJoin, JoinKeys};
use lazyq_operators::partition::AsyncPartition;
use lazyq_operators::plan::NodePlan;
use lazyq_operators::sort::{AsyncOrdered, SortKey};
use lazyq_operators::source::{IterStream, OnceStream, StreamFn};
use lazyq_operators::zip::AsyncZip;
use lazyq_operators::{AsyncNode, AsyncQueryNode};

use crate::ordered::AsyncOrderedLinq;

pub struct AsyncLinq<T> {
    pub(crate) node: AsyncNode<T>,
    pub(crate) config: Rc<QueryConfig>,
}

impl<T> Clone for AsyncLinq<T> {
    fn clone(&self) -> Self {
        Self {
            node: Rc::clone(&self.node),
            config: Rc::clone(&self.config),
        }
    }
}

impl<T: 'static> AsyncLinq<T> {
    pub fn from_node(node: AsyncNode<T>) -> Self {
        Self::from_parts(node, Rc::new(QueryConfig::default()))
    }

    pub(crate) fn from_parts(node: AsyncNode<T>, config: Rc<QueryConfig>) -> Self {
        Self { node, config }
    }

    pub fn with_config(&self, config: QueryConfig) -> Self {
        Self::from_parts(Rc::clone(&self.node), Rc::new(config))
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    pub fn node(&self) -> &AsyncNode<T> {
        &self.node
    }

    fn derive<U>(&self, node: impl AsyncQueryNode<U> + 'static) -> AsyncLinq<U> {
        AsyncLinq {
            node: Rc::new(node),
            config: Rc::clone(&self.config),
        }
    }

    /// Fresh stream; every call reads the source again.
    pub fn stream(&self) -> AsyncCursor<'_, T> {
        self.node.stream()
    }

    pub fn len_hint(&self) -> Option<usize> {
        self.node.len_hint()
    }

    pub fn explain(&self) -> NodePlan {
        self.node.describe()
    }

    // Sources.

    pub fn empty() -> Self {
        Self::from_stream_fn(stream::empty::<T>)
    }

    /// `make` runs once per read and must return a fresh stream.
    pub fn from_stream_fn<F, S>(make: F) -> Self
    where
        F: Fn() -> S + 'static,
        S: Stream<Item = T> + 'static,
    {
        Self::from_node(Rc::new(StreamFn::new(make)))
    }

    /// Wrap a stream instance. Only the first read sees its elements.
    pub fn once<S>(stream: S) -> Self
    where
        S: Stream<Item = T> + 'static,
    {
        Self::from_node(Rc::new(OnceStream::new(stream)))
    }

    // Fusion.

    fn extend(&self) -> AsyncExtend<T> {
        match self.node.as_extend() {
            Some(e) => e.clone(),
            None => AsyncExtend::over(Rc::clone(&self.node)),
        }
    }

    pub fn select<U, F>(&self, f: F) -> AsyncLinq<U>
    where
        U: 'static,
        F: Fn(T) -> U + 'static,
    {
        self.derive(self.extend().project(f))
    }

    pub fn filter<F>(&self, predicate: F) -> AsyncLinq<T>
    where
        F: Fn(&T) -> bool + 'static,
    {
        self.derive(self.extend().filter(predicate))
    }

    /// Flatten one level of inner streams.
    pub fn select_many<U, S, F>(&self, f: F) -> AsyncLinq<U>
    where
        U: 'static,
        S: Stream<Item = U> + 'static,
        F: Fn(T) -> S + 'static,
    {
        self.derive(self.extend().flatten(f))
    }

    /// Flatten one level of inner (sync) iterables.
    pub fn select_many_iter<U, I, F>(&self, f: F) -> AsyncLinq<U>
    where
        U: 'static,
        I: IntoIterator<Item = U>,
        I::IntoIter: 'static,
        F: Fn(T) -> I + 'static,
    {
        self.select_many(move |t| stream::iter(f(t)))
    }

    // Partition / concat / zip.

    pub fn skip(&self, n: usize) -> AsyncLinq<T> {
        self.derive(AsyncPartition::skip(&self.node, n))
    }

    pub fn take(&self, n: usize) -> AsyncLinq<T> {
        self.derive(AsyncPartition::take(&self.node, n))
    }

    pub fn concat(&self, other: &AsyncLinq<T>) -> AsyncLinq<T> {
        self.concat_all([other.clone()])
    }

    pub fn concat_all(&self, others: impl IntoIterator<Item = AsyncLinq<T>>) -> AsyncLinq<T> {
        self.derive(AsyncConcat::new(&self.node, others.into_iter().map(|q| q.node)))
    }

    pub fn zip<U, R, F>(&self, other: &AsyncLinq<U>, combine: F) -> AsyncLinq<R>
    where
        U: 'static,
        R: 'static,
        F: Fn(T, U) -> R + 'static,
    {
        self.derive(AsyncZip::new(
            Rc::clone(&self.node),
            Rc::clone(&other.node),
            combine,
        ))
    }

    pub fn distinct(&self) -> AsyncLinq<T>
    where
        T: Eq + Hash + Clone,
    {
        self.derive(AsyncDistinct::new(Rc::clone(&self.node)))
    }

    // Ordering.

    fn ordered(&self, key: SortKey<T>) -> AsyncOrderedLinq<T> {
        AsyncOrderedLinq::new(
            AsyncOrdered::new(Rc::clone(&self.node), key),
            Rc::clone(&self.config),
        )
    }

    pub fn order(&self) -> AsyncOrderedLinq<T>
    where
        T: ToText,
    {
        self.ordered(SortKey::with(default_compare::<T>, false))
    }

    pub fn order_desc(&self) -> AsyncOrderedLinq<T>
    where
        T: ToText,
    {
        self.ordered(SortKey::with(default_compare::<T>, true))
    }

    pub fn order_with<C>(&self, cmp: C) -> AsyncOrderedLinq<T>
    where
        C: Fn(&T, &T) -> Ordering + 'static,
    {
        self.ordered(SortKey::with(cmp, false))
    }

    pub fn order_desc_with<C>(&self, cmp: C) -> AsyncOrderedLinq<T>
    where
        C: Fn(&T, &T) -> Ordering + 'static,
    {
        self.ordered(SortKey::with(cmp, true))
    }

    pub fn order_by<K, S>(&self, key: S) -> AsyncOrderedLinq<T>
    where
        K: ToText + 'static,
        S: Fn(&T) -> K + 'static,
    {
        self.ordered(SortKey::by(key, default_compare::<K>, false))
    }

    pub fn order_by_desc<K, S>(&self, key: S) -> AsyncOrderedLinq<T>
    where
        K: ToText + 'static,
        S: Fn(&T) -> K + 'static,
    {
        self.ordered(SortKey::by(key, default_compare::<K>, true))
    }

    pub fn order_by_with<K, S, C>(&self, key: S, cmp: C) -> AsyncOrderedLinq<T>
    where
        S: Fn(&T) -> K + 'static,
        C: Fn(&K, &K) -> Ordering + 'static,
    {
        self.ordered(SortKey::by(key, cmp, false))
    }

    pub fn order_by_desc_with<K, S, C>(&self, key: S, cmp: C) -> AsyncOrderedLinq<T>
    where
        S: Fn(&T) -> K + 'static,
        C: Fn(&K, &K) -> Ordering + 'static,
    {
        self.ordered(SortKey::by(key, cmp, true))
    }

    // Grouping and joins.

    pub fn group_by<K, S>(&self, key: S) -> AsyncLinq<Grouping<K, T>>
    where
        K: Eq + Hash + Clone + 'static,
        S: Fn(&T) -> K + 'static,
    {
        self.group_by_with(key, |t| t)
    }

    pub fn group_by_with<K, V, S, P>(&self, key: S, value: P) -> AsyncLinq<Grouping<K, V>>
    where
        K: Eq + Hash + Clone + 'static,
        V: 'static,
        S: Fn(&T) -> K + 'static,
        P: Fn(T) -> V + 'static,
    {
        self.derive(AsyncGrouped::new(
            Rc::clone(&self.node),
            key,
            value,
            self.config.group_capacity,
        ))
    }

    pub fn join<I, K, OK, IK>(
        &self,
        inner: &AsyncLinq<I>,
        outer_key: OK,
        inner_key: IK,
    ) -> AsyncLinq<(T, I)>
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
        inner: &AsyncLinq<I>,
        outer_key: OK,
        inner_key: IK,
        result: F,
    ) -> AsyncLinq<R>
    where
        I: 'static,
        K: Eq + Hash + Clone + 'static,
        R: 'static,
        OK: Fn(&T) -> K + 'static,
        IK: Fn(&I) -> K + 'static,
        F: Fn(&T, &I) -> R + 'static,
    {
        self.derive(AsyncJoin::new(
            Rc::clone(&self.node),
            Rc::clone(&inner.node),
            JoinKeys::new(outer_key, inner_key, self.config.group_capacity),
            result,
        ))
    }

    pub fn group_join<I, K, OK, IK>(
        &self,
        inner: &AsyncLinq<I>,
        outer_key: OK,
        inner_key: IK,
    ) -> AsyncLinq<(T, Vec<I>)>
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
        inner: &AsyncLinq<I>,
        outer_key: OK,
        inner_key: IK,
        result: F,
    ) -> AsyncLinq<R>
    where
        I: 'static,
        K: Eq + Hash + Clone + 'static,
        R: 'static,
        OK: Fn(&T) -> K + 'static,
        IK: Fn(&I) -> K + 'static,
        F: Fn(T, &[I]) -> R + 'static,
    {
        self.derive(AsyncGroupJoin::new(
            Rc::clone(&self.node),
            Rc::clone(&inner.node),
            JoinKeys::new(outer_key, inner_key, self.config.group_capacity),
            result,
        ))
    }
}

impl<T: Clone + 'static> AsyncLinq<T> {
    pub fn from_vec(items: Vec<T>) -> Self {
        Self::from_node(Rc::new(IterStream::new(items)))
    }
}

impl AsyncLinq<Box<dyn Any>> {
    pub fn of_type<U: 'static>(&self) -> AsyncLinq<U> {
        self.select_many_iter(|v: Box<dyn Any>| v.downcast::<U>().ok().map(|b| *b))
    }
}

impl<T: Clone + 'static> From<Vec<T>> for AsyncLinq<T> {
    fn from(items: Vec<T>) -> Self {
        Self::from_vec(items)
    }
}

impl<T: Clone + 'static> FromIterator<T> for AsyncLinq<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_node(Rc::new(IterStream::new(iter)))
    }
}
