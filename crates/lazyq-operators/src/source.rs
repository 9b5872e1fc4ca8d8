//! Source adapters. Each one only has to hand out a fresh cursor per read and,
//! when it knows it, its exact length.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;

use futures::stream::{self, Stream, StreamExt};
use lazyq_core::cursor::{AsyncCursor, Cursor};

use crate::plan::NodePlan;
use crate::traits::{AsyncQueryNode, Node, QueryNode};

/// An owned buffer; elements are cloned out on every read.
pub struct Collection<T> {
    items: Rc<[T]>,
}

impl<T> Collection<T> {
    pub fn new(items: impl IntoIterator<Item = T>) -> Self {
        Self {
            items: items.into_iter().collect(),
        }
    }
}

impl<T: Clone + 'static> QueryNode<T> for Collection<T> {
    fn name(&self) -> &'static str {
        "collection"
    }

    fn cursor(&self) -> Cursor<'_, T> {
        Box::new(self.items.iter().cloned())
    }

    fn len_hint(&self) -> Option<usize> {
        Some(self.items.len())
    }
}

/// `count` integers starting at `start`, `step` apart.
#[derive(Debug, Clone, Copy)]
pub struct Range {
    pub start: i64,
    pub count: usize,
    pub step: i64,
}

impl Range {
    pub fn new(start: i64, count: usize, step: i64) -> Self {
        Self { start, count, step }
    }
}

impl QueryNode<i64> for Range {
    fn name(&self) -> &'static str {
        "range"
    }

    fn cursor(&self) -> Cursor<'_, i64> {
        let Range { start, count, step } = *self;
        Box::new((0..count).map(move |i| start + step * i as i64))
    }

    fn len_hint(&self) -> Option<usize> {
        Some(self.count)
    }

    fn describe(&self) -> NodePlan {
        NodePlan::new(self.name(), self.len_hint())
            .with_detail(format!("start={}", self.start))
            .with_detail(format!("step={}", self.step))
    }
}

/// The same value `count` times.
pub struct Repeat<T> {
    value: T,
    count: usize,
}

impl<T> Repeat<T> {
    pub fn new(value: T, count: usize) -> Self {
        Self { value, count }
    }
}

impl<T: Clone + 'static> QueryNode<T> for Repeat<T> {
    fn name(&self) -> &'static str {
        "repeat"
    }

    fn cursor(&self) -> Cursor<'_, T> {
        Box::new(std::iter::repeat(self.value.clone()).take(self.count))
    }

    fn len_hint(&self) -> Option<usize> {
        Some(self.count)
    }
}

pub struct Empty<T>(PhantomData<fn() -> T>);

impl<T> Empty<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for Empty<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> QueryNode<T> for Empty<T> {
    fn name(&self) -> &'static str {
        "empty"
    }

    fn cursor(&self) -> Cursor<'_, T> {
        Box::new(std::iter::empty())
    }

    fn len_hint(&self) -> Option<usize> {
        Some(0)
    }
}

/// A closure that builds a fresh iterator per read (generators, lazily
/// computed sources).
pub struct FromFn<F> {
    make: F,
}

impl<F> FromFn<F> {
    pub fn new(make: F) -> Self {
        Self { make }
    }
}

impl<F, I> QueryNode<I::Item> for FromFn<F>
where
    F: Fn() -> I,
    I: IntoIterator,
    I::IntoIter: 'static,
{
    fn name(&self) -> &'static str {
        "from_fn"
    }

    fn cursor(&self) -> Cursor<'_, I::Item> {
        Box::new((self.make)().into_iter())
    }
}

/// Wraps one iterator instance. Only the first read sees its elements; later
/// reads are empty.
pub struct Once<I> {
    inner: RefCell<Option<I>>,
}

impl<I> Once<I> {
    pub fn new(inner: I) -> Self {
        Self {
            inner: RefCell::new(Some(inner)),
        }
    }
}

impl<I: Iterator + 'static> QueryNode<I::Item> for Once<I> {
    fn name(&self) -> &'static str {
        "once"
    }

    fn cursor(&self) -> Cursor<'_, I::Item> {
        Box::new(self.inner.borrow_mut().take().into_iter().flatten())
    }
}

/// Async view over an owned buffer.
pub struct IterStream<T> {
    items: Rc<[T]>,
}

impl<T> IterStream<T> {
    pub fn new(items: impl IntoIterator<Item = T>) -> Self {
        Self {
            items: items.into_iter().collect(),
        }
    }
}

impl<T: Clone + 'static> AsyncQueryNode<T> for IterStream<T> {
    fn name(&self) -> &'static str {
        "collection"
    }

    fn stream(&self) -> AsyncCursor<'_, T> {
        stream::iter(self.items.iter().cloned()).boxed_local()
    }

    fn len_hint(&self) -> Option<usize> {
        Some(self.items.len())
    }
}

/// A closure that builds a fresh stream per read.
pub struct StreamFn<F> {
    make: F,
}

impl<F> StreamFn<F> {
    pub fn new(make: F) -> Self {
        Self { make }
    }
}

impl<F, S> AsyncQueryNode<S::Item> for StreamFn<F>
where
    F: Fn() -> S,
    S: Stream + 'static,
{
    fn name(&self) -> &'static str {
        "stream_fn"
    }

    fn stream(&self) -> AsyncCursor<'_, S::Item> {
        (self.make)().boxed_local()
    }
}

/// Wraps one stream instance; single-use like [`Once`].
pub struct OnceStream<S> {
    inner: RefCell<Option<S>>,
}

impl<S> OnceStream<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner: RefCell::new(Some(inner)),
        }
    }
}

impl<S: Stream + 'static> AsyncQueryNode<S::Item> for OnceStream<S> {
    fn name(&self) -> &'static str {
        "once"
    }

    fn stream(&self) -> AsyncCursor<'_, S::Item> {
        match self.inner.borrow_mut().take() {
            Some(s) => s.boxed_local(),
            None => stream::empty().boxed_local(),
        }
    }
}

/// A sync node read as a stream.
pub struct Lifted<T> {
    node: Node<T>,
}

impl<T> Lifted<T> {
    pub fn new(node: Node<T>) -> Self {
        Self { node }
    }
}

impl<T: 'static> AsyncQueryNode<T> for Lifted<T> {
    fn name(&self) -> &'static str {
        "lifted"
    }

    fn stream(&self) -> AsyncCursor<'_, T> {
        stream::iter(self.node.cursor()).boxed_local()
    }

    fn len_hint(&self) -> Option<usize> {
        self.node.len_hint()
    }

    fn describe(&self) -> NodePlan {
        NodePlan::new(self.name(), self.len_hint()).with_input(self.node.describe())
    }
}
