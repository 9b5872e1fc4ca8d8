//! Skip/take windows.
//!
//! A window is `(offset, limit)` over one source. Chained `skip`/`take` calls
//! fold into a single window instead of stacking nodes:
//! `skip(n)` moves the offset and shrinks an existing limit, `take(n)` clamps
//! the limit.

use std::rc::Rc;

use futures::StreamExt;
use lazyq_core::cursor::{AsyncCursor, Cursor};
use lazyq_core::hint::window_hint;

use crate::plan::NodePlan;
use crate::traits::{AsyncNode, AsyncQueryNode, Node, QueryNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Window {
    pub offset: usize,
    pub limit: Option<usize>,
}

impl Window {
    pub fn skip(self, n: usize) -> Self {
        Self {
            offset: self.offset.saturating_add(n),
            limit: self.limit.map(|l| l.saturating_sub(n)),
        }
    }

    pub fn take(self, n: usize) -> Self {
        Self {
            offset: self.offset,
            limit: Some(self.limit.map_or(n, |l| l.min(n))),
        }
    }

    fn describe(&self, plan: NodePlan) -> NodePlan {
        let plan = plan.with_detail(format!("offset={}", self.offset));
        match self.limit {
            Some(l) => plan.with_detail(format!("limit={l}")),
            None => plan,
        }
    }
}

pub struct Partition<T> {
    source: Node<T>,
    window: Window,
}

impl<T: 'static> Partition<T> {
    pub fn new(source: Node<T>, window: Window) -> Self {
        Self { source, window }
    }

    /// Narrow `source`, folding into it when it already is a partition.
    pub fn skip(source: &Node<T>, n: usize) -> Self {
        match source.as_partition() {
            Some(p) => Self::new(Rc::clone(&p.source), p.window.skip(n)),
            None => Self::new(Rc::clone(source), Window::default().skip(n)),
        }
    }

    pub fn take(source: &Node<T>, n: usize) -> Self {
        match source.as_partition() {
            Some(p) => Self::new(Rc::clone(&p.source), p.window.take(n)),
            None => Self::new(Rc::clone(source), Window::default().take(n)),
        }
    }

    pub fn window(&self) -> Window {
        self.window
    }
}

impl<T: 'static> QueryNode<T> for Partition<T> {
    fn name(&self) -> &'static str {
        "partition"
    }

    fn cursor(&self) -> Cursor<'_, T> {
        let Window { offset, limit } = self.window;
        // A zero limit must not touch the source at all.
        if limit == Some(0) {
            return Box::new(std::iter::empty());
        }
        let rest = self.source.cursor().skip(offset);
        match limit {
            Some(l) => Box::new(rest.take(l)),
            None => Box::new(rest),
        }
    }

    fn len_hint(&self) -> Option<usize> {
        window_hint(self.source.len_hint(), self.window.offset, self.window.limit)
    }

    fn describe(&self) -> NodePlan {
        self.window
            .describe(NodePlan::new(self.name(), self.len_hint()))
            .with_input(self.source.describe())
    }

    fn as_partition(&self) -> Option<&Partition<T>> {
        Some(self)
    }
}

pub struct AsyncPartition<T> {
    source: AsyncNode<T>,
    window: Window,
}

impl<T: 'static> AsyncPartition<T> {
    pub fn new(source: AsyncNode<T>, window: Window) -> Self {
        Self { source, window }
    }

    pub fn skip(source: &AsyncNode<T>, n: usize) -> Self {
        match source.as_partition() {
            Some(p) => Self::new(Rc::clone(&p.source), p.window.skip(n)),
            None => Self::new(Rc::clone(source), Window::default().skip(n)),
        }
    }

    pub fn take(source: &AsyncNode<T>, n: usize) -> Self {
        match source.as_partition() {
            Some(p) => Self::new(Rc::clone(&p.source), p.window.take(n)),
            None => Self::new(Rc::clone(source), Window::default().take(n)),
        }
    }

    pub fn window(&self) -> Window {
        self.window
    }
}

impl<T: 'static> AsyncQueryNode<T> for AsyncPartition<T> {
    fn name(&self) -> &'static str {
        "partition"
    }

    fn stream(&self) -> AsyncCursor<'_, T> {
        let Window { offset, limit } = self.window;
        if limit == Some(0) {
            return futures::stream::empty().boxed_local();
        }
        let rest = self.source.stream().skip(offset);
        match limit {
            Some(l) => rest.take(l).boxed_local(),
            None => rest.boxed_local(),
        }
    }

    fn len_hint(&self) -> Option<usize> {
        window_hint(self.source.len_hint(), self.window.offset, self.window.limit)
    }

    fn describe(&self) -> NodePlan {
        self.window
            .describe(NodePlan::new(self.name(), self.len_hint()))
            .with_input(self.source.describe())
    }

    fn as_partition(&self) -> Option<&AsyncPartition<T>> {
        Some(self)
    }
}
