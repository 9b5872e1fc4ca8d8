//! Pairwise combination of two sequences, stopping at the shorter one.

use std::rc::Rc;

use futures::stream::{self, StreamExt};
use lazyq_core::cursor::{AsyncCursor, Cursor};
use lazyq_core::hint::min_hints;

use crate::plan::NodePlan;
use crate::traits::{AsyncNode, AsyncQueryNode, Node, QueryNode};

pub struct Zip<A, B, R> {
    left: Node<A>,
    right: Node<B>,
    combine: Rc<dyn Fn(A, B) -> R>,
}

impl<A, B, R> Zip<A, B, R> {
    pub fn new(left: Node<A>, right: Node<B>, combine: impl Fn(A, B) -> R + 'static) -> Self {
        Self {
            left,
            right,
            combine: Rc::new(combine),
        }
    }
}

impl<A: 'static, B: 'static, R: 'static> QueryNode<R> for Zip<A, B, R> {
    fn name(&self) -> &'static str {
        "zip"
    }

    fn cursor(&self) -> Cursor<'_, R> {
        // std's zip pulls the left side first and leaves the right side alone
        // once the left is exhausted.
        let combine = &self.combine;
        Box::new(
            self.left
                .cursor()
                .zip(self.right.cursor())
                .map(move |(a, b)| combine(a, b)),
        )
    }

    fn len_hint(&self) -> Option<usize> {
        min_hints(self.left.len_hint(), self.right.len_hint())
    }

    fn describe(&self) -> NodePlan {
        NodePlan::new(self.name(), self.len_hint())
            .with_input(self.left.describe())
            .with_input(self.right.describe())
    }
}

pub struct AsyncZip<A, B, R> {
    left: AsyncNode<A>,
    right: AsyncNode<B>,
    combine: Rc<dyn Fn(A, B) -> R>,
}

impl<A, B, R> AsyncZip<A, B, R> {
    pub fn new(
        left: AsyncNode<A>,
        right: AsyncNode<B>,
        combine: impl Fn(A, B) -> R + 'static,
    ) -> Self {
        Self {
            left,
            right,
            combine: Rc::new(combine),
        }
    }
}

impl<A: 'static, B: 'static, R: 'static> AsyncQueryNode<R> for AsyncZip<A, B, R> {
    fn name(&self) -> &'static str {
        "zip"
    }

    fn stream(&self) -> AsyncCursor<'_, R> {
        // The right side is only polled once the left one has produced.
        let combine = &self.combine;
        let state = (self.left.stream(), self.right.stream());
        stream::unfold(state, move |(mut left, mut right)| async move {
            let Some(a) = left.next().await else {
                return None;
            };
            let Some(b) = right.next().await else {
                return None;
            };
            Some((combine(a, b), (left, right)))
        })
        .boxed_local()
    }

    fn len_hint(&self) -> Option<usize> {
        min_hints(self.left.len_hint(), self.right.len_hint())
    }

    fn describe(&self) -> NodePlan {
        NodePlan::new(self.name(), self.len_hint())
            .with_input(self.left.describe())
            .with_input(self.right.describe())
    }
}
