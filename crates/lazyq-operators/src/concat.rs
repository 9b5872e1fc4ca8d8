//! Sequential concatenation. Concatenating onto a concat extends its part
//! list rather than nesting.

use std::rc::Rc;

use futures::stream::{self, StreamExt};
use lazyq_core::cursor::{AsyncCursor, Cursor};
use lazyq_core::hint::sum_hints;

use crate::plan::NodePlan;
use crate::traits::{AsyncNode, AsyncQueryNode, Node, QueryNode};

pub struct Concat<T> {
    parts: Vec<Node<T>>,
}

impl<T: 'static> Concat<T> {
    /// `head` first, then each of `rest` in order.
    pub fn new(head: &Node<T>, rest: impl IntoIterator<Item = Node<T>>) -> Self {
        let mut parts = match head.as_concat() {
            Some(c) => c.parts.clone(),
            None => vec![Rc::clone(head)],
        };
        parts.extend(rest);
        Self { parts }
    }

    pub fn parts(&self) -> usize {
        self.parts.len()
    }
}

impl<T: 'static> QueryNode<T> for Concat<T> {
    fn name(&self) -> &'static str {
        "concat"
    }

    fn cursor(&self) -> Cursor<'_, T> {
        // `flat_map` opens a part's cursor only once the previous one is done.
        Box::new(self.parts.iter().flat_map(|p| p.cursor()))
    }

    fn len_hint(&self) -> Option<usize> {
        sum_hints(self.parts.iter().map(|p| p.len_hint()))
    }

    fn describe(&self) -> NodePlan {
        self.parts
            .iter()
            .fold(NodePlan::new(self.name(), self.len_hint()), |plan, p| {
                plan.with_input(p.describe())
            })
    }

    fn as_concat(&self) -> Option<&Concat<T>> {
        Some(self)
    }
}

pub struct AsyncConcat<T> {
    parts: Vec<AsyncNode<T>>,
}

impl<T: 'static> AsyncConcat<T> {
    pub fn new(head: &AsyncNode<T>, rest: impl IntoIterator<Item = AsyncNode<T>>) -> Self {
        let mut parts = match head.as_concat() {
            Some(c) => c.parts.clone(),
            None => vec![Rc::clone(head)],
        };
        parts.extend(rest);
        Self { parts }
    }

    pub fn parts(&self) -> usize {
        self.parts.len()
    }
}

impl<T: 'static> AsyncQueryNode<T> for AsyncConcat<T> {
    fn name(&self) -> &'static str {
        "concat"
    }

    fn stream(&self) -> AsyncCursor<'_, T> {
        stream::iter(self.parts.iter())
            .flat_map(|p| p.stream())
            .boxed_local()
    }

    fn len_hint(&self) -> Option<usize> {
        sum_hints(self.parts.iter().map(|p| p.len_hint()))
    }

    fn describe(&self) -> NodePlan {
        self.parts
            .iter()
            .fold(NodePlan::new(self.name(), self.len_hint()), |plan, p| {
                plan.with_input(p.describe())
            })
    }

    fn as_concat(&self) -> Option<&AsyncConcat<T>> {
        Some(self)
    }
}
