//! First-encounter de-duplication. The seen-set lives in the cursor, so every
//! read starts from an empty set.

use std::collections::HashSet;
use std::hash::Hash;

use futures::{future, StreamExt};
use lazyq_core::cursor::{AsyncCursor, Cursor};

use crate::plan::NodePlan;
use crate::traits::{AsyncNode, AsyncQueryNode, Node, QueryNode};

pub struct Distinct<T> {
    source: Node<T>,
}

impl<T> Distinct<T> {
    pub fn new(source: Node<T>) -> Self {
        Self { source }
    }
}

impl<T: Eq + Hash + Clone + 'static> QueryNode<T> for Distinct<T> {
    fn name(&self) -> &'static str {
        "distinct"
    }

    fn cursor(&self) -> Cursor<'_, T> {
        let mut seen = HashSet::new();
        Box::new(self.source.cursor().filter(move |v| seen.insert(v.clone())))
    }

    fn describe(&self) -> NodePlan {
        NodePlan::new(self.name(), None).with_input(self.source.describe())
    }
}

pub struct AsyncDistinct<T> {
    source: AsyncNode<T>,
}

impl<T> AsyncDistinct<T> {
    pub fn new(source: AsyncNode<T>) -> Self {
        Self { source }
    }
}

impl<T: Eq + Hash + Clone + 'static> AsyncQueryNode<T> for AsyncDistinct<T> {
    fn name(&self) -> &'static str {
        "distinct"
    }

    fn stream(&self) -> AsyncCursor<'_, T> {
        let mut seen = HashSet::new();
        self.source
            .stream()
            .filter(move |v| future::ready(seen.insert(v.clone())))
            .boxed_local()
    }

    fn describe(&self) -> NodePlan {
        NodePlan::new(self.name(), None).with_input(self.source.describe())
    }
}
