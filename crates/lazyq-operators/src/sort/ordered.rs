use std::rc::Rc;

use futures::stream::{self, StreamExt};
use lazyq_core::cursor::{deferred, deferred_stream, AsyncCursor, Cursor};
use lazyq_core::metrics;

use super::{sort_rows, SortKey};
use crate::plan::NodePlan;
use crate::traits::{AsyncNode, AsyncQueryNode, Node, QueryNode};

fn describe_chain<T>(plan: NodePlan, chain: &[SortKey<T>]) -> NodePlan {
    chain.iter().fold(plan, |plan, k| {
        plan.with_detail(if k.descending() { "desc" } else { "asc" })
    })
}

/// A source plus its ordering chain.
pub struct Ordered<T> {
    source: Node<T>,
    chain: Rc<[SortKey<T>]>,
}

impl<T: 'static> Ordered<T> {
    pub fn new(source: Node<T>, key: SortKey<T>) -> Self {
        Self {
            source,
            chain: Rc::from(vec![key]),
        }
    }

    /// Same source, one more tie-breaker.
    pub fn then(&self, key: SortKey<T>) -> Self {
        let mut chain = self.chain.to_vec();
        chain.push(key);
        Self {
            source: Rc::clone(&self.source),
            chain: chain.into(),
        }
    }

    pub fn levels(&self) -> usize {
        self.chain.len()
    }
}

impl<T: 'static> QueryNode<T> for Ordered<T> {
    fn name(&self) -> &'static str {
        "order"
    }

    fn cursor(&self) -> Cursor<'_, T> {
        deferred(move || {
            let mut rows: Vec<T> = self.source.cursor().collect();
            sort_rows(&mut rows, &self.chain);
            metrics::materialized("order", rows.len(), None);
            rows
        })
    }

    fn len_hint(&self) -> Option<usize> {
        self.source.len_hint()
    }

    fn describe(&self) -> NodePlan {
        describe_chain(NodePlan::new(self.name(), self.len_hint()), &self.chain)
            .with_input(self.source.describe())
    }
}

pub struct AsyncOrdered<T> {
    source: AsyncNode<T>,
    chain: Rc<[SortKey<T>]>,
}

impl<T: 'static> AsyncOrdered<T> {
    pub fn new(source: AsyncNode<T>, key: SortKey<T>) -> Self {
        Self {
            source,
            chain: Rc::from(vec![key]),
        }
    }

    pub fn then(&self, key: SortKey<T>) -> Self {
        let mut chain = self.chain.to_vec();
        chain.push(key);
        Self {
            source: Rc::clone(&self.source),
            chain: chain.into(),
        }
    }

    pub fn levels(&self) -> usize {
        self.chain.len()
    }
}

impl<T: 'static> AsyncQueryNode<T> for AsyncOrdered<T> {
    fn name(&self) -> &'static str {
        "order"
    }

    fn stream(&self) -> AsyncCursor<'_, T> {
        deferred_stream(async move {
            let mut rows: Vec<T> = self.source.stream().collect().await;
            sort_rows(&mut rows, &self.chain);
            metrics::materialized("order", rows.len(), None);
            stream::iter(rows)
        })
    }

    fn len_hint(&self) -> Option<usize> {
        self.source.len_hint()
    }

    fn describe(&self) -> NodePlan {
        describe_chain(NodePlan::new(self.name(), self.len_hint()), &self.chain)
            .with_input(self.source.describe())
    }
}
