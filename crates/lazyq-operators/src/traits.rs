//! Query node traits + common interfaces.
//!
//! A node is an immutable description of a pending sequence computation.
//! Handles in `lazyq-exec` hold nodes behind `Rc` and ask them for a fresh
//! cursor on every terminal read.
//!
//! Invariants:
//! - `cursor()` never mutates the node or its source; every call starts over
//!   with independent state. (The single-use `source::Once*` adapters are the
//!   documented exception.)
//! - A cursor does no work until it is pulled.
//! - `len_hint()` is exact when it is `Some`.

use std::rc::Rc;

use lazyq_core::cursor::{AsyncCursor, Cursor};

use crate::concat::{AsyncConcat, Concat};
use crate::fusion::{AsyncExtend, Extend};
use crate::partition::{AsyncPartition, Partition};
use crate::plan::NodePlan;

/// Shared handle to a sync node.
pub type Node<T> = Rc<dyn QueryNode<T>>;

/// Shared handle to an async node.
pub type AsyncNode<T> = Rc<dyn AsyncQueryNode<T>>;

pub trait QueryNode<T> {
    /// Human-readable node name (stable).
    fn name(&self) -> &'static str;

    /// Fresh cursor over the node's elements.
    fn cursor(&self) -> Cursor<'_, T>;

    /// Exact element count when known without iterating.
    fn len_hint(&self) -> Option<usize> {
        None
    }

    fn describe(&self) -> NodePlan {
        NodePlan::new(self.name(), self.len_hint())
    }

    // Composition hooks: builders use these to extend a node of the same kind
    // instead of stacking another layer on top of it.

    fn as_extend(&self) -> Option<&Extend<T>> {
        None
    }

    fn as_partition(&self) -> Option<&Partition<T>> {
        None
    }

    fn as_concat(&self) -> Option<&Concat<T>> {
        None
    }
}

pub trait AsyncQueryNode<T> {
    fn name(&self) -> &'static str;

    /// Fresh stream over the node's elements.
    fn stream(&self) -> AsyncCursor<'_, T>;

    fn len_hint(&self) -> Option<usize> {
        None
    }

    fn describe(&self) -> NodePlan {
        NodePlan::new(self.name(), self.len_hint())
    }

    fn as_extend(&self) -> Option<&AsyncExtend<T>> {
        None
    }

    fn as_partition(&self) -> Option<&AsyncPartition<T>> {
        None
    }

    fn as_concat(&self) -> Option<&AsyncConcat<T>> {
        None
    }
}
