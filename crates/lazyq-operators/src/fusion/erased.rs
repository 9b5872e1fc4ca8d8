use std::any::Any;

use lazyq_core::cursor::{AsyncCursor, Cursor};
use futures::StreamExt;

use crate::plan::NodePlan;
use crate::traits::{AsyncNode, Node};

pub(crate) type Erased = Box<dyn Any>;

pub(crate) fn erase<T: 'static>(value: T) -> Erased {
    Box::new(value)
}

pub(crate) fn unerase<T: 'static>(value: Erased) -> T {
    match value.downcast::<T>() {
        Ok(v) => *v,
        Err(_) => panic!(
            "fusion stage produced a value that is not a {}",
            std::any::type_name::<T>()
        ),
    }
}

pub(crate) fn peek<T: 'static>(value: &Erased) -> &T {
    match value.downcast_ref::<T>() {
        Some(v) => v,
        None => panic!(
            "fusion stage received a value that is not a {}",
            std::any::type_name::<T>()
        ),
    }
}

/// A source node with its element type forgotten.
pub(crate) trait ErasedNode {
    fn erased_cursor(&self) -> Cursor<'_, Erased>;
    fn len_hint(&self) -> Option<usize>;
    fn describe(&self) -> NodePlan;
}

pub(crate) struct Typed<S>(pub Node<S>);

impl<S: 'static> ErasedNode for Typed<S> {
    fn erased_cursor(&self) -> Cursor<'_, Erased> {
        Box::new(self.0.cursor().map(erase::<S>))
    }

    fn len_hint(&self) -> Option<usize> {
        self.0.len_hint()
    }

    fn describe(&self) -> NodePlan {
        self.0.describe()
    }
}

pub(crate) trait ErasedStreamNode {
    fn erased_stream(&self) -> AsyncCursor<'_, Erased>;
    fn len_hint(&self) -> Option<usize>;
    fn describe(&self) -> NodePlan;
}

pub(crate) struct TypedStream<S>(pub AsyncNode<S>);

impl<S: 'static> ErasedStreamNode for TypedStream<S> {
    fn erased_stream(&self) -> AsyncCursor<'_, Erased> {
        self.0.stream().map(erase::<S>).boxed_local()
    }

    fn len_hint(&self) -> Option<usize> {
        self.0.len_hint()
    }

    fn describe(&self) -> NodePlan {
        self.0.describe()
    }
}
