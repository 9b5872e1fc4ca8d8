use std::marker::PhantomData;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use futures::stream::{Stream, StreamExt};
use lazyq_core::cursor::AsyncCursor;

use super::erased::{erase, peek, unerase, Erased, ErasedStreamNode, TypedStream};
use super::{append, preserves_len, walk, Operation, Walk};
use crate::plan::NodePlan;
use crate::traits::{AsyncNode, AsyncQueryNode};

pub type AsyncOperation = Operation<AsyncCursor<'static, Erased>>;

/// Async twin of [`super::Extend`]: flatten stages produce streams.
pub struct AsyncExtend<T> {
    source: Rc<dyn ErasedStreamNode>,
    ops: Rc<[AsyncOperation]>,
    _out: PhantomData<fn() -> T>,
}

impl<T> Clone for AsyncExtend<T> {
    fn clone(&self) -> Self {
        Self {
            source: Rc::clone(&self.source),
            ops: Rc::clone(&self.ops),
            _out: PhantomData,
        }
    }
}

impl<T: 'static> AsyncExtend<T> {
    pub fn over(source: AsyncNode<T>) -> Self {
        Self {
            source: Rc::new(TypedStream(source)),
            ops: Rc::from(Vec::new()),
            _out: PhantomData,
        }
    }

    pub fn stages(&self) -> usize {
        self.ops.len()
    }

    fn then<U>(&self, op: AsyncOperation) -> AsyncExtend<U> {
        AsyncExtend {
            source: Rc::clone(&self.source),
            ops: append(&self.ops, op),
            _out: PhantomData,
        }
    }

    pub fn project<U, F>(&self, f: F) -> AsyncExtend<U>
    where
        U: 'static,
        F: Fn(T) -> U + 'static,
    {
        self.then(Operation::Project(Rc::new(move |v: Erased| {
            erase(f(unerase::<T>(v)))
        })))
    }

    pub fn filter<F>(&self, predicate: F) -> AsyncExtend<T>
    where
        F: Fn(&T) -> bool + 'static,
    {
        self.then(Operation::Filter(Rc::new(move |v: &Erased| {
            predicate(peek::<T>(v))
        })))
    }

    pub fn flatten<U, S, F>(&self, f: F) -> AsyncExtend<U>
    where
        U: 'static,
        S: Stream<Item = U> + 'static,
        F: Fn(T) -> S + 'static,
    {
        self.then(Operation::Flatten(Rc::new(move |v: Erased| {
            f(unerase::<T>(v)).map(erase::<U>).boxed_local()
        })))
    }
}

impl<T: 'static> AsyncQueryNode<T> for AsyncExtend<T> {
    fn name(&self) -> &'static str {
        "extend"
    }

    fn stream(&self) -> AsyncCursor<'_, T> {
        let fused = FusionStream {
            ops: &self.ops,
            stack: vec![(0, self.source.erased_stream())],
        };
        fused.map(unerase::<T>).boxed_local()
    }

    fn len_hint(&self) -> Option<usize> {
        if preserves_len(&self.ops) {
            self.source.len_hint()
        } else {
            None
        }
    }

    fn describe(&self) -> NodePlan {
        let mut plan = NodePlan::new(self.name(), self.len_hint());
        for op in self.ops.iter() {
            plan = plan.with_detail(op.kind());
        }
        plan.with_input(self.source.describe())
    }

    fn as_extend(&self) -> Option<&AsyncExtend<T>> {
        Some(self)
    }
}

/// Same frame-stack walk as the sync cursor; only the innermost stream's
/// poll can suspend.
struct FusionStream<'a> {
    ops: &'a [AsyncOperation],
    stack: Vec<(usize, AsyncCursor<'a, Erased>)>,
}

impl Stream for FusionStream<'_> {
    type Item = Erased;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Erased>> {
        let this = self.get_mut();
        loop {
            let Some((resume, top)) = this.stack.last_mut() else {
                return Poll::Ready(None);
            };
            let Some(value) = futures::ready!(top.poll_next_unpin(cx)) else {
                this.stack.pop();
                continue;
            };
            match walk(this.ops, *resume, value) {
                Walk::Yield(v) => return Poll::Ready(Some(v)),
                Walk::Rejected => {}
                Walk::Descend(at, inner) => this.stack.push((at, inner)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::IterStream;
    use futures::executor::block_on;
    use futures::stream;

    fn nums(v: Vec<i32>) -> AsyncExtend<i32> {
        AsyncExtend::over(Rc::new(IterStream::new(v)))
    }

    #[test]
    fn stages_run_in_declared_order() {
        let q = nums(vec![1, 2, 3, 4]).project(|x| x * 10).filter(|x| *x > 15);
        let out: Vec<i32> = block_on(q.stream().collect());
        assert_eq!(out, vec![20, 30, 40]);
    }

    #[test]
    fn flatten_streams_in_order() {
        let q = nums(vec![1, 2])
            .flatten(|x| stream::iter(vec![x, x * 100]))
            .project(|x| x + 1);
        let out: Vec<i32> = block_on(q.stream().collect());
        assert_eq!(out, vec![2, 101, 3, 201]);
    }

    #[test]
    fn hint_survives_only_projection() {
        let base = nums(vec![1, 2, 3]);
        assert_eq!(base.project(|x| x).len_hint(), Some(3));
        assert_eq!(base.filter(|_| true).len_hint(), None);
    }
}
