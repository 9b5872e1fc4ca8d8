use std::marker::PhantomData;
use std::rc::Rc;

use lazyq_core::cursor::Cursor;

use super::erased::{erase, peek, unerase, Erased, ErasedNode, Typed};
use super::{append, preserves_len, walk, Operation, Walk};
use crate::plan::NodePlan;
use crate::traits::{Node, QueryNode};

pub type SyncOperation = Operation<Cursor<'static, Erased>>;

/// A source plus the fused stages applied to it, yielding `T`.
pub struct Extend<T> {
    source: Rc<dyn ErasedNode>,
    ops: Rc<[SyncOperation]>,
    _out: PhantomData<fn() -> T>,
}

impl<T> Clone for Extend<T> {
    fn clone(&self) -> Self {
        Self {
            source: Rc::clone(&self.source),
            ops: Rc::clone(&self.ops),
            _out: PhantomData,
        }
    }
}

impl<T: 'static> Extend<T> {
    /// A pipeline with no stages yet.
    pub fn over(source: Node<T>) -> Self {
        Self {
            source: Rc::new(Typed(source)),
            ops: Rc::from(Vec::new()),
            _out: PhantomData,
        }
    }

    pub fn stages(&self) -> usize {
        self.ops.len()
    }

    fn then<U>(&self, op: SyncOperation) -> Extend<U> {
        Extend {
            source: Rc::clone(&self.source),
            ops: append(&self.ops, op),
            _out: PhantomData,
        }
    }

    pub fn project<U, F>(&self, f: F) -> Extend<U>
    where
        U: 'static,
        F: Fn(T) -> U + 'static,
    {
        self.then(Operation::Project(Rc::new(move |v: Erased| {
            erase(f(unerase::<T>(v)))
        })))
    }

    pub fn filter<F>(&self, predicate: F) -> Extend<T>
    where
        F: Fn(&T) -> bool + 'static,
    {
        self.then(Operation::Filter(Rc::new(move |v: &Erased| {
            predicate(peek::<T>(v))
        })))
    }

    pub fn flatten<U, I, F>(&self, f: F) -> Extend<U>
    where
        U: 'static,
        I: IntoIterator<Item = U>,
        I::IntoIter: 'static,
        F: Fn(T) -> I + 'static,
    {
        self.then(Operation::Flatten(Rc::new(move |v: Erased| {
            let inner: Cursor<'static, Erased> =
                Box::new(f(unerase::<T>(v)).into_iter().map(erase::<U>));
            inner
        })))
    }
}

impl<T: 'static> QueryNode<T> for Extend<T> {
    fn name(&self) -> &'static str {
        "extend"
    }

    fn cursor(&self) -> Cursor<'_, T> {
        let fused = FusionCursor {
            ops: &self.ops,
            stack: vec![(0, self.source.erased_cursor())],
        };
        Box::new(fused.map(unerase::<T>))
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

    fn as_extend(&self) -> Option<&Extend<T>> {
        Some(self)
    }
}

/// Frame stack walker. The bottom frame reads the source; every `Flatten`
/// pushes a frame that resumes after it.
struct FusionCursor<'a> {
    ops: &'a [SyncOperation],
    stack: Vec<(usize, Cursor<'a, Erased>)>,
}

impl Iterator for FusionCursor<'_> {
    type Item = Erased;

    fn next(&mut self) -> Option<Erased> {
        loop {
            let (resume, top) = self.stack.last_mut()?;
            let Some(value) = top.next() else {
                self.stack.pop();
                continue;
            };
            match walk(self.ops, *resume, value) {
                Walk::Yield(v) => return Some(v),
                Walk::Rejected => {}
                Walk::Descend(at, inner) => self.stack.push((at, inner)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Collection;
    use std::cell::RefCell;

    fn nums(v: Vec<i32>) -> Extend<i32> {
        Extend::over(Rc::new(Collection::new(v)))
    }

    #[test]
    fn stages_run_in_declared_order() {
        let q = nums(vec![1, 2, 3, 4]).project(|x| x * 10).filter(|x| *x > 15);
        assert_eq!(q.cursor().collect::<Vec<_>>(), vec![20, 30, 40]);

        let q = nums(vec![1, 2, 3, 4]).filter(|x| *x > 1).project(|x| x * 10);
        assert_eq!(q.cursor().collect::<Vec<_>>(), vec![20, 30, 40]);
    }

    #[test]
    fn flatten_feeds_later_stages() {
        let q = nums(vec![1, 2, 3])
            .flatten(|x| vec![x; x as usize])
            .filter(|x| *x != 2)
            .project(|x| x.to_string());
        assert_eq!(q.cursor().collect::<Vec<_>>(), vec!["1", "3", "3", "3"]);
    }

    #[test]
    fn nested_flatten() {
        let q = nums(vec![1, 2])
            .flatten(|x| vec![x, x + 10])
            .flatten(|y| vec![y, -y]);
        assert_eq!(
            q.cursor().collect::<Vec<_>>(),
            vec![1, -1, 11, -11, 2, -2, 12, -12]
        );
    }

    #[test]
    fn hint_survives_only_projection() {
        let base = nums(vec![1, 2, 3]);
        assert_eq!(base.project(|x| x + 1).len_hint(), Some(3));
        assert_eq!(base.filter(|_| true).len_hint(), None);
        assert_eq!(base.flatten(|x| vec![x]).len_hint(), None);
    }

    #[test]
    fn appending_leaves_prefix_untouched() {
        let base = nums(vec![1, 2, 3]).project(|x| x * 2);
        let longer = base.filter(|x| *x > 2);
        assert_eq!(base.stages(), 1);
        assert_eq!(longer.stages(), 2);
        assert_eq!(base.cursor().collect::<Vec<_>>(), vec![2, 4, 6]);
    }

    #[test]
    fn pulls_lazily() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        let q = nums(vec![1, 2, 3]).project(move |x| {
            log.borrow_mut().push(x);
            x
        });
        let mut cur = q.cursor();
        assert!(seen.borrow().is_empty());
        cur.next();
        assert_eq!(*seen.borrow(), vec![1]);
    }
}
