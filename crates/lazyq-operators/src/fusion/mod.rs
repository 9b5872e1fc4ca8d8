//! Operation fusion.
//!
//! Chained `select` / `filter` / `select_many` calls do not stack one node per
//! call. They accumulate into a single list of [`Operation`]s over one source,
//! and a single cursor walks every source element through the whole list. A
//! `Flatten` stage pushes a frame `(resume_index, inner_cursor)`; the inner
//! elements continue from `resume_index`, and the frame is popped when the
//! inner cursor runs dry.
//!
//! Stages are type-erased (`Box<dyn Any>`) so one list can hold functions of
//! different types. The typed builders on [`Extend`] / [`AsyncExtend`] are the
//! only way to append a stage, and they keep consecutive stages' input and
//! output types aligned.

mod erased;
mod stream;
mod sync;

use std::rc::Rc;

pub use stream::AsyncExtend;
pub use sync::Extend;

pub(crate) use erased::Erased;

/// One fusible stage. `C` is the cursor type a flatten produces.
pub enum Operation<C> {
    Project(Rc<dyn Fn(Erased) -> Erased>),
    Flatten(Rc<dyn Fn(Erased) -> C>),
    Filter(Rc<dyn Fn(&Erased) -> bool>),
}

impl<C> Clone for Operation<C> {
    fn clone(&self) -> Self {
        match self {
            Operation::Project(f) => Operation::Project(Rc::clone(f)),
            Operation::Flatten(f) => Operation::Flatten(Rc::clone(f)),
            Operation::Filter(f) => Operation::Filter(Rc::clone(f)),
        }
    }
}

impl<C> Operation<C> {
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::Project(_) => "project",
            Operation::Flatten(_) => "flatten",
            Operation::Filter(_) => "filter",
        }
    }
}

/// Outcome of walking one value through the stage list.
pub(crate) enum Walk<C> {
    Yield(Erased),
    Rejected,
    Descend(usize, C),
}

pub(crate) fn walk<C>(ops: &[Operation<C>], from: usize, mut value: Erased) -> Walk<C> {
    for (i, op) in ops.iter().enumerate().skip(from) {
        match op {
            Operation::Project(f) => value = f(value),
            Operation::Filter(p) => {
                if !p(&value) {
                    return Walk::Rejected;
                }
            }
            Operation::Flatten(f) => return Walk::Descend(i + 1, f(value)),
        }
    }
    Walk::Yield(value)
}

/// Length survives only if every stage maps one element to one element.
pub(crate) fn preserves_len<C>(ops: &[Operation<C>]) -> bool {
    ops.iter().all(|op| matches!(op, Operation::Project(_)))
}

pub(crate) fn append<C>(ops: &[Operation<C>], op: Operation<C>) -> Rc<[Operation<C>]> {
    let mut next = Vec::with_capacity(ops.len() + 1);
    next.extend(ops.iter().cloned());
    next.push(op);
    next.into()
}
