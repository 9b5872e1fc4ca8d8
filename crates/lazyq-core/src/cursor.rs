//! The pull protocol.
//!
//! A cursor is a one-shot pull iterator: `Iterator` for sync sequences,
//! `Stream` for async ones. Terminal operations never loop over cursors
//! themselves; they hand a callback to [`drive`] / [`drive_async`], which
//! feeds it `Step::Item` for each element and a final `Step::Done`, and stops
//! the moment the callback breaks.

use std::future::Future;
use std::ops::ControlFlow;

use futures::stream::{self, LocalBoxStream, Stream, StreamExt};

/// Boxed sync cursor borrowed from the node that produced it.
pub type Cursor<'a, T> = Box<dyn Iterator<Item = T> + 'a>;

/// Boxed async cursor. Single-threaded, hence `Local`.
pub type AsyncCursor<'a, T> = LocalBoxStream<'a, T>;

/// One observation of a cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step<T> {
    Item(T),
    Done,
}

/// Drive `cursor` through `f`. Returns the value `f` broke with, or `None` if
/// it kept going through `Step::Done`.
pub fn drive<T, R, I, F>(cursor: I, mut f: F) -> Option<R>
where
    I: IntoIterator<Item = T>,
    F: FnMut(Step<T>) -> ControlFlow<R>,
{
    for item in cursor {
        if let ControlFlow::Break(r) = f(Step::Item(item)) {
            return Some(r);
        }
    }
    match f(Step::Done) {
        ControlFlow::Break(r) => Some(r),
        ControlFlow::Continue(()) => None,
    }
}

/// Async twin of [`drive`]. The callback itself is synchronous; suspension
/// only happens while waiting on the stream.
pub async fn drive_async<T, R, S, F>(stream: S, mut f: F) -> Option<R>
where
    S: Stream<Item = T>,
    F: FnMut(Step<T>) -> ControlFlow<R>,
{
    futures::pin_mut!(stream);
    while let Some(item) = stream.next().await {
        if let ControlFlow::Break(r) = f(Step::Item(item)) {
            return Some(r);
        }
    }
    match f(Step::Done) {
        ControlFlow::Break(r) => Some(r),
        ControlFlow::Continue(()) => None,
    }
}

/// A cursor whose backing iterator is built on the first pull, not when the
/// cursor is created.
pub fn deferred<'a, T, I, F>(build: F) -> Cursor<'a, T>
where
    F: FnOnce() -> I + 'a,
    I: IntoIterator<Item = T>,
    I::IntoIter: 'a,
    T: 'a,
{
    Box::new(std::iter::once_with(build).flatten())
}

/// Async twin of [`deferred`]: `build` is only polled once the stream is.
pub fn deferred_stream<'a, T, Fut, S>(build: Fut) -> AsyncCursor<'a, T>
where
    Fut: Future<Output = S> + 'a,
    S: Stream<Item = T> + 'a,
    T: 'a,
{
    Box::pin(stream::once(build).flatten())
}
