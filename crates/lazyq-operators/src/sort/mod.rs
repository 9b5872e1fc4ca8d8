//! Deferred multi-key sort.
//!
//! An ordering chain is a list of [`SortKey`]s, primary first. Nothing is
//! compared until an ordered node is read; every read materializes the source,
//! runs one stable sort with the whole chain, and yields from the buffer.

mod ordered;

use std::cmp::Ordering;
use std::rc::Rc;

pub use ordered::{AsyncOrdered, Ordered};

/// One level of an ordering chain. The key selector and its comparator are
/// fused into a single element comparison so levels with different key types
/// fit in one chain.
pub struct SortKey<T> {
    compare: Rc<dyn Fn(&T, &T) -> Ordering>,
    descending: bool,
}

impl<T> Clone for SortKey<T> {
    fn clone(&self) -> Self {
        Self {
            compare: Rc::clone(&self.compare),
            descending: self.descending,
        }
    }
}

impl<T: 'static> SortKey<T> {
    /// Compare `key(a)` with `key(b)` using `cmp`.
    pub fn by<K, S, C>(key: S, cmp: C, descending: bool) -> Self
    where
        S: Fn(&T) -> K + 'static,
        C: Fn(&K, &K) -> Ordering + 'static,
    {
        Self {
            compare: Rc::new(move |a, b| cmp(&key(a), &key(b))),
            descending,
        }
    }

    /// Compare elements directly.
    pub fn with<C>(cmp: C, descending: bool) -> Self
    where
        C: Fn(&T, &T) -> Ordering + 'static,
    {
        Self {
            compare: Rc::new(cmp),
            descending,
        }
    }
}

impl<T> SortKey<T> {
    pub fn descending(&self) -> bool {
        self.descending
    }

    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        let ord = (self.compare)(a, b);
        if self.descending {
            ord.reverse()
        } else {
            ord
        }
    }
}

/// First non-equal level decides.
pub fn compare_chain<T>(chain: &[SortKey<T>], a: &T, b: &T) -> Ordering {
    chain
        .iter()
        .map(|k| k.compare(a, b))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Stable: rows equal under the whole chain keep their input order.
pub fn sort_rows<T>(rows: &mut [T], chain: &[SortKey<T>]) {
    rows.sort_by(|a, b| compare_chain(chain, a, b));
}
