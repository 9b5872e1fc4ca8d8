//! Ordered handles: the only place `then_by` exists.

use std::cmp::Ordering;
use std::ops::Deref;
use std::rc::Rc;

use lazyq_core::text::{default_compare, ToText};
use lazyq_core::QueryConfig;
use lazyq_operators::sort::{AsyncOrdered, Ordered, SortKey};

use crate::async_linq::AsyncLinq;
use crate::linq::Linq;

/// A `Linq<T>` whose last step is an ordering chain that can still take
/// tie-breakers. Derefs to the plain handle for everything else.
pub struct OrderedLinq<T> {
    ordered: Rc<Ordered<T>>,
    linq: Linq<T>,
}

impl<T> Clone for OrderedLinq<T> {
    fn clone(&self) -> Self {
        Self {
            ordered: Rc::clone(&self.ordered),
            linq: self.linq.clone(),
        }
    }
}

impl<T: 'static> OrderedLinq<T> {
    pub(crate) fn new(ordered: Ordered<T>, config: Rc<QueryConfig>) -> Self {
        let ordered = Rc::new(ordered);
        let linq = Linq {
            node: ordered.clone(),
            config,
        };
        Self { ordered, linq }
    }

    fn then(&self, key: SortKey<T>) -> Self {
        Self::new(self.ordered.then(key), Rc::clone(&self.linq.config))
    }

    pub fn then_by<K, S>(&self, key: S) -> Self
    where
        K: ToText + 'static,
        S: Fn(&T) -> K + 'static,
    {
        self.then(SortKey::by(key, default_compare::<K>, false))
    }

    pub fn then_by_desc<K, S>(&self, key: S) -> Self
    where
        K: ToText + 'static,
        S: Fn(&T) -> K + 'static,
    {
        self.then(SortKey::by(key, default_compare::<K>, true))
    }

    pub fn then_by_with<K, S, C>(&self, key: S, cmp: C) -> Self
    where
        S: Fn(&T) -> K + 'static,
        C: Fn(&K, &K) -> Ordering + 'static,
    {
        self.then(SortKey::by(key, cmp, false))
    }

    pub fn then_by_desc_with<K, S, C>(&self, key: S, cmp: C) -> Self
    where
        S: Fn(&T) -> K + 'static,
        C: Fn(&K, &K) -> Ordering + 'static,
    {
        self.then(SortKey::by(key, cmp, true))
    }

    pub fn levels(&self) -> usize {
        self.ordered.levels()
    }

    pub fn into_linq(self) -> Linq<T> {
        self.linq
    }
}

impl<T> Deref for OrderedLinq<T> {
    type Target = Linq<T>;

    fn deref(&self) -> &Linq<T> {
        &self.linq
    }
}

pub struct AsyncOrderedLinq<T> {
    ordered: Rc<AsyncOrdered<T>>,
    linq: AsyncLinq<T>,
}

impl<T> Clone for AsyncOrderedLinq<T> {
    fn clone(&self) -> Self {
        Self {
            ordered: Rc::clone(&self.ordered),
            linq: self.linq.clone(),
        }
    }
}

impl<T: 'static> AsyncOrderedLinq<T> {
    pub(crate) fn new(ordered: AsyncOrdered<T>, config: Rc<QueryConfig>) -> Self {
        let ordered = Rc::new(ordered);
        let linq = AsyncLinq::from_parts(ordered.clone(), config);
        Self { ordered, linq }
    }

    fn then(&self, key: SortKey<T>) -> Self {
        Self::new(self.ordered.then(key), Rc::clone(&self.linq.config))
    }

    pub fn then_by<K, S>(&self, key: S) -> Self
    where
        K: ToText + 'static,
        S: Fn(&T) -> K + 'static,
    {
        self.then(SortKey::by(key, default_compare::<K>, false))
    }

    pub fn then_by_desc<K, S>(&self, key: S) -> Self
    where
        K: ToText + 'static,
        S: Fn(&T) -> K + 'static,
    {
        self.then(SortKey::by(key, default_compare::<K>, true))
    }

    pub fn then_by_with<K, S, C>(&self, key: S, cmp: C) -> Self
    where
        S: Fn(&T) -> K + 'static,
        C: Fn(&K, &K) -> Ordering + 'static,
    {
        self.then(SortKey::by(key, cmp, false))
    }

    pub fn then_by_desc_with<K, S, C>(&self, key: S, cmp: C) -> Self
    where
        S: Fn(&T) -> K + 'static,
        C: Fn(&K, &K) -> Ordering + 'static,
    {
        self.then(SortKey::by(key, cmp, true))
    }

    pub fn levels(&self) -> usize {
        self.ordered.levels()
    }

    pub fn into_linq(self) -> AsyncLinq<T> {
        self.linq
    }
}

impl<T> Deref for AsyncOrderedLinq<T> {
    type Target = AsyncLinq<T>;

    fn deref(&self) -> &AsyncLinq<T> {
        &self.linq
    }
}
