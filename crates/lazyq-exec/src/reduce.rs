//! Terminal reducers.
//!
//! Each terminal operation is a small state machine fed one element at a time
//! by `iterate`. Breaking ends the read early; otherwise `finish` produces the
//! answer once the cursor is exhausted. Sync and async handles share these.

use std::collections::HashMap;
use std::hash::Hash;
use std::ops::ControlFlow;

use lazyq_core::coerce::ToNumber;
use lazyq_core::text::ToText;
use lazyq_core::{Error, Result};
use serde::Serialize;
use serde_json::{Map, Value};

pub trait Reduce<T> {
    type Output;

    fn step(&mut self, item: T) -> ControlFlow<Self::Output>;

    fn finish(self) -> Self::Output;
}

/// Earliest element satisfying the predicate.
pub struct First<P> {
    pred: P,
}

impl<P> First<P> {
    pub fn new(pred: P) -> Self {
        Self { pred }
    }
}

impl<T, P: FnMut(&T) -> bool> Reduce<T> for First<P> {
    type Output = Option<T>;

    fn step(&mut self, item: T) -> ControlFlow<Option<T>> {
        if (self.pred)(&item) {
            ControlFlow::Break(Some(item))
        } else {
            ControlFlow::Continue(())
        }
    }

    fn finish(self) -> Option<T> {
        None
    }
}

/// Latest element satisfying the predicate; needs the whole sequence.
pub struct Last<T, P> {
    pred: P,
    found: Option<T>,
}

impl<T, P> Last<T, P> {
    pub fn new(pred: P) -> Self {
        Self { pred, found: None }
    }
}

impl<T, P: FnMut(&T) -> bool> Reduce<T> for Last<T, P> {
    type Output = Option<T>;

    fn step(&mut self, item: T) -> ControlFlow<Option<T>> {
        if (self.pred)(&item) {
            self.found = Some(item);
        }
        ControlFlow::Continue(())
    }

    fn finish(self) -> Option<T> {
        self.found
    }
}

pub struct AnyMatch<P> {
    pred: P,
}

impl<P> AnyMatch<P> {
    pub fn new(pred: P) -> Self {
        Self { pred }
    }
}

impl<T, P: FnMut(&T) -> bool> Reduce<T> for AnyMatch<P> {
    type Output = bool;

    fn step(&mut self, item: T) -> ControlFlow<bool> {
        if (self.pred)(&item) {
            ControlFlow::Break(true)
        } else {
            ControlFlow::Continue(())
        }
    }

    fn finish(self) -> bool {
        false
    }
}

pub struct AllMatch<P> {
    pred: P,
}

impl<P> AllMatch<P> {
    pub fn new(pred: P) -> Self {
        Self { pred }
    }
}

impl<T, P: FnMut(&T) -> bool> Reduce<T> for AllMatch<P> {
    type Output = bool;

    fn step(&mut self, item: T) -> ControlFlow<bool> {
        if (self.pred)(&item) {
            ControlFlow::Continue(())
        } else {
            ControlFlow::Break(false)
        }
    }

    fn finish(self) -> bool {
        true
    }
}

pub struct Count<P> {
    pred: P,
    n: usize,
}

impl<P> Count<P> {
    pub fn new(pred: P) -> Self {
        Self { pred, n: 0 }
    }
}

impl<T, P: FnMut(&T) -> bool> Reduce<T> for Count<P> {
    type Output = usize;

    fn step(&mut self, item: T) -> ControlFlow<usize> {
        if (self.pred)(&item) {
            self.n += 1;
        }
        ControlFlow::Continue(())
    }

    fn finish(self) -> usize {
        self.n
    }
}

/// Running `f64` state for `sum`/`min`/`max`. The first NaN ends the read
/// with NaN.
pub struct Numeric<S> {
    selector: S,
    acc: f64,
    combine: fn(f64, f64) -> f64,
}

impl<S> Numeric<S> {
    pub fn sum(selector: S) -> Self {
        Self {
            selector,
            acc: 0.0,
            combine: |a, b| a + b,
        }
    }

    /// `+∞` for an empty sequence.
    pub fn min(selector: S) -> Self {
        Self {
            selector,
            acc: f64::INFINITY,
            combine: f64::min,
        }
    }

    /// `-∞` for an empty sequence.
    pub fn max(selector: S) -> Self {
        Self {
            selector,
            acc: f64::NEG_INFINITY,
            combine: f64::max,
        }
    }
}

impl<T, N: ToNumber, S: FnMut(&T) -> N> Reduce<T> for Numeric<S> {
    type Output = f64;

    fn step(&mut self, item: T) -> ControlFlow<f64> {
        let v = (self.selector)(&item).to_number();
        if v.is_nan() {
            return ControlFlow::Break(f64::NAN);
        }
        self.acc = (self.combine)(self.acc, v);
        ControlFlow::Continue(())
    }

    fn finish(self) -> f64 {
        self.acc
    }
}

pub struct Average<S> {
    selector: S,
    total: f64,
    n: usize,
}

impl<S> Average<S> {
    pub fn new(selector: S) -> Self {
        Self {
            selector,
            total: 0.0,
            n: 0,
        }
    }
}

impl<T, N: ToNumber, S: FnMut(&T) -> N> Reduce<T> for Average<S> {
    type Output = Result<f64>;

    fn step(&mut self, item: T) -> ControlFlow<Result<f64>> {
        let v = (self.selector)(&item).to_number();
        if v.is_nan() {
            return ControlFlow::Break(Ok(f64::NAN));
        }
        self.total += v;
        self.n += 1;
        ControlFlow::Continue(())
    }

    fn finish(self) -> Result<f64> {
        if self.n == 0 {
            return Err(Error::NoElements);
        }
        Ok(self.total / self.n as f64)
    }
}

pub struct Fold<A, F> {
    acc: Option<A>,
    f: F,
}

impl<A, F> Fold<A, F> {
    pub fn new(init: A, f: F) -> Self {
        Self { acc: Some(init), f }
    }
}

impl<T, A, F: FnMut(A, T) -> A> Reduce<T> for Fold<A, F> {
    type Output = A;

    fn step(&mut self, item: T) -> ControlFlow<A> {
        if let Some(acc) = self.acc.take() {
            self.acc = Some((self.f)(acc, item));
        }
        ControlFlow::Continue(())
    }

    fn finish(self) -> A {
        match self.acc {
            Some(acc) => acc,
            None => unreachable!("fold accumulator is restored after every step"),
        }
    }
}

/// `for_each` with early exit.
pub struct Visit<F> {
    f: F,
}

impl<F> Visit<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<T, R, F: FnMut(T) -> ControlFlow<R>> Reduce<T> for Visit<F> {
    type Output = Option<R>;

    fn step(&mut self, item: T) -> ControlFlow<Option<R>> {
        match (self.f)(item) {
            ControlFlow::Break(r) => ControlFlow::Break(Some(r)),
            ControlFlow::Continue(()) => ControlFlow::Continue(()),
        }
    }

    fn finish(self) -> Option<R> {
        None
    }
}

/// Collects into any `Extend` container (`Vec`, `HashSet`, ...).
pub struct Collect<C> {
    out: C,
}

impl<C: Default> Collect<C> {
    pub fn new() -> Self {
        Self { out: C::default() }
    }
}

impl<C: Default> Default for Collect<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C: Extend<T>> Reduce<T> for Collect<C> {
    type Output = C;

    fn step(&mut self, item: T) -> ControlFlow<C> {
        self.out.extend(std::iter::once(item));
        ControlFlow::Continue(())
    }

    fn finish(self) -> C {
        self.out
    }
}

/// Keyed map; later duplicates overwrite earlier ones.
pub struct Keyed<K, V, KS, VS> {
    key: KS,
    value: VS,
    out: HashMap<K, V>,
}

impl<K, V, KS, VS> Keyed<K, V, KS, VS> {
    pub fn new(key: KS, value: VS) -> Self {
        Self {
            key,
            value,
            out: HashMap::new(),
        }
    }
}

impl<T, K, V, KS, VS> Reduce<T> for Keyed<K, V, KS, VS>
where
    K: Eq + Hash,
    KS: FnMut(&T) -> K,
    VS: FnMut(T) -> V,
{
    type Output = HashMap<K, V>;

    fn step(&mut self, item: T) -> ControlFlow<HashMap<K, V>> {
        let k = (self.key)(&item);
        self.out.insert(k, (self.value)(item));
        ControlFlow::Continue(())
    }

    fn finish(self) -> HashMap<K, V> {
        self.out
    }
}

/// JSON object keyed by the text form of the key. A value that fails to
/// serialize ends the read with the error.
pub struct ObjectBuilder<KS, VS> {
    key: KS,
    value: VS,
    out: Map<String, Value>,
}

impl<KS, VS> ObjectBuilder<KS, VS> {
    pub fn new(key: KS, value: VS) -> Self {
        Self {
            key,
            value,
            out: Map::new(),
        }
    }
}

impl<T, K, V, KS, VS> Reduce<T> for ObjectBuilder<KS, VS>
where
    K: ToText,
    V: Serialize,
    KS: FnMut(&T) -> K,
    VS: FnMut(T) -> V,
{
    type Output = Result<Map<String, Value>>;

    fn step(&mut self, item: T) -> ControlFlow<Self::Output> {
        let key = (self.key)(&item)
            .to_text()
            .map_or_else(|| "undefined".to_string(), |t| t.into_owned());
        match serde_json::to_value((self.value)(item)) {
            Ok(v) => {
                self.out.insert(key, v);
                ControlFlow::Continue(())
            }
            Err(e) => ControlFlow::Break(Err(e.into())),
        }
    }

    fn finish(self) -> Self::Output {
        Ok(self.out)
    }
}

pub struct JoinText<'s> {
    separator: &'s str,
    out: String,
    first: bool,
}

impl<'s> JoinText<'s> {
    pub fn new(separator: &'s str) -> Self {
        Self {
            separator,
            out: String::new(),
            first: true,
        }
    }
}

impl<T: ToText> Reduce<T> for JoinText<'_> {
    type Output = String;

    fn step(&mut self, item: T) -> ControlFlow<String> {
        if !self.first {
            self.out.push_str(self.separator);
        }
        self.first = false;
        if let Some(text) = item.to_text() {
            self.out.push_str(&text);
        }
        ControlFlow::Continue(())
    }

    fn finish(self) -> String {
        self.out
    }
}
