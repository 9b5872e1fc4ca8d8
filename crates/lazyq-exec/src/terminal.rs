//! Terminal operations on `Linq<T>`. All of them go through `iterate`.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::ops::ControlFlow;

use lazyq_core::coerce::ToNumber;
use lazyq_core::cursor::{drive, Step};
use lazyq_core::metrics;
use lazyq_core::text::ToText;
use lazyq_core::{Error, Result};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::linq::Linq;
use crate::reduce::{
    AllMatch, AnyMatch, Average, Collect, Count, First, Fold, JoinText, Keyed, Last, Numeric,
    ObjectBuilder, Reduce, Visit,
};

fn always<T>(_: &T) -> bool {
    true
}

impl<T: 'static> Linq<T> {
    pub(crate) fn trace(&self, op: &'static str) {
        if self.config.trace_terminals {
            metrics::emit_span(
                "terminal",
                &[("op", op.to_string()), ("node", self.node.name().to_string())],
            );
        }
    }

    /// Feed `f` every element and then `Step::Done`, stopping at the first
    /// `Break`. Returns what `f` broke with.
    pub fn iterate<R, F>(&self, f: F) -> Option<R>
    where
        F: FnMut(Step<T>) -> ControlFlow<R>,
    {
        drive(self.node.cursor(), f)
    }

    pub(crate) fn reduce<R: Reduce<T>>(&self, mut reducer: R) -> R::Output {
        let early = self.iterate(|step| match step {
            Step::Item(v) => reducer.step(v),
            Step::Done => ControlFlow::Continue(()),
        });
        match early {
            Some(out) => out,
            None => reducer.finish(),
        }
    }

    pub fn for_each<F: FnMut(T)>(&self, mut f: F) {
        self.trace("for_each");
        self.reduce(Visit::new(|v| {
            f(v);
            ControlFlow::<()>::Continue(())
        }));
    }

    /// `for_each` that stops once `f` breaks, returning the break value.
    pub fn for_each_until<R, F>(&self, f: F) -> Option<R>
    where
        F: FnMut(T) -> ControlFlow<R>,
    {
        self.trace("for_each_until");
        self.reduce(Visit::new(f))
    }

    pub fn aggregate<A, F>(&self, init: A, f: F) -> A
    where
        F: FnMut(A, T) -> A,
    {
        self.trace("aggregate");
        self.reduce(Fold::new(init, f))
    }

    // first / last

    pub fn first(&self) -> Result<T> {
        self.first_where(always)
    }

    pub fn first_where<P: FnMut(&T) -> bool>(&self, pred: P) -> Result<T> {
        self.first_or_default_where(pred).ok_or(Error::NoElements)
    }

    pub fn first_or_default(&self) -> Option<T> {
        self.first_or_default_where(always)
    }

    pub fn first_or_default_where<P: FnMut(&T) -> bool>(&self, pred: P) -> Option<T> {
        self.trace("first");
        self.reduce(First::new(pred))
    }

    pub fn first_or(&self, default: T) -> T {
        self.first_where_or(always, default)
    }

    pub fn first_where_or<P: FnMut(&T) -> bool>(&self, pred: P, default: T) -> T {
        self.first_or_default_where(pred).unwrap_or(default)
    }

    pub fn last(&self) -> Result<T> {
        self.last_where(always)
    }

    pub fn last_where<P: FnMut(&T) -> bool>(&self, pred: P) -> Result<T> {
        self.last_or_default_where(pred).ok_or(Error::NoElements)
    }

    pub fn last_or_default(&self) -> Option<T> {
        self.last_or_default_where(always)
    }

    pub fn last_or_default_where<P: FnMut(&T) -> bool>(&self, pred: P) -> Option<T> {
        self.trace("last");
        self.reduce(Last::new(pred))
    }

    pub fn last_or(&self, default: T) -> T {
        self.last_where_or(always, default)
    }

    pub fn last_where_or<P: FnMut(&T) -> bool>(&self, pred: P, default: T) -> T {
        self.last_or_default_where(pred).unwrap_or(default)
    }

    // predicates

    pub fn any(&self) -> bool {
        self.any_where(always)
    }

    pub fn any_where<P: FnMut(&T) -> bool>(&self, pred: P) -> bool {
        self.trace("any");
        self.reduce(AnyMatch::new(pred))
    }

    pub fn all<P: FnMut(&T) -> bool>(&self, pred: P) -> bool {
        self.trace("all");
        self.reduce(AllMatch::new(pred))
    }

    /// Answered from the length hint when the node knows it.
    pub fn count(&self) -> usize {
        if self.config.use_length_hints {
            if let Some(n) = self.node.len_hint() {
                return n;
            }
        }
        self.count_where(always)
    }

    pub fn count_where<P: FnMut(&T) -> bool>(&self, pred: P) -> usize {
        self.trace("count");
        self.reduce(Count::new(pred))
    }

    // math

    pub fn sum(&self) -> f64
    where
        T: ToNumber,
    {
        self.sum_by(|v: &T| v.to_number())
    }

    pub fn sum_by<N: ToNumber, S: FnMut(&T) -> N>(&self, selector: S) -> f64 {
        self.trace("sum");
        self.reduce(Numeric::sum(selector))
    }

    /// `+∞` when empty.
    pub fn min(&self) -> f64
    where
        T: ToNumber,
    {
        self.min_by(|v: &T| v.to_number())
    }

    pub fn min_by<N: ToNumber, S: FnMut(&T) -> N>(&self, selector: S) -> f64 {
        self.trace("min");
        self.reduce(Numeric::min(selector))
    }

    /// `-∞` when empty.
    pub fn max(&self) -> f64
    where
        T: ToNumber,
    {
        self.max_by(|v: &T| v.to_number())
    }

    pub fn max_by<N: ToNumber, S: FnMut(&T) -> N>(&self, selector: S) -> f64 {
        self.trace("max");
        self.reduce(Numeric::max(selector))
    }

    pub fn average(&self) -> Result<f64>
    where
        T: ToNumber,
    {
        self.average_by(|v: &T| v.to_number())
    }

    pub fn average_by<N: ToNumber, S: FnMut(&T) -> N>(&self, selector: S) -> Result<f64> {
        self.trace("average");
        self.reduce(Average::new(selector))
    }

    // conversion

    pub fn to_vec(&self) -> Vec<T> {
        self.trace("to_vec");
        self.reduce(Collect::<Vec<T>>::new())
    }

    pub fn to_set(&self) -> HashSet<T>
    where
        T: Eq + Hash,
    {
        self.trace("to_set");
        self.reduce(Collect::<HashSet<T>>::new())
    }

    pub fn to_map<K, KS>(&self, key: KS) -> HashMap<K, T>
    where
        K: Eq + Hash,
        KS: FnMut(&T) -> K,
    {
        self.to_map_with(key, |v| v)
    }

    pub fn to_map_with<K, V, KS, VS>(&self, key: KS, value: VS) -> HashMap<K, V>
    where
        K: Eq + Hash,
        KS: FnMut(&T) -> K,
        VS: FnMut(T) -> V,
    {
        self.trace("to_map");
        self.reduce(Keyed::new(key, value))
    }

    pub fn to_object<K, KS>(&self, key: KS) -> Result<Map<String, Value>>
    where
        T: Serialize,
        K: ToText,
        KS: FnMut(&T) -> K,
    {
        self.to_object_with(key, |v| v)
    }

    pub fn to_object_with<K, V, KS, VS>(&self, key: KS, value: VS) -> Result<Map<String, Value>>
    where
        K: ToText,
        V: Serialize,
        KS: FnMut(&T) -> K,
        VS: FnMut(T) -> V,
    {
        self.trace("to_object");
        self.reduce(ObjectBuilder::new(key, value))
    }

    /// Text form of every element, `separator` between them.
    pub fn join_text(&self, separator: &str) -> String
    where
        T: ToText,
    {
        self.trace("join_text");
        self.reduce(JoinText::new(separator))
    }
}
