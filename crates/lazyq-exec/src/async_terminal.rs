//! Terminal operations on `AsyncLinq<T>`; the same reducers as the sync
//! handle, driven over a stream.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::ops::ControlFlow;

use lazyq_core::coerce::ToNumber;
use lazyq_core::cursor::{drive_async, Step};
use lazyq_core::metrics;
use lazyq_core::text::ToText;
use lazyq_core::{Error, Result};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::async_linq::AsyncLinq;
use crate::reduce::{
    AllMatch, AnyMatch, Average, Collect, Count, First, Fold, JoinText, Keyed, Last, Numeric,
    ObjectBuilder, Reduce, Visit,
};

fn always<T>(_: &T) -> bool {
    true
}

impl<T: 'static> AsyncLinq<T> {
    fn trace(&self, op: &'static str) {
        if self.config.trace_terminals {
            metrics::emit_span(
                "terminal",
                &[("op", op.to_string()), ("node", self.node.name().to_string())],
            );
        }
    }

    pub async fn iterate<R, F>(&self, f: F) -> Option<R>
    where
        F: FnMut(Step<T>) -> ControlFlow<R>,
    {
        drive_async(self.node.stream(), f).await
    }

    async fn reduce<R: Reduce<T>>(&self, mut reducer: R) -> R::Output {
        let early = self
            .iterate(|step| match step {
                Step::Item(v) => reducer.step(v),
                Step::Done => ControlFlow::Continue(()),
            })
            .await;
        match early {
            Some(out) => out,
            None => reducer.finish(),
        }
    }

    pub async fn for_each<F: FnMut(T)>(&self, mut f: F) {
        self.trace("for_each");
        self.reduce(Visit::new(|v| {
            f(v);
            ControlFlow::<()>::Continue(())
        }))
        .await;
    }

    pub async fn for_each_until<R, F>(&self, f: F) -> Option<R>
    where
        F: FnMut(T) -> ControlFlow<R>,
    {
        self.trace("for_each_until");
        self.reduce(Visit::new(f)).await
    }

    pub async fn aggregate<A, F>(&self, init: A, f: F) -> A
    where
        F: FnMut(A, T) -> A,
    {
        self.trace("aggregate");
        self.reduce(Fold::new(init, f)).await
    }

    pub async fn first(&self) -> Result<T> {
        self.first_where(always).await
    }

    pub async fn first_where<P: FnMut(&T) -> bool>(&self, pred: P) -> Result<T> {
        self.first_or_default_where(pred)
            .await
            .ok_or(Error::NoElements)
    }

    pub async fn first_or_default(&self) -> Option<T> {
        self.first_or_default_where(always).await
    }

    pub async fn first_or_default_where<P: FnMut(&T) -> bool>(&self, pred: P) -> Option<T> {
        self.trace("first");
        self.reduce(First::new(pred)).await
    }

    pub async fn first_where_or<P: FnMut(&T) -> bool>(&self, pred: P, default: T) -> T {
        self.first_or_default_where(pred).await.unwrap_or(default)
    }

    pub async fn last(&self) -> Result<T> {
        self.last_where(always).await
    }

    pub async fn last_where<P: FnMut(&T) -> bool>(&self, pred: P) -> Result<T> {
        self.last_or_default_where(pred)
            .await
            .ok_or(Error::NoElements)
    }

    pub async fn last_or_default(&self) -> Option<T> {
        self.last_or_default_where(always).await
    }

    pub async fn last_or_default_where<P: FnMut(&T) -> bool>(&self, pred: P) -> Option<T> {
        self.trace("last");
        self.reduce(Last::new(pred)).await
    }

    pub async fn last_where_or<P: FnMut(&T) -> bool>(&self, pred: P, default: T) -> T {
        self.last_or_default_where(pred).await.unwrap_or(default)
    }

    pub async fn any(&self) -> bool {
        self.any_where(always).await
    }

    pub async fn any_where<P: FnMut(&T) -> bool>(&self, pred: P) -> bool {
        self.trace("any");
        self.reduce(AnyMatch::new(pred)).await
    }

    pub async fn all<P: FnMut(&T) -> bool>(&self, pred: P) -> bool {
        self.trace("all");
        self.reduce(AllMatch::new(pred)).await
    }

    pub async fn count(&self) -> usize {
        if self.config.use_length_hints {
            if let Some(n) = self.node.len_hint() {
                return n;
            }
        }
        self.count_where(always).await
    }

    pub async fn count_where<P: FnMut(&T) -> bool>(&self, pred: P) -> usize {
        self.trace("count");
        self.reduce(Count::new(pred)).await
    }

    pub async fn sum(&self) -> f64
    where
        T: ToNumber,
    {
        self.sum_by(|v: &T| v.to_number()).await
    }

    pub async fn sum_by<N: ToNumber, S: FnMut(&T) -> N>(&self, selector: S) -> f64 {
        self.trace("sum");
        self.reduce(Numeric::sum(selector)).await
    }

    pub async fn min(&self) -> f64
    where
        T: ToNumber,
    {
        self.min_by(|v: &T| v.to_number()).await
    }

    pub async fn min_by<N: ToNumber, S: FnMut(&T) -> N>(&self, selector: S) -> f64 {
        self.trace("min");
        self.reduce(Numeric::min(selector)).await
    }

    pub async fn max(&self) -> f64
    where
        T: ToNumber,
    {
        self.max_by(|v: &T| v.to_number()).await
    }

    pub async fn max_by<N: ToNumber, S: FnMut(&T) -> N>(&self, selector: S) -> f64 {
        self.trace("max");
        self.reduce(Numeric::max(selector)).await
    }

    pub async fn average(&self) -> Result<f64>
    where
        T: ToNumber,
    {
        self.average_by(|v: &T| v.to_number()).await
    }

    pub async fn average_by<N: ToNumber, S: FnMut(&T) -> N>(&self, selector: S) -> Result<f64> {
        self.trace("average");
        self.reduce(Average::new(selector)).await
    }

    pub async fn to_vec(&self) -> Vec<T> {
        self.trace("to_vec");
        self.reduce(Collect::<Vec<T>>::new()).await
    }

    pub async fn to_set(&self) -> HashSet<T>
    where
        T: Eq + Hash,
    {
        self.trace("to_set");
        self.reduce(Collect::<HashSet<T>>::new()).await
    }

    pub async fn to_map<K, KS>(&self, key: KS) -> HashMap<K, T>
    where
        K: Eq + Hash,
        KS: FnMut(&T) -> K,
    {
        self.to_map_with(key, |v| v).await
    }

    pub async fn to_map_with<K, V, KS, VS>(&self, key: KS, value: VS) -> HashMap<K, V>
    where
        K: Eq + Hash,
        KS: FnMut(&T) -> K,
        VS: FnMut(T) -> V,
    {
        self.trace("to_map");
        self.reduce(Keyed::new(key, value)).await
    }

    pub async fn to_object<K, KS>(&self, key: KS) -> Result<Map<String, Value>>
    where
        T: Serialize,
        K: ToText,
        KS: FnMut(&T) -> K,
    {
        self.to_object_with(key, |v| v).await
    }

    pub async fn to_object_with<K, V, KS, VS>(
        &self,
        key: KS,
        value: VS,
    ) -> Result<Map<String, Value>>
    where
        K: ToText,
        V: Serialize,
        KS: FnMut(&T) -> K,
        VS: FnMut(T) -> V,
    {
        self.trace("to_object");
        self.reduce(ObjectBuilder::new(key, value)).await
    }

    pub async fn join_text(&self, separator: &str) -> String
    where
        T: ToText,
    {
        self.trace("join_text");
        self.reduce(JoinText::new(separator)).await
    }
}
