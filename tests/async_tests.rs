//! Async handle tests


use std::cell::Cell;
use std::ops::ControlFlow;
use std::rc::Rc;

use futures::stream::{self, StreamExt};
use lazyq::{AsyncLinq, Error, Linq};
use test_data_gen::{people, pets};

#[tokio::test]
async fn test_async_fused_pipeline() {
    let q = AsyncLinq::from(vec![1, 2, 3, 4, 5])
        .select(|x| x * 10)
        .filter(|x| *x > 20)
        .select_many_iter(|x| vec![x, x + 1]);
    assert_eq!(q.to_vec().await, vec![30, 31, 40, 41, 50, 51]);
    assert_eq!(q.explain().detail, vec!["project", "filter", "flatten"]);
}

#[tokio::test]
async fn test_async_select_many_streams() {
    let q = AsyncLinq::from(vec![2, 3]).select_many(|n| stream::iter(0..n));
    assert_eq!(q.to_vec().await, vec![0, 1, 0, 1, 2]);
}

#[tokio::test]
async fn test_async_partition_and_count() {
    let q = AsyncLinq::from((0..10).collect::<Vec<i32>>()).skip(3).take(4);
    assert_eq!(q.to_vec().await, vec![3, 4, 5, 6]);
    assert_eq!(q.count().await, 4);
    assert!(q.skip(10).to_vec().await.is_empty());
}

#[tokio::test]
async fn test_async_first_stops_pulling() {
    let pulled = Rc::new(Cell::new(0));
    let counter = Rc::clone(&pulled);
    let q = AsyncLinq::from_stream_fn(move || {
        let counter = Rc::clone(&counter);
        stream::iter(1..=100).inspect(move |_| counter.set(counter.get() + 1))
    });
    assert_eq!(q.first_where(|n| n % 10 == 0).await.unwrap(), 10);
    assert_eq!(pulled.get(), 10);
    assert_eq!(q.first_where(|n| *n > 1000).await, Err(Error::NoElements));
    assert_eq!(q.first_where_or(|n| *n > 1000, -1).await, -1);
    // No hint on a stream closure: count iterates.
    assert_eq!(q.count().await, 100);
}

#[tokio::test]
async fn test_async_last_without_match_fails() {
    assert_eq!(AsyncLinq::<i32>::empty().last().await, Err(Error::NoElements));
    assert_eq!(AsyncLinq::<i32>::empty().last_or_default().await, None);
    let q = AsyncLinq::from(vec![3, 8, 5]);
    assert_eq!(q.last_where(|_| false).await, Err(Error::NoElements));
    assert_eq!(q.last_where(|n| *n > 4).await, Ok(5));
    assert_eq!(q.last_where_or(|_| false, -1).await, -1);
    assert_eq!(AsyncLinq::<i32>::empty().last_where_or(|_| true, 42).await, 42);
}

#[tokio::test]
async fn test_async_zip_stops_pulling_right_side() {
    let pulled = Rc::new(Cell::new(0));
    let counter = Rc::clone(&pulled);
    let right = AsyncLinq::from_stream_fn(move || {
        let counter = Rc::clone(&counter);
        stream::iter(10..20).inspect(move |_| counter.set(counter.get() + 1))
    });
    let left = AsyncLinq::from(vec![1, 2]);
    assert_eq!(left.zip(&right, |a, b| a + b).to_vec().await, vec![11, 13]);
    assert_eq!(pulled.get(), 2);
}

#[tokio::test]
async fn test_async_order_group_join() {
    let folks = AsyncLinq::from(people());
    let names = folks
        .order_by_with(|p| p.age, |a: &u32, b: &u32| a.cmp(b))
        .then_by(|p| p.name.clone())
        .select(|p| p.name)
        .to_vec()
        .await;
    assert_eq!(names, vec!["Bruno", "Eva", "Ana", "Carla", "Filipa", "Duarte"]);

    let cities = folks
        .group_by(|p| p.city.clone())
        .select(|g| (g.key().clone(), g.len()))
        .to_vec()
        .await;
    assert_eq!(cities[0], ("Lisbon".to_string(), 2));
    assert_eq!(cities.len(), 4);

    let pet_names = folks
        .join_with(&AsyncLinq::from(pets()), |p| p.id, |pet| pet.owner, |_, pet| pet.name.clone())
        .join_text(",")
        .await;
    assert_eq!(pet_names, "Rex,Bolinha,Tom,Nina");

    let lonely = folks
        .group_join(&AsyncLinq::from(pets()), |p| p.id, |pet| pet.owner)
        .count_where(|(_, pets)| pets.is_empty())
        .await;
    assert_eq!(lonely, 3);
}

#[tokio::test]
async fn test_async_math_and_zip() {
    let nums = AsyncLinq::from(vec![4.0, 8.0, 15.0, 16.0]);
    assert_eq!(nums.sum().await, 43.0);
    assert_eq!(nums.min().await, 4.0);
    assert_eq!(nums.max().await, 16.0);
    assert_eq!(nums.average().await.unwrap(), 10.75);
    assert_eq!(
        AsyncLinq::<f64>::from(vec![]).average().await,
        Err(Error::NoElements)
    );

    let zipped = nums.zip(&AsyncLinq::from(vec!["a", "b"]), |n, s| format!("{s}={n}"));
    assert_eq!(zipped.to_vec().await, vec!["a=4", "b=8"]);
}

#[tokio::test]
async fn test_async_concat_distinct_once() {
    let q = AsyncLinq::from(vec![1, 2, 2])
        .concat(&AsyncLinq::once(stream::iter(vec![3, 1])))
        .distinct();
    assert_eq!(q.to_vec().await, vec![1, 2, 3]);
    // The wrapped stream was consumed by the first read.
    assert_eq!(q.to_vec().await, vec![1, 2]);
}

#[tokio::test]
async fn test_async_for_each_until_and_aggregate() {
    let q = AsyncLinq::from(vec!["a", "bb", "ccc"]);
    let mut seen = 0;
    let hit = q
        .for_each_until(|s| {
            seen += 1;
            if s.len() == 2 {
                ControlFlow::Break(s)
            } else {
                ControlFlow::Continue(())
            }
        })
        .await;
    assert_eq!(hit, Some("bb"));
    assert_eq!(seen, 2);

    let total = q.aggregate(0, |acc, s| acc + s.len()).await;
    assert_eq!(total, 6);
}

#[tokio::test]
async fn test_lifted_sync_query() {
    let sync = Linq::range(1, 5).select(|n| n * n);
    let lifted = sync.to_async();
    assert_eq!(lifted.len_hint(), Some(5));
    assert_eq!(lifted.filter(|n| n % 2 == 1).to_vec().await, vec![1, 9, 25]);
    let streamed: Vec<i64> = lifted.stream().collect().await;
    assert_eq!(streamed, sync.to_vec());
}
