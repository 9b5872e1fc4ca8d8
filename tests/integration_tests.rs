//! End-to-end query tests


use std::any::Any;
use std::ops::ControlFlow;

use lazyq::{Error, Linq, QueryConfig};
use serde_json::json;
use test_data_gen::{people, person, pets, probed, Person};

#[test]
fn test_skip_then_take_window() {
    let q = Linq::range(0, 10).skip(3).take(4);
    assert_eq!(q.to_vec(), vec![3, 4, 5, 6]);
    assert_eq!(q.count(), 4);
}

#[test]
fn test_window_past_end_is_empty() {
    assert!(Linq::range(0, 10).skip(10).take(5).to_vec().is_empty());
    assert_eq!(Linq::range(0, 10).take(0).count(), 0);
}

#[test]
fn test_take_zero_never_opens_source() {
    let (q, probe) = probed(vec![1, 2, 3]);
    assert!(q.take(0).to_vec().is_empty());
    assert_eq!(probe.opened.get(), 0);
}

#[test]
fn test_take_stops_pulling_at_limit() {
    let (q, probe) = probed((0..100).collect());
    assert_eq!(q.skip(2).take(3).to_vec(), vec![2, 3, 4]);
    assert_eq!(probe.pulled.get(), 5);
}

#[test]
fn test_sum_poisoned_by_non_numeric() {
    let values = Linq::from(vec![json!(1), json!(2), json!("x"), json!(3)]);
    assert!(values.sum().is_nan());
    assert_eq!(Linq::from(vec![1, 2, 3]).sum(), 6.0);
}

#[test]
fn test_min_max_average() {
    let ages = Linq::from(people()).select(|p| p.age);
    assert_eq!(ages.min(), 25.0);
    assert_eq!(ages.max(), 42.0);
    assert_eq!(ages.average().unwrap(), 185.0 / 6.0);
    assert_eq!(Linq::<u32>::empty().average(), Err(Error::NoElements));
    assert_eq!(Linq::<u32>::empty().min(), f64::INFINITY);
    assert!(Linq::from(vec!["4", "four"]).max().is_nan());
}

#[test]
fn test_first_where_and_fallback() {
    let words = Linq::from(vec!["alpha", "beta"]);
    assert_eq!(words.first_where(|_| false), Err(Error::NoElements));
    assert_eq!(words.first_where_or(|_| false, "fallback"), "fallback");
    assert_eq!(words.first_or_default_where(|w| w.starts_with('b')), Some("beta"));
    assert_eq!(words.last().unwrap(), "beta");
    assert_eq!(Linq::<i32>::empty().last_or_default(), None);
}

#[test]
fn test_last_without_match_fails() {
    assert_eq!(Linq::<i32>::empty().last(), Err(Error::NoElements));
    let q = Linq::from(vec![3, 8, 5]);
    assert_eq!(q.last_where(|_| false), Err(Error::NoElements));
    assert_eq!(q.last_where(|n| *n > 4), Ok(5));
    assert_eq!(q.last_where_or(|_| false, -1), -1);
    assert_eq!(Linq::<i32>::empty().last_where_or(|_| true, 42), 42);
    assert_eq!(q.last_or_default_where(|n| n % 2 == 0), Some(8));
}

#[test]
fn test_first_stops_at_match() {
    let (q, probe) = probed((1..=50).collect());
    assert_eq!(q.first_where(|n| n % 7 == 0).unwrap(), 7);
    assert_eq!(probe.pulled.get(), 7);
    assert_eq!(probe.opened.get(), 1);
}

#[test]
fn test_any_all_short_circuit() {
    let (q, probe) = probed(vec![2, 4, 5, 6, 8]);
    assert!(!q.all(|n| n % 2 == 0));
    assert_eq!(probe.pulled.get(), 3);
    assert!(q.any_where(|n| *n > 7));
    assert!(!Linq::<i64>::empty().any());
}

#[test]
fn test_order_by_then_by_desc() {
    let sorted = Linq::from(people())
        .order_by_with(|p| p.age, |a: &u32, b: &u32| a.cmp(b))
        .then_by_desc(|p| p.name.clone())
        .select(|p| p.name)
        .to_vec();
    assert_eq!(
        sorted,
        vec!["Eva", "Bruno", "Filipa", "Carla", "Ana", "Duarte"]
    );
}

#[test]
fn test_default_order_is_textual() {
    assert_eq!(
        Linq::from(vec![10, 9, 1, 100]).order().to_vec(),
        vec![1, 10, 100, 9]
    );
    assert_eq!(
        Linq::from(vec![Some("b"), None, Some("a")]).order().to_vec(),
        vec![Some("a"), Some("b"), None]
    );
    assert_eq!(
        Linq::from(vec!["b", "c", "a"]).order_desc().to_vec(),
        vec!["c", "b", "a"]
    );
}

#[test]
fn test_order_is_stable_for_equal_keys() {
    let by_city = Linq::from(people())
        .order_by(|p| p.city.clone())
        .select(|p| p.id)
        .to_vec();
    // Lisbon: 1 then 3, Porto: 2 then 5.
    assert_eq!(by_city, vec![6, 4, 1, 3, 2, 5]);
}

#[test]
fn test_sort_reads_source_once_per_terminal() {
    let (q, probe) = probed(vec![3, 1, 2]);
    let ordered = q.order_with(|a, b| a.cmp(b));
    assert_eq!(probe.opened.get(), 0);
    assert_eq!(ordered.first().unwrap(), 1);
    assert_eq!(ordered.to_vec(), vec![1, 2, 3]);
    assert_eq!(probe.opened.get(), 2);
}

#[test]
fn test_group_by_first_encounter() {
    let groups = Linq::from(people()).group_by(|p| p.city.clone()).to_vec();
    let keys: Vec<_> = groups.iter().map(|g| g.key().as_str()).collect();
    assert_eq!(keys, vec!["Lisbon", "Porto", "Faro", "Braga"]);
    let lisbon: Vec<_> = groups[0].iter().map(|p| p.id).collect();
    assert_eq!(lisbon, vec![1, 3]);
    assert_eq!(groups.iter().map(|g| g.len()).sum::<usize>(), 6);
}

#[test]
fn test_group_by_with_value_selector() {
    let names = Linq::from(people())
        .group_by_with(|p| p.age, |p| p.name)
        .select(|g| (*g.key(), g.values().join("+")))
        .to_vec();
    assert_eq!(
        names,
        vec![
            (31, "Ana+Carla+Filipa".to_string()),
            (25, "Bruno+Eva".to_string()),
            (42, "Duarte".to_string()),
        ]
    );
}

#[test]
fn test_join_inner_and_cross_product() {
    let owners = Linq::from(people());
    let pairs = owners
        .join_with(
            &Linq::from(pets()),
            |p| p.id,
            |pet| pet.owner,
            |p, pet| format!("{}:{}", p.name, pet.name),
        )
        .to_vec();
    assert_eq!(pairs, vec!["Ana:Rex", "Ana:Bolinha", "Carla:Tom", "Filipa:Nina"]);

    let default_pairs = owners.join(&Linq::from(pets()), |p| p.id, |pet| pet.owner);
    assert_eq!(default_pairs.count(), 4);
    assert_eq!(default_pairs.first().unwrap().1.name, "Rex");
}

#[test]
fn test_group_join_includes_unmatched() {
    let counts = Linq::from(people())
        .group_join_with(
            &Linq::from(pets()),
            |p| p.id,
            |pet| pet.owner,
            |p, pets| (p.id, pets.len()),
        )
        .to_vec();
    assert_eq!(counts, vec![(1, 2), (2, 0), (3, 1), (4, 0), (5, 0), (6, 1)]);

    let (ana, ana_pets) = Linq::from(people())
        .group_join(&Linq::from(pets()), |p| p.id, |pet| pet.owner)
        .first()
        .unwrap();
    assert_eq!(ana.name, "Ana");
    assert_eq!(ana_pets.len(), 2);
}

#[test]
fn test_zip_concat_distinct() {
    let zipped = Linq::from(vec![1, 2, 3]).zip(&Linq::from(vec!["a", "b"]), |n, s| format!("{s}{n}"));
    assert_eq!(zipped.to_vec(), vec!["a1", "b2"]);
    assert_eq!(zipped.count(), 2);

    let joined = Linq::from(vec![1, 2])
        .concat(&Linq::from(vec![3]))
        .concat(&Linq::range(4, 2).select(|n| n as i32));
    assert_eq!(joined.to_vec(), vec![1, 2, 3, 4, 5]);
    assert_eq!(joined.count(), 5);

    assert_eq!(
        Linq::from(vec![3, 1, 3, 2, 1]).distinct().to_vec(),
        vec![3, 1, 2]
    );
}

#[test]
fn test_select_many_one_level() {
    let nested = Linq::from(vec![vec![vec![1], vec![2]], vec![vec![3]]]);
    let flat = nested.select_many(|v| v).to_vec();
    assert_eq!(flat, vec![vec![1], vec![2], vec![3]]);
}

#[test]
fn test_count_uses_length_hint_when_enabled() {
    let (q, probe) = probed(vec![1, 2, 3]);
    let known = Linq::from(vec![1, 2, 3]).select(|n| n * 2);
    assert_eq!(known.len_hint(), Some(3));
    assert_eq!(known.count(), 3);

    assert_eq!(q.count(), 3);
    assert_eq!(probe.opened.get(), 1);

    let no_hints = known.with_config(QueryConfig {
        use_length_hints: false,
        ..QueryConfig::default()
    });
    assert!(!no_hints.config().use_length_hints);
    assert_eq!(no_hints.filter(|n| *n > 2).count(), 2);
}

#[test]
fn test_for_each_until_and_aggregate() {
    let mut seen = Vec::new();
    let stopped = Linq::range(1, 10).for_each_until(|n| {
        seen.push(n);
        if n == 4 {
            ControlFlow::Break(n * 100)
        } else {
            ControlFlow::Continue(())
        }
    });
    assert_eq!(stopped, Some(400));
    assert_eq!(seen, vec![1, 2, 3, 4]);

    let product = Linq::range(1, 5).aggregate(1, |acc, n| acc * n);
    assert_eq!(product, 120);

    let mut total = 0;
    Linq::range(1, 3).for_each(|n| total += n);
    assert_eq!(total, 6);
}

#[test]
fn test_conversions() {
    let by_id = Linq::from(people()).to_map(|p| p.id);
    assert_eq!(by_id[&4].name, "Duarte");

    let ages = Linq::from(people()).to_map_with(|p| p.name.clone(), |p| p.age);
    assert_eq!(ages["Eva"], 25);

    let cities = Linq::from(people()).select(|p| p.city).to_set();
    assert_eq!(cities.len(), 4);

    let obj = Linq::from(people()).to_object(|p| p.id).unwrap();
    assert_eq!(obj["2"]["name"], json!("Bruno"));

    let text = Linq::from(vec![Some(1.5), None, Some(3.0)]).join_text(", ");
    assert_eq!(text, "1.5, , 3");
}

#[test]
fn test_object_source() {
    let obj = json!({"a": 1, "b": 2, "c": "x"});
    let map = obj.as_object().cloned().unwrap();
    let keys = Linq::from_object(map.clone()).select(|(k, _)| k).join_text("");
    assert_eq!(keys, "abc");
    let nums = Linq::from_object_with(map, |(_, v)| v);
    assert!(nums.sum().is_nan());
    assert_eq!(nums.take(2).sum(), 3.0);
}

#[test]
fn test_of_type_filters_by_concrete_type() {
    let q = Linq::from_fn(|| {
        let mixed: Vec<Box<dyn Any>> = vec![Box::new(1_i32), Box::new("two"), Box::new(3_i32)];
        mixed
    });
    assert_eq!(q.of_type::<i32>().to_vec(), vec![1, 3]);
    assert_eq!(q.of_type::<&str>().to_vec(), vec!["two"]);
}

#[test]
fn test_handles_are_reusable() {
    let adults = Linq::from(people()).filter(|p| p.age > 30);
    let names = adults.select(|p| p.name);
    assert_eq!(names.to_vec(), names.to_vec());
    assert_eq!(adults.count(), 4);
    // Extending a pipeline leaves the original alone.
    let older = adults.filter(|p| p.age > 40);
    assert_eq!(older.count(), 1);
    assert_eq!(adults.count(), 4);
}

#[test]
fn test_explain_and_fingerprint() {
    let q = Linq::from(people())
        .filter(|p| p.age > 20)
        .select(|p: Person| p.id)
        .skip(1)
        .skip(1)
        .take(2);
    let plan = q.explain();
    assert_eq!(plan.name, "partition");
    assert_eq!(plan.detail, vec!["offset=2", "limit=2"]);
    assert_eq!(plan.inputs[0].name, "extend");
    assert_eq!(plan.inputs[0].detail, vec!["filter", "project"]);
    assert_eq!(plan.inputs[0].inputs[0].name, "collection");

    let same_shape = Linq::from(vec![person(9, "Z", 1, "Q")])
        .filter(|_| true)
        .select(|p: Person| p.age)
        .skip(2)
        .take(2);
    // Lengths differ, so the plans differ.
    assert_ne!(
        q.explain().fingerprint().unwrap(),
        same_shape.explain().fingerprint().unwrap()
    );
    assert_eq!(
        q.explain().fingerprint().unwrap(),
        q.explain().fingerprint().unwrap()
    );
    assert!(plan.render().starts_with("partition [offset=2, limit=2]"));
}

#[test]
fn test_once_source_is_single_use() {
    let q = Linq::once(vec![1, 2, 3]);
    assert_eq!(q.to_vec(), vec![1, 2, 3]);
    assert!(q.to_vec().is_empty());
}

#[test]
fn test_config_from_json() {
    let cfg = QueryConfig::from_json(r#"{"use_length_hints": false, "group_capacity": 4}"#).unwrap();
    let q = Linq::from(vec![1, 2, 3]).with_config(cfg.clone());
    assert_eq!(q.config(), &cfg);
    // Derived handles inherit the config.
    assert_eq!(q.select(|n| n + 1).config(), &cfg);
    assert_eq!(q.group_by(|n| n % 2).count(), 2);
}
