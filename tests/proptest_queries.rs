//! Property tests: queries agree with the equivalent eager computation.

use std::collections::HashSet;

use lazyq::Linq;
use proptest::prelude::*;

fn small_vec() -> impl Strategy<Value = Vec<i32>> {
    prop::collection::vec(-50i32..50, 0..40)
}

proptest! {
    #[test]
    fn prop_identity_round_trip(xs in small_vec()) {
        let q = Linq::from(xs.clone());
        prop_assert_eq!(q.to_vec(), xs.clone());
        prop_assert_eq!(q.count(), xs.len());
    }

    #[test]
    fn prop_select_then_filter_matches_eager(xs in small_vec(), k in 1i32..7) {
        let lazy = Linq::from(xs.clone()).select(move |x| x * 3).filter(move |x| x % k == 0).to_vec();
        let eager: Vec<i32> = xs.iter().map(|x| x * 3).filter(|x| x % k == 0).collect();
        prop_assert_eq!(lazy, eager);
    }

    #[test]
    fn prop_select_many_flattens_one_level(xs in prop::collection::vec(small_vec(), 0..8)) {
        let lazy = Linq::from(xs.clone()).select_many(|v| v).to_vec();
        let eager: Vec<i32> = xs.into_iter().flatten().collect();
        prop_assert_eq!(lazy, eager);
    }

    #[test]
    fn prop_distinct_is_first_encounter(xs in small_vec()) {
        let mut seen = HashSet::new();
        let eager: Vec<i32> = xs.iter().copied().filter(|x| seen.insert(*x)).collect();
        prop_assert_eq!(Linq::from(xs).distinct().to_vec(), eager);
    }

    #[test]
    fn prop_order_by_then_by_desc_is_stable_sort(pairs in prop::collection::vec((0u8..5, 0u8..5, any::<u16>()), 0..40)) {
        let lazy = Linq::from(pairs.clone())
            .order_by_with(|p| p.0, |a: &u8, b: &u8| a.cmp(b))
            .then_by_desc_with(|p| p.1, |a: &u8, b: &u8| a.cmp(b))
            .to_vec();
        let mut eager = pairs;
        eager.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));
        prop_assert_eq!(lazy, eager);
    }

    #[test]
    fn prop_group_by_partitions_input(xs in small_vec(), m in 1i32..6) {
        let groups = Linq::from(xs.clone()).group_by(move |x| x.rem_euclid(m)).to_vec();
        let keys: HashSet<i32> = xs.iter().map(|x| x.rem_euclid(m)).collect();
        prop_assert_eq!(groups.len(), keys.len());
        prop_assert_eq!(groups.iter().map(|g| g.len()).sum::<usize>(), xs.len());
        for g in &groups {
            let expected: Vec<i32> = xs.iter().copied().filter(|x| x.rem_euclid(m) == *g.key()).collect();
            prop_assert_eq!(g.values(), expected.as_slice());
        }
    }

    #[test]
    fn prop_zip_length_and_values(a in small_vec(), b in small_vec()) {
        let zipped = Linq::from(a.clone()).zip(&Linq::from(b.clone()), |x, y| (x, y));
        prop_assert_eq!(zipped.count(), a.len().min(b.len()));
        let eager: Vec<(i32, i32)> = a.into_iter().zip(b).collect();
        prop_assert_eq!(zipped.to_vec(), eager);
    }

    #[test]
    fn prop_skip_take_matches_slice(xs in small_vec(), s in 0usize..50, t in 0usize..50) {
        let q = Linq::from(xs.clone()).skip(s).take(t);
        let eager: Vec<i32> = xs.iter().copied().skip(s).take(t).collect();
        prop_assert_eq!(q.count(), eager.len());
        prop_assert_eq!(q.to_vec(), eager);
    }

    #[test]
    fn prop_chained_windows_compose(xs in small_vec(), a in 0usize..20, b in 0usize..20, c in 0usize..20) {
        let q = Linq::from(xs.clone()).take(a).skip(b).take(c);
        let eager: Vec<i32> = xs.iter().copied().take(a).skip(b).take(c).collect();
        prop_assert_eq!(q.to_vec(), eager);
    }

    #[test]
    fn prop_sum_matches_eager(xs in small_vec()) {
        let expected: f64 = xs.iter().map(|x| f64::from(*x)).sum();
        prop_assert_eq!(Linq::from(xs).sum(), expected);
    }
}
