//! Model-based checks shared by every map's integration tests.
//!
//! Everything here is written against [`OrderedContainer`] alone, so a check passing
//! for one map and failing for another points at that map's structure, not the harness.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::ops::Bound;

use ordered_forest::OrderedContainer;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

/// The number of operations to perform in each proptest case.
pub const TEST_SIZE: usize = 2_000;

/// Keys shared by the fixture tests below.
pub const SEEDS: [i64; 15] = [22, 24, 35, 61, 64, 67, 76, 84, 87, 91, 97, 130, 133, 145, 150];

pub fn seed_value(k: i64) -> i64 {
    k * 2 + 1
}

pub fn seeded<C: OrderedContainer<i64, i64> + Default>() -> C {
    let mut map = C::default();
    for k in SEEDS {
        map.insert(k, seed_value(k));
    }
    map
}

/// Generates keys from a range narrower than `TEST_SIZE` so operations collide.
fn key_strategy() -> impl Strategy<Value = i64> {
    -500i64..500i64
}

fn bound_strategy() -> impl Strategy<Value = Option<i64>> {
    proptest::option::of(-600i64..600i64)
}

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
pub enum MapOp {
    Insert(i64, i64),
    Upsert(i64, i64),
    Update(i64, i64),
    Delete(i64),
    Search(i64),
    LastLess(i64),
    LastLessOrEqual(i64),
    FirstGreater(i64),
    FirstGreaterOrEqual(i64),
    Range(Option<i64>, Option<i64>),
}

pub fn map_op_strategy() -> impl Strategy<Value = MapOp> {
    prop_oneof![
        6 => (key_strategy(), any::<i64>()).prop_map(|(k, v)| MapOp::Insert(k, v)),
        2 => (key_strategy(), any::<i64>()).prop_map(|(k, v)| MapOp::Upsert(k, v)),
        2 => (key_strategy(), any::<i64>()).prop_map(|(k, v)| MapOp::Update(k, v)),
        4 => key_strategy().prop_map(MapOp::Delete),
        2 => key_strategy().prop_map(MapOp::Search),
        1 => key_strategy().prop_map(MapOp::LastLess),
        1 => key_strategy().prop_map(MapOp::LastLessOrEqual),
        1 => key_strategy().prop_map(MapOp::FirstGreater),
        1 => key_strategy().prop_map(MapOp::FirstGreaterOrEqual),
        1 => (bound_strategy(), bound_strategy()).prop_map(|(s, b)| MapOp::Range(s, b)),
    ]
}

/// Replays `ops` on `map` and on a `BTreeMap`, asserting identical results at every step.
pub fn replay<C: OrderedContainer<i64, i64>>(map: &mut C, ops: &[MapOp]) -> Result<(), TestCaseError> {
    let mut model: BTreeMap<i64, i64> = BTreeMap::new();

    for op in ops {
        match *op {
            MapOp::Insert(k, v) => {
                let expected_inserted = !model.contains_key(&k);
                let stored = *model.entry(k).or_insert(v);
                let ((&mk, &mv), inserted) = map.insert(k, v);
                prop_assert_eq!(inserted, expected_inserted, "insert({}, {})", k, v);
                prop_assert_eq!((mk, mv), (k, stored), "insert({}, {})", k, v);
            }
            MapOp::Upsert(k, v) => {
                let expected = model.insert(k, v).map(|old| (k, old));
                prop_assert_eq!(map.upsert(k, v), expected, "upsert({}, {})", k, v);
            }
            MapOp::Update(k, v) => {
                let expected = model.get_mut(&k).map(|slot| (k, std::mem::replace(slot, v)));
                prop_assert_eq!(map.update(k, v), expected, "update({}, {})", k, v);
            }
            MapOp::Delete(k) => {
                let expected = model.remove(&k).map(|v| (k, v));
                prop_assert_eq!(map.delete(&k), expected, "delete({})", k);
            }
            MapOp::Search(k) => {
                prop_assert_eq!(map.search(&k), model.get_key_value(&k), "search({})", k);
            }
            MapOp::LastLess(k) => {
                prop_assert_eq!(map.last_less(&k), model.range(..k).next_back(), "last_less({})", k);
            }
            MapOp::LastLessOrEqual(k) => {
                let expected = model.range(..=k).next_back();
                prop_assert_eq!(map.last_less_or_equal(&k), expected, "last_less_or_equal({})", k);
            }
            MapOp::FirstGreater(k) => {
                let expected = model.range((Bound::Excluded(k), Bound::Unbounded)).next();
                prop_assert_eq!(map.first_greater(&k), expected, "first_greater({})", k);
            }
            MapOp::FirstGreaterOrEqual(k) => {
                let expected = model.range(k..).next();
                prop_assert_eq!(map.first_greater_or_equal(&k), expected, "first_greater_or_equal({})", k);
            }
            MapOp::Range(start, boundary) => check_range(map, &model, start, boundary)?,
        }
        prop_assert_eq!(map.len(), model.len());
    }

    check_range(map, &model, None, None)
}

/// Compares all four bounded walks of `map` against the model.
pub fn check_range<C: OrderedContainer<i64, i64>>(
    map: &C,
    model: &BTreeMap<i64, i64>,
    start: Option<i64>,
    boundary: Option<i64>,
) -> Result<(), TestCaseError> {
    let expected: Vec<(i64, i64)> = model
        .iter()
        .filter(|(k, _)| start.is_none_or(|s| **k >= s) && boundary.is_none_or(|b| **k < b))
        .map(|(k, v)| (*k, *v))
        .collect();

    let lazy: Vec<(i64, i64)> = map.iter(start.as_ref(), boundary.as_ref()).map(|(k, v)| (*k, *v)).collect();
    prop_assert_eq!(&lazy, &expected, "iter({:?}, {:?})", start, boundary);

    let mut visited = Vec::new();
    map.range(start.as_ref(), boundary.as_ref(), |k, v| {
        visited.push((*k, *v));
        true
    });
    prop_assert_eq!(&visited, &expected, "range({:?}, {:?})", start, boundary);

    let mut lazy_back: Vec<(i64, i64)> =
        map.iter_reverse(start.as_ref(), boundary.as_ref()).map(|(k, v)| (*k, *v)).collect();
    lazy_back.reverse();
    prop_assert_eq!(&lazy_back, &expected, "iter_reverse({:?}, {:?})", start, boundary);

    let mut visited_back = Vec::new();
    map.reverse(start.as_ref(), boundary.as_ref(), |k, v| {
        visited_back.push((*k, *v));
        true
    });
    visited_back.reverse();
    prop_assert_eq!(&visited_back, &expected, "reverse({:?}, {:?})", start, boundary);

    Ok(())
}

fn key(element: Option<(&i64, &i64)>) -> Option<i64> {
    element.map(|(k, _)| *k)
}

fn keys<'a>(it: impl Iterator<Item = (&'a i64, &'a i64)>) -> Vec<i64> {
    it.map(|(k, _)| *k).collect()
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

pub fn boundary_queries<C: OrderedContainer<i64, i64> + Default>() {
    let map: C = seeded();

    assert_eq!(key(map.last_less(&25)), Some(24));
    assert_eq!(key(map.last_less(&22)), None);
    assert_eq!(key(map.last_less(&156)), Some(150));
    assert_eq!(key(map.last_less_or_equal(&133)), Some(133));
    assert_eq!(key(map.last_less_or_equal(&21)), None);
    assert_eq!(key(map.last_less_or_equal(&137)), Some(133));
    assert_eq!(key(map.first_greater(&133)), Some(145));
    assert_eq!(key(map.first_greater(&150)), None);
    assert_eq!(key(map.first_greater(&21)), Some(22));
    assert_eq!(key(map.first_greater_or_equal(&146)), Some(150));
    assert_eq!(key(map.first_greater_or_equal(&22)), Some(22));
    assert_eq!(key(map.first_greater_or_equal(&151)), None);

    assert_eq!(map.first_greater(&133), Some((&145, &seed_value(145))));
}

pub fn bounded_iteration<C: OrderedContainer<i64, i64> + Default>() {
    let map: C = seeded();
    let from = |i: usize| SEEDS[i..].to_vec();
    let upto = |j: usize| SEEDS[..j].to_vec();
    let n = SEEDS.len();

    #[rustfmt::skip]
    let cases: Vec<(Option<i64>, Option<i64>, Vec<i64>)> = vec![
        (None,      None,      SEEDS.to_vec()),
        (Some(21),  None,      SEEDS.to_vec()),
        (Some(22),  None,      SEEDS.to_vec()),
        (Some(27),  None,      from(2)),
        (Some(62),  None,      from(4)),
        (Some(132), None,      from(12)),
        (Some(150), None,      vec![150]),
        (Some(156), None,      vec![]),
        (None,      Some(21),  vec![]),
        (None,      Some(22),  vec![]),
        (None,      Some(24),  vec![22]),
        (None,      Some(147), upto(n - 1)),
        (None,      Some(150), upto(n - 1)),
        (None,      Some(156), SEEDS.to_vec()),
        (Some(68),  Some(132), SEEDS[6..n - 3].to_vec()),
        (Some(21),  Some(153), SEEDS.to_vec()),
        (Some(24),  Some(24),  vec![]),
        (Some(25),  Some(25),  vec![]),
        (Some(21),  Some(13),  vec![]),
        (Some(65),  Some(27),  vec![]),
    ];

    for (start, boundary, expected) in cases {
        let forward = keys(map.iter(start.as_ref(), boundary.as_ref()));
        assert_eq!(forward, expected, "iter({start:?}, {boundary:?})");

        let mut backward = keys(map.iter_reverse(start.as_ref(), boundary.as_ref()));
        backward.reverse();
        assert_eq!(backward, expected, "iter_reverse({start:?}, {boundary:?})");
    }
}

pub fn duplicate_insert_keeps_first_value<C: OrderedContainer<i64, i64> + Default>() {
    let mut map = C::default();
    assert_eq!(map.insert(7, 1), ((&7, &1), true));
    assert_eq!(map.insert(7, 2), ((&7, &1), false));
    assert_eq!(map.len(), 1);
    assert_eq!(map.search(&7), Some((&7, &1)));
}

pub fn delete_then_search<C: OrderedContainer<i64, i64> + Default>() {
    let mut map: C = seeded();
    for (i, k) in SEEDS.into_iter().enumerate() {
        assert_eq!(map.delete(&k), Some((k, seed_value(k))));
        assert_eq!(map.search(&k), None);
        assert_eq!(map.delete(&k), None);
        assert_eq!(map.len(), SEEDS.len() - i - 1);
    }
    assert!(map.is_empty());
    assert_eq!(keys(map.iter(None, None)), Vec::<i64>::new());
}

pub fn update_and_upsert<C: OrderedContainer<i64, i64> + Default>() {
    let mut map: C = seeded();

    assert_eq!(map.update(23, 0), None);
    assert_eq!(map.search(&23), None);
    assert_eq!(map.len(), SEEDS.len());

    assert_eq!(map.update(61, 0), Some((61, seed_value(61))));
    assert_eq!(map.search(&61), Some((&61, &0)));

    assert_eq!(map.upsert(23, 5), None);
    assert_eq!(map.upsert(23, 6), Some((23, 5)));
    assert_eq!(map.len(), SEEDS.len() + 1);
    assert_eq!(keys(map.iter(Some(&22), Some(&25))), [22, 23, 24]);
}

pub fn early_stop<C: OrderedContainer<i64, i64> + Default>() {
    let map: C = seeded();

    let mut seen = Vec::new();
    map.range(Some(&60), None, |k, _| {
        seen.push(*k);
        seen.len() < 3
    });
    assert_eq!(seen, [61, 64, 67]);

    let mut seen = Vec::new();
    map.reverse(None, Some(&100), |k, _| {
        seen.push(*k);
        *k > 90
    });
    assert_eq!(seen, [97, 91, 87]);
}

pub fn iterators_are_fused<C: OrderedContainer<i64, i64> + Default>() {
    let map: C = seeded();

    let mut it = map.iter(Some(&145), None);
    assert_eq!(it.next(), Some((&145, &seed_value(145))));
    assert_eq!(it.next(), Some((&150, &seed_value(150))));
    assert_eq!(it.next(), None);
    assert_eq!(it.next(), None);

    let mut it = map.iter_reverse(None, Some(&24));
    assert_eq!(it.next(), Some((&22, &seed_value(22))));
    assert_eq!(it.next(), None);
    assert_eq!(it.next(), None);
}

/// Runs every fixture above against `C`.
pub fn fixtures<C: OrderedContainer<i64, i64> + Default>() {
    boundary_queries::<C>();
    bounded_iteration::<C>();
    duplicate_insert_keeps_first_value::<C>();
    delete_then_search::<C>();
    update_and_upsert::<C>();
    early_stop::<C>();
    iterators_are_fused::<C>();
}
