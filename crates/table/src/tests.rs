use hashbrown::HashSet as HbHashSet;
use proptest::prelude::*;
use types::{Cell, Literal, Node};

use crate::accumulator::{AccumulatorKind, AliasAccPair};
use crate::row::Row;
use crate::sort::SortKey;
use crate::table::Table;

fn row(pairs: &[(&str, Cell)]) -> Row {
    let mut r = Row::new();
    for (k, v) in pairs {
        r.insert((*k).to_string(), v.clone());
    }
    r
}

fn int_cell(i: i64) -> Cell {
    Cell::Literal(Literal::Int64(i))
}

#[test]
fn new_table_has_empty_rows_and_given_schema() {
    let t = Table::new(vec!["a".into(), "b".into(), "a".into()]);
    assert_eq!(t.bindings(), &["a", "b"]);
    assert_eq!(t.num_rows(), 0);
}

#[test]
fn add_row_extends_schema_with_unseen_keys() {
    let mut t = Table::new(vec!["a".into()]);
    t.add_row(row(&[("a", int_cell(1)), ("b", int_cell(2))]));
    assert_eq!(t.bindings(), &["a", "b"]);
    assert_eq!(t.num_rows(), 1);
}

#[test]
fn truncate_clears_rows_but_keeps_schema() {
    let mut t = Table::new(vec!["a".into()]);
    t.add_row(row(&[("a", int_cell(1))]));
    t.truncate();
    assert_eq!(t.num_rows(), 0);
    assert_eq!(t.bindings(), &["a"]);
}

#[test]
fn delete_row_shifts_subsequent_indices_down() {
    let mut t = Table::new(vec!["a".into()]);
    t.add_row(row(&[("a", int_cell(1))]));
    t.add_row(row(&[("a", int_cell(2))]));
    t.add_row(row(&[("a", int_cell(3))]));
    t.delete_row(0);
    assert_eq!(t.num_rows(), 2);
    assert_eq!(t.rows()[0].get("a"), Some(&int_cell(2)));
    assert_eq!(t.rows()[1].get("a"), Some(&int_cell(3)));
}

#[test]
fn append_table_requires_equal_schema_as_set() {
    let mut a = Table::new(vec!["x".into()]);
    let b = Table::new(vec!["y".into()]);
    assert!(a.append_table(b).is_err());
}

#[test]
fn append_table_unions_rows() {
    let mut a = Table::new(vec!["x".into()]);
    a.add_row(row(&[("x", int_cell(1))]));
    let mut b = Table::new(vec!["x".into()]);
    b.add_row(row(&[("x", int_cell(2))]));
    a.append_table(b).unwrap();
    assert_eq!(a.num_rows(), 2);
}

#[test]
fn append_table_with_empty_is_identity() {
    let mut a = Table::new(vec!["x".into()]);
    a.add_row(row(&[("x", int_cell(1))]));
    let before = a.num_rows();
    let empty = Table::new(vec!["x".into()]);
    a.append_table(empty).unwrap();
    assert_eq!(a.num_rows(), before);
}

#[test]
fn dot_product_joins_on_shared_bindings() {
    let mut left = Table::new(vec!["x".into(), "y".into()]);
    left.add_row(row(&[("x", int_cell(1)), ("y", int_cell(10))]));
    left.add_row(row(&[("x", int_cell(2)), ("y", int_cell(20))]));

    let mut right = Table::new(vec!["x".into(), "z".into()]);
    right.add_row(row(&[("x", int_cell(1)), ("z", int_cell(100))]));
    right.add_row(row(&[("x", int_cell(3)), ("z", int_cell(300))]));

    let joined = left.dot_product(&right);
    assert_eq!(joined.num_rows(), 1);
    let r = &joined.rows()[0];
    assert_eq!(r.get("x"), Some(&int_cell(1)));
    assert_eq!(r.get("y"), Some(&int_cell(10)));
    assert_eq!(r.get("z"), Some(&int_cell(100)));
}

#[test]
fn dot_product_with_disjoint_schemas_is_cartesian() {
    let mut left = Table::new(vec!["x".into()]);
    left.add_row(row(&[("x", int_cell(1))]));
    left.add_row(row(&[("x", int_cell(2))]));

    let mut right = Table::new(vec!["y".into()]);
    right.add_row(row(&[("y", int_cell(10))]));
    right.add_row(row(&[("y", int_cell(20))]));
    right.add_row(row(&[("y", int_cell(30))]));

    let joined = left.dot_product(&right);
    assert_eq!(joined.num_rows(), 6);
}

#[test]
fn dot_product_with_empty_table_is_empty() {
    let left = Table::new(vec!["x".into()]);
    let mut right = Table::new(vec!["y".into()]);
    right.add_row(row(&[("y", int_cell(1))]));
    assert_eq!(left.dot_product(&right).num_rows(), 0);
}

fn row_set(t: &Table) -> HbHashSet<Vec<(String, String)>> {
    t.rows()
        .iter()
        .map(|r| {
            let mut pairs: Vec<(String, String)> = r
                .iter()
                .map(|(k, v)| (k.clone(), v.to_comparable_string()))
                .collect();
            pairs.sort();
            pairs
        })
        .collect()
}

#[test]
fn dot_product_is_commutative_up_to_row_order() {
    let mut a = Table::new(vec!["x".into()]);
    a.add_row(row(&[("x", int_cell(1))]));
    a.add_row(row(&[("x", int_cell(2))]));

    let mut b = Table::new(vec!["x".into(), "y".into()]);
    b.add_row(row(&[("x", int_cell(1)), ("y", int_cell(10))]));
    b.add_row(row(&[("x", int_cell(3)), ("y", int_cell(30))]));

    assert_eq!(row_set(&a.dot_product(&b)), row_set(&b.dot_product(&a)));
}

#[test]
fn dot_product_is_associative() {
    let mut a = Table::new(vec!["x".into()]);
    a.add_row(row(&[("x", int_cell(1))]));
    a.add_row(row(&[("x", int_cell(2))]));

    let mut b = Table::new(vec!["x".into(), "y".into()]);
    b.add_row(row(&[("x", int_cell(1)), ("y", int_cell(10))]));
    b.add_row(row(&[("x", int_cell(2)), ("y", int_cell(20))]));

    let mut c = Table::new(vec!["y".into(), "z".into()]);
    c.add_row(row(&[("y", int_cell(10)), ("z", int_cell(100))]));
    c.add_row(row(&[("y", int_cell(20)), ("z", int_cell(200))]));

    let left_first = a.dot_product(&b).dot_product(&c);
    let right_first = a.dot_product(&b.dot_product(&c));
    assert_eq!(row_set(&left_first), row_set(&right_first));
}

#[test]
fn merge_rows_lets_later_keys_win() {
    let r1 = row(&[("a", int_cell(1)), ("b", int_cell(2))]);
    let r2 = row(&[("b", int_cell(20)), ("c", int_cell(3))]);
    let merged = Table::merge_rows(&[&r1, &r2]);
    assert_eq!(merged.get("a"), Some(&int_cell(1)));
    assert_eq!(merged.get("b"), Some(&int_cell(20)));
    assert_eq!(merged.get("c"), Some(&int_cell(3)));
}

#[test]
fn project_bindings_drops_other_columns() {
    let mut t = Table::new(vec!["a".into(), "b".into()]);
    t.add_row(row(&[("a", int_cell(1)), ("b", int_cell(2))]));
    t.project_bindings(&["a".to_string()]).unwrap();
    assert_eq!(t.bindings(), &["a"]);
    assert!(t.rows()[0].get("b").is_none());
}

#[test]
fn project_bindings_is_idempotent_for_current_schema() {
    let mut t = Table::new(vec!["a".into(), "b".into()]);
    t.add_row(row(&[("a", int_cell(1)), ("b", int_cell(2))]));
    let schema = t.bindings().to_vec();
    t.project_bindings(&schema).unwrap();
    assert_eq!(t.bindings(), schema.as_slice());
    assert_eq!(t.num_rows(), 1);
}

#[test]
fn project_bindings_fails_on_unknown_binding() {
    let mut t = Table::new(vec!["a".into()]);
    assert!(t.project_bindings(&["z".to_string()]).is_err());
}

#[test]
fn filter_removes_rows_matching_predicate() {
    let mut t = Table::new(vec!["a".into()]);
    t.add_row(row(&[("a", int_cell(1))]));
    t.add_row(row(&[("a", int_cell(2))]));
    t.filter(|r| r.get("a") == Some(&int_cell(1)));
    assert_eq!(t.num_rows(), 1);
    assert_eq!(t.rows()[0].get("a"), Some(&int_cell(2)));
}

#[test]
fn sort_is_stable_for_equal_keys() {
    let mut t = Table::new(vec!["k".into(), "tag".into()]);
    t.add_row(row(&[("k", int_cell(1)), ("tag", Cell::Text("first".into()))]));
    t.add_row(row(&[("k", int_cell(1)), ("tag", Cell::Text("second".into()))]));
    t.add_row(row(&[("k", int_cell(0)), ("tag", Cell::Text("third".into()))]));
    t.sort(&vec![SortKey::asc("k")]);
    let tags: Vec<_> = t
        .rows()
        .iter()
        .map(|r| r.get("tag").unwrap().as_text().unwrap().to_string())
        .collect();
    assert_eq!(tags, vec!["third", "first", "second"]);
}

#[test]
fn sort_missing_binding_compares_as_empty_string() {
    let mut t = Table::new(vec!["k".into()]);
    t.add_row(row(&[("k", Cell::Text("b".into()))]));
    t.add_row(Row::new());
    t.sort(&vec![SortKey::asc("k")]);
    assert!(t.rows()[0].get("k").is_none());
}

#[test]
fn limit_truncates_to_first_n_rows() {
    let mut t = Table::new(vec!["a".into()]);
    for i in 0..5 {
        t.add_row(row(&[("a", int_cell(i))]));
    }
    t.limit(3);
    assert_eq!(t.num_rows(), 3);
}

#[test]
fn limit_is_noop_when_n_exceeds_row_count() {
    let mut t = Table::new(vec!["a".into()]);
    t.add_row(row(&[("a", int_cell(1))]));
    t.limit(10);
    assert_eq!(t.num_rows(), 1);
}

#[test]
fn sequential_limits_equal_limit_of_min() {
    let mut a = Table::new(vec!["a".into()]);
    let mut b = a.clone();
    for i in 0..10 {
        a.add_row(row(&[("a", int_cell(i))]));
        b.add_row(row(&[("a", int_cell(i))]));
    }
    a.limit(7);
    a.limit(4);
    b.limit(4);
    assert_eq!(row_set(&a), row_set(&b));
}

#[test]
fn reduce_produces_one_row_per_group_with_count() {
    let mut t = Table::new(vec!["p".into(), "c".into()]);
    t.add_row(row(&[("p", Cell::Node(Node::new("/u", "joe"))), ("c", int_cell(1))]));
    t.add_row(row(&[("p", Cell::Node(Node::new("/u", "joe"))), ("c", int_cell(2))]));
    t.add_row(row(&[("p", Cell::Node(Node::new("/u", "peter"))), ("c", int_cell(3))]));
    t.sort(&vec![SortKey::asc("p")]);

    let reduced = t
        .reduce(
            &vec![SortKey::asc("p")],
            &[AliasAccPair::new("c", "n", AccumulatorKind::Count)],
        )
        .unwrap();

    assert_eq!(reduced.num_rows(), 2);
    for r in reduced.rows() {
        let expected = match r.get("p").unwrap().as_node().unwrap().id.as_str() {
            "joe" => 2,
            "peter" => 1,
            other => panic!("unexpected group '{other}'"),
        };
        assert_eq!(r.get("n"), Some(&int_cell(expected)));
    }
}

#[test]
fn reduce_sum_int64_matches_arithmetic_sum() {
    let mut t = Table::new(vec!["g".into(), "v".into()]);
    t.add_row(row(&[("g", int_cell(1)), ("v", int_cell(10))]));
    t.add_row(row(&[("g", int_cell(1)), ("v", int_cell(20))]));
    t.sort(&vec![SortKey::asc("g")]);

    let reduced = t
        .reduce(
            &vec![SortKey::asc("g")],
            &[AliasAccPair::new("v", "sum", AccumulatorKind::SumInt64)],
        )
        .unwrap();
    assert_eq!(reduced.rows()[0].get("sum"), Some(&int_cell(30)));
}

#[test]
fn reduce_sum_int64_fails_on_wrong_literal_type() {
    let mut t = Table::new(vec!["g".into(), "v".into()]);
    t.add_row(row(&[("g", int_cell(1)), ("v", Cell::Literal(Literal::Float64(1.0)))]));
    let reduced = t.reduce(
        &vec![SortKey::asc("g")],
        &[AliasAccPair::new("v", "sum", AccumulatorKind::SumInt64)],
    );
    assert!(reduced.is_err());
}

#[test]
fn reduce_count_distinct_counts_unique_values() {
    let mut t = Table::new(vec!["g".into(), "v".into()]);
    t.add_row(row(&[("g", int_cell(1)), ("v", int_cell(10))]));
    t.add_row(row(&[("g", int_cell(1)), ("v", int_cell(10))]));
    t.add_row(row(&[("g", int_cell(1)), ("v", int_cell(20))]));

    let reduced = t
        .reduce(
            &vec![SortKey::asc("g")],
            &[AliasAccPair::new("v", "distinct_count", AccumulatorKind::CountDistinct)],
        )
        .unwrap();
    assert_eq!(reduced.rows()[0].get("distinct_count"), Some(&int_cell(2)));
}

proptest! {
    #[test]
    fn dot_product_disjoint_schemas_yield_product_of_sizes(
        left_n in 0usize..6,
        right_n in 0usize..6,
    ) {
        let mut left = Table::new(vec!["x".into()]);
        for i in 0..left_n {
            left.add_row(row(&[("x", int_cell(i as i64))]));
        }
        let mut right = Table::new(vec!["y".into()]);
        for i in 0..right_n {
            right.add_row(row(&[("y", int_cell(i as i64))]));
        }
        let joined = left.dot_product(&right);
        prop_assert_eq!(joined.num_rows(), left_n * right_n);
    }
}
