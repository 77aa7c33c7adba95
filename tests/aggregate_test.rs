//! Tests for max/min aggregate helpers

use rstest::rstest;

use rsviz::domain::{
    extent, max, max_element_with, max_with, min, min_element_with, min_with, Datum,
};

#[test]
fn given_missing_and_nan_values_when_max_then_skips_them() {
    let values = [Some(3.0), None, Some(7.0), Some(f64::NAN), Some(1.0)];

    assert_eq!(max(&values), Some(7.0));
    assert_eq!(min(&values), Some(1.0));
}

#[test]
fn given_empty_input_when_reducing_then_returns_none() {
    assert_eq!(max::<f64>(&[]), None);
    assert_eq!(min::<i32>(&[]), None);
    assert_eq!(extent::<f64>(&[]), None);
}

#[test]
fn given_negating_accessor_when_min_then_value_and_element_differ() {
    let values = [5, 2, 8];

    assert_eq!(min_with(&values, |d, _, _| Some(-d)), Some(-8));
    assert_eq!(min_element_with(&values, |d, _, _| Some(-d)), Some(&8));
    assert_eq!(max_element_with(&values, |d, _, _| Some(-d)), Some(&2));
}

#[rstest]
#[case(vec![1.0, 5.0, 3.0], Some(5.0))]
#[case(vec![f64::NAN, f64::NAN], None)]
#[case(vec![f64::NAN, -2.0, -7.0], Some(-2.0))]
#[case(vec![-0.5], Some(-0.5))]
fn given_numbers_when_max_then_returns_largest_valid(
    #[case] values: Vec<f64>,
    #[case] expected: Option<f64>,
) {
    assert_eq!(max(&values), expected);
}

#[test]
fn given_accessor_when_called_then_receives_index_and_slice() {
    let values = [10.0, 20.0, 30.0];
    let mut calls = Vec::new();

    let result = max_with(&values, |v, i, all| {
        calls.push((i, all.len()));
        Some(v * i as f64)
    });

    assert_eq!(result, Some(60.0));
    assert_eq!(calls, vec![(0, 3), (1, 3), (2, 3)]);
}

#[test]
fn given_data_rows_when_max_by_field_then_ignores_rows_without_value() {
    let rows = vec![
        Datum::record([("label", Datum::from("a")), ("value", Datum::from(4))]),
        Datum::record([("label", Datum::from("b"))]),
        Datum::record([("label", Datum::from("c")), ("value", Datum::from(9))]),
    ];

    let top = max_element_with(&rows, |row, _, _| row.get("value").and_then(Datum::as_f64));

    assert_eq!(top.and_then(|r| r.get("label")), Some(&Datum::from("c")));
    assert_eq!(
        max_with(&rows, |row, _, _| row.get("value").and_then(Datum::as_f64)),
        Some(9.0)
    );
}

#[test]
fn given_mixed_values_when_extent_then_returns_min_and_max() {
    assert_eq!(extent(&[3, 9, -1, 4]), Some((-1, 9)));
    assert_eq!(extent(&["pear", "apple"]), Some(("apple", "pear")));
}
