use rowscan::{MemoryRows, RowScanner, ScanError, Scannable, Value};
use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

fn rows(columns: &[&str], row: Vec<Value>) -> MemoryRows {
    MemoryRows::new(columns.iter().copied(), vec![row])
}

fn scan_first<D: rowscan::Destination>(rows: MemoryRows, dst: &mut D) -> Result<(), ScanError> {
    let mut scanner = RowScanner::new(rows);
    assert!(scanner.advance()?);
    scanner.scan(dst)
}

#[test]
fn test_map_receives_every_column() {
    let mut got: HashMap<String, Value> = HashMap::new();
    scan_first(
        rows(
            &["foo", "bar", "baz"],
            vec![Value::from("foo val"), Value::Int(2), Value::Boolean(true)],
        ),
        &mut got,
    )
    .unwrap();

    let expected = HashMap::from([
        ("foo".to_string(), Value::from("foo val")),
        ("bar".to_string(), Value::Int(2)),
        ("baz".to_string(), Value::Boolean(true)),
    ]);
    assert_eq!(got, expected);
}

#[test]
fn test_map_keeps_null_values() {
    let mut got: BTreeMap<Arc<str>, Value> = BTreeMap::new();
    scan_first(rows(&["foo"], vec![Value::Null]), &mut got).unwrap();
    assert_eq!(got.get("foo"), Some(&Value::Null));
}

#[test]
fn test_map_with_non_string_key_is_rejected() {
    let mut got: HashMap<i32, Value> = HashMap::new();
    let err = scan_first(rows(&["foo"], vec![Value::from("foo val")]), &mut got).unwrap_err();

    assert!(matches!(err, ScanError::InvalidDestination { .. }));
    assert!(
        err.to_string().ends_with("map must have string key, got: i32"),
        "{err}"
    );
}

#[test]
fn test_scalar_receives_single_column() {
    let mut got = String::new();
    scan_first(rows(&["foo"], vec![Value::from("foo val")]), &mut got).unwrap();
    assert_eq!(got, "foo val");
}

#[test]
fn test_boxed_scalar_receives_single_column() {
    let mut got: Box<String> = Box::default();
    scan_first(rows(&["foo"], vec![Value::from("foo val")]), &mut got).unwrap();
    assert_eq!(*got, "foo val");
}

#[test]
fn test_array_scalar_receives_single_column() {
    let mut got: Vec<String> = Vec::new();
    scan_first(
        rows(
            &["foo"],
            vec![Value::StringArray(vec!["foo val".into(), "foo val 2".into()])],
        ),
        &mut got,
    )
    .unwrap();
    assert_eq!(got, vec!["foo val".to_string(), "foo val 2".to_string()]);
}

#[test]
fn test_optional_scalar_receives_null() {
    let mut got: Option<i64> = Some(1);
    scan_first(rows(&["foo"], vec![Value::Null]), &mut got).unwrap();
    assert_eq!(got, None);
}

#[test]
fn test_scalar_with_two_columns_is_rejected() {
    let mut got = String::new();
    let err = scan_first(
        rows(&["foo", "bar"], vec![Value::from("foo val"), Value::from("bar val")]),
        &mut got,
    )
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "to scan into a primitive type, columns number must be exactly 1, got: 2"
    );
}

#[test]
fn test_scalar_with_no_columns_is_rejected() {
    let mut got = String::new();
    let err = scan_first(rows(&[], Vec::new()), &mut got).unwrap_err();
    assert!(matches!(err, ScanError::InvalidScanRowCount(0)));
}

#[test]
fn test_scalar_null_into_non_optional_is_a_conversion_error() {
    let mut got = 0i64;
    let err = scan_first(rows(&["count"], vec![Value::Null]), &mut got).unwrap_err();
    assert!(matches!(err, ScanError::Conversion { ref column, .. } if column == "count"));
}

#[test]
fn test_duplicate_columns_are_rejected_for_struct() {
    #[derive(Debug, Default, Scannable)]
    struct Dst {
        pub foo: String,
    }

    let mut got = Dst::default();
    let err = scan_first(
        rows(&["foo", "foo"], vec![Value::from("foo val"), Value::from("foo val")]),
        &mut got,
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "row contains duplicated column 'foo'");
}

#[test]
fn test_duplicate_columns_are_rejected_for_map() {
    let mut got: HashMap<String, Value> = HashMap::new();
    let err = scan_first(
        rows(&["foo", "foo"], vec![Value::from("foo val"), Value::from("foo val")]),
        &mut got,
    )
    .unwrap_err();
    assert!(matches!(err, ScanError::DuplicateColumn(ref column) if column == "foo"));
    assert!(got.is_empty());
}
