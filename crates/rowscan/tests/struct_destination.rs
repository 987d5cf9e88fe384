#![allow(dead_code)]

use rowscan::{
    Destination, Json, MemoryRows, RowScanner, ScanError, Scannable, Value, field_index,
    ScanConfig,
};
use serde::Deserialize;

#[derive(Debug, Default, PartialEq, Scannable)]
pub struct FooNested {
    pub foo_nested: String,
}

#[derive(Debug, Default, PartialEq, Scannable)]
pub struct BarNested {
    pub bar_nested: String,
}

#[derive(Debug, Default, PartialEq, Scannable)]
struct NestedUnexported {
    pub foo_nested: String,
    pub bar_nested: String,
}

fn rows(columns: &[&str], row: Vec<Value>) -> MemoryRows {
    MemoryRows::new(columns.iter().copied(), vec![row])
}

fn strings(values: &[&str]) -> Vec<Value> {
    values.iter().map(|v| Value::from(*v)).collect()
}

/// Scans the first row of `rows` into a fresh `D`.
fn do_scan<D: Destination + Default>(rows: MemoryRows) -> Result<D, ScanError> {
    let mut scanner = RowScanner::new(rows);
    assert!(scanner.advance()?);
    let mut dst = D::default();
    scanner.scan(&mut dst)?;
    Ok(dst)
}

#[test]
fn test_fields_without_rename_use_snake_case_columns() {
    #[allow(non_snake_case)]
    #[derive(Debug, Default, PartialEq, Scannable)]
    struct Dst {
        pub FooColumn: String,
        pub Bar: String,
    }

    let got: Dst = do_scan(rows(
        &["foo_column", "bar"],
        strings(&["foo val", "bar val"]),
    ))
    .unwrap();

    assert_eq!(
        got,
        Dst {
            FooColumn: "foo val".into(),
            Bar: "bar val".into(),
        }
    );
}

#[test]
fn test_snake_case_fields_map_to_themselves() {
    #[derive(Debug, Default, PartialEq, Scannable)]
    struct Dst {
        pub foo_column: String,
        pub bar: String,
    }

    let got: Dst = do_scan(rows(
        &["bar", "foo_column"],
        strings(&["bar val", "foo val"]),
    ))
    .unwrap();

    assert_eq!(got.foo_column, "foo val");
    assert_eq!(got.bar, "bar val");
}

#[test]
fn test_renamed_fields_are_filled_from_renamed_columns() {
    #[derive(Debug, Default, PartialEq, Scannable)]
    struct Dst {
        #[scan(rename = "foo_column")]
        pub foo: String,
    }

    let got: Dst = do_scan(rows(&["foo_column"], strings(&["foo val"]))).unwrap();
    assert_eq!(got.foo, "foo val");
}

#[test]
fn test_skipped_field_is_not_filled() {
    #[derive(Debug, Default, PartialEq, Scannable)]
    struct Dst {
        #[scan(skip)]
        pub foo: String,
        #[scan(rename = "foo")]
        pub bar: String,
    }

    let got: Dst = do_scan(rows(&["foo"], strings(&["foo val"]))).unwrap();
    assert_eq!(
        got,
        Dst {
            foo: String::new(),
            bar: "foo val".into(),
        }
    );
}

#[test]
fn test_embedded_structs_are_filled_without_prefix() {
    #[derive(Debug, Default, PartialEq, Scannable)]
    struct Dst {
        #[scan(embed)]
        pub foo_nested: FooNested,
        #[scan(embed)]
        pub bar_nested: BarNested,
        pub foo: String,
        pub bar: String,
    }

    let got: Dst = do_scan(rows(
        &["foo", "bar", "foo_nested", "bar_nested"],
        strings(&["foo val", "bar val", "foo nested val", "bar nested val"]),
    ))
    .unwrap();

    assert_eq!(
        got,
        Dst {
            foo_nested: FooNested {
                foo_nested: "foo nested val".into(),
            },
            bar_nested: BarNested {
                bar_nested: "bar nested val".into(),
            },
            foo: "foo val".into(),
            bar: "bar val".into(),
        }
    );
}

#[test]
fn test_renamed_embedded_struct_is_filled_from_prefixed_columns() {
    #[derive(Debug, Default, PartialEq, Scannable)]
    struct Dst {
        #[scan(embed, rename = "nested")]
        pub foo_nested: FooNested,
        pub foo: String,
        pub bar: String,
    }

    let got: Dst = do_scan(rows(
        &["foo", "bar", "nested.foo_nested"],
        strings(&["foo val", "bar val", "foo nested val"]),
    ))
    .unwrap();

    assert_eq!(got.foo_nested.foo_nested, "foo nested val");
    assert_eq!(got.foo, "foo val");
    assert_eq!(got.bar, "bar val");
}

#[test]
fn test_renamed_embedded_struct_is_not_reachable_without_prefix() {
    #[derive(Debug, Default, PartialEq, Scannable)]
    struct Dst {
        #[scan(embed, rename = "nested")]
        pub foo_nested: FooNested,
    }

    let err = do_scan::<Dst>(rows(&["foo_nested"], strings(&["foo nested val"]))).unwrap_err();
    assert!(matches!(err, ScanError::UnmappedColumn { ref column, .. } if column == "foo_nested"));
}

#[test]
fn test_embedded_pointer_is_allocated_and_filled() {
    #[derive(Debug, Default, PartialEq, Scannable)]
    struct Dst {
        #[scan(embed)]
        pub foo_nested: Option<Box<FooNested>>,
        pub foo: String,
        pub bar: String,
    }

    let got: Dst = do_scan(rows(
        &["foo", "bar", "foo_nested"],
        strings(&["foo val", "bar val", "foo nested val"]),
    ))
    .unwrap();

    assert_eq!(
        got,
        Dst {
            foo_nested: Some(Box::new(FooNested {
                foo_nested: "foo nested val".into(),
            })),
            foo: "foo val".into(),
            bar: "bar val".into(),
        }
    );
}

#[test]
fn test_embedded_pointer_stays_none_when_not_filled() {
    #[derive(Debug, Default, PartialEq, Scannable)]
    struct Dst {
        #[scan(embed)]
        pub foo_nested: Option<Box<FooNested>>,
        pub foo: String,
        pub bar: String,
    }

    let got: Dst = do_scan(rows(&["foo", "bar"], strings(&["foo val", "bar val"]))).unwrap();

    assert_eq!(got.foo_nested, None);
    assert_eq!(got.foo, "foo val");
    assert_eq!(got.bar, "bar val");
}

#[test]
fn test_boxed_embedded_struct_is_filled() {
    #[derive(Debug, Default, PartialEq, Scannable)]
    struct Dst {
        #[scan(embed)]
        pub foo_nested: Box<FooNested>,
    }

    let got: Dst = do_scan(rows(&["foo_nested"], strings(&["foo nested val"]))).unwrap();
    assert_eq!(got.foo_nested.foo_nested, "foo nested val");
}

#[test]
fn test_skipped_embedded_struct_is_not_filled() {
    #[derive(Debug, Default, PartialEq, Scannable)]
    struct Dst {
        #[scan(embed, skip)]
        pub foo_nested: FooNested,
        #[scan(rename = "nested.foo_nested")]
        pub foo: String,
        #[scan(rename = "nested.bar_nested")]
        pub bar: String,
    }

    let got: Dst = do_scan(rows(
        &["nested.foo_nested", "nested.bar_nested"],
        strings(&["foo nested val", "bar nested val"]),
    ))
    .unwrap();

    assert_eq!(
        got,
        Dst {
            foo_nested: FooNested::default(),
            foo: "foo nested val".into(),
            bar: "bar nested val".into(),
        }
    );
}

#[test]
fn test_nested_struct_is_filled_from_json_column() {
    #[derive(Debug, Default, PartialEq, Deserialize)]
    struct JsonObj {
        some_field: String,
    }

    #[derive(Debug, Default, PartialEq, Scannable)]
    struct Dst {
        pub json: Json<JsonObj>,
        pub foo: String,
    }

    let got: Dst = do_scan(rows(
        &["foo", "json"],
        vec![
            Value::from("foo val"),
            Value::Json(serde_json::json!({ "some_field": "some field val" })),
        ],
    ))
    .unwrap();

    assert_eq!(got.json.some_field, "some field val");
    assert_eq!(got.foo, "foo val");
}

#[test]
fn test_typed_leaves_are_converted() {
    #[derive(Debug, Default, PartialEq, Scannable)]
    struct Dst {
        pub id: i32,
        pub score: f64,
        pub active: bool,
        pub note: Option<String>,
        pub tags: Vec<String>,
    }

    let got: Dst = do_scan(rows(
        &["id", "score", "active", "note", "tags"],
        vec![
            Value::Int(7),
            Value::Float(0.5),
            Value::Boolean(true),
            Value::Null,
            Value::StringArray(vec!["a".into(), "b".into()]),
        ],
    ))
    .unwrap();

    assert_eq!(
        got,
        Dst {
            id: 7,
            score: 0.5,
            active: true,
            note: None,
            tags: vec!["a".into(), "b".into()],
        }
    );
}

#[test]
fn test_missing_field_is_reported() {
    #[derive(Debug, Default, PartialEq, Scannable)]
    struct Dst {
        pub bar: String,
    }

    let err = do_scan::<Dst>(rows(&["foo", "bar"], strings(&["foo val", "bar val"]))).unwrap_err();
    assert_eq!(
        err.to_string(),
        "column: 'foo': no corresponding field found or it's unexported in struct Dst { bar: String }"
    );
}

#[test]
fn test_unexported_field_is_not_a_target() {
    #[derive(Debug, Default, PartialEq, Scannable)]
    struct Dst {
        foo: String,
        pub bar: String,
    }

    let err = do_scan::<Dst>(rows(&["foo", "bar"], strings(&["foo val", "bar val"]))).unwrap_err();
    assert_eq!(
        err.to_string(),
        "column: 'foo': no corresponding field found or it's unexported in struct Dst { foo: String; bar: String }"
    );
}

#[test]
fn test_unexported_embedded_struct_is_not_a_target() {
    #[derive(Debug, Default, PartialEq, Scannable)]
    struct Dst {
        #[scan(embed)]
        nested: NestedUnexported,
        pub foo: String,
        pub bar: String,
    }

    let err = do_scan::<Dst>(rows(
        &["foo", "bar", "foo_nested", "bar_nested"],
        strings(&["foo val", "bar val", "foo nested val", "bar nested val"]),
    ))
    .unwrap_err();

    assert!(matches!(
        err,
        ScanError::UnmappedColumn { ref column, .. } if column == "foo_nested"
    ));
}

#[test]
fn test_fields_of_non_embedded_struct_are_not_reachable() {
    #[derive(Debug, Default, PartialEq, Deserialize)]
    struct Plain {
        foo_nested: String,
    }

    #[derive(Debug, Default, PartialEq, Scannable)]
    struct Dst {
        pub nested: Json<Plain>,
        pub foo: String,
        pub bar: String,
    }

    let err = do_scan::<Dst>(rows(
        &["foo", "bar", "foo_nested"],
        strings(&["foo val", "bar val", "foo nested val"]),
    ))
    .unwrap_err();

    assert_eq!(
        err.to_string(),
        "column: 'foo_nested': no corresponding field found or it's unexported in \
         struct Dst { nested: Json<Plain>; foo: String; bar: String }"
    );
}

#[test]
fn test_duplicate_rename_is_a_shape_error() {
    #[derive(Debug, Default, PartialEq, Scannable)]
    struct Dst {
        #[scan(rename = "foo_column")]
        pub foo: String,
        #[scan(rename = "foo_column")]
        pub bar: String,
    }

    let err = do_scan::<Dst>(rows(
        &["foo_column", "bar"],
        strings(&["foo val", "bar val"]),
    ))
    .unwrap_err();

    match &err {
        ScanError::DuplicateColumnMapping {
            column,
            first_member,
            first_path,
            second_member,
            second_path,
            ..
        } => {
            assert_eq!(column, "foo_column");
            assert_eq!(first_member, "foo");
            assert_eq!(second_member, "bar");
            assert_eq!(first_path.indexes(), vec![0]);
            assert_eq!(second_path.indexes(), vec![1]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(
        err.to_string(),
        "column must have exactly one field pointing to it; found 2 fields `foo` [0] and `bar` [1] \
         pointing to 'foo_column' in struct Dst { foo: String \"foo_column\"; bar: String \"foo_column\" }"
    );

    // Reported by the index itself, before any row is read.
    assert!(field_index::<Dst>(&ScanConfig::default()).is_err());
}

#[test]
fn test_embedded_field_colliding_with_parent_field_is_a_shape_error() {
    #[derive(Debug, Default, PartialEq, Scannable)]
    struct Dst {
        #[scan(embed)]
        pub nested: FooNested,
        pub foo_nested: String,
    }

    let err = field_index::<Dst>(&ScanConfig::default()).unwrap_err();
    match err {
        ScanError::DuplicateColumnMapping {
            first_member,
            first_path,
            second_member,
            second_path,
            ..
        } => {
            assert_eq!(first_member, "nested.foo_nested");
            assert_eq!(first_path.to_string(), "[0 0]");
            assert_eq!(second_member, "foo_nested");
            assert_eq!(second_path.to_string(), "[1]");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_conversion_failure_names_column() {
    #[derive(Debug, Default, PartialEq, Scannable)]
    struct Dst {
        pub count: u8,
    }

    let err = do_scan::<Dst>(rows(&["count"], vec![Value::Int(1000)])).unwrap_err();
    assert!(matches!(err, ScanError::Conversion { ref column, .. } if column == "count"));
    assert!(err.to_string().starts_with("column 'count': value 1000 is out of range"));
}
