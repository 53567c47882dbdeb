use dyntable::{ColumnType, OpaqueRef, Table, TableError, Value};
use dyntable_json::{
    table_from_json, table_from_json_str, table_to_json, table_to_json_string, JsonError,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn sample() -> Table {
    let mut table = Table::new();
    table.add_column("id", ColumnType::UInt32).unwrap();
    table.add_column("label", ColumnType::String).unwrap();
    table.add_column("ratio", ColumnType::Float).unwrap();
    table.add_column("ok", ColumnType::Bool).unwrap();
    table.add_column("initial", ColumnType::Char).unwrap();
    table.add_column("handle", ColumnType::Ptr).unwrap();
    for _ in 0..2 {
        table.add_row().unwrap();
    }
    table.set_uint32(0, 0, 1).unwrap();
    table.set_string(0, 1, "first").unwrap();
    table.set_float(0, 2, 1.1).unwrap();
    table.set_bool(0, 3, true).unwrap();
    table.set_char(0, 4, b'f' as i8).unwrap();
    table.set_ptr(0, 5, OpaqueRef::from_addr(0x40)).unwrap();
    table.set_uint32(1, 0, 2).unwrap();
    table
}

#[test]
fn export_matches_the_document_shape() {
    let json = table_to_json(&sample()).unwrap();
    assert_eq!(json["columns"][0], json!({ "name": "id", "data_type": 7 }));
    assert_eq!(json["columns"][1], json!({ "name": "label", "data_type": 21 }));
    assert_eq!(json["rows"][1], json!([2, null, null, null, null, null]));
    assert_eq!(json["rows"][0][3], json!(true));
    assert_eq!(json["rows"][0][4], json!("f"));
    assert_eq!(json["rows"][0][5], json!("0x40"));
}

#[test]
fn round_trip_preserves_the_table() {
    let table = sample();
    let text = table_to_json_string(&table).unwrap();
    let back = table_from_json_str(&text).unwrap();

    assert_eq!(back.column_count(), table.column_count());
    assert_eq!(back.row_count(), table.row_count());
    for col in 0..table.column_count() {
        assert_eq!(back.column_name(col).unwrap(), table.column_name(col).unwrap());
        assert_eq!(back.column_type(col).unwrap(), table.column_type(col).unwrap());
        for row in 0..table.row_count() {
            assert_eq!(back.get(row, col).unwrap(), table.get(row, col).unwrap());
        }
    }
}

#[test]
fn import_parses_scalars_through_text() {
    let table = table_from_json(&json!({
        "columns": [
            { "name": "flag", "data_type": 22 },
            { "name": "n", "data_type": 12 }
        ],
        "rows": [[1, "-9"], ["FALSE", 12]]
    }))
    .unwrap();
    assert_eq!(table.get(0, 0).unwrap(), Some(&Value::Bool(true)));
    assert_eq!(table.get_long(0, 1).unwrap(), Some(-9));
    assert_eq!(table.get_bool(1, 0).unwrap(), Some(false));
    assert_eq!(table.get_long(1, 1).unwrap(), Some(12));
}

#[test]
fn import_rejects_malformed_documents() {
    let err = table_from_json(&json!({ "columns": [{ "name": "x", "data_type": 99 }] }))
        .unwrap_err();
    assert!(matches!(err, JsonError::UnknownTypeTag(99)), "{err}");

    let err = table_from_json(&json!({
        "columns": [{ "name": "x", "data_type": 0 }],
        "rows": [[1, 2]]
    }))
    .unwrap_err();
    assert!(
        matches!(
            err,
            JsonError::RowWidth {
                row: 0,
                expected: 1,
                found: 2
            }
        ),
        "{err}"
    );

    let err = table_from_json(&json!({
        "columns": [{ "name": "x", "data_type": 0 }],
        "rows": [[[1]]]
    }))
    .unwrap_err();
    assert!(matches!(err, JsonError::UnsupportedCell { row: 0, column: 0 }), "{err}");

    let err = table_from_json(&json!({
        "columns": [{ "name": "x", "data_type": 3 }],
        "rows": [[300]]
    }))
    .unwrap_err();
    assert!(
        matches!(err, JsonError::Table(TableError::Parse { column_type: ColumnType::UInt8, .. })),
        "{err}"
    );

    assert!(matches!(table_from_json_str("{"), Err(JsonError::Json(_))));
}
