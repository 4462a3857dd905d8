use serde_json::{Map, Value};

/// Raw tabular data as returned by the values API: rows of columns.
pub type Grid = Vec<Vec<Value>>;

/// One data row reinterpreted as a field-name → value mapping. The map keeps
/// insertion order, so fields follow the header column order.
pub type Record = Map<String, Value>;

pub type RecordSet = Vec<Record>;

/// Reinterprets a grid as named-field records using row 0 as the header.
///
/// Returns `None` only for a grid with no rows at all (the "no data"
/// sentinel); a grid with just a header row yields an empty set. Rows shorter
/// than the header fill the unmatched fields with null, longer rows have the
/// extra columns dropped, and a duplicate header name takes its value from
/// the last column carrying it.
pub fn to_records(grid: &[Vec<Value>]) -> Option<RecordSet> {
    let (header, data_rows) = grid.split_first()?;
    let field_names: Vec<String> = header.iter().map(field_name).collect();

    let records = data_rows
        .iter()
        .map(|row| {
            let mut record = Record::new();
            for (index, name) in field_names.iter().enumerate() {
                record.insert(
                    name.clone(),
                    row.get(index).cloned().unwrap_or(Value::Null),
                );
            }
            record
        })
        .collect();

    Some(records)
}

fn field_name(cell: &Value) -> String {
    match cell {
        Value::String(name) => name.clone(),
        other => other.to_string(),
    }
}
