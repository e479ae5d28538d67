//! Dynamic row/column helpers shared by the report engine and master-data
//! tables. Rows are open JSON objects whose shape is decided by the server;
//! key order is preserved end to end (serde_json `preserve_order`).

use std::collections::HashSet;

use serde_json::{Map, Value};

/// One report or entity row as received from the backend.
pub type Row = Map<String, Value>;

/// Column names of a row set: the key set of the first row, in iteration
/// order. An empty row set yields an empty header list; callers that export
/// or total must treat that as "nothing to do", never as a fault.
pub fn derive_headers(rows: &[Row]) -> Vec<String> {
    match rows.first() {
        Some(first) => first.keys().cloned().collect(),
        None => Vec::new(),
    }
}

/// Per-column numeric sums. The numeric check is per cell, not per column: a
/// mixed column produces a partial sum over its numeric cells only, which is
/// a display aggregate rather than an audited figure. Columns in `excluded`
/// (running balances and the like) and columns with no numeric cell at all
/// are left out of the result.
pub fn compute_totals(
    rows: &[Row],
    headers: &[String],
    excluded: &HashSet<String>,
) -> Map<String, Value> {
    let mut totals = Map::new();
    for header in headers {
        if excluded.contains(header) {
            continue;
        }
        let mut sum = 0.0;
        let mut numeric_cells = 0usize;
        for row in rows {
            if let Some(v) = row.get(header).and_then(Value::as_f64) {
                sum += v;
                numeric_cells += 1;
            }
        }
        if numeric_cells > 0 {
            totals.insert(header.clone(), json_number(sum));
        }
    }
    totals
}

fn json_number(value: f64) -> Value {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Stable single-column sort. Two numeric cells compare numerically,
/// anything else compares by display text; ties keep server order.
pub fn sort_rows(rows: &mut [Row], column: &str, descending: bool) {
    rows.sort_by(|a, b| {
        let left = a.get(column);
        let right = b.get(column);
        let ord = match (
            left.and_then(Value::as_f64),
            right.and_then(Value::as_f64),
        ) {
            (Some(l), Some(r)) => l.total_cmp(&r),
            _ => cell_text(left).cmp(&cell_text(right)),
        };
        if descending {
            ord.reverse()
        } else {
            ord
        }
    });
}

/// Full-text row filter: a row matches when any field's string form contains
/// the term, case-insensitively.
pub fn filter_rows(rows: Vec<Row>, term: &str) -> Vec<Row> {
    if term.is_empty() {
        return rows;
    }
    let needle = term.to_lowercase();
    rows.into_iter()
        .filter(|row| {
            row.values()
                .any(|v| cell_text(Some(v)).to_lowercase().contains(&needle))
        })
        .collect()
}

/// Identifier columns of an undeclared row shape: `id` itself plus foreign
/// keys like `customerId`. Numeric but meaningless to sum, so totals over
/// such rows must exclude them.
pub fn identifier_columns(headers: &[String]) -> HashSet<String> {
    headers
        .iter()
        .filter(|h| h.as_str() == "id" || h.ends_with("Id"))
        .cloned()
        .collect()
}

/// Display form of one cell. Null renders empty; numbers drop the `.0` that
/// serde_json would otherwise print for integral floats.
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(pairs: &[(&str, Value)]) -> Row {
        let mut m = Map::new();
        for (k, v) in pairs {
            m.insert(k.to_string(), v.clone());
        }
        m
    }

    #[test]
    fn headers_come_from_first_row_in_order() {
        let rows = vec![
            row(&[("DATE", json!("2024-01-05")), ("AMOUNT", json!(1000))]),
            row(&[("DATE", json!("2024-01-20")), ("AMOUNT", json!(500))]),
        ];
        assert_eq!(derive_headers(&rows), vec!["DATE", "AMOUNT"]);
    }

    #[test]
    fn empty_rows_yield_empty_headers() {
        assert!(derive_headers(&[]).is_empty());
    }

    #[test]
    fn totals_sum_numeric_columns() {
        let rows = vec![
            row(&[("DATE", json!("2024-01-05")), ("AMOUNT", json!(1000))]),
            row(&[("DATE", json!("2024-01-20")), ("AMOUNT", json!(500))]),
        ];
        let headers = derive_headers(&rows);
        let totals = compute_totals(&rows, &headers, &HashSet::new());
        assert_eq!(totals.len(), 1);
        assert_eq!(totals.get("AMOUNT").and_then(Value::as_f64), Some(1500.0));
    }

    #[test]
    fn mixed_column_sums_numeric_cells_only() {
        let rows = vec![
            row(&[("QTY", json!(10))]),
            row(&[("QTY", json!("n/a"))]),
            row(&[("QTY", json!(5))]),
        ];
        let totals = compute_totals(&rows, &["QTY".to_string()], &HashSet::new());
        assert_eq!(totals.get("QTY").and_then(Value::as_f64), Some(15.0));
    }

    #[test]
    fn excluded_columns_are_skipped() {
        let rows = vec![row(&[("AMOUNT", json!(100)), ("BALANCE PENDING", json!(40))])];
        let headers = derive_headers(&rows);
        let excluded: HashSet<String> = ["BALANCE PENDING".to_string()].into();
        let totals = compute_totals(&rows, &headers, &excluded);
        assert!(totals.contains_key("AMOUNT"));
        assert!(!totals.contains_key("BALANCE PENDING"));
    }

    #[test]
    fn identifier_columns_stay_out_of_totals() {
        let rows = vec![
            row(&[("id", json!(12)), ("customerId", json!(3)), ("amount", json!(100))]),
            row(&[("id", json!(13)), ("customerId", json!(4)), ("amount", json!(50))]),
        ];
        let headers = derive_headers(&rows);
        let totals = compute_totals(&rows, &headers, &identifier_columns(&headers));
        assert!(!totals.contains_key("id"));
        assert!(!totals.contains_key("customerId"));
        assert_eq!(totals.get("amount").and_then(Value::as_f64), Some(150.0));
    }

    #[test]
    fn totals_of_empty_rows_are_empty() {
        let totals = compute_totals(&[], &["AMOUNT".to_string()], &HashSet::new());
        assert!(totals.is_empty());
    }

    #[test]
    fn sort_is_numeric_when_both_cells_are_numbers() {
        let mut rows = vec![
            row(&[("KG", json!(100))]),
            row(&[("KG", json!(25))]),
            row(&[("KG", json!(9))]),
        ];
        sort_rows(&mut rows, "KG", false);
        let kgs: Vec<f64> = rows.iter().filter_map(|r| r["KG"].as_f64()).collect();
        assert_eq!(kgs, vec![9.0, 25.0, 100.0]);

        sort_rows(&mut rows, "KG", true);
        let kgs: Vec<f64> = rows.iter().filter_map(|r| r["KG"].as_f64()).collect();
        assert_eq!(kgs, vec![100.0, 25.0, 9.0]);
    }

    #[test]
    fn sort_keeps_server_order_on_ties() {
        let mut rows = vec![
            row(&[("ROUTE", json!("east")), ("ID", json!(1))]),
            row(&[("ROUTE", json!("west")), ("ID", json!(2))]),
            row(&[("ROUTE", json!("east")), ("ID", json!(3))]),
        ];
        sort_rows(&mut rows, "ROUTE", false);
        let ids: Vec<f64> = rows.iter().filter_map(|r| r["ID"].as_f64()).collect();
        assert_eq!(ids, vec![1.0, 3.0, 2.0]);
    }

    #[test]
    fn search_matches_any_field_case_insensitively() {
        let rows = vec![
            row(&[("name", json!("Ravi Traders")), ("city", json!("Pune"))]),
            row(&[("name", json!("Blue Farm")), ("city", json!("Nagpur"))]),
            row(&[("name", json!("Sunrise")), ("city", json!("PUNE"))]),
            row(&[("name", json!("Hilltop")), ("city", json!("Indore"))]),
            row(&[("name", json!("Deccan")), ("city", json!("Satara"))]),
        ];
        let matched = filter_rows(rows, "pune");
        assert_eq!(matched.len(), 2);
    }

    #[test]
    fn cell_text_renders_integral_numbers_without_fraction() {
        assert_eq!(cell_text(Some(&json!(1500.0))), "1500");
        assert_eq!(cell_text(Some(&json!(12.5))), "12.5");
        assert_eq!(cell_text(Some(&Value::Null)), "");
        assert_eq!(cell_text(None), "");
    }
}
