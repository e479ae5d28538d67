mod typst;

pub use typst::{generate_report_pdf, PrintDoc};

use serde_json::{Map, Value};

use crate::config::Organization;
use crate::fmt;
use crate::tabular::{cell_text, Row};

/// Assemble the printable document: cells pre-rendered to text, the header
/// band context column dropped (it is already shown above the table), and a
/// totals row aligned with the remaining columns.
#[allow(clippy::too_many_arguments)]
pub fn print_doc(
    title: String,
    start_date: String,
    end_date: String,
    generated: String,
    context: Option<String>,
    organization: Organization,
    headers: &[String],
    drop_column: Option<&str>,
    rows: &[Row],
    totals: &Map<String, Value>,
) -> PrintDoc {
    let display_headers: Vec<String> = headers
        .iter()
        .filter(|h| Some(h.as_str()) != drop_column)
        .cloned()
        .collect();

    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            display_headers
                .iter()
                .map(|h| cell_text(row.get(h)))
                .collect()
        })
        .collect();

    let mut totals_row: Vec<String> = display_headers
        .iter()
        .map(|h| {
            totals
                .get(h)
                .and_then(Value::as_f64)
                .map(fmt::number)
                .unwrap_or_default()
        })
        .collect();
    if let Some(first) = totals_row.first_mut() {
        if first.is_empty() {
            *first = "TOTAL".to_string();
        }
    }

    PrintDoc {
        title,
        start_date,
        end_date,
        generated,
        context,
        organization,
        headers: display_headers,
        rows: body,
        totals: totals_row,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn org() -> Organization {
        Organization {
            name: "Deccan Poultry".to_string(),
            address: "12 Market Road".to_string(),
            city: "Akola".to_string(),
            phone: None,
            email: None,
        }
    }

    #[test]
    fn context_column_is_dropped_and_totals_align() {
        let mut row = Row::new();
        row.insert("DATE".to_string(), json!("2024-01-05"));
        row.insert("ROUTE".to_string(), json!("East"));
        row.insert("AMOUNT".to_string(), json!(1000));

        let headers = vec!["DATE".to_string(), "ROUTE".to_string(), "AMOUNT".to_string()];
        let mut totals = Map::new();
        totals.insert("AMOUNT".to_string(), json!(1000.0));

        let doc = print_doc(
            "Sale Report (route wise)".to_string(),
            "2024-01-01".to_string(),
            "2024-01-31".to_string(),
            "January 31, 2024".to_string(),
            Some("Route: East".to_string()),
            org(),
            &headers,
            Some("ROUTE"),
            &[row],
            &totals,
        );

        assert_eq!(doc.headers, vec!["DATE", "AMOUNT"]);
        assert_eq!(doc.rows, vec![vec!["2024-01-05".to_string(), "1000".to_string()]]);
        assert_eq!(doc.totals, vec!["TOTAL".to_string(), "1,000".to_string()]);
    }
}
