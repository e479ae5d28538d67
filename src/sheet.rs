//! Spreadsheet export: one sheet, a header row, then data rows, using the
//! same headers as the on-screen table.

use std::path::Path;

use crate::error::{DeskError, Result};
use crate::tabular::{cell_text, Row};

pub fn write_sheet(headers: &[String], rows: &[Row], path: &Path) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).map_err(|e| DeskError::SheetGeneration(e.to_string()))?;

    writer
        .write_record(headers)
        .map_err(|e| DeskError::SheetGeneration(e.to_string()))?;

    for row in rows {
        let record: Vec<String> = headers.iter().map(|h| cell_text(row.get(h))).collect();
        writer
            .write_record(&record)
            .map_err(|e| DeskError::SheetGeneration(e.to_string()))?;
    }

    writer
        .flush()
        .map_err(|e| DeskError::SheetGeneration(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sheet_has_header_row_then_data_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");

        let mut row = Row::new();
        row.insert("DATE".to_string(), json!("2024-01-05"));
        row.insert("AMOUNT".to_string(), json!(1000));
        let headers = vec!["DATE".to_string(), "AMOUNT".to_string()];

        write_sheet(&headers, &[row], &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("DATE,AMOUNT"));
        assert_eq!(lines.next(), Some("2024-01-05,1000"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn missing_cells_render_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");

        let mut row = Row::new();
        row.insert("DATE".to_string(), json!("2024-01-05"));
        let headers = vec!["DATE".to_string(), "AMOUNT".to_string()];

        write_sheet(&headers, &[row], &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("2024-01-05,"));
    }
}
