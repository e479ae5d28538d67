use std::path::Path;
use std::process::Command;

use serde::Serialize;

use crate::config::Organization;
use crate::error::{DeskError, Result};

/// Complete data for the printable report: header-band fields plus the
/// pre-rendered table cells.
#[derive(Debug, Serialize)]
pub struct PrintDoc {
    pub title: String,
    pub start_date: String,
    pub end_date: String,
    pub generated: String,
    pub context: Option<String>,
    pub organization: Organization,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub totals: Vec<String>,
}

/// Embedded Typst template for report printing.
/// The header band repeats on every page; column count follows the data.
const REPORT_TEMPLATE: &str = r##"// Report Template
// Data is loaded from JSON file

#let data = json("DATA_JSON_PATH")

#set page(
  paper: "a4",
  margin: (top: 4.4cm, bottom: 2cm, left: 1.5cm, right: 1.5cm),
  header: [
    #grid(
      columns: (1fr, 1fr),
      align: (left, right),
      [
        #text(size: 14pt, weight: "bold")[#data.title]
        #v(0.2em)
        #text(size: 9pt)[#data.start_date to #data.end_date]
        #if data.context != none [
          \ #text(size: 9pt)[#data.context]
        ]
        \ #text(size: 8pt, fill: gray)[Generated #data.generated]
      ],
      [
        #text(size: 11pt, weight: "bold")[#data.organization.name]
        #v(0.2em)
        #text(size: 8pt)[#data.organization.address]
        \ #text(size: 8pt)[#data.organization.city]
        #if data.organization.phone != none [
          \ #text(size: 8pt)[#data.organization.phone]
        ]
        #if data.organization.email != none [
          \ #text(size: 8pt)[#data.organization.email]
        ]
      ]
    )
    #line(length: 100%, stroke: 0.5pt + gray)
  ],
)

#set text(font: "Helvetica", size: 9pt)

#table(
  columns: data.headers.len(),
  inset: 6pt,
  stroke: (x, y) => if y == 0 { (bottom: 1pt + black) } else { (bottom: 0.5pt + gray) },
  fill: (x, y) => if y == 0 { luma(235) } else if calc.even(y) { luma(248) } else { none },

  // Column headers, repeated after page breaks
  table.header(..data.headers.map(h => [*#h*])),

  // Data rows
  ..data.rows.flatten(),

  // Totals row
  table.hline(stroke: 1pt + black),
  ..data.totals.map(t => [*#t*]),
)
"##;

/// Generate the report PDF using the Typst CLI.
pub fn generate_report_pdf(doc: &PrintDoc, output_path: &Path) -> Result<()> {
    // Check if typst is available
    let typst_check = Command::new("typst").arg("--version").output();

    if typst_check.is_err() {
        return Err(DeskError::TypstNotFound);
    }

    // Create temp directory for template
    let temp_dir = std::env::temp_dir().join("poultrydesk");
    std::fs::create_dir_all(&temp_dir)?;

    // Serialize report data to JSON
    let json_data =
        serde_json::to_string(doc).map_err(|e| DeskError::PdfGeneration(e.to_string()))?;

    // Write JSON to temp file
    let json_path = temp_dir.join("report_data.json");
    std::fs::write(&json_path, &json_data)?;

    // Write template with relative JSON path (data file is in same directory)
    let template_content = REPORT_TEMPLATE.replace("DATA_JSON_PATH", "report_data.json");
    let template_path = temp_dir.join("report.typ");
    std::fs::write(&template_path, &template_content)?;

    // Run typst compile with root set to temp directory
    let output = Command::new("typst")
        .args([
            "compile",
            "--root",
            temp_dir.to_str().unwrap_or("."),
            template_path.to_str().unwrap_or("report.typ"),
            output_path.to_str().unwrap_or("report.pdf"),
        ])
        .output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(DeskError::PdfGeneration(stderr.to_string()));
    }

    // Clean up temp files
    let _ = std::fs::remove_file(&template_path);
    let _ = std::fs::remove_file(&json_path);

    Ok(())
}
