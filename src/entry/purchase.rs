//! Purchase entry: DC (delivery challan) line items plus trip expenses,
//! submitted as one multipart request with the scanned challans attached.

use chrono::NaiveDate;
use serde::Serialize;
use std::path::PathBuf;

use crate::error::{DeskError, Result};
use crate::fmt::round2;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DcLine {
    pub sr_no: u32,
    pub dc_no: String,
    #[serde(serialize_with = "as_number")]
    pub nos: Option<f64>,
    #[serde(serialize_with = "as_number")]
    pub kilograms: Option<f64>,
    #[serde(serialize_with = "as_number")]
    pub rate: Option<f64>,
    pub amount: f64,
}

fn as_number<S: serde::Serializer>(v: &Option<f64>, ser: S) -> std::result::Result<S::Ok, S::Error> {
    ser.serialize_f64(v.unwrap_or(0.0))
}

impl DcLine {
    /// Parse CLI input `dcNo:nos:kilograms[:rate]`. The sequence number is
    /// assigned when the line joins a form.
    pub fn parse(input: &str) -> Result<Self> {
        const EXPECTED: &str = "dcNo:nos:kilograms[:rate]";
        let parts: Vec<&str> = input.split(':').collect();
        if parts.len() < 3 || parts.len() > 4 || parts[0].is_empty() {
            return Err(DeskError::InvalidLine {
                input: input.to_string(),
                expected: EXPECTED,
            });
        }

        let mut line = DcLine {
            sr_no: 0,
            dc_no: parts[0].to_string(),
            nos: None,
            kilograms: None,
            rate: None,
            amount: 0.0,
        };
        if !parts[1].is_empty() {
            line.nos = Some(parse_number("nos", parts[1])?);
        }
        if !parts[2].is_empty() {
            line.set_kilograms(parse_number("kilograms", parts[2])?);
        }
        if let Some(rate) = parts.get(3).filter(|p| !p.is_empty()) {
            line.set_rate(parse_number("rate", rate)?);
        }
        Ok(line)
    }

    pub fn set_kilograms(&mut self, kilograms: f64) {
        self.kilograms = Some(kilograms);
        self.recompute();
    }

    pub fn set_rate(&mut self, rate: f64) {
        self.rate = Some(rate);
        self.recompute();
    }

    fn recompute(&mut self) {
        self.amount = round2(self.rate.unwrap_or(0.0) * self.kilograms.unwrap_or(0.0));
    }
}

fn parse_number(field: &str, raw: &str) -> Result<f64> {
    raw.parse().map_err(|_| DeskError::InvalidNumber {
        field: field.to_string(),
        value: raw.to_string(),
    })
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseEntryForm {
    pub entry_date: Option<NaiveDate>,
    pub vehicle: Option<String>,
    pub driver: Option<String>,
    pub supplier: Option<String>,
    pub branch: String,
    pub farm: String,
    pub supervisor_name: String,
    pub supervisor_phone_no: String,
    pub driver_expense: f64,
    pub diesel: f64,
    pub hamali: f64,
    pub notes: String,
    pub dc_details: Vec<DcLine>,
    #[serde(skip)]
    pub attachments: Vec<PathBuf>,
}

impl PurchaseEntryForm {
    /// Append a line, assigning the next sequence number.
    pub fn add_line(&mut self, mut line: DcLine) {
        line.sr_no = self.dc_details.len() as u32 + 1;
        self.dc_details.push(line);
    }

    /// Remove a line (0-based) and renumber the remainder.
    pub fn remove_line(&mut self, index: usize) {
        if index < self.dc_details.len() {
            self.dc_details.remove(index);
            for (idx, line) in self.dc_details.iter_mut().enumerate() {
                line.sr_no = idx as u32 + 1;
            }
        }
    }

    /// Per-column totals over the DC table: (nos, kilograms, amount).
    pub fn line_totals(&self) -> (f64, f64, f64) {
        let nos = self.dc_details.iter().filter_map(|l| l.nos).sum();
        let kg = self.dc_details.iter().filter_map(|l| l.kilograms).sum();
        let amount = self.dc_details.iter().map(|l| l.amount).sum();
        (nos, kg, amount)
    }

    pub fn expense_total(&self) -> f64 {
        round2(self.driver_expense + self.diesel + self.hamali)
    }

    pub fn validate(&self) -> Result<()> {
        if self.entry_date.is_none()
            || self.vehicle.as_deref().unwrap_or("").is_empty()
            || self.supplier.as_deref().unwrap_or("").is_empty()
            || self.driver.as_deref().unwrap_or("").is_empty()
        {
            return Err(DeskError::MissingField(
                "Date, Vehicle No, Driver, and Supplier".to_string(),
            ));
        }
        if self.dc_details.is_empty() {
            return Err(DeskError::NoLines);
        }
        if self
            .dc_details
            .iter()
            .any(|l| l.nos.is_none() || l.kilograms.is_none())
        {
            return Err(DeskError::MissingField(
                "Nos and Kilograms in every entry detail".to_string(),
            ));
        }
        Ok(())
    }

    /// The JSON document carried as the `purchaseEntry` multipart part.
    pub fn payload_json(&self) -> Result<String> {
        self.validate()?;
        serde_json::to_string(self).map_err(|e| DeskError::BadResponse(e.to_string()))
    }
}
