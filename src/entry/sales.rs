//! Sales entry: one line per customer on the selected route, submitted in a
//! single bulk request. Amount and pending are derived and recomputed on
//! every edit; they are never set directly.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{DeskError, Result};
use crate::fmt::round2;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesLine {
    pub customer_id: String,
    #[serde(serialize_with = "as_number")]
    pub kilograms: Option<f64>,
    #[serde(serialize_with = "as_number")]
    pub rate: Option<f64>,
    pub amount: f64,
    pub payment_mode: String,
    pub payment: f64,
    pub pending: f64,
    pub description: String,
}

fn as_number<S: serde::Serializer>(v: &Option<f64>, ser: S) -> std::result::Result<S::Ok, S::Error> {
    ser.serialize_f64(v.unwrap_or(0.0))
}

impl SalesLine {
    pub fn new(customer_id: &str) -> Self {
        SalesLine {
            customer_id: customer_id.to_string(),
            kilograms: None,
            rate: None,
            amount: 0.0,
            payment_mode: "cash".to_string(),
            payment: 0.0,
            pending: 0.0,
            description: String::new(),
        }
    }

    pub fn set_kilograms(&mut self, kilograms: f64) {
        self.kilograms = Some(kilograms);
        self.recompute();
    }

    pub fn set_rate(&mut self, rate: f64) {
        self.rate = Some(rate);
        self.recompute();
    }

    pub fn set_payment(&mut self, payment: f64) {
        self.payment = payment;
        self.recompute();
    }

    pub fn set_payment_mode(&mut self, mode: &str) {
        self.payment_mode = mode.to_string();
    }

    fn recompute(&mut self) {
        self.amount = round2(self.rate.unwrap_or(0.0) * self.kilograms.unwrap_or(0.0));
        self.pending = round2(self.amount - self.payment);
    }

    /// A line takes part in submission only when both inputs are present.
    pub fn is_complete(&self) -> bool {
        self.kilograms.is_some() && self.rate.is_some()
    }

    /// Parse CLI line input: `customer:kilograms:rate[:payment[:mode]]`.
    /// Kilograms and rate may be left empty for a customer with no delivery
    /// today; such lines are dropped at submission time.
    pub fn parse(input: &str) -> Result<Self> {
        const EXPECTED: &str = "customer:kilograms:rate[:payment[:mode]]";
        let parts: Vec<&str> = input.split(':').collect();
        if parts.len() < 3 || parts.len() > 5 || parts[0].is_empty() {
            return Err(DeskError::InvalidLine {
                input: input.to_string(),
                expected: EXPECTED,
            });
        }

        let mut line = SalesLine::new(parts[0]);
        if !parts[1].is_empty() {
            line.set_kilograms(parse_number("kilograms", parts[1])?);
        }
        if !parts[2].is_empty() {
            line.set_rate(parse_number("rate", parts[2])?);
        }
        if let Some(payment) = parts.get(3).filter(|p| !p.is_empty()) {
            line.set_payment(parse_number("payment", payment)?);
        }
        if let Some(mode) = parts.get(4).filter(|p| !p.is_empty()) {
            line.set_payment_mode(mode);
        }
        Ok(line)
    }
}

fn parse_number(field: &str, raw: &str) -> Result<f64> {
    raw.parse().map_err(|_| DeskError::InvalidNumber {
        field: field.to_string(),
        value: raw.to_string(),
    })
}

#[derive(Debug)]
pub struct SalesEntryForm {
    pub date: NaiveDate,
    pub route: Option<String>,
    pub vehicle: Option<String>,
    pub driver: Option<String>,
    pub lines: Vec<SalesLine>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SalesPayload<'a> {
    date: NaiveDate,
    route: &'a str,
    driver: &'a str,
    vehicle_no: &'a str,
    sales_details: Vec<&'a SalesLine>,
}

impl SalesEntryForm {
    pub fn new(date: NaiveDate) -> Self {
        SalesEntryForm {
            date,
            route: None,
            vehicle: None,
            driver: None,
            lines: Vec::new(),
        }
    }

    pub fn push_line(&mut self, line: SalesLine) {
        self.lines.push(line);
    }

    /// Header fields first, then line completeness; nothing is sent until
    /// this passes.
    pub fn validate(&self) -> Result<()> {
        if self.route.as_deref().unwrap_or("").is_empty() {
            return Err(DeskError::MissingField(
                "Route, Driver, and Vehicle".to_string(),
            ));
        }
        if self.driver.as_deref().unwrap_or("").is_empty() {
            return Err(DeskError::MissingField(
                "Route, Driver, and Vehicle".to_string(),
            ));
        }
        if self.vehicle.as_deref().unwrap_or("").is_empty() {
            return Err(DeskError::MissingField(
                "Route, Driver, and Vehicle".to_string(),
            ));
        }
        if !self.lines.iter().any(SalesLine::is_complete) {
            return Err(DeskError::NoLines);
        }
        Ok(())
    }

    /// Bulk-create payload: incomplete lines are filtered out, matching the
    /// screen behaviour of skipping customers without a delivery.
    pub fn payload(&self) -> Result<serde_json::Value> {
        self.validate()?;
        let payload = SalesPayload {
            date: self.date,
            route: self.route.as_deref().unwrap_or(""),
            driver: self.driver.as_deref().unwrap_or(""),
            vehicle_no: self.vehicle.as_deref().unwrap_or(""),
            sales_details: self.lines.iter().filter(|l| l.is_complete()).collect(),
        };
        serde_json::to_value(&payload).map_err(|e| DeskError::BadResponse(e.to_string()))
    }
}
