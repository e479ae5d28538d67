//! Remote Data Gateway: the one HTTP client every feature module goes
//! through. Attaches bearer auth from the session context, scopes every call
//! under the configured base URL, and maps transport and status failures to
//! the crate error taxonomy. No retries; the server is the sole authority.

pub mod multipart;

use std::path::PathBuf;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;
use ureq::Agent;

use crate::config::{ApiSettings, Session};
use crate::error::{DeskError, Result};
use crate::master::EntityKind;
use crate::report::ReportQuery;
use crate::tabular::Row;
use multipart::Multipart;

pub struct Gateway {
    agent: Agent,
    base_url: String,
    session: Session,
}

impl Gateway {
    pub fn new(api: &ApiSettings, session: Session) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(api.timeout_secs)))
            .build()
            .into();

        Gateway {
            agent,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // Token presence and expiry are checked fresh on every request.
    fn bearer(&self) -> Result<String> {
        self.session.require_valid(Utc::now())?;
        Ok(format!("Bearer {}", self.session.token))
    }

    fn http_error(url: &str, err: ureq::Error) -> DeskError {
        match err {
            ureq::Error::StatusCode(status) => DeskError::Api {
                status,
                url: url.to_string(),
            },
            other => DeskError::Transport {
                url: url.to_string(),
                reason: other.to_string(),
            },
        }
    }

    fn get_value(&self, url: &str) -> Result<Value> {
        let auth = self.bearer()?;
        let mut response = self
            .agent
            .get(url)
            .header("Authorization", &auth)
            .call()
            .map_err(|e| Self::http_error(url, e))?;
        response
            .body_mut()
            .read_json::<Value>()
            .map_err(|e| DeskError::BadResponse(e.to_string()))
    }

    fn get_rows(&self, url: &str) -> Result<Vec<Row>> {
        rows_from(self.get_value(url)?)
    }

    fn post_json<T: Serialize + ?Sized>(&self, url: &str, body: &T) -> Result<Value> {
        let auth = self.bearer()?;
        let mut response = self
            .agent
            .post(url)
            .header("Authorization", &auth)
            .send_json(body)
            .map_err(|e| Self::http_error(url, e))?;
        response
            .body_mut()
            .read_json::<Value>()
            .or(Ok(Value::Null))
    }

    // ----- master-data CRUD ------------------------------------------------

    pub fn list_entities(&self, kind: EntityKind) -> Result<Vec<Row>> {
        self.get_rows(&self.url(&format!("/user/{}", kind.path())))
    }

    pub fn create_entity(&self, kind: EntityKind, record: &Value) -> Result<()> {
        self.post_json(&self.url(&format!("/user/{}", kind.path())), record)?;
        Ok(())
    }

    pub fn update_entity(&self, kind: EntityKind, id: &str, record: &Value) -> Result<()> {
        let url = self.url(&format!("/user/{}/{}", kind.path(), id));
        let auth = self.bearer()?;
        self.agent
            .put(&url)
            .header("Authorization", &auth)
            .send_json(record)
            .map_err(|e| Self::http_error(&url, e))?;
        Ok(())
    }

    pub fn delete_entity(&self, kind: EntityKind, id: &str) -> Result<()> {
        let url = self.url(&format!("/user/{}/{}", kind.path(), id));
        let auth = self.bearer()?;
        self.agent
            .delete(&url)
            .header("Authorization", &auth)
            .call()
            .map_err(|e| Self::http_error(&url, e))?;
        Ok(())
    }

    pub fn customers_by_route(&self, route_id: &str) -> Result<Vec<Row>> {
        self.get_rows(&self.url(&format!("/user/customers/byRoute/{route_id}")))
    }

    // ----- sales -----------------------------------------------------------

    pub fn create_sales<T: Serialize>(&self, entry: &T) -> Result<()> {
        self.post_json(&self.url("/user/sales/bulk"), entry)?;
        Ok(())
    }

    pub fn save_sale_details(&self, details: &Value) -> Result<()> {
        self.post_json(&self.url("/user/sales/saveDetails"), details)?;
        Ok(())
    }

    pub fn sale_details(
        &self,
        date: NaiveDate,
        route: &str,
        vehicle: &str,
        driver: &str,
    ) -> Result<Vec<Row>> {
        let url = self.url("/user/sales/saleDetails");
        let auth = self.bearer()?;
        let mut response = self
            .agent
            .get(&url)
            .header("Authorization", &auth)
            .query("date", &date.format("%Y-%m-%d").to_string())
            .query("route", route)
            .query("vehicle", vehicle)
            .query("driver", driver)
            .call()
            .map_err(|e| Self::http_error(&url, e))?;
        let value = response
            .body_mut()
            .read_json::<Value>()
            .map_err(|e| DeskError::BadResponse(e.to_string()))?;
        rows_from(value)
    }

    // ----- purchases -------------------------------------------------------

    /// Multipart submission: the entry JSON as a text part plus one `files`
    /// part per attached DC scan.
    pub fn create_purchase(&self, entry_json: &str, attachments: &[PathBuf]) -> Result<()> {
        let mut body = Multipart::new();
        body.text("purchaseEntry", entry_json);
        for path in attachments {
            body.file("files", path)?;
        }
        let (content_type, bytes) = body.finish();

        let url = self.url("/user/purchases");
        let auth = self.bearer()?;
        self.agent
            .post(&url)
            .header("Authorization", &auth)
            .header("Content-Type", &content_type)
            .send(&bytes[..])
            .map_err(|e| Self::http_error(&url, e))?;
        Ok(())
    }

    pub fn record_purchase_payment(&self, payment: &Value) -> Result<()> {
        self.post_json(&self.url("/user/purchases/payment"), payment)?;
        Ok(())
    }

    pub fn purchase_details(&self, supplier_id: &str, entry_date: NaiveDate) -> Result<Vec<Row>> {
        let url = self.url("/user/purchases/getDetails");
        let auth = self.bearer()?;
        let mut response = self
            .agent
            .get(&url)
            .header("Authorization", &auth)
            .query("supplierId", supplier_id)
            .query("entryDate", &entry_date.format("%Y-%m-%d").to_string())
            .call()
            .map_err(|e| Self::http_error(&url, e))?;
        let value = response
            .body_mut()
            .read_json::<Value>()
            .map_err(|e| DeskError::BadResponse(e.to_string()))?;
        // A single-entry lookup may answer with one object instead of a list.
        match value {
            Value::Object(row) => Ok(vec![row]),
            other => rows_from(other),
        }
    }

    // ----- reports and dashboard -------------------------------------------

    pub fn fetch_report(&self, query: &ReportQuery) -> Result<Vec<Row>> {
        let url = self.url("/reports/fetch");
        let auth = self.bearer()?;
        let mut response = self
            .agent
            .post(&url)
            .header("Authorization", &auth)
            .send_json(query)
            .map_err(|e| Self::http_error(&url, e))?;
        let value = response
            .body_mut()
            .read_json::<Value>()
            .map_err(|e| DeskError::BadResponse(e.to_string()))?;
        rows_from(value)
    }

    pub fn dashboard_data(&self) -> Result<Row> {
        match self.get_value(&self.url("/dashboard/data"))? {
            Value::Object(metrics) => Ok(metrics),
            other => Err(DeskError::BadResponse(format!(
                "expected a metrics object, got {other}"
            ))),
        }
    }
}

/// Server row lists arrive as JSON arrays of objects; null stands for an
/// empty result.
fn rows_from(value: Value) -> Result<Vec<Row>> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(row) => Ok(row),
                other => Err(DeskError::BadResponse(format!(
                    "expected an object row, got {other}"
                ))),
            })
            .collect(),
        Value::Null => Ok(Vec::new()),
        other => Err(DeskError::BadResponse(format!(
            "expected a row array, got {other}"
        ))),
    }
}
