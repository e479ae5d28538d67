//! Report aggregation engine: typed queries against `POST /reports/fetch`,
//! schema-checked rows, totals, sorting, and the export surfaces.

pub mod schema;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::Serialize;
use std::fmt;

use crate::api::Gateway;
use crate::error::{DeskError, Result};
use crate::master::EntityKind;
use crate::tabular::Row;
use schema::Schema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    Sale,
    Purchase,
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportType::Sale => write!(f, "sale"),
            ReportType::Purchase => write!(f, "purchase"),
        }
    }
}

pub const SALE_SUB_TYPES: &[&str] = &["route", "customer", "vehicle", "driver", "city"];
pub const PURCHASE_SUB_TYPES: &[&str] = &["supplier", "all"];

/// One report request. Construction is the only way to get a value, so a
/// query always carries a subtype that belongs to its report type; picking a
/// new report type means building a new query, which drops the old subtype
/// and sub-filter.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    pub report_type: ReportType,
    pub sub_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_type_id: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl ReportQuery {
    pub fn new(
        report_type: ReportType,
        sub_type: &str,
        sub_type_id: Option<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Self> {
        let allowed = match report_type {
            ReportType::Sale => SALE_SUB_TYPES,
            ReportType::Purchase => PURCHASE_SUB_TYPES,
        };
        if !allowed.contains(&sub_type) {
            return Err(DeskError::InvalidSubType {
                report_type: report_type.to_string(),
                sub: sub_type.to_string(),
            });
        }

        Ok(ReportQuery {
            report_type,
            sub_type: sub_type.to_string(),
            sub_type_id,
            start_date,
            end_date,
        })
    }

    pub fn schema(&self) -> &'static Schema {
        match (self.report_type, self.sub_type.as_str()) {
            (ReportType::Sale, "route") => &schema::SALE_ROUTE,
            (ReportType::Sale, "customer") => &schema::SALE_CUSTOMER,
            (ReportType::Sale, "vehicle") => &schema::SALE_VEHICLE,
            (ReportType::Sale, "driver") => &schema::SALE_DRIVER,
            (ReportType::Sale, _) => &schema::SALE_CITY,
            (ReportType::Purchase, "supplier") => &schema::PURCHASE_SUPPLIER,
            (ReportType::Purchase, _) => &schema::PURCHASE_ALL,
        }
    }

    /// Master-entity list that feeds the optional sub-filter selector.
    pub fn subject_entity(&self) -> Option<EntityKind> {
        subject_entity_for(&self.sub_type)
    }

    /// Column already identified by the header band when a sub-filter is
    /// active; the printable export drops it from the table.
    pub fn header_context_column(&self) -> Option<&'static str> {
        if self.sub_type_id.is_none() {
            return None;
        }
        match self.sub_type.as_str() {
            "route" => Some("ROUTE"),
            "customer" => Some("CUSTOMER"),
            "vehicle" => Some("VEHICLE"),
            "driver" => Some("DRIVER"),
            "city" => Some("CITY"),
            "supplier" => Some("SUPPLIER"),
            _ => None,
        }
    }

    pub fn title(&self) -> String {
        match self.report_type {
            ReportType::Sale => format!("Sale Report ({} wise)", self.sub_type),
            ReportType::Purchase => {
                if self.sub_type == "all" {
                    "Purchase Report (all data)".to_string()
                } else {
                    format!("Purchase Report ({} wise)", self.sub_type)
                }
            }
        }
    }
}

/// Which master list provides filter values for a report dimension.
pub fn subject_entity_for(sub_type: &str) -> Option<EntityKind> {
    match sub_type {
        "route" => Some(EntityKind::Routes),
        "customer" => Some(EntityKind::Customers),
        "vehicle" => Some(EntityKind::Vehicles),
        "driver" => Some(EntityKind::Drivers),
        "city" => Some(EntityKind::Cities),
        "supplier" => Some(EntityKind::Suppliers),
        _ => None,
    }
}

/// Execute the query. Rows come back in server order and are checked against
/// the declared schema before anything downstream touches them.
pub fn run(gateway: &Gateway, query: &ReportQuery) -> Result<Vec<Row>> {
    let rows = gateway.fetch_report(query)?;
    query.schema().validate(&rows)?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn sale_accepts_its_own_sub_types() {
        for sub in SALE_SUB_TYPES {
            assert!(ReportQuery::new(
                ReportType::Sale,
                sub,
                None,
                date("2024-01-01"),
                date("2024-01-31"),
            )
            .is_ok());
        }
    }

    #[test]
    fn sale_rejects_purchase_sub_types() {
        let err = ReportQuery::new(
            ReportType::Sale,
            "supplier",
            None,
            date("2024-01-01"),
            date("2024-01-31"),
        )
        .unwrap_err();
        assert!(matches!(err, DeskError::InvalidSubType { .. }));
    }

    #[test]
    fn purchase_rejects_sale_sub_types() {
        let err = ReportQuery::new(
            ReportType::Purchase,
            "route",
            None,
            date("2024-01-01"),
            date("2024-01-31"),
        )
        .unwrap_err();
        assert!(matches!(err, DeskError::InvalidSubType { .. }));
    }

    #[test]
    fn query_serializes_camel_case() {
        let query = ReportQuery::new(
            ReportType::Sale,
            "route",
            Some("R1".to_string()),
            date("2024-01-01"),
            date("2024-01-31"),
        )
        .unwrap();
        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(json["reportType"], "sale");
        assert_eq!(json["subType"], "route");
        assert_eq!(json["subTypeId"], "R1");
        assert_eq!(json["startDate"], "2024-01-01");
        assert_eq!(json["endDate"], "2024-01-31");
    }

    #[test]
    fn sub_type_id_is_omitted_when_absent() {
        let query = ReportQuery::new(
            ReportType::Purchase,
            "all",
            None,
            date("2024-01-01"),
            date("2024-01-31"),
        )
        .unwrap();
        let json = serde_json::to_value(&query).unwrap();
        assert!(json.get("subTypeId").is_none());
    }

    #[test]
    fn header_context_column_requires_a_sub_filter() {
        let unfiltered = ReportQuery::new(
            ReportType::Sale,
            "route",
            None,
            date("2024-01-01"),
            date("2024-01-31"),
        )
        .unwrap();
        assert_eq!(unfiltered.header_context_column(), None);

        let filtered = ReportQuery::new(
            ReportType::Sale,
            "route",
            Some("R1".to_string()),
            date("2024-01-01"),
            date("2024-01-31"),
        )
        .unwrap();
        assert_eq!(filtered.header_context_column(), Some("ROUTE"));
    }

    #[test]
    fn subject_entities_match_dimensions() {
        assert_eq!(subject_entity_for("route"), Some(EntityKind::Routes));
        assert_eq!(subject_entity_for("supplier"), Some(EntityKind::Suppliers));
        assert_eq!(subject_entity_for("all"), None);
    }
}
