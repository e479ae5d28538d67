//! Master-data CRUD: one generic module parameterized by entity kind instead
//! of per-screen duplicates. Each kind declares its column schema; field
//! input is validated against it and server rows are flattened for display.

use clap::ValueEnum;
use serde_json::Value;
use std::fmt;

use crate::error::{DeskError, Result};
use crate::report::schema::{Column, Schema, ValueKind};
use crate::tabular::Row;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EntityKind {
    Customers,
    Routes,
    Drivers,
    Cities,
    Vehicles,
    Suppliers,
}

impl EntityKind {
    /// Path segment under `/user/` on the backend.
    pub fn path(&self) -> &'static str {
        match self {
            EntityKind::Customers => "customers",
            EntityKind::Routes => "routes",
            EntityKind::Drivers => "drivers",
            EntityKind::Cities => "cities",
            EntityKind::Vehicles => "vehicles",
            EntityKind::Suppliers => "suppliers",
        }
    }

    pub fn schema(&self) -> &'static Schema {
        match self {
            EntityKind::Customers => &CUSTOMERS,
            EntityKind::Routes => &ROUTES,
            EntityKind::Drivers => &DRIVERS,
            EntityKind::Cities => &CITIES,
            EntityKind::Vehicles => &VEHICLES,
            EntityKind::Suppliers => &SUPPLIERS,
        }
    }

    /// Field shown when an entity stands in for itself, e.g. in a report
    /// header band or a filter listing.
    pub fn label_field(&self) -> &'static str {
        match self {
            EntityKind::Vehicles => "vehicleNo",
            _ => "name",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

const fn text(name: &'static str) -> Column {
    Column {
        name,
        kind: ValueKind::Text,
        summable: false,
    }
}

const fn num(name: &'static str) -> Column {
    Column {
        name,
        kind: ValueKind::Number,
        summable: false,
    }
}

static CUSTOMERS: Schema = Schema {
    context: "customers",
    columns: &[
        num("id"),
        text("name"),
        text("phoneNo"),
        text("address"),
        text("city"),
        text("route"),
    ],
};

static ROUTES: Schema = Schema {
    context: "routes",
    columns: &[num("id"), text("name"), text("cities")],
};

static DRIVERS: Schema = Schema {
    context: "drivers",
    columns: &[num("id"), text("name"), text("phoneNo"), text("licenseNo")],
};

static CITIES: Schema = Schema {
    context: "cities",
    columns: &[num("id"), text("name"), text("route")],
};

static VEHICLES: Schema = Schema {
    context: "vehicles",
    columns: &[num("id"), text("vehicleNo"), text("type"), num("capacityKg")],
};

static SUPPLIERS: Schema = Schema {
    context: "suppliers",
    columns: &[
        num("id"),
        text("name"),
        text("phoneNo"),
        text("address"),
        text("branch"),
    ],
};

/// Flatten nested reference objects the way the screens always displayed
/// them: an object collapses to its `name`, an array of objects to a
/// comma-joined name list. Scalars pass through untouched. References nested
/// two levels deep (a customer's route lives at `city.route.name`) are
/// hoisted to their own column first so the flattening keeps them.
pub fn normalize_rows(rows: Vec<Row>) -> Vec<Row> {
    rows.into_iter().map(normalize_row).collect()
}

fn normalize_row(row: Row) -> Row {
    let mut hoisted: Vec<(String, Value)> = Vec::new();
    for value in row.values() {
        if let Value::Object(map) = value {
            for (nested_key, nested) in map {
                if row.contains_key(nested_key) {
                    continue;
                }
                if let Value::Object(inner) = nested {
                    if let Some(name) = inner.get("name") {
                        hoisted.push((nested_key.clone(), name.clone()));
                    }
                }
            }
        }
    }

    let mut row: Row = row
        .into_iter()
        .map(|(key, value)| (key, flatten_value(value)))
        .collect();
    for (key, value) in hoisted {
        row.entry(key).or_insert(value);
    }
    row
}

fn flatten_value(value: Value) -> Value {
    match value {
        Value::Object(map) => map
            .get("name")
            .cloned()
            .unwrap_or_else(|| Value::String(summary_of(&map))),
        Value::Array(items) => {
            let names: Vec<String> = items
                .iter()
                .map(|item| match item {
                    Value::Object(map) => match map.get("name") {
                        Some(Value::String(s)) => s.clone(),
                        _ => summary_of(map),
                    },
                    other => crate::tabular::cell_text(Some(other)),
                })
                .collect();
            Value::String(names.join(", "))
        }
        scalar => scalar,
    }
}

fn summary_of(map: &serde_json::Map<String, Value>) -> String {
    map.values()
        .next()
        .map(|v| crate::tabular::cell_text(Some(v)))
        .unwrap_or_default()
}

/// Build a create/update record from repeated `key=value` arguments,
/// validated against the entity schema. `id` is server-assigned and never
/// settable; numeric fields are parsed, everything else stays a string.
pub fn build_record(kind: EntityKind, assignments: &[String]) -> Result<Value> {
    let schema = kind.schema();
    let mut record = Row::new();

    for assignment in assignments {
        let (key, raw) = assignment
            .split_once('=')
            .ok_or_else(|| DeskError::InvalidAssignment(assignment.clone()))?;

        if key == "id" {
            return Err(DeskError::UnknownColumn {
                column: "id".to_string(),
                context: format!("{kind} (server-assigned)"),
            });
        }
        let column = schema
            .column(key)
            .ok_or_else(|| DeskError::UnknownColumn {
                column: key.to_string(),
                context: kind.to_string(),
            })?;

        let value = match column.kind {
            ValueKind::Number => {
                let parsed: f64 = raw.parse().map_err(|_| DeskError::InvalidNumber {
                    field: key.to_string(),
                    value: raw.to_string(),
                })?;
                serde_json::Number::from_f64(parsed)
                    .map(Value::Number)
                    .ok_or_else(|| DeskError::InvalidNumber {
                        field: key.to_string(),
                        value: raw.to_string(),
                    })?
            }
            ValueKind::Text => Value::String(raw.to_string()),
        };
        record.insert(key.to_string(), value);
    }

    if record.is_empty() {
        return Err(DeskError::MissingField("At least one field".to_string()));
    }
    Ok(Value::Object(record))
}

/// Loose variant for endpoints without a declared schema (sale-detail
/// upsert): numbers where they parse, strings otherwise.
pub fn build_loose_record(assignments: &[String]) -> Result<Value> {
    let mut record = Row::new();
    for assignment in assignments {
        let (key, raw) = assignment
            .split_once('=')
            .ok_or_else(|| DeskError::InvalidAssignment(assignment.clone()))?;
        let value = match raw.parse::<f64>() {
            Ok(n) => serde_json::Number::from_f64(n)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(raw.to_string())),
            Err(_) => Value::String(raw.to_string()),
        };
        record.insert(key.to_string(), value);
    }
    if record.is_empty() {
        return Err(DeskError::MissingField("At least one field".to_string()));
    }
    Ok(Value::Object(record))
}
