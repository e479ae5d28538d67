//! Declared column schemas. Table structure used to be read off the first
//! response row, which silently lost columns whenever that row happened to be
//! unrepresentative; each report shape and master entity now declares its
//! ordered columns and server responses are checked against the declaration.

use std::collections::HashSet;

use serde_json::Value;

use crate::error::{DeskError, Result};
use crate::tabular::Row;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Number,
}

pub struct Column {
    pub name: &'static str,
    pub kind: ValueKind,
    /// Whether the column participates in the totals row. Running balances
    /// and per-unit rates are shown but never summed.
    pub summable: bool,
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
        summable: true,
    }
}

const fn num_unsummed(name: &'static str) -> Column {
    Column {
        name,
        kind: ValueKind::Number,
        summable: false,
    }
}

pub struct Schema {
    /// Short label used in error messages, e.g. "sale/route report".
    pub context: &'static str,
    pub columns: &'static [Column],
}

impl Schema {
    pub fn headers(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.to_string()).collect()
    }

    /// Columns the totals computation must skip.
    pub fn excluded(&self) -> HashSet<String> {
        self.columns
            .iter()
            .filter(|c| !c.summable)
            .map(|c| c.name.to_string())
            .collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Check every row against the declaration: all declared columns present,
    /// numeric columns holding a number or null. Keys the declaration does
    /// not know are tolerated and simply not displayed.
    pub fn validate(&self, rows: &[Row]) -> Result<()> {
        for (idx, row) in rows.iter().enumerate() {
            for column in self.columns {
                match row.get(column.name) {
                    None => {
                        return Err(DeskError::SchemaViolation {
                            context: self.context.to_string(),
                            row: idx + 1,
                            column: column.name.to_string(),
                            reason: "is missing".to_string(),
                        })
                    }
                    Some(value) => {
                        if column.kind == ValueKind::Number
                            && !matches!(value, Value::Number(_) | Value::Null)
                        {
                            return Err(DeskError::SchemaViolation {
                                context: self.context.to_string(),
                                row: idx + 1,
                                column: column.name.to_string(),
                                reason: format!("holds non-numeric value {value}"),
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

// Sale reports share one row shape; the grouped dimension varies.
pub static SALE_ROUTE: Schema = Schema {
    context: "sale/route report",
    columns: &[
        text("DATE"),
        text("ROUTE"),
        text("CUSTOMER"),
        num("KILOGRAMS"),
        num_unsummed("RATE"),
        num("AMOUNT"),
        num("PAYMENT"),
        num("PENDING"),
        num_unsummed("BALANCE PENDING"),
    ],
};

pub static SALE_CUSTOMER: Schema = Schema {
    context: "sale/customer report",
    columns: &[
        text("DATE"),
        text("CUSTOMER"),
        num("KILOGRAMS"),
        num_unsummed("RATE"),
        num("AMOUNT"),
        num("PAYMENT"),
        num("PENDING"),
        num_unsummed("BALANCE PENDING"),
    ],
};

pub static SALE_VEHICLE: Schema = Schema {
    context: "sale/vehicle report",
    columns: &[
        text("DATE"),
        text("VEHICLE"),
        num("KILOGRAMS"),
        num("AMOUNT"),
        num("PAYMENT"),
        num("PENDING"),
    ],
};

pub static SALE_DRIVER: Schema = Schema {
    context: "sale/driver report",
    columns: &[
        text("DATE"),
        text("DRIVER"),
        num("KILOGRAMS"),
        num("AMOUNT"),
        num("PAYMENT"),
        num("PENDING"),
    ],
};

pub static SALE_CITY: Schema = Schema {
    context: "sale/city report",
    columns: &[
        text("DATE"),
        text("CITY"),
        num("KILOGRAMS"),
        num("AMOUNT"),
        num("PAYMENT"),
        num("PENDING"),
    ],
};

pub static PURCHASE_SUPPLIER: Schema = Schema {
    context: "purchase/supplier report",
    columns: &[
        text("DATE"),
        text("SUPPLIER"),
        text("DC NO"),
        num("NOS"),
        num("KILOGRAMS"),
        num_unsummed("RATE"),
        num("AMOUNT"),
    ],
};

pub static PURCHASE_ALL: Schema = Schema {
    context: "purchase/all report",
    columns: &[
        text("DATE"),
        text("SUPPLIER"),
        text("VEHICLE"),
        text("DRIVER"),
        num("NOS"),
        num("KILOGRAMS"),
        num("AMOUNT"),
        num("EXPENSES"),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sale_row(amount: Value) -> Row {
        let mut row = Row::new();
        for (k, v) in [
            ("DATE", json!("2024-01-05")),
            ("CUSTOMER", json!("Ravi Traders")),
            ("KILOGRAMS", json!(120.5)),
            ("RATE", json!(92)),
            ("AMOUNT", amount),
            ("PAYMENT", json!(5000)),
            ("PENDING", json!(6086)),
            ("BALANCE PENDING", json!(10500)),
        ] {
            row.insert(k.to_string(), v);
        }
        row
    }

    #[test]
    fn conforming_rows_pass() {
        let rows = vec![sale_row(json!(11086)), sale_row(Value::Null)];
        assert!(SALE_CUSTOMER.validate(&rows).is_ok());
    }

    #[test]
    fn missing_column_is_named() {
        let mut row = sale_row(json!(11086));
        row.remove("PENDING");
        let err = SALE_CUSTOMER.validate(&[row]).unwrap_err();
        match err {
            DeskError::SchemaViolation { column, reason, .. } => {
                assert_eq!(column, "PENDING");
                assert_eq!(reason, "is missing");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn mistyped_column_is_named() {
        let rows = vec![sale_row(json!("eleven thousand"))];
        let err = SALE_CUSTOMER.validate(&rows).unwrap_err();
        match err {
            DeskError::SchemaViolation { column, .. } => assert_eq!(column, "AMOUNT"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn extra_server_keys_are_tolerated() {
        let mut row = sale_row(json!(11086));
        row.insert("uploadedBy".to_string(), json!("clerk"));
        assert!(SALE_CUSTOMER.validate(&[row]).is_ok());
    }

    #[test]
    fn rate_and_balance_are_excluded_from_totals() {
        let excluded = SALE_ROUTE.excluded();
        assert!(excluded.contains("RATE"));
        assert!(excluded.contains("BALANCE PENDING"));
        assert!(!excluded.contains("AMOUNT"));
    }
}
