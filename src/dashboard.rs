//! Dashboard metrics: one aggregate endpoint, rendered as key/value tiles.

use serde_json::Value;

use crate::api::Gateway;
use crate::error::Result;
use crate::fmt;
use crate::tabular::{cell_text, Row};

pub fn fetch(gateway: &Gateway) -> Result<Row> {
    gateway.dashboard_data()
}

/// Flatten the metrics object into display tiles, in server order. Monetary
/// metrics carry the currency symbol; counts and weights stay plain.
pub fn tiles(metrics: &Row, currency_symbol: &str) -> Vec<(String, String)> {
    metrics
        .iter()
        .map(|(key, value)| {
            let label = fmt::title_from_camel(key);
            let rendered = match value.as_f64() {
                Some(n) if is_monetary(key) => fmt::money(n, currency_symbol),
                Some(n) => fmt::number(n),
                None => cell_text(Some(value)),
            };
            (label, rendered)
        })
        .collect()
}

fn is_monetary(key: &str) -> bool {
    let key = key.to_lowercase();
    key.contains("amount") || key.contains("payment") || key.contains("pending")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tiles_keep_server_order_and_format_by_kind() {
        let mut metrics = Row::new();
        metrics.insert("todaysSaleAmount".to_string(), json!(125000));
        metrics.insert("todaysPayment".to_string(), json!(90000.5));
        metrics.insert("todaysBirdsSale".to_string(), json!(1450));
        metrics.insert("todaysMortality".to_string(), json!(12));

        let tiles = tiles(&metrics, "₹");
        assert_eq!(
            tiles[0],
            ("Todays Sale Amount".to_string(), "₹125,000.00".to_string())
        );
        assert_eq!(
            tiles[1],
            ("Todays Payment".to_string(), "₹90,000.50".to_string())
        );
        assert_eq!(tiles[2], ("Todays Birds Sale".to_string(), "1,450".to_string()));
        assert_eq!(tiles[3], ("Todays Mortality".to_string(), "12".to_string()));
    }

    #[test]
    fn non_numeric_metrics_render_as_text() {
        let mut metrics = Row::new();
        metrics.insert("lastSyncedAt".to_string(), Value::String("09:45".into()));
        let tiles = tiles(&metrics, "₹");
        assert_eq!(tiles[0].1, "09:45");
    }
}
