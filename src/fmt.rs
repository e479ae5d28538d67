//! Money and number formatting shared by tables, exports and the dashboard.

/// Round to two decimals, the precision every derived amount is stored at.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Group an integer with thousands separators: 1234567 -> "1,234,567"
pub fn group_int(value: i64) -> String {
    let negative = value < 0;
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    let mut grouped: String = out.chars().rev().collect();
    if negative {
        grouped.insert(0, '-');
    }
    grouped
}

/// Format a money amount with two decimals and thousands separators.
pub fn money(value: f64, currency_symbol: &str) -> String {
    let rounded = format!("{:.2}", value.abs());
    let parts: Vec<&str> = rounded.split('.').collect();
    let grouped = group_int(parts[0].parse::<i64>().unwrap_or(0));

    if value < 0.0 {
        format!("-{currency_symbol}{grouped}.{}", parts[1])
    } else {
        format!("{currency_symbol}{grouped}.{}", parts[1])
    }
}

/// Render a numeric cell: integers without a fraction, everything else
/// trimmed to two decimals.
pub fn number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        group_int(value as i64)
    } else {
        format!("{:.2}", value)
    }
}

/// Prettify a camelCase metric key: "todaysSaleAmount" -> "Todays Sale Amount"
pub fn title_from_camel(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (i, ch) in key.chars().enumerate() {
        if i == 0 {
            out.extend(ch.to_uppercase());
        } else if ch.is_uppercase() {
            out.push(' ');
            out.push(ch);
        } else {
            out.push(ch);
        }
    }
    out
}
