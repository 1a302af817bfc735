//! Tolerant field access over loosely shaped JSON

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;

/// Follow a dotted path (`"chemical.name"`) through nested objects
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, key| current.get(key))
}

/// First alias that resolves to a non-null value
pub fn first_present<'a>(value: &'a Value, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .filter_map(|alias| lookup(value, alias))
        .find(|v| !v.is_null())
}

/// Displayable text of a scalar. Empty strings and `"null"` count as absent.
pub fn text_of(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if text.is_empty() || text.eq_ignore_ascii_case("null") {
        None
    } else {
        Some(text)
    }
}

/// First alias carrying usable text
pub fn first_text(value: &Value, aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .filter_map(|alias| lookup(value, alias))
        .find_map(text_of)
}

/// Numbers and numeric strings as decimals
pub fn decimal_of(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .ok()
            .or_else(|| n.as_f64().and_then(|f| Decimal::try_from(f).ok())),
        Value::String(s) => {
            let trimmed = s.trim();
            Decimal::from_str(trimmed)
                .or_else(|_| Decimal::from_scientific(trimmed))
                .ok()
        }
        _ => None,
    }
}

pub fn first_decimal(value: &Value, aliases: &[&str]) -> Option<Decimal> {
    aliases
        .iter()
        .filter_map(|alias| lookup(value, alias))
        .find_map(decimal_of)
}

/// Booleans as sent by various backends: `true`, `1`, `"true"`, `"yes"`
pub fn bool_of(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|i| i != 0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "y" => Some(true),
            "false" | "0" | "no" | "n" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

pub fn first_bool(value: &Value, aliases: &[&str]) -> Option<bool> {
    aliases
        .iter()
        .filter_map(|alias| lookup(value, alias))
        .find_map(bool_of)
}
