//! Common types used across the console

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Server-side identifier. Backends hand out both integer and string keys.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl RecordId {
    /// Read an identifier out of a loosely typed JSON value.
    ///
    /// Numeric strings collapse to `Int` so that `"5"` and `5` compare equal.
    /// Empty strings, `"null"`, booleans, objects and arrays yield `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(RecordId::Int(i))
                } else {
                    n.as_f64()
                        .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                        .map(|f| RecordId::Int(f as i64))
                }
            }
            Value::String(s) => Self::parse(s),
            _ => None,
        }
    }

    /// Parse an identifier from text, collapsing numeric strings to `Int`.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
            return None;
        }
        Some(match trimmed.parse::<i64>() {
            Ok(i) => RecordId::Int(i),
            Err(_) => RecordId::Text(trimmed.to_string()),
        })
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, RecordId::Int(_))
    }

    pub fn to_value(&self) -> Value {
        match self {
            RecordId::Int(i) => Value::from(*i),
            RecordId::Text(s) => Value::from(s.as_str()),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(i) => write!(f, "{}", i),
            RecordId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        RecordId::Int(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        RecordId::parse(value).unwrap_or_else(|| RecordId::Text(value.to_string()))
    }
}

/// Client-generated id for a staged row that has not been persisted yet
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct TempId(pub u64);

/// Identity of a staged line item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LineItemRef {
    /// Staged in this session, never sent to the server
    New(TempId),
    /// Loaded from an existing record
    Persisted(RecordId),
}

impl LineItemRef {
    /// The id to put on the wire, if any. Temporary ids are never sent.
    pub fn server_id(&self) -> Option<&RecordId> {
        match self {
            LineItemRef::New(_) => None,
            LineItemRef::Persisted(id) => Some(id),
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, LineItemRef::New(_))
    }
}

/// Query parameters accepted by every list endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListQuery {
    pub page: u32,
    pub page_size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Extra filter fields, sent verbatim as query parameters
    #[serde(default, flatten)]
    pub filters: BTreeMap<String, String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 20,
            search: None,
            filters: BTreeMap::new(),
        }
    }
}

impl ListQuery {
    pub fn with_page_size(page_size: u32) -> Self {
        Self {
            page_size,
            ..Self::default()
        }
    }

    /// Query string pairs in a stable order
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("page_size".to_string(), self.page_size.to_string()),
        ];
        if let Some(search) = self.search.as_deref().filter(|s| !s.trim().is_empty()) {
            pairs.push(("search".to_string(), search.trim().to_string()));
        }
        pairs.extend(
            self.filters
                .iter()
                .filter(|(_, v)| !v.is_empty())
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        pairs
    }
}

/// One page of list results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub results: Vec<T>,
    pub count: u64,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            results: Vec::new(),
            count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_id_from_value() {
        assert_eq!(RecordId::from_value(&json!(5)), Some(RecordId::Int(5)));
        assert_eq!(RecordId::from_value(&json!("5")), Some(RecordId::Int(5)));
        assert_eq!(RecordId::from_value(&json!(5.0)), Some(RecordId::Int(5)));
        assert_eq!(
            RecordId::from_value(&json!("PO-7")),
            Some(RecordId::Text("PO-7".into()))
        );
        assert_eq!(RecordId::from_value(&json!("")), None);
        assert_eq!(RecordId::from_value(&json!("null")), None);
        assert_eq!(RecordId::from_value(&json!(null)), None);
        assert_eq!(RecordId::from_value(&json!({"id": 1})), None);
    }

    #[test]
    fn test_temp_ids_are_not_sent() {
        assert_eq!(LineItemRef::New(TempId(3)).server_id(), None);
        assert_eq!(
            LineItemRef::Persisted(RecordId::Int(9)).server_id(),
            Some(&RecordId::Int(9))
        );
    }

    #[test]
    fn test_list_query_pairs() {
        let mut query = ListQuery::default();
        query.search = Some("  fipronil ".into());
        query.filters.insert("status".into(), "approved".into());
        query.filters.insert("supplier".into(), String::new());

        let pairs = query.to_pairs();
        assert_eq!(
            pairs,
            vec![
                ("page".to_string(), "1".to_string()),
                ("page_size".to_string(), "20".to_string()),
                ("search".to_string(), "fipronil".to_string()),
                ("status".to_string(), "approved".to_string()),
            ]
        );
    }
}
