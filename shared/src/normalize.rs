//! Dropdown normalization
//!
//! List endpoints answer in several envelopes depending on the module and
//! the backend version. [`ListShape`] names the known envelopes and
//! [`unwrap_list`] tries them in a fixed priority order; everything that
//! does not match yields no rows rather than an error.

use serde_json::Value;

use crate::fields::{first_bool, first_decimal, first_present, first_text, lookup, text_of};
use crate::models::{Category, OptionMeta, SelectOption};
use crate::types::{Page, RecordId};

/// Known list envelopes, highest priority first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListShape {
    /// `{results: [...]}`
    Results,
    /// `{data: {results: [...]}}`
    DataResults,
    /// `{data: {data: {results: [...]}}}`
    NestedDataResults,
    /// `{data: [...]}`
    Data,
    /// `{data: {data: [...]}}`
    NestedData,
    /// `[...]`
    Bare,
}

impl ListShape {
    pub const PRIORITY: [ListShape; 6] = [
        ListShape::Results,
        ListShape::DataResults,
        ListShape::NestedDataResults,
        ListShape::Data,
        ListShape::NestedData,
        ListShape::Bare,
    ];

    /// Path from the response body to the row array
    pub fn path(&self) -> &'static [&'static str] {
        match self {
            ListShape::Results => &["results"],
            ListShape::DataResults => &["data", "results"],
            ListShape::NestedDataResults => &["data", "data", "results"],
            ListShape::Data => &["data"],
            ListShape::NestedData => &["data", "data"],
            ListShape::Bare => &[],
        }
    }

    /// Object holding the rows, where a `count` sibling may live
    fn container<'a>(&self, body: &'a Value) -> Option<&'a Value> {
        match self {
            ListShape::Results | ListShape::DataResults | ListShape::NestedDataResults => {
                let path = self.path();
                walk(body, &path[..path.len() - 1])
            }
            _ => None,
        }
    }
}

fn walk<'a>(body: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(body, |current, key| current.get(*key))
}

/// Locate the row array in a list response
pub fn unwrap_list(body: &Value) -> Option<(ListShape, &[Value])> {
    ListShape::PRIORITY.iter().find_map(|shape| {
        walk(body, shape.path())
            .and_then(Value::as_array)
            .map(|rows| (*shape, rows.as_slice()))
    })
}

/// Rows plus total count for a paginated table
pub fn extract_page(body: &Value) -> Page<Value> {
    match unwrap_list(body) {
        Some((shape, rows)) => {
            let count = shape
                .container(body)
                .and_then(|c| c.get("count").or_else(|| c.get("total")))
                .and_then(Value::as_u64)
                .unwrap_or(rows.len() as u64);
            Page {
                results: rows.to_vec(),
                count,
            }
        }
        None => Page::default(),
    }
}

/// Reduce any list response to dropdown options for a category
pub fn normalize_options(category: Category, body: &Value) -> Vec<SelectOption> {
    let Some((_, rows)) = unwrap_list(body) else {
        return Vec::new();
    };
    rows.iter()
        .filter_map(|row| normalize_row(category, row))
        .collect()
}

fn normalize_row(category: Category, row: &Value) -> Option<SelectOption> {
    if !row.is_object() {
        return None;
    }
    let id = row.get("id").and_then(RecordId::from_value)?;
    let label = option_label(category, row);
    if label.trim().is_empty() || label.trim().eq_ignore_ascii_case("null") {
        return None;
    }

    let option = SelectOption::new(id, label);
    Some(match category {
        Category::Chemical => option.with_meta(chemical_meta(row)),
        _ => option,
    })
}

fn option_label(category: Category, row: &Value) -> String {
    category
        .label_keys()
        .iter()
        .chain(["name", "label"].iter())
        .find_map(|key| lookup(row, key).filter(|v| !v.is_null()))
        .map(|v| text_of(v).unwrap_or_default())
        .unwrap_or_else(|| "-".to_string())
}

fn chemical_meta(row: &Value) -> OptionMeta {
    let uom_value = first_present(row, &["default_uom", "uom", "uom_id", "unit"]);
    let uom = uom_value.and_then(|v| match v {
        Value::Object(_) => v.get("id").and_then(RecordId::from_value),
        other => RecordId::from_value(other),
    });
    OptionMeta {
        uom,
        uom_label: first_text(
            row,
            &["default_uom.name", "uom.name", "uom_name", "unit_name"],
        ),
        rate: first_decimal(row, &["rate", "price", "unit_price"]),
        is_foc: first_bool(row, &["is_foc", "foc"]).unwrap_or(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use serde_json::json;

    fn rows() -> Value {
        json!([
            {"id": 1, "name": "Fipronil 2.5% EC"},
            {"id": 2, "name": "Imidacloprid"}
        ])
    }

    #[test]
    fn test_every_envelope_unwraps() {
        let envelopes = [
            (json!({"results": rows()}), ListShape::Results),
            (json!({"data": {"results": rows()}}), ListShape::DataResults),
            (json!({"data": {"data": {"results": rows()}}}), ListShape::NestedDataResults),
            (json!({"data": rows()}), ListShape::Data),
            (json!({"data": {"data": rows()}}), ListShape::NestedData),
            (rows(), ListShape::Bare),
        ];
        for (body, expected) in envelopes {
            let (shape, found) = unwrap_list(&body).expect("rows");
            assert_eq!(shape, expected);
            assert_eq!(found.len(), 2);
            assert_eq!(normalize_options(Category::Chemical, &body).len(), 2);
        }
    }

    #[test]
    fn test_results_win_over_data() {
        let body = json!({"results": [{"id": 1, "name": "A"}], "data": rows()});
        assert_eq!(normalize_options(Category::Supplier, &body).len(), 1);
    }

    #[test]
    fn test_malformed_input_yields_empty() {
        for body in [
            json!(null),
            json!({}),
            json!("oops"),
            json!({"data": {"results": "not a list"}}),
            json!({"data": 5}),
        ] {
            assert!(normalize_options(Category::Uom, &body).is_empty());
        }
    }

    #[test]
    fn test_label_fallbacks_and_filters() {
        let body = json!([
            {"id": 1, "uom_name": "KG"},
            {"id": 2, "label": "Litre"},
            {"id": 3},
            {"id": 4, "name": "null"},
            {"id": 5, "name": ""},
            {"name": "No id"},
            "stray string",
            {"id": 6, "name": 250}
        ]);
        let options = normalize_options(Category::Uom, &body);
        let labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["KG", "Litre", "-", "250"]);
        assert_eq!(options[0].value, RecordId::Int(1));
    }

    #[test]
    fn test_chemical_meta() {
        let body = json!({"data": {"results": [
            {
                "id": 5,
                "name": "Chemical A",
                "uom": {"id": 2, "name": "KG"},
                "rate": "10.50",
                "is_foc": false
            },
            {"id": 6, "name": "Sample Gel", "uom_id": "3", "price": 0, "is_foc": 1}
        ]}});
        let options = normalize_options(Category::Chemical, &body);
        let meta = options[0].meta.as_ref().unwrap();
        assert_eq!(meta.uom, Some(RecordId::Int(2)));
        assert_eq!(meta.uom_label.as_deref(), Some("KG"));
        assert_eq!(meta.rate, Some(Decimal::new(1050, 2)));
        let meta = options[1].meta.as_ref().unwrap();
        assert_eq!(meta.uom, Some(RecordId::Int(3)));
        assert!(meta.is_foc);
    }

    #[test]
    fn test_extract_page_count() {
        let body = json!({"data": {"results": rows(), "count": 42}});
        let page = extract_page(&body);
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.count, 42);

        let page = extract_page(&rows());
        assert_eq!(page.count, 2);

        assert_eq!(extract_page(&json!({"status": "failed"})), Page::default());
    }
}
