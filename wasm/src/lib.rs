//! WebAssembly module for the Facility Ops Console
//!
//! Exposes the line-item form logic to the browser:
//! - Dropdown normalization of list responses
//! - Detail hydration and payload assembly
//! - A staged line-item list the form components drive
//!
//! Everything crosses the boundary as JSON strings; failures come back as
//! `JsValue` strings holding the user-facing message.

use std::collections::HashMap;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;

use shared::{
    assemble, compute_amount, extract_error_message, hydrate, normalize_options, parse_doc_date,
    Category, DocumentKind, Dropdowns, EntryForm, FormMode, HeaderRecord, LineItem, LineItemRef,
    SelectOption, StagedList,
};

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::debug_1(&JsValue::from_str("facility-ops-wasm loaded"));
}

fn parse_json<T: DeserializeOwned>(what: &str, json: &str) -> Result<T, JsValue> {
    serde_json::from_str(json).map_err(|e| JsValue::from_str(&format!("Invalid {what} JSON: {e}")))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Category or document kind names as used in JS (`"chemical"`, `"purchase_order"`)
fn parse_name<T: DeserializeOwned>(what: &str, name: &str) -> Result<T, JsValue> {
    serde_json::from_value(Value::String(name.to_string()))
        .map_err(|_| JsValue::from_str(&format!("Unknown {what}: {name}")))
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

fn from_f64(value: f64) -> Decimal {
    Decimal::try_from(value).unwrap_or(Decimal::ZERO)
}

fn dropdowns_from_json(json: &str) -> Result<Dropdowns, JsValue> {
    let lists: HashMap<Category, Vec<SelectOption>> = parse_json("dropdowns", json)?;
    let mut dropdowns = Dropdowns::new();
    for (category, options) in lists {
        dropdowns.insert(category, options);
    }
    Ok(dropdowns)
}

/// Turn a list response in any envelope into `[{id, label, value, meta}]`.
/// Unparseable text yields an empty list.
#[wasm_bindgen]
pub fn normalize_options_json(category: &str, body_json: &str) -> Result<String, JsValue> {
    let category: Category = parse_name("category", category)?;
    let body: Value = serde_json::from_str(body_json).unwrap_or(Value::Null);
    to_json(&normalize_options(category, &body))
}

/// Amount for a quantity at a rate, rounded to cents
#[wasm_bindgen]
pub fn compute_line_amount(quantity: f64, rate: f64) -> f64 {
    to_f64(compute_amount(from_f64(quantity), from_f64(rate)))
}

/// Build the editable header from a detail response.
/// `dropdowns_json` maps category names to their normalized options.
#[wasm_bindgen]
pub fn hydrate_document(
    kind: &str,
    body_json: &str,
    dropdowns_json: &str,
) -> Result<String, JsValue> {
    let kind: DocumentKind = parse_name("document kind", kind)?;
    let body: Value = parse_json("detail", body_json)?;
    let dropdowns = dropdowns_from_json(dropdowns_json)?;
    to_json(&hydrate(kind, &body, &dropdowns))
}

/// Validate a header and build its request body
#[wasm_bindgen]
pub fn assemble_payload(header_json: &str) -> Result<String, JsValue> {
    let header: HeaderRecord = parse_json("header", header_json)?;
    let body = assemble(&header).map_err(|e| JsValue::from_str(&e.to_string()))?;
    to_json(&body)
}

/// Normalize a date for the date picker; unrecognized text is returned as is
#[wasm_bindgen]
pub fn parse_date(raw: &str) -> Option<String> {
    parse_doc_date(raw).map(|date| date.to_wire())
}

/// Today's date in the browser's local time, `YYYY-MM-DD`
#[wasm_bindgen]
pub fn today_iso() -> String {
    let now = js_sys::Date::new_0();
    format!(
        "{:04}-{:02}-{:02}",
        now.get_full_year(),
        now.get_month() + 1,
        now.get_date()
    )
}

/// Message for an error toast from a response body and transport message
#[wasm_bindgen]
pub fn error_message(body_json: Option<String>, transport_message: Option<String>) -> String {
    let body = body_json.and_then(|json| serde_json::from_str::<Value>(&json).ok());
    extract_error_message(body.as_ref(), transport_message.as_deref())
}

/// Staged line items behind a document form
#[wasm_bindgen]
pub struct StagedListHandle {
    inner: StagedList,
}

#[wasm_bindgen]
impl StagedListHandle {
    #[wasm_bindgen(constructor)]
    pub fn new(edit_mode: bool) -> StagedListHandle {
        let mode = if edit_mode { FormMode::Edit } else { FormMode::Create };
        StagedListHandle {
            inner: StagedList::new(mode),
        }
    }

    /// Start from hydrated rows
    pub fn from_rows(edit_mode: bool, rows_json: &str) -> Result<StagedListHandle, JsValue> {
        let rows: Vec<LineItem> = parse_json("rows", rows_json)?;
        let mode = if edit_mode { FormMode::Edit } else { FormMode::Create };
        Ok(StagedListHandle {
            inner: StagedList::with_rows(mode, rows),
        })
    }

    pub fn select_reference(&mut self, option_json: &str, units_json: &str) -> Result<(), JsValue> {
        let option: SelectOption = parse_json("option", option_json)?;
        let units: Vec<SelectOption> = parse_json("units", units_json)?;
        self.inner.select_reference(option, &units);
        Ok(())
    }

    pub fn entry_json(&self) -> Result<String, JsValue> {
        to_json(&self.inner.entry)
    }

    pub fn set_entry_json(&mut self, entry_json: &str) -> Result<(), JsValue> {
        let entry: EntryForm = parse_json("entry", entry_json)?;
        self.inner.entry = entry;
        Ok(())
    }

    /// Stage the entry form; returns `{outcome, id}`
    pub fn add_or_update(&mut self) -> Result<String, JsValue> {
        let outcome = self
            .inner
            .add_or_update()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        to_json(&outcome)
    }

    pub fn begin_edit(&mut self, id_json: &str) -> Result<(), JsValue> {
        let id: LineItemRef = parse_json("line id", id_json)?;
        self.inner
            .begin_edit(&id)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn cancel_edit(&mut self) {
        self.inner.cancel_edit();
    }

    pub fn remove(&mut self, id_json: &str) -> Result<bool, JsValue> {
        let id: LineItemRef = parse_json("line id", id_json)?;
        Ok(self.inner.remove(&id).is_some())
    }

    pub fn set_free_of_charge(&mut self, id_json: &str, free: bool) -> Result<(), JsValue> {
        let id: LineItemRef = parse_json("line id", id_json)?;
        self.inner
            .set_free_of_charge(&id, free)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn set_quantity(&mut self, id_json: &str, quantity: f64) -> Result<(), JsValue> {
        let id: LineItemRef = parse_json("line id", id_json)?;
        self.inner
            .set_quantity(&id, from_f64(quantity))
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn set_rate(&mut self, id_json: &str, rate: f64) -> Result<(), JsValue> {
        let id: LineItemRef = parse_json("line id", id_json)?;
        self.inner
            .set_rate(&id, from_f64(rate))
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn rows_json(&self) -> Result<String, JsValue> {
        to_json(&self.inner.rows())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn total(&self) -> f64 {
        to_f64(self.inner.total())
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_compute_line_amount() {
        assert!((compute_line_amount(3.0, 10.0) - 30.0).abs() < 1e-9);
        assert!((compute_line_amount(3.0, 0.335) - 1.01).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_options_json() {
        let body = json!({"data": {"data": {"results": [{"id": 5, "uom_name": "KG"}]}}});
        let options = normalize_options_json("uom", &body.to_string()).unwrap();
        let options: Value = serde_json::from_str(&options).unwrap();
        assert_eq!(options[0]["label"], json!("KG"));

        let empty = normalize_options_json("uom", "not json").unwrap();
        assert_eq!(empty, "[]");
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-03-15T10:00:00Z").as_deref(), Some("2024-03-15"));
        assert_eq!(parse_date("15/03/2024").as_deref(), Some("2024-03-15"));
        assert_eq!(parse_date("   "), None);
    }

    #[test]
    fn test_error_message_prefers_body() {
        let body = json!({"error": {"message": "Store is closed"}}).to_string();
        assert_eq!(error_message(Some(body), Some("HTTP 400".into())), "Store is closed");
        assert_eq!(error_message(None, Some("HTTP 502".into())), "HTTP 502");
    }

    #[test]
    fn test_staged_list_handle_flow() {
        let mut list = StagedListHandle::new(false);
        let chemical = json!({"id": 5, "label": "Chemical A", "value": 5,
            "meta": {"uom": 2, "rate": 10.0, "is_foc": false}});
        let units = json!([{"id": 2, "label": "KG", "value": 2}]);
        list.select_reference(&chemical.to_string(), &units.to_string())
            .unwrap();

        let mut entry: Value = serde_json::from_str(&list.entry_json().unwrap()).unwrap();
        entry["quantity"] = json!(3.0);
        list.set_entry_json(&entry.to_string()).unwrap();

        let outcome: Value = serde_json::from_str(&list.add_or_update().unwrap()).unwrap();
        assert_eq!(outcome["outcome"], json!("appended"));
        assert!((list.total() - 30.0).abs() < 1e-9);

        let id = outcome["id"].to_string();
        list.set_free_of_charge(&id, true).unwrap();
        assert_eq!(list.total(), 0.0);
        list.set_free_of_charge(&id, false).unwrap();
        assert!((list.total() - 30.0).abs() < 1e-9);

        assert!(list.remove(&id).unwrap());
        assert!(list.is_empty());
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn test_today_iso_shape() {
        let today = today_iso();
        assert_eq!(today.len(), 10);
        assert_eq!(&today[4..5], "-");
    }
}
