//! Submission payloads
//!
//! Every backend module has its own contract for create/update bodies.
//! Each contract is an explicit struct below; some fields are sent under
//! two keys because the backend reads either one.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SubmitError;
use crate::models::{DocumentKind, HeaderRecord, LineItem, SupplierForm, VehicleForm};
use crate::types::RecordId;
use crate::validation::validate_header;

/// Fallback shown when a failure carries no usable message
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// Priced line item (purchase orders, returns, invoices)
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PricedItemInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub chemical: Option<RecordId>,
    pub chemical_id: Option<RecordId>,
    pub chemical_name: String,
    pub uom: Option<RecordId>,
    pub uom_id: Option<RecordId>,
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub is_foc: bool,
}

impl From<&LineItem> for PricedItemInput {
    fn from(item: &LineItem) -> Self {
        Self {
            id: item.id.server_id().cloned(),
            chemical: item.reference_id.clone(),
            chemical_id: item.reference_id.clone(),
            chemical_name: item.reference_label.clone(),
            uom: item.unit_id.clone(),
            uom_id: item.unit_id.clone(),
            quantity: item.quantity,
            rate: item.rate,
            amount: item.amount,
            is_foc: item.is_free_of_charge,
        }
    }
}

/// Unpriced material movement line
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MaterialItemInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub item: Option<RecordId>,
    pub item_id: Option<RecordId>,
    pub item_name: String,
    pub uom: Option<RecordId>,
    pub uom_id: Option<RecordId>,
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,
}

impl From<&LineItem> for MaterialItemInput {
    fn from(item: &LineItem) -> Self {
        Self {
            id: item.id.server_id().cloned(),
            item: item.reference_id.clone(),
            item_id: item.reference_id.clone(),
            item_name: item.reference_label.clone(),
            uom: item.unit_id.clone(),
            uom_id: item.unit_id.clone(),
            quantity: item.quantity,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PurchaseOrderPayload {
    pub company: Option<RecordId>,
    pub supplier: Option<RecordId>,
    pub supplier_id: Option<RecordId>,
    pub order_date: String,
    pub remarks: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub order_items_input: Vec<PricedItemInput>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PurchaseReturnPayload {
    pub company: Option<RecordId>,
    pub supplier: Option<RecordId>,
    pub supplier_id: Option<RecordId>,
    pub return_date: String,
    pub remarks: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub return_items_input: Vec<PricedItemInput>,
}

/// Material request, issue and receipt share one contract apart from the
/// date key, which is flattened in.
#[derive(Debug, Clone, Serialize)]
pub struct MaterialPayload {
    pub from_store: Option<RecordId>,
    pub store: Option<RecordId>,
    pub employee: Option<RecordId>,
    pub employee_id: Option<RecordId>,
    #[serde(flatten)]
    pub date: serde_json::Map<String, Value>,
    pub remarks: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub items_input: Vec<MaterialItemInput>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvoicePayload {
    pub company: Option<RecordId>,
    pub customer: Option<RecordId>,
    pub customer_id: Option<RecordId>,
    pub invoice_date: String,
    pub remarks: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub items_input: Vec<PricedItemInput>,
}

/// Validate a header and build the exact body its module expects
pub fn assemble(header: &HeaderRecord) -> Result<Value, SubmitError> {
    validate_header(header)?;

    let date = header
        .date
        .as_ref()
        .map(|d| d.to_wire())
        .unwrap_or_default();
    let priced = || -> Vec<PricedItemInput> {
        header.line_items.iter().map(PricedItemInput::from).collect()
    };

    let value = match header.kind {
        DocumentKind::PurchaseOrder => serde_json::to_value(PurchaseOrderPayload {
            company: header.origin_id.clone(),
            supplier: header.counterparty_id.clone(),
            supplier_id: header.counterparty_id.clone(),
            order_date: date,
            remarks: header.remarks.clone(),
            status: header.status.clone(),
            total_amount: header.total(),
            order_items_input: priced(),
        })?,
        DocumentKind::PurchaseReturn => serde_json::to_value(PurchaseReturnPayload {
            company: header.origin_id.clone(),
            supplier: header.counterparty_id.clone(),
            supplier_id: header.counterparty_id.clone(),
            return_date: date,
            remarks: header.remarks.clone(),
            status: header.status.clone(),
            total_amount: header.total(),
            return_items_input: priced(),
        })?,
        DocumentKind::MaterialRequest
        | DocumentKind::MaterialIssue
        | DocumentKind::MaterialReceipt => {
            let mut date_field = serde_json::Map::new();
            date_field.insert(header.kind.date_key().to_string(), Value::String(date));
            serde_json::to_value(MaterialPayload {
                from_store: header.origin_id.clone(),
                store: header.origin_id.clone(),
                employee: header.counterparty_id.clone(),
                employee_id: header.counterparty_id.clone(),
                date: date_field,
                remarks: header.remarks.clone(),
                status: header.status.clone(),
                items_input: header.line_items.iter().map(MaterialItemInput::from).collect(),
            })?
        }
        DocumentKind::Invoice => serde_json::to_value(InvoicePayload {
            company: header.origin_id.clone(),
            customer: header.counterparty_id.clone(),
            customer_id: header.counterparty_id.clone(),
            invoice_date: date,
            remarks: header.remarks.clone(),
            status: header.status.clone(),
            total_amount: header.total(),
            items_input: priced(),
        })?,
    };
    Ok(value)
}

// ============================================================================
// Master Data
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct VehiclePayload {
    pub name: String,
    pub vehicle_name: String,
    pub registration_no: String,
    pub vehicle_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_type: Option<String>,
    pub driver: Option<RecordId>,
    pub is_active: bool,
}

impl From<&VehicleForm> for VehiclePayload {
    fn from(form: &VehicleForm) -> Self {
        let registration = form.registration_no.trim().to_ascii_uppercase();
        Self {
            name: form.name.trim().to_string(),
            vehicle_name: form.name.trim().to_string(),
            vehicle_number: registration.clone(),
            registration_no: registration,
            vehicle_type: form.vehicle_type.clone(),
            driver: form.driver_id.clone(),
            is_active: form.is_active,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SupplierPayload {
    pub name: String,
    pub supplier_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gst_number: Option<String>,
    pub is_active: bool,
}

impl From<&SupplierForm> for SupplierPayload {
    fn from(form: &SupplierForm) -> Self {
        let non_blank = |v: &Option<String>| {
            v.as_ref()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        Self {
            name: form.name.trim().to_string(),
            supplier_name: form.name.trim().to_string(),
            contact_person: non_blank(&form.contact_person),
            email: non_blank(&form.email),
            phone: non_blank(&form.phone),
            mobile: non_blank(&form.phone),
            address: non_blank(&form.address),
            gst_number: non_blank(&form.tax_number),
            is_active: form.is_active,
        }
    }
}

// ============================================================================
// Responses
// ============================================================================

/// Outcome flag carried in create/update response bodies
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ApiStatus {
    Success,
    Failed,
    Missing,
}

impl ApiStatus {
    /// Read `status` from a response body. Bodies without one are treated
    /// as successful.
    pub fn of(body: &Value) -> ApiStatus {
        match body.get("status").and_then(Value::as_str) {
            Some(s) if s.eq_ignore_ascii_case("failed") || s.eq_ignore_ascii_case("error") => {
                ApiStatus::Failed
            }
            Some(s) if s.eq_ignore_ascii_case("missing") => ApiStatus::Missing,
            _ => ApiStatus::Success,
        }
    }
}

/// Most specific message in an error body: `message`, then `error` (text or
/// nested `message`), then `detail`, then the transport message, then a
/// generic fallback.
pub fn extract_error_message(body: Option<&Value>, transport_message: Option<&str>) -> String {
    body.and_then(|b| {
        non_blank(b.get("message"))
            .or_else(|| match b.get("error") {
                Some(Value::Object(_)) => {
                    non_blank(b.get("error").and_then(|e| e.get("message")))
                }
                other => non_blank(other),
            })
            .or_else(|| non_blank(b.get("detail")))
    })
    .or_else(|| {
        transport_message
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
    })
    .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string())
}

fn non_blank(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
