//! Validation utilities for the facility operations console

use std::borrow::Cow;

use rust_decimal::Decimal;
use validator::ValidationError;

use crate::error::{EntryError, SubmitError};
use crate::models::{EntryForm, HeaderRecord};

// ============================================================================
// Line Item Validations
// ============================================================================

/// Check the entry form before a row is staged
pub fn validate_entry(entry: &EntryForm) -> Result<(), EntryError> {
    let mut missing = Vec::new();
    if entry
        .reference
        .as_ref()
        .map_or(true, |r| r.label.trim().is_empty())
    {
        missing.push("Item");
    }
    if entry.unit.as_ref().map_or(true, |u| u.label.trim().is_empty()) {
        missing.push("Unit");
    }
    if entry.quantity.map_or(true, |q| q <= Decimal::ZERO) {
        missing.push("Quantity");
    }
    if !missing.is_empty() {
        return Err(EntryError::MissingFields(missing));
    }
    if entry.rate < Decimal::ZERO {
        return Err(EntryError::NegativeRate);
    }
    Ok(())
}

// ============================================================================
// Header Validations
// ============================================================================

/// Check the header before submission. Reports every missing field at once.
pub fn validate_header(header: &HeaderRecord) -> Result<(), SubmitError> {
    let mut missing = Vec::new();
    if header.origin_id.is_none() {
        missing.push("Origin");
    }
    if header.counterparty_id.is_none() {
        missing.push(counterparty_label(header));
    }
    if header.date.is_none() {
        missing.push("Date");
    }
    if header.line_items.is_empty() {
        missing.push("Line items");
    }
    if !missing.is_empty() {
        return Err(SubmitError::MissingFields(missing));
    }

    for (index, item) in header.line_items.iter().enumerate() {
        if item.quantity <= Decimal::ZERO {
            return Err(SubmitError::InvalidLine {
                line: index + 1,
                reason: "quantity must be greater than zero".to_string(),
            });
        }
        if item.reference_id.is_none() && item.reference_label.trim().is_empty() {
            return Err(SubmitError::InvalidLine {
                line: index + 1,
                reason: "item is missing".to_string(),
            });
        }
    }
    Ok(())
}

fn counterparty_label(header: &HeaderRecord) -> &'static str {
    use crate::models::Category;
    match header.kind.counterparty_category() {
        Category::Supplier => "Supplier",
        Category::Customer => "Customer",
        Category::Employee => "Employee",
        _ => "Counterparty",
    }
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate a phone number: 10 to 13 digits, separators and a leading `+` allowed
pub fn validate_phone(phone: &str) -> Result<(), &'static str> {
    if !phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'))
    {
        return Err("Phone number contains invalid characters");
    }
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    if !(10..=13).contains(&digits) {
        return Err("Phone number must have 10 to 13 digits");
    }
    Ok(())
}

/// Validate a vehicle registration number (e.g. KA-01-AB-1234)
pub fn validate_registration_no(registration: &str) -> Result<(), &'static str> {
    let compact: String = registration
        .chars()
        .filter(|c| !matches!(c, '-' | ' '))
        .collect();
    if compact.len() < 4 || compact.len() > 12 {
        return Err("Registration number must be 4 to 12 characters");
    }
    if !compact.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err("Registration number must be alphanumeric");
    }
    if !compact.chars().any(|c| c.is_ascii_digit()) {
        return Err("Registration number must contain digits");
    }
    Ok(())
}

/// `validator` adapter for [`validate_phone`]
pub fn validate_phone_field(phone: &str) -> Result<(), ValidationError> {
    validate_phone(phone).map_err(|msg| field_error("phone", msg))
}

/// `validator` adapter for [`validate_registration_no`]
pub fn validate_registration_field(registration: &str) -> Result<(), ValidationError> {
    validate_registration_no(registration).map_err(|msg| field_error("registration_no", msg))
}

fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DocDate, DocumentKind, LineItem, SelectOption};
    use crate::types::{LineItemRef, RecordId, TempId};
    use chrono::NaiveDate;

    fn entry() -> EntryForm {
        EntryForm {
            reference: Some(SelectOption::new(5, "Chemical A")),
            unit: Some(SelectOption::new(2, "KG")),
            quantity: Some(Decimal::from(3)),
            rate: Decimal::from(10),
            ..Default::default()
        }
    }

    fn complete_header() -> HeaderRecord {
        let mut header = HeaderRecord::new(DocumentKind::PurchaseOrder);
        header.origin_id = Some(RecordId::Int(1));
        header.counterparty_id = Some(RecordId::Int(7));
        header.date = Some(DocDate::Parsed(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()));
        header.line_items.push(LineItem::new(
            LineItemRef::New(TempId(1)),
            (Some(RecordId::Int(5)), "Chemical A".into()),
            (Some(RecordId::Int(2)), "KG".into()),
            Decimal::from(3),
            Decimal::from(10),
            false,
        ));
        header
    }

    // ========================================================================
    // Line Item Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_entry_valid() {
        assert!(validate_entry(&entry()).is_ok());
    }

    #[test]
    fn test_validate_entry_reports_all_missing_fields() {
        let form = EntryForm::default();
        assert_eq!(
            validate_entry(&form),
            Err(EntryError::MissingFields(vec!["Item", "Unit", "Quantity"]))
        );
    }

    #[test]
    fn test_validate_entry_zero_quantity() {
        let mut form = entry();
        form.quantity = Some(Decimal::ZERO);
        assert_eq!(
            validate_entry(&form),
            Err(EntryError::MissingFields(vec!["Quantity"]))
        );
    }

    #[test]
    fn test_validate_entry_negative_rate() {
        let mut form = entry();
        form.rate = Decimal::from(-1);
        assert_eq!(validate_entry(&form), Err(EntryError::NegativeRate));
    }

    // ========================================================================
    // Header Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_header_complete() {
        assert!(validate_header(&complete_header()).is_ok());
    }

    #[test]
    fn test_validate_header_missing_origin() {
        let mut header = complete_header();
        header.origin_id = None;
        let err = validate_header(&header).unwrap_err();
        assert_eq!(err, SubmitError::MissingFields(vec!["Origin"]));
        assert!(err.to_string().starts_with("Please fill all required fields"));
    }

    #[test]
    fn test_validate_header_empty_document() {
        let header = HeaderRecord::new(DocumentKind::Invoice);
        assert_eq!(
            validate_header(&header),
            Err(SubmitError::MissingFields(vec![
                "Origin",
                "Customer",
                "Date",
                "Line items"
            ]))
        );
    }

    // ========================================================================
    // General Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("9845012345").is_ok());
        assert!(validate_phone("+91 98450-12345").is_ok());
        assert!(validate_phone("(080) 2345 6789").is_ok());
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("98450abc45").is_err());
    }

    #[test]
    fn test_validate_registration_no() {
        assert!(validate_registration_no("KA-01-AB-1234").is_ok());
        assert!(validate_registration_no("MH12DE1433").is_ok());
        assert!(validate_registration_no("AB").is_err());
        assert!(validate_registration_no("ABCDEFG").is_err());
        assert!(validate_registration_no("KA#01").is_err());
    }
}
