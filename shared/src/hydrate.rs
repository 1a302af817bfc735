//! Detail hydration
//!
//! Detail endpoints name the same attribute differently from module to
//! module (`item_name`, `chemical_name`, `chemical.name`, ...). Each logical
//! attribute has an ordered alias list and the first defined value wins.
//! Missing ids or labels are back-filled from the loaded dropdowns.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::fields::{first_bool, first_decimal, first_present, first_text, text_of};
use crate::models::{Category, DocDate, DocumentKind, Dropdowns, HeaderRecord, LineItem};
use crate::types::{LineItemRef, RecordId, TempId};

const ORIGIN_ALIASES: &[&str] = &[
    "company",
    "company_id",
    "from_store",
    "store",
    "store_id",
    "origin",
];
const COUNTERPARTY_ALIASES: &[&str] = &[
    "supplier",
    "supplier_id",
    "customer",
    "customer_id",
    "employee",
    "employee_id",
    "requested_by",
];
const ITEMS_ALIASES: &[&str] = &[
    "items",
    "order_items",
    "return_items",
    "invoice_items",
    "line_items",
];

const REFERENCE_LABELS: &[&str] = &[
    "item_name",
    "chemical_name",
    "chemical.name",
    "chemical.chemical_name",
    "item.name",
    "product_name",
];
const REFERENCE_IDS: &[&str] = &["chemical_id", "item_id", "product_id", "chemical", "item"];
const UNIT_LABELS: &[&str] = &["uom_name", "unit_name", "uom.name", "unit.name"];
const UNIT_IDS: &[&str] = &["uom_id", "unit_id", "uom", "unit"];
const QUANTITY: &[&str] = &[
    "quantity",
    "qty",
    "requested_quantity",
    "issued_quantity",
    "received_quantity",
];
const RATE: &[&str] = &["rate", "price", "unit_price"];
const PREVIOUS_RATE: &[&str] = &["previous_rate", "original_rate"];
const FOC: &[&str] = &["is_foc", "foc", "free_of_charge"];

/// Parse a date the way the forms accept it: ISO date, ISO datetime,
/// `DD/MM/YYYY`, and finally the raw text. Blank input gives `None`.
pub fn parse_doc_date(raw: &str) -> Option<DocDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(DocDate::Parsed(date));
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(DocDate::Parsed(datetime.date_naive()));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(DocDate::Parsed(datetime.date()));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%d/%m/%Y") {
        return Some(DocDate::Parsed(date));
    }
    Some(DocDate::Raw(trimmed.to_string()))
}

/// Build an editable header from a detail response. Never fails: anything
/// unrecognised is left empty.
pub fn hydrate(kind: DocumentKind, body: &Value, dropdowns: &Dropdowns) -> HeaderRecord {
    let record = unwrap_detail(body);
    let mut header = HeaderRecord::new(kind);

    header.id = record.get("id").and_then(RecordId::from_value);
    let origin = kind.origin_category();
    let counterparty = kind.counterparty_category();
    header.origin_id = resolve_party(
        record,
        &party_aliases(origin, ORIGIN_ALIASES),
        origin,
        dropdowns,
    );
    header.counterparty_id = resolve_party(
        record,
        &party_aliases(counterparty, COUNTERPARTY_ALIASES),
        counterparty,
        dropdowns,
    );
    header.date = first_text(record, &[kind.date_key(), "date", "created_at"])
        .and_then(|raw| parse_doc_date(&raw));
    header.remarks = first_text(record, &["remarks", "notes", "description"]).unwrap_or_default();
    header.status = first_text(record, &["status"]);

    let items = std::iter::once(kind.items_read_key())
        .chain(ITEMS_ALIASES.iter().copied())
        .chain(std::iter::once(kind.items_input_key()))
        .find_map(|key| record.get(key).and_then(Value::as_array));

    if let Some(items) = items {
        header.line_items = items
            .iter()
            .filter(|item| item.is_object())
            .enumerate()
            .map(|(index, item)| hydrate_item(item, index, dropdowns))
            .collect();
    }
    header
}

/// Map one nested item onto the canonical row shape
pub fn hydrate_item(item: &Value, index: usize, dropdowns: &Dropdowns) -> LineItem {
    let id = match item.get("id").and_then(RecordId::from_value) {
        Some(id) => LineItemRef::Persisted(id),
        None => LineItemRef::New(TempId(index as u64 + 1)),
    };

    let (reference_id, reference_label) =
        resolve_reference(item, REFERENCE_IDS, REFERENCE_LABELS, Category::Chemical, dropdowns);
    let (mut unit_id, mut unit_label) =
        resolve_reference(item, UNIT_IDS, UNIT_LABELS, Category::Uom, dropdowns);

    // Fall back to the chemical's default unit
    if unit_id.is_none() && unit_label.is_none() {
        let meta = reference_id
            .as_ref()
            .and_then(|id| dropdowns.find_by_id(Category::Chemical, id))
            .and_then(|option| option.meta.as_ref());
        if let Some(meta) = meta {
            unit_id = meta.uom.clone();
            unit_label = unit_id
                .as_ref()
                .and_then(|id| dropdowns.find_by_id(Category::Uom, id))
                .map(|o| o.label.clone())
                .or_else(|| meta.uom_label.clone());
        }
    }

    let quantity = first_decimal(item, QUANTITY).unwrap_or_default();
    let is_foc = first_bool(item, FOC).unwrap_or(false);
    let raw_rate = first_decimal(item, RATE).unwrap_or_default();
    let rate = if is_foc {
        first_decimal(item, PREVIOUS_RATE)
            .or_else(|| Some(raw_rate).filter(|r| !r.is_zero()))
            .or_else(|| {
                reference_id
                    .as_ref()
                    .and_then(|id| dropdowns.find_by_id(Category::Chemical, id))
                    .and_then(|o| o.meta.as_ref())
                    .and_then(|m| m.rate)
            })
            .unwrap_or(Decimal::ZERO)
    } else {
        raw_rate
    };

    LineItem::new(
        id,
        (reference_id, reference_label.unwrap_or_else(|| "-".to_string())),
        (unit_id, unit_label.unwrap_or_default()),
        quantity,
        rate,
        is_foc,
    )
}

/// Detail bodies arrive bare or wrapped in one or two `data` objects
fn unwrap_detail(body: &Value) -> &Value {
    let mut current = body;
    for _ in 0..2 {
        match current.get("data") {
            Some(inner) if inner.is_object() => current = inner,
            _ => break,
        }
    }
    current
}

/// Header references may be an id, an `{id, name}` object or a bare name
/// Keys a header party is read from: the category's own names, then the
/// remaining generic aliases
fn party_aliases(category: Category, generic: &[&'static str]) -> Vec<&'static str> {
    let own: &[&'static str] = match category {
        Category::Company => &["company", "company_id"],
        Category::Store => &["from_store", "store", "store_id"],
        Category::Supplier => &["supplier", "supplier_id"],
        Category::Customer => &["customer", "customer_id"],
        Category::Employee => &["employee", "employee_id", "requested_by"],
        Category::Chemical | Category::Uom => &[],
    };
    own.iter()
        .chain(generic.iter().filter(|key| !own.contains(key)))
        .copied()
        .collect()
}

fn resolve_party(
    record: &Value,
    aliases: &[&str],
    category: Category,
    dropdowns: &Dropdowns,
) -> Option<RecordId> {
    let value = first_present(record, aliases)?;
    if value.is_object() {
        return value.get("id").and_then(RecordId::from_value);
    }
    let id = RecordId::from_value(value)?;
    if id.is_numeric() || dropdowns.find_by_id(category, &id).is_some() {
        return Some(id);
    }
    dropdowns
        .find_by_label(category, &id.to_string())
        .map(|o| o.id.clone())
        .or(Some(id))
}

/// Resolve an `(id, label)` pair, filling whichever half is missing from
/// the dropdowns. A non-numeric string that is not a known id is a label.
fn resolve_reference(
    item: &Value,
    id_aliases: &[&str],
    label_aliases: &[&str],
    category: Category,
    dropdowns: &Dropdowns,
) -> (Option<RecordId>, Option<String>) {
    let mut label = first_text(item, label_aliases);
    let mut id = None;

    if let Some(value) = first_present(item, id_aliases) {
        match value {
            Value::Object(_) => {
                id = value.get("id").and_then(RecordId::from_value);
                if label.is_none() {
                    label = first_text(value, &["name", "label"]);
                }
            }
            other => match RecordId::from_value(other) {
                Some(candidate)
                    if candidate.is_numeric()
                        || dropdowns.find_by_id(category, &candidate).is_some() =>
                {
                    id = Some(candidate);
                }
                _ => {
                    if label.is_none() {
                        label = text_of(other);
                    }
                }
            },
        }
    }

    match (&id, &label) {
        (Some(known), None) => {
            label = dropdowns.find_by_id(category, known).map(|o| o.label.clone());
        }
        (None, Some(name)) => {
            id = dropdowns.find_by_label(category, name).map(|o| o.id.clone());
        }
        _ => {}
    }
    (id, label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OptionMeta, SelectOption};
    use serde_json::json;

    fn dropdowns() -> Dropdowns {
        let mut dropdowns = Dropdowns::new();
        dropdowns.insert(
            Category::Chemical,
            vec![
                SelectOption::new(5, "Chemical A").with_meta(OptionMeta {
                    uom: Some(RecordId::Int(2)),
                    uom_label: Some("KG".into()),
                    rate: Some(Decimal::from(10)),
                    is_foc: false,
                }),
                SelectOption::new(6, "Termite Gel"),
            ],
        );
        dropdowns.insert(
            Category::Uom,
            vec![SelectOption::new(2, "KG"), SelectOption::new(3, "Litre")],
        );
        dropdowns.insert(Category::Supplier, vec![SelectOption::new(7, "Agro Chem Traders")]);
        dropdowns.insert(Category::Company, vec![SelectOption::new(1, "North Branch")]);
        dropdowns
    }

    #[test]
    fn test_parse_doc_date_formats() {
        let expected = DocDate::Parsed(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        assert_eq!(parse_doc_date("2024-03-09"), Some(expected.clone()));
        assert_eq!(parse_doc_date("2024-03-09T10:15:00Z"), Some(expected.clone()));
        assert_eq!(parse_doc_date("2024-03-09T10:15:00.123"), Some(expected.clone()));
        assert_eq!(parse_doc_date("09/03/2024"), Some(expected));
        assert_eq!(
            parse_doc_date("sometime in March"),
            Some(DocDate::Raw("sometime in March".into()))
        );
        assert_eq!(parse_doc_date("  "), None);
    }

    #[test]
    fn test_hydrate_purchase_order() {
        let body = json!({
            "status": "success",
            "data": {
                "id": 31,
                "company": {"id": 1, "name": "North Branch"},
                "supplier_id": 7,
                "order_date": "12/01/2024",
                "remarks": "Urgent",
                "status": "pending",
                "order_items": [
                    {"id": 100, "chemical": 5, "uom": 2, "quantity": "3", "rate": 10},
                    {
                        "id": 101,
                        "chemical": {"id": 6, "name": "Termite Gel"},
                        "uom_name": "Litre",
                        "qty": 2,
                        "price": "4.5"
                    }
                ]
            }
        });
        let header = hydrate(DocumentKind::PurchaseOrder, &body, &dropdowns());

        assert_eq!(header.id, Some(RecordId::Int(31)));
        assert_eq!(header.origin_id, Some(RecordId::Int(1)));
        assert_eq!(header.counterparty_id, Some(RecordId::Int(7)));
        assert_eq!(header.date.as_ref().map(DocDate::to_wire).as_deref(), Some("2024-01-12"));
        assert_eq!(header.remarks, "Urgent");
        assert_eq!(header.status.as_deref(), Some("pending"));
        assert_eq!(header.line_items.len(), 2);

        let first = &header.line_items[0];
        assert_eq!(first.id, LineItemRef::Persisted(RecordId::Int(100)));
        assert_eq!(first.reference_label, "Chemical A");
        assert_eq!(first.unit_label, "KG");
        assert_eq!(first.amount, Decimal::from(30));

        let second = &header.line_items[1];
        assert_eq!(second.reference_id, Some(RecordId::Int(6)));
        assert_eq!(second.reference_label, "Termite Gel");
        assert_eq!(second.unit_id, Some(RecordId::Int(3)));
        assert_eq!(second.amount, Decimal::from(9));
    }

    #[test]
    fn test_label_resolved_from_reference_id() {
        let item = json!({"chemical_id": "5", "uom_id": 2, "quantity": 1});
        let row = hydrate_item(&item, 0, &dropdowns());
        assert_eq!(row.reference_label, "Chemical A");
        assert_eq!(row.id, LineItemRef::New(TempId(1)));
    }

    #[test]
    fn test_unit_back_filled_from_chemical_default() {
        let item = json!({"chemical_id": 5, "quantity": 4, "rate": 2});
        let row = hydrate_item(&item, 0, &dropdowns());
        assert_eq!(row.unit_id, Some(RecordId::Int(2)));
        assert_eq!(row.unit_label, "KG");
    }

    #[test]
    fn test_raw_string_reference_becomes_label() {
        let item = json!({"chemical": "Unlisted Bait", "uom": "Box", "quantity": 1});
        let row = hydrate_item(&item, 2, &dropdowns());
        assert_eq!(row.reference_id, None);
        assert_eq!(row.reference_label, "Unlisted Bait");
        assert_eq!(row.unit_id, None);
        assert_eq!(row.unit_label, "Box");
    }

    #[test]
    fn test_label_without_id_is_resolved() {
        let item = json!({"item_name": "termite gel", "unit_name": "litre", "quantity": 1});
        let row = hydrate_item(&item, 0, &dropdowns());
        assert_eq!(row.reference_id, Some(RecordId::Int(6)));
        assert_eq!(row.unit_id, Some(RecordId::Int(3)));
    }

    #[test]
    fn test_foc_item_remembers_rate() {
        let item = json!({
            "id": 9,
            "chemical_id": 5,
            "uom_id": 2,
            "quantity": 2,
            "rate": 0,
            "is_foc": true
        });
        let row = hydrate_item(&item, 0, &dropdowns());
        assert!(row.is_free_of_charge);
        assert_eq!(row.rate, Decimal::ZERO);
        assert_eq!(row.previous_rate, Decimal::from(10));
        assert_eq!(row.amount, Decimal::ZERO);
    }

    #[test]
    fn test_server_amount_is_recomputed() {
        let item =
            json!({"chemical_id": 5, "uom_id": 2, "quantity": 3, "rate": 10, "amount": 999});
        assert_eq!(hydrate_item(&item, 0, &dropdowns()).amount, Decimal::from(30));
    }

    #[test]
    fn test_garbage_detail_gives_empty_header() {
        for body in [json!(null), json!("error"), json!({"data": []})] {
            let header = hydrate(DocumentKind::Invoice, &body, &dropdowns());
            assert_eq!(header, HeaderRecord::new(DocumentKind::Invoice));
        }
    }

    #[test]
    fn test_party_given_by_name() {
        let body =
            json!({"supplier": "agro chem traders", "company": "North Branch", "items": []});
        let header = hydrate(DocumentKind::PurchaseReturn, &body, &dropdowns());
        assert_eq!(header.counterparty_id, Some(RecordId::Int(7)));
        assert_eq!(header.origin_id, Some(RecordId::Int(1)));
    }

    #[test]
    fn test_material_parties_prefer_store_and_employee() {
        let body = json!({
            "id": 12,
            "company": 1,
            "from_store": 4,
            "supplier": 2,
            "employee": 9,
            "issue_date": "2024-02-01",
            "items": []
        });
        let header = hydrate(DocumentKind::MaterialIssue, &body, &dropdowns());
        assert_eq!(header.origin_id, Some(RecordId::Int(4)));
        assert_eq!(header.counterparty_id, Some(RecordId::Int(9)));
    }

    #[test]
    fn test_invoice_prefers_customer() {
        let body = json!({"company": 1, "supplier": 7, "customer": 3, "items": []});
        let header = hydrate(DocumentKind::Invoice, &body, &dropdowns());
        assert_eq!(header.origin_id, Some(RecordId::Int(1)));
        assert_eq!(header.counterparty_id, Some(RecordId::Int(3)));
    }

    #[test]
    fn test_party_aliases_order() {
        let store = party_aliases(Category::Store, ORIGIN_ALIASES);
        assert_eq!(&store[..3], &["from_store", "store", "store_id"]);
        assert_eq!(store.len(), ORIGIN_ALIASES.len());
        assert!(store.contains(&"company"));
    }
}
