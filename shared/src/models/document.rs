//! Header documents that own a staged list of line items

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Category, LineItem};
use crate::types::RecordId;

/// Back-office documents built from line items
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    PurchaseOrder,
    PurchaseReturn,
    MaterialRequest,
    MaterialIssue,
    MaterialReceipt,
    Invoice,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 6] = [
        DocumentKind::PurchaseOrder,
        DocumentKind::PurchaseReturn,
        DocumentKind::MaterialRequest,
        DocumentKind::MaterialIssue,
        DocumentKind::MaterialReceipt,
        DocumentKind::Invoice,
    ];

    /// REST collection path
    pub fn path(&self) -> &'static str {
        match self {
            DocumentKind::PurchaseOrder => "purchase-orders",
            DocumentKind::PurchaseReturn => "purchase-returns",
            DocumentKind::MaterialRequest => "material-requests",
            DocumentKind::MaterialIssue => "material-issues",
            DocumentKind::MaterialReceipt => "material-receipts",
            DocumentKind::Invoice => "invoices",
        }
    }

    /// Reference data the form needs before it becomes usable
    pub fn categories(&self) -> &'static [Category] {
        match self {
            DocumentKind::PurchaseOrder | DocumentKind::PurchaseReturn => &[
                Category::Chemical,
                Category::Uom,
                Category::Supplier,
                Category::Company,
            ],
            DocumentKind::MaterialRequest
            | DocumentKind::MaterialIssue
            | DocumentKind::MaterialReceipt => &[
                Category::Chemical,
                Category::Uom,
                Category::Store,
                Category::Employee,
            ],
            DocumentKind::Invoice => &[
                Category::Chemical,
                Category::Uom,
                Category::Customer,
                Category::Company,
            ],
        }
    }

    /// Category the origin field is chosen from
    pub fn origin_category(&self) -> Category {
        match self {
            DocumentKind::MaterialRequest
            | DocumentKind::MaterialIssue
            | DocumentKind::MaterialReceipt => Category::Store,
            _ => Category::Company,
        }
    }

    /// Category the counterparty field is chosen from
    pub fn counterparty_category(&self) -> Category {
        match self {
            DocumentKind::PurchaseOrder | DocumentKind::PurchaseReturn => Category::Supplier,
            DocumentKind::MaterialRequest
            | DocumentKind::MaterialIssue
            | DocumentKind::MaterialReceipt => Category::Employee,
            DocumentKind::Invoice => Category::Customer,
        }
    }

    /// Wire key of the document date
    pub fn date_key(&self) -> &'static str {
        match self {
            DocumentKind::PurchaseOrder => "order_date",
            DocumentKind::PurchaseReturn => "return_date",
            DocumentKind::MaterialRequest => "request_date",
            DocumentKind::MaterialIssue => "issue_date",
            DocumentKind::MaterialReceipt => "receipt_date",
            DocumentKind::Invoice => "invoice_date",
        }
    }

    /// Wire key of the line-item array on create/update
    pub fn items_input_key(&self) -> &'static str {
        match self {
            DocumentKind::PurchaseOrder => "order_items_input",
            DocumentKind::PurchaseReturn => "return_items_input",
            _ => "items_input",
        }
    }

    /// Key the detail endpoint returns line items under
    pub fn items_read_key(&self) -> &'static str {
        match self {
            DocumentKind::PurchaseOrder => "order_items",
            DocumentKind::PurchaseReturn => "return_items",
            DocumentKind::Invoice => "invoice_items",
            _ => "items",
        }
    }

    /// Whether rows carry a rate and amount
    pub fn is_priced(&self) -> bool {
        matches!(
            self,
            DocumentKind::PurchaseOrder | DocumentKind::PurchaseReturn | DocumentKind::Invoice
        )
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentKind::PurchaseOrder => write!(f, "Purchase Order"),
            DocumentKind::PurchaseReturn => write!(f, "Purchase Return"),
            DocumentKind::MaterialRequest => write!(f, "Material Request"),
            DocumentKind::MaterialIssue => write!(f, "Material Issue"),
            DocumentKind::MaterialReceipt => write!(f, "Material Receipt"),
            DocumentKind::Invoice => write!(f, "Invoice"),
        }
    }
}

/// A document date as received. Unparseable strings pass through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocDate {
    Parsed(NaiveDate),
    Raw(String),
}

impl DocDate {
    /// Wire representation: `YYYY-MM-DD` for parsed dates, raw text otherwise
    pub fn to_wire(&self) -> String {
        match self {
            DocDate::Parsed(date) => date.format("%Y-%m-%d").to_string(),
            DocDate::Raw(raw) => raw.clone(),
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            DocDate::Parsed(date) => Some(*date),
            DocDate::Raw(_) => None,
        }
    }
}

impl Serialize for DocDate {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_wire())
    }
}

impl<'de> Deserialize<'de> for DocDate {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(crate::hydrate::parse_doc_date(&raw).unwrap_or(DocDate::Raw(raw)))
    }
}

impl From<NaiveDate> for DocDate {
    fn from(date: NaiveDate) -> Self {
        DocDate::Parsed(date)
    }
}

/// The parent document being edited
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeaderRecord {
    pub kind: DocumentKind,
    #[serde(default)]
    pub id: Option<RecordId>,
    /// Company or store the document is raised from
    #[serde(default)]
    pub origin_id: Option<RecordId>,
    /// Supplier, customer or employee on the other side
    #[serde(default)]
    pub counterparty_id: Option<RecordId>,
    #[serde(default)]
    pub date: Option<DocDate>,
    #[serde(default)]
    pub remarks: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
}

impl HeaderRecord {
    pub fn new(kind: DocumentKind) -> Self {
        Self {
            kind,
            id: None,
            origin_id: None,
            counterparty_id: None,
            date: None,
            remarks: String::new(),
            status: None,
            line_items: Vec::new(),
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn total(&self) -> Decimal {
        self.line_items.iter().map(|i| i.amount).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_items_input_keys() {
        assert_eq!(DocumentKind::PurchaseOrder.items_input_key(), "order_items_input");
        assert_eq!(DocumentKind::PurchaseReturn.items_input_key(), "return_items_input");
        assert_eq!(DocumentKind::MaterialIssue.items_input_key(), "items_input");
        assert_eq!(DocumentKind::Invoice.items_input_key(), "items_input");
    }

    #[test]
    fn test_every_kind_loads_its_party_categories() {
        for kind in DocumentKind::ALL {
            assert!(kind.categories().contains(&kind.origin_category()));
            assert!(kind.categories().contains(&kind.counterparty_category()));
        }
    }

    #[test]
    fn test_doc_date_wire_format() {
        let date = DocDate::Parsed(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        assert_eq!(date.to_wire(), "2024-03-09");
        assert_eq!(DocDate::Raw("next week".into()).to_wire(), "next week");
    }
}
