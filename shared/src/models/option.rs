//! Dropdown options and reference-data categories

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::RecordId;

/// A single autocomplete entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectOption {
    pub id: RecordId,
    pub label: String,
    pub value: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<OptionMeta>,
}

impl SelectOption {
    pub fn new(id: impl Into<RecordId>, label: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            value: id.clone(),
            id,
            label: label.into(),
            meta: None,
        }
    }

    pub fn with_meta(mut self, meta: OptionMeta) -> Self {
        self.meta = Some(meta);
        self
    }
}

/// Extra defaults carried by chemical/item options
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OptionMeta {
    /// Default unit of measure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uom: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uom_label: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub rate: Option<Decimal>,
    #[serde(default)]
    pub is_foc: bool,
}

/// Reference-data categories feeding the dropdowns
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Chemical,
    Uom,
    Supplier,
    Company,
    Employee,
    Customer,
    Store,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Chemical,
        Category::Uom,
        Category::Supplier,
        Category::Company,
        Category::Employee,
        Category::Customer,
        Category::Store,
    ];

    /// REST collection the options are listed from
    pub fn path(&self) -> &'static str {
        match self {
            Category::Chemical => "chemicals",
            Category::Uom => "uoms",
            Category::Supplier => "suppliers",
            Category::Company => "companies",
            Category::Employee => "employees",
            Category::Customer => "customers",
            Category::Store => "stores",
        }
    }

    /// Label keys tried before the generic `name` / `label`
    pub fn label_keys(&self) -> &'static [&'static str] {
        match self {
            Category::Chemical => &["chemical_name", "item_name"],
            Category::Uom => &["uom_name", "unit_name", "symbol"],
            Category::Supplier => &["supplier_name", "company_name"],
            Category::Company => &["company_name"],
            Category::Employee => &["full_name", "employee_name"],
            Category::Customer => &["customer_name", "company_name"],
            Category::Store => &["store_name"],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Chemical => "chemical",
            Category::Uom => "uom",
            Category::Supplier => "supplier",
            Category::Company => "company",
            Category::Employee => "employee",
            Category::Customer => "customer",
            Category::Store => "store",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Chemical => write!(f, "Chemicals"),
            Category::Uom => write!(f, "Units"),
            Category::Supplier => write!(f, "Suppliers"),
            Category::Company => write!(f, "Companies"),
            Category::Employee => write!(f, "Employees"),
            Category::Customer => write!(f, "Customers"),
            Category::Store => write!(f, "Stores"),
        }
    }
}

/// Normalized option lists keyed by category
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dropdowns {
    lists: HashMap<Category, Vec<SelectOption>>,
}

impl Dropdowns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, category: Category, options: Vec<SelectOption>) {
        self.lists.insert(category, options);
    }

    /// Options for a category; an unloaded category is empty
    pub fn get(&self, category: Category) -> &[SelectOption] {
        self.lists.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn find_by_id(&self, category: Category, id: &RecordId) -> Option<&SelectOption> {
        self.get(category).iter().find(|o| &o.id == id)
    }

    /// Case-insensitive label lookup
    pub fn find_by_label(&self, category: Category, label: &str) -> Option<&SelectOption> {
        let needle = label.trim();
        if needle.is_empty() {
            return None;
        }
        self.get(category)
            .iter()
            .find(|o| o.label.trim().eq_ignore_ascii_case(needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_id_and_label() {
        let mut dropdowns = Dropdowns::new();
        dropdowns.insert(
            Category::Uom,
            vec![SelectOption::new(2, "KG"), SelectOption::new(3, "Litre")],
        );

        assert_eq!(
            dropdowns.find_by_id(Category::Uom, &RecordId::Int(3)).map(|o| o.label.as_str()),
            Some("Litre")
        );
        assert_eq!(
            dropdowns.find_by_label(Category::Uom, " kg ").map(|o| o.id.clone()),
            Some(RecordId::Int(2))
        );
        assert!(dropdowns.find_by_label(Category::Uom, "").is_none());
        assert!(dropdowns.get(Category::Chemical).is_empty());
    }
}
