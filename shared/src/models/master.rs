//! Vehicle and supplier master data

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::RecordId;
use crate::validation::{validate_phone_field, validate_registration_field};

/// Service vehicle used by field technicians
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, PartialEq)]
pub struct VehicleForm {
    #[serde(default)]
    pub id: Option<RecordId>,
    #[validate(length(min = 1, max = 100, message = "Vehicle name is required"))]
    pub name: String,
    #[validate(custom = "validate_registration_field")]
    pub registration_no: String,
    #[serde(default)]
    pub vehicle_type: Option<String>,
    /// Employee the vehicle is assigned to
    #[serde(default)]
    pub driver_id: Option<RecordId>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// Chemical and material supplier
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, PartialEq)]
pub struct SupplierForm {
    #[serde(default)]
    pub id: Option<RecordId>,
    #[validate(length(min = 1, max = 150, message = "Supplier name is required"))]
    pub name: String,
    #[serde(default)]
    pub contact_person: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    #[serde(default)]
    pub email: Option<String>,
    #[validate(custom = "validate_phone_field")]
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub tax_number: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Master-data entities managed on the same list/form pattern
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MasterKind {
    Vehicle,
    Supplier,
}

impl MasterKind {
    pub fn path(&self) -> &'static str {
        match self {
            MasterKind::Vehicle => "vehicles",
            MasterKind::Supplier => "suppliers",
        }
    }
}

impl std::fmt::Display for MasterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MasterKind::Vehicle => write!(f, "Vehicle"),
            MasterKind::Supplier => write!(f, "Supplier"),
        }
    }
}
