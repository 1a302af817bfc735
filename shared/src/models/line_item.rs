//! Staged line items and the entry form that feeds them

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::SelectOption;
use crate::types::{LineItemRef, RecordId};

/// Round a money or quantity value to two decimal places
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Amount for a quantity at a rate
pub fn compute_amount(quantity: Decimal, rate: Decimal) -> Decimal {
    round2(quantity * rate)
}

/// A row in the staged list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    pub id: LineItemRef,
    /// Chemical / item id
    pub reference_id: Option<RecordId>,
    pub reference_label: String,
    /// Unit of measure id
    pub unit_id: Option<RecordId>,
    pub unit_label: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub is_free_of_charge: bool,
    /// Rate restored when FOC is switched off
    #[serde(with = "rust_decimal::serde::float")]
    pub previous_rate: Decimal,
}

impl LineItem {
    /// Build a row and derive its amount. A FOC row keeps `rate` as its
    /// previous rate and is charged at zero.
    pub fn new(
        id: LineItemRef,
        reference: (Option<RecordId>, String),
        unit: (Option<RecordId>, String),
        quantity: Decimal,
        rate: Decimal,
        is_free_of_charge: bool,
    ) -> Self {
        let mut item = Self {
            id,
            reference_id: reference.0,
            reference_label: reference.1,
            unit_id: unit.0,
            unit_label: unit.1,
            quantity,
            rate,
            amount: Decimal::ZERO,
            is_free_of_charge: false,
            previous_rate: rate,
        };
        item.set_free_of_charge(is_free_of_charge);
        item.recompute();
        item
    }

    /// Key used to merge rows for the same item in the same unit
    pub fn dedup_key(&self) -> (Option<&RecordId>, Option<&RecordId>) {
        (self.reference_id.as_ref(), self.unit_id.as_ref())
    }

    pub fn recompute(&mut self) {
        self.amount = compute_amount(self.quantity, self.rate);
    }

    pub fn set_quantity(&mut self, quantity: Decimal) {
        self.quantity = quantity;
        self.recompute();
    }

    /// Set the rate. On a FOC row only the remembered rate changes.
    pub fn set_rate(&mut self, rate: Decimal) {
        if self.is_free_of_charge {
            self.previous_rate = rate;
        } else {
            self.rate = rate;
            self.previous_rate = rate;
        }
        self.recompute();
    }

    pub fn set_free_of_charge(&mut self, free: bool) {
        if free == self.is_free_of_charge {
            return;
        }
        if free {
            if !self.rate.is_zero() {
                self.previous_rate = self.rate;
            }
            self.rate = Decimal::ZERO;
        } else {
            self.rate = self.previous_rate;
        }
        self.is_free_of_charge = free;
        self.recompute();
    }
}

/// Fields of the "add item" form above the staged table
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EntryForm {
    #[serde(default)]
    pub reference: Option<SelectOption>,
    #[serde(default)]
    pub unit: Option<SelectOption>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub quantity: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub rate: Decimal,
    #[serde(default)]
    pub is_free_of_charge: bool,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub previous_rate: Decimal,
}

impl EntryForm {
    /// Pick an item and pre-fill its default unit and rate
    pub fn select_reference(&mut self, option: SelectOption, units: &[SelectOption]) {
        if let Some(meta) = option.meta.as_ref() {
            if let Some(uom) = meta.uom.as_ref() {
                self.unit = units
                    .iter()
                    .find(|u| &u.id == uom)
                    .cloned()
                    .or_else(|| {
                        meta.uom_label
                            .as_ref()
                            .map(|label| SelectOption::new(uom.clone(), label.clone()))
                    });
            }
            if let Some(rate) = meta.rate {
                self.set_rate(rate);
            }
            if meta.is_foc {
                self.set_free_of_charge(true);
            }
        }
        self.reference = Some(option);
    }

    pub fn set_rate(&mut self, rate: Decimal) {
        if self.is_free_of_charge {
            self.previous_rate = rate;
        } else {
            self.rate = rate;
            self.previous_rate = rate;
        }
    }

    pub fn set_free_of_charge(&mut self, free: bool) {
        if free == self.is_free_of_charge {
            return;
        }
        if free {
            if !self.rate.is_zero() {
                self.previous_rate = self.rate;
            }
            self.rate = Decimal::ZERO;
        } else {
            self.rate = self.previous_rate;
        }
        self.is_free_of_charge = free;
    }

    /// Amount preview shown next to the entry form
    pub fn amount(&self) -> Decimal {
        compute_amount(self.quantity.unwrap_or_default(), self.rate)
    }

    /// Load a staged row back into the form
    pub fn from_item(item: &LineItem) -> Self {
        Self {
            reference: Some(option_or_label(&item.reference_id, &item.reference_label)),
            unit: Some(option_or_label(&item.unit_id, &item.unit_label)),
            quantity: Some(item.quantity),
            rate: item.rate,
            is_free_of_charge: item.is_free_of_charge,
            previous_rate: item.previous_rate,
        }
    }
}

fn option_or_label(id: &Option<RecordId>, label: &str) -> SelectOption {
    match id {
        Some(id) => SelectOption::new(id.clone(), label),
        None => SelectOption::new(RecordId::Text(label.to_string()), label),
    }
}
