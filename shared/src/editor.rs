//! Line-item staging
//!
//! [`StagedList`] is the in-memory table under an add/edit form. Rows are
//! added through the entry form, edited by loading them back into it, and
//! removed directly. Nothing here talks to the server.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EntryError;
use crate::models::{EntryForm, LineItem, SelectOption};
use crate::types::{LineItemRef, TempId};
use crate::validation::validate_entry;

/// Whether the page creates a new document or edits a saved one
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FormMode {
    #[default]
    Create,
    Edit,
}

impl FormMode {
    /// What happens when a new entry matches a staged row's item and unit
    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        match self {
            FormMode::Create => DuplicatePolicy::MergeQuantity,
            FormMode::Edit => DuplicatePolicy::Overwrite,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Add the new quantity to the existing row
    MergeQuantity,
    /// Replace the existing row's values, keeping its id
    Overwrite,
}

/// Result of a successful [`StagedList::add_or_update`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "outcome", content = "id", rename_all = "snake_case")]
pub enum StageOutcome {
    Appended(LineItemRef),
    Merged(LineItemRef),
    Replaced(LineItemRef),
}

impl StageOutcome {
    pub fn id(&self) -> &LineItemRef {
        match self {
            StageOutcome::Appended(id) | StageOutcome::Merged(id) | StageOutcome::Replaced(id) => {
                id
            }
        }
    }
}

/// Staged rows plus the entry form that edits them
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StagedList {
    rows: Vec<LineItem>,
    pub entry: EntryForm,
    edit_id: Option<LineItemRef>,
    mode: FormMode,
    next_temp: u64,
}

impl StagedList {
    pub fn new(mode: FormMode) -> Self {
        Self {
            mode,
            next_temp: 1,
            ..Self::default()
        }
    }

    /// Start from rows loaded by the hydrator
    pub fn with_rows(mode: FormMode, rows: Vec<LineItem>) -> Self {
        let next_temp = rows
            .iter()
            .filter_map(|r| match r.id {
                LineItemRef::New(TempId(n)) => Some(n),
                LineItemRef::Persisted(_) => None,
            })
            .max()
            .unwrap_or(0)
            + 1;
        Self {
            rows,
            mode,
            next_temp,
            ..Self::default()
        }
    }

    pub fn rows(&self) -> &[LineItem] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<LineItem> {
        self.rows
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn edit_id(&self) -> Option<&LineItemRef> {
        self.edit_id.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn get(&self, id: &LineItemRef) -> Option<&LineItem> {
        self.rows.iter().find(|r| &r.id == id)
    }

    /// Sum of row amounts
    pub fn total(&self) -> Decimal {
        self.rows.iter().map(|r| r.amount).sum()
    }

    /// Pick the item in the entry form, pre-filling its default unit and rate
    pub fn select_reference(&mut self, option: SelectOption, units: &[SelectOption]) {
        self.entry.select_reference(option, units);
    }

    /// Stage the entry form. On a validation error nothing changes.
    pub fn add_or_update(&mut self) -> Result<StageOutcome, EntryError> {
        validate_entry(&self.entry)?;
        let mut candidate = self.build_row(LineItemRef::New(TempId(self.next_temp)));

        if let Some(edit_id) = self.edit_id.clone() {
            let row = self
                .rows
                .iter_mut()
                .find(|r| r.id == edit_id)
                .ok_or(EntryError::NotFound)?;
            candidate.id = edit_id.clone();
            *row = candidate;
            self.reset_entry();
            return Ok(StageOutcome::Replaced(edit_id));
        }

        let existing = self
            .rows
            .iter_mut()
            .find(|r| r.reference_id.is_some() && r.dedup_key() == candidate.dedup_key());

        let outcome = match (existing, self.mode.duplicate_policy()) {
            (Some(row), DuplicatePolicy::MergeQuantity) => {
                row.set_quantity(row.quantity + candidate.quantity);
                StageOutcome::Merged(row.id.clone())
            }
            (Some(row), DuplicatePolicy::Overwrite) => {
                candidate.id = row.id.clone();
                *row = candidate;
                StageOutcome::Replaced(row.id.clone())
            }
            (None, _) => {
                let id = candidate.id.clone();
                self.rows.push(candidate);
                self.next_temp += 1;
                StageOutcome::Appended(id)
            }
        };
        self.reset_entry();
        Ok(outcome)
    }

    /// Drop a row. Unknown ids are ignored.
    pub fn remove(&mut self, id: &LineItemRef) -> Option<LineItem> {
        if self.edit_id.as_ref() == Some(id) {
            self.reset_entry();
        }
        let index = self.rows.iter().position(|r| &r.id == id)?;
        Some(self.rows.remove(index))
    }

    /// Load a row into the entry form. The row stays staged until
    /// [`StagedList::add_or_update`] confirms the edit.
    pub fn begin_edit(&mut self, id: &LineItemRef) -> Result<(), EntryError> {
        let row = self.get(id).ok_or(EntryError::NotFound)?;
        self.entry = EntryForm::from_item(row);
        self.edit_id = Some(id.clone());
        Ok(())
    }

    pub fn cancel_edit(&mut self) {
        self.reset_entry();
    }

    pub fn set_free_of_charge(&mut self, id: &LineItemRef, free: bool) -> Result<(), EntryError> {
        self.row_mut(id)?.set_free_of_charge(free);
        Ok(())
    }

    pub fn set_quantity(&mut self, id: &LineItemRef, quantity: Decimal) -> Result<(), EntryError> {
        if quantity <= Decimal::ZERO {
            return Err(EntryError::MissingFields(vec!["Quantity"]));
        }
        self.row_mut(id)?.set_quantity(quantity);
        Ok(())
    }

    pub fn set_rate(&mut self, id: &LineItemRef, rate: Decimal) -> Result<(), EntryError> {
        if rate < Decimal::ZERO {
            return Err(EntryError::NegativeRate);
        }
        self.row_mut(id)?.set_rate(rate);
        Ok(())
    }

    /// Drop every row, e.g. when the editor closes without saving
    pub fn clear(&mut self) {
        self.rows.clear();
        self.reset_entry();
        self.next_temp = 1;
    }

    fn row_mut(&mut self, id: &LineItemRef) -> Result<&mut LineItem, EntryError> {
        self.rows
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or(EntryError::NotFound)
    }

    fn reset_entry(&mut self) {
        self.entry = EntryForm::default();
        self.edit_id = None;
    }

    /// Row from the validated entry form
    fn build_row(&self, id: LineItemRef) -> LineItem {
        let entry = &self.entry;
        let reference = entry
            .reference
            .as_ref()
            .map(|o| (Some(o.id.clone()), o.label.clone()))
            .unwrap_or_default();
        let unit = entry
            .unit
            .as_ref()
            .map(|o| (Some(o.id.clone()), o.label.clone()))
            .unwrap_or_default();
        let rate = if entry.is_free_of_charge {
            entry.previous_rate
        } else {
            entry.rate
        };
        LineItem::new(
            id,
            reference,
            unit,
            entry.quantity.unwrap_or_default(),
            rate,
            entry.is_free_of_charge,
        )
    }
}
