//! Vehicle and supplier list/form pages

use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value;
use shared::{
    ConfirmDialog, ListQuery, MasterKind, RecordId, SupplierForm, SupplierPayload, VehicleForm,
    VehiclePayload,
};
use validator::{Validate, ValidationErrors};

use super::{saved_record, RecordList, SubmitOutcome, Toasts};
use crate::backend::Backend;
use crate::config::UiConfig;
use crate::error::{AppError, AppResult};

/// A master-data form and the body its endpoint expects
pub trait MasterRecord: Validate + Send + Sync {
    const KIND: MasterKind;

    fn record_id(&self) -> Option<&RecordId>;

    fn to_payload(&self) -> serde_json::Result<Value>;
}

impl MasterRecord for VehicleForm {
    const KIND: MasterKind = MasterKind::Vehicle;

    fn record_id(&self) -> Option<&RecordId> {
        self.id.as_ref()
    }

    fn to_payload(&self) -> serde_json::Result<Value> {
        serde_json::to_value(VehiclePayload::from(self))
    }
}

impl MasterRecord for SupplierForm {
    const KIND: MasterKind = MasterKind::Supplier;

    fn record_id(&self) -> Option<&RecordId> {
        self.id.as_ref()
    }

    fn to_payload(&self) -> serde_json::Result<Value> {
        serde_json::to_value(SupplierPayload::from(self))
    }
}

/// List plus create/edit/delete for one master-data entity
pub struct MasterDataPage<F: MasterRecord> {
    backend: Arc<dyn Backend>,
    list: RecordList,
    confirm: ConfirmDialog<RecordId>,
    toasts: Toasts,
    saving: bool,
    _form: PhantomData<F>,
}

impl<F: MasterRecord> MasterDataPage<F> {
    pub fn new(backend: Arc<dyn Backend>, ui: &UiConfig) -> Self {
        Self {
            backend,
            list: RecordList::new(ListQuery::with_page_size(ui.page_size)),
            confirm: ConfirmDialog::new(),
            toasts: Toasts::default(),
            saving: false,
            _form: PhantomData,
        }
    }

    pub fn kind(&self) -> MasterKind {
        F::KIND
    }

    pub fn list(&self) -> &RecordList {
        &self.list
    }

    pub fn confirm(&self) -> &ConfirmDialog<RecordId> {
        &self.confirm
    }

    pub fn toasts(&self) -> &Toasts {
        &self.toasts
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub async fn load_list(&mut self, query: ListQuery) -> AppResult<()> {
        match self.backend.list(F::KIND.path(), &query).await {
            Ok(body) => {
                self.list.set_page(query, &body);
                Ok(())
            }
            Err(err) => {
                self.toasts
                    .error(format!("Failed to load {} list: {}", F::KIND, err.user_message()));
                Err(err)
            }
        }
    }

    /// Validate and send the form. Invalid fields are reported together and
    /// nothing is sent.
    pub async fn save(&mut self, form: &F) -> AppResult<SubmitOutcome> {
        if self.saving {
            return Ok(SubmitOutcome::Blocked);
        }
        if let Err(errors) = form.validate() {
            self.toasts.warning(describe_errors(&errors));
            return Ok(SubmitOutcome::Blocked);
        }
        let body = form
            .to_payload()
            .map_err(|e| AppError::InvalidResponse(e.to_string()))?;

        self.saving = true;
        let path = F::KIND.path();
        let result = match form.record_id() {
            Some(id) => self.backend.update(path, id, &body).await,
            None => self.backend.create(path, &body).await,
        };
        self.saving = false;

        match result {
            Ok(response) => {
                let saved = saved_record(response);
                let id = saved
                    .as_ref()
                    .and_then(|row| row.get("id"))
                    .and_then(RecordId::from_value)
                    .or_else(|| form.record_id().cloned());
                let verb = if form.record_id().is_some() { "updated" } else { "created" };
                tracing::info!(kind = %F::KIND, id = ?id, "{} {}", F::KIND, verb);
                self.toasts.success(format!("{} {} successfully", F::KIND, verb));
                if let Some(row) = saved {
                    self.list.upsert(row);
                }
                let query = self.list.query().clone();
                // A failed reload has already raised its own toast
                let _ = self.load_list(query).await;
                Ok(SubmitOutcome::Saved { id })
            }
            Err(err) => {
                tracing::error!(kind = %F::KIND, code = err.code(), error = %err, "save failed");
                self.toasts.error(err.user_message());
                Ok(SubmitOutcome::Failed)
            }
        }
    }

    pub fn request_delete(&mut self, id: RecordId) {
        let message = format!("Are you sure you want to delete this {}?", F::KIND);
        self.confirm.open(id, message);
    }

    pub fn cancel_delete(&mut self) {
        self.confirm.cancel();
    }

    pub async fn confirm_delete(&mut self) -> bool {
        let Some(id) = self.confirm.accept() else {
            return false;
        };
        let removed = self.list.remove(&id);

        match self.backend.delete(F::KIND.path(), &id).await {
            Ok(_) => {
                self.toasts.success(format!("{} deleted successfully", F::KIND));
                true
            }
            Err(err) => {
                tracing::error!(kind = %F::KIND, %id, error = %err, "delete failed");
                if let Some((index, row)) = removed {
                    self.list.restore(index, row);
                }
                self.toasts.error(err.user_message());
                false
            }
        }
    }

    pub fn export_csv(&self, columns: &[(&str, &str)]) -> AppResult<String> {
        self.list.export_csv(columns)
    }
}

/// One line per invalid field, in field order
fn describe_errors(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by_key(|(field, _)| *field);
    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => message.to_string(),
                None => format!("{field} is invalid"),
            })
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_errors_is_sorted_by_field() {
        let vehicle = VehicleForm {
            name: String::new(),
            registration_no: "?".into(),
            ..Default::default()
        };
        let errors = vehicle.validate().unwrap_err();
        let message = describe_errors(&errors);
        let name_at = message.find("Vehicle name is required").unwrap();
        let reg_at = message.find("Registration number").unwrap();
        assert!(name_at < reg_at);
    }

    #[test]
    fn test_vehicle_payload_has_both_key_styles() {
        let vehicle = VehicleForm {
            name: "Van 3".into(),
            registration_no: "ka01ab1234".into(),
            ..Default::default()
        };
        let body = vehicle.to_payload().unwrap();
        assert_eq!(body["vehicle_name"], body["name"]);
        assert_eq!(body["vehicle_number"], "KA01AB1234");
    }
}
