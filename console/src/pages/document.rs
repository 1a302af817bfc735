//! Add/edit page for line-item documents
//!
//! Mounting loads every dropdown category in parallel, then hydrates the
//! record being edited. The staged list is edited locally and only reaches
//! the server through [`DocumentPage::submit`].

use std::sync::Arc;

use futures::future::join_all;
use shared::{
    assemble, hydrate, normalize_options, Category, ConfirmDialog, DocumentKind, Dropdowns,
    EntryForm, FormMode, FormPhase, HeaderRecord, InvalidTransition, LineItem, LineItemRef,
    ListQuery, RecordId, StageOutcome, StagedList,
};

use super::{saved_record, RecordList, SubmitOutcome, Toasts};
use crate::backend::Backend;
use crate::config::UiConfig;
use crate::error::AppResult;

/// Controller for one document module (purchase orders, invoices, ...)
pub struct DocumentPage {
    backend: Arc<dyn Backend>,
    kind: DocumentKind,
    phase: FormPhase,
    dropdowns: Dropdowns,
    header: HeaderRecord,
    staged: StagedList,
    list: RecordList,
    confirm: ConfirmDialog<RecordId>,
    toasts: Toasts,
    page_size: u32,
    dropdown_page_size: u32,
}

impl DocumentPage {
    pub fn new(backend: Arc<dyn Backend>, kind: DocumentKind, ui: &UiConfig) -> Self {
        Self {
            backend,
            kind,
            phase: FormPhase::Idle,
            dropdowns: Dropdowns::new(),
            header: HeaderRecord::new(kind),
            staged: StagedList::new(FormMode::Create),
            list: RecordList::new(ListQuery::with_page_size(ui.page_size)),
            confirm: ConfirmDialog::new(),
            toasts: Toasts::default(),
            page_size: ui.page_size,
            dropdown_page_size: ui.dropdown_page_size,
        }
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn dropdowns(&self) -> &Dropdowns {
        &self.dropdowns
    }

    pub fn header(&self) -> &HeaderRecord {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut HeaderRecord {
        &mut self.header
    }

    pub fn staged(&self) -> &StagedList {
        &self.staged
    }

    pub fn entry_mut(&mut self) -> &mut EntryForm {
        &mut self.staged.entry
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

    pub fn toasts_mut(&mut self) -> &mut Toasts {
        &mut self.toasts
    }

    /// First page of the list with the configured page size
    pub fn default_query(&self) -> ListQuery {
        ListQuery::with_page_size(self.page_size)
    }

    // ========================================================================
    // Editor lifecycle
    // ========================================================================

    /// Open the editor, for a new document or for `record_id`
    pub async fn mount(&mut self, record_id: Option<RecordId>) -> AppResult<()> {
        self.phase.transition(FormPhase::Loading)?;
        tracing::info!(kind = %self.kind, record = ?record_id, "opening editor");

        self.dropdowns = self.load_dropdowns().await;
        self.header = HeaderRecord::new(self.kind);

        let mode = match &record_id {
            Some(_) => FormMode::Edit,
            None => FormMode::Create,
        };

        if let Some(id) = record_id {
            match self.backend.fetch(self.kind.path(), &id).await {
                Ok(body) => {
                    self.header = hydrate(self.kind, &body, &self.dropdowns);
                    tracing::debug!(
                        items = self.header.line_items.len(),
                        "hydrated {}",
                        self.kind
                    );
                }
                Err(err) => {
                    tracing::warn!(code = err.code(), error = %err, "detail fetch failed");
                    self.toasts
                        .error(format!("Failed to load {}: {}", self.kind, err.user_message()));
                }
            }
            // Saving an edit always targets the record that was opened
            if self.header.id.is_none() {
                self.header.id = Some(id);
            }
        }

        let rows = std::mem::take(&mut self.header.line_items);
        self.staged = StagedList::with_rows(mode, rows);
        self.phase.transition(FormPhase::Ready)?;
        Ok(())
    }

    /// Fetch every category this module needs. A failed category stays
    /// empty and the rest of the form keeps working.
    async fn load_dropdowns(&mut self) -> Dropdowns {
        let query = ListQuery::with_page_size(self.dropdown_page_size);
        let backend = &self.backend;
        let fetches = self.kind.categories().iter().map(|&category| {
            let query = &query;
            async move { (category, backend.list(category.path(), query).await) }
        });
        let results = join_all(fetches).await;

        let mut dropdowns = Dropdowns::new();
        for (category, result) in results {
            match result {
                Ok(body) => {
                    let options = normalize_options(category, &body);
                    tracing::debug!(%category, count = options.len(), "dropdown loaded");
                    dropdowns.insert(category, options);
                }
                Err(err) => {
                    tracing::warn!(
                        %category,
                        code = err.code(),
                        error = %err,
                        "dropdown fetch failed"
                    );
                    self.toasts.error(format!("Failed to load {category}"));
                    dropdowns.insert(category, Vec::new());
                }
            }
        }
        dropdowns
    }

    /// Close the editor and discard unsaved rows
    pub fn close(&mut self) -> AppResult<()> {
        if self.phase != FormPhase::Idle {
            self.phase.transition(FormPhase::Idle)?;
        }
        self.header = HeaderRecord::new(self.kind);
        self.staged = StagedList::new(FormMode::Create);
        Ok(())
    }

    // ========================================================================
    // Staged rows
    // ========================================================================

    /// Pick an item for the entry form, pre-filling its unit and rate
    pub fn select_item(&mut self, id: &RecordId) -> bool {
        let Some(option) = self.dropdowns.find_by_id(Category::Chemical, id).cloned() else {
            self.toasts.warning("Selected item is no longer available");
            return false;
        };
        self.staged.select_reference(option, self.dropdowns.get(Category::Uom));
        true
    }

    /// Stage the entry form
    pub fn add_line(&mut self) -> Option<StageOutcome> {
        match self.staged.add_or_update() {
            Ok(outcome) => {
                tracing::debug!(?outcome, "line staged");
                Some(outcome)
            }
            Err(err) => {
                self.toasts.warning(err.to_string());
                None
            }
        }
    }

    pub fn begin_edit_line(&mut self, id: &LineItemRef) -> bool {
        match self.staged.begin_edit(id) {
            Ok(()) => true,
            Err(err) => {
                self.toasts.warning(err.to_string());
                false
            }
        }
    }

    pub fn cancel_edit_line(&mut self) {
        self.staged.cancel_edit();
    }

    pub fn remove_line(&mut self, id: &LineItemRef) -> Option<LineItem> {
        self.staged.remove(id)
    }

    /// Flip the free-of-charge flag on a staged row
    pub fn toggle_foc(&mut self, id: &LineItemRef) -> bool {
        let Some(current) = self.staged.get(id).map(|row| row.is_free_of_charge) else {
            self.toasts.warning("Line item not found");
            return false;
        };
        match self.staged.set_free_of_charge(id, !current) {
            Ok(()) => true,
            Err(err) => {
                self.toasts.warning(err.to_string());
                false
            }
        }
    }

    // ========================================================================
    // Submission
    // ========================================================================

    /// Validate, assemble and send the document. Client-side problems are
    /// reported without contacting the server.
    pub async fn submit(&mut self) -> AppResult<SubmitOutcome> {
        if !self.phase.can_submit() {
            return Err(InvalidTransition {
                from: self.phase,
                to: FormPhase::Submitting,
            }
            .into());
        }

        let mut header = self.header.clone();
        header.line_items = self.staged.rows().to_vec();

        let body = match assemble(&header) {
            Ok(body) => body,
            Err(err) => {
                self.toasts.warning(err.to_string());
                return Ok(SubmitOutcome::Blocked);
            }
        };

        self.phase.transition(FormPhase::Submitting)?;
        let path = self.kind.path();
        let result = match &header.id {
            Some(id) => self.backend.update(path, id, &body).await,
            None => self.backend.create(path, &body).await,
        };

        match result {
            Ok(response) => {
                let saved = saved_record(response);
                let id = saved
                    .as_ref()
                    .and_then(|row| row.get("id"))
                    .and_then(RecordId::from_value)
                    .or_else(|| header.id.clone());
                let verb = if header.id.is_some() { "updated" } else { "created" };
                tracing::info!(kind = %self.kind, id = ?id, "{} {}", self.kind, verb);
                self.toasts.success(format!("{} {} successfully", self.kind, verb));

                self.close()?;
                if let Some(row) = saved {
                    self.list.upsert(row);
                }
                let query = self.list.query().clone();
                // A failed reload has already raised its own toast
                let _ = self.load_list(query).await;
                Ok(SubmitOutcome::Saved { id })
            }
            Err(err) => {
                tracing::error!(
                    kind = %self.kind,
                    code = err.code(),
                    error = %err,
                    "submit failed"
                );
                self.toasts.error(err.user_message());
                self.phase.transition(FormPhase::Ready)?;
                Ok(SubmitOutcome::Failed)
            }
        }
    }

    // ========================================================================
    // List
    // ========================================================================

    pub async fn load_list(&mut self, query: ListQuery) -> AppResult<()> {
        match self.backend.list(self.kind.path(), &query).await {
            Ok(body) => {
                self.list.set_page(query, &body);
                tracing::debug!(kind = %self.kind, count = self.list.count(), "list loaded");
                Ok(())
            }
            Err(err) => {
                self.toasts
                    .error(format!("Failed to load {} list: {}", self.kind, err.user_message()));
                Err(err)
            }
        }
    }

    pub fn request_delete(&mut self, id: RecordId) {
        let message = format!("Are you sure you want to delete this {}?", self.kind);
        self.confirm.open(id, message);
    }

    pub fn cancel_delete(&mut self) {
        self.confirm.cancel();
    }

    /// Run the confirmed delete. The row leaves the list at once and comes
    /// back if the server refuses.
    pub async fn confirm_delete(&mut self) -> bool {
        let Some(id) = self.confirm.accept() else {
            return false;
        };
        let removed = self.list.remove(&id);

        match self.backend.delete(self.kind.path(), &id).await {
            Ok(_) => {
                tracing::info!(kind = %self.kind, %id, "deleted");
                self.toasts.success(format!("{} deleted successfully", self.kind));
                true
            }
            Err(err) => {
                tracing::error!(
                    kind = %self.kind,
                    %id,
                    code = err.code(),
                    error = %err,
                    "delete failed"
                );
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
