//! Page lifecycle and confirmation dialogs
//!
//! A document page moves `Idle -> Loading -> Ready -> Submitting` and then
//! either back to `Idle` (saved, editor closed) or to `Ready` (failed, the
//! user may resubmit). Nothing retries on its own.

use serde::{Deserialize, Serialize};

use crate::error::InvalidTransition;

/// Lifecycle phase of an add/edit page
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FormPhase {
    #[default]
    Idle,
    /// Dropdowns and details are being fetched
    Loading,
    Ready,
    Submitting,
}

impl FormPhase {
    pub fn can_transition_to(&self, next: FormPhase) -> bool {
        use FormPhase::*;
        matches!(
            (self, next),
            (Idle, Loading)
                | (Loading, Ready)
                | (Ready, Submitting)
                | (Ready, Idle)
                | (Ready, Loading)
                | (Submitting, Idle)
                | (Submitting, Ready)
        )
    }

    /// Move to `next`, or report the illegal jump without changing state
    pub fn transition(&mut self, next: FormPhase) -> Result<(), InvalidTransition> {
        if !self.can_transition_to(next) {
            return Err(InvalidTransition {
                from: *self,
                to: next,
            });
        }
        *self = next;
        Ok(())
    }

    /// The submit control is enabled only while the form is ready
    pub fn can_submit(&self) -> bool {
        matches!(self, FormPhase::Ready)
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, FormPhase::Loading | FormPhase::Submitting)
    }
}

/// A modal asking the user to confirm an action before it runs
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmDialog<A> {
    pending: Option<(A, String)>,
}

impl<A> Default for ConfirmDialog<A> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<A> ConfirmDialog<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the dialog. A dialog already open is replaced.
    pub fn open(&mut self, action: A, message: impl Into<String>) {
        self.pending = Some((action, message.into()));
    }

    pub fn is_open(&self) -> bool {
        self.pending.is_some()
    }

    pub fn message(&self) -> Option<&str> {
        self.pending.as_ref().map(|(_, m)| m.as_str())
    }

    pub fn pending(&self) -> Option<&A> {
        self.pending.as_ref().map(|(a, _)| a)
    }

    /// Close the dialog and hand back the action to run
    pub fn accept(&mut self) -> Option<A> {
        self.pending.take().map(|(action, _)| action)
    }

    /// Close the dialog and drop the action
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
