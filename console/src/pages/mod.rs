//! Page controllers
//!
//! Each controller owns the state a browser page would hold (phase, staged
//! rows, list, dialogs, toasts) and drives it against a [`Backend`].
//!
//! [`Backend`]: crate::backend::Backend

mod document;
mod list;
mod master;

pub use document::DocumentPage;
pub use list::{RecordList, SortDirection};
pub use master::{MasterDataPage, MasterRecord};

use serde::Serialize;
use serde_json::Value;
use shared::{Notification, NotificationLevel, RecordId};

/// Toast queue. Every toast is mirrored to the log.
#[derive(Debug, Clone, Default)]
pub struct Toasts {
    queue: Vec<Notification>,
}

impl Toasts {
    pub fn push(&mut self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success | NotificationLevel::Info => {
                tracing::info!(message = %notification.message, "toast")
            }
            NotificationLevel::Warning => {
                tracing::warn!(message = %notification.message, "toast")
            }
            NotificationLevel::Error => {
                tracing::error!(message = %notification.message, "toast")
            }
        }
        self.queue.push(notification);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(Notification::success(message));
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(Notification::warning(message));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Notification::error(message));
    }

    pub fn all(&self) -> &[Notification] {
        &self.queue
    }

    pub fn last(&self) -> Option<&Notification> {
        self.queue.last()
    }

    /// Hand over queued toasts to the renderer
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.queue)
    }
}

/// What a submit attempt ended in
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// Saved; carries the server id when the response had one
    Saved { id: Option<RecordId> },
    /// Client-side validation stopped the request
    Blocked,
    /// The request was sent and failed
    Failed,
}

/// The saved record inside a create/update response. Replies that only
/// acknowledge the write (`{status, message}`) carry no record.
fn saved_record(response: Value) -> Option<Value> {
    let record = match response {
        Value::Object(mut fields) => match fields.remove("data") {
            Some(data @ Value::Object(_)) => data,
            Some(other) => {
                fields.insert("data".to_string(), other);
                Value::Object(fields)
            }
            None => Value::Object(fields),
        },
        _ => return None,
    };
    record
        .get("id")
        .and_then(RecordId::from_value)
        .is_some()
        .then_some(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_saved_record_unwraps_data() {
        let saved = saved_record(json!({"status": "success", "data": {"id": 4}}));
        assert_eq!(saved, Some(json!({"id": 4})));

        let saved = saved_record(json!({"id": 5, "order_date": "2024-03-01"})).unwrap();
        assert_eq!(saved["id"], json!(5));

        assert_eq!(saved_record(Value::Null), None);
    }

    #[test]
    fn test_acknowledgement_is_not_a_record() {
        let ack = json!({"status": "success", "message": "Vehicle created"});
        assert_eq!(saved_record(ack), None);
        assert_eq!(saved_record(json!({"status": "success", "data": null})), None);
    }
}
