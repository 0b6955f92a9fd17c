//! Client session: local list plus the load/save/clear protocol
//!
//! Remote operations come in two forms:
//!
//! - `load()`, `save()`, `clear()` await the call and apply the result
//! - `begin_*` / `finish_*` for event loops that run requests as background
//!   tasks and hand the result back later
//!
//! Every `begin_*` issues a [`Ticket`] with a sequence number. A result whose
//! ticket has been superseded is discarded, so a slow response can never
//! overwrite the list after a newer load or clear was issued.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::error::{ClientError, ClientResult};
use super::list::TodoList;
use super::sync::SyncClient;
use crate::api::{ClearResponse, SaveResponse};

/// Remote operation kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Load,
    Save,
    Clear,
}

/// Handle for one issued remote operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub operation: Operation,
    pub seq: u64,
}

/// Issues monotonic sequence numbers and remembers the latest per operation
#[derive(Debug, Default)]
struct Sequencer {
    next: u64,
    latest: HashMap<Operation, u64>,
    /// Ticket of the last clear that succeeded
    applied_clear: u64,
}

impl Sequencer {
    fn issue(&mut self, operation: Operation) -> Ticket {
        self.next += 1;
        self.latest.insert(operation, self.next);
        Ticket {
            operation,
            seq: self.next,
        }
    }

    fn latest(&self, operation: Operation) -> u64 {
        self.latest.get(&operation).copied().unwrap_or(0)
    }

    /// Remember a clear that emptied the list
    fn record_clear(&mut self, ticket: Ticket) {
        self.applied_clear = self.applied_clear.max(ticket.seq);
    }

    /// Whether a result for `ticket` may still be applied
    ///
    /// Loads are also superseded by a later clear once that clear has
    /// succeeded, since both replace the whole list. A failed clear leaves
    /// earlier loads current.
    fn is_current(&self, ticket: Ticket) -> bool {
        let newest_of_kind = self.latest(ticket.operation) == ticket.seq;
        match ticket.operation {
            Operation::Load => newest_of_kind && self.applied_clear < ticket.seq,
            Operation::Save | Operation::Clear => newest_of_kind,
        }
    }
}

/// Severity of a user notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Message for the user about a finished remote operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    fn info(title: &str, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            title: title.to_string(),
            message: message.into(),
        }
    }

    fn error(title: &str, err: &ClientError) -> Self {
        let message = match err.solution() {
            Some(solution) => format!("{} ({})", err, solution),
            None => err.to_string(),
        };
        Self {
            level: NoticeLevel::Error,
            title: title.to_string(),
            message,
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

/// Local todo list bound to a sync client
pub struct TodoSession {
    list: TodoList,
    client: SyncClient,
    sequencer: Sequencer,
    last_synced: Option<DateTime<Utc>>,
}

impl TodoSession {
    /// Start with an empty list
    pub fn new(client: SyncClient) -> Self {
        Self {
            list: TodoList::new(),
            client,
            sequencer: Sequencer::default(),
            last_synced: None,
        }
    }

    pub fn list(&self) -> &TodoList {
        &self.list
    }

    /// Local mutations (add/edit/remove) go through the list directly
    pub fn list_mut(&mut self) -> &mut TodoList {
        &mut self.list
    }

    pub fn client(&self) -> &SyncClient {
        &self.client
    }

    /// When the list last matched the server (successful load, save or clear)
    pub fn last_synced(&self) -> Option<DateTime<Utc>> {
        self.last_synced
    }

    // ==================== Load ====================

    /// Issue a load
    pub fn begin_load(&mut self) -> Ticket {
        self.sequencer.issue(Operation::Load)
    }

    /// Apply a load result
    ///
    /// On success the list is replaced and edit mode ends. On failure the
    /// list and cursor are untouched. Returns `None` for a superseded ticket.
    pub fn finish_load(
        &mut self,
        ticket: Ticket,
        result: ClientResult<Vec<String>>,
    ) -> Option<Notice> {
        if !self.accept(ticket) {
            return None;
        }

        Some(match result {
            Ok(items) => {
                let count = items.len();
                self.list.replace_all(items);
                self.last_synced = Some(Utc::now());
                info!("Loaded {} item(s)", count);
                Notice::info("Loaded", format!("{} item(s) loaded from server", count))
            }
            Err(e) => {
                warn!("Load failed: {}", e);
                Notice::error("Load failed", &e)
            }
        })
    }

    /// Load and apply in one step
    pub async fn load(&mut self) -> ClientResult<usize> {
        let ticket = self.begin_load();
        let items = self.client.load().await?;
        let count = items.len();
        self.finish_load(ticket, Ok(items));
        Ok(count)
    }

    // ==================== Save ====================

    /// Issue a save; returns the snapshot to transmit
    pub fn begin_save(&mut self) -> (Ticket, Vec<String>) {
        (self.sequencer.issue(Operation::Save), self.list.snapshot())
    }

    /// Report a save result; the list never changes
    pub fn finish_save(
        &mut self,
        ticket: Ticket,
        result: ClientResult<SaveResponse>,
    ) -> Option<Notice> {
        if !self.accept(ticket) {
            return None;
        }

        Some(match result {
            Ok(response) => {
                self.last_synced = Some(Utc::now());
                info!("Saved {} item(s)", response.saved.len());
                Notice::info(
                    "Sync complete",
                    format!(
                        "{} item(s) uploaded (store: {})",
                        response.saved.len(),
                        response.store_status
                    ),
                )
            }
            Err(e) => {
                warn!("Save failed: {}", e);
                Notice::error("Connection failed", &e)
            }
        })
    }

    /// Save in one step
    pub async fn save(&mut self) -> ClientResult<SaveResponse> {
        let (ticket, items) = self.begin_save();
        let response = self.client.save(&items).await?;
        self.finish_save(ticket, Ok(response.clone()));
        Ok(response)
    }

    // ==================== Clear ====================

    /// Issue a clear
    pub fn begin_clear(&mut self) -> Ticket {
        self.sequencer.issue(Operation::Clear)
    }

    /// Apply a clear result; only success empties the local list
    pub fn finish_clear(
        &mut self,
        ticket: Ticket,
        result: ClientResult<ClearResponse>,
    ) -> Option<Notice> {
        if !self.accept(ticket) {
            return None;
        }

        Some(match result {
            Ok(_) => {
                self.sequencer.record_clear(ticket);
                self.list.clear_local();
                self.last_synced = Some(Utc::now());
                info!("Cleared all items");
                Notice::info("Cleared", "All items removed")
            }
            Err(e) => {
                warn!("Clear failed: {}", e);
                Notice::error("Clear failed", &e)
            }
        })
    }

    /// Clear in one step
    pub async fn clear(&mut self) -> ClientResult<ClearResponse> {
        let ticket = self.begin_clear();
        let response = self.client.clear().await?;
        self.finish_clear(ticket, Ok(response.clone()));
        Ok(response)
    }

    fn accept(&self, ticket: Ticket) -> bool {
        let current = self.sequencer.is_current(ticket);
        if !current {
            debug!("Discarding stale {:?} response #{}", ticket.operation, ticket.seq);
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ErrorBody;

    fn session_with(items: &[&str]) -> TodoSession {
        let client = SyncClient::new("http://127.0.0.1:1").unwrap();
        let mut session = TodoSession::new(client);
        for item in items {
            session.list_mut().add(item).unwrap();
        }
        session
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn server_error(message: &str) -> ClientError {
        ClientError::Server {
            status: 500,
            body: ErrorBody {
                error: message.to_string(),
                solution: Some("Check that the store is running".to_string()),
                ..ErrorBody::default()
            },
        }
    }

    #[test]
    fn test_load_replaces_list_and_ends_edit() {
        let mut session = session_with(&["old"]);
        session.list_mut().edit(0).unwrap();

        let ticket = session.begin_load();
        let notice = session
            .finish_load(ticket, Ok(strings(&["a", "b"])))
            .unwrap();

        assert!(!notice.is_error());
        assert_eq!(session.list().snapshot(), strings(&["a", "b"]));
        assert!(!session.list().is_editing());
        assert!(session.last_synced().is_some());
    }

    #[test]
    fn test_failed_load_leaves_state() {
        let mut session = session_with(&["keep"]);
        session.list_mut().edit(0).unwrap();

        let ticket = session.begin_load();
        let notice = session
            .finish_load(ticket, Err(server_error("Failed to load todos")))
            .unwrap();

        assert!(notice.is_error());
        assert!(notice.message.contains("Failed to load todos"));
        assert!(notice.message.contains("Check that the store is running"));
        assert_eq!(session.list().snapshot(), strings(&["keep"]));
        assert!(session.list().is_editing());
        assert!(session.last_synced().is_none());
    }

    #[test]
    fn test_stale_load_is_discarded() {
        let mut session = session_with(&[]);
        let first = session.begin_load();
        let second = session.begin_load();

        // Second resolves first, then the older response arrives
        assert!(session
            .finish_load(second, Ok(strings(&["newest"])))
            .is_some());
        assert!(session.finish_load(first, Ok(strings(&["stale"]))).is_none());

        assert_eq!(session.list().snapshot(), strings(&["newest"]));
    }

    #[test]
    fn test_load_issued_before_clear_is_discarded() {
        let mut session = session_with(&["a"]);
        let load = session.begin_load();
        let clear = session.begin_clear();

        let cleared = ClearResponse {
            status: "cleared".to_string(),
            store_status: "PONG".to_string(),
        };
        assert!(session.finish_clear(clear, Ok(cleared)).is_some());
        assert!(session.finish_load(load, Ok(strings(&["a"]))).is_none());

        assert!(session.list().is_empty());
    }

    #[test]
    fn test_failed_clear_does_not_discard_pending_load() {
        let mut session = session_with(&[]);
        let load = session.begin_load();
        let clear = session.begin_clear();

        let notice = session
            .finish_clear(clear, Err(server_error("Clear failed")))
            .unwrap();
        assert!(notice.is_error());

        assert!(session
            .finish_load(load, Ok(strings(&["a", "b"])))
            .is_some());
        assert_eq!(session.list().snapshot(), strings(&["a", "b"]));
    }

    #[test]
    fn test_load_finishing_before_clear_is_applied() {
        let mut session = session_with(&[]);
        let load = session.begin_load();
        let clear = session.begin_clear();

        assert!(session.finish_load(load, Ok(strings(&["a"]))).is_some());
        assert_eq!(session.list().len(), 1);

        let cleared = ClearResponse {
            status: "cleared".to_string(),
            store_status: "PONG".to_string(),
        };
        assert!(session.finish_clear(clear, Ok(cleared)).is_some());
        assert!(session.list().is_empty());
    }

    #[test]
    fn test_save_snapshot_and_failure_keeps_items() {
        let mut session = session_with(&["a", "b"]);

        let (ticket, items) = session.begin_save();
        assert_eq!(items, strings(&["a", "b"]));

        let notice = session
            .finish_save(ticket, Err(server_error("Save failed")))
            .unwrap();
        assert!(notice.is_error());
        assert_eq!(notice.title, "Connection failed");
        assert_eq!(session.list().snapshot(), strings(&["a", "b"]));
    }

    #[test]
    fn test_save_success_notice() {
        let mut session = session_with(&["a"]);
        let (ticket, items) = session.begin_save();

        let response = SaveResponse {
            status: "success".to_string(),
            saved: items,
            store_status: "PONG".to_string(),
        };
        let notice = session.finish_save(ticket, Ok(response)).unwrap();

        assert_eq!(notice.title, "Sync complete");
        assert!(notice.message.contains("1 item(s)"));
    }

    #[test]
    fn test_failed_clear_keeps_items() {
        let mut session = session_with(&["a"]);
        let ticket = session.begin_clear();

        let notice = session
            .finish_clear(ticket, Err(server_error("Clear failed")))
            .unwrap();

        assert!(notice.is_error());
        assert_eq!(session.list().len(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_server_leaves_state() {
        let mut session = session_with(&["a", "b"]);

        assert!(session.load().await.is_err());
        assert!(session.save().await.is_err());
        assert!(session.clear().await.is_err());

        assert_eq!(session.list().snapshot(), strings(&["a", "b"]));
    }
}
