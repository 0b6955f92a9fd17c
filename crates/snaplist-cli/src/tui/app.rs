//! Application state and logic

use std::time::{Duration, Instant};

use snaplist_core::api::{ClearResponse, SaveResponse};
use snaplist_core::client::{AddOutcome, ClientResult, EditMode, InputError, Notice, Ticket};
use snaplist_core::TodoSession;

/// Input mode for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Normal navigation mode
    Normal,
    /// Typing into the input line (new item or edit)
    Insert,
}

/// Sync status indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncIndicator {
    /// Nothing sent yet
    Idle,
    /// A request is in flight
    Syncing,
    /// Last request succeeded
    Synced,
    /// Last request failed
    Error,
}

/// Remote call to run in the background
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Load(Ticket),
    Save(Ticket, Vec<String>),
    Clear(Ticket),
}

/// Result of a background call, handed back to the event loop
#[derive(Debug)]
pub enum Completion {
    Load(Ticket, ClientResult<Vec<String>>),
    Save(Ticket, ClientResult<SaveResponse>),
    Clear(Ticket, ClientResult<ClearResponse>),
}

/// Window for the second `X` of a clear
const CLEAR_CONFIRM_WINDOW: Duration = Duration::from_millis(1000);

/// Application state
pub struct App {
    /// Whether the app should exit
    pub should_quit: bool,
    /// Current input mode
    pub input_mode: InputMode,
    /// Local list and sync protocol
    pub session: TodoSession,
    /// Currently selected item index
    pub selected: usize,
    /// Status message to display temporarily
    pub status_message: Option<String>,
    /// When the status message was set (for auto-dismiss)
    pub status_message_time: Option<Instant>,
    /// Failed remote call shown as a modal until dismissed
    pub notice: Option<Notice>,
    /// Whether help overlay is visible
    pub show_help: bool,
    /// Sync status indicator
    pub sync_status: SyncIndicator,
    /// Outcome of the last applied result, shown once nothing is in flight
    last_outcome: SyncIndicator,
    /// Requests sent but not yet answered
    pub in_flight: usize,
    /// First `X` keypress of the clear sequence (with timestamp)
    pub pending_clear: Option<Instant>,
}

impl App {
    pub fn new(session: TodoSession) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            session,
            selected: 0,
            status_message: None,
            status_message_time: None,
            notice: None,
            show_help: false,
            sync_status: SyncIndicator::Idle,
            last_outcome: SyncIndicator::Idle,
            in_flight: 0,
            pending_clear: None,
        }
    }

    /// Set a status message (will auto-dismiss after 3 seconds)
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_message_time = Some(Instant::now());
    }

    /// Check and clear expired status message
    pub fn check_status_timeout(&mut self) {
        if let Some(time) = self.status_message_time {
            if time.elapsed() > Duration::from_secs(3) {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    pub fn has_notice(&self) -> bool {
        self.notice.is_some()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Toggle help overlay
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    // ==================== Navigation ====================

    pub fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.selected < self.session.list().len().saturating_sub(1) {
            self.selected += 1;
        }
    }

    /// Keep the selection inside the list after it shrinks or is replaced
    fn clamp_selection(&mut self) {
        let len = self.session.list().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    /// Position of the item under edit, if any
    pub fn editing_position(&self) -> Option<usize> {
        match self.session.list().mode() {
            EditMode::Editing { position } => Some(position),
            EditMode::Idle => None,
        }
    }

    // ==================== Local edits ====================

    /// Start typing a new item
    pub fn start_insert(&mut self) {
        self.session.list_mut().cancel_edit();
        self.input_mode = InputMode::Insert;
    }

    /// Start editing the selected item
    pub fn start_edit(&mut self) {
        match self.session.list_mut().edit(self.selected) {
            Ok(()) => self.input_mode = InputMode::Insert,
            Err(e) => self.set_status(e.to_string()),
        }
    }

    pub fn insert_char(&mut self, c: char) {
        self.session.list_mut().push_input(c);
    }

    pub fn delete_char(&mut self) {
        self.session.list_mut().pop_input();
    }

    /// Commit the input line
    ///
    /// Empty input keeps the input line open and changes nothing.
    pub fn submit(&mut self) {
        match self.session.list_mut().submit() {
            Ok(AddOutcome::Appended { position }) => {
                self.selected = position;
                self.input_mode = InputMode::Normal;
                self.set_status(format!("Added #{} (s to save)", position + 1));
            }
            Ok(AddOutcome::Replaced { position, .. }) => {
                self.selected = position;
                self.input_mode = InputMode::Normal;
                self.set_status(format!("Updated #{} (s to save)", position + 1));
            }
            Err(InputError::EmptyText) => {
                self.set_status("Type something first");
            }
            Err(e) => self.set_status(e.to_string()),
        }
    }

    /// Leave the input line, dropping any pending edit
    pub fn cancel_input(&mut self) {
        let list = self.session.list_mut();
        list.cancel_edit();
        list.set_input(String::new());
        self.input_mode = InputMode::Normal;
    }

    /// Remove the selected item
    pub fn remove_selected(&mut self) {
        match self.session.list_mut().remove(self.selected) {
            Ok(text) => {
                self.clamp_selection();
                self.set_status(format!("Removed: {} (s to save)", text));
            }
            Err(e) => self.set_status(e.to_string()),
        }
    }

    // ==================== Remote calls ====================

    pub fn request_load(&mut self) -> Request {
        self.mark_sent();
        Request::Load(self.session.begin_load())
    }

    pub fn request_save(&mut self) -> Request {
        self.mark_sent();
        let (ticket, items) = self.session.begin_save();
        Request::Save(ticket, items)
    }

    /// Handle `X`; returns a clear request on the second press in the window
    pub fn request_clear(&mut self) -> Option<Request> {
        let confirmed = self
            .pending_clear
            .take()
            .is_some_and(|first| first.elapsed() <= CLEAR_CONFIRM_WINDOW);

        if !confirmed {
            self.pending_clear = Some(Instant::now());
            self.set_status("Press X again to clear the server list");
            return None;
        }

        self.mark_sent();
        Some(Request::Clear(self.session.begin_clear()))
    }

    fn mark_sent(&mut self) {
        self.in_flight += 1;
        self.sync_status = SyncIndicator::Syncing;
    }

    /// Apply a background result
    ///
    /// Stale results are dropped by the session without touching the list.
    pub fn apply(&mut self, completion: Completion) {
        self.in_flight = self.in_flight.saturating_sub(1);

        let notice = match completion {
            Completion::Load(ticket, result) => self.session.finish_load(ticket, result),
            Completion::Save(ticket, result) => self.session.finish_save(ticket, result),
            Completion::Clear(ticket, result) => self.session.finish_clear(ticket, result),
        };

        if let Some(notice) = notice {
            if notice.is_error() {
                self.last_outcome = SyncIndicator::Error;
                self.notice = Some(notice);
            } else {
                self.last_outcome = SyncIndicator::Synced;
                self.set_status(format!("{}: {}", notice.title, notice.message));
            }
        }

        self.sync_status = if self.in_flight > 0 {
            SyncIndicator::Syncing
        } else {
            self.last_outcome
        };
        self.clamp_selection();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snaplist_core::api::ErrorBody;
    use snaplist_core::client::ClientError;
    use snaplist_core::SyncClient;

    fn app_with(items: &[&str]) -> App {
        let client = SyncClient::new("http://127.0.0.1:1").unwrap();
        let mut app = App::new(TodoSession::new(client));
        for item in items {
            app.session.list_mut().add(item).unwrap();
        }
        app
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.insert_char(c);
        }
    }

    #[test]
    fn test_insert_and_submit() {
        let mut app = app_with(&[]);
        app.start_insert();
        type_text(&mut app, "Buy milk");
        app.submit();

        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.session.list().snapshot(), vec!["Buy milk"]);
        assert_eq!(app.session.list().input(), "");
    }

    #[test]
    fn test_empty_submit_stays_in_insert() {
        let mut app = app_with(&["a"]);
        app.start_insert();
        type_text(&mut app, "   ");
        app.submit();

        assert_eq!(app.input_mode, InputMode::Insert);
        assert_eq!(app.session.list().len(), 1);
    }

    #[test]
    fn test_edit_selected_then_commit() {
        let mut app = app_with(&["a", "b"]);
        app.move_down();
        app.start_edit();
        assert_eq!(app.editing_position(), Some(1));
        assert_eq!(app.session.list().input(), "b");

        app.delete_char();
        type_text(&mut app, "bee");
        app.submit();

        assert_eq!(app.session.list().snapshot(), vec!["a", "bee"]);
        assert_eq!(app.editing_position(), None);
    }

    #[test]
    fn test_cancel_input_discards_edit() {
        let mut app = app_with(&["a"]);
        app.start_edit();
        type_text(&mut app, "zzz");
        app.cancel_input();

        assert_eq!(app.session.list().snapshot(), vec!["a"]);
        assert_eq!(app.session.list().input(), "");
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_remove_last_clamps_selection() {
        let mut app = app_with(&["a", "b"]);
        app.move_down();
        app.remove_selected();

        assert_eq!(app.selected, 0);
        assert_eq!(app.session.list().snapshot(), vec!["a"]);
    }

    #[test]
    fn test_remove_on_empty_list_sets_status() {
        let mut app = app_with(&[]);
        app.remove_selected();
        assert!(app.status_message.is_some());
    }

    #[test]
    fn test_clear_needs_confirmation() {
        let mut app = app_with(&["a"]);
        assert!(app.request_clear().is_none());
        assert!(matches!(app.request_clear(), Some(Request::Clear(_))));
        assert_eq!(app.in_flight, 1);
    }

    #[test]
    fn test_load_completion_replaces_list() {
        let mut app = app_with(&["old", "older", "oldest"]);
        app.selected = 2;

        let Request::Load(ticket) = app.request_load() else {
            panic!("expected load request");
        };
        app.apply(Completion::Load(ticket, Ok(vec!["new".to_string()])));

        assert_eq!(app.session.list().snapshot(), vec!["new"]);
        assert_eq!(app.selected, 0);
        assert_eq!(app.sync_status, SyncIndicator::Synced);
        assert_eq!(app.in_flight, 0);
    }

    #[test]
    fn test_failed_save_shows_notice_and_keeps_list() {
        let mut app = app_with(&["a"]);
        let Request::Save(ticket, items) = app.request_save() else {
            panic!("expected save request");
        };
        assert_eq!(items, vec!["a"]);

        let err = ClientError::Server {
            status: 500,
            body: ErrorBody {
                error: "Save failed".to_string(),
                ..ErrorBody::default()
            },
        };
        app.apply(Completion::Save(ticket, Err(err)));

        assert!(app.has_notice());
        assert_eq!(app.sync_status, SyncIndicator::Error);
        assert_eq!(app.session.list().snapshot(), vec!["a"]);
    }

    #[test]
    fn test_stale_load_is_ignored() {
        let mut app = app_with(&[]);
        let Request::Load(first) = app.request_load() else {
            panic!("expected load request");
        };
        let Request::Load(second) = app.request_load() else {
            panic!("expected load request");
        };

        app.apply(Completion::Load(second, Ok(vec!["fresh".to_string()])));
        app.apply(Completion::Load(first, Ok(vec!["stale".to_string()])));

        assert_eq!(app.session.list().snapshot(), vec!["fresh"]);
        assert_eq!(app.in_flight, 0);
    }

    #[test]
    fn test_stale_last_completion_settles_indicator() {
        let mut app = app_with(&[]);
        let Request::Load(first) = app.request_load() else {
            panic!("expected load request");
        };
        let Request::Load(second) = app.request_load() else {
            panic!("expected load request");
        };

        app.apply(Completion::Load(second, Ok(vec!["fresh".to_string()])));
        assert_eq!(app.sync_status, SyncIndicator::Syncing);

        app.apply(Completion::Load(first, Ok(vec!["stale".to_string()])));
        assert_eq!(app.in_flight, 0);
        assert_eq!(app.sync_status, SyncIndicator::Synced);
    }

    #[test]
    fn test_stale_completion_keeps_last_error() {
        let mut app = app_with(&[]);
        let Request::Load(first) = app.request_load() else {
            panic!("expected load request");
        };
        let Request::Load(second) = app.request_load() else {
            panic!("expected load request");
        };

        let failure = ClientError::Server {
            status: 500,
            body: ErrorBody {
                error: "Failed to load todos".to_string(),
                ..ErrorBody::default()
            },
        };
        app.apply(Completion::Load(second, Err(failure)));
        app.apply(Completion::Load(first, Ok(vec!["stale".to_string()])));

        assert_eq!(app.sync_status, SyncIndicator::Error);
        assert!(app.session.list().is_empty());
    }
}
