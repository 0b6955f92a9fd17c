//! Local todo list and edit-mode state
//!
//! Items are addressed by position in the public API, like the list the user
//! sees. Internally each item carries a generated [`ItemId`] and the edit
//! cursor holds that id, so removing another item never retargets a pending
//! edit.
//!
//! ## Edit mode
//!
//! ```text
//! Idle --edit(p)--> Editing(p)
//! Editing --add(text)--> Idle      (commit)
//! Editing --cancel_edit--> Idle
//! Editing --remove(p)--> Idle      (only when p is the edited item)
//! ```

use std::fmt;

use thiserror::Error;
use uuid::Uuid;

/// Stable identifier of a local item; never sent to the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemId(Uuid);

impl ItemId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// A todo item held by the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoItem {
    pub id: ItemId,
    pub text: String,
}

impl TodoItem {
    fn new(text: impl Into<String>) -> Self {
        Self {
            id: ItemId::generate(),
            text: text.into(),
        }
    }
}

/// Local mutations that were refused
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// Text was empty after trimming
    #[error("Cannot add an empty item")]
    EmptyText,

    /// Position does not name an item
    #[error("No item at position {position} (list has {len} item(s))")]
    OutOfRange { position: usize, len: usize },
}

/// Current edit mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    Idle,
    Editing { position: usize },
}

/// What `add` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// Appended at the given position
    Appended { position: usize },
    /// Replaced the text of the item under edit
    Replaced { position: usize, previous: String },
}

/// Ordered todo list with an input buffer and an edit cursor
#[derive(Debug, Clone, Default)]
pub struct TodoList {
    items: Vec<TodoItem>,
    cursor: Option<ItemId>,
    input: String,
}

impl TodoList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a list from snapshot texts
    pub fn from_snapshot(snapshot: Vec<String>) -> Self {
        let mut list = Self::new();
        list.replace_all(snapshot);
        list
    }

    // ==================== Input buffer ====================

    /// Pending input text
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replace the pending input text
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Append a character to the pending input
    pub fn push_input(&mut self, c: char) {
        self.input.push(c);
    }

    /// Remove the last character of the pending input
    pub fn pop_input(&mut self) {
        self.input.pop();
    }

    // ==================== Mutations ====================

    /// Add `text`, or commit it to the item under edit
    ///
    /// The text is trimmed; empty text is refused and nothing changes.
    /// On success the input buffer is cleared and the edit mode is Idle.
    pub fn add(&mut self, text: &str) -> Result<AddOutcome, InputError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(InputError::EmptyText);
        }

        let target = self
            .cursor
            .take()
            .and_then(|id| self.items.iter().position(|item| item.id == id));

        let outcome = match target {
            Some(position) => {
                let previous = std::mem::replace(&mut self.items[position].text, text.to_string());
                AddOutcome::Replaced { position, previous }
            }
            None => {
                self.items.push(TodoItem::new(text));
                AddOutcome::Appended {
                    position: self.items.len() - 1,
                }
            }
        };

        self.input.clear();
        Ok(outcome)
    }

    /// Run `add` on the pending input buffer
    pub fn submit(&mut self) -> Result<AddOutcome, InputError> {
        let text = self.input.clone();
        self.add(&text)
    }

    /// Start editing the item at `position`
    ///
    /// Copies its text into the input buffer; the item itself is unchanged
    /// until the next `add`.
    pub fn edit(&mut self, position: usize) -> Result<(), InputError> {
        let (id, text) = {
            let item = self.get(position)?;
            (item.id, item.text.clone())
        };
        self.input = text;
        self.cursor = Some(id);
        Ok(())
    }

    /// Leave edit mode without committing
    pub fn cancel_edit(&mut self) {
        if self.cursor.take().is_some() {
            self.input.clear();
        }
    }

    /// Remove the item at `position`; later items shift down by one
    ///
    /// Removing the item under edit cancels the edit.
    pub fn remove(&mut self, position: usize) -> Result<String, InputError> {
        let id = self.get(position)?.id;
        let removed = self.items.remove(position);

        if self.cursor == Some(id) {
            self.cancel_edit();
        }
        Ok(removed.text)
    }

    /// Replace every item with a snapshot (successful load)
    pub fn replace_all(&mut self, snapshot: Vec<String>) {
        self.items = snapshot.into_iter().map(TodoItem::new).collect();
        self.cursor = None;
    }

    /// Drop every item (successful clear)
    pub fn clear_local(&mut self) {
        self.items.clear();
        self.cursor = None;
    }

    // ==================== Queries ====================

    /// Current edit mode
    pub fn mode(&self) -> EditMode {
        self.cursor
            .and_then(|id| self.items.iter().position(|item| item.id == id))
            .map_or(EditMode::Idle, |position| EditMode::Editing { position })
    }

    /// Whether an edit is pending
    pub fn is_editing(&self) -> bool {
        matches!(self.mode(), EditMode::Editing { .. })
    }

    /// Item at `position`
    pub fn get(&self, position: usize) -> Result<&TodoItem, InputError> {
        self.items.get(position).ok_or(InputError::OutOfRange {
            position,
            len: self.items.len(),
        })
    }

    /// Position of an item by id
    pub fn position_of(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    /// All items in order
    pub fn items(&self) -> &[TodoItem] {
        &self.items
    }

    /// Item texts in order, as sent to the server
    pub fn snapshot(&self) -> Vec<String> {
        self.items.iter().map(|item| item.text.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_of(items: &[&str]) -> TodoList {
        TodoList::from_snapshot(items.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_add_appends_trimmed() {
        let mut list = TodoList::new();
        list.set_input("  buy milk  ");

        let outcome = list.submit().unwrap();

        assert_eq!(outcome, AddOutcome::Appended { position: 0 });
        assert_eq!(list.snapshot(), vec!["buy milk"]);
        assert!(list.input().is_empty());
    }

    #[test]
    fn test_empty_add_is_noop() {
        let mut list = list_of(&["a"]);
        list.set_input("   ");

        assert_eq!(list.add(""), Err(InputError::EmptyText));
        assert_eq!(list.submit(), Err(InputError::EmptyText));

        assert_eq!(list.len(), 1);
        // Refused input stays in the buffer
        assert_eq!(list.input(), "   ");
    }

    #[test]
    fn test_edit_then_add_commits_in_place() {
        let mut list = list_of(&["a", "b", "c"]);

        list.edit(1).unwrap();
        assert_eq!(list.input(), "b");
        assert_eq!(list.mode(), EditMode::Editing { position: 1 });
        // Editing alone does not touch the items
        assert_eq!(list.snapshot(), vec!["a", "b", "c"]);

        let outcome = list.add("x").unwrap();

        assert_eq!(
            outcome,
            AddOutcome::Replaced {
                position: 1,
                previous: "b".to_string()
            }
        );
        assert_eq!(list.snapshot(), vec!["a", "x", "c"]);
        assert_eq!(list.mode(), EditMode::Idle);
        assert!(list.input().is_empty());
    }

    #[test]
    fn test_empty_commit_keeps_editing() {
        let mut list = list_of(&["a"]);
        list.edit(0).unwrap();

        assert!(list.add("  ").is_err());
        assert_eq!(list.mode(), EditMode::Editing { position: 0 });
        assert_eq!(list.snapshot(), vec!["a"]);
    }

    #[test]
    fn test_edit_out_of_range() {
        let mut list = list_of(&["a"]);
        assert_eq!(
            list.edit(3),
            Err(InputError::OutOfRange { position: 3, len: 1 })
        );
        assert_eq!(list.mode(), EditMode::Idle);
    }

    #[test]
    fn test_cancel_edit() {
        let mut list = list_of(&["a", "b"]);
        list.edit(0).unwrap();

        list.cancel_edit();

        assert_eq!(list.mode(), EditMode::Idle);
        assert!(list.input().is_empty());
        list.add("c").unwrap();
        assert_eq!(list.snapshot(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_cancel_when_idle_keeps_input() {
        let mut list = TodoList::new();
        list.set_input("draft");
        list.cancel_edit();
        assert_eq!(list.input(), "draft");
    }

    #[test]
    fn test_remove_shrinks_and_keeps_order() {
        let mut list = list_of(&["a", "b", "c", "d"]);

        let removed = list.remove(1).unwrap();

        assert_eq!(removed, "b");
        assert_eq!(list.len(), 3);
        assert_eq!(list.snapshot(), vec!["a", "c", "d"]);
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut list = list_of(&["a"]);
        assert!(list.remove(1).is_err());
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_remove_before_edit_target_keeps_target() {
        let mut list = list_of(&["a", "b", "c"]);
        list.edit(2).unwrap();

        list.remove(0).unwrap();

        // Still editing "c", now at position 1
        assert_eq!(list.mode(), EditMode::Editing { position: 1 });
        list.add("z").unwrap();
        assert_eq!(list.snapshot(), vec!["b", "z"]);
    }

    #[test]
    fn test_remove_edit_target_cancels_edit() {
        let mut list = list_of(&["a", "b"]);
        list.edit(1).unwrap();

        list.remove(1).unwrap();

        assert_eq!(list.mode(), EditMode::Idle);
        list.add("c").unwrap();
        assert_eq!(list.snapshot(), vec!["a", "c"]);
    }

    #[test]
    fn test_replace_all_clears_cursor() {
        let mut list = list_of(&["a"]);
        list.edit(0).unwrap();

        list.replace_all(vec!["x".to_string(), "y".to_string()]);

        assert_eq!(list.mode(), EditMode::Idle);
        assert_eq!(list.snapshot(), vec!["x", "y"]);
    }

    #[test]
    fn test_clear_local() {
        let mut list = list_of(&["a", "b"]);
        list.edit(0).unwrap();

        list.clear_local();

        assert!(list.is_empty());
        assert!(!list.is_editing());
    }

    #[test]
    fn test_duplicate_texts_have_distinct_ids() {
        let list = list_of(&["same", "same"]);
        let items = list.items();
        assert_ne!(items[0].id, items[1].id);
        assert_eq!(list.position_of(items[1].id), Some(1));
    }

    #[test]
    fn test_input_editing_helpers() {
        let mut list = TodoList::new();
        list.push_input('h');
        list.push_input('i');
        list.pop_input();
        assert_eq!(list.input(), "h");
    }
}
