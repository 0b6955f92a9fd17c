//! Client side of snaplist
//!
//! - `list`: the local ordered list and its edit mode
//! - `sync`: HTTP calls to the snaplist API
//! - `session`: load/save/clear protocol tying the two together

mod error;
mod list;
mod session;
mod sync;

pub use error::{ClientError, ClientResult};
pub use list::{AddOutcome, EditMode, InputError, ItemId, TodoItem, TodoList};
pub use session::{Notice, NoticeLevel, Operation, Ticket, TodoSession};
pub use sync::SyncClient;
