//! snaplist Core Library
//!
//! This crate provides the core functionality for snaplist, a single-user
//! todo list whose whole content is persisted as one snapshot by a small
//! HTTP service.
//!
//! # Architecture
//!
//! - **Store**: a key-value backend holding the JSON snapshot under one key
//! - **Server** (separate crate): load/save/clear over HTTP
//! - **Client**: local list with edit mode, synced on explicit request
//!
//! The local list and the stored snapshot only meet on load, save and
//! clear; there is no continuous sync.
//!
//! # Quick Start
//!
//! ```text
//! let client = SyncClient::new("http://127.0.0.1:3001")?;
//! let mut session = TodoSession::new(client);
//! session.load().await?;
//!
//! session.list_mut().add("Buy milk")?;
//! session.save().await?;
//! ```
//!
//! # Modules
//!
//! - `api`: HTTP wire types shared with the server
//! - `client`: local list, sync client and session
//! - `config`: Application configuration
//! - `snapshot`: snapshot encoding and save-payload normalization
//! - `store`: key-value backends and the snapshot store

pub mod api;
pub mod client;
pub mod config;
pub mod snapshot;
pub mod store;

pub use client::{SyncClient, TodoList, TodoSession};
pub use config::Config;
pub use snapshot::ValidationError;
pub use store::{KeyValueStore, SnapshotStore, StoreError};
