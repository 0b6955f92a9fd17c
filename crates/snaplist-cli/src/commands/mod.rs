//! One-shot command handlers

pub mod config;
pub mod status;
pub mod todo;
