//! Modules layer - Infrastructure components for external integrations
//!
//! Contains the file store, the content parser and the notification backends.

pub mod notifier;
pub mod parser;
pub mod storage;
