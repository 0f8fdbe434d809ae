//! Infrastructure adapters. Implement outbound ports.
//!
//! AI backends, SQLite, CSV export, terminal UI. Map errors to DomainError.

pub mod ai;
pub mod classifier;
pub mod export;
pub mod persistence;
pub mod ui;
