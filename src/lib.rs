//! Koffan - shared shopping lists
//!
//! This crate provides the backend of Koffan and the `koffan` CLI.
//!
//! # Architecture
//!
//! - [`api`] - Request handlers (lists, sections, items, history, templates, transfer)
//! - [`broadcast`] - Live-update fan-out to connected clients
//! - [`cli`] - Command-line interface using clap
//! - [`model`] - Data types (List, Section, Item, HistoryEntry, Template)
//! - [`storage`] - SQLite database layer
//! - [`transfer`] - JSON/CSV import and export
//! - [`release`] - Update check against published releases
//! - [`config`] - Configuration management
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod broadcast;
pub mod cli;
pub mod config;
pub mod error;
pub mod i18n;
pub mod model;
pub mod release;
pub mod storage;
pub mod transfer;
pub mod validate;

pub use error::{Error, Result};
