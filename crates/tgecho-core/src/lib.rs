//! Core domain + relay logic for tgecho.
//!
//! This crate is intentionally framework-agnostic. The Telegram long-poll feed and
//! document delivery live behind ports (traits) implemented in the adapter crate.

pub mod classify;
pub mod config;
pub mod document;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod ports;
pub mod relay;
pub mod update;

pub use errors::{Error, Result};
