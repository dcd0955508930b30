//! audex - resumable batch audio extraction
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod conversion;
pub mod ledger;
pub mod scanner;
