//! Version-control history access
//!
//! Reads per-file `git log` text and parses it into revisions.

/// Log splitting and revision parsing
pub mod log;
/// Providers of raw per-file history
pub mod provider;

pub use log::{Revision, parse_log, parse_revision, split_log};
pub use provider::{GitCliHistory, HistoryProvider};
