//! Request logging and the stats built from it.
//!
//! Log file: `~/.repair-ai/request-log.jsonl` (configurable under
//! `[logging]`).

pub mod logger;
pub mod reporter;
