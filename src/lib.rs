//! Repair AI: multilingual device-repair advice with graceful degradation.
//!
//! The library holds everything the `repair-ai` binary does: translation
//! lookup, the never-fail backend client, confidence presentation, persisted
//! UI state, text-to-speech and a local mock backend.

pub mod analytics;
pub mod api;
pub mod cli;
pub mod config;
pub mod context;
pub mod flow;
pub mod i18n;
pub mod mock;
pub mod presentation;
pub mod speech;
