//! CITY PULSE — Multi-source city dashboard and search chatbot
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod providers;
pub mod snapshot;
pub mod chatbot;
pub mod server;
