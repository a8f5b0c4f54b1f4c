//! Transit chat backend-for-frontend.
//!
//! Relays chat and trip-planning prompts to a hosted LLM, and serves GTFS
//! transit stops loaded once from a local file or a remote feed.

pub mod chat;
pub mod config;
pub mod stops;
pub mod web;
