//! Web layer for the transit chat BFF.
//!
//! Provides HTTP endpoints for stop lookup and the LLM chat relay.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
