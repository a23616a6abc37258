//! Domain services used by websocket and HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own routing decisions, persistence, and credential
//! checks so route handlers stay focused on protocol translation.

pub mod auth;
pub mod persistence;
pub mod router;
pub mod store;
