//! # Habitta Common Library
//!
//! Shared code for the Habitta backend services including:
//! - Database initialization, schema, and models
//! - Event types (HabittaEvent enum) and SSE utilities
//! - Configuration loading and root folder resolution
//! - Global runtime parameters backed by the settings table

pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod params;
pub mod sse;

pub use error::{Error, Result};
pub use events::HabittaEvent;
