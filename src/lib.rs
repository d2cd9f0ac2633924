// src/lib.rs

//! Study-abroad catalogue data layer
//!
//! Loads course and blog data from the catalogue API without letting a
//! bad record or a flaky upstream take the site down: payloads are
//! validated, transient failures retried, failing upstreams fenced off
//! by per-resource circuit breakers, and every failure logged.

pub mod config;
pub mod error;
pub mod loader;
pub mod logging;
pub mod models;
pub mod sanitize;
pub mod services;
pub mod utils;
pub mod validation;
