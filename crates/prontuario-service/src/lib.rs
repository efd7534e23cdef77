//! # prontuario-service
//!
//! HTTP service for medical-note compilation.
//!
//! This crate exposes the compiler from `prontuario-compiler` over HTTP,
//! together with the medication directory that notes are resolved against:
//!
//! - `POST /process`: compile a note into a record
//! - `POST /medications`, `GET /medications`: manage directory entries
//! - `GET /medications/search/:name`: look up one entry
//!
//! Failures are returned as `{"detail": "..."}`. Notes resolve medications
//! against the local directory unless `PRONTUARIO_REGISTRY_URL` names a
//! remote one.

#![warn(missing_docs)]

pub mod config;
pub mod directory;
pub mod error;
mod server;

pub use config::ServiceConfig;
pub use directory::{MedicationDirectory, SharedDirectory};
pub use error::{ApiError, ErrorBody};
pub use server::{cors_layer, router, serve, AppState, ProcessRequest, SharedCompiler};
