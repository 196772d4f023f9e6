//! # Healthdash - Medical appointment dashboard
//!
//! Aggregate statistics and record editing over a single table of
//! medical appointments, stored in an embedded SQLite file.
//!
//! Healthdash provides:
//! - Bidirectional code/label enums for every categorical column
//! - Schema bootstrap and scoped, per-operation connections
//! - One-time CSV seed import gated on an empty table
//! - A CRUD repository over the appointment table
//! - Filtering and aggregate statistics for the dashboard view

pub mod category;
pub mod appointment;
pub mod storage;
pub mod seed;
pub mod analytics;
pub mod config;
pub mod ui;
pub mod output;

// Re-exports for convenient access
pub use appointment::{Appointment, AppointmentFields};
pub use category::{ConsultationStatus, PaymentMethod, Prescription, Sex};
pub use storage::{AppointmentRepository, Database, StoreConfig, WriteOutcome};
pub use seed::{SeedImporter, SeedOutcome};

/// Result type alias for Healthdash operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Healthdash operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Malformed seed row at line {line}, column '{column}': {message}")]
    SeedRow {
        line: u64,
        column: &'static str,
        message: String,
    },

    #[error("Unknown {field} value: {value}")]
    UnknownCode { field: &'static str, value: String },

    #[error("Invalid field: {0}")]
    InvalidField(String),
}
