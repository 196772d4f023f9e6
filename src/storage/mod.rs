//! Storage Layer - SQLite-backed persistence
//!
//! A single table holds every record:
//! - consultas(id_consulta, id_paciente, id_medico, data_consulta, ...)
//!
//! `Database` owns the store location and hands out short-lived
//! connections; `AppointmentRepository` runs one statement per connection.

pub mod schema;
pub mod sqlite;
pub mod repository;

pub use sqlite::{Database, StoreConfig};
pub use repository::{AppointmentRepository, WriteOutcome};
