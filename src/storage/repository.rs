//! CRUD operations over the appointment table

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use crate::Result;
use crate::appointment::{self, Appointment, AppointmentFields};
use super::schema;
use super::sqlite::Database;

/// Result of a write addressed by key.
///
/// A statement that matches no row is not a failure; callers get
/// `NoMatch` and decide what to tell the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteOutcome {
    Applied,
    NoMatch,
}

impl WriteOutcome {
    fn from_changes(changes: usize) -> Self {
        if changes == 0 {
            WriteOutcome::NoMatch
        } else {
            WriteOutcome::Applied
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, WriteOutcome::Applied)
    }
}

/// Appointment CRUD; each call opens, commits and closes its own connection.
pub struct AppointmentRepository<'a> {
    db: &'a Database,
}

impl<'a> AppointmentRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Every row in key order
    pub fn list_all(&self) -> Result<Vec<Appointment>> {
        self.db.with_connection(|conn| {
            let sql = format!("{} ORDER BY id_consulta", schema::SELECT_APPOINTMENTS);
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], row_to_appointment)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            tracing::debug!("Listed {} appointments", rows.len());
            Ok(rows)
        })
    }

    /// A single row by key
    pub fn get(&self, id: i64) -> Result<Option<Appointment>> {
        self.db.with_connection(|conn| {
            let sql = format!("{} WHERE id_consulta = ?1", schema::SELECT_APPOINTMENTS);
            let found = conn.query_row(&sql, [id], row_to_appointment).optional()?;
            Ok(found)
        })
    }

    /// Insert a new row and return its assigned key
    pub fn insert(&self, fields: &AppointmentFields) -> Result<i64> {
        self.db.with_connection(|conn| {
            insert_fields(conn, fields)?;
            let id = conn.last_insert_rowid();
            tracing::debug!("Inserted appointment {}", id);
            Ok(id)
        })
    }

    /// Overwrite every non-key field of row `id`
    pub fn update(&self, id: i64, fields: &AppointmentFields) -> Result<WriteOutcome> {
        fields.validate()?;
        self.db.with_connection(|conn| {
            let changes = conn.execute(
                schema::UPDATE_APPOINTMENT,
                params![
                    fields.id_paciente,
                    fields.id_medico,
                    fields.data_consulta.map(appointment::format_date),
                    fields.estado,
                    fields.cidade,
                    fields.especialidade,
                    fields.idade_paciente,
                    fields.sexo_paciente,
                    fields.valor_consulta,
                    fields.forma_pagamento,
                    fields.tempo_espera_min,
                    fields.satisfacao_paciente,
                    fields.receita_medicacao,
                    fields.status_consulta,
                    id,
                ],
            )?;
            let outcome = WriteOutcome::from_changes(changes);
            tracing::debug!("Update of appointment {}: {:?}", id, outcome);
            Ok(outcome)
        })
    }

    /// Remove row `id`
    pub fn delete(&self, id: i64) -> Result<WriteOutcome> {
        self.db.with_connection(|conn| {
            let changes = conn.execute(schema::DELETE_APPOINTMENT, [id])?;
            let outcome = WriteOutcome::from_changes(changes);
            tracing::debug!("Delete of appointment {}: {:?}", id, outcome);
            Ok(outcome)
        })
    }
}

/// Bind and run the insert statement on an existing connection or transaction
pub(crate) fn insert_fields(conn: &Connection, fields: &AppointmentFields) -> Result<()> {
    fields.validate()?;
    conn.execute(
        schema::INSERT_APPOINTMENT,
        params![
            fields.id_paciente,
            fields.id_medico,
            fields.data_consulta.map(appointment::format_date),
            fields.estado,
            fields.cidade,
            fields.especialidade,
            fields.idade_paciente,
            fields.sexo_paciente,
            fields.valor_consulta,
            fields.forma_pagamento,
            fields.tempo_espera_min,
            fields.satisfacao_paciente,
            fields.receita_medicacao,
            fields.status_consulta,
        ],
    )?;
    Ok(())
}

/// Helper to convert a row to an Appointment
fn row_to_appointment(row: &rusqlite::Row) -> rusqlite::Result<Appointment> {
    // Unparsable or non-text dates read as absent rather than failing the listing.
    let data_consulta = match row.get_ref(3)? {
        ValueRef::Text(bytes) => std::str::from_utf8(bytes).ok().and_then(appointment::parse_date),
        _ => None,
    };

    Ok(Appointment::new(
        row.get(0)?,
        AppointmentFields {
            id_paciente: row.get(1)?,
            id_medico: row.get(2)?,
            data_consulta,
            estado: row.get(4)?,
            cidade: row.get(5)?,
            especialidade: row.get(6)?,
            idade_paciente: row.get(7)?,
            sexo_paciente: row.get(8)?,
            valor_consulta: row.get(9)?,
            forma_pagamento: row.get(10)?,
            tempo_espera_min: row.get(11)?,
            satisfacao_paciente: row.get(12)?,
            receita_medicacao: row.get(13)?,
            status_consulta: row.get(14)?,
        },
    ))
}
