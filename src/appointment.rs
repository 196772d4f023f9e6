//! Appointment records
//!
//! `Appointment` is one stored row; `AppointmentFields` is everything except
//! the store-assigned key, which is what insert and update take.

use crate::category::{ConsultationStatus, PaymentMethod, Prescription, Sex};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use crate::{Error, Result};

/// Storage format for `data_consulta`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// All non-key columns of an appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentFields {
    pub id_paciente: i64,
    pub id_medico: i64,
    pub data_consulta: Option<NaiveDate>,
    pub estado: String,
    pub cidade: String,
    pub especialidade: String,
    pub idade_paciente: i64,
    pub sexo_paciente: Sex,
    pub valor_consulta: f64,
    pub forma_pagamento: PaymentMethod,
    pub tempo_espera_min: i64,
    pub satisfacao_paciente: Option<f64>,
    pub receita_medicacao: Prescription,
    pub status_consulta: ConsultationStatus,
}

impl AppointmentFields {
    /// Reject values the store cannot hold faithfully.
    ///
    /// SQLite keeps NaN as NULL, which would make the row unreadable later.
    pub fn validate(&self) -> Result<()> {
        if !self.valor_consulta.is_finite() || self.valor_consulta < 0.0 {
            return Err(Error::InvalidField(format!(
                "valor_consulta must be a non-negative number, got {}",
                self.valor_consulta
            )));
        }
        if let Some(score) = self.satisfacao_paciente {
            if !score.is_finite() {
                return Err(Error::InvalidField(format!(
                    "satisfacao_paciente must be a number, got {}",
                    score
                )));
            }
        }
        Ok(())
    }
}

/// A stored appointment row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id_consulta: i64,
    #[serde(flatten)]
    pub fields: AppointmentFields,
}

impl Appointment {
    pub fn new(id_consulta: i64, fields: AppointmentFields) -> Self {
        Self { id_consulta, fields }
    }

    /// `YYYY-MM` bucket of the appointment date, if it has one
    pub fn month_key(&self) -> Option<String> {
        self.fields.data_consulta.map(|d| d.format("%Y-%m").to_string())
    }
}

impl std::ops::Deref for Appointment {
    type Target = AppointmentFields;

    fn deref(&self) -> &Self::Target {
        &self.fields
    }
}

/// Parse a stored or imported date, tolerating a trailing time component.
///
/// Returns `None` for anything that is not a recognizable date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date()))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S").map(|dt| dt.date()))
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .ok()
}

/// Render a date in storage format
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
