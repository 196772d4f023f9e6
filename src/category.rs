//! Categorical columns - canonical codes and display labels
//!
//! Stored values are unaccented codes; the dashboard shows accented labels.
//! Each column gets its own enum so both directions are exhaustive matches:
//! - `Sex`: M / F / O
//! - `PaymentMethod`: Dinheiro / Cartao / Pix / Convenio
//! - `Prescription`: Sim / Nao
//! - `ConsultationStatus`: realizada / cancelada / nao compareceu

use crate::{Error, Result};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Patient sex (`sexo_paciente`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "O")]
    Other,
}

impl Sex {
    pub const FIELD: &'static str = "sexo_paciente";

    pub fn code(&self) -> &'static str {
        match self {
            Sex::Male => "M",
            Sex::Female => "F",
            Sex::Other => "O",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Sex::Male => "Masculino",
            Sex::Female => "Feminino",
            Sex::Other => "Outro",
        }
    }

    pub fn from_code(code: &str) -> Result<Self> {
        match code {
            "M" => Ok(Sex::Male),
            "F" => Ok(Sex::Female),
            "O" => Ok(Sex::Other),
            _ => Err(unknown(Self::FIELD, code)),
        }
    }

    pub fn from_label(label: &str) -> Result<Self> {
        match label {
            "Masculino" => Ok(Sex::Male),
            "Feminino" => Ok(Sex::Female),
            "Outro" => Ok(Sex::Other),
            _ => Err(unknown(Self::FIELD, label)),
        }
    }

    pub fn all() -> &'static [Sex] {
        &[Sex::Male, Sex::Female, Sex::Other]
    }
}

/// Payment method (`forma_pagamento`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "Dinheiro")]
    Cash,
    #[serde(rename = "Cartao")]
    Card,
    #[serde(rename = "Pix")]
    Pix,
    #[serde(rename = "Convenio")]
    Insurance,
}

impl PaymentMethod {
    pub const FIELD: &'static str = "forma_pagamento";

    pub fn code(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Dinheiro",
            PaymentMethod::Card => "Cartao",
            PaymentMethod::Pix => "Pix",
            PaymentMethod::Insurance => "Convenio",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Dinheiro",
            PaymentMethod::Card => "Cartão",
            PaymentMethod::Pix => "Pix",
            PaymentMethod::Insurance => "Convênio",
        }
    }

    pub fn from_code(code: &str) -> Result<Self> {
        match code {
            "Dinheiro" => Ok(PaymentMethod::Cash),
            "Cartao" => Ok(PaymentMethod::Card),
            "Pix" => Ok(PaymentMethod::Pix),
            "Convenio" => Ok(PaymentMethod::Insurance),
            _ => Err(unknown(Self::FIELD, code)),
        }
    }

    pub fn from_label(label: &str) -> Result<Self> {
        match label {
            "Dinheiro" => Ok(PaymentMethod::Cash),
            "Cartão" => Ok(PaymentMethod::Card),
            "Pix" => Ok(PaymentMethod::Pix),
            "Convênio" => Ok(PaymentMethod::Insurance),
            _ => Err(unknown(Self::FIELD, label)),
        }
    }

    pub fn all() -> &'static [PaymentMethod] {
        &[
            PaymentMethod::Cash,
            PaymentMethod::Card,
            PaymentMethod::Pix,
            PaymentMethod::Insurance,
        ]
    }
}

/// Whether medication was prescribed (`receita_medicacao`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Prescription {
    #[serde(rename = "Sim")]
    Yes,
    #[serde(rename = "Nao")]
    No,
}

impl Prescription {
    pub const FIELD: &'static str = "receita_medicacao";

    pub fn code(&self) -> &'static str {
        match self {
            Prescription::Yes => "Sim",
            Prescription::No => "Nao",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Prescription::Yes => "Sim",
            Prescription::No => "Não",
        }
    }

    pub fn from_code(code: &str) -> Result<Self> {
        match code {
            "Sim" => Ok(Prescription::Yes),
            "Nao" => Ok(Prescription::No),
            _ => Err(unknown(Self::FIELD, code)),
        }
    }

    pub fn from_label(label: &str) -> Result<Self> {
        match label {
            "Sim" => Ok(Prescription::Yes),
            "Não" => Ok(Prescription::No),
            _ => Err(unknown(Self::FIELD, label)),
        }
    }

    pub fn all() -> &'static [Prescription] {
        &[Prescription::Yes, Prescription::No]
    }
}

/// Outcome of the consultation (`status_consulta`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConsultationStatus {
    #[serde(rename = "realizada")]
    Completed,
    #[serde(rename = "cancelada")]
    Cancelled,
    #[serde(rename = "nao compareceu")]
    NoShow,
}

impl ConsultationStatus {
    pub const FIELD: &'static str = "status_consulta";

    pub fn code(&self) -> &'static str {
        match self {
            ConsultationStatus::Completed => "realizada",
            ConsultationStatus::Cancelled => "cancelada",
            ConsultationStatus::NoShow => "nao compareceu",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConsultationStatus::Completed => "Realizada",
            ConsultationStatus::Cancelled => "Cancelada",
            ConsultationStatus::NoShow => "Não compareceu",
        }
    }

    pub fn from_code(code: &str) -> Result<Self> {
        match code {
            "realizada" => Ok(ConsultationStatus::Completed),
            "cancelada" => Ok(ConsultationStatus::Cancelled),
            "nao compareceu" => Ok(ConsultationStatus::NoShow),
            _ => Err(unknown(Self::FIELD, code)),
        }
    }

    pub fn from_label(label: &str) -> Result<Self> {
        match label {
            "Realizada" => Ok(ConsultationStatus::Completed),
            "Cancelada" => Ok(ConsultationStatus::Cancelled),
            "Não compareceu" => Ok(ConsultationStatus::NoShow),
            _ => Err(unknown(Self::FIELD, label)),
        }
    }

    pub fn all() -> &'static [ConsultationStatus] {
        &[
            ConsultationStatus::Completed,
            ConsultationStatus::Cancelled,
            ConsultationStatus::NoShow,
        ]
    }
}

fn unknown(field: &'static str, value: &str) -> Error {
    Error::UnknownCode {
        field,
        value: value.to_string(),
    }
}

/// `FromStr`, `Display` and SQLite conversions shared by every categorical enum.
///
/// Parsing accepts either the stored code or the display label, so CLI users
/// can type whichever they see. `Display` renders the label.
macro_rules! categorical {
    ($($ty:ty),+ $(,)?) => {$(
        impl FromStr for $ty {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                let s = s.trim();
                Self::from_code(s).or_else(|_| Self::from_label(s))
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.label())
            }
        }

        impl ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.code()))
            }
        }

        impl FromSql for $ty {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                let code = value.as_str()?;
                Self::from_code(code).map_err(|e| FromSqlError::Other(Box::new(e)))
            }
        }
    )+};
}

categorical!(Sex, PaymentMethod, Prescription, ConsultationStatus);
