//! Row filters for the dashboard view

use std::collections::BTreeSet;
use chrono::Datelike;
use serde::Serialize;
use crate::appointment::Appointment;

/// Dashboard filter. An empty set places no restriction on its dimension.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    pub states: BTreeSet<String>,
    pub specialties: BTreeSet<String>,
    /// 1 = January
    pub months: BTreeSet<u32>,
    pub years: BTreeSet<i32>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
            && self.specialties.is_empty()
            && self.months.is_empty()
            && self.years.is_empty()
    }

    /// Whether a single row passes every active restriction.
    ///
    /// Rows without a date never pass an active month or year restriction.
    pub fn matches(&self, row: &Appointment) -> bool {
        if !self.states.is_empty() && !self.states.contains(&row.estado) {
            return false;
        }
        if !self.specialties.is_empty() && !self.specialties.contains(&row.especialidade) {
            return false;
        }
        if !self.months.is_empty()
            && !row.data_consulta.is_some_and(|d| self.months.contains(&d.month()))
        {
            return false;
        }
        if !self.years.is_empty()
            && !row.data_consulta.is_some_and(|d| self.years.contains(&d.year()))
        {
            return false;
        }
        true
    }

    pub fn apply<'a>(&self, rows: &'a [Appointment]) -> Vec<&'a Appointment> {
        rows.iter().filter(|row| self.matches(row)).collect()
    }
}

/// Distinct values available to filter on
#[derive(Debug, Clone, Default, Serialize)]
pub struct FilterOptions {
    pub states: Vec<String>,
    pub specialties: Vec<String>,
    pub years: Vec<i32>,
}

impl FilterOptions {
    pub fn from_rows(rows: &[Appointment]) -> Self {
        let states: BTreeSet<_> = rows.iter().map(|r| r.estado.clone()).collect();
        let specialties: BTreeSet<_> = rows.iter().map(|r| r.especialidade.clone()).collect();
        let years: BTreeSet<_> = rows
            .iter()
            .filter_map(|r| r.data_consulta.map(|d| d.year()))
            .collect();

        Self {
            states: states.into_iter().collect(),
            specialties: specialties.into_iter().collect(),
            years: years.into_iter().collect(),
        }
    }
}
