use crate::appointment::Appointment;
use crate::ui::{muted, theme};
use owo_colors::OwoColorize;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Campo")]
    pub metric: String,
    #[tabled(rename = "Valor")]
    pub value: String,
}

pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TableBuilder {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn add_row(&mut self, label: &str, value: &str) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }

    /// Field-by-field view of one record, categorical values shown as labels
    pub fn from_appointment(record: &Appointment) -> Self {
        let mut builder = Self::new();
        builder.add_row("ID da consulta", &record.id_consulta.to_string());
        builder.add_row("Paciente", &record.id_paciente.to_string());
        builder.add_row("Médico", &record.id_medico.to_string());
        builder.add_row("Data", &date_cell(record));
        builder.add_row("Cidade", &format!("{} - {}", record.cidade, record.estado));
        builder.add_row("Especialidade", &record.especialidade);
        builder.add_row("Idade", &record.idade_paciente.to_string());
        builder.add_row("Sexo", record.sexo_paciente.label());
        builder.add_row("Valor", &format!("R$ {:.2}", record.valor_consulta));
        builder.add_row("Forma de pagamento", record.forma_pagamento.label());
        builder.add_row("Tempo de espera (min)", &record.tempo_espera_min.to_string());
        builder.add_row("Satisfação", &satisfaction_cell(record));
        builder.add_row("Receita", record.receita_medicacao.label());
        builder.add_row("Status", record.status_consulta.label());
        builder
    }
}

fn date_cell(record: &Appointment) -> String {
    record
        .data_consulta
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| muted("—"))
}

fn satisfaction_cell(record: &Appointment) -> String {
    record
        .satisfacao_paciente
        .map(|s| format!("{:.1}", s))
        .unwrap_or_else(|| muted("—"))
}

/// Table with arbitrary headers
pub fn grid(headers: &[&str], rows: Vec<Vec<String>>) -> String {
    if rows.is_empty() {
        return String::new();
    }
    let mut builder = Builder::default();
    builder.push_record(headers.iter().map(|h| h.to_string()));
    for row in rows {
        builder.push_record(row);
    }
    builder.build().with(Style::rounded()).to_string()
}

/// Listing of many records, one per line
pub fn records_table(records: &[Appointment]) -> String {
    let rows = records
        .iter()
        .map(|r| {
            vec![
                r.id_consulta.to_string(),
                date_cell(r),
                format!("{} - {}", r.cidade, r.estado),
                r.especialidade.clone(),
                r.idade_paciente.to_string(),
                r.sexo_paciente.code().to_string(),
                format!("{:.2}", r.valor_consulta),
                r.forma_pagamento.label().to_string(),
                r.tempo_espera_min.to_string(),
                satisfaction_cell(r),
                r.receita_medicacao.label().to_string(),
                r.status_consulta
                    .label()
                    .style(theme().status(r.status_consulta))
                    .to_string(),
            ]
        })
        .collect();
    grid(
        &[
            "ID", "Data", "Local", "Especialidade", "Idade", "Sexo", "Valor (R$)",
            "Pagamento", "Espera", "Satisfação", "Receita", "Status",
        ],
        rows,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_contains_cells() {
        let out = grid(&["Estado", "Consultas"], vec![vec!["SP".into(), "12".into()]]);
        assert!(out.contains("Estado"));
        assert!(out.contains("SP"));
        assert!(out.contains("12"));
        assert!(grid(&["A"], Vec::new()).is_empty());
    }

    #[test]
    fn test_empty_builder() {
        assert!(TableBuilder::new().build().is_empty());
    }
}
