//! Seed import - one-time bulk load from a CSV dataset
//!
//! Runs only against an empty table. Every row is coerced before anything
//! is written; one bad row aborts the whole import and leaves the table
//! untouched.

use std::io::Read;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use crate::appointment::{self, AppointmentFields};
use crate::category::{ConsultationStatus, PaymentMethod, Prescription, Sex};
use crate::storage::repository::insert_fields;
use crate::storage::{Database, schema};
use crate::{Error, Result};

/// Default seed dataset, relative to the working directory
pub const DEFAULT_SEED_CSV: &str = "data/dataset_saude.csv";

/// What `seed_if_empty` did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum SeedOutcome {
    /// Table already had rows; nothing was read or written
    Skipped { existing: usize },
    /// Table was empty and `rows` records were loaded
    Imported { rows: usize },
}

impl std::fmt::Display for SeedOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeedOutcome::Skipped { existing } => {
                write!(f, "Seed skipped: table already holds {} rows", existing)
            }
            SeedOutcome::Imported { rows } => write!(f, "Seeded {} rows", rows),
        }
    }
}

/// Raw CSV row, matched to columns by header name
#[derive(Debug, Deserialize)]
struct SeedRecord {
    id_paciente: String,
    id_medico: String,
    data_consulta: String,
    estado: String,
    cidade: String,
    especialidade: String,
    idade_paciente: String,
    sexo_paciente: String,
    valor_consulta: String,
    forma_pagamento: String,
    tempo_espera_min: String,
    satisfacao_paciente: String,
    receita_medicacao: String,
    status_consulta: String,
}

/// Loads the seed dataset into an empty store
pub struct SeedImporter<'a> {
    db: &'a Database,
    source: PathBuf,
}

impl<'a> SeedImporter<'a> {
    pub fn new(db: &'a Database, source: impl Into<PathBuf>) -> Self {
        Self {
            db,
            source: source.into(),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Ensure the schema exists, then seed if the table is empty
    pub fn bootstrap(&self) -> Result<SeedOutcome> {
        self.db.ensure_schema()?;
        self.seed_if_empty()
    }

    /// Import the dataset if and only if the table has no rows
    pub fn seed_if_empty(&self) -> Result<SeedOutcome> {
        let existing = self.db.count()?;
        if existing > 0 {
            tracing::debug!("Skipping seed import, {} rows present", existing);
            return Ok(SeedOutcome::Skipped { existing });
        }

        tracing::info!("Importing seed data from {}", self.source.display());
        let file = std::fs::File::open(&self.source)?;
        let rows = parse_csv(file)?;
        let imported = self.import_rows(&rows)?;
        tracing::info!("Imported {} seed rows", imported);
        Ok(SeedOutcome::Imported { rows: imported })
    }

    /// Insert `rows` in a single transaction
    pub fn import_rows(&self, rows: &[AppointmentFields]) -> Result<usize> {
        self.db.with_connection(|conn| {
            let tx = conn.transaction()?;
            for fields in rows {
                insert_fields(&tx, fields)?;
            }
            tx.commit()?;
            Ok(rows.len())
        })
    }
}

/// Read and coerce every row of a seed CSV.
///
/// Fails on the first malformed row; no partial result is returned.
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<AppointmentFields>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = reader.headers()?.clone();

    for column in schema::FIELD_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(Error::SeedRow {
                line: 1,
                column,
                message: "missing column in header".to_string(),
            });
        }
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let raw: SeedRecord = record.deserialize(Some(&headers))?;
        rows.push(coerce_record(raw, line)?);
    }
    Ok(rows)
}

fn coerce_record(raw: SeedRecord, line: u64) -> Result<AppointmentFields> {
    let data_consulta = appointment::parse_date(&raw.data_consulta);
    if data_consulta.is_none() && !raw.data_consulta.is_empty() {
        tracing::warn!(
            "Line {}: unparsable date '{}' stored as NULL",
            line,
            raw.data_consulta
        );
    }

    Ok(AppointmentFields {
        id_paciente: parse_int(&raw.id_paciente, "id_paciente", line)?,
        id_medico: parse_int(&raw.id_medico, "id_medico", line)?,
        data_consulta,
        estado: raw.estado,
        cidade: raw.cidade,
        especialidade: raw.especialidade,
        idade_paciente: parse_int(&raw.idade_paciente, "idade_paciente", line)?,
        sexo_paciente: parse_code(Sex::from_code(&raw.sexo_paciente), Sex::FIELD, line)?,
        valor_consulta: parse_decimal(&raw.valor_consulta, "valor_consulta", line)?,
        forma_pagamento: parse_code(
            PaymentMethod::from_code(&raw.forma_pagamento),
            PaymentMethod::FIELD,
            line,
        )?,
        tempo_espera_min: parse_int(&raw.tempo_espera_min, "tempo_espera_min", line)?,
        satisfacao_paciente: parse_optional_decimal(
            &raw.satisfacao_paciente,
            "satisfacao_paciente",
            line,
        )?,
        receita_medicacao: parse_code(
            Prescription::from_code(&raw.receita_medicacao),
            Prescription::FIELD,
            line,
        )?,
        status_consulta: parse_code(
            ConsultationStatus::from_code(&raw.status_consulta),
            ConsultationStatus::FIELD,
            line,
        )?,
    })
}

fn row_error(line: u64, column: &'static str, message: String) -> Error {
    Error::SeedRow {
        line,
        column,
        message,
    }
}

/// Integers may arrive as `34` or, from spreadsheet exports, `34.0`
fn parse_int(raw: &str, column: &'static str, line: u64) -> Result<i64> {
    if let Ok(value) = raw.parse::<i64>() {
        return Ok(value);
    }
    match raw.parse::<f64>() {
        Ok(value)
            if value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 =>
        {
            Ok(value as i64)
        }
        _ => Err(row_error(line, column, format!("expected an integer, got '{}'", raw))),
    }
}

fn parse_decimal(raw: &str, column: &'static str, line: u64) -> Result<f64> {
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(row_error(line, column, format!("expected a number, got '{}'", raw))),
    }
}

fn parse_optional_decimal(raw: &str, column: &'static str, line: u64) -> Result<Option<f64>> {
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") || raw.eq_ignore_ascii_case("null") {
        return Ok(None);
    }
    parse_decimal(raw, column, line).map(Some)
}

fn parse_code<T>(parsed: Result<T>, column: &'static str, line: u64) -> Result<T> {
    parsed.map_err(|e| row_error(line, column, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{AppointmentRepository, StoreConfig};
    use chrono::NaiveDate;
    use std::io::Write;

    const HEADER: &str = "id_paciente,id_medico,data_consulta,estado,cidade,especialidade,idade_paciente,sexo_paciente,valor_consulta,forma_pagamento,tempo_espera_min,satisfacao_paciente,receita_medicacao,status_consulta";

    fn csv_with(rows: &[&str]) -> String {
        let mut out = String::from(HEADER);
        for row in rows {
            out.push('\n');
            out.push_str(row);
        }
        out.push('\n');
        out
    }

    fn write_csv(dir: &Path, contents: &str) -> PathBuf {
        let path = dir.join("seed.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    fn fresh_db(dir: &Path) -> Database {
        let db = Database::new(StoreConfig::new(dir.join("store.db")));
        db.ensure_schema().unwrap();
        db
    }

    const GOOD_ROWS: [&str; 3] = [
        "1001,3,2023-04-12,SP,São Paulo,Cardiologia,61,M,300.0,Cartao,20,4.0,Sim,realizada",
        "1002,5,2024-01-30,RJ,Niterói,Pediatria,8,F,180.5,Pix,35,,Nao,nao compareceu",
        "1003,2,2025-07-01 00:00:00,MG,Belo Horizonte,Dermatologia,33.0,O,220,Convenio,10,3.5,Sim,cancelada",
    ];

    #[test]
    fn test_parse_csv_coerces_types() {
        let rows = parse_csv(csv_with(&GOOD_ROWS).as_bytes()).unwrap();
        assert_eq!(rows.len(), 3);

        assert_eq!(rows[0].id_paciente, 1001);
        assert_eq!(rows[0].data_consulta, NaiveDate::from_ymd_opt(2023, 4, 12));
        assert_eq!(rows[0].sexo_paciente, Sex::Male);
        assert_eq!(rows[0].forma_pagamento, PaymentMethod::Card);
        assert_eq!(rows[0].satisfacao_paciente, Some(4.0));

        assert_eq!(rows[1].satisfacao_paciente, None);
        assert_eq!(rows[1].status_consulta, ConsultationStatus::NoShow);
        assert_eq!(rows[1].receita_medicacao, Prescription::No);

        assert_eq!(rows[2].idade_paciente, 33);
        assert_eq!(rows[2].data_consulta, NaiveDate::from_ymd_opt(2025, 7, 1));
        assert_eq!(rows[2].valor_consulta, 220.0);
    }

    #[test]
    fn test_bundled_dataset_parses() {
        let rows = parse_csv(include_str!("../data/dataset_saude.csv").as_bytes()).unwrap();
        assert_eq!(rows.len(), 16);
        assert!(rows.iter().all(|r| r.data_consulta.is_some()));
        assert_eq!(rows.iter().filter(|r| r.satisfacao_paciente.is_none()).count(), 2);
    }

    #[test]
    fn test_columns_matched_by_header_name() {
        let csv = "status_consulta,receita_medicacao,satisfacao_paciente,tempo_espera_min,forma_pagamento,valor_consulta,sexo_paciente,idade_paciente,especialidade,cidade,estado,data_consulta,id_medico,id_paciente\n\
                   realizada,Sim,5,12,Dinheiro,90,F,40,Clínica Geral,Recife,PE,2024-02-02,9,2001\n";
        let rows = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(rows[0].id_paciente, 2001);
        assert_eq!(rows[0].id_medico, 9);
        assert_eq!(rows[0].cidade, "Recife");
    }

    #[test]
    fn test_unparsable_date_becomes_null() {
        let csv = csv_with(&["1001,3,someday,SP,Santos,Cardiologia,61,M,300,Cartao,20,4,Sim,realizada"]);
        let rows = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(rows[0].data_consulta, None);
    }

    #[test]
    fn test_malformed_row_is_fatal() {
        let csv = csv_with(&[
            GOOD_ROWS[0],
            "1002,5,2024-01-30,RJ,Niterói,Pediatria,eight,F,180.5,Pix,35,,Nao,realizada",
        ]);
        let err = parse_csv(csv.as_bytes()).unwrap_err();
        match err {
            Error::SeedRow { line, column, .. } => {
                assert_eq!(line, 3);
                assert_eq!(column, "idade_paciente");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_out_of_range_integer_is_fatal() {
        let csv = csv_with(&["1e20,3,2023-04-12,SP,Santos,Cardiologia,61,M,300,Cartao,20,4,Sim,realizada"]);
        let err = parse_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::SeedRow { line: 2, column: "id_paciente", .. }));
    }

    #[test]
    fn test_satisfaction_column_is_required() {
        let header = HEADER.replace(",satisfacao_paciente", "");
        let csv = format!("{}\n1001,3,2023-04-12,SP,Santos,Cardiologia,61,M,300,Cartao,20,Sim,realizada\n", header);
        let err = parse_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::SeedRow { line: 1, column: "satisfacao_paciente", .. }));
    }

    #[test]
    fn test_negative_price_aborts_import() {
        let dir = tempfile::tempdir().unwrap();
        let db = fresh_db(dir.path());
        let source = write_csv(
            dir.path(),
            &csv_with(&[GOOD_ROWS[0], "1002,5,2024-01-30,RJ,Niterói,Pediatria,8,F,-180.5,Pix,35,,Nao,realizada"]),
        );

        let importer = SeedImporter::new(&db, &source);
        assert!(matches!(importer.seed_if_empty(), Err(Error::InvalidField(_))));
        assert_eq!(db.count().unwrap(), 0);
    }

    #[test]
    fn test_unknown_code_is_fatal() {
        let csv = csv_with(&["1001,3,2023-04-12,SP,Santos,Cardiologia,61,M,300,Boleto,20,4,Sim,realizada"]);
        let err = parse_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::SeedRow { column: "forma_pagamento", .. }));
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let csv = "id_paciente,id_medico\n1,2\n";
        let err = parse_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::SeedRow { line: 1, column: "data_consulta", .. }));
    }

    #[test]
    fn test_seed_if_empty_imports_once() {
        let dir = tempfile::tempdir().unwrap();
        let db = fresh_db(dir.path());
        let source = write_csv(dir.path(), &csv_with(&GOOD_ROWS));
        let importer = SeedImporter::new(&db, &source);

        assert_eq!(importer.seed_if_empty().unwrap(), SeedOutcome::Imported { rows: 3 });
        assert_eq!(importer.seed_if_empty().unwrap(), SeedOutcome::Skipped { existing: 3 });
        assert_eq!(db.count().unwrap(), 3);
    }

    #[test]
    fn test_seed_skips_non_empty_table_without_reading_source() {
        let dir = tempfile::tempdir().unwrap();
        let db = fresh_db(dir.path());
        let rows = parse_csv(csv_with(&GOOD_ROWS[..1]).as_bytes()).unwrap();
        AppointmentRepository::new(&db).insert(&rows[0]).unwrap();

        let importer = SeedImporter::new(&db, dir.path().join("does-not-exist.csv"));
        assert_eq!(importer.seed_if_empty().unwrap(), SeedOutcome::Skipped { existing: 1 });
        assert_eq!(db.count().unwrap(), 1);
    }

    #[test]
    fn test_failed_import_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let db = fresh_db(dir.path());
        let source = write_csv(
            dir.path(),
            &csv_with(&[GOOD_ROWS[0], "1002,5,2024-01-30,RJ,Niterói,Pediatria,8,X,180.5,Pix,35,,Nao,realizada"]),
        );

        let importer = SeedImporter::new(&db, &source);
        assert!(importer.seed_if_empty().is_err());
        assert_eq!(db.count().unwrap(), 0);
    }

    #[test]
    fn test_missing_source_on_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let db = fresh_db(dir.path());
        let importer = SeedImporter::new(&db, dir.path().join("missing.csv"));
        assert!(matches!(importer.seed_if_empty(), Err(Error::Io(_))));
    }

    #[test]
    fn test_bootstrap_creates_schema_and_seeds() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(StoreConfig::new(dir.path().join("fresh.db")));
        let source = write_csv(dir.path(), &csv_with(&GOOD_ROWS));

        let outcome = SeedImporter::new(&db, &source).bootstrap().unwrap();
        assert_eq!(outcome, SeedOutcome::Imported { rows: 3 });

        let listed = AppointmentRepository::new(&db).list_all().unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[1].satisfacao_paciente, None);
    }
}
