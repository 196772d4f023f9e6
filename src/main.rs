//! Healthdash CLI - terminal dashboard and record editor for medical appointments

mod commands;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use healthdash::config::{load_config, Settings};
use healthdash::output::OutputMode;
use healthdash::{AppointmentFields, ConsultationStatus, PaymentMethod, Prescription, Sex};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "healthdash")]
#[command(version)]
#[command(about = "Dashboard de Saúde - statistics and record editing for medical appointments")]
#[command(long_about = r#"
Healthdash keeps a table of medical appointments in a local SQLite file and
offers:
  • Aggregate statistics filtered by state, specialty, month and year
  • Listing, creation, update and deletion of records
  • A one-time CSV seed import when the table is empty

Example usage:
  healthdash dashboard --state SP --year 2024
  healthdash list --limit 20
  healthdash add --patient 1001 --doctor 3 --date 2024-05-20 --state SP \
      --city Santos --specialty Cardiologia --age 54 --sex F --price 250 \
      --payment Pix --wait 15 --satisfaction 4 --prescription Sim --status realizada
  healthdash delete 42 --yes
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    /// Path to the config file (default: healthdash.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the database file
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// CSV dataset loaded when the table is empty
    #[arg(long, global = true)]
    seed_csv: Option<PathBuf>,

    /// Do not import the seed dataset automatically
    #[arg(long, global = true)]
    no_seed: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a config file with the effective settings
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Import the seed dataset if the table is empty
    Seed,

    /// List stored appointments
    List {
        /// Show at most this many rows
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show one appointment
    Show {
        /// Appointment ID
        id: i64,
    },

    /// Register a new appointment
    Add {
        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Overwrite every field of an existing appointment
    Update {
        /// Appointment ID
        id: i64,

        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Delete an appointment
    Delete {
        /// Appointment ID
        id: i64,

        /// Confirm the deletion
        #[arg(short, long)]
        yes: bool,
    },

    /// Aggregate statistics over the (filtered) appointments
    Dashboard {
        /// Only these states (repeatable)
        #[arg(long = "state")]
        states: Vec<String>,

        /// Only these specialties (repeatable)
        #[arg(long = "specialty")]
        specialties: Vec<String>,

        /// Only these months, 1-12 (repeatable)
        #[arg(long = "month", value_parser = clap::value_parser!(u32).range(1..=12))]
        months: Vec<u32>,

        /// Only these years (repeatable)
        #[arg(long = "year")]
        years: Vec<i32>,
    },

    /// Show the code/label tables of categorical fields
    Labels,
}

/// Full field set for add and update. Categorical values accept code or label.
#[derive(Args)]
struct FieldArgs {
    /// Patient ID
    #[arg(long)]
    patient: i64,

    /// Doctor ID
    #[arg(long)]
    doctor: i64,

    /// Appointment date (YYYY-MM-DD)
    #[arg(long)]
    date: NaiveDate,

    /// State
    #[arg(long)]
    state: String,

    /// City
    #[arg(long)]
    city: String,

    /// Medical specialty
    #[arg(long)]
    specialty: String,

    /// Patient age
    #[arg(long, value_parser = clap::value_parser!(i64).range(0..=120))]
    age: i64,

    /// M/F/O or Masculino/Feminino/Outro
    #[arg(long)]
    sex: Sex,

    /// Consultation price (R$)
    #[arg(long, value_parser = parse_price)]
    price: f64,

    /// Dinheiro, Cartao/Cartão, Pix, Convenio/Convênio
    #[arg(long)]
    payment: PaymentMethod,

    /// Minutes waited
    #[arg(long, value_parser = clap::value_parser!(i64).range(0..))]
    wait: i64,

    /// Patient satisfaction, 0 to 5 (omit when unknown)
    #[arg(long, value_parser = parse_satisfaction)]
    satisfaction: Option<f64>,

    /// Sim or Nao/Não
    #[arg(long)]
    prescription: Prescription,

    /// realizada, cancelada, nao compareceu (or the accented labels)
    #[arg(long)]
    status: ConsultationStatus,
}

impl FieldArgs {
    fn into_fields(self) -> AppointmentFields {
        AppointmentFields {
            id_paciente: self.patient,
            id_medico: self.doctor,
            data_consulta: Some(self.date),
            estado: self.state,
            cidade: self.city,
            especialidade: self.specialty,
            idade_paciente: self.age,
            sexo_paciente: self.sex,
            valor_consulta: self.price,
            forma_pagamento: self.payment,
            tempo_espera_min: self.wait,
            satisfacao_paciente: self.satisfaction,
            receita_medicacao: self.prescription,
            status_consulta: self.status,
        }
    }
}

fn parse_satisfaction(raw: &str) -> Result<f64, String> {
    let value: f64 = raw.parse().map_err(|_| format!("'{}' is not a number", raw))?;
    if (0.0..=5.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("satisfaction must be between 0 and 5, got {}", value))
    }
}

fn parse_price(raw: &str) -> Result<f64, String> {
    let value: f64 = raw.parse().map_err(|_| format!("'{}' is not a number", raw))?;
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(format!("price must be a non-negative amount, got {}", raw))
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let output_mode = OutputMode::from_json_flag(cli.json);
    let config = load_config(cli.config.as_deref())?;
    let settings = Settings::resolve(config.as_ref(), cli.database, cli.seed_csv);
    let ctx = commands::Context {
        settings,
        output_mode,
        config_path: cli.config.unwrap_or_else(healthdash::config::default_config_path),
        auto_seed: !cli.no_seed,
    };

    match cli.command {
        Commands::Init { force } => commands::run_init(&ctx, force),
        Commands::Seed => commands::run_seed(&ctx),
        Commands::List { limit } => commands::run_list(&ctx, limit),
        Commands::Show { id } => commands::run_show(&ctx, id),
        Commands::Add { fields } => commands::run_add(&ctx, fields.into_fields()),
        Commands::Update { id, fields } => commands::run_update(&ctx, id, fields.into_fields()),
        Commands::Delete { id, yes } => commands::run_delete(&ctx, id, yes),
        Commands::Dashboard { states, specialties, months, years } => {
            let filter = healthdash::analytics::Filter {
                states: states.into_iter().collect(),
                specialties: specialties.into_iter().collect(),
                months: months.into_iter().collect(),
                years: years.into_iter().collect(),
            };
            commands::run_dashboard(&ctx, &filter)
        }
        Commands::Labels => commands::run_labels(&ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_add_parses_labels_and_codes() {
        let cli = Cli::try_parse_from([
            "healthdash", "add", "--patient", "1001", "--doctor", "3", "--date", "2024-05-20",
            "--state", "SP", "--city", "Santos", "--specialty", "Cardiologia", "--age", "54",
            "--sex", "Feminino", "--price", "250", "--payment", "Cartão", "--wait", "15",
            "--prescription", "Nao", "--status", "nao compareceu",
        ])
        .unwrap();

        let Commands::Add { fields } = cli.command else {
            panic!("expected add");
        };
        let fields = fields.into_fields();
        assert_eq!(fields.sexo_paciente, Sex::Female);
        assert_eq!(fields.forma_pagamento, PaymentMethod::Card);
        assert_eq!(fields.receita_medicacao, Prescription::No);
        assert_eq!(fields.status_consulta, ConsultationStatus::NoShow);
        assert_eq!(fields.satisfacao_paciente, None);
    }

    #[test]
    fn test_satisfaction_range() {
        assert_eq!(parse_satisfaction("4.5"), Ok(4.5));
        assert!(parse_satisfaction("6").is_err());
        assert!(parse_satisfaction("abc").is_err());
    }

    #[test]
    fn test_price_must_be_finite() {
        assert_eq!(parse_price("250.5"), Ok(250.5));
        assert!(parse_price("NaN").is_err());
        assert!(parse_price("inf").is_err());
        assert!(parse_price("-1").is_err());
    }

    #[test]
    fn test_dashboard_month_range() {
        assert!(Cli::try_parse_from(["healthdash", "dashboard", "--month", "13"]).is_err());
        assert!(Cli::try_parse_from(["healthdash", "dashboard", "--month", "12", "--month", "1"]).is_ok());
    }
}
