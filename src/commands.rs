use std::path::PathBuf;
use healthdash::analytics::{self, Dashboard, Filter, FilterOptions, MONTH_NAMES};
use healthdash::config::{write_config, Settings};
use healthdash::output::{emit_success, is_quiet, OutputMode};
use healthdash::ui::{self, grid, records_table, Icons, Spinner, TableBuilder};
use healthdash::{
    AppointmentFields, AppointmentRepository, ConsultationStatus, Database, PaymentMethod,
    Prescription, SeedImporter, SeedOutcome, Sex, WriteOutcome,
};
use owo_colors::OwoColorize;

/// Everything a command needs besides its own arguments
pub struct Context {
    pub settings: Settings,
    pub output_mode: OutputMode,
    pub config_path: PathBuf,
    pub auto_seed: bool,
}

impl Context {
    /// Ensure the schema and, unless disabled, seed an empty table.
    ///
    /// A missing seed file only warns here; the explicit `seed` command
    /// treats it as an error.
    fn open(&self) -> anyhow::Result<Database> {
        let db = Database::new(self.settings.store_config());
        tracing::debug!("Using store {}", db.path().display());
        db.ensure_schema()?;

        if self.auto_seed {
            let importer = SeedImporter::new(&db, &self.settings.seed_csv);
            if importer.source().exists() {
                let outcome = seed_with_spinner(&importer)?;
                if let SeedOutcome::Imported { .. } = outcome {
                    if self.output_mode.is_human() {
                        ui::success(&outcome.to_string());
                    }
                }
            } else if db.count()? == 0 {
                tracing::warn!(
                    "Table is empty and seed file {} was not found",
                    importer.source().display()
                );
            }
        }
        Ok(db)
    }
}

fn seed_with_spinner(importer: &SeedImporter<'_>) -> anyhow::Result<SeedOutcome> {
    let spinner = Spinner::new(&format!("Checking seed data ({})", importer.source().display()));
    let result = importer.seed_if_empty();
    spinner.finish_and_clear();
    Ok(result?)
}

pub fn run_init(ctx: &Context, force: bool) -> anyhow::Result<()> {
    let config = ctx.settings.to_config();
    write_config(&ctx.config_path, &config, force)?;

    if ctx.output_mode.is_human() {
        ui::success(&format!("Config written to {}", ctx.config_path.display()));
        ui::summary_row("database:", &ctx.settings.database.display().to_string());
        ui::summary_row("seed_csv:", &ctx.settings.seed_csv.display().to_string());
    } else {
        emit_success(ctx.output_mode, "init", serde_json::json!({
            "path": ctx.config_path.display().to_string(),
            "config": config,
        }))?;
    }
    Ok(())
}

pub fn run_seed(ctx: &Context) -> anyhow::Result<()> {
    let db = Database::new(ctx.settings.store_config());
    let importer = SeedImporter::new(&db, &ctx.settings.seed_csv);
    tracing::debug!("Seeding store {}", db.path().display());
    db.ensure_schema()?;
    let outcome = seed_with_spinner(&importer)?;

    if ctx.output_mode.is_human() {
        match outcome {
            SeedOutcome::Imported { .. } => ui::success(&outcome.to_string()),
            SeedOutcome::Skipped { .. } => ui::info("Seed", &outcome.to_string()),
        }
    } else {
        emit_success(ctx.output_mode, "seed", outcome)?;
    }
    Ok(())
}

pub fn run_list(ctx: &Context, limit: Option<usize>) -> anyhow::Result<()> {
    let db = ctx.open()?;
    let mut records = AppointmentRepository::new(&db).list_all()?;
    let total = records.len();
    if let Some(limit) = limit {
        records.truncate(limit);
    }

    if ctx.output_mode.is_human() {
        ui::section(Icons::CLIPBOARD, "Consultas registradas");
        if records.is_empty() {
            println!("∅ No appointments stored.");
        } else {
            println!("{}", records_table(&records));
            if records.len() < total {
                println!("{}", ui::dim(&format!("Showing {} of {} rows", records.len(), total)));
            }
        }
    } else {
        emit_success(ctx.output_mode, "list", serde_json::json!({
            "total": total,
            "records": records,
        }))?;
    }
    Ok(())
}

pub fn run_show(ctx: &Context, id: i64) -> anyhow::Result<()> {
    let db = ctx.open()?;
    let Some(record) = AppointmentRepository::new(&db).get(id)? else {
        anyhow::bail!("Appointment {} not found", id);
    };

    if ctx.output_mode.is_human() {
        println!("{}", TableBuilder::from_appointment(&record).build());
    } else {
        emit_success(ctx.output_mode, "show", &record)?;
    }
    Ok(())
}

pub fn run_add(ctx: &Context, fields: AppointmentFields) -> anyhow::Result<()> {
    let db = ctx.open()?;
    let id = AppointmentRepository::new(&db).insert(&fields)?;

    if ctx.output_mode.is_human() {
        ui::success(&format!("Consulta {} cadastrada com sucesso!", id));
    } else {
        emit_success(ctx.output_mode, "add", serde_json::json!({ "id": id }))?;
    }
    Ok(())
}

pub fn run_update(ctx: &Context, id: i64, fields: AppointmentFields) -> anyhow::Result<()> {
    let db = ctx.open()?;
    let outcome = AppointmentRepository::new(&db).update(id, &fields)?;
    report_write(ctx, "update", id, outcome, "atualizada")
}

pub fn run_delete(ctx: &Context, id: i64, yes: bool) -> anyhow::Result<()> {
    let db = ctx.open()?;
    let repo = AppointmentRepository::new(&db);

    if !yes {
        if ctx.output_mode.is_human() {
            if let Some(record) = repo.get(id)? {
                ui::section(Icons::DEL, "Consulta selecionada");
                println!("{}", TableBuilder::from_appointment(&record).build());
            }
        }
        anyhow::bail!("Confirm the deletion with --yes before proceeding");
    }

    let outcome = repo.delete(id)?;
    report_write(ctx, "delete", id, outcome, "excluída")
}

fn report_write(
    ctx: &Context,
    command: &str,
    id: i64,
    outcome: WriteOutcome,
    verb: &str,
) -> anyhow::Result<()> {
    if ctx.output_mode.is_human() {
        if outcome.is_applied() {
            ui::success(&format!("Consulta {} {}!", id, verb));
        } else {
            ui::warn(&format!("No appointment with id {}; nothing changed", id));
        }
    } else {
        emit_success(ctx.output_mode, command, serde_json::json!({
            "id": id,
            "outcome": outcome,
        }))?;
    }
    Ok(())
}

pub fn run_dashboard(ctx: &Context, filter: &Filter) -> anyhow::Result<()> {
    let db = ctx.open()?;
    let records = AppointmentRepository::new(&db).list_all()?;
    let filtered = filter.apply(&records);
    let dashboard = Dashboard::compute(&filtered);

    if !ctx.output_mode.is_human() {
        emit_success(ctx.output_mode, "dashboard", serde_json::json!({
            "options": FilterOptions::from_rows(&records),
            "dashboard": dashboard,
        }))?;
        return Ok(());
    }

    if !is_quiet() {
        ui::banner(
            &format!("{}", "Dashboard de Saúde - Consultas Médicas".bold()),
            &describe_filter(filter),
        );
    }
    print_filter_options(&FilterOptions::from_rows(&records));
    ui::info("Consultas", &format!("{} de {}", dashboard.total, records.len()));
    if dashboard.total == 0 {
        ui::warn("No appointments match the current filters");
        return Ok(());
    }

    print_dashboard(&dashboard);
    Ok(())
}

fn describe_filter(filter: &Filter) -> String {
    if filter.is_empty() {
        return "Sem filtros".to_string();
    }
    let mut parts = Vec::new();
    if !filter.states.is_empty() {
        parts.push(format!("Estados: {}", join(filter.states.iter())));
    }
    if !filter.specialties.is_empty() {
        parts.push(format!("Especialidades: {}", join(filter.specialties.iter())));
    }
    if !filter.months.is_empty() {
        let names = filter.months.iter().map(|m| MONTH_NAMES[(*m as usize) - 1]);
        parts.push(format!("Meses: {}", join(names)));
    }
    if !filter.years.is_empty() {
        parts.push(format!("Anos: {}", join(filter.years.iter())));
    }
    parts.join(" | ")
}

fn print_filter_options(options: &FilterOptions) {
    if options.states.is_empty() || is_quiet() {
        return;
    }
    ui::summary_row("Estados disponíveis:", &options.states.join(", "));
    ui::summary_row("Especialidades disponíveis:", &options.specialties.join(", "));
    ui::summary_row("Anos disponíveis:", &join(options.years.iter()));
}

fn join<T: std::fmt::Display>(items: impl Iterator<Item = T>) -> String {
    items.map(|i| i.to_string()).collect::<Vec<_>>().join(", ")
}

fn print_dashboard(d: &Dashboard) {
    use analytics::{format_currency, format_number};

    let counts = |rows: &[analytics::CountRow]| -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| vec![r.key.clone(), r.count.to_string()])
            .collect()
    };
    let values = |rows: &[analytics::ValueRow], fmt: fn(f64) -> String| -> Vec<Vec<String>> {
        rows.iter().map(|r| vec![r.key.clone(), fmt(r.value)]).collect()
    };

    ui::section(Icons::STATS, "Volume de Consultas ao longo do tempo");
    let volume = d
        .monthly_volume
        .iter()
        .map(|m| vec![m.month.clone(), m.status.label().to_string(), m.count.to_string()])
        .collect();
    println!("{}", grid(&["Mês", "Status", "Consultas"], volume));

    ui::section(Icons::STETHOSCOPE, "Distribuição de Especialidades Médicas");
    println!("{}", grid(&["Especialidade", "Consultas"], counts(&d.by_specialty)));

    ui::section(Icons::MONEY, "Receita por Especialidade");
    println!("{}", grid(&["Especialidade", "Receita"], values(&d.revenue_by_specialty, format_currency)));
    println!("Top {} Especialidades por Receita", d.top_revenue.len());
    println!("{}", grid(&["Especialidade", "Receita"], values(&d.top_revenue, format_currency)));

    ui::section(Icons::GLOBE, "Análise Geográfica");
    println!("{}", grid(&["Estado", "Consultas"], counts(&d.by_state)));

    ui::section(Icons::PEOPLE, "Perfil dos Pacientes");
    let bins = d
        .age_histogram
        .iter()
        .filter(|b| b.count > 0)
        .map(|b| vec![format!("{:.0}–{:.0}", b.lower, b.upper), b.count.to_string()])
        .collect();
    println!("{}", grid(&["Idade (anos)", "Total de Pacientes"], bins));
    println!("{}", grid(&["Especialidade", "Idade média"], values(&d.mean_age_by_specialty, format_number)));

    ui::section(Icons::CLOCK, "Tempo de Espera");
    let waits = d
        .wait_by_specialty
        .iter()
        .map(|w| {
            vec![
                w.key.clone(),
                format_number(w.min),
                format_number(w.q1),
                format_number(w.median),
                format_number(w.q3),
                format_number(w.max),
            ]
        })
        .collect();
    println!("{}", grid(&["Especialidade", "Mín", "Q1", "Mediana", "Q3", "Máx"], waits));
    match d.wait_satisfaction_correlation {
        Some(r) => ui::summary_row("Correlação espera × satisfação:", &format!("{:.2}", r)),
        None => ui::summary_row("Correlação espera × satisfação:", &ui::muted("n/d")),
    }

    ui::section(Icons::STAR, "Satisfação dos Pacientes");
    println!("{}", grid(&["Especialidade", "Satisfação média"], values(&d.satisfaction_by_specialty, format_number)));
    let by_sex = d
        .satisfaction_by_sex
        .iter()
        .map(|r| {
            let label = Sex::from_code(&r.key).map(|s| s.label().to_string()).unwrap_or_else(|_| r.key.clone());
            vec![label, format_number(r.value)]
        })
        .collect();
    println!("{}", grid(&["Sexo", "Satisfação média"], by_sex));
    println!("{}", grid(&["Estado", "Satisfação média"], values(&d.satisfaction_by_state, format_number)));

    ui::section(Icons::PILL, "Receita de Medicação");
    let share = d
        .prescription_share
        .iter()
        .map(|s| vec![s.prescription.label().to_string(), format!("{:.1}%", s.share * 100.0)])
        .collect();
    println!("{}", grid(&["Receita", "Percentual"], share));
    println!("{}", grid(&["Especialidade", "Receitas"], counts(&d.prescriptions_by_specialty)));
    println!("{}", grid(&["Estado", "Receitas"], counts(&d.prescriptions_by_state)));
}

pub fn run_labels(ctx: &Context) -> anyhow::Result<()> {
    fn pairs<T>(all: &[T], code: fn(&T) -> &'static str, label: fn(&T) -> &'static str) -> Vec<(&'static str, &'static str)> {
        all.iter().map(|v| (code(v), label(v))).collect()
    }

    let tables = [
        (Sex::FIELD, pairs(Sex::all(), Sex::code, Sex::label)),
        (PaymentMethod::FIELD, pairs(PaymentMethod::all(), PaymentMethod::code, PaymentMethod::label)),
        (Prescription::FIELD, pairs(Prescription::all(), Prescription::code, Prescription::label)),
        (
            ConsultationStatus::FIELD,
            pairs(ConsultationStatus::all(), ConsultationStatus::code, ConsultationStatus::label),
        ),
    ];

    if ctx.output_mode.is_human() {
        for (field, rows) in &tables {
            ui::section(Icons::CLIPBOARD, field);
            let rows = rows
                .iter()
                .map(|(code, label)| vec![code.to_string(), label.to_string()])
                .collect();
            println!("{}", grid(&["Código", "Rótulo"], rows));
        }
    } else {
        let data: serde_json::Map<String, serde_json::Value> = tables
            .iter()
            .map(|(field, rows)| {
                let map: serde_json::Map<String, serde_json::Value> = rows
                    .iter()
                    .map(|(code, label)| (code.to_string(), serde_json::Value::from(*label)))
                    .collect();
                (field.to_string(), serde_json::Value::Object(map))
            })
            .collect();
        emit_success(ctx.output_mode, "labels", data)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_filter() {
        let mut filter = Filter::new();
        assert_eq!(describe_filter(&filter), "Sem filtros");

        filter.states.insert("SP".to_string());
        filter.months.insert(3);
        filter.months.insert(1);
        assert_eq!(describe_filter(&filter), "Estados: SP | Meses: Janeiro, Março");
    }
}
