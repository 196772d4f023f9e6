//! Dashboard aggregates
//!
//! One `Dashboard` holds every figure the dashboard view shows, computed
//! over the already filtered rows.

use std::collections::BTreeMap;
use serde::Serialize;
use crate::appointment::Appointment;
use crate::category::{ConsultationStatus, Prescription, Sex};

/// Number of equal-width bins in the age histogram
pub const AGE_BINS: usize = 20;

/// How many specialties the revenue ranking keeps
pub const TOP_REVENUE: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountRow {
    pub key: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueRow {
    pub key: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyVolume {
    /// `YYYY-MM`
    pub month: String,
    pub status: ConsultationStatus,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FiveNumberSummary {
    pub key: String,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareRow {
    pub prescription: Prescription,
    pub share: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Dashboard {
    pub total: usize,
    pub monthly_volume: Vec<MonthlyVolume>,
    pub by_specialty: Vec<CountRow>,
    pub revenue_by_specialty: Vec<ValueRow>,
    pub top_revenue: Vec<ValueRow>,
    pub by_state: Vec<CountRow>,
    pub age_histogram: Vec<HistogramBin>,
    pub mean_age_by_specialty: Vec<ValueRow>,
    pub wait_by_specialty: Vec<FiveNumberSummary>,
    pub wait_satisfaction_correlation: Option<f64>,
    pub satisfaction_by_specialty: Vec<ValueRow>,
    pub satisfaction_by_sex: Vec<ValueRow>,
    pub satisfaction_by_state: Vec<ValueRow>,
    pub prescription_share: Vec<ShareRow>,
    pub prescriptions_by_specialty: Vec<CountRow>,
    pub prescriptions_by_state: Vec<CountRow>,
}

impl Dashboard {
    pub fn compute(rows: &[&Appointment]) -> Self {
        let revenue_by_specialty = sum_by(rows, |r| r.especialidade.clone(), |r| r.valor_consulta);
        let mut top_revenue = revenue_by_specialty.clone();
        top_revenue.sort_by(|a, b| b.value.total_cmp(&a.value).then_with(|| a.key.cmp(&b.key)));
        top_revenue.truncate(TOP_REVENUE);

        let prescribed: Vec<&Appointment> = rows
            .iter()
            .copied()
            .filter(|r| r.receita_medicacao == Prescription::Yes)
            .collect();

        Self {
            total: rows.len(),
            monthly_volume: monthly_volume(rows),
            by_specialty: count_by(rows, |r| r.especialidade.clone()),
            revenue_by_specialty,
            top_revenue,
            by_state: count_by(rows, |r| r.estado.clone()),
            age_histogram: histogram(
                &rows.iter().map(|r| r.idade_paciente as f64).collect::<Vec<_>>(),
                AGE_BINS,
            ),
            mean_age_by_specialty: mean_by(rows, |r| r.especialidade.clone(), |r| {
                Some(r.idade_paciente as f64)
            }),
            wait_by_specialty: wait_by_specialty(rows),
            wait_satisfaction_correlation: wait_satisfaction_correlation(rows),
            satisfaction_by_specialty: mean_by(rows, |r| r.especialidade.clone(), |r| {
                r.satisfacao_paciente
            }),
            satisfaction_by_sex: mean_by(rows, |r| sex_key(r.sexo_paciente), |r| {
                r.satisfacao_paciente
            }),
            satisfaction_by_state: mean_by(rows, |r| r.estado.clone(), |r| r.satisfacao_paciente),
            prescription_share: prescription_share(rows),
            prescriptions_by_specialty: count_by(&prescribed, |r| r.especialidade.clone()),
            prescriptions_by_state: count_by(&prescribed, |r| r.estado.clone()),
        }
    }
}

fn sex_key(sex: Sex) -> String {
    sex.code().to_string()
}

/// Counts per key, largest first; ties broken by key
fn count_by<F>(rows: &[&Appointment], key: F) -> Vec<CountRow>
where
    F: Fn(&Appointment) -> String,
{
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for row in rows {
        *counts.entry(key(*row)).or_default() += 1;
    }
    let mut out: Vec<CountRow> = counts
        .into_iter()
        .map(|(key, count)| CountRow { key, count })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    out
}

/// Sums per key, ordered by key
fn sum_by<K, V>(rows: &[&Appointment], key: K, value: V) -> Vec<ValueRow>
where
    K: Fn(&Appointment) -> String,
    V: Fn(&Appointment) -> f64,
{
    let mut sums: BTreeMap<String, f64> = BTreeMap::new();
    for row in rows {
        *sums.entry(key(*row)).or_default() += value(*row);
    }
    sums.into_iter().map(|(key, value)| ValueRow { key, value }).collect()
}

/// Means per key over present values; keys with no values are left out
fn mean_by<K, V>(rows: &[&Appointment], key: K, value: V) -> Vec<ValueRow>
where
    K: Fn(&Appointment) -> String,
    V: Fn(&Appointment) -> Option<f64>,
{
    let mut acc: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for row in rows {
        if let Some(v) = value(*row) {
            let entry = acc.entry(key(*row)).or_insert((0.0, 0));
            entry.0 += v;
            entry.1 += 1;
        }
    }
    acc.into_iter()
        .map(|(key, (sum, n))| ValueRow {
            key,
            value: sum / n as f64,
        })
        .collect()
}

fn monthly_volume(rows: &[&Appointment]) -> Vec<MonthlyVolume> {
    let mut counts: BTreeMap<(String, ConsultationStatus), usize> = BTreeMap::new();
    for row in rows {
        if let Some(month) = row.month_key() {
            *counts.entry((month, row.status_consulta)).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .map(|((month, status), count)| MonthlyVolume { month, status, count })
        .collect()
}

/// Equal-width bins over `[min, max]`; the last bin includes `max`
pub(crate) fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        return vec![HistogramBin {
            lower: min,
            upper: max,
            count: values.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: min + width * i as f64,
            upper: if i + 1 == bins { max } else { min + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();
    for v in values {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

/// Quantile of sorted data with linear interpolation between closest ranks
pub(crate) fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

fn wait_by_specialty(rows: &[&Appointment]) -> Vec<FiveNumberSummary> {
    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for row in rows {
        groups
            .entry(row.especialidade.clone())
            .or_default()
            .push(row.tempo_espera_min as f64);
    }
    groups
        .into_iter()
        .map(|(key, mut waits)| {
            waits.sort_by(f64::total_cmp);
            FiveNumberSummary {
                key,
                min: waits[0],
                q1: quantile(&waits, 0.25),
                median: quantile(&waits, 0.5),
                q3: quantile(&waits, 0.75),
                max: waits[waits.len() - 1],
            }
        })
        .collect()
}

/// Pearson correlation between wait time and satisfaction
fn wait_satisfaction_correlation(rows: &[&Appointment]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = rows
        .iter()
        .filter_map(|r| r.satisfacao_paciente.map(|s| (r.tempo_espera_min as f64, s)))
        .collect();
    pearson(&pairs)
}

pub(crate) fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

fn prescription_share(rows: &[&Appointment]) -> Vec<ShareRow> {
    if rows.is_empty() {
        return Vec::new();
    }
    let total = rows.len() as f64;
    Prescription::all()
        .iter()
        .map(|p| ShareRow {
            prescription: *p,
            share: rows.iter().filter(|r| r.receita_medicacao == *p).count() as f64 / total,
        })
        .filter(|s| s.share > 0.0)
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::appointment::AppointmentFields;
    use crate::category::PaymentMethod;
    use chrono::NaiveDate;

    pub(crate) fn row(id: i64, estado: &str, especialidade: &str, date: Option<(i32, u32, u32)>) -> Appointment {
        Appointment::new(
            id,
            AppointmentFields {
                id_paciente: 1000 + id,
                id_medico: 1,
                data_consulta: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
                estado: estado.to_string(),
                cidade: "Cidade".to_string(),
                especialidade: especialidade.to_string(),
                idade_paciente: 30,
                sexo_paciente: Sex::Female,
                valor_consulta: 100.0,
                forma_pagamento: PaymentMethod::Pix,
                tempo_espera_min: 10,
                satisfacao_paciente: Some(4.0),
                receita_medicacao: Prescription::Yes,
                status_consulta: ConsultationStatus::Completed,
            },
        )
    }

    fn sample() -> Vec<Appointment> {
        let mut a = row(1, "SP", "Cardiologia", Some((2024, 1, 5)));
        a.fields.valor_consulta = 300.0;
        a.fields.tempo_espera_min = 10;
        a.fields.satisfacao_paciente = Some(5.0);
        a.fields.idade_paciente = 60;

        let mut b = row(2, "SP", "Cardiologia", Some((2024, 1, 20)));
        b.fields.valor_consulta = 200.0;
        b.fields.tempo_espera_min = 30;
        b.fields.satisfacao_paciente = Some(3.0);
        b.fields.status_consulta = ConsultationStatus::Cancelled;
        b.fields.idade_paciente = 40;

        let mut c = row(3, "RJ", "Pediatria", Some((2024, 2, 1)));
        c.fields.valor_consulta = 150.0;
        c.fields.tempo_espera_min = 50;
        c.fields.satisfacao_paciente = None;
        c.fields.receita_medicacao = Prescription::No;
        c.fields.sexo_paciente = Sex::Male;
        c.fields.idade_paciente = 5;

        let mut d = row(4, "RJ", "Pediatria", None);
        d.fields.valor_consulta = 50.0;
        d.fields.tempo_espera_min = 20;
        d.fields.satisfacao_paciente = Some(4.0);
        d.fields.idade_paciente = 9;

        vec![a, b, c, d]
    }

    fn compute(rows: &[Appointment]) -> Dashboard {
        let refs: Vec<&Appointment> = rows.iter().collect();
        Dashboard::compute(&refs)
    }

    #[test]
    fn test_counts_and_revenue() {
        let d = compute(&sample());
        assert_eq!(d.total, 4);
        assert_eq!(
            d.by_specialty,
            vec![
                CountRow { key: "Cardiologia".into(), count: 2 },
                CountRow { key: "Pediatria".into(), count: 2 },
            ]
        );
        assert_eq!(d.revenue_by_specialty[0], ValueRow { key: "Cardiologia".into(), value: 500.0 });
        assert_eq!(d.revenue_by_specialty[1], ValueRow { key: "Pediatria".into(), value: 200.0 });
        assert_eq!(d.top_revenue[0].key, "Cardiologia");
    }

    #[test]
    fn test_monthly_volume_skips_undated() {
        let d = compute(&sample());
        let total: usize = d.monthly_volume.iter().map(|m| m.count).sum();
        assert_eq!(total, 3);
        assert_eq!(d.monthly_volume[0].month, "2024-01");
        assert_eq!(d.monthly_volume[0].status, ConsultationStatus::Completed);
        assert_eq!(d.monthly_volume[2].month, "2024-02");
    }

    #[test]
    fn test_satisfaction_means_ignore_nulls() {
        let d = compute(&sample());
        let peds = d.satisfaction_by_specialty.iter().find(|r| r.key == "Pediatria").unwrap();
        assert_eq!(peds.value, 4.0);
        let cardio = d.satisfaction_by_specialty.iter().find(|r| r.key == "Cardiologia").unwrap();
        assert_eq!(cardio.value, 4.0);
        // The only male row has no satisfaction, so the group is absent.
        assert!(d.satisfaction_by_sex.iter().all(|r| r.key != "M"));
    }

    #[test]
    fn test_prescriptions() {
        let d = compute(&sample());
        let yes = d.prescription_share.iter().find(|s| s.prescription == Prescription::Yes).unwrap();
        assert_eq!(yes.share, 0.75);
        assert_eq!(d.prescriptions_by_state, vec![
            CountRow { key: "SP".into(), count: 2 },
            CountRow { key: "RJ".into(), count: 1 },
        ]);
    }

    #[test]
    fn test_wait_summary() {
        let d = compute(&sample());
        let cardio = &d.wait_by_specialty[0];
        assert_eq!(cardio.key, "Cardiologia");
        assert_eq!(cardio.min, 10.0);
        assert_eq!(cardio.median, 20.0);
        assert_eq!(cardio.max, 30.0);
        assert_eq!(cardio.q1, 15.0);
    }

    #[test]
    fn test_quantile_interpolates() {
        let data = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&data, 0.5), 2.5);
        assert_eq!(quantile(&data, 0.25), 1.75);
        assert_eq!(quantile(&[7.0], 0.75), 7.0);
    }

    #[test]
    fn test_histogram_covers_all_values() {
        let values: Vec<f64> = (0..=100).map(|v| v as f64).collect();
        let bins = histogram(&values, AGE_BINS);
        assert_eq!(bins.len(), AGE_BINS);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), values.len());
        assert_eq!(bins[0].lower, 0.0);
        assert_eq!(bins[AGE_BINS - 1].upper, 100.0);
    }

    #[test]
    fn test_histogram_single_value() {
        let bins = histogram(&[42.0, 42.0], AGE_BINS);
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].count, 2);
        assert!(histogram(&[], AGE_BINS).is_empty());
    }

    #[test]
    fn test_pearson() {
        let perfect = [(1.0, 2.0), (2.0, 4.0), (3.0, 6.0)];
        assert!((pearson(&perfect).unwrap() - 1.0).abs() < 1e-12);
        let inverse = [(1.0, 3.0), (2.0, 2.0), (3.0, 1.0)];
        assert!((pearson(&inverse).unwrap() + 1.0).abs() < 1e-12);
        assert_eq!(pearson(&[(1.0, 1.0)]), None);
        assert_eq!(pearson(&[(1.0, 1.0), (2.0, 1.0)]), None);
    }

    #[test]
    fn test_empty_input() {
        let d = Dashboard::compute(&[]);
        assert_eq!(d.total, 0);
        assert!(d.age_histogram.is_empty());
        assert!(d.prescription_share.is_empty());
        assert_eq!(d.wait_satisfaction_correlation, None);
    }
}
