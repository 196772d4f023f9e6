//! Analytics - filtering and aggregate statistics
//!
//! Everything here works on rows already loaded by the repository:
//! - `Filter`: restrict by state, specialty, month and year
//! - `Dashboard`: grouped counts, sums, means and distributions

pub mod filter;
pub mod dashboard;

pub use filter::{Filter, FilterOptions};
pub use dashboard::{
    CountRow, Dashboard, FiveNumberSummary, HistogramBin, MonthlyVolume, ShareRow, ValueRow,
};

/// Compact currency label: `R$ 1.2M`, `R$ 3.4k` or `R$ 12.5`
pub fn format_currency(value: f64) -> String {
    if value >= 1e6 {
        format!("R$ {:.1}M", value / 1e6)
    } else if value >= 1e3 {
        format!("R$ {:.1}k", value / 1e3)
    } else {
        format!("R$ {:.1}", value)
    }
}

/// One decimal place
pub fn format_number(value: f64) -> String {
    format!("{:.1}", value)
}

/// Month names used by the dashboard filters, January first
pub const MONTH_NAMES: [&str; 12] = [
    "Janeiro", "Fevereiro", "Março", "Abril", "Maio", "Junho",
    "Julho", "Agosto", "Setembro", "Outubro", "Novembro", "Dezembro",
];
