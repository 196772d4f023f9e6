pub mod icons;
pub mod output;
pub mod progress;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{banner, dim, info, muted, section, success, summary_row, warn};
pub use progress::Spinner;
pub use table::{grid, records_table, TableBuilder};
pub use theme::{theme, Theme};
