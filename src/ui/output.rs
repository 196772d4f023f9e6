use crate::ui::{theme, Icons};
use owo_colors::OwoColorize;

pub fn banner(title: &str, subtitle: &str) {
    println!();
    println!("{} {}", Icons::HOSPITAL, title);
    println!("   {}", subtitle.style(theme().dim.clone()));
    println!();
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().success.clone()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().warn.clone()));
}

pub fn info(label: &str, value: &str) {
    println!(
        "{} {}: {}",
        Icons::INFO.style(theme().info.clone()),
        label.style(theme().dim.clone()),
        value
    );
}

/// Section heading with a leading icon
pub fn section(icon: &str, title: &str) {
    println!();
    println!("{} {}", icon, title.style(theme().header.clone()));
}

pub fn dim(text: &str) -> String {
    text.style(theme().dim.clone()).to_string()
}

pub fn muted(text: &str) -> String {
    text.style(theme().muted.clone()).to_string()
}

pub fn summary_row(label: &str, value: &str) {
    println!("  {} {}", label.style(theme().dim.clone()), value);
}
