use colored::Colorize;
use serde::Serialize;
use std::fmt::Display;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

pub fn print_header(title: &str, detail: impl Display) {
    println!();
    println!("{} {}", title.bold(), detail.to_string().cyan());
    println!();
}

pub fn print_success(msg: impl Display) {
    println!("{} {}", "✔".green(), msg);
}

pub fn print_info(msg: impl Display) {
    println!("{} {}", "•".dimmed(), msg.to_string().dimmed());
}

pub fn print_missing(msg: impl Display) {
    println!("{} {}", "•".yellow(), msg);
}

pub fn print_warning(msg: impl Display) {
    println!("{} {}", "▸".yellow(), msg.to_string().yellow());
}

/// Red error line plus an optional hint underneath.
pub fn print_error_item(msg: impl Display, hint: Option<&str>) {
    println!("{} {}", "✘".red(), msg.to_string().red());
    if let Some(hint) = hint {
        print_detail(hint);
    }
}

pub fn print_detail(msg: impl Display) {
    println!("    {}", msg.to_string().dimmed());
}

pub fn print_note(msg: impl Display, hint: &str) {
    println!("{} {}", "▸".cyan(), msg);
    print_detail(hint);
}

pub fn print_cancelled() {
    println!("{}", "Cancelled".yellow());
}

/// "1 file", "3 files".
pub fn fmt_count(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

/// Byte count in the largest unit that keeps the value at or above 1.
pub fn fmt_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{bytes} bytes");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
