use colored::Colorize;

pub enum TagColor {
    Green,
    Red,
    Blue,
    Cyan,
    Yellow,
}

pub fn print_message(tag: &str, message: &str, color: TagColor) {
    let tag = format!("[{tag}]");
    let tag = match color {
        TagColor::Green => tag.green(),
        TagColor::Red => tag.red(),
        TagColor::Blue => tag.blue(),
        TagColor::Cyan => tag.cyan(),
        TagColor::Yellow => tag.yellow(),
    }
    .bold();
    const PADDING: usize = 13;
    let padded = format!("{tag:>width$}", width = PADDING);
    println!("{padded} {message}");
}

pub fn print_status(tag: &str, label: &str, reason: &str, color: TagColor) {
    const PADDING: usize = 20;

    let label = if !reason.is_empty() {
        format!("{}:", label)
    } else {
        label.to_string()
    };
    let padded = format!("{label:<width$}", width = PADDING);
    print_message(tag, format!("{padded}{reason}").as_str(), color);
}

pub fn print_title(title: &str) {
    println!("\n==== {} ====\n", title.bold());
}

pub fn print_banner() {
    println!(" ");
    println!("{}", "yst-mcp installer".bold());
    println!(
        "{} {}",
        "Installer version:".bold(),
        env!("CARGO_PKG_VERSION").blue().bold()
    );
    println!(" ");
}

/// Bytes rendered as mebibytes with two decimals, e.g. `12.00 MB`.
pub fn format_size_mb(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
}
