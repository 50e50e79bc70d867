//! CLI output formatting

use console::Emoji;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "! ");

/// Format column layering, one column per line
pub fn format_columns(columns: &[Vec<String>]) -> String {
    let mut output = String::new();
    for (index, column) in columns.iter().enumerate() {
        let jobs: Vec<String> = column
            .iter()
            .map(|job| style(job).cyan().to_string())
            .collect();
        output.push_str(&format!(
            "  {} {}\n",
            style(format!("[{}]", index)).dim(),
            jobs.join(", ")
        ));
    }
    output
}
