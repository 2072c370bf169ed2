use console::style;
use std::io::Write;

/// Console status lines
///
/// Status goes to stderr so stdout only ever carries command output
/// (snapshot JSON, rendered config).
pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        eprintln!("{} {}", style("✓").green(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        eprintln!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info(&self, message: &str) {
        eprintln!("{} {}", style("ℹ").blue(), message);
    }

    pub fn header(&self, message: &str) {
        eprintln!("\n{}", style(message).bold().underlined());
    }

    pub fn section(&self, message: &str) {
        eprintln!("\n{}", style(message).bold());
        eprintln!("{}", "─".repeat(40));
    }

    pub fn field(&self, label: &str, value: &str) {
        eprintln!("  {:<12} {}", style(label).dim(), value);
    }

    /// Assistant message in the refinement conversation
    pub fn assistant(&self, message: &str) {
        eprintln!("{} {}", style("◆").magenta(), message);
    }

    /// Inline input prompt (no newline)
    pub fn prompt(&self, label: &str) {
        eprint!("{} ", style(label).cyan().bold());
        let _ = std::io::stderr().flush();
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
