//! Reporting and output generation
//!
//! Global invariants enforced:
//! - Deterministic output ordering
//! - Byte-for-byte identical output across runs

use crate::ast::SourceMethod;

/// Sort methods deterministically
pub fn sort_methods(mut methods: Vec<SourceMethod>) -> Vec<SourceMethod> {
    methods.sort_by(|a, b| {
        // 1. Source path ascending
        a.source_path
            .cmp(&b.source_path)
            // 2. Start line ascending
            .then_with(|| a.start_line.cmp(&b.start_line))
            // 3. Method name ascending
            .then_with(|| a.name.cmp(&b.name))
    });
    methods
}

/// Render methods as a fixed-width text table
pub fn render_text(methods: &[SourceMethod]) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{:<40} {:<10} {:<30} {}\n",
        "FILE", "LINES", "METHOD", "REGION TAGS"
    ));

    for method in methods {
        let lines = format!("{}-{}", method.start_line, method.end_line);
        let tags = if method.region_tags.is_empty() {
            "-".to_string()
        } else {
            method.region_tags.join(", ")
        };
        output.push_str(&format!(
            "{:<40} {:<10} {:<30} {}\n",
            truncate_or_pad(&method.source_path, 40),
            lines,
            truncate_or_pad(&method.name, 30),
            tags
        ));
    }

    output
}

/// Render methods as a pretty-printed JSON array
pub fn render_json(methods: &[SourceMethod]) -> String {
    serde_json::to_string_pretty(methods).unwrap_or_else(|_| "[]".to_string())
}

/// Render methods as JSON Lines, one record per line
pub fn render_jsonl(methods: &[SourceMethod]) -> String {
    methods
        .iter()
        .filter_map(|method| serde_json::to_string(method).ok())
        .map(|line| line + "\n")
        .collect()
}

/// Truncate or pad string to fixed width (counted in characters)
fn truncate_or_pad(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let kept: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        format!("{:<width$}", s, width = width)
    }
}
