//! Display and output utilities for CLI commands
//!
//! Text output goes to stdout in human-readable blocks; JSON output is a
//! single pretty-printed object per command.

#![allow(dead_code)]

use serde::Serialize;
use serde_json::{Map, Value};

/// Improvements listed per category before collapsing the rest
pub const CATEGORY_PREVIEW: usize = 5;

/// Format duration in human-readable form
pub fn format_duration(duration: std::time::Duration) -> String {
    format_seconds(duration.as_secs_f64())
}

/// Format a duration given in seconds
pub fn format_seconds(secs: f64) -> String {
    if secs < 0.001 {
        format!("{:.0} μs", secs * 1_000_000.0)
    } else if secs < 1.0 {
        format!("{:.1} ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{:.2} s", secs)
    } else {
        format!("{:.1} min", secs / 60.0)
    }
}

/// Print success message with checkmark
pub fn print_success(message: &str) {
    println!("[OK] {}", message);
}

/// Print error message with X mark
pub fn print_error(message: &str) {
    eprintln!("[ERROR] {}", message);
}

/// Print info message
pub fn print_info(message: &str) {
    println!("[INFO] {}", message);
}

/// Print warning message
pub fn print_warning(message: &str) {
    println!("[WARN] {}", message);
}

/// Print a table header
pub fn print_header(title: &str) {
    println!("\n=== {} ===", title);
}

/// Bulleted preview of `items`, at most `limit` lines plus a remainder line
pub fn bullet_preview(items: &[String], limit: usize) -> Vec<String> {
    let mut lines: Vec<String> = items.iter().take(limit).map(|i| format!("• {}", i)).collect();
    if items.len() > limit {
        lines.push(format!("• ... and {} more", items.len() - limit));
    }
    lines
}

/// Capitalize the first character of a category label
pub fn title_case(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ============================================================================
// JSON Output Support
// ============================================================================

/// JSON output builder for structured CLI output
#[derive(Debug, Clone, Default)]
pub struct JsonOutput {
    fields: Map<String, Value>,
}

impl JsonOutput {
    /// Create a new JSON output builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a string field
    pub fn add_str(&mut self, key: &str, value: &str) -> &mut Self {
        self.fields.insert(key.to_string(), Value::String(value.to_string()));
        self
    }

    /// Add an unsigned integer field
    pub fn add_uint(&mut self, key: &str, value: u64) -> &mut Self {
        self.fields.insert(key.to_string(), Value::from(value));
        self
    }

    /// Add a float field
    pub fn add_float(&mut self, key: &str, value: f64) -> &mut Self {
        if let Some(num) = serde_json::Number::from_f64(value) {
            self.fields.insert(key.to_string(), Value::Number(num));
        }
        self
    }

    /// Add any serializable value; unserializable values become null
    pub fn add_value<T: Serialize>(&mut self, key: &str, value: &T) -> &mut Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.fields.insert(key.to_string(), value);
        self
    }

    /// Set the status field (common for all responses)
    pub fn status(&mut self, success: bool) -> &mut Self {
        self.add_str("status", if success { "success" } else { "error" })
    }

    /// Set an error message
    pub fn error(&mut self, message: &str) -> &mut Self {
        self.add_str("status", "error");
        self.add_str("error", message)
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&Value::Object(self.fields.clone()))
            .unwrap_or_else(|_| "{}".to_string())
    }

    /// Print JSON output to stdout
    pub fn print(&self) {
        println!("{}", self.to_json());
    }
}

/// Create an error JSON response
pub fn json_error(message: &str) -> JsonOutput {
    let mut output = JsonOutput::new();
    output.error(message);
    output
}
