use console::style;

use crate::ai::MetricsSnapshot;
use crate::router::{Classification, RouteResult};

pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", style("✓").green(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        println!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info(&self, message: &str) {
        println!("{} {}", style("ℹ").blue(), message);
    }

    pub fn section(&self, message: &str) {
        println!("\n{}", style(message).bold());
        println!("{}", "─".repeat(40));
    }

    pub fn field(&self, key: &str, value: impl std::fmt::Display) {
        println!("  {:<12} {}", style(key).dim(), value);
    }

    pub fn classification(&self, classification: &Classification) {
        self.field("Tier", style(classification.tier).cyan());
        self.field("Task", &classification.task);
        self.field("Words", classification.word_count);
    }

    /// Completion text on stdout, routing metadata in a trailing section
    pub fn route_result(&self, result: &RouteResult) {
        println!("{}", result.text);

        self.section("Routing");
        self.field(
            "Provider",
            format!("{} / {}", result.provider_name, result.model_used),
        );
        self.field("Tier", style(result.tier).cyan());
        self.field("Task", &result.task);
        self.field("Words sent", result.word_count);
        self.field("Attempts", result.attempts);
        self.field("Enhanced", if result.enhanced { "yes" } else { "no" });
        self.field("Request", &result.request_id);
        if !result.signature.is_empty() {
            println!("\n{}", style(&result.signature).dim().italic());
        }
    }

    pub fn metrics(&self, snapshot: &MetricsSnapshot) {
        self.section("Metrics");
        println!("{}", snapshot.display());
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
