pub mod commands;
pub mod ui;

pub use ui::Output;

/// Output format flag shared by commands: `text` (default) or `json`
pub fn is_json(format: &str) -> bool {
    format.eq_ignore_ascii_case("json")
}
