//! Configuration Management
//!
//! Layered configuration with hierarchical resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/prompt-router/config.toml)
//! 3. Project config (./prompt-router.toml) or `--config PATH`
//! 4. Environment variables (PROMPT_ROUTER_*)

mod loader;
mod types;

pub use loader::{ConfigLoader, ENV_PREFIX};
pub use types::*;
