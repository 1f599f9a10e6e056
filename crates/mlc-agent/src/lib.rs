//! ML cost analysis agent — library crate for the CLI binary.
//!
//! Re-exports all modules so the e2e test crate can access internal
//! types like `AgentDriver`, `ToolRegistry`, and `ScriptedModel`.

pub mod cli;
pub mod config;
pub mod driver;
pub mod providers;
pub mod registry;
pub mod report;
