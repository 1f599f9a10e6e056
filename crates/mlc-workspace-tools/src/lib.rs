//! Sandboxed workspace tools for the ML cost analysis agent.
//!
//! The agent uses a restricted directory tree as external scratch memory
//! (todo lists, intermediate findings, draft report sections). Every
//! path is resolved through the `Sandbox`, which rejects traversal
//! outside the configured root, and 4 tools expose the filesystem:
//! write_file, read_file, list_files, grep_files.

pub mod error;
pub mod sandbox;
pub mod tools;
pub mod types;

// Re-export key types for convenience
pub use error::{WorkspaceError, WorkspaceResult};
pub use sandbox::Sandbox;
pub use types::WorkspaceTool;
