//! Workspace tool implementations.

mod grep_files;
mod list_files;
mod read_file;
mod write_file;

pub use grep_files::GrepFiles;
pub use list_files::ListFiles;
pub use read_file::ReadFile;
pub use write_file::WriteFile;

use serde_json::Value;

use crate::error::{WorkspaceError, WorkspaceResult};
use crate::types::WorkspaceTool;

/// All 4 workspace tools.
pub fn all_tools() -> Vec<Box<dyn WorkspaceTool>> {
    vec![
        Box::new(WriteFile),
        Box::new(ReadFile),
        Box::new(ListFiles),
        Box::new(GrepFiles),
    ]
}

pub(crate) fn require_str<'a>(args: &'a Value, key: &str) -> WorkspaceResult<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| WorkspaceError::invalid(format!("missing '{key}' argument")))
}

/// Recursively collect files under `dir`, as root-relative paths in
/// lexicographic order.
pub(crate) async fn walk_files(
    sandbox: &crate::sandbox::Sandbox,
    dir: &std::path::Path,
) -> WorkspaceResult<Vec<String>> {
    let mut pending = vec![dir.to_path_buf()];
    let mut files = Vec::new();

    while let Some(current) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&current)
            .await
            .map_err(|e| WorkspaceError::Io {
                message: format!("{}: {e}", current.display()),
            })?;
        while let Some(entry) = entries.next_entry().await.map_err(|e| WorkspaceError::Io {
            message: format!("{}: {e}", current.display()),
        })? {
            let path = entry.path();
            let file_type = entry.file_type().await.map_err(|e| WorkspaceError::Io {
                message: format!("{}: {e}", path.display()),
            })?;
            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() {
                files.push(sandbox.relative_display(&path));
            }
        }
    }

    files.sort();
    Ok(files)
}
