//! Path containment for the agent workspace.
//!
//! The root is canonicalized once at startup and is the only
//! process-wide shared state; after that every access goes through
//! `resolve`, which defeats `../` traversal, absolute paths, and
//! symlink escapes.

use std::path::{Component, Path, PathBuf};

use path_clean::PathClean;

use crate::error::{WorkspaceError, WorkspaceResult};

/// A restricted directory tree the agent may read and write.
#[derive(Debug, Clone)]
pub struct Sandbox {
    root: PathBuf,
}

impl Sandbox {
    /// Create the sandbox, creating and canonicalizing the root.
    pub fn new(root: impl Into<PathBuf>) -> WorkspaceResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| WorkspaceError::Io {
            message: format!("{}: {e}", root.display()),
        })?;
        let root = root.canonicalize().map_err(|e| WorkspaceError::Io {
            message: format!("{}: {e}", root.display()),
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a workspace-relative path to an absolute path inside the
    /// root, or fail with `SandboxViolation`.
    pub fn resolve(&self, rel: &str) -> WorkspaceResult<PathBuf> {
        if rel.is_empty() {
            return Err(WorkspaceError::invalid("path must not be empty"));
        }
        let requested = Path::new(rel);
        if requested.is_absolute() {
            return Err(self.violation(rel));
        }

        // Lexical normalization first: `a/../../b` cleans to `../b`.
        let cleaned = requested.clean();
        if cleaned
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(self.violation(rel));
        }

        let joined = self.root.join(cleaned);

        // Symlink defense: the deepest existing ancestor must still
        // canonicalize to somewhere under the root.
        for ancestor in joined.ancestors() {
            if ancestor.exists() {
                let canonical = ancestor.canonicalize().map_err(|e| WorkspaceError::Io {
                    message: format!("{}: {e}", ancestor.display()),
                })?;
                if !canonical.starts_with(&self.root) {
                    return Err(self.violation(rel));
                }
                break;
            }
        }

        Ok(joined)
    }

    /// Display a resolved path relative to the root, with `/` separators.
    pub fn relative_display(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    fn violation(&self, rel: &str) -> WorkspaceError {
        WorkspaceError::SandboxViolation {
            path: rel.to_string(),
        }
    }
}
