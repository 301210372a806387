use crate::error::HistoryError;
use git2::Repository;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Source of raw per-file history text
///
/// Implementations return the text `git log --follow <path>` would print,
/// newest entry first, or `None` when the path has no history at all.
pub trait HistoryProvider: Send + Sync {
    fn history(&self, path: &str) -> Result<Option<String>, HistoryError>;
}

/// [`HistoryProvider`] backed by the `git` command line
///
/// libgit2 has no rename following, so the log itself comes from the CLI;
/// git2 only checks that the content root lives in a work tree.
pub struct GitCliHistory {
    root: PathBuf,
    program: String,
}

impl GitCliHistory {
    /// Read history for paths relative to `root`, which must be inside a
    /// non-bare repository
    pub fn discover<P: AsRef<Path>>(root: P, program: impl Into<String>) -> Result<Self, HistoryError> {
        let root = root.as_ref();
        let repo = Repository::discover(root)
            .map_err(|_| HistoryError::RepoNotFound(root.display().to_string()))?;
        let workdir = repo
            .workdir()
            .ok_or_else(|| HistoryError::RepoNotFound(format!("{} (bare repository)", root.display())))?;

        tracing::info!("Opened git repository at: {}", workdir.display());

        Ok(Self {
            root: root.to_path_buf(),
            program: program.into(),
        })
    }

    /// Directory document paths are resolved against
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl HistoryProvider for GitCliHistory {
    fn history(&self, path: &str) -> Result<Option<String>, HistoryError> {
        let output = Command::new(&self.program)
            .args([
                "log",
                "--follow",
                "--pretty=medium",
                "--no-abbrev-commit",
                "--no-decorate",
                "--no-color",
                "--no-show-signature",
                "--date=iso-strict",
                "--",
                path,
            ])
            .current_dir(&self.root)
            .output()
            .map_err(|e| HistoryError::ProviderFailed {
                path: path.to_string(),
                reason: format!("failed to run {}: {}", self.program, e),
            })?;

        if !output.status.success() {
            return Err(HistoryError::ProviderFailed {
                path: path.to_string(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let log = String::from_utf8_lossy(&output.stdout).into_owned();
        tracing::debug!("Read {} bytes of history for {}", log.len(), path);

        if log.trim().is_empty() {
            Ok(None)
        } else {
            Ok(Some(log))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_discover_outside_repository() {
        let dir = TempDir::new().unwrap();
        let result = GitCliHistory::discover(dir.path(), "git");
        // the temp dir may itself live inside a checkout on some machines
        if let Err(err) = result {
            assert!(matches!(err, HistoryError::RepoNotFound(_)));
        }
    }

    #[test]
    fn test_discover_initialized_repository() {
        let dir = TempDir::new().unwrap();
        Repository::init(dir.path()).unwrap();

        let provider = GitCliHistory::discover(dir.path(), "git").unwrap();
        assert_eq!(provider.root(), dir.path());
    }
}
