use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use uuid::Uuid;

/// Allocates per-request scratch areas under a single configured root.
///
/// Every evaluation request gets its own [`Workspace`] whose paths embed a
/// random 128-bit token, so concurrent requests never collide and no locking
/// is needed on the scratch directory.
pub struct WorkspaceManager {
    scratch_root: PathBuf,
}

impl WorkspaceManager {
    pub fn new(scratch_root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let scratch_root = scratch_root.into();
        fs::create_dir_all(&scratch_root).with_context(|| {
            format!(
                "failed to create scratch directory {}",
                scratch_root.display()
            )
        })?;
        Ok(Self { scratch_root })
    }

    /// Allocates a workspace: a fresh pair of source/artifact paths.
    ///
    /// Neither file exists yet; the source appears via
    /// [`Workspace::materialize_source`] and the artifact once compilation
    /// succeeds. Both are removed when the workspace is dropped.
    pub fn acquire(&self) -> Workspace {
        let id = Uuid::new_v4();
        Workspace {
            source_path: self.scratch_root.join(format!("{id}.cpp")),
            artifact_path: self.scratch_root.join(artifact_name(&id)),
            id,
        }
    }

    pub fn scratch_root(&self) -> &Path {
        &self.scratch_root
    }
}

fn artifact_name(id: &Uuid) -> String {
    if cfg!(windows) {
        format!("{id}.exe")
    } else {
        format!("{id}.bin")
    }
}

/// An isolated pair of on-disk paths belonging to exactly one evaluation
/// request. Cleanup happens on drop, so every exit path of the request flow
/// (verdict, compile failure, timeout, propagated error) releases the files.
pub struct Workspace {
    id: Uuid,
    source_path: PathBuf,
    artifact_path: PathBuf,
}

impl Workspace {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn artifact_path(&self) -> &Path {
        &self.artifact_path
    }

    /// Writes the submitted source text to this workspace.
    pub fn materialize_source(&self, text: &str) -> anyhow::Result<()> {
        fs::write(&self.source_path, format!("{text}\n")).with_context(|| {
            format!("failed to write source file {}", self.source_path.display())
        })
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        for path in [&self.source_path, &self.artifact_path] {
            match fs::remove_file(path) {
                Ok(()) => {}
                // The artifact never exists for failed compiles
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => log::warn!("failed to remove {}: {e}", path.display()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquired_paths_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let manager = WorkspaceManager::new(dir.path()).unwrap();

        let a = manager.acquire();
        let b = manager.acquire();
        assert_ne!(a.id(), b.id());
        assert_ne!(a.source_path(), b.source_path());
        assert_ne!(a.artifact_path(), b.artifact_path());
    }

    #[test]
    fn test_drop_removes_materialized_files() {
        let dir = tempfile::tempdir().unwrap();
        let manager = WorkspaceManager::new(dir.path()).unwrap();

        let ws = manager.acquire();
        ws.materialize_source("int main() {}").unwrap();
        fs::write(ws.artifact_path(), b"\x7fELF").unwrap();
        let (source, artifact) = (ws.source_path().to_owned(), ws.artifact_path().to_owned());
        assert!(source.exists());

        drop(ws);
        assert!(!source.exists());
        assert!(!artifact.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_drop_tolerates_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let manager = WorkspaceManager::new(dir.path()).unwrap();

        // Neither file was ever created; drop must stay silent
        let ws = manager.acquire();
        drop(ws);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_materialize_fails_on_unwritable_root() {
        let dir = tempfile::tempdir().unwrap();
        let manager = WorkspaceManager::new(dir.path().join("scratch")).unwrap();
        let ws = manager.acquire();

        fs::remove_dir_all(manager.scratch_root()).unwrap();
        assert!(ws.materialize_source("int main() {}").is_err());
    }
}
