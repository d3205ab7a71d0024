//! Canonical on-disk filesystem layout, bit-exact with canonical
//! Git: loose objects, packs, refs, and the handful of top-level files the
//! core reads or writes directly.

use std::env;
use std::path::{Path, PathBuf};

/// Paths the object database, reference store, and init routine need.
/// Constructing this struct is the caller's job — the core only consumes
/// it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoLayout {
    pub git_dir: PathBuf,
    pub object_dir: PathBuf,
}

impl RepoLayout {
    /// `object_dir` defaults to `<git_dir>/objects`.
    pub fn new(git_dir: impl Into<PathBuf>) -> Self {
        let git_dir = git_dir.into();
        let object_dir = git_dir.join("objects");
        RepoLayout { git_dir, object_dir }
    }

    pub fn with_object_dir(mut self, object_dir: impl Into<PathBuf>) -> Self {
        self.object_dir = object_dir.into();
        self
    }

    /// Build from `GIT_DIR`/`GIT_OBJECT_DIRECTORY`, falling back to
    /// `<cwd>/.git` when `GIT_DIR` is unset.
    pub fn from_env() -> std::io::Result<Self> {
        let git_dir = match env::var_os("GIT_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => env::current_dir()?.join(".git"),
        };
        let mut layout = RepoLayout::new(git_dir);
        if let Some(object_dir) = env::var_os("GIT_OBJECT_DIRECTORY") {
            layout = layout.with_object_dir(PathBuf::from(object_dir));
        }
        Ok(layout)
    }

    pub fn refs_dir(&self) -> PathBuf {
        self.git_dir.join("refs")
    }

    pub fn heads_dir(&self) -> PathBuf {
        self.refs_dir().join("heads")
    }

    pub fn tags_dir(&self) -> PathBuf {
        self.refs_dir().join("tags")
    }

    pub fn remotes_dir(&self) -> PathBuf {
        self.refs_dir().join("remotes")
    }

    pub fn packed_refs(&self) -> PathBuf {
        self.git_dir.join("packed-refs")
    }

    pub fn pack_dir(&self) -> PathBuf {
        self.object_dir.join("pack")
    }

    pub fn description(&self) -> PathBuf {
        self.git_dir.join("description")
    }

    pub fn config(&self) -> PathBuf {
        self.git_dir.join("config")
    }

    pub fn head(&self) -> PathBuf {
        self.git_dir.join("HEAD")
    }

    pub fn loose_shard(&self, hex: &str) -> PathBuf {
        self.object_dir.join(&hex[..2]).join(&hex[2..])
    }

    pub fn exists(&self) -> bool {
        self.git_dir.is_dir()
    }
}

impl AsRef<Path> for RepoLayout {
    fn as_ref(&self) -> &Path {
        &self.git_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_standard_paths() {
        let layout = RepoLayout::new("/repo/.git");
        assert_eq!(layout.object_dir, PathBuf::from("/repo/.git/objects"));
        assert_eq!(layout.refs_dir(), PathBuf::from("/repo/.git/refs"));
        assert_eq!(layout.pack_dir(), PathBuf::from("/repo/.git/objects/pack"));
        assert_eq!(layout.head(), PathBuf::from("/repo/.git/HEAD"));
    }

    #[test]
    fn with_object_dir_overrides_default() {
        let layout = RepoLayout::new("/repo/.git").with_object_dir("/elsewhere/objects");
        assert_eq!(layout.object_dir, PathBuf::from("/elsewhere/objects"));
    }

    #[test]
    fn loose_shard_splits_hex() {
        let layout = RepoLayout::new("/repo/.git");
        let shard = layout.loose_shard("4b825dc642cb6eb9a060e54bf8d69288fbee4904");
        assert_eq!(
            shard,
            PathBuf::from("/repo/.git/objects/4b/825dc642cb6eb9a060e54bf8d69288fbee4904")
        );
    }
}
