//! Repository initialization: idempotent directory skeleton,
//! description seed file, minimal config, and an initial `HEAD`.

use std::fs;
use std::path::Path;

use ini::Ini;
use tracing::info;

use crate::error::GitError;
use crate::layout::RepoLayout;

const DEFAULT_DESCRIPTION: &str =
    "Unnamed repository; edit this file 'description' to name the repository.\n";

/// Create every directory and file `layout` implies, if not already
/// present. Existing files are left untouched — this is safe to call
/// against an already-initialized repository.
pub fn init(layout: &RepoLayout, initial_branch: &str) -> Result<(), GitError> {
    for dir in [
        &layout.git_dir,
        &layout.object_dir,
        &layout.pack_dir(),
        &layout.refs_dir(),
        &layout.heads_dir(),
        &layout.tags_dir(),
        &layout.remotes_dir(),
    ] {
        fs::create_dir_all(dir).map_err(|e| GitError::io(dir.as_path(), "mkdir", e))?;
        set_dir_mode(dir)?;
    }

    let description_path = layout.description();
    if !description_path.is_file() {
        fs::write(&description_path, DEFAULT_DESCRIPTION)
            .map_err(|e| GitError::io(&description_path, "write", e))?;
    }

    let config_path = layout.config();
    if !config_path.is_file() {
        write_default_config(&config_path)?;
    }

    let head_path = layout.head();
    if !head_path.is_file() {
        let contents = format!("ref: refs/heads/{initial_branch}\n");
        fs::write(&head_path, contents).map_err(|e| GitError::io(&head_path, "write", e))?;
    }

    info!(git_dir = %layout.git_dir.display(), "initialized repository");
    Ok(())
}

/// Write a `gitdir: <path>` pointer file, the mechanism canonical Git uses
/// for worktrees and submodules whose `.git` is a file rather than a
/// directory.
pub fn write_symlink_pointer(pointer_path: &Path, layout: &RepoLayout) -> Result<(), GitError> {
    let contents = format!("gitdir: {}\n", layout.git_dir.display());
    fs::write(pointer_path, contents).map_err(|e| GitError::io(pointer_path, "write", e))
}

fn write_default_config(path: &Path) -> Result<(), GitError> {
    let mut ini = Ini::new();
    ini.with_section(Some("core"))
        .set("repositoryformatversion", "0")
        .set("filemode", "true")
        .set("bare", "false")
        .set("logallrefupdates", "true")
        .set("ignorecase", "true")
        .set("precomposeunicode", "true");
    ini.write_to_file(path)
        .map_err(|e| GitError::io(path, "write", e))
}

#[cfg(unix)]
fn set_dir_mode(dir: &Path) -> Result<(), GitError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(dir, fs::Permissions::from_mode(0o755))
        .map_err(|e| GitError::io(dir, "chmod", e))
}

#[cfg(not(unix))]
fn set_dir_mode(_dir: &Path) -> Result<(), GitError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn init_creates_full_skeleton() {
        let dir = TempDir::new().unwrap();
        let layout = RepoLayout::new(dir.path().join(".git"));
        init(&layout, "main").unwrap();

        assert!(layout.heads_dir().is_dir());
        assert!(layout.pack_dir().is_dir());
        assert!(layout.description().is_file());
        assert!(layout.config().is_file());
        assert_eq!(
            fs::read_to_string(layout.head()).unwrap(),
            "ref: refs/heads/main\n"
        );
    }

    #[test]
    fn init_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let layout = RepoLayout::new(dir.path().join(".git"));
        init(&layout, "main").unwrap();
        fs::write(layout.description(), "custom description\n").unwrap();
        init(&layout, "main").unwrap();
        assert_eq!(
            fs::read_to_string(layout.description()).unwrap(),
            "custom description\n"
        );
    }
}
