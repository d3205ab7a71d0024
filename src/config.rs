//! Repository configuration: an INI dialect, of which the core
//! interprets exactly one key — `core.repositoryformatversion` — which
//! must be `0` or construction fails outright. Everything else in the file
//! belongs to the external collaborator.

use std::path::Path;

use ini::Ini;
use tracing::warn;

use crate::error::GitError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub repository_format_version: String,
}

impl Config {
    /// Parse `path` and validate `core.repositoryformatversion`. A missing
    /// file is treated as version `"0"` (canonical Git's default for a
    /// freshly initialized repository before `config` is written).
    pub fn load(path: &Path) -> Result<Self, GitError> {
        if !path.is_file() {
            return Ok(Config {
                repository_format_version: "0".to_string(),
            });
        }

        let ini = Ini::load_from_file(path)
            .map_err(|e| GitError::ObjectInvalid(format!("config at {}: {e}", path.display())))?;

        let version = ini
            .get_from(Some("core"), "repositoryformatversion")
            .unwrap_or("0")
            .to_string();

        if version != "0" {
            warn!(version = %version, "repository declares an unsupported format version");
            return Err(GitError::RepositoryUnsupportedVersion(version));
        }

        Ok(Config {
            repository_format_version: version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn missing_file_defaults_to_version_zero() {
        let config = Config::load(Path::new("/nonexistent/config")).unwrap();
        assert_eq!(config.repository_format_version, "0");
    }

    #[test]
    fn accepts_version_zero() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[core]\nrepositoryformatversion = 0\n").unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.repository_format_version, "0");
    }

    #[test]
    fn rejects_unsupported_version() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[core]\nrepositoryformatversion = 1\n").unwrap();
        assert!(matches!(
            Config::load(file.path()),
            Err(GitError::RepositoryUnsupportedVersion(_))
        ));
    }
}
