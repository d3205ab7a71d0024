//! Reference store: packed-refs + loose refs, symbolic resolution with
//! cycle detection, name validation, safe vs. overwriting writes.

pub mod name;
mod packed;

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

use walkdir::WalkDir;

use crate::error::RefError;
use crate::hash::Oid;

/// Resolution is bounded so a cyclic chain terminates in an error instead
/// of looping forever.
const MAX_SYMREF_DEPTH: usize = 5;

const SPECIAL_HEADS: [&str; 4] = ["HEAD", "ORIG_HEAD", "MERGE_HEAD", "CHERRY_PICK_HEAD"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    Direct {
        name: String,
        target: Oid,
    },
    Symbolic {
        name: String,
        points_to: String,
        resolved_target: Oid,
    },
}

impl Reference {
    pub fn name(&self) -> &str {
        match self {
            Reference::Direct { name, .. } => name,
            Reference::Symbolic { name, .. } => name,
        }
    }

    pub fn target(&self) -> Oid {
        match self {
            Reference::Direct { target, .. } => *target,
            Reference::Symbolic { resolved_target, .. } => *resolved_target,
        }
    }
}

/// What to write a ref name to: a direct OID, or a pointer at another name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefTarget {
    Direct(Oid),
    Symbolic(String),
}

/// What a walk callback returns to request early termination.
pub enum WalkSignal {
    Continue,
    Stop,
}

/// A loaded view of a repository's references. The in-memory map holds raw
/// (unparsed) values; resolution is deferred to [`RefStore::reference`] so
/// writes don't need to re-derive a serialized form from a parsed one.
pub struct RefStore {
    git_dir: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

impl RefStore {
    /// Load `packed-refs`, then walk `refs/` (loose files shadow packed
    /// entries of the same name), then the special HEADs at the repo root.
    pub fn open(git_dir: impl Into<PathBuf>) -> Result<Self, RefError> {
        let git_dir = git_dir.into();
        let mut entries = HashMap::new();

        let packed_path = git_dir.join("packed-refs");
        if packed_path.is_file() {
            let data = fs::read_to_string(&packed_path)
                .map_err(|e| RefError::io(&packed_path, "read", e))?;
            for (name, oid) in packed::parse(&data)? {
                entries.insert(name, oid.to_hex());
            }
        }

        let refs_dir = git_dir.join("refs");
        if refs_dir.is_dir() {
            for walked in WalkDir::new(&refs_dir) {
                let walked = walked.map_err(|e| {
                    RefError::io(
                        refs_dir.clone(),
                        "walk",
                        std::io::Error::new(std::io::ErrorKind::Other, e),
                    )
                })?;
                if !walked.file_type().is_file() {
                    continue;
                }
                let rel = walked
                    .path()
                    .strip_prefix(&git_dir)
                    .expect("walked entry is under git_dir");
                let name = rel.to_string_lossy().replace(std::path::MAIN_SEPARATOR, "/");
                let raw = fs::read_to_string(walked.path())
                    .map_err(|e| RefError::io(walked.path(), "read", e))?;
                entries.insert(name, raw.trim_end_matches('\n').to_string());
            }
        }

        for special in SPECIAL_HEADS {
            let path = git_dir.join(special);
            if path.is_file() {
                let raw = fs::read_to_string(&path).map_err(|e| RefError::io(&path, "read", e))?;
                entries.insert(special.to_string(), raw.trim_end_matches('\n').to_string());
            }
        }

        Ok(RefStore {
            git_dir,
            entries: RwLock::new(entries),
        })
    }

    fn raw(&self, name: &str) -> Result<String, RefError> {
        self.entries
            .read()
            .expect("ref map poisoned")
            .get(name)
            .cloned()
            .ok_or_else(|| RefError::NotFound(name.to_string()))
    }

    /// Resolve `name` to a [`Reference`]. A value beginning with `ref: ` is
    /// followed recursively (depth-bounded); anything else must parse as a
    /// hex OID.
    pub fn reference(&self, name: &str) -> Result<Reference, RefError> {
        self.resolve_at_depth(name, 0)
    }

    fn resolve_at_depth(&self, name: &str, depth: usize) -> Result<Reference, RefError> {
        if depth > MAX_SYMREF_DEPTH {
            return Err(RefError::SymrefLoop(name.to_string()));
        }
        let raw = self.raw(name)?;
        if let Some(points_to) = raw.strip_prefix("ref: ") {
            let points_to = points_to.trim_end_matches('\n').to_string();
            let resolved = self.resolve_at_depth(&points_to, depth + 1)?;
            Ok(Reference::Symbolic {
                name: name.to_string(),
                resolved_target: resolved.target(),
                points_to,
            })
        } else {
            let target = Oid::from_hex(raw.trim())?;
            Ok(Reference::Direct {
                name: name.to_string(),
                target,
            })
        }
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.git_dir.join(name)
    }

    /// Validate, serialize, ensure the parent directory exists (0755),
    /// write the file (0644), and update the in-memory map. Overwrites any
    /// existing ref of the same name.
    pub fn write_reference(&self, name: &str, target: RefTarget) -> Result<(), RefError> {
        name::validate(name)?;
        let raw = match &target {
            RefTarget::Direct(oid) => oid.to_hex(),
            RefTarget::Symbolic(points_to) => format!("ref: {points_to}"),
        };

        let path = self.path_for(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| RefError::io(parent, "mkdir", e))?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                fs::set_permissions(parent, fs::Permissions::from_mode(0o755))
                    .map_err(|e| RefError::io(parent, "chmod", e))?;
            }
        }

        fs::write(&path, format!("{raw}\n")).map_err(|e| RefError::io(&path, "write", e))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o644))
                .map_err(|e| RefError::io(&path, "chmod", e))?;
        }

        self.entries.write().expect("ref map poisoned").insert(name.to_string(), raw);
        Ok(())
    }

    /// Identical to [`RefStore::write_reference`] but fails with
    /// `RefExists` (leaving disk untouched) if the name already resolves to
    /// something, packed or loose.
    pub fn write_reference_safe(&self, name: &str, target: RefTarget) -> Result<(), RefError> {
        name::validate(name)?;
        if self.entries.read().expect("ref map poisoned").contains_key(name) {
            return Err(RefError::Exists(name.to_string()));
        }
        self.write_reference(name, target)
    }

    /// Resolve every known ref name and call `f`, stopping early if `f`
    /// returns [`WalkSignal::Stop`]. Any `Err` from `f` propagates.
    pub fn walk_references<F>(&self, mut f: F) -> Result<(), RefError>
    where
        F: FnMut(Reference) -> Result<WalkSignal, RefError>,
    {
        let names: Vec<String> = self.entries.read().expect("ref map poisoned").keys().cloned().collect();
        for name in names {
            let reference = self.reference(&name)?;
            match f(reference)? {
                WalkSignal::Continue => continue,
                WalkSignal::Stop => break,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn oid(byte: u8) -> Oid {
        Oid::from_raw(&[byte; 20]).unwrap()
    }

    #[test]
    fn direct_ref_resolves() {
        let dir = TempDir::new().unwrap();
        let store = RefStore::open(dir.path()).unwrap();
        store
            .write_reference("refs/heads/master", RefTarget::Direct(oid(1)))
            .unwrap();
        let resolved = store.reference("refs/heads/master").unwrap();
        assert_eq!(resolved.target(), oid(1));
    }

    #[test]
    fn symbolic_ref_resolves_through_target() {
        let dir = TempDir::new().unwrap();
        let store = RefStore::open(dir.path()).unwrap();
        store
            .write_reference("refs/heads/master", RefTarget::Direct(oid(2)))
            .unwrap();
        store
            .write_reference("HEAD", RefTarget::Symbolic("refs/heads/master".into()))
            .unwrap();
        match store.reference("HEAD").unwrap() {
            Reference::Symbolic {
                points_to,
                resolved_target,
                ..
            } => {
                assert_eq!(points_to, "refs/heads/master");
                assert_eq!(resolved_target, oid(2));
            }
            other => panic!("expected symbolic, got {other:?}"),
        }
    }

    #[test]
    fn cycle_is_detected() {
        let dir = TempDir::new().unwrap();
        let store = RefStore::open(dir.path()).unwrap();
        store
            .write_reference("refs/heads/a", RefTarget::Symbolic("refs/heads/b".into()))
            .unwrap();
        store
            .write_reference("refs/heads/b", RefTarget::Symbolic("refs/heads/a".into()))
            .unwrap();
        assert!(matches!(
            store.reference("refs/heads/a"),
            Err(RefError::SymrefLoop(_))
        ));
    }

    #[test]
    fn safe_write_rejects_existing() {
        let dir = TempDir::new().unwrap();
        let store = RefStore::open(dir.path()).unwrap();
        store
            .write_reference("HEAD", RefTarget::Symbolic("refs/heads/main".into()))
            .unwrap();
        let result = store.write_reference_safe("HEAD", RefTarget::Symbolic("refs/heads/master".into()));
        assert!(matches!(result, Err(RefError::Exists(_))));
    }

    #[test]
    fn invalid_name_is_rejected_before_touching_disk() {
        let dir = TempDir::new().unwrap();
        let store = RefStore::open(dir.path()).unwrap();
        let result = store.write_reference("refs/heads/ma^ster", RefTarget::Direct(oid(3)));
        assert!(result.is_err());
        assert!(!dir.path().join("refs/heads/ma^ster").exists());
    }

    #[test]
    fn loose_ref_shadows_packed_entry() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("packed-refs"),
            format!("{} refs/heads/master\n", oid(9)),
        )
        .unwrap();
        fs::create_dir_all(dir.path().join("refs/heads")).unwrap();
        fs::write(
            dir.path().join("refs/heads/master"),
            format!("{}\n", oid(1)),
        )
        .unwrap();

        let store = RefStore::open(dir.path()).unwrap();
        let resolved = store.reference("refs/heads/master").unwrap();
        assert_eq!(resolved.target(), oid(1));
    }
}
