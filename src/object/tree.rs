//! Tree objects: ordered `{mode, path, id}` entries.

use crate::error::TreeError;
use crate::hash::Oid;

/// Mode of a tree entry, restricted to the values git recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    RegularFile,
    ExecutableFile,
    Directory,
    Symlink,
    Gitlink,
}

impl Mode {
    pub fn from_octal(mode: u32) -> Result<Self, TreeError> {
        match mode {
            0o100644 => Ok(Mode::RegularFile),
            0o100755 => Ok(Mode::ExecutableFile),
            0o040000 => Ok(Mode::Directory),
            0o120000 => Ok(Mode::Symlink),
            0o160000 => Ok(Mode::Gitlink),
            other => Err(TreeError::Invalid(format!("unrecognized mode {:o}", other))),
        }
    }

    pub fn as_octal(&self) -> u32 {
        match self {
            Mode::RegularFile => 0o100644,
            Mode::ExecutableFile => 0o100755,
            Mode::Directory => 0o040000,
            Mode::Symlink => 0o120000,
            Mode::Gitlink => 0o160000,
        }
    }

    pub fn is_tree(&self) -> bool {
        matches!(self, Mode::Directory)
    }

    /// The object type a tree entry of this mode points at, for display
    /// purposes (`ls-tree`-style output).
    pub fn entry_kind(&self) -> &'static str {
        match self {
            Mode::Directory => "tree",
            Mode::Gitlink => "commit",
            Mode::RegularFile | Mode::ExecutableFile | Mode::Symlink => "blob",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub mode: Mode,
    pub path: Vec<u8>,
    pub id: Oid,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tree {
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    /// Parse the exact on-disk grammar: repeated
    /// `<octal-mode> SP <path> NUL <raw-oid>` until end of buffer.
    pub fn parse(data: &[u8]) -> Result<Self, TreeError> {
        let mut entries = Vec::new();
        let mut rest = data;

        while !rest.is_empty() {
            let sp = rest
                .iter()
                .position(|&b| b == b' ')
                .ok_or_else(|| TreeError::Invalid("missing space after mode".into()))?;
            let mode_str = std::str::from_utf8(&rest[..sp])
                .map_err(|_| TreeError::Invalid("mode not utf8".into()))?;
            let mode_num = u32::from_str_radix(mode_str, 8)
                .map_err(|_| TreeError::Invalid("mode not octal".into()))?;
            let mode = Mode::from_octal(mode_num)?;
            rest = &rest[sp + 1..];

            let nul = rest
                .iter()
                .position(|&b| b == 0)
                .ok_or_else(|| TreeError::Invalid("missing NUL after path".into()))?;
            let path = rest[..nul].to_vec();
            rest = &rest[nul + 1..];

            if rest.len() < Oid::RAW_SIZE {
                return Err(TreeError::Invalid("truncated oid".into()));
            }
            let id = Oid::from_raw(&rest[..Oid::RAW_SIZE])
                .map_err(|e| TreeError::Invalid(format!("bad oid: {e}")))?;
            rest = &rest[Oid::RAW_SIZE..];

            entries.push(TreeEntry { mode, path, id });
        }

        Ok(Tree { entries })
    }

    /// Serialize back to the exact on-disk grammar. Entries must already be
    /// in ascending path order; `serialize` does not sort (sorting is the
    /// builder's job — see [`crate::object::builder::TreeBuilder`]) because
    /// silently reordering a caller-provided tree would hide an ordering
    /// bug instead of surfacing it as a different OID.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for entry in &self.entries {
            out.extend_from_slice(format!("{:o}", entry.mode.as_octal()).as_bytes());
            out.push(b' ');
            out.extend_from_slice(&entry.path);
            out.push(0);
            out.extend_from_slice(entry.id.as_bytes());
        }
        out
    }

    /// True iff entries are in strict ascending order by raw path bytes.
    pub fn is_sorted(&self) -> bool {
        self.entries.windows(2).all(|w| w[0].path < w[1].path)
    }
}

impl std::fmt::Display for TreeEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:06o} {} {}\t{}",
            self.mode.as_octal(),
            self.mode.entry_kind(),
            self.id,
            String::from_utf8_lossy(&self.path)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(byte: u8) -> Oid {
        Oid::from_raw(&[byte; 20]).unwrap()
    }

    #[test]
    fn roundtrip() {
        let tree = Tree {
            entries: vec![
                TreeEntry {
                    mode: Mode::RegularFile,
                    path: b"a.txt".to_vec(),
                    id: oid(1),
                },
                TreeEntry {
                    mode: Mode::Directory,
                    path: b"b".to_vec(),
                    id: oid(2),
                },
            ],
        };
        let bytes = tree.serialize();
        let parsed = Tree::parse(&bytes).unwrap();
        assert_eq!(parsed, tree);
        assert!(parsed.is_sorted());
    }

    #[test]
    fn empty_input_is_empty_tree() {
        let tree = Tree::parse(&[]).unwrap();
        assert!(tree.entries.is_empty());
    }

    #[test]
    fn truncated_oid_is_invalid() {
        let mut bytes = b"100644 a\0".to_vec();
        bytes.extend_from_slice(&[0u8; 5]); // short of 20
        assert!(Tree::parse(&bytes).is_err());
    }

    #[test]
    fn missing_nul_is_invalid() {
        assert!(Tree::parse(b"100644 a").is_err());
    }

    #[test]
    fn unsorted_entries_detected() {
        let tree = Tree {
            entries: vec![
                TreeEntry {
                    mode: Mode::RegularFile,
                    path: b"z".to_vec(),
                    id: oid(1),
                },
                TreeEntry {
                    mode: Mode::RegularFile,
                    path: b"a".to_vec(),
                    id: oid(2),
                },
            ],
        };
        assert!(!tree.is_sorted());
    }
}
