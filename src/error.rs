//! Closed error taxonomy for the object database and reference store.
//!
//! Values, not type hierarchies: every failure mode named in the design is
//! a variant here (or on one of the narrower per-parser enums `GitError`
//! wraps via `#[from]`), so callers can match as broadly or as narrowly as
//! they like.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Top-level error type returned by the object database and reference
/// store.
#[derive(Debug, Error)]
pub enum GitError {
    #[error("object not found: {0}")]
    ObjectNotFound(crate::hash::Oid),

    #[error("object invalid: {0}")]
    ObjectInvalid(String),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Commit(#[from] CommitError),

    #[error(transparent)]
    Tag(#[from] TagError),

    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error(transparent)]
    Oid(#[from] OidError),

    #[error(transparent)]
    Ref(#[from] RefError),

    #[error(transparent)]
    Pack(#[from] PackError),

    #[error("repository already exists at {0}")]
    RepositoryExists(PathBuf),

    #[error("repository does not exist at {0}")]
    RepositoryNotExist(PathBuf),

    #[error("repository config has unsupported version: {0}")]
    RepositoryUnsupportedVersion(String),

    #[error("I/O error during {op} on {path}: {source}")]
    Io {
        path: PathBuf,
        op: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl GitError {
    pub fn io(path: impl AsRef<Path>, op: &'static str, source: std::io::Error) -> Self {
        GitError::Io {
            path: path.as_ref().to_path_buf(),
            op,
            source,
        }
    }
}

#[derive(Debug, Error)]
pub enum OidError {
    #[error("invalid oid: wrong length {0}")]
    InvalidLength(usize),
    #[error("invalid oid: not hex")]
    InvalidHex,
}

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("tree invalid: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum CommitError {
    #[error("commit invalid: {0}")]
    Invalid(String),
    #[error(transparent)]
    Signature(#[from] SignatureError),
}

#[derive(Debug, Error)]
pub enum TagError {
    #[error("tag invalid: {0}")]
    Invalid(String),
    #[error(transparent)]
    Signature(#[from] SignatureError),
}

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("signature invalid: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum RefError {
    #[error("ref not found: {0}")]
    NotFound(String),
    #[error("ref already exists: {0}")]
    Exists(String),
    #[error("ref name invalid: {0}")]
    NameInvalid(String),
    #[error("unknown ref type for {0}")]
    UnknownRefType(String),
    #[error("packed-refs invalid: {0}")]
    PackedRefInvalid(String),
    #[error("symbolic ref cycle detected starting at {0}")]
    SymrefLoop(String),
    #[error(transparent)]
    Oid(#[from] OidError),
    #[error("I/O error during {op} on {path}: {source}")]
    Io {
        path: PathBuf,
        op: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl RefError {
    pub fn io(path: impl AsRef<Path>, op: &'static str, source: std::io::Error) -> Self {
        RefError::Io {
            path: path.as_ref().to_path_buf(),
            op,
            source,
        }
    }
}

#[derive(Debug, Error)]
pub enum PackError {
    #[error("invalid magic number in pack or index header")]
    InvalidMagic,
    #[error("unsupported pack or index version: {0}")]
    InvalidVersion(u32),
    #[error("variable-length integer exceeded 64 bits")]
    IntOverflow,
    #[error("object not found at offset {0}")]
    ObjectNotFoundAtOffset(u64),
    #[error("corrupt pack data: {0}")]
    Corrupt(String),
    #[error(transparent)]
    Oid(#[from] OidError),
    #[error("I/O error during {op} on {path}: {source}")]
    Io {
        path: PathBuf,
        op: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl PackError {
    pub fn io(path: impl AsRef<Path>, op: &'static str, source: std::io::Error) -> Self {
        PackError::Io {
            path: path.as_ref().to_path_buf(),
            op,
            source,
        }
    }
}
