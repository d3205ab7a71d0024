//! The object model: blob/tree/commit/tag, their canonical grammars, and
//! lazily-memoized content-addressed ids.

pub mod blob;
pub mod builder;
pub mod commit;
pub(crate) mod line_splitter;
pub mod signature;
pub mod tag;
pub mod tree;

use std::sync::OnceLock;

use crate::error::GitError;
use crate::hash::Oid;

pub use blob::Blob;
pub use commit::Commit;
pub use signature::Signature;
pub use tag::Tag;
pub use tree::{Mode, Tree, TreeEntry};

/// The four object kinds that may appear at the ODB boundary. `OfsDelta`
/// and `RefDelta` are pack-only wire types and are represented separately
/// in [`crate::odb::pack`] — they never reach this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Commit,
    Tree,
    Blob,
    Tag,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Commit => "commit",
            ObjectType::Tree => "tree",
            ObjectType::Blob => "blob",
            ObjectType::Tag => "tag",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "commit" => Some(ObjectType::Commit),
            "tree" => Some(ObjectType::Tree),
            "blob" => Some(ObjectType::Blob),
            "tag" => Some(ObjectType::Tag),
            _ => None,
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectData {
    Blob(Blob),
    Tree(Tree),
    Commit(Commit),
    Tag(Tag),
}

impl ObjectData {
    pub fn object_type(&self) -> ObjectType {
        match self {
            ObjectData::Blob(_) => ObjectType::Blob,
            ObjectData::Tree(_) => ObjectType::Tree,
            ObjectData::Commit(_) => ObjectType::Commit,
            ObjectData::Tag(_) => ObjectType::Tag,
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        match self {
            ObjectData::Blob(b) => b.serialize(),
            ObjectData::Tree(t) => t.serialize(),
            ObjectData::Commit(c) => c.serialize(),
            ObjectData::Tag(t) => t.serialize(),
        }
    }
}

/// `git cat-file -p`-style rendering: raw bytes for a blob, one line per
/// entry for a tree, the header block followed by the message for a commit
/// or tag.
impl std::fmt::Display for ObjectData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectData::Blob(b) => write!(f, "{}", String::from_utf8_lossy(&b.data)),
            ObjectData::Tree(t) => {
                for entry in &t.entries {
                    writeln!(f, "{entry}")?;
                }
                Ok(())
            }
            ObjectData::Commit(c) => {
                writeln!(f, "tree {}", c.tree)?;
                for parent in &c.parents {
                    writeln!(f, "parent {parent}")?;
                }
                writeln!(f, "author {}", c.author)?;
                writeln!(f, "committer {}", c.committer)?;
                if let Some(sig) = &c.gpg_sig {
                    writeln!(f, "gpgsig {}", String::from_utf8_lossy(sig))?;
                }
                writeln!(f)?;
                write!(f, "{}", String::from_utf8_lossy(&c.message))
            }
            ObjectData::Tag(t) => {
                writeln!(f, "object {}", t.target)?;
                writeln!(f, "type {}", t.target_type)?;
                writeln!(f, "tag {}", t.name)?;
                writeln!(f, "tagger {}", t.tagger)?;
                writeln!(f)?;
                write!(f, "{}", String::from_utf8_lossy(&t.message))
            }
        }
    }
}

/// An immutable `(type, content_bytes, id)` triple. `id` is computed lazily
/// from `header || content` on first access and memoized, so every call
/// site observes the same stable id for a given value.
pub struct Object {
    data: ObjectData,
    id: OnceLock<Oid>,
}

impl Object {
    pub fn new(data: ObjectData) -> Self {
        Object {
            data,
            id: OnceLock::new(),
        }
    }

    pub fn blob(data: Vec<u8>) -> Self {
        Object::new(ObjectData::Blob(Blob { data }))
    }

    pub fn tree(tree: Tree) -> Self {
        Object::new(ObjectData::Tree(tree))
    }

    pub fn commit(commit: Commit) -> Self {
        Object::new(ObjectData::Commit(commit))
    }

    pub fn tag(tag: Tag) -> Self {
        Object::new(ObjectData::Tag(tag))
    }

    /// Parse `content` per `object_type`'s grammar.
    pub fn parse(object_type: ObjectType, content: &[u8]) -> Result<Self, GitError> {
        let data = match object_type {
            ObjectType::Blob => ObjectData::Blob(Blob::parse(content)),
            ObjectType::Tree => ObjectData::Tree(Tree::parse(content)?),
            ObjectType::Commit => ObjectData::Commit(Commit::parse(content)?),
            ObjectType::Tag => ObjectData::Tag(Tag::parse(content)?),
        };
        Ok(Object::new(data))
    }

    pub fn object_type(&self) -> ObjectType {
        self.data.object_type()
    }

    pub fn data(&self) -> &ObjectData {
        &self.data
    }

    pub fn into_data(self) -> ObjectData {
        self.data
    }

    /// The exact serialized content, excluding the `type SP size NUL`
    /// header.
    pub fn content(&self) -> Vec<u8> {
        self.data.serialize()
    }

    /// `header || content`, i.e. exactly what gets hashed and what a loose
    /// object file holds (before zlib compression).
    pub fn header_and_content(&self) -> Vec<u8> {
        let content = self.content();
        let mut buf = Vec::with_capacity(content.len() + 32);
        buf.extend_from_slice(self.object_type().as_str().as_bytes());
        buf.push(b' ');
        buf.extend_from_slice(content.len().to_string().as_bytes());
        buf.push(0);
        buf.extend_from_slice(&content);
        buf
    }

    /// The content-addressed id, computed from `header_and_content()` on
    /// first access and cached thereafter.
    pub fn id(&self) -> Oid {
        *self.id.get_or_init(|| Oid::sum(&self.header_and_content()))
    }
}

impl Clone for Object {
    fn clone(&self) -> Self {
        Object {
            data: self.data.clone(),
            id: self.id.get().copied().map(OnceLock::from).unwrap_or_default(),
        }
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl Eq for Object {}

impl std::fmt::Display for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.data)
    }
}

impl std::fmt::Debug for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Object")
            .field("type", &self.object_type())
            .field("id", &self.id())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_stable_across_calls() {
        let obj = Object::blob(b"hello".to_vec());
        let a = obj.id();
        let b = obj.id();
        assert_eq!(a, b);
    }

    #[test]
    fn parse_then_serialize_preserves_id() {
        let original = Object::blob(b"hello world".to_vec());
        let id_before = original.id();
        let reparsed = Object::parse(ObjectType::Blob, &original.content()).unwrap();
        assert_eq!(reparsed.id(), id_before);
    }

    #[test]
    fn empty_tree_id_matches_canonical_git() {
        let obj = Object::tree(Tree::default());
        assert_eq!(
            obj.id().to_hex(),
            "4b825dc642cb6eb9a060e54bf8d69288fbee4904"
        );
    }
}
