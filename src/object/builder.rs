//! Thin construction helpers for assembling an [`Object`] to hand to
//! [`crate::odb::Odb::write`] without hand-assembling serialization bytes.
//! No working-tree diffing, history walking, or merges here — just the
//! three object shapes that have internal structure worth a builder.

use crate::object::{Commit, Mode, Object, Signature, Tag, Tree, TreeEntry};
use crate::hash::Oid;

#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    entries: Vec<TreeEntry>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry. Does not validate that `mode` agrees
    /// with `id`'s actual object type; callers are responsible for pointing
    /// tree entries at objects of the right kind.
    pub fn insert(&mut self, mode: Mode, path: impl Into<Vec<u8>>, id: Oid) -> &mut Self {
        let path = path.into();
        if let Some(existing) = self.entries.iter_mut().find(|e| e.path == path) {
            existing.mode = mode;
            existing.id = id;
        } else {
            self.entries.push(TreeEntry { mode, path, id });
        }
        self
    }

    /// Build the [`Object`], sorting entries into the ascending path order
    /// the on-disk grammar requires.
    pub fn build(mut self) -> Object {
        self.entries.sort_by(|a, b| a.path.cmp(&b.path));
        Object::tree(Tree {
            entries: self.entries,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CommitBuilder {
    tree: Oid,
    parents: Vec<Oid>,
    author: Signature,
    committer: Option<Signature>,
    gpg_sig: Option<Vec<u8>>,
    message: Vec<u8>,
}

impl CommitBuilder {
    pub fn new(tree: Oid, author: Signature, message: impl Into<Vec<u8>>) -> Self {
        CommitBuilder {
            tree,
            parents: Vec::new(),
            author,
            committer: None,
            gpg_sig: None,
            message: message.into(),
        }
    }

    pub fn parent(&mut self, parent: Oid) -> &mut Self {
        self.parents.push(parent);
        self
    }

    pub fn committer(&mut self, committer: Signature) -> &mut Self {
        self.committer = Some(committer);
        self
    }

    pub fn gpg_sig(&mut self, sig: impl Into<Vec<u8>>) -> &mut Self {
        self.gpg_sig = Some(sig.into());
        self
    }

    pub fn build(self) -> Object {
        let committer = self.committer.unwrap_or_else(|| self.author.clone());
        Object::commit(Commit {
            tree: self.tree,
            parents: self.parents,
            author: self.author,
            committer,
            gpg_sig: self.gpg_sig,
            message: self.message,
        })
    }
}

#[derive(Debug, Clone)]
pub struct TagBuilder {
    target: Oid,
    target_type: crate::object::ObjectType,
    name: String,
    tagger: Signature,
    gpg_sig: Option<Vec<u8>>,
    message: Vec<u8>,
}

impl TagBuilder {
    pub fn new(
        target: Oid,
        target_type: crate::object::ObjectType,
        name: impl Into<String>,
        tagger: Signature,
        message: impl Into<Vec<u8>>,
    ) -> Self {
        TagBuilder {
            target,
            target_type,
            name: name.into(),
            tagger,
            gpg_sig: None,
            message: message.into(),
        }
    }

    pub fn gpg_sig(&mut self, sig: impl Into<Vec<u8>>) -> &mut Self {
        self.gpg_sig = Some(sig.into());
        self
    }

    pub fn build(self) -> Object {
        Object::tag(Tag {
            target: self.target,
            target_type: self.target_type,
            name: self.name,
            tagger: self.tagger,
            gpg_sig: self.gpg_sig,
            message: self.message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_builder_sorts_entries() {
        let mut builder = TreeBuilder::new();
        builder.insert(Mode::RegularFile, "z", Oid::from_raw(&[1; 20]).unwrap());
        builder.insert(Mode::RegularFile, "a", Oid::from_raw(&[2; 20]).unwrap());
        let obj = builder.build();
        match obj.data() {
            crate::object::ObjectData::Tree(tree) => assert!(tree.is_sorted()),
            _ => panic!("expected tree"),
        }
    }

    #[test]
    fn commit_builder_defaults_committer_to_author() {
        let author = Signature::new("A", "a@example.com", 1, 0);
        let builder = CommitBuilder::new(Oid::from_raw(&[1; 20]).unwrap(), author.clone(), "msg");
        let obj = builder.build();
        match obj.data() {
            crate::object::ObjectData::Commit(c) => assert_eq!(c.committer, author),
            _ => panic!("expected commit"),
        }
    }
}
