//! Object database: content-addressed storage over loose files and
//! packfiles, with a bounded object cache and per-OID write locking.

mod cache;
mod lock;
mod loose;
pub mod pack;

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::error::{GitError, PackError};
use crate::hash::Oid;
use crate::object::{Object, ObjectType};
use cache::ObjectCache;
use lock::LockBank;
use pack::Pack;

pub use loose::loose_path;

/// The object database rooted at a repository's `objects/` directory.
pub struct Odb {
    objects_dir: PathBuf,
    packs: RwLock<Vec<Arc<Pack>>>,
    cache: ObjectCache,
    locks: LockBank,
}

impl Odb {
    /// Open the object database at `objects_dir`, discovering every
    /// `.pack`/`.idx` pair under `objects_dir/pack`. A pack missing its
    /// index (or vice versa) is silently skipped rather than treated as an
    /// error — an in-progress `git repack` can leave one behind briefly.
    pub fn open(objects_dir: impl Into<PathBuf>) -> Result<Self, GitError> {
        let objects_dir = objects_dir.into();
        let pack_dir = objects_dir.join("pack");
        let mut packs = Vec::new();

        if pack_dir.is_dir() {
            let entries =
                fs::read_dir(&pack_dir).map_err(|e| GitError::io(&pack_dir, "readdir", e))?;
            for entry in entries {
                let entry = entry.map_err(|e| GitError::io(&pack_dir, "readdir", e))?;
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some("pack") {
                    continue;
                }
                let idx_path = path.with_extension("idx");
                if !idx_path.is_file() {
                    continue;
                }
                packs.push(Arc::new(Pack::open(&path, &idx_path)?));
            }
        }

        debug!(pack_count = packs.len(), path = %objects_dir.display(), "opened object database");

        Ok(Odb {
            objects_dir,
            packs: RwLock::new(packs),
            cache: ObjectCache::default(),
            locks: LockBank::new(),
        })
    }

    pub fn objects_dir(&self) -> &std::path::Path {
        &self.objects_dir
    }

    /// Implemented in terms of [`Odb::get`] (via the same unlocked lookup
    /// core, so it doesn't re-acquire the per-OID lock): `ObjectNotFound`
    /// becomes `false`, any other error still propagates.
    pub fn has(&self, oid: &Oid) -> Result<bool, GitError> {
        let _guard = self.locks.lock(oid);
        Ok(self.lookup_unlocked(oid)?.is_some())
    }

    /// Fetch and fully materialize an object, resolving any delta chain
    /// transparently. Checks the cache, then loose storage, then every
    /// open pack in turn.
    pub fn get(&self, oid: &Oid) -> Result<Object, GitError> {
        let _guard = self.locks.lock(oid);
        self.lookup_unlocked(oid)?
            .ok_or(GitError::ObjectNotFound(*oid))
    }

    /// Cache/loose/pack lookup assuming the caller already holds this
    /// OID's bucket in [`LockBank`]. Never call this without that lock held
    /// — it's the shared core behind `get`, `has`, and `write`'s dedup
    /// check, kept separate so none of them re-enter the (non-reentrant)
    /// lock bank.
    fn lookup_unlocked(&self, oid: &Oid) -> Result<Option<Object>, GitError> {
        if let Some(cached) = self.cache.get(oid) {
            return Ok(Some(cached));
        }

        if let Some(object) = loose::read_loose(&self.objects_dir, oid)? {
            self.cache.insert(*oid, object.clone());
            return Ok(Some(object));
        }

        let packs: Vec<Arc<Pack>> = self.packs.read().expect("pack list poisoned").clone();
        for pack in &packs {
            if let Some((object_type, content)) =
                pack.resolve(oid, &|o| self.resolve_raw(o))?
            {
                let object = Object::parse(object_type, &content)?;
                self.cache.insert(*oid, object.clone());
                return Ok(Some(object));
            }
        }

        Ok(None)
    }

    /// Resolve to raw `(type, content)` without going through the parsed
    /// cache. Used as the cross-pack/loose lookup callback for
    /// OBJ_REF_DELTA bases.
    fn resolve_raw(&self, oid: &Oid) -> Result<Option<(ObjectType, Vec<u8>)>, PackError> {
        if let Some(object) =
            loose::read_loose(&self.objects_dir, oid).map_err(|e| PackError::Corrupt(e.to_string()))?
        {
            return Ok(Some((object.object_type(), object.content())));
        }
        let packs: Vec<Arc<Pack>> = self.packs.read().expect("pack list poisoned").clone();
        for pack in &packs {
            if let Some(found) = pack.resolve(oid, &|o| self.resolve_raw(o))? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// Write `object` as a loose file, deduplicating against anything the
    /// ODB already knows about (loose or packed). Returns the computed id.
    pub fn write(&self, object: &Object) -> Result<Oid, GitError> {
        let oid = object.id();
        let _guard = self.locks.lock(&oid);
        if self.lookup_unlocked(&oid)?.is_some() {
            return Ok(oid);
        }
        loose::write_loose(&self.objects_dir, object)?;
        self.cache.insert(oid, object.clone());
        Ok(oid)
    }

    pub fn walk_loose(&self) -> Result<Vec<Oid>, GitError> {
        loose::walk_loose(&self.objects_dir)
    }

    pub fn walk_packed(&self) -> Vec<Oid> {
        let packs = self.packs.read().expect("pack list poisoned");
        packs
            .iter()
            .flat_map(|p| p.index().oids().copied().collect::<Vec<_>>())
            .collect()
    }

    /// Close every open pack's underlying file handle. Per spec, reads
    /// after `close` are undefined; not safe to call concurrently with any
    /// other `Odb` method.
    pub fn close(&self) {
        let packs = self.packs.read().expect("pack list poisoned");
        for pack in packs.iter() {
            pack.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_then_get_roundtrip() {
        let dir = TempDir::new().unwrap();
        let odb = Odb::open(dir.path()).unwrap();
        let object = Object::blob(b"hello odb".to_vec());
        let oid = odb.write(&object).unwrap();
        assert!(odb.has(&oid).unwrap());
        let fetched = odb.get(&oid).unwrap();
        assert_eq!(fetched.id(), oid);
    }

    #[test]
    fn missing_object_is_not_found() {
        let dir = TempDir::new().unwrap();
        let odb = Odb::open(dir.path()).unwrap();
        let missing = Oid::sum(b"nope");
        assert!(matches!(odb.get(&missing), Err(GitError::ObjectNotFound(_))));
    }

    #[test]
    fn close_is_safe_with_no_open_packs() {
        let dir = TempDir::new().unwrap();
        let odb = Odb::open(dir.path()).unwrap();
        odb.close();
    }

    #[test]
    fn empty_objects_dir_has_no_packs() {
        let dir = TempDir::new().unwrap();
        let odb = Odb::open(dir.path()).unwrap();
        assert!(odb.walk_packed().is_empty());
    }
}
