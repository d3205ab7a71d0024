//! Loose object codec: zlib-compressed `type SP size NUL content` files
//! sharded by the first two hex digits of the object id.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::GitError;
use crate::hash::Oid;
use crate::object::{Object, ObjectType};

/// The on-disk path for a loose object: `<objects_dir>/<first 2 hex>/<remaining 38 hex>`.
pub fn loose_path(objects_dir: &Path, oid: &Oid) -> PathBuf {
    let hex = oid.to_hex();
    objects_dir.join(&hex[..2]).join(&hex[2..])
}

/// Read and parse a loose object, validating that the decompressed length
/// matches the declared size.
pub fn read_loose(objects_dir: &Path, oid: &Oid) -> Result<Option<Object>, GitError> {
    let path = loose_path(objects_dir, oid);
    let file = match fs::File::open(&path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(GitError::io(&path, "open", e)),
    };

    let mut raw = Vec::new();
    ZlibDecoder::new(file)
        .read_to_end(&mut raw)
        .map_err(|e| GitError::io(&path, "inflate", e))?;

    let nul = raw
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| GitError::ObjectInvalid("loose object missing header NUL".into()))?;
    let header = std::str::from_utf8(&raw[..nul])
        .map_err(|_| GitError::ObjectInvalid("loose object header not utf8".into()))?;
    let (type_str, size_str) = header
        .split_once(' ')
        .ok_or_else(|| GitError::ObjectInvalid("loose object header missing space".into()))?;
    let object_type = ObjectType::from_name(type_str)
        .ok_or_else(|| GitError::ObjectInvalid(format!("unknown object type {type_str}")))?;
    let declared_size: usize = size_str
        .parse()
        .map_err(|_| GitError::ObjectInvalid("loose object size not decimal".into()))?;

    let content = &raw[nul + 1..];
    if content.len() != declared_size {
        return Err(GitError::ObjectInvalid(format!(
            "loose object {oid} declared size {declared_size} but content is {} bytes",
            content.len()
        )));
    }

    let object = Object::parse(object_type, content)?;
    Ok(Some(object))
}

/// Write `object` as a loose file if it is not already present. Returns
/// `true` if a new file was written, `false` if the object already existed
/// (content-addressing makes a second write a no-op, not an error).
pub fn write_loose(objects_dir: &Path, object: &Object) -> Result<bool, GitError> {
    let oid = object.id();
    let path = loose_path(objects_dir, &oid);
    if path.exists() {
        return Ok(false);
    }

    let dir = path.parent().expect("loose path always has a shard parent");
    fs::create_dir_all(dir).map_err(|e| GitError::io(dir, "create shard dir", e))?;

    let header_and_content = object.header_and_content();
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&header_and_content)
        .map_err(|e| GitError::io(&path, "deflate", e))?;
    let compressed = encoder
        .finish()
        .map_err(|e| GitError::io(&path, "deflate", e))?;

    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, &compressed).map_err(|e| GitError::io(&tmp_path, "write", e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = fs::Permissions::from_mode(0o444);
        fs::set_permissions(&tmp_path, perms).map_err(|e| GitError::io(&tmp_path, "chmod", e))?;
    }

    fs::rename(&tmp_path, &path).map_err(|e| GitError::io(&path, "rename", e))?;
    Ok(true)
}

/// Every OID present as a loose object under `objects_dir`, for walking.
pub fn walk_loose(objects_dir: &Path) -> Result<Vec<Oid>, GitError> {
    let mut out = Vec::new();
    let read_dir = match fs::read_dir(objects_dir) {
        Ok(d) => d,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(out),
        Err(e) => return Err(GitError::io(objects_dir, "readdir", e)),
    };

    for shard_entry in read_dir {
        let shard_entry = shard_entry.map_err(|e| GitError::io(objects_dir, "readdir", e))?;
        let shard_name = shard_entry.file_name();
        let shard_name = shard_name.to_string_lossy();
        if shard_name.len() != 2 || shard_name == "pack" || shard_name == "info" {
            continue;
        }
        let shard_path = shard_entry.path();
        if !shard_path.is_dir() {
            continue;
        }
        for file_entry in fs::read_dir(&shard_path).map_err(|e| GitError::io(&shard_path, "readdir", e))? {
            let file_entry = file_entry.map_err(|e| GitError::io(&shard_path, "readdir", e))?;
            let file_name = file_entry.file_name();
            let file_name = file_name.to_string_lossy();
            if file_name.len() != 38 {
                continue;
            }
            let full_hex = format!("{shard_name}{file_name}");
            if let Ok(oid) = Oid::from_hex(&full_hex) {
                out.push(oid);
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_then_read_roundtrip() {
        let dir = TempDir::new().unwrap();
        let object = Object::blob(b"hello".to_vec());
        let id = object.id();
        assert!(write_loose(dir.path(), &object).unwrap());
        // second write is a no-op, not an error
        assert!(!write_loose(dir.path(), &object).unwrap());

        let read_back = read_loose(dir.path(), &id).unwrap().unwrap();
        assert_eq!(read_back.id(), id);
    }

    #[test]
    fn missing_object_is_none_not_error() {
        let dir = TempDir::new().unwrap();
        let missing = Oid::sum(b"not written");
        assert!(read_loose(dir.path(), &missing).unwrap().is_none());
    }

    #[test]
    fn walk_finds_written_objects() {
        let dir = TempDir::new().unwrap();
        let object = Object::blob(b"walked".to_vec());
        let id = object.id();
        write_loose(dir.path(), &object).unwrap();
        let found = walk_loose(dir.path()).unwrap();
        assert!(found.contains(&id));
    }
}
