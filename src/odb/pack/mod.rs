//! Packfile decoding: object records, delta chains, and the owning
//! [`Pack`] handle that ties a `.pack`/`.idx` pair together.

mod delta;
pub mod index;

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use byteorder::ReadBytesExt;
use flate2::read::ZlibDecoder;

use crate::error::PackError;
use crate::hash::Oid;
use crate::object::ObjectType;
use index::PackIndex;

pub use index::IndexEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RawKind {
    Commit,
    Tree,
    Blob,
    Tag,
    OfsDelta,
    RefDelta,
}

impl RawKind {
    fn from_bits(bits: u8) -> Result<Self, PackError> {
        match bits {
            1 => Ok(RawKind::Commit),
            2 => Ok(RawKind::Tree),
            3 => Ok(RawKind::Blob),
            4 => Ok(RawKind::Tag),
            6 => Ok(RawKind::OfsDelta),
            7 => Ok(RawKind::RefDelta),
            other => Err(PackError::Corrupt(format!("unknown object type bits {other}"))),
        }
    }

    fn as_base_type(self) -> Option<ObjectType> {
        match self {
            RawKind::Commit => Some(ObjectType::Commit),
            RawKind::Tree => Some(ObjectType::Tree),
            RawKind::Blob => Some(ObjectType::Blob),
            RawKind::Tag => Some(ObjectType::Tag),
            RawKind::OfsDelta | RawKind::RefDelta => None,
        }
    }
}

/// Read the `<type:3><size-low:4>` first byte followed by little-endian
/// 7-bit continuation bytes for the remaining size bits.
fn read_object_header<R: Read>(reader: &mut R) -> Result<(RawKind, u64), PackError> {
    let first = reader.read_u8().map_err(|e| PackError::io("<pack>", "read obj header", e))?;
    let kind = RawKind::from_bits((first >> 4) & 0x7)?;
    let mut size = (first & 0x0f) as u64;
    let mut shift = 4u32;
    let mut more = first & 0x80 != 0;
    let mut rounds = 0;
    while more {
        rounds += 1;
        if rounds > 10 {
            return Err(PackError::IntOverflow);
        }
        let byte = reader.read_u8().map_err(|e| PackError::io("<pack>", "read obj header", e))?;
        size |= ((byte & 0x7f) as u64) << shift;
        shift += 7;
        more = byte & 0x80 != 0;
    }
    Ok((kind, size))
}

/// Resolved either within this same pack (ofs-delta chains stay local by
/// construction) or, for ref-delta, via a caller-supplied lookup that can
/// reach across packs and loose storage.
pub type RefResolver<'a> = dyn Fn(&Oid) -> Result<Option<(ObjectType, Vec<u8>)>, PackError> + 'a;

enum Pending {
    Base(ObjectType, Vec<u8>),
    Ofs {
        base_offset: u64,
        base_size: u64,
        result_size: u64,
        instructions: Vec<u8>,
    },
    Ref {
        base_oid: Oid,
        base_size: u64,
        result_size: u64,
        instructions: Vec<u8>,
    },
}

/// A single `.pack` file and its parsed `.idx`. The file handle is `None`
/// after [`Pack::close`]; per spec, reads after close are undefined, so
/// this is the one place that's allowed to panic instead of returning an
/// error.
pub struct Pack {
    pack_path: PathBuf,
    index: PackIndex,
    file: Mutex<Option<File>>,
}

impl Pack {
    pub fn open(pack_path: &Path, idx_path: &Path) -> Result<Self, PackError> {
        let idx_file =
            File::open(idx_path).map_err(|e| PackError::io(idx_path, "open", e))?;
        let index = PackIndex::parse(std::io::BufReader::new(idx_file))?;
        let file = File::open(pack_path).map_err(|e| PackError::io(pack_path, "open", e))?;
        Ok(Pack {
            pack_path: pack_path.to_path_buf(),
            index,
            file: Mutex::new(Some(file)),
        })
    }

    /// Close the underlying file handle. Not safe to call concurrently
    /// with any other method on this pack.
    pub fn close(&self) {
        *self.file.lock().expect("pack file mutex poisoned") = None;
    }

    pub fn path(&self) -> &Path {
        &self.pack_path
    }

    pub fn index(&self) -> &PackIndex {
        &self.index
    }

    pub fn contains(&self, oid: &Oid) -> bool {
        self.index.contains(oid)
    }

    /// Resolve `oid` to its final `(type, content)`, applying the full
    /// delta chain if needed. `resolve_ref` is consulted only for
    /// OBJ_REF_DELTA bases not present in this same pack's index.
    pub fn resolve(
        &self,
        oid: &Oid,
        resolve_ref: &RefResolver<'_>,
    ) -> Result<Option<(ObjectType, Vec<u8>)>, PackError> {
        let entry = match self.index.lookup(oid) {
            Some(e) => e,
            None => return Ok(None),
        };
        self.resolve_at_offset(entry.offset, resolve_ref).map(Some)
    }

    pub fn resolve_at_offset(
        &self,
        offset: u64,
        resolve_ref: &RefResolver<'_>,
    ) -> Result<(ObjectType, Vec<u8>), PackError> {
        let pending = {
            let mut guard = self.file.lock().expect("pack file mutex poisoned");
            let file = guard.as_mut().expect("pack used after close");
            file.seek(SeekFrom::Start(offset))
                .map_err(|e| PackError::io(&self.pack_path, "seek", e))?;
            let (kind, size) = read_object_header(&mut *file)?;

            match kind {
                RawKind::OfsDelta => {
                    let neg_offset = delta::read_negative_offset(&mut *file)?;
                    let base_offset = offset.checked_sub(neg_offset).ok_or_else(|| {
                        PackError::Corrupt("ofs-delta base offset underflowed".into())
                    })?;
                    let mut decoder = ZlibDecoder::new(&mut *file);
                    let base_size = delta::read_size_varint(&mut decoder)?;
                    let result_size = delta::read_size_varint(&mut decoder)?;
                    let mut instructions = Vec::new();
                    decoder
                        .read_to_end(&mut instructions)
                        .map_err(|e| PackError::io(&self.pack_path, "inflate delta", e))?;
                    Pending::Ofs {
                        base_offset,
                        base_size,
                        result_size,
                        instructions,
                    }
                }
                RawKind::RefDelta => {
                    let mut raw = [0u8; Oid::RAW_SIZE];
                    file.read_exact(&mut raw)
                        .map_err(|e| PackError::io(&self.pack_path, "read ref-delta base", e))?;
                    let base_oid = Oid::from_raw(&raw)?;
                    let mut decoder = ZlibDecoder::new(&mut *file);
                    let base_size = delta::read_size_varint(&mut decoder)?;
                    let result_size = delta::read_size_varint(&mut decoder)?;
                    let mut instructions = Vec::new();
                    decoder
                        .read_to_end(&mut instructions)
                        .map_err(|e| PackError::io(&self.pack_path, "inflate delta", e))?;
                    Pending::Ref {
                        base_oid,
                        base_size,
                        result_size,
                        instructions,
                    }
                }
                base => {
                    let object_type = base.as_base_type().expect("base kind is a concrete type");
                    let mut data = vec![0u8; size as usize];
                    let mut decoder = ZlibDecoder::new(&mut *file);
                    decoder
                        .read_exact(&mut data)
                        .map_err(|e| PackError::io(&self.pack_path, "inflate object", e))?;
                    Pending::Base(object_type, data)
                }
            }
        };

        match pending {
            Pending::Base(ty, data) => Ok((ty, data)),
            Pending::Ofs {
                base_offset,
                base_size,
                result_size,
                instructions,
            } => {
                let (base_type, base_data) = self.resolve_at_offset(base_offset, resolve_ref)?;
                if base_data.len() as u64 != base_size {
                    return Err(PackError::Corrupt(
                        "ofs-delta source size does not match base object length".into(),
                    ));
                }
                let data = delta::apply_delta(&base_data, &instructions, result_size)?;
                Ok((base_type, data))
            }
            Pending::Ref {
                base_oid,
                base_size,
                result_size,
                instructions,
            } => {
                let (base_type, base_data) = match self.resolve(&base_oid, resolve_ref)? {
                    Some(found) => found,
                    None => resolve_ref(&base_oid)?.ok_or_else(|| {
                        PackError::Corrupt(format!("ref-delta base {base_oid} not found"))
                    })?,
                };
                if base_data.len() as u64 != base_size {
                    return Err(PackError::Corrupt(
                        "ref-delta source size does not match base object length".into(),
                    ));
                }
                let data = delta::apply_delta(&base_data, &instructions, result_size)?;
                Ok((base_type, data))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_single_byte_blob() {
        // type 3 (blob), size 5, no continuation
        let bytes = [0b0011_0101u8];
        let (kind, size) = read_object_header(&mut &bytes[..]).unwrap();
        assert_eq!(kind, RawKind::Blob);
        assert_eq!(size, 5);
    }

    #[test]
    fn header_multi_byte_size() {
        // first byte: continuation set, type=commit(1), low nibble=0xf
        // second byte: no continuation, 7 bits = 0x02
        let bytes = [0b1001_1111u8, 0b0000_0010u8];
        let (kind, size) = read_object_header(&mut &bytes[..]).unwrap();
        assert_eq!(kind, RawKind::Commit);
        assert_eq!(size, 0x0f | (0x02 << 4));
    }

    #[test]
    fn rejects_unknown_type_bits() {
        let bytes = [0b0101_0001u8]; // type bits = 5, reserved
        assert!(read_object_header(&mut &bytes[..]).is_err());
    }
}
