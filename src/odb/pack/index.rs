//! Pack index (`.idx`) version 2 parsing.
//!
//! Layout: 4-byte magic `\xfftOc`, 4-byte version (must be 2), a 256-entry
//! fan-out table, a sorted table of raw object ids, a parallel table of
//! CRC32 values, a table of 32-bit offsets (MSB set means "look up the real
//! offset in the 64-bit table instead"), a 64-bit offset table sized to the
//! number of entries that set that bit, and a footer of `(pack checksum,
//! index checksum)`. Version 1 (no magic, fan-out is the whole header) is
//! out of scope; every pack this reads is written by a version 2 writer.

use std::collections::HashMap;
use std::io::{Read, Seek, SeekFrom};

use byteorder::{BigEndian, ReadBytesExt};

use crate::error::PackError;
use crate::hash::Oid;

const IDX_MAGIC: u32 = 0xff744f63;
const FANOUT_ENTRIES: usize = 256;

#[derive(Debug, Clone, Copy)]
pub struct IndexEntry {
    pub offset: u64,
    pub crc32: u32,
}

/// Parsed `.idx` contents: every object id the pack holds, mapped to its
/// offset and stored CRC32.
#[derive(Debug)]
pub struct PackIndex {
    entries: HashMap<Oid, IndexEntry>,
    pub pack_checksum: Oid,
    pub index_checksum: Oid,
}

impl PackIndex {
    pub fn parse<R: Read + Seek>(mut reader: R) -> Result<Self, PackError> {
        let magic = reader
            .read_u32::<BigEndian>()
            .map_err(|e| PackError::io("<idx>", "read magic", e))?;
        if magic != IDX_MAGIC {
            return Err(PackError::InvalidMagic);
        }
        let version = reader
            .read_u32::<BigEndian>()
            .map_err(|e| PackError::io("<idx>", "read version", e))?;
        if version != 2 {
            return Err(PackError::InvalidVersion(version));
        }

        let mut fanout = [0u32; FANOUT_ENTRIES];
        for slot in fanout.iter_mut() {
            *slot = reader
                .read_u32::<BigEndian>()
                .map_err(|e| PackError::io("<idx>", "read fanout", e))?;
        }
        let object_count = fanout[FANOUT_ENTRIES - 1] as usize;

        let mut oids = Vec::with_capacity(object_count);
        for _ in 0..object_count {
            let mut raw = [0u8; Oid::RAW_SIZE];
            reader
                .read_exact(&mut raw)
                .map_err(|e| PackError::io("<idx>", "read oid table", e))?;
            oids.push(Oid::from_raw(&raw)?);
        }

        let mut crcs = Vec::with_capacity(object_count);
        for _ in 0..object_count {
            crcs.push(
                reader
                    .read_u32::<BigEndian>()
                    .map_err(|e| PackError::io("<idx>", "read crc table", e))?,
            );
        }

        let mut entries = HashMap::with_capacity(object_count);
        let mut big_offset_indices: Vec<(u32, usize)> = Vec::new();
        for i in 0..object_count {
            let raw = reader
                .read_i32::<BigEndian>()
                .map_err(|e| PackError::io("<idx>", "read offset table", e))?;
            if raw < 0 {
                let big_table_index = (raw & 0x7fff_ffff) as u32;
                big_offset_indices.push((big_table_index, i));
            } else {
                entries.insert(
                    oids[i],
                    IndexEntry {
                        offset: raw as u64,
                        crc32: crcs[i],
                    },
                );
            }
        }

        if !big_offset_indices.is_empty() {
            big_offset_indices.sort_by_key(|&(table_idx, _)| table_idx);
            let mut current = 0u32;
            for (table_idx, oid_idx) in big_offset_indices {
                while current < table_idx {
                    reader
                        .read_u64::<BigEndian>()
                        .map_err(|e| PackError::io("<idx>", "skip 64-bit offset", e))?;
                    current += 1;
                }
                let offset = reader
                    .read_u64::<BigEndian>()
                    .map_err(|e| PackError::io("<idx>", "read 64-bit offset", e))?;
                current += 1;
                entries.insert(
                    oids[oid_idx],
                    IndexEntry {
                        offset,
                        crc32: crcs[oid_idx],
                    },
                );
            }
        }

        let mut pack_checksum_raw = [0u8; Oid::RAW_SIZE];
        reader
            .read_exact(&mut pack_checksum_raw)
            .map_err(|e| PackError::io("<idx>", "read pack checksum", e))?;
        let mut index_checksum_raw = [0u8; Oid::RAW_SIZE];
        reader
            .read_exact(&mut index_checksum_raw)
            .map_err(|e| PackError::io("<idx>", "read index checksum", e))?;

        // Seek is unused beyond sequential reads today, but callers may
        // want to rewind for whole-file checksum verification later.
        let _ = reader.seek(SeekFrom::Current(0));

        Ok(PackIndex {
            entries,
            pack_checksum: Oid::from_raw(&pack_checksum_raw)?,
            index_checksum: Oid::from_raw(&index_checksum_raw)?,
        })
    }

    pub fn lookup(&self, oid: &Oid) -> Option<IndexEntry> {
        self.entries.get(oid).copied()
    }

    pub fn contains(&self, oid: &Oid) -> bool {
        self.entries.contains_key(oid)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn oids(&self) -> impl Iterator<Item = &Oid> {
        self.entries.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::WriteBytesExt;
    use std::io::{Cursor, Write};

    fn build_idx(oids: &[Oid], offsets: &[u32]) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.write_u32::<BigEndian>(IDX_MAGIC).unwrap();
        buf.write_u32::<BigEndian>(2).unwrap();

        let mut sorted: Vec<Oid> = oids.to_vec();
        sorted.sort();

        let mut fanout = [0u32; FANOUT_ENTRIES];
        for oid in &sorted {
            let first = oid.as_bytes()[0] as usize;
            for slot in fanout.iter_mut().skip(first) {
                *slot += 1;
            }
        }
        for count in fanout {
            buf.write_u32::<BigEndian>(count).unwrap();
        }
        for oid in &sorted {
            buf.write_all(oid.as_bytes()).unwrap();
        }
        for _ in &sorted {
            buf.write_u32::<BigEndian>(0).unwrap(); // crc
        }
        for (oid, offset) in sorted.iter().zip(offsets) {
            let _ = oid;
            buf.write_i32::<BigEndian>(*offset as i32).unwrap();
        }
        buf.write_all(&[0u8; Oid::RAW_SIZE]).unwrap(); // pack checksum
        buf.write_all(&[1u8; Oid::RAW_SIZE]).unwrap(); // index checksum
        buf
    }

    #[test]
    fn parses_small_index() {
        let a = Oid::from_raw(&[1u8; 20]).unwrap();
        let b = Oid::from_raw(&[2u8; 20]).unwrap();
        let data = build_idx(&[a, b], &[10, 200]);
        let idx = PackIndex::parse(Cursor::new(data)).unwrap();
        assert_eq!(idx.len(), 2);
        assert!(idx.contains(&a));
        assert_eq!(idx.lookup(&a).unwrap().offset, 10);
    }

    #[test]
    fn rejects_bad_magic() {
        let data = vec![0u8; 8];
        assert!(matches!(
            PackIndex::parse(Cursor::new(data)),
            Err(PackError::InvalidMagic)
        ));
    }

    #[test]
    fn rejects_unsupported_version() {
        let mut buf = Vec::new();
        buf.write_u32::<BigEndian>(IDX_MAGIC).unwrap();
        buf.write_u32::<BigEndian>(1).unwrap();
        assert!(matches!(
            PackIndex::parse(Cursor::new(buf)),
            Err(PackError::InvalidVersion(1))
        ));
    }
}
