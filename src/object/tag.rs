//! Annotated tag objects.

use crate::error::TagError;
use crate::hash::Oid;
use crate::object::line_splitter::LineSplitter;
use crate::object::signature::Signature;
use crate::object::ObjectType;

const GPGSIG_END: &[u8] = b"-----END PGP SIGNATURE-----";

fn contains_subslice(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub target: Oid,
    pub target_type: ObjectType,
    pub name: String,
    pub tagger: Signature,
    pub gpg_sig: Option<Vec<u8>>,
    pub message: Vec<u8>,
}

impl Tag {
    /// Same line-oriented shape as [`crate::object::commit::Commit::parse`]
    /// with keys `object`, `type`, `tag`, `tagger`, `gpgsig`.
    pub fn parse(data: &[u8]) -> Result<Self, TagError> {
        let mut object = None;
        let mut target_type = None;
        let mut name = None;
        let mut tagger = None;
        let mut gpg_sig = None;

        let mut lines = LineSplitter::new(data);

        loop {
            let line = lines
                .peek_line()
                .ok_or_else(|| TagError::Invalid("unexpected end of object".into()))?;
            if line.is_empty() {
                lines.consume_line();
                break;
            }

            let sp = line
                .iter()
                .position(|&b| b == b' ')
                .ok_or_else(|| TagError::Invalid("header line missing space".into()))?;
            let key = &line[..sp];
            let mut value = line[sp + 1..].to_vec();
            lines.consume_line();

            if key == b"gpgsig" {
                loop {
                    match lines.peek_line() {
                        Some(next) if next.starts_with(b" ") => {
                            value.push(b'\n');
                            value.extend_from_slice(&next[1..]);
                            lines.consume_line();
                            if contains_subslice(&next[1..], GPGSIG_END) {
                                break;
                            }
                        }
                        _ => break,
                    }
                }
                gpg_sig = Some(value);
                continue;
            }

            match key {
                b"object" => {
                    let s = std::str::from_utf8(&value)
                        .map_err(|_| TagError::Invalid("object not utf8".into()))?;
                    object = Some(
                        Oid::from_hex(s)
                            .map_err(|e| TagError::Invalid(format!("bad object oid: {e}")))?,
                    );
                }
                b"type" => {
                    let s = std::str::from_utf8(&value)
                        .map_err(|_| TagError::Invalid("type not utf8".into()))?;
                    target_type = Some(
                        ObjectType::from_name(s)
                            .ok_or_else(|| TagError::Invalid(format!("unknown type {s}")))?,
                    );
                }
                b"tag" => {
                    name = Some(
                        std::str::from_utf8(&value)
                            .map_err(|_| TagError::Invalid("tag not utf8".into()))?
                            .to_string(),
                    );
                }
                b"tagger" => {
                    let s = String::from_utf8_lossy(&value).to_string();
                    tagger = Some(Signature::parse(&s)?);
                }
                _ => {}
            }
        }

        let object = object.ok_or_else(|| TagError::Invalid("missing object header".into()))?;
        let target_type =
            target_type.ok_or_else(|| TagError::Invalid("missing type header".into()))?;
        let name = name.ok_or_else(|| TagError::Invalid("missing tag header".into()))?;
        let tagger = tagger.ok_or_else(|| TagError::Invalid("missing tagger header".into()))?;
        let message = lines.remainder().to_vec();

        Ok(Tag {
            target: object,
            target_type,
            name,
            tagger,
            gpg_sig,
            message,
        })
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(format!("object {}\n", self.target).as_bytes());
        out.extend_from_slice(format!("type {}\n", self.target_type.as_str()).as_bytes());
        out.extend_from_slice(format!("tag {}\n", self.name).as_bytes());
        out.extend_from_slice(format!("tagger {}\n", self.tagger).as_bytes());
        if let Some(sig) = &self.gpg_sig {
            out.extend_from_slice(b"gpgsig ");
            for (i, chunk) in sig.split(|&b| b == b'\n').enumerate() {
                if i > 0 {
                    out.push(b'\n');
                    out.push(b' ');
                }
                out.extend_from_slice(chunk);
            }
            out.push(b'\n');
        }
        out.push(b'\n');
        out.extend_from_slice(&self.message);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(byte: u8) -> Oid {
        Oid::from_raw(&[byte; 20]).unwrap()
    }

    fn sig() -> Signature {
        Signature::new("Tagger", "tagger@example.com", 1000, 0)
    }

    #[test]
    fn roundtrip() {
        let tag = Tag {
            target: oid(1),
            target_type: ObjectType::Commit,
            name: "v1.0".to_string(),
            tagger: sig(),
            gpg_sig: None,
            message: b"release\n".to_vec(),
        };
        let bytes = tag.serialize();
        assert_eq!(Tag::parse(&bytes).unwrap(), tag);
    }

    #[test]
    fn roundtrip_with_gpgsig() {
        let tag = Tag {
            target: oid(1),
            target_type: ObjectType::Commit,
            name: "v1.0".to_string(),
            tagger: sig(),
            gpg_sig: Some(b"-----BEGIN PGP SIGNATURE-----\n\nabcd\n-----END PGP SIGNATURE-----".to_vec()),
            message: b"release\n".to_vec(),
        };
        let bytes = tag.serialize();
        assert_eq!(Tag::parse(&bytes).unwrap(), tag);
    }

    #[test]
    fn missing_object_is_invalid() {
        let data = b"type commit\ntag v1.0\ntagger Tagger <tagger@example.com> 1000 +0000\n\nmsg";
        assert!(Tag::parse(data).is_err());
    }

    #[test]
    fn unknown_type_is_invalid() {
        let data = format!(
            "object {}\ntype bogus\ntag v1.0\ntagger {}\n\nmsg",
            oid(1),
            sig()
        )
        .into_bytes();
        assert!(Tag::parse(&data).is_err());
    }
}
