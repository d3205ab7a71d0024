//! `packed-refs` file parser.

use std::collections::HashMap;

use crate::error::RefError;
use crate::hash::Oid;

/// Parse a `packed-refs` file's contents into `ref_name → raw OID`.
///
/// Each line is blank, a comment (`#...`), an annotation (`^...`, the
/// peeled object id of the preceding tag — skipped, annotated tags are
/// resolved through the tag object itself, not this shortcut), or
/// `<hex_oid> SP <ref_name>`. Anything else is `PackedRefInvalid`.
pub fn parse(data: &str) -> Result<HashMap<String, Oid>, RefError> {
    let mut out = HashMap::new();

    for line in data.lines() {
        if line.is_empty() || line.starts_with('#') || line.starts_with('^') {
            continue;
        }
        let (hex, name) = line
            .split_once(' ')
            .ok_or_else(|| RefError::PackedRefInvalid(format!("malformed line: {line:?}")))?;
        let oid = Oid::from_hex(hex)
            .map_err(|e| RefError::PackedRefInvalid(format!("bad oid {hex:?}: {e}")))?;
        out.insert(name.to_string(), oid);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_entries_skipping_comments_and_annotations() {
        let data = "# pack-refs with: peeled fully-peeled sorted\n\
                     aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa refs/heads/main\n\
                     ^bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb\n\
                     cccccccccccccccccccccccccccccccccccccccc refs/tags/v1\n";
        let parsed = parse(data).unwrap();
        assert_eq!(parsed.len(), 2);
        assert!(parsed.contains_key("refs/heads/main"));
        assert!(parsed.contains_key("refs/tags/v1"));
    }

    #[test]
    fn rejects_malformed_line() {
        assert!(parse("not-a-valid-line\n").is_err());
    }

    #[test]
    fn empty_file_is_empty_map() {
        assert!(parse("").unwrap().is_empty());
    }
}
