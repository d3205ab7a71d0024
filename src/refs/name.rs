//! Reference name validation.

use crate::error::RefError;

/// Validate a ref name against the exact rule list: non-empty; no
/// leading/trailing `/`; no empty segment; no segment ending in `.` or
/// `.lock`; no leading/trailing `.`; no ASCII control characters; none of
/// `SP ~ ^ : ? * [ \`; no `..`; no `@{`.
pub fn validate(name: &str) -> Result<(), RefError> {
    if name.is_empty() {
        return Err(RefError::NameInvalid("empty name".into()));
    }
    if name.starts_with('/') || name.ends_with('/') {
        return Err(RefError::NameInvalid("leading or trailing '/'".into()));
    }
    if name.starts_with('.') || name.ends_with('.') {
        return Err(RefError::NameInvalid("leading or trailing '.'".into()));
    }
    if name.contains("..") {
        return Err(RefError::NameInvalid("contains '..'".into()));
    }
    if name.contains("@{") {
        return Err(RefError::NameInvalid("contains '@{'".into()));
    }

    for ch in name.chars() {
        if (ch as u32) < 0x20 || ch as u32 == 0x7f {
            return Err(RefError::NameInvalid("contains a control character".into()));
        }
        if matches!(ch, ' ' | '~' | '^' | ':' | '?' | '*' | '[' | '\\') {
            return Err(RefError::NameInvalid(format!("contains disallowed character '{ch}'")));
        }
    }

    for segment in name.split('/') {
        if segment.is_empty() {
            return Err(RefError::NameInvalid("contains an empty segment".into()));
        }
        if segment.ends_with('.') || segment.ends_with(".lock") {
            return Err(RefError::NameInvalid(format!(
                "segment '{segment}' ends in '.' or '.lock'"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_documented_valid_names() {
        for name in ["refs/heads/master", "HEAD", "refs/heads/master@"] {
            assert!(validate(name).is_ok(), "expected {name} to validate");
        }
    }

    #[test]
    fn rejects_documented_invalid_names() {
        for name in [
            "ml/not\x00valid",
            "/refs/heads/master",
            "refs/heads/master/",
            "refs/heads/ma..ster",
            "refs/heads/ma^ster",
            "refs/heads/master.lock",
            "refs//master",
        ] {
            assert!(validate(name).is_err(), "expected {name} to be rejected");
        }
    }
}
