//! Author/committer/tagger identity lines.

use std::fmt;

use crate::error::SignatureError;

/// `{name, email, instant, tz_offset}`, canonical form
/// `Name <email> <unix_seconds> <±HHMM>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub email: String,
    pub seconds: i64,
    /// Signed UTC offset in minutes, e.g. `-420` for `-0700`.
    pub tz_offset_minutes: i32,
}

impl Signature {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        seconds: i64,
        tz_offset_minutes: i32,
    ) -> Self {
        Signature {
            name: name.into(),
            email: email.into(),
            seconds,
            tz_offset_minutes,
        }
    }

    /// Parse `Name <email> <unix_seconds> <±HHMM>`.
    pub fn parse(line: &str) -> Result<Self, SignatureError> {
        let lt = line
            .find('<')
            .ok_or_else(|| SignatureError::Invalid("missing '<'".into()))?;
        let name = line[..lt].trim().to_string();

        let rest = &line[lt + 1..];
        let gt = rest
            .find('>')
            .ok_or_else(|| SignatureError::Invalid("missing '>'".into()))?;
        let email = rest[..gt].to_string();

        let tail = &rest[gt + 1..];
        let tail = tail
            .strip_prefix(' ')
            .ok_or_else(|| SignatureError::Invalid("missing space after email".into()))?;

        let mut parts = tail.splitn(2, ' ');
        let seconds_str = parts
            .next()
            .ok_or_else(|| SignatureError::Invalid("missing timestamp".into()))?;
        let offset_str = parts
            .next()
            .ok_or_else(|| SignatureError::Invalid("missing tz offset".into()))?;

        let seconds: i64 = seconds_str
            .parse()
            .map_err(|_| SignatureError::Invalid("timestamp not decimal".into()))?;

        if offset_str.len() != 5 || !(offset_str.starts_with('+') || offset_str.starts_with('-'))
        {
            return Err(SignatureError::Invalid("tz offset not ±HHMM".into()));
        }
        let sign = if offset_str.starts_with('-') { -1 } else { 1 };
        let hh: i32 = offset_str[1..3]
            .parse()
            .map_err(|_| SignatureError::Invalid("tz offset hours not decimal".into()))?;
        let mm: i32 = offset_str[3..5]
            .parse()
            .map_err(|_| SignatureError::Invalid("tz offset minutes not decimal".into()))?;

        Ok(Signature {
            name,
            email,
            seconds,
            tz_offset_minutes: sign * (hh * 60 + mm),
        })
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.tz_offset_minutes < 0 { '-' } else { '+' };
        let abs = self.tz_offset_minutes.unsigned_abs();
        write!(
            f,
            "{} <{}> {} {}{:02}{:02}",
            self.name,
            self.email,
            self.seconds,
            sign,
            abs / 60,
            abs % 60
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let sig = Signature::new("A U Thor", "author@example.com", 1234567890, -420);
        let line = sig.to_string();
        assert_eq!(line, "A U Thor <author@example.com> 1234567890 -0700");
        assert_eq!(Signature::parse(&line).unwrap(), sig);
    }

    #[test]
    fn positive_offset() {
        let sig = Signature::new("A U Thor", "author@example.com", 1234567890, 330);
        assert_eq!(sig.to_string(), "A U Thor <author@example.com> 1234567890 +0530");
    }

    #[test]
    fn rejects_missing_brackets() {
        assert!(Signature::parse("A U Thor author@example.com 1 +0000").is_err());
    }

    #[test]
    fn rejects_malformed_offset() {
        assert!(Signature::parse("A U Thor <a@b.com> 1 700").is_err());
        assert!(Signature::parse("A U Thor <a@b.com> 1 +070").is_err());
    }
}
