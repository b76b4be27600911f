//! Java `.properties` file reader
//!
//! Reads the `key.properties` file Android projects keep next to `gradlew`.
//! The syntax is the one accepted by `java.util.Properties.load`:
//!
//! ```text
//! # comment
//! ! also a comment
//! storeFile = release.keystore
//! keyAlias: upload
//! keyPassword hunter2
//! storePassword = first \
//!                 second
//! ```
//!
//! A file that does not exist is [`Properties::Absent`], which answers every
//! lookup with `None`. A file that exists but cannot be read or parsed is an
//! error. Files are read as UTF-8, falling back to ISO-8859-1 (the encoding
//! `Properties.load(InputStream)` uses) when they are not valid UTF-8.

use signet_core::error::{Error, Result};
use std::collections::BTreeMap;
use std::path::Path;

const WHITESPACE: [char; 3] = [' ', '\t', '\x0c'];

/// An optional key/value mapping loaded from a properties file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Properties {
    /// No file was present
    #[default]
    Absent,
    /// The parsed entries of a file
    Loaded(BTreeMap<String, String>),
}

impl Properties {
    /// Load `path` if it exists.
    ///
    /// The whole file is read in one call, so the handle is closed before
    /// parsing starts, whether or not the read succeeded.
    pub fn load_optional(path: &Path) -> Result<Self> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no properties file");
                return Ok(Self::Absent);
            }
            Err(e) => {
                return Err(Error::from(e).with_context(format!("Failed to read {}", path.display())));
            }
        };

        let content = match String::from_utf8(bytes) {
            Ok(content) => content,
            Err(e) => {
                tracing::debug!(path = %path.display(), "not UTF-8, decoding as ISO-8859-1");
                e.into_bytes().into_iter().map(char::from).collect()
            }
        };

        let properties = Self::parse(&content, path)?;
        tracing::debug!(path = %path.display(), entries = properties.len(), "loaded properties file");
        Ok(properties)
    }

    /// Parse properties text. `origin` is only used in error messages.
    pub fn parse(content: &str, origin: &Path) -> Result<Self> {
        let mut entries = BTreeMap::new();
        let mut lines = split_lines(content).enumerate();

        while let Some((index, raw)) = lines.next() {
            let line = raw.trim_start_matches(WHITESPACE);
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }

            let mut logical = line.to_string();
            while ends_with_continuation(&logical) {
                logical.pop();
                match lines.next() {
                    Some((_, next)) => logical.push_str(next.trim_start_matches(WHITESPACE)),
                    None => break,
                }
            }

            let (key, value) = split_entry(&logical);
            let key = unescape(key).map_err(|m| Error::properties(origin, index + 1, m))?;
            let value = unescape(value).map_err(|m| Error::properties(origin, index + 1, m))?;
            entries.insert(key, value);
        }

        Ok(Self::Loaded(entries))
    }

    /// Look up a key
    pub fn get(&self, key: &str) -> Option<&str> {
        match self {
            Self::Absent => None,
            Self::Loaded(entries) => entries.get(key).map(String::as_str),
        }
    }

    /// Whether a file was loaded
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        match self {
            Self::Absent => 0,
            Self::Loaded(entries) => entries.len(),
        }
    }

    /// Whether there are no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<(String, String)> for Properties {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self::Loaded(iter.into_iter().collect())
    }
}

/// Split on `\n`, `\r\n` and a bare `\r`
fn split_lines(content: &str) -> impl Iterator<Item = &str> {
    let mut rest = content;

    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        match rest.find(['\r', '\n']) {
            Some(i) => {
                let line = &rest[..i];
                let terminator = if rest[i..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[i + terminator..];
                Some(line)
            }
            None => Some(std::mem::take(&mut rest)),
        }
    })
}

/// An odd number of trailing backslashes joins the next line
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Split a logical line at the first unescaped `=`, `:` or whitespace
fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;

    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => return (&line[..i], line[i + 1..].trim_start_matches(WHITESPACE)),
            ' ' | '\t' | '\x0c' => {
                let rest = line[i..].trim_start_matches(WHITESPACE);
                let rest = rest
                    .strip_prefix(['=', ':'])
                    .map_or(rest, |r| r.trim_start_matches(WHITESPACE));
                return (&line[..i], rest);
            }
            _ => {}
        }
    }

    (line, "")
}

fn unescape(raw: &str) -> std::result::Result<String, String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some('u') => out.push(read_unicode_escape(&mut chars)?),
            Some(other) => out.push(other),
            // A lone backslash at end of input is dropped
            None => {}
        }
    }

    Ok(out)
}

/// Decode the `XXXX` of `\uXXXX`, pairing UTF-16 surrogates
fn read_unicode_escape(chars: &mut std::str::Chars<'_>) -> std::result::Result<char, String> {
    let high = read_hex4(chars)?;

    if !(0xD800..=0xDBFF).contains(&high) {
        return char::from_u32(high).ok_or_else(|| format!("invalid \\u{:04X} escape", high));
    }

    let mut lookahead = chars.clone();
    if lookahead.next() != Some('\\') || lookahead.next() != Some('u') {
        return Err(format!("unpaired surrogate \\u{:04X}", high));
    }
    let low = read_hex4(&mut lookahead)?;
    if !(0xDC00..=0xDFFF).contains(&low) {
        return Err(format!("unpaired surrogate \\u{:04X}", high));
    }
    *chars = lookahead;

    let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
    char::from_u32(code).ok_or_else(|| format!("invalid surrogate pair \\u{:04X}\\u{:04X}", high, low))
}

fn read_hex4(chars: &mut std::str::Chars<'_>) -> std::result::Result<u32, String> {
    let digits: String = chars.by_ref().take(4).collect();

    if digits.chars().count() != 4 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("malformed \\uXXXX escape: \\u{}", digits));
    }

    u32::from_str_radix(&digits, 16).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use signet_core::error::ErrorCode;
    use tempfile::TempDir;

    fn parse(text: &str) -> Properties {
        Properties::parse(text, Path::new("key.properties")).unwrap()
    }

    #[test]
    fn test_flutter_key_properties() {
        let props = parse(
            "storePassword=s3cret\nkeyPassword=k3y\nkeyAlias=upload\nstoreFile=/home/ci/upload-keystore.jks\n",
        );

        assert_eq!(props.len(), 4);
        assert_eq!(props.get("keyAlias"), Some("upload"));
        assert_eq!(props.get("storeFile"), Some("/home/ci/upload-keystore.jks"));
        assert_eq!(props.get("missing"), None);
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let props = parse("# signing\n\n   ! legacy comment\n\t\nkeyAlias=upload\n");
        assert_eq!(props.len(), 1);
        assert_eq!(props.get("keyAlias"), Some("upload"));
    }

    #[test]
    fn test_separators() {
        let props = parse("a=1\nb: 2\nc 3\nd   =   4\ne\t:5\nf\n");

        assert_eq!(props.get("a"), Some("1"));
        assert_eq!(props.get("b"), Some("2"));
        assert_eq!(props.get("c"), Some("3"));
        assert_eq!(props.get("d"), Some("4"));
        assert_eq!(props.get("e"), Some("5"));
        assert_eq!(props.get("f"), Some(""));
    }

    #[test]
    fn test_value_keeps_trailing_whitespace_and_separators() {
        let props = parse("storePassword = pa=ss:word  \n");
        assert_eq!(props.get("storePassword"), Some("pa=ss:word  "));
    }

    #[test]
    fn test_line_continuation() {
        let props = parse("storeFile = /keys/\\\n    release.keystore\nkeyAlias=upload\n");
        assert_eq!(props.get("storeFile"), Some("/keys/release.keystore"));
        assert_eq!(props.get("keyAlias"), Some("upload"));
    }

    #[test]
    fn test_escaped_backslash_is_not_continuation() {
        let props = parse("storeFile=C:\\\\keys\\\\\nkeyAlias=upload\n");
        assert_eq!(props.get("storeFile"), Some("C:\\keys\\"));
        assert_eq!(props.get("keyAlias"), Some("upload"));
    }

    #[test]
    fn test_escapes() {
        let props = parse("my\\ key=tab\\there\nk\\:x=caf\\u00e9\nemoji=\\uD83D\\uDE00\n");

        assert_eq!(props.get("my key"), Some("tab\there"));
        assert_eq!(props.get("k:x"), Some("café"));
        assert_eq!(props.get("emoji"), Some("😀"));
    }

    #[test]
    fn test_later_duplicate_wins() {
        let props = parse("keyAlias=first\nkeyAlias=second\n");
        assert_eq!(props.get("keyAlias"), Some("second"));
    }

    #[test]
    fn test_crlf_line_endings() {
        let props = parse("keyAlias=upload\r\nstoreFile=release.keystore\r\n");
        assert_eq!(props.get("keyAlias"), Some("upload"));
        assert_eq!(props.get("storeFile"), Some("release.keystore"));
    }

    #[test]
    fn test_bare_cr_line_endings() {
        let props = parse("keyAlias=upload\rstoreFile=release.keystore\r");
        assert_eq!(props.len(), 2);
        assert_eq!(props.get("keyAlias"), Some("upload"));
        assert_eq!(props.get("storeFile"), Some("release.keystore"));
    }

    #[test]
    fn test_continuation_across_crlf() {
        let props = parse("storeFile=/keys/\\\r\n  release.keystore\r\nkeyAlias=upload\r\n");
        assert_eq!(props.get("storeFile"), Some("/keys/release.keystore"));
        assert_eq!(props.get("keyAlias"), Some("upload"));
    }

    #[test]
    fn test_malformed_unicode_escape_is_error() {
        let err = Properties::parse("keyAlias=ok\nkeyPassword=\\u12G4\n", Path::new("key.properties"))
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::PropertiesParseError);
        assert!(err.message.contains("key.properties:2:"));
    }

    #[test]
    fn test_unpaired_surrogate_is_error() {
        assert!(Properties::parse("k=\\uD83D", Path::new("p")).is_err());
    }

    #[test]
    fn test_absent_behaves_as_empty() {
        let props = Properties::Absent;
        assert!(!props.is_loaded());
        assert!(props.is_empty());
        assert_eq!(props.get("keyAlias"), None);
    }

    #[test]
    fn test_load_missing_file_is_absent() {
        let dir = TempDir::new().unwrap();
        let props = Properties::load_optional(&dir.path().join("key.properties")).unwrap();
        assert_eq!(props, Properties::Absent);
    }

    #[test]
    fn test_load_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("key.properties");
        std::fs::write(&path, "storeFile=release.keystore\n").unwrap();

        let props = Properties::load_optional(&path).unwrap();
        assert!(props.is_loaded());
        assert_eq!(props.get("storeFile"), Some("release.keystore"));
    }

    #[test]
    fn test_load_latin1_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("key.properties");
        std::fs::write(&path, b"keyAlias=upload\nkeyPassword=caf\xe9\n").unwrap();

        let props = Properties::load_optional(&path).unwrap();
        assert_eq!(props.get("keyAlias"), Some("upload"));
        assert_eq!(props.get("keyPassword"), Some("café"));
    }

    #[test]
    fn test_load_utf8_file_is_not_reinterpreted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("key.properties");
        std::fs::write(&path, "keyPassword=café\n").unwrap();

        let props = Properties::load_optional(&path).unwrap();
        assert_eq!(props.get("keyPassword"), Some("café"));
    }

    #[test]
    fn test_load_directory_is_error() {
        let dir = TempDir::new().unwrap();
        assert!(Properties::load_optional(dir.path()).is_err());
    }
}
