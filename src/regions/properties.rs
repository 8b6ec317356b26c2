//! `.properties` file reading and writing
//!
//! Region data is exchanged as Java-style property files so that an OSGi
//! framework can load it directly.
//!
//! ## Supported syntax
//!
//! - Comments: lines whose first non-blank character is `#` or `!`
//! - Separators: `=`, `:` or whitespace between key and value
//! - Escapes: `\t`, `\n`, `\r`, `\f`, `\uXXXX` and `\` before any other
//!   character
//! - Line continuation: an odd number of trailing backslashes joins the
//!   next line, whose leading blanks are dropped
//!
//! Output is sorted by key, with non-ASCII characters written as `\uXXXX`.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use crate::error::{Error, Result};

/// An ordered set of string properties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: BTreeMap<String, String>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse property file content.
    pub fn parse(content: &str) -> Self {
        let mut entries = BTreeMap::new();
        for line in logical_lines(content) {
            let (key, value) = split_entry(&line);
            entries.insert(unescape(key), unescape(value));
        }
        Self { entries }
    }

    /// Load a property file. A missing file yields no properties.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let content = std::fs::read_to_string(path).map_err(Error::Io)?;
        Ok(Self::parse(&content))
    }

    /// Write the properties to `path`, creating parent directories.
    pub fn store(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(Error::Io)?;
            }
        }
        std::fs::write(path, self.to_content()).map_err(Error::Io)
    }

    /// Serialize to property file syntax.
    pub fn to_content(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.entries {
            out.push_str(&escape(key, true));
            out.push('=');
            out.push_str(&escape(value, false));
            out.push('\n');
        }
        out
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Split a comma-joined value into its non-empty, trimmed items.
pub fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// Join logical lines, dropping comments and blank lines.
fn logical_lines(content: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut pending: Option<String> = None;

    for raw in content.lines() {
        let line = raw.trim_start();
        let continuing = pending.is_some();
        if !continuing && (line.is_empty() || line.starts_with('#') || line.starts_with('!')) {
            continue;
        }

        let trailing = line.chars().rev().take_while(|c| *c == '\\').count();
        let (body, continues) = if trailing % 2 == 1 {
            (&line[..line.len() - 1], true)
        } else {
            (line, false)
        };

        let mut current = pending.take().unwrap_or_default();
        current.push_str(body);
        if continues {
            pending = Some(current);
        } else {
            lines.push(current);
        }
    }
    if let Some(last) = pending {
        lines.push(last);
    }
    lines
}

/// Split a logical line at the first unescaped separator.
fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' | ' ' | '\t' | '\x0c' => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }
    let key = &line[..key_end];
    let rest = line[key_end..].trim_start_matches([' ', '\t', '\x0c']);
    let rest = rest
        .strip_prefix('=')
        .or_else(|| rest.strip_prefix(':'))
        .unwrap_or(rest);
    (key, rest.trim_start_matches([' ', '\t', '\x0c']))
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
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
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let unit = u16::from_str_radix(&hex, 16).ok();
                match unit {
                    Some(high @ 0xD800..=0xDBFF) => {
                        // surrogate pair
                        let low = (chars.peek() == Some(&'\\'))
                            .then(|| {
                                let rest: String = chars.clone().skip(1).take(5).collect();
                                rest.strip_prefix('u')
                                    .and_then(|h| u16::from_str_radix(h, 16).ok())
                            })
                            .flatten();
                        match low {
                            Some(low) => {
                                chars.by_ref().take(6).for_each(drop);
                                out.extend(char::decode_utf16([high, low]).map(|r| {
                                    r.unwrap_or(char::REPLACEMENT_CHARACTER)
                                }));
                            }
                            None => out.push(char::REPLACEMENT_CHARACTER),
                        }
                    }
                    Some(unit) => out.push(char::from_u32(unit.into()).unwrap_or(char::REPLACEMENT_CHARACTER)),
                    None => out.push_str(&hex),
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

fn escape(text: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, c) in text.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x0c' => out.push_str("\\f"),
            '=' | ':' | '#' | '!' => {
                out.push('\\');
                out.push(c);
            }
            ' ' if is_key || i == 0 => out.push_str("\\ "),
            c if (c as u32) < 0x20 || (c as u32) > 0x7e => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    let _ = write!(out, "\\u{:04X}", unit);
                }
            }
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    mod parse_tests {
        use super::*;

        #[test]
        fn test_separators_and_comments() {
            let props = Properties::parse(
                "# comment\n! also a comment\n\na=1\nb: 2\nc 3\n  d   =   4  \n",
            );
            assert_eq!(props.len(), 4);
            assert_eq!(props.get("a"), Some("1"));
            assert_eq!(props.get("b"), Some("2"));
            assert_eq!(props.get("c"), Some("3"));
            assert_eq!(props.get("d"), Some("4  "));
        }

        #[test]
        fn test_escaped_key_characters() {
            let props = Properties::parse("org.example\\:a\\:1=feature\\:x\n");
            assert_eq!(props.get("org.example:a:1"), Some("feature:x"));
        }

        #[test]
        fn test_line_continuation() {
            let props = Properties::parse("list=a,\\\n    b,\\\n    c\nnext=x\n");
            assert_eq!(props.get("list"), Some("a,b,c"));
            assert_eq!(props.get("next"), Some("x"));
        }

        #[test]
        fn test_escaped_backslash_does_not_continue() {
            let props = Properties::parse("path=c:\\\\\nnext=x\n");
            assert_eq!(props.get("path"), Some("c:\\"));
            assert_eq!(props.get("next"), Some("x"));
        }

        #[test]
        fn test_unicode_escapes() {
            let props = Properties::parse("k=caf\\u00e9 \\ud83d\\ude00\n");
            assert_eq!(props.get("k"), Some("café 😀"));
        }
    }

    mod store_tests {
        use super::*;

        #[test]
        fn test_escaping_reads_back() {
            let mut props = Properties::new();
            props.insert("g:a:1", "g:f:1,g:f:2");
            props.insert("key with space", " leading");
            props.insert("unicode", "café 😀");
            let content = props.to_content();
            assert!(content.contains("g\\:a\\:1=g\\:f\\:1,g\\:f\\:2"));
            assert_eq!(Properties::parse(&content), props);
        }

        #[test]
        fn test_load_missing_file_is_empty() {
            let temp = TempDir::new().unwrap();
            let props = Properties::load(&temp.path().join("missing.properties")).unwrap();
            assert!(props.is_empty());
        }

        #[test]
        fn test_store_and_load() {
            let temp = TempDir::new().unwrap();
            let path = temp.path().join("nested/regions.properties");
            let mut props = Properties::new();
            props.insert("global", "a,b");
            props.store(&path).unwrap();
            assert_eq!(Properties::load(&path).unwrap(), props);
        }
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(" a, b,,c ").collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(split_list("").count(), 0);
    }
}
