//! Reader for the `.properties` text format documentation is stored in
//! next to compiled classes.

use crate::store::MemberKey;
use indexmap::IndexMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertiesError {
    #[error("malformed \\uXXXX escape on line {line}")]
    MalformedUnicodeEscape { line: usize },
}

/// Documentation entries of one type, keyed by member key text
/// (`classDoc`, `field.name`, `method.name(int,java.lang.String)`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertiesDocumentation {
    entries: IndexMap<String, String>,
}

impl PropertiesDocumentation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(text: &str) -> Result<Self, PropertiesError> {
        let mut entries = IndexMap::new();
        for logical in logical_lines(text) {
            let (key, value) = split_entry(&logical.text);
            let key = unescape(key, logical.line)?;
            let value = unescape(value, logical.line)?;
            entries.insert(key, value);
        }
        Ok(Self { entries })
    }

    pub fn get(&self, key: &MemberKey) -> Option<&str> {
        self.entries.get(&key.to_string()).map(String::as_str)
    }

    pub fn get_raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: &MemberKey, text: impl Into<String>) {
        self.entries.insert(key.to_string(), text.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

struct LogicalLine {
    /// 1-based number of the physical line the entry starts on.
    line: usize,
    text: String,
}

/// Joins continuation lines and drops blank lines and comments.
fn logical_lines(text: &str) -> Vec<LogicalLine> {
    let mut lines = Vec::new();
    let mut current: Option<LogicalLine> = None;

    for (index, physical) in text.lines().enumerate() {
        let stripped = physical.trim_start_matches([' ', '\t', '\x0c']);
        let continuing = current.is_some();
        if !continuing && (stripped.is_empty() || stripped.starts_with(['#', '!'])) {
            continue;
        }

        let (content, continues) = match stripped.strip_suffix('\\') {
            // An even run of trailing backslashes is escaped backslashes.
            Some(without) if trailing_backslashes(stripped) % 2 == 1 => (without, true),
            _ => (stripped, false),
        };

        let entry = current.get_or_insert_with(|| LogicalLine {
            line: index + 1,
            text: String::new(),
        });
        entry.text.push_str(content);

        if !continues {
            lines.extend(current.take());
        }
    }
    lines.extend(current);
    lines
}

fn trailing_backslashes(text: &str) -> usize {
    text.chars().rev().take_while(|c| *c == '\\').count()
}

/// Splits at the first unescaped `=`, `:` or whitespace; whitespace around
/// the separator is not part of the key or value.
fn split_entry(text: &str) -> (&str, &str) {
    let mut escaped = false;
    for (index, current) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match current {
            '\\' => escaped = true,
            '=' | ':' => return (&text[..index], skip_blanks(&text[index + 1..])),
            ' ' | '\t' | '\x0c' => {
                let rest = skip_blanks(&text[index..]);
                let rest = match rest.strip_prefix(['=', ':']) {
                    Some(after) => skip_blanks(after),
                    None => rest,
                };
                return (&text[..index], rest);
            }
            _ => {}
        }
    }
    (text, "")
}

fn skip_blanks(text: &str) -> &str {
    text.trim_start_matches([' ', '\t', '\x0c'])
}

fn unescape(text: &str, line: usize) -> Result<String, PropertiesError> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    let mut pending_high: Option<u16> = None;

    while let Some(current) = chars.next() {
        if current != '\\' {
            flush_surrogate(&mut out, &mut pending_high);
            out.push(current);
            continue;
        }
        let Some(escaped) = chars.next() else { break };
        match escaped {
            'u' => {
                let digits: String = chars.by_ref().take(4).collect();
                let unit = (digits.len() == 4)
                    .then(|| u16::from_str_radix(&digits, 16).ok())
                    .flatten()
                    .ok_or(PropertiesError::MalformedUnicodeEscape { line })?;
                push_utf16_unit(&mut out, &mut pending_high, unit);
            }
            other => {
                flush_surrogate(&mut out, &mut pending_high);
                out.push(match other {
                    't' => '\t',
                    'n' => '\n',
                    'r' => '\r',
                    'f' => '\x0c',
                    literal => literal,
                });
            }
        }
    }
    flush_surrogate(&mut out, &mut pending_high);
    Ok(out)
}

/// `\uXXXX` escapes encode UTF-16 units, so characters outside the BMP
/// arrive as two consecutive escapes.
fn push_utf16_unit(out: &mut String, pending_high: &mut Option<u16>, unit: u16) {
    if let Some(high) = pending_high.take() {
        if let Some(Ok(decoded)) = char::decode_utf16([high, unit]).next() {
            if (0xDC00..=0xDFFF).contains(&unit) {
                out.push(decoded);
                return;
            }
        }
        out.push(char::REPLACEMENT_CHARACTER);
    }
    if (0xD800..=0xDBFF).contains(&unit) {
        *pending_high = Some(unit);
        return;
    }
    out.push(char::from_u32(u32::from(unit)).unwrap_or(char::REPLACEMENT_CHARACTER));
}

fn flush_surrogate(out: &mut String, pending_high: &mut Option<u16>) {
    if pending_high.take().is_some() {
        out.push(char::REPLACEMENT_CHARACTER);
    }
}
