use crate::sentence::first_sentence_end;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static PARAGRAPH: Lazy<Regex> = Lazy::new(|| Regex::new(r"<p>").expect("paragraph pattern"));
static BLANK_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[ \t\r\f]*\n").expect("blank line pattern"));
static TAG_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*@[a-z]+").expect("tag line pattern"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

/// A documentation comment split into title, body and block tags.
///
/// The title is the first sentence, the body whatever follows it up to the
/// first block tag. Tags are keyed by name (`param`, `return`, ...) and keep
/// their source order; each value is the tag text with whitespace collapsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocText {
    pub raw_text: String,
    pub title: String,
    pub body: String,
    pub tags: IndexMap<String, Vec<String>>,
}

impl DocText {
    pub fn parse(raw_text: &str) -> Self {
        let title = title_of(raw_text);
        let body = body_of(raw_text, &title);
        let tags = tags_of(raw_text);
        Self {
            raw_text: raw_text.to_string(),
            title,
            body,
            tags,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.raw_text.trim().is_empty()
    }

    /// All values of one tag; empty when the tag is absent.
    pub fn tags(&self, name: &str) -> &[String] {
        self.tags.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// First value of one tag.
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags(name).first().map(String::as_str)
    }

    /// Text of a tag whose first word names something, e.g. the description
    /// of `@param count how many` for `named_tag("param", "count")`.
    ///
    /// Returns an empty string when the tag names the item without a
    /// description.
    pub fn named_tag(&self, tag: &str, name: &str) -> Option<&str> {
        self.tags(tag).iter().find_map(|value| {
            let rest = value.strip_prefix(name)?;
            if rest.is_empty() {
                Some("")
            } else if rest.starts_with(char::is_whitespace) {
                Some(rest.trim())
            } else {
                None
            }
        })
    }

    /// Every value of a tag split into its leading name and description.
    pub fn named_tags(&self, tag: &str) -> IndexMap<String, String> {
        self.tags(tag)
            .iter()
            .map(|value| match value.split_once(' ') {
                Some((name, description)) => (name.to_string(), description.to_string()),
                None => (value.clone(), String::new()),
            })
            .collect()
    }

    /// Copy with the values of one tag replaced; an empty list removes it.
    pub fn with_tag_values(&self, name: &str, values: Vec<String>) -> Self {
        let mut copy = self.clone();
        if values.is_empty() {
            copy.tags.shift_remove(name);
        } else {
            copy.tags.insert(name.to_string(), values);
        }
        copy
    }
}

fn cut_at(text: &str, pattern: &Regex) -> String {
    match pattern.find(text) {
        Some(found) => text[..found.start()].trim().to_string(),
        None => text.trim().to_string(),
    }
}

fn title_of(raw: &str) -> String {
    let text = cut_at(raw, &PARAGRAPH);
    let text = cut_at(&text, &BLANK_LINE);
    let text = cut_at(&text, &TAG_LINE);
    text[..first_sentence_end(&text)].trim().to_string()
}

fn body_of(raw: &str, title: &str) -> String {
    let rest = match raw.find(title) {
        Some(index) => raw[index + title.len()..].trim(),
        None => raw.trim(),
    };
    if rest.starts_with('@') {
        return String::new();
    }
    cut_at(rest, &TAG_LINE)
}

fn tags_of(raw: &str) -> IndexMap<String, Vec<String>> {
    let mut tags: IndexMap<String, Vec<String>> = IndexMap::new();
    let mut open: Option<(String, String)> = None;

    for line in raw.lines() {
        let line = line.trim();
        if let Some(tag_line) = line.strip_prefix('@') {
            if let Some((name, text)) = open.take() {
                tags.entry(name).or_default().push(collapse(&text));
            }
            let (name, text) = tag_line
                .split_once(char::is_whitespace)
                .unwrap_or((tag_line, ""));
            open = Some((name.to_string(), text.to_string()));
        } else if let Some((_, text)) = open.as_mut() {
            text.push(' ');
            text.push_str(line);
        }
    }
    if let Some((name, text)) = open {
        tags.entry(name).or_default().push(collapse(&text));
    }
    tags
}

fn collapse(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}
