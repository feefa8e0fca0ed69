use once_cell::sync::Lazy;
use regex::Regex;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{[^}]+\}\}").expect("placeholder pattern"));

const TERMINATORS: &[char] = &['.', '?', '!'];
const CLOSERS: &[char] = &[')', ']', '"', '\''];

/// Byte offset just past the first sentence of `text`, or `text.len()` when
/// the whole text is one sentence.
///
/// A sentence ends at `.`, `?` or `!` (plus any closing brackets or quotes)
/// followed by whitespace. After a period the next word must not start in
/// lower case, so abbreviations like `e.g. this` stay in one sentence.
/// Template placeholders are masked first so their contents never end a
/// sentence.
pub(crate) fn first_sentence_end(text: &str) -> usize {
    let masked = mask_placeholders(text);
    let chars: Vec<(usize, char)> = masked.char_indices().collect();

    let mut index = 0;
    while index < chars.len() {
        let (_, current) = chars[index];
        index += 1;
        if !TERMINATORS.contains(&current) {
            continue;
        }

        let mut end = index;
        while end < chars.len() && CLOSERS.contains(&chars[end].1) {
            end += 1;
        }
        let boundary = chars.get(end).map_or(masked.len(), |(offset, _)| *offset);
        if end == chars.len() {
            return boundary;
        }
        if !chars[end].1.is_whitespace() {
            continue;
        }

        let mut next = end;
        while next < chars.len() && chars[next].1.is_whitespace() {
            next += 1;
        }
        match chars.get(next) {
            None => return boundary,
            Some((_, word)) if current == '.' && word.is_lowercase() => continue,
            Some(_) => return boundary,
        }
    }
    masked.len()
}

/// Replaces every `{{...}}` with underscores of the same byte length.
fn mask_placeholders(text: &str) -> String {
    PLACEHOLDER
        .replace_all(text, |caps: &regex::Captures<'_>| "_".repeat(caps[0].len()))
        .into_owned()
}
