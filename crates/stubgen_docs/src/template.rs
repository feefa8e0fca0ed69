//! `{{...}}` placeholders in documentation text.
//!
//! Three forms are expanded, in this order:
//!
//! - `{{key?then}}` / `{{key?then:else}}` picks a branch depending on whether
//!   `key` is present in the value table;
//! - `{{param:name?then}}` / `{{param:name?then:else}}` does the same against
//!   the parameter names of the documented member;
//! - `{{key}}` / `{{key:default}}` is replaced by the value for `key`, the
//!   default text, or the key itself.
//!
//! Text produced by one form is never scanned by a later one.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

pub type TemplateValues = IndexMap<String, String>;

static KEY_CONDITIONAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"( ?)\{\{(\w+)\?([^}:]+)(?::([^}]+))?\}\}( ?)").expect("conditional pattern")
});
static PARAM_CONDITIONAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"( ?)\{\{param:(\w+)\?([^}:]+)(?::([^}]+))?\}\}( ?)")
        .expect("param conditional pattern")
});
static VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{(\w+)(?::([^}:]+))?\}\}").expect("value pattern"));

/// A run of text; `expanded` marks output of an earlier pass.
struct Segment {
    text: String,
    expanded: bool,
}

pub fn render_templates<S: AsRef<str>>(
    raw: &str,
    values: &TemplateValues,
    parameters: &[S],
) -> String {
    let segments = vec![Segment {
        text: raw.to_string(),
        expanded: false,
    }];

    let segments = expand(segments, &KEY_CONDITIONAL, |caps| {
        choose_branch(caps, values.contains_key(&caps[2]))
    });
    let segments = expand(segments, &PARAM_CONDITIONAL, |caps| {
        let name = &caps[2];
        choose_branch(caps, parameters.iter().any(|param| param.as_ref() == name))
    });
    let segments = expand(segments, &VALUE, |caps| {
        let key = &caps[1];
        match values.get(key) {
            Some(value) => value.clone(),
            None => caps
                .get(2)
                .map_or_else(|| key.to_string(), |default| default.as_str().to_string()),
        }
    });

    let rendered: String = segments.iter().map(|segment| segment.text.as_str()).collect();
    rendered.trim().to_string()
}

fn choose_branch(caps: &Captures<'_>, present: bool) -> String {
    let leading = &caps[1];
    let trailing = &caps[5];
    if present {
        return format!("{leading}{}{trailing}", &caps[3]);
    }
    match caps.get(4) {
        Some(otherwise) => format!("{leading}{}{trailing}", otherwise.as_str()),
        // Keep one separating space when the placeholder sat between words.
        None if leading.is_empty() => trailing.to_string(),
        None if trailing == " " => " ".to_string(),
        None => String::new(),
    }
}

fn expand<F>(segments: Vec<Segment>, pattern: &Regex, mut replace: F) -> Vec<Segment>
where
    F: FnMut(&Captures<'_>) -> String,
{
    let mut out = Vec::with_capacity(segments.len());
    for segment in segments {
        if segment.expanded {
            out.push(segment);
            continue;
        }

        let mut last = 0;
        for caps in pattern.captures_iter(&segment.text) {
            let Some(whole) = caps.get(0) else { continue };
            if whole.start() > last {
                out.push(Segment {
                    text: segment.text[last..whole.start()].to_string(),
                    expanded: false,
                });
            }
            out.push(Segment {
                text: replace(&caps),
                expanded: true,
            });
            last = whole.end();
        }
        if last < segment.text.len() {
            out.push(Segment {
                text: segment.text[last..].to_string(),
                expanded: false,
            });
        }
    }
    out
}
