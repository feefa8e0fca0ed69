use tracing::debug;

/// Result of removing `@param` tags that name parameters a member no longer has.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamTagOutcome {
    pub text: String,
    /// Names referenced by the removed tags, in text order.
    pub removed: Vec<String>,
}

/// Drops every `@param` block whose name is not among `parameters`.
///
/// A block is the tag line plus the continuation lines up to the next tag.
/// Type parameter tags (`@param <T>`) are checked against
/// `type_parameters` instead. Everything else is kept verbatim.
pub fn strip_stale_param_tags<P, T>(
    raw: &str,
    parameters: &[P],
    type_parameters: &[T],
) -> ParamTagOutcome
where
    P: AsRef<str>,
    T: AsRef<str>,
{
    let mut kept: Vec<&str> = Vec::new();
    let mut removed = Vec::new();
    let mut dropping = false;

    for line in raw.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with('@') {
            dropping = match stale_param_name(trimmed, parameters, type_parameters) {
                Some(name) => {
                    removed.push(name.to_string());
                    true
                }
                None => false,
            };
        }
        if !dropping {
            kept.push(line);
        }
    }

    if removed.is_empty() {
        return ParamTagOutcome {
            text: raw.to_string(),
            removed,
        };
    }

    debug!(removed = ?removed, "dropping documentation for missing parameters");
    ParamTagOutcome {
        text: kept.join("\n").trim_end().to_string(),
        removed,
    }
}

fn stale_param_name<'a, P, T>(
    tag_line: &'a str,
    parameters: &[P],
    type_parameters: &[T],
) -> Option<&'a str>
where
    P: AsRef<str>,
    T: AsRef<str>,
{
    let rest = tag_line.strip_prefix("@param")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let name = rest.split_whitespace().next()?;

    let known = match name
        .strip_prefix('<')
        .and_then(|inner| inner.strip_suffix('>'))
    {
        Some(type_parameter) => type_parameters
            .iter()
            .any(|known| known.as_ref() == type_parameter),
        None => parameters.iter().any(|known| known.as_ref() == name),
    };
    (!known).then_some(name)
}
