//! Template segments and the template parser.

use std::collections::HashSet;
use std::str::Chars;

use regex::Regex;

use crate::pattern::error::Error;

/// Expression used by `{}` and `{name}` captures.
pub const DEFAULT_CAPTURE: &str = "[^/]+";

/// Expression used by `{+}` and `{+name}` captures.
pub const GREEDY_CAPTURE: &str = ".+";

/// One piece of a parsed route template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text that must appear verbatim in the path.
    Literal(String),
    /// A captured region of the path.
    Capture {
        /// Capture name; `None` for `{}`, `{+}` and `{:expr}`.
        name: Option<String>,
        /// The regular expression the captured text must satisfy.
        regex: String,
    },
    /// A bracketed group that may be absent as a whole.
    Optional(Vec<Segment>),
}

/// Parse a template into segments.
///
/// The leading `/` check is done by the caller; this only deals with the
/// capture and optional-group syntax.
pub(crate) fn parse(template: &str) -> Result<Vec<Segment>, Error> {
    let mut groups: Vec<Vec<Segment>> = vec![Vec::new()];
    let mut literal = String::new();
    let mut names = HashSet::new();
    let mut chars = template.chars();

    while let Some(c) = chars.next() {
        match c {
            '{' => {
                flush_literal(&mut literal, current_group(&mut groups));
                let capture = parse_capture(template, &mut chars, &mut names)?;
                current_group(&mut groups).push(capture);
            }
            '[' => {
                flush_literal(&mut literal, current_group(&mut groups));
                groups.push(Vec::new());
            }
            ']' => {
                flush_literal(&mut literal, current_group(&mut groups));
                if groups.len() == 1 {
                    return Err(Error::malformed(template, "unmatched ']'"));
                }
                let inner = groups.pop().unwrap_or_default();
                current_group(&mut groups).push(Segment::Optional(inner));
            }
            '}' => return Err(Error::malformed(template, "unmatched '}'")),
            _ => literal.push(c),
        }
    }

    flush_literal(&mut literal, current_group(&mut groups));
    if groups.len() != 1 {
        return Err(Error::malformed(template, "unclosed '['"));
    }
    Ok(groups.pop().unwrap_or_default())
}

fn current_group(groups: &mut [Vec<Segment>]) -> &mut Vec<Segment> {
    // The root group is never popped, so the slice is never empty.
    let last = groups.len() - 1;
    &mut groups[last]
}

fn flush_literal(literal: &mut String, into: &mut Vec<Segment>) {
    if !literal.is_empty() {
        into.push(Segment::Literal(std::mem::take(literal)));
    }
}

/// Parse the body of a `{...}` capture. The opening brace is already consumed.
fn parse_capture(
    template: &str,
    chars: &mut Chars<'_>,
    names: &mut HashSet<String>,
) -> Result<Segment, Error> {
    let body = read_capture_body(template, chars)?;

    let (name, regex) = if let Some(name) = body.strip_prefix('+') {
        if name.contains(':') {
            return Err(Error::malformed(
                template,
                format!("greedy capture '{{{body}}}' cannot carry an expression"),
            ));
        }
        (name, GREEDY_CAPTURE.to_string())
    } else if let Some((name, expr)) = body.split_once(':') {
        if expr.is_empty() {
            return Err(Error::malformed(
                template,
                format!("capture '{{{body}}}' has an empty expression"),
            ));
        }
        validate_expression(template, expr)?;
        (name, expr.to_string())
    } else {
        (body.as_str(), DEFAULT_CAPTURE.to_string())
    };

    let name = if name.is_empty() {
        None
    } else {
        if !names.insert(name.to_string()) {
            return Err(Error::malformed(
                template,
                format!("capture name '{name}' is used more than once"),
            ));
        }
        Some(name.to_string())
    };

    Ok(Segment::Capture { name, regex })
}

/// Read up to the `}` that closes the current capture. Braces inside the
/// body (such as `\d{2,4}`) must balance; `\` escapes the next character.
fn read_capture_body(template: &str, chars: &mut Chars<'_>) -> Result<String, Error> {
    let mut body = String::new();
    let mut depth = 0usize;

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                body.push(c);
                match chars.next() {
                    Some(escaped) => body.push(escaped),
                    None => break,
                }
            }
            '{' => {
                depth += 1;
                body.push(c);
            }
            '}' if depth == 0 => return Ok(body),
            '}' => {
                depth -= 1;
                body.push(c);
            }
            _ => body.push(c),
        }
    }

    Err(Error::malformed(template, "unclosed '{'"))
}

fn validate_expression(template: &str, expr: &str) -> Result<(), Error> {
    Regex::new(&format!("^(?:{expr})$"))
        .map(|_| ())
        .map_err(|e| Error::malformed(template, format!("invalid expression '{expr}': {e}")))
}
