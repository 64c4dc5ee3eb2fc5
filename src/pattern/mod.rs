//! Route template compiler.
//!
//! A template such as `/users/{id:\d+}[/{+rest}]` compiles into a
//! [`RoutePattern`], which is a single anchored regular expression over the
//! whole path plus the bookkeeping needed to hand captures back by name or
//! position.
//!
//! | Syntax          | Meaning                                     |
//! |-----------------|---------------------------------------------|
//! | `{}` `{name}`   | one path component, `[^/]+`                 |
//! | `{:re}` `{name:re}` | one capture matching `re`               |
//! | `{+}` `{+name}` | greedy capture, `.+`, may span `/`          |
//! | `[...]`         | optional group, nestable                    |
//! | anything else   | literal text, matched as-is                 |

mod captures;
mod error;
mod segment;
mod tests;

use std::fmt;

use regex::Regex;

pub use captures::Captures;
pub use error::Error;
pub use segment::{Segment, DEFAULT_CAPTURE, GREEDY_CAPTURE};

const GROUP_PREFIX: &str = "__route";

/// A compiled route template.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    template: String,
    segments: Vec<Segment>,
    regex: Regex,
    // One entry per capture segment: its name and its regex group index.
    slots: Vec<(Option<String>, usize)>,
}

impl RoutePattern {
    /// Compile a route template.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidTemplate`] if the template does not start with `/`,
    /// [`Error::Malformed`] for unbalanced brackets, repeated capture names or
    /// an expression that does not compile.
    pub fn compile(template: &str) -> Result<Self, Error> {
        if !template.starts_with('/') {
            return Err(Error::InvalidTemplate(template.to_string()));
        }

        let segments = segment::parse(template)?;

        let mut source = String::from("^");
        let mut names = Vec::new();
        render(&segments, &mut source, &mut names);
        source.push('$');

        let regex = Regex::new(&source)
            .map_err(|e| Error::malformed(template, format!("compiled expression rejected: {e}")))?;

        let slots = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                let group = group_name(i);
                regex
                    .capture_names()
                    .position(|n| n == Some(group.as_str()))
                    .map(|index| (name, index))
                    .ok_or_else(|| Error::malformed(template, "capture group was lost during compilation"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            template: template.to_string(),
            segments,
            regex,
            slots,
        })
    }

    /// Test whether `path` matches this pattern exactly.
    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Match `path` and extract the captures, or `None` if it does not match.
    pub fn match_with_captures(&self, path: &str) -> Option<Captures> {
        let found = self.regex.captures(path)?;
        let mut captures = Captures::default();
        for (name, index) in &self.slots {
            let value = found.get(*index).map(|m| m.as_str().to_string());
            captures.push(name.clone(), value);
        }
        Some(captures)
    }

    /// The template this pattern was compiled from.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// The parsed segments.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The anchored regular expression the template compiled to.
    pub fn as_regex(&self) -> &Regex {
        &self.regex
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

fn group_name(index: usize) -> String {
    format!("{GROUP_PREFIX}{index}")
}

fn render(segments: &[Segment], out: &mut String, names: &mut Vec<Option<String>>) {
    for segment in segments {
        match segment {
            Segment::Literal(text) => out.push_str(&regex::escape(text)),
            Segment::Capture { name, regex } => {
                out.push_str(&format!("(?P<{}>{regex})", group_name(names.len())));
                names.push(name.clone());
            }
            Segment::Optional(inner) => {
                out.push_str("(?:");
                render(inner, out, names);
                out.push_str(")?");
            }
        }
    }
}
