//! Path pattern compilation — templates in, match boundaries and decoded
//! parameters out.
//!
//! A [`Matcher`] is compiled once from a [`PathSpec`] and a set of
//! [`PatternOptions`], then tested against request paths for the lifetime of
//! the process. The template language:
//!
//! | Template             | Matches                 | Params                        |
//! |----------------------|-------------------------|-------------------------------|
//! | `/users`             | `/users`, `/users/`     | *(none)*                      |
//! | `/users/:id`         | `/users/42`             | `id → "42"`                   |
//! | `/users/:id(\d+)`    | `/users/42` only        | `id → "42"`                   |
//! | `/files/:path*`      | `/files`, `/files/a/b`  | `path → "a/b"`                |
//! | `/:lang?/docs`       | `/docs`, `/fr/docs`     | `lang → "fr"` when present    |
//! | `/photo{.:ext}?`     | `/photo`, `/photo.png`  | `ext → "png"` when present    |
//!
//! Literal template text is run through [`encode_uri`] before compilation, so
//! `/café` matches the wire form `/caf%C3%A9`. Captured values are decoded
//! with [`decode_uri_component`].
//!
//! # Examples
//!
//! ```
//! use fetch_router::pattern::{Matcher, PatternOptions};
//!
//! let matcher = Matcher::compile("/users/:id", &PatternOptions::default()).unwrap();
//! let m = matcher.matches("/users/caf%C3%A9").unwrap().unwrap();
//! assert_eq!((m.index, m.matched_len), (0, 16));
//! assert_eq!(m.params.get("id"), Some("café"));
//!
//! assert!(matcher.matches("/posts/1").unwrap().is_none());
//! ```

use std::fmt;

use regex::{Captures, Regex};
use serde::Deserialize;
use thiserror::Error;

use crate::context::Params;

pub mod encoding;
mod parse;

pub use encoding::{DecodeError, decode_uri_component, encode_uri};

use parse::Token;

/// Characters that end a path segment.
const DELIMITER_CLASS: &str = "[/#?]";

/// A path pattern could not be compiled.
///
/// Always raised while building middleware, never while serving a request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PatternError {
    #[error("unexpected {found} at {index}, expected {expected}")]
    Unexpected {
        found: &'static str,
        index: usize,
        expected: &'static str,
    },

    #[error("missing parameter name at {index}")]
    MissingName { index: usize },

    #[error("pattern cannot start with \"?\" at {index}")]
    LeadingQuestionMark { index: usize },

    #[error("capturing groups are not allowed at {index}")]
    CapturingGroup { index: usize },

    #[error("unbalanced pattern at {index}")]
    UnbalancedPattern { index: usize },

    #[error("missing pattern at {index}")]
    MissingPattern { index: usize },

    #[error("escape character at {index} has nothing to escape")]
    DanglingEscape { index: usize },

    #[error("can not repeat \"{name}\" without a prefix and suffix")]
    RepeatWithoutAffix { name: String },

    #[error("a path list must contain at least one path")]
    EmptyList,

    #[error("invalid regular expression: {0}")]
    Regex(#[from] regex::Error),
}

/// Options controlling how a template compiles.
///
/// Deserializable so route tables can be loaded from configuration; absent
/// keys keep their defaults.
///
/// # Examples
///
/// ```
/// use fetch_router::pattern::PatternOptions;
///
/// let mount = PatternOptions::default().end(false);
/// assert!(!mount.end && mount.start && !mount.strict && !mount.sensitive);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PatternOptions {
    /// The match must reach the end of the tested path.
    pub end: bool,
    /// The match must begin at the start of the tested path.
    pub start: bool,
    /// Disallow the optional trailing delimiter.
    pub strict: bool,
    /// Match literal text case-sensitively.
    pub sensitive: bool,
}

impl Default for PatternOptions {
    fn default() -> Self {
        Self {
            end: true,
            start: true,
            strict: false,
            sensitive: false,
        }
    }
}

impl PatternOptions {
    #[must_use]
    pub fn end(mut self, end: bool) -> Self {
        self.end = end;
        self
    }

    #[must_use]
    pub fn start(mut self, start: bool) -> Self {
        self.start = start;
        self
    }

    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    #[must_use]
    pub fn sensitive(mut self, sensitive: bool) -> Self {
        self.sensitive = sensitive;
        self
    }
}

/// What a path gate matches against.
#[derive(Debug, Clone)]
pub enum PathSpec {
    /// A template such as `/users/:id`.
    Template(String),
    /// A ready-made expression. Named groups become named params, unnamed
    /// groups are keyed `"0"`, `"1"`, ... Options do not apply.
    Regex(Regex),
    /// Alternatives; the leftmost match wins, ties go to the earlier entry.
    List(Vec<PathSpec>),
}

impl From<&str> for PathSpec {
    fn from(template: &str) -> Self {
        Self::Template(template.to_owned())
    }
}

impl From<String> for PathSpec {
    fn from(template: String) -> Self {
        Self::Template(template)
    }
}

impl From<Regex> for PathSpec {
    fn from(regex: Regex) -> Self {
        Self::Regex(regex)
    }
}

impl<T: Into<PathSpec>> From<Vec<T>> for PathSpec {
    fn from(specs: Vec<T>) -> Self {
        Self::List(specs.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for PathSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Template(t) => f.write_str(t),
            Self::Regex(r) => write!(f, "/{}/", r.as_str()),
            Self::List(specs) => {
                for (i, spec) in specs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{spec}")?;
                }
                Ok(())
            }
        }
    }
}

/// One successful match of a [`Matcher`] against a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    /// Byte offset where the match starts.
    pub index: usize,
    /// Number of bytes the match consumed.
    pub matched_len: usize,
    /// Decoded captures.
    pub params: Params,
}

impl MatchResult {
    /// `path` with the matched range cut out — what a mounted gate sees next.
    pub fn remainder(&self, path: &str) -> String {
        let end = self.index + self.matched_len;
        let mut rest = String::with_capacity(path.len().saturating_sub(self.matched_len));
        rest.push_str(&path[..self.index]);
        rest.push_str(&path[end..]);
        rest
    }
}

#[derive(Debug, Clone)]
struct ParamKey {
    name: String,
    // Set for `*`/`+` keys: repeated captures are split on it, decoded
    // piecewise and re-joined.
    separator: Option<String>,
}

#[derive(Debug, Clone)]
struct Compiled {
    regex: Regex,
    keys: Vec<ParamKey>,
    // Group holding the consumed text; the first key group follows it.
    consumed_group: usize,
}

impl Compiled {
    fn from_template(template: &str, options: &PatternOptions) -> Result<Self, PatternError> {
        let tokens = parse::parse(template)?;
        let mut body = String::new();
        let mut keys = Vec::new();

        for token in &tokens {
            match token {
                Token::Text(text) => body.push_str(&regex::escape(&encode_uri(text))),
                Token::Key(key) => {
                    let prefix = regex::escape(&encode_uri(&key.prefix));
                    let suffix = regex::escape(&encode_uri(&key.suffix));
                    let modifier = key.modifier.as_regex();

                    if key.pattern.is_empty() {
                        body.push_str(&format!("(?:{prefix}{suffix}){modifier}"));
                        continue;
                    }

                    let pattern = &key.pattern;
                    let affixed = !prefix.is_empty() || !suffix.is_empty();
                    if key.modifier.is_repeat() {
                        if !affixed {
                            return Err(PatternError::RepeatWithoutAffix {
                                name: key.name.clone(),
                            });
                        }
                        let optional = if modifier == "*" { "?" } else { "" };
                        body.push_str(&format!(
                            "(?:{prefix}((?:{pattern})(?:{suffix}{prefix}(?:{pattern}))*){suffix}){optional}"
                        ));
                    } else if affixed {
                        body.push_str(&format!("(?:{prefix}({pattern}){suffix}){modifier}"));
                    } else {
                        body.push_str(&format!("({pattern}){modifier}"));
                    }

                    keys.push(ParamKey {
                        name: key.name.clone(),
                        separator: key
                            .modifier
                            .is_repeat()
                            .then(|| format!("{}{}", key.prefix, key.suffix)),
                    });
                }
            }
        }

        let flags = if options.sensitive { "" } else { "(?i)" };
        let anchor = if options.start { "^" } else { "" };
        // The consumed text sits in group 1. `regex` has no lookahead, so the
        // "followed by a delimiter" check consumes outside that group.
        let source = if options.end {
            let trailing = if options.strict { "" } else { "[/#?]?" };
            format!("{flags}{anchor}({body}{trailing})$")
        } else {
            let trailing = if options.strict {
                String::new()
            } else {
                format!("(?:{DELIMITER_CLASS}$)?")
            };
            let boundary = if ends_with_delimiter(&tokens) {
                String::new()
            } else {
                format!("(?:{DELIMITER_CLASS}|$)")
            };
            format!("{flags}{anchor}({body}{trailing}){boundary}")
        };

        let regex = Regex::new(&source)?;
        // Inline `(?<name>...)` groups inside custom patterns would shift keys.
        if regex.captures_len() != keys.len() + 2 {
            return Err(PatternError::CapturingGroup { index: 0 });
        }

        Ok(Self {
            regex,
            keys,
            consumed_group: 1,
        })
    }

    fn from_regex(regex: Regex) -> Self {
        let mut unnamed = 0usize;
        let keys = regex
            .capture_names()
            .skip(1)
            .map(|name| {
                let name = name.map_or_else(
                    || {
                        let key = unnamed.to_string();
                        unnamed += 1;
                        key
                    },
                    str::to_owned,
                );
                ParamKey {
                    name,
                    separator: None,
                }
            })
            .collect();
        Self {
            regex,
            keys,
            consumed_group: 0,
        }
    }

    // Returns the captures and the consumed range's start offset.
    fn find<'p>(&self, path: &'p str) -> Option<(Captures<'p>, usize)> {
        let caps = self.regex.captures(path)?;
        let start = caps.get(self.consumed_group)?.start();
        Some((caps, start))
    }

    fn extract(&self, caps: &Captures<'_>) -> Result<MatchResult, DecodeError> {
        let mut params = Params::new();
        let first = self.consumed_group + 1;

        for (offset, key) in self.keys.iter().enumerate() {
            let Some(value) = caps.get(first + offset) else {
                continue;
            };
            let decoded = match key.separator.as_deref() {
                Some(sep) if !sep.is_empty() => value
                    .as_str()
                    .split(sep)
                    .map(|piece| decode_uri_component(piece).map(|d| d.into_owned()))
                    .collect::<Result<Vec<_>, _>>()?
                    .join(sep),
                _ => decode_uri_component(value.as_str())?.into_owned(),
            };
            params.insert(key.name.clone(), decoded);
        }

        // Group 0 always participates, and `consumed_group` is never optional.
        let consumed = caps
            .get(self.consumed_group)
            .map_or((0, 0), |m| (m.start(), m.len()));
        Ok(MatchResult {
            index: consumed.0,
            matched_len: consumed.1,
            params,
        })
    }
}

fn ends_with_delimiter(tokens: &[Token]) -> bool {
    match tokens.last() {
        None => true,
        Some(Token::Text(text)) => text.ends_with(['/', '#', '?']),
        Some(Token::Key(_)) => false,
    }
}

/// A compiled path pattern.
#[derive(Debug, Clone)]
pub struct Matcher {
    source: String,
    alternatives: Vec<Compiled>,
}

impl Matcher {
    /// Compiles `spec` under `options`.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] when the template is malformed, a custom
    /// parameter pattern is not a valid expression, or a list is empty.
    pub fn compile(spec: impl Into<PathSpec>, options: &PatternOptions) -> Result<Self, PatternError> {
        let spec = spec.into();
        let mut alternatives = Vec::new();
        flatten(&spec, options, &mut alternatives)?;
        if alternatives.is_empty() {
            return Err(PatternError::EmptyList);
        }
        Ok(Self {
            source: spec.to_string(),
            alternatives,
        })
    }

    /// The pattern this matcher was compiled from, for diagnostics.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Tests `path`, returning the match boundaries and decoded params.
    ///
    /// Matching is single-shot: at most one alternative is chosen, and only
    /// its captures are decoded.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] when a captured segment of the chosen match
    /// is not valid percent-encoded UTF-8.
    pub fn matches(&self, path: &str) -> Result<Option<MatchResult>, DecodeError> {
        let mut best: Option<(&Compiled, Captures<'_>, usize)> = None;
        for alt in &self.alternatives {
            if let Some((caps, start)) = alt.find(path) {
                if best.as_ref().is_none_or(|(_, _, s)| start < *s) {
                    best = Some((alt, caps, start));
                }
            }
        }
        best.map(|(alt, caps, _)| alt.extract(&caps)).transpose()
    }
}

fn flatten(
    spec: &PathSpec,
    options: &PatternOptions,
    out: &mut Vec<Compiled>,
) -> Result<(), PatternError> {
    match spec {
        PathSpec::Template(template) => out.push(Compiled::from_template(template, options)?),
        PathSpec::Regex(regex) => out.push(Compiled::from_regex(regex.clone())),
        PathSpec::List(specs) => {
            for spec in specs {
                flatten(spec, options, out)?;
            }
        }
    }
    Ok(())
}

/// Compiles `spec`; shorthand for [`Matcher::compile`].
pub fn compile(spec: impl Into<PathSpec>, options: &PatternOptions) -> Result<Matcher, PatternError> {
    Matcher::compile(spec, options)
}
