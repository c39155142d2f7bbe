//! Path template lexer and parser.
//!
//! Turns a template such as `/users/:id(\d+)/{files/:path+}?` into a flat list
//! of [`Token`]s: literal text runs and parameter [`Key`]s. Positions in
//! errors are character offsets into the template.

use super::PatternError;

/// Characters a parameter may be prefixed with (`/:id`, `.:ext`).
const PREFIXES: &str = "./";

/// Default parameter pattern: one or more non-delimiter characters, lazily.
pub(crate) const DEFAULT_PATTERN: &str = "[^/#?]+?";

/// How many times a parameter may occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Modifier {
    One,
    Optional,
    ZeroOrMore,
    OneOrMore,
}

impl Modifier {
    pub(crate) fn as_regex(self) -> &'static str {
        match self {
            Self::One => "",
            Self::Optional => "?",
            Self::ZeroOrMore => "*",
            Self::OneOrMore => "+",
        }
    }

    pub(crate) fn is_repeat(self) -> bool {
        matches!(self, Self::ZeroOrMore | Self::OneOrMore)
    }
}

/// A parameter (or a bare `{...}` group when `pattern` is empty).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Key {
    pub name: String,
    pub prefix: String,
    pub suffix: String,
    pub pattern: String,
    pub modifier: Modifier,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Text(String),
    Key(Key),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Open,
    Close,
    Pattern,
    Name,
    Char,
    Escaped,
    Modifier,
    End,
}

impl Kind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Close => "CLOSE",
            Self::Pattern => "PATTERN",
            Self::Name => "NAME",
            Self::Char => "CHAR",
            Self::Escaped => "ESCAPED_CHAR",
            Self::Modifier => "MODIFIER",
            Self::End => "END",
        }
    }
}

#[derive(Debug)]
struct Lexeme {
    kind: Kind,
    index: usize,
    value: String,
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn lex(template: &str) -> Result<Vec<Lexeme>, PatternError> {
    let chars: Vec<char> = template.chars().collect();
    let mut out = Vec::new();
    let mut i = 0;

    let mut push = |kind, index, value: String| out.push(Lexeme { kind, index, value });

    while i < chars.len() {
        let c = chars[i];
        match c {
            '*' | '+' | '?' => {
                push(Kind::Modifier, i, c.to_string());
                i += 1;
            }
            '\\' => {
                let escaped = chars
                    .get(i + 1)
                    .ok_or(PatternError::DanglingEscape { index: i })?;
                push(Kind::Escaped, i, escaped.to_string());
                i += 2;
            }
            '{' => {
                push(Kind::Open, i, c.to_string());
                i += 1;
            }
            '}' => {
                push(Kind::Close, i, c.to_string());
                i += 1;
            }
            ':' => {
                let name: String = chars[i + 1..]
                    .iter()
                    .take_while(|c| is_name_char(**c))
                    .collect();
                if name.is_empty() {
                    return Err(PatternError::MissingName { index: i });
                }
                let len = name.chars().count();
                push(Kind::Name, i, name);
                i += 1 + len;
            }
            '(' => {
                let (pattern, next) = lex_pattern(&chars, i)?;
                push(Kind::Pattern, i, pattern);
                i = next;
            }
            _ => {
                push(Kind::Char, i, c.to_string());
                i += 1;
            }
        }
    }

    push(Kind::End, i, String::new());
    Ok(out)
}

// Reads a balanced `( ... )` starting at `open`; returns the inner text and
// the index just past the closing paren.
fn lex_pattern(chars: &[char], open: usize) -> Result<(String, usize), PatternError> {
    let mut depth = 1;
    let mut pattern = String::new();
    let mut j = open + 1;

    if chars.get(j) == Some(&'?') {
        return Err(PatternError::LeadingQuestionMark { index: j });
    }

    while j < chars.len() {
        match chars[j] {
            '\\' => {
                pattern.push('\\');
                if let Some(c) = chars.get(j + 1) {
                    pattern.push(*c);
                }
                j += 2;
                continue;
            }
            ')' => {
                depth -= 1;
                if depth == 0 {
                    j += 1;
                    break;
                }
            }
            '(' => {
                depth += 1;
                if chars.get(j + 1) != Some(&'?') {
                    return Err(PatternError::CapturingGroup { index: j });
                }
            }
            _ => {}
        }
        pattern.push(chars[j]);
        j += 1;
    }

    if depth != 0 {
        return Err(PatternError::UnbalancedPattern { index: open });
    }
    if pattern.is_empty() {
        return Err(PatternError::MissingPattern { index: open });
    }
    Ok((pattern, j))
}

struct Parser {
    lexemes: Vec<Lexeme>,
    pos: usize,
}

impl Parser {
    fn try_consume(&mut self, kind: Kind) -> Option<String> {
        let lexeme = self.lexemes.get(self.pos)?;
        if lexeme.kind != kind {
            return None;
        }
        self.pos += 1;
        Some(lexeme.value.clone())
    }

    fn must_consume(&mut self, kind: Kind) -> Result<String, PatternError> {
        if let Some(value) = self.try_consume(kind) {
            return Ok(value);
        }
        let (found, index) = self
            .lexemes
            .get(self.pos)
            .map_or((Kind::End, 0), |l| (l.kind, l.index));
        Err(PatternError::Unexpected {
            found: found.as_str(),
            index,
            expected: kind.as_str(),
        })
    }

    fn consume_text(&mut self) -> String {
        let mut text = String::new();
        while let Some(value) = self
            .try_consume(Kind::Char)
            .or_else(|| self.try_consume(Kind::Escaped))
        {
            text.push_str(&value);
        }
        text
    }

    fn modifier(&mut self) -> Modifier {
        match self.try_consume(Kind::Modifier).as_deref() {
            Some("?") => Modifier::Optional,
            Some("*") => Modifier::ZeroOrMore,
            Some("+") => Modifier::OneOrMore,
            _ => Modifier::One,
        }
    }
}

/// Parses a path template into tokens.
pub(crate) fn parse(template: &str) -> Result<Vec<Token>, PatternError> {
    let mut parser = Parser {
        lexemes: lex(template)?,
        pos: 0,
    };
    let mut tokens = Vec::new();
    let mut unnamed = 0usize;
    let mut path = String::new();

    let mut next_unnamed = || {
        let key = unnamed.to_string();
        unnamed += 1;
        key
    };

    while parser.pos < parser.lexemes.len() {
        let ch = parser.try_consume(Kind::Char);
        let name = parser.try_consume(Kind::Name);
        let pattern = parser.try_consume(Kind::Pattern);

        if name.is_some() || pattern.is_some() {
            let mut prefix = ch.unwrap_or_default();
            if !PREFIXES.contains(prefix.as_str()) {
                path.push_str(&prefix);
                prefix.clear();
            }
            if !path.is_empty() {
                tokens.push(Token::Text(std::mem::take(&mut path)));
            }
            tokens.push(Token::Key(Key {
                name: name.unwrap_or_else(&mut next_unnamed),
                prefix,
                suffix: String::new(),
                pattern: pattern.unwrap_or_else(|| DEFAULT_PATTERN.to_owned()),
                modifier: parser.modifier(),
            }));
            continue;
        }

        if let Some(value) = ch.or_else(|| parser.try_consume(Kind::Escaped)) {
            path.push_str(&value);
            continue;
        }

        if !path.is_empty() {
            tokens.push(Token::Text(std::mem::take(&mut path)));
        }

        if parser.try_consume(Kind::Open).is_some() {
            let prefix = parser.consume_text();
            let name = parser.try_consume(Kind::Name).unwrap_or_default();
            let pattern = parser.try_consume(Kind::Pattern).unwrap_or_default();
            let suffix = parser.consume_text();
            parser.must_consume(Kind::Close)?;

            let (name, pattern) = match (name.is_empty(), pattern.is_empty()) {
                (false, true) => (name, DEFAULT_PATTERN.to_owned()),
                (false, false) => (name, pattern),
                (true, false) => (next_unnamed(), pattern),
                (true, true) => (String::new(), String::new()),
            };
            tokens.push(Token::Key(Key {
                name,
                prefix,
                suffix,
                pattern,
                modifier: parser.modifier(),
            }));
            continue;
        }

        parser.must_consume(Kind::End)?;
    }

    Ok(tokens)
}
