//! Path template compilation.
//!
//! # Responsibilities
//! - Parse a template into literal and parameter tokens
//! - Build an anchored regular expression from the tokens
//! - Expose ordered captures for a candidate path or URL
//!
//! # Grammar
//! ```text
//! /users/:id            named parameter, one segment
//! /files/:name(\d+)     named parameter with a custom pattern
//! /assets/(.*)          unnamed parameter "0"
//! /docs/*               unnamed wildcard, pattern ".*"
//! /:lang?/about         optional parameter (prefix "/" optional as well)
//! /tags/:tag+           one or more repeated segments
//! /price\:low           escaped literal ':'
//! https://:sub.x.com/   host-qualified, matched against the full URL
//! ```
//!
//! # Design Decisions
//! - Compilation is pure: the same template always yields the same matcher
//! - Literal text is escaped, never interpreted as regex syntax
//! - One capture group per parameter token, in declaration order
//! - A trailing `/` is stripped from templates and optional on paths

use regex::{Regex, RegexBuilder};
use std::fmt;

use crate::error::PatternError;

const DEFAULT_DELIMITER: char = '/';

/// Name of a parameter slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamName {
    /// `:name` parameters.
    Named(String),
    /// Unnamed `( ... )` groups and `*`, numbered from zero.
    Index(usize),
}

impl fmt::Display for ParamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamName::Named(name) => f.write_str(name),
            ParamName::Index(index) => write!(f, "{}", index),
        }
    }
}

/// A parameter slot in a compiled template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamToken {
    pub name: ParamName,
    /// `/` or `.` preceding the parameter, empty otherwise.
    pub prefix: String,
    pub delimiter: char,
    pub optional: bool,
    pub repeat: bool,
    /// The prefix is followed by more literal text rather than ending a segment.
    pub partial: bool,
    /// Regex source matching one value.
    pub pattern: String,
}

/// One element of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Literal(String),
    Param(ParamToken),
}

impl Token {
    pub fn as_param(&self) -> Option<&ParamToken> {
        match self {
            Token::Param(param) => Some(param),
            Token::Literal(_) => None,
        }
    }
}

/// Options that change how a template matches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatternOptions {
    pub case_sensitive: bool,
}

/// A compiled path template.
#[derive(Debug, Clone)]
pub struct Pattern {
    template: String,
    regex: Regex,
    tokens: Vec<Token>,
    host_qualified: bool,
    options: PatternOptions,
}

impl Pattern {
    /// Compile with default options (case-insensitive).
    pub fn compile(template: &str) -> Result<Self, PatternError> {
        Self::compile_with(template, PatternOptions::default())
    }

    pub fn compile_with(template: &str, options: PatternOptions) -> Result<Self, PatternError> {
        let normalized = strip_trailing_delimiter(template);
        let tokens = parse(normalized, template)?;
        let source = tokens_to_regex(&tokens);

        let regex = RegexBuilder::new(&source)
            .case_insensitive(!options.case_sensitive)
            .build()
            .map_err(|source| PatternError::Regex {
                template: template.to_string(),
                source,
            })?;

        Ok(Self {
            template: template.to_string(),
            regex,
            tokens,
            host_qualified: is_host_qualified(template),
            options,
        })
    }

    /// The template exactly as registered.
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn options(&self) -> PatternOptions {
        self.options
    }

    /// Whether this template is matched against the full URL instead of the path.
    pub fn is_host_qualified(&self) -> bool {
        self.host_qualified
    }

    /// Parameter tokens in declaration order.
    pub fn params(&self) -> impl Iterator<Item = &ParamToken> {
        self.tokens.iter().filter_map(Token::as_param)
    }

    /// Run the matcher, returning captures in declaration order.
    ///
    /// Group 0 (the whole match) is skipped, so element `n` belongs to the
    /// `n`-th parameter token. Optional parameters that did not participate
    /// are `None`.
    pub fn exec<'t>(&self, subject: &'t str) -> Option<Vec<Option<&'t str>>> {
        let captures = self.regex.captures(subject)?;
        Some(
            captures
                .iter()
                .skip(1)
                .map(|group| group.map(|m| m.as_str()))
                .collect(),
        )
    }

    pub fn is_match(&self, subject: &str) -> bool {
        self.regex.is_match(subject)
    }

    /// Regex source, for diagnostics.
    pub fn as_regex_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.template == other.template && self.options == other.options
    }
}

impl Eq for Pattern {}

/// Templates that start with a scheme are matched against the whole URL.
pub fn is_host_qualified(template: &str) -> bool {
    template.starts_with("http")
}

fn strip_trailing_delimiter(template: &str) -> &str {
    if template.len() > 1 && template.ends_with(DEFAULT_DELIMITER) && !template.ends_with("\\/") {
        &template[..template.len() - 1]
    } else {
        template
    }
}

fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Split a template into tokens.
fn parse(template: &str, original: &str) -> Result<Vec<Token>, PatternError> {
    let chars: Vec<char> = template.chars().collect();
    let mut tokens = Vec::new();
    let mut path = String::new();
    // The last literal char came from an escape and must not become a prefix.
    let mut escaped_tail = false;
    let mut unnamed = 0usize;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\\' {
            match chars.get(i + 1) {
                Some(&escaped) => {
                    path.push(escaped);
                    escaped_tail = true;
                    i += 2;
                }
                None => {
                    path.push(c);
                    escaped_tail = false;
                    i += 1;
                }
            }
            continue;
        }

        let (name, pattern, end) = match c {
            ':' => {
                let start = i + 1;
                let mut j = start;
                while j < chars.len() && is_word(chars[j]) {
                    j += 1;
                }
                if j == start {
                    // "http://" and friends: a colon without a name is literal.
                    path.push(c);
                    escaped_tail = false;
                    i += 1;
                    continue;
                }
                let name: String = chars[start..j].iter().collect();
                let (pattern, end) = if chars.get(j) == Some(&'(') {
                    let (group, end) = read_group(&chars, j, original)?;
                    (Some(group), end)
                } else {
                    (None, j)
                };
                (ParamName::Named(name), pattern, end)
            }
            '(' => {
                let (group, end) = read_group(&chars, i, original)?;
                let name = ParamName::Index(unnamed);
                unnamed += 1;
                (name, Some(group), end)
            }
            '*' => {
                let name = ParamName::Index(unnamed);
                unnamed += 1;
                (name, Some(".*".to_string()), i + 1)
            }
            ')' => {
                return Err(PatternError::UnexpectedClose {
                    template: original.to_string(),
                    offset: i,
                });
            }
            _ => {
                path.push(c);
                escaped_tail = false;
                i += 1;
                continue;
            }
        };

        let is_asterisk = c == '*';
        let (modifier, end) = match chars.get(end) {
            Some(&m @ ('?' | '*' | '+')) if !is_asterisk => (Some(m), end + 1),
            _ => (None, end),
        };

        let prefix = match path.chars().last() {
            Some(p @ ('/' | '.')) if !escaped_tail => {
                path.pop();
                Some(p)
            }
            _ => None,
        };
        if !path.is_empty() {
            tokens.push(Token::Literal(std::mem::take(&mut path)));
        }

        let next = chars.get(end).copied();
        let delimiter = prefix.unwrap_or(DEFAULT_DELIMITER);
        let pattern = pattern.unwrap_or_else(|| {
            format!("[^{}]+?", regex::escape(&delimiter.to_string()))
        });

        tokens.push(Token::Param(ParamToken {
            name,
            prefix: prefix.map(String::from).unwrap_or_default(),
            delimiter,
            optional: matches!(modifier, Some('?' | '*')),
            repeat: matches!(modifier, Some('+' | '*')),
            partial: prefix.is_some() && next.is_some() && next != prefix,
            pattern,
        }));

        escaped_tail = false;
        i = end;
    }

    if !path.is_empty() {
        tokens.push(Token::Literal(path));
    }

    Ok(tokens)
}

/// Read a `( ... )` group starting at `open`. Returns the inner source and
/// the index just past the closing parenthesis.
fn read_group(chars: &[char], open: usize, original: &str) -> Result<(String, usize), PatternError> {
    let mut depth = 0usize;
    let mut inner = String::new();
    let mut i = open + 1;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\\' => {
                inner.push(c);
                if let Some(&escaped) = chars.get(i + 1) {
                    inner.push(escaped);
                }
                i += 2;
                continue;
            }
            '(' => {
                if chars.get(i + 1) != Some(&'?') {
                    return Err(PatternError::NestedGroup {
                        template: original.to_string(),
                        offset: i,
                    });
                }
                depth += 1;
            }
            ')' if depth == 0 => {
                if inner.is_empty() {
                    return Err(PatternError::EmptyGroup {
                        template: original.to_string(),
                        offset: open,
                    });
                }
                return Ok((inner, i + 1));
            }
            ')' => depth -= 1,
            _ => {}
        }
        inner.push(c);
        i += 1;
    }

    Err(PatternError::UnclosedGroup {
        template: original.to_string(),
        offset: open,
    })
}

fn tokens_to_regex(tokens: &[Token]) -> String {
    let mut route = String::from("^");

    for token in tokens {
        match token {
            Token::Literal(text) => route.push_str(&regex::escape(text)),
            Token::Param(param) => {
                let prefix = regex::escape(&param.prefix);
                let mut capture = format!("(?:{})", param.pattern);
                if param.repeat {
                    capture = format!("{capture}(?:{prefix}{capture})*");
                }
                let capture = if param.optional {
                    if param.partial {
                        format!("{prefix}({capture})?")
                    } else {
                        format!("(?:{prefix}({capture}))?")
                    }
                } else {
                    format!("{prefix}({capture})")
                };
                route.push_str(&capture);
            }
        }
    }

    if route.ends_with(DEFAULT_DELIMITER) && !route.ends_with("\\/") {
        route.pop();
    }
    route.push_str("/?$");
    route
}
