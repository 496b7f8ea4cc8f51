//! Input format pattern language.
//!
//! A format string is made of literal characters and two-character directives:
//!
//! | Directive | Matches                                                        |
//! |-----------|----------------------------------------------------------------|
//! | `%a`      | anything, including nothing (non-greedy)                        |
//! | `%A`      | at least one character (non-greedy)                             |
//! | `%b`      | zero or more bracketed groups like `[SubGroup]`                 |
//! | `%n`      | the episode number, either `s01e02` or `02`                     |
//! | `%f`      | the file suffix up to the end of the name, must come last       |
//! | `%%`      | a literal `%`                                                   |
//!
//! The pattern always has to match the whole file name.

use std::fmt;
use std::str::FromStr;

use regex::Regex;
use thiserror::Error;

use crate::number::EpisodeNumber;

pub const DEFAULT_INPUT_FORMAT: &str = "%b%a%n%a.%f";

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("Unknown directive '%{directive}' at position {position}")]
    UnknownDirective { directive: char, position: usize },
    #[error("Incomplete directive '%' at the end of the pattern (use '%%' for a literal '%')")]
    IncompleteDirective { position: usize },
    #[error("Pattern must contain the episode number directive '%n'")]
    MissingNumber,
    #[error("Episode number directive '%n' can only be used once (second one at position {position})")]
    DuplicateNumber { position: usize },
    #[error("Suffix directive '%f' must be at the end of the pattern (found more content at position {position})")]
    SuffixNotLast { position: usize },
    #[error("Failed to build matcher: {0}")]
    Regex(#[from] regex::Error),
}

/// One parsed element of a format string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Literal(char),
    Any,
    AnyNonEmpty,
    Brackets,
    Number,
    Suffix,
}

/// Which record field a capture group is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Number,
    Suffix,
}

/// Assign capture group `index` to the `kind` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldAction {
    pub kind: FieldKind,
    pub index: usize,
}

/// Fields extracted from a single file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub number: EpisodeNumber,
    pub suffix: String,
}

/// Format string compiled into a regex matcher and the capture actions.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    source: String,
    regex: Regex,
    actions: Vec<FieldAction>,
}

impl Token {
    /// Regex fragment for this token.
    fn fragment(self) -> String {
        match self {
            Self::Literal(c) => regex::escape(c.encode_utf8(&mut [0; 4])),
            Self::Any => ".*?".to_string(),
            Self::AnyNonEmpty => ".+?".to_string(),
            Self::Brackets => r"(?:\[[^\[\]]*\])*".to_string(),
            // Season form is listed first so it wins when both could match at the same position.
            Self::Number => r"((?i:s)[0-9]+(?i:e)[0-9]+|[0-9]+)".to_string(),
            Self::Suffix => r"([^.]+)".to_string(),
        }
    }

    const fn field(self) -> Option<FieldKind> {
        match self {
            Self::Number => Some(FieldKind::Number),
            Self::Suffix => Some(FieldKind::Suffix),
            Self::Literal(_) | Self::Any | Self::AnyNonEmpty | Self::Brackets => None,
        }
    }
}

/// Split a format string into tokens, paired with their character position.
fn tokenize(format: &str) -> Result<Vec<(usize, Token)>, PatternError> {
    let mut tokens = Vec::new();
    let mut chars = format.chars().enumerate();
    while let Some((position, c)) = chars.next() {
        let token = if c == '%' {
            match chars.next() {
                Some((_, 'a')) => Token::Any,
                Some((_, 'A')) => Token::AnyNonEmpty,
                Some((_, 'b')) => Token::Brackets,
                Some((_, 'n')) => Token::Number,
                Some((_, 'f')) => Token::Suffix,
                Some((_, '%')) => Token::Literal('%'),
                Some((_, directive)) => return Err(PatternError::UnknownDirective { directive, position }),
                None => return Err(PatternError::IncompleteDirective { position }),
            }
        } else {
            Token::Literal(c)
        };
        tokens.push((position, token));
    }
    Ok(tokens)
}

/// Check the structural rules: exactly one `%n` and nothing after `%f`.
fn validate(tokens: &[(usize, Token)]) -> Result<(), PatternError> {
    let mut number_seen = false;
    let mut suffix_seen = false;
    for &(position, token) in tokens {
        if suffix_seen {
            return Err(PatternError::SuffixNotLast { position });
        }
        match token {
            Token::Number if number_seen => return Err(PatternError::DuplicateNumber { position }),
            Token::Number => number_seen = true,
            Token::Suffix => suffix_seen = true,
            _ => {}
        }
    }
    if number_seen {
        Ok(())
    } else {
        Err(PatternError::MissingNumber)
    }
}

impl CompiledPattern {
    /// Compile a format string.
    ///
    /// # Errors
    /// Returns an error if the format string is malformed.
    pub fn compile(format: &str) -> Result<Self, PatternError> {
        let tokens = tokenize(format)?;
        validate(&tokens)?;

        let mut expression = String::from("^");
        let mut actions = Vec::new();
        for (_, token) in &tokens {
            expression.push_str(&token.fragment());
            if let Some(kind) = token.field() {
                actions.push(FieldAction {
                    kind,
                    index: actions.len() + 1,
                });
            }
        }
        expression.push('$');

        Ok(Self {
            source: format.to_string(),
            regex: Regex::new(&expression)?,
            actions,
        })
    }

    /// The original format string.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The generated regex.
    #[must_use]
    pub const fn regex(&self) -> &Regex {
        &self.regex
    }

    #[must_use]
    pub fn actions(&self) -> &[FieldAction] {
        &self.actions
    }

    /// Match a whole file name and extract the number and suffix.
    ///
    /// Returns `None` when the name does not match the pattern.
    #[must_use]
    pub fn extract(&self, file_name: &str) -> Option<Extracted> {
        let captures = self.regex.captures(file_name)?;
        let mut number = None;
        let mut suffix = String::new();
        for action in &self.actions {
            let value = captures.get(action.index)?.as_str();
            match action.kind {
                FieldKind::Number => number = Some(EpisodeNumber::from_str(value).ok()?),
                FieldKind::Suffix => suffix = value.to_string(),
            }
        }
        Some(Extracted {
            number: number?,
            suffix,
        })
    }
}

impl fmt::Display for CompiledPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

#[cfg(test)]
mod compile_tests {
    use super::*;

    #[test]
    fn compiles_default_format() {
        let pattern = CompiledPattern::compile(DEFAULT_INPUT_FORMAT).unwrap();
        assert_eq!(pattern.actions().len(), 2);
        assert_eq!(pattern.actions()[0].kind, FieldKind::Number);
        assert_eq!(pattern.actions()[1].kind, FieldKind::Suffix);
        assert_eq!(pattern.actions()[1].index, 2);
    }

    #[test]
    fn rejects_missing_number() {
        assert!(matches!(
            CompiledPattern::compile("%b%a.%f"),
            Err(PatternError::MissingNumber)
        ));
        assert!(matches!(CompiledPattern::compile(""), Err(PatternError::MissingNumber)));
    }

    #[test]
    fn rejects_content_after_suffix() {
        assert!(matches!(
            CompiledPattern::compile("%n.%f.bak"),
            Err(PatternError::SuffixNotLast { position: 5 })
        ));
        assert!(matches!(
            CompiledPattern::compile("%n.%f%a"),
            Err(PatternError::SuffixNotLast { .. })
        ));
    }

    #[test]
    fn rejects_unknown_directive() {
        assert!(matches!(
            CompiledPattern::compile("%n%x"),
            Err(PatternError::UnknownDirective {
                directive: 'x',
                position: 2
            })
        ));
    }

    #[test]
    fn rejects_trailing_percent() {
        assert!(matches!(
            CompiledPattern::compile("%n%"),
            Err(PatternError::IncompleteDirective { position: 2 })
        ));
    }

    #[test]
    fn rejects_duplicate_number() {
        assert!(matches!(
            CompiledPattern::compile("%n - %n.%f"),
            Err(PatternError::DuplicateNumber { position: 5 })
        ));
    }

    #[test]
    fn escapes_literal_regex_characters() {
        let pattern = CompiledPattern::compile("Show (%n)+[x].%f").unwrap();
        assert!(pattern.extract("Show (12)+[x].mkv").is_some());
        assert!(pattern.extract("Show 12+x.mkv").is_none());
    }

    #[test]
    fn percent_escape_is_literal() {
        let pattern = CompiledPattern::compile("100%% %n.%f").unwrap();
        let extracted = pattern.extract("100% 4.avi").unwrap();
        assert_eq!(extracted.number.episode(), "4");
    }
}
