//! One input file and its parsed episode number.

use std::fmt;
use std::path::{Path, PathBuf};

use unicode_normalization::UnicodeNormalization;

use crate::number::EpisodeNumber;
use crate::pattern::CompiledPattern;

/// A source file that matched the input pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub(crate) source: PathBuf,
    pub(crate) file_name: String,
    pub(crate) number: EpisodeNumber,
    pub(crate) suffix: String,
    pub(crate) destination: Option<PathBuf>,
}

impl Record {
    #[must_use]
    pub fn new(source: PathBuf, number: EpisodeNumber, suffix: impl Into<String>) -> Self {
        let file_name = crate::path_to_filename_string(&source).nfc().collect::<String>();
        Self {
            source,
            file_name,
            number,
            suffix: suffix.into(),
            destination: None,
        }
    }

    /// Parse a record from a file path using the compiled input pattern.
    ///
    /// Returns `None` if the file name does not match.
    #[must_use]
    pub fn from_path(path: &Path, pattern: &CompiledPattern) -> Option<Self> {
        let file_name = crate::path_to_filename_string(path).nfc().collect::<String>();
        let extracted = pattern.extract(&file_name)?;
        Some(Self {
            source: path.to_path_buf(),
            file_name,
            number: extracted.number,
            suffix: extracted.suffix,
            destination: None,
        })
    }

    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    #[must_use]
    pub const fn number(&self) -> &EpisodeNumber {
        &self.number
    }

    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    #[must_use]
    pub fn destination(&self) -> Option<&Path> {
        self.destination.as_deref()
    }

    /// Replace the episode number, keeping everything else.
    #[must_use]
    pub fn with_number(self, number: EpisodeNumber) -> Self {
        Self { number, ..self }
    }

    #[must_use]
    pub fn with_destination(self, destination: PathBuf) -> Self {
        Self {
            destination: Some(destination),
            ..self
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source.display())
    }
}

/// Sort records by episode number, using the file name to break ties.
pub fn sort_by_number(records: &mut [Record]) {
    records.sort_by(|a, b| {
        a.number
            .numeric_cmp(&b.number)
            .then_with(|| a.file_name.cmp(&b.file_name))
    });
}
