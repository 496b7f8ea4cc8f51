//! Episode number value type with numeric ordering.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static RE_SEASON_EPISODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[sS](?P<season>[0-9]+)[eE](?P<episode>[0-9]+)$").expect("Failed to create regex pattern for season episode")
});

static RE_EPISODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("Failed to create regex pattern for episode"));

/// Episode identifier: an optional season and a required episode.
///
/// Equality is structural on the raw digit strings, so `01` and `1` are different numbers.
/// Use [`EpisodeNumber::sort_key`] for numeric ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EpisodeNumber {
    season: Option<String>,
    episode: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid episode number: '{0}'")]
pub struct ParseNumberError(pub String);

/// Numeric value of a digit string that compares correctly for any length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Numeric<'a>(&'a str);

/// Season part of the ordering key. Numbers without a season sort before every season.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SeasonKey<'a> {
    NoSeason,
    Season(Numeric<'a>),
}

/// Ordering key for an [`EpisodeNumber`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SortKey<'a> {
    season: SeasonKey<'a>,
    episode: Numeric<'a>,
}

impl EpisodeNumber {
    #[must_use]
    pub fn new(season: Option<String>, episode: impl Into<String>) -> Self {
        Self {
            season,
            episode: episode.into(),
        }
    }

    #[must_use]
    pub fn episode_only(episode: impl Into<String>) -> Self {
        Self::new(None, episode)
    }

    #[must_use]
    pub fn with_season(season: impl Into<String>, episode: impl Into<String>) -> Self {
        Self::new(Some(season.into()), episode)
    }

    #[must_use]
    pub fn season(&self) -> Option<&str> {
        self.season.as_deref()
    }

    #[must_use]
    pub fn episode(&self) -> &str {
        &self.episode
    }

    /// Key for numeric ordering: `(season or no season, episode)`.
    #[must_use]
    pub fn sort_key(&self) -> SortKey<'_> {
        SortKey {
            season: self
                .season
                .as_deref()
                .map_or(SeasonKey::NoSeason, |season| SeasonKey::Season(Numeric::new(season))),
            episode: Numeric::new(&self.episode),
        }
    }

    /// Compare two numbers by their numeric ordering key.
    #[must_use]
    pub fn numeric_cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }

    /// Return a copy with the given episode and the same season.
    #[must_use]
    pub fn replace_episode(&self, episode: impl Into<String>) -> Self {
        Self::new(self.season.clone(), episode)
    }

    /// Return a copy with the given season and the same episode.
    #[must_use]
    pub fn replace_season(&self, season: Option<String>) -> Self {
        Self::new(season, self.episode.clone())
    }

    /// Length of the rendered number, e.g. 4 for `s1e2`.
    #[must_use]
    pub fn rendered_len(&self) -> usize {
        self.to_string().chars().count()
    }
}

impl<'a> Numeric<'a> {
    fn new(digits: &'a str) -> Self {
        let trimmed = digits.trim_start_matches('0');
        Self(trimmed)
    }
}

impl Ord for Numeric<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Leading zeros are already trimmed, so a longer digit string is a larger number.
        self.0
            .chars()
            .count()
            .cmp(&other.0.chars().count())
            .then_with(|| self.0.cmp(other.0))
    }
}

impl PartialOrd for Numeric<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for EpisodeNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.season {
            Some(season) => write!(f, "s{season}e{}", self.episode),
            None => write!(f, "{}", self.episode),
        }
    }
}

impl FromStr for EpisodeNumber {
    type Err = ParseNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(captures) = RE_SEASON_EPISODE.captures(s) {
            return Ok(Self::with_season(&captures["season"], &captures["episode"]));
        }
        if RE_EPISODE.is_match(s) {
            return Ok(Self::episode_only(s));
        }
        Err(ParseNumberError(s.to_string()))
    }
}
