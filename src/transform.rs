//! Episode numbering transforms.
//!
//! The stages always run in the same order:
//! assign season, renumber, strip leading zeros, strip season, zero-pad.
//! Zero-padding runs last so it sees the final episode values.

use std::fmt;
use std::str::FromStr;

use crate::logger::Logger;
use crate::number::EpisodeNumber;
use crate::record::Record;

/// Zero padding width for episode numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZeroPad {
    /// Use the longest rendered number as the width.
    Auto,
    Width(usize),
}

/// Which numbering transforms are enabled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformOptions {
    pub season: Option<String>,
    pub renumber_start: Option<u64>,
    pub strip_leading_zeros: bool,
    pub strip_season: bool,
    pub zero_pad: Option<ZeroPad>,
}

/// Applies the enabled transforms to a batch of records.
#[derive(Debug)]
pub struct Pipeline<'a> {
    options: &'a TransformOptions,
    logger: Logger,
}

impl<'a> Pipeline<'a> {
    #[must_use]
    pub const fn new(options: &'a TransformOptions, logger: Logger) -> Self {
        Self { options, logger }
    }

    /// Run all enabled stages in order.
    #[must_use]
    pub fn apply(&self, records: Vec<Record>) -> Vec<Record> {
        let records = match &self.options.season {
            Some(season) => self.assign_season(records, season),
            None => records,
        };
        let records = match self.options.renumber_start {
            Some(start) => self.renumber(records, start),
            None => records,
        };
        let records = if self.options.strip_leading_zeros {
            self.strip_leading_zeros(records)
        } else {
            records
        };
        let records = if self.options.strip_season {
            self.strip_season(records)
        } else {
            records
        };
        match self.options.zero_pad {
            Some(zero_pad) => self.zero_pad(records, zero_pad),
            None => records,
        }
    }

    fn assign_season(&self, records: Vec<Record>, season: &str) -> Vec<Record> {
        self.map_numbers("season", records, |number| {
            number.replace_season(Some(season.to_string()))
        })
    }

    /// Number episodes sequentially in the current order, keeping seasons.
    fn renumber(&self, records: Vec<Record>, start: u64) -> Vec<Record> {
        // Wider than the start value so numbering past `u64::MAX` keeps counting.
        let mut next = u128::from(start);
        self.map_numbers("renumber", records, |number| {
            let renumbered = number.replace_episode(next.to_string());
            next += 1;
            renumbered
        })
    }

    fn strip_leading_zeros(&self, records: Vec<Record>) -> Vec<Record> {
        self.map_numbers("strip_leading_zeros", records, |number| {
            EpisodeNumber::new(
                number.season().map(strip_zeros),
                strip_zeros(number.episode()),
            )
        })
    }

    fn strip_season(&self, records: Vec<Record>) -> Vec<Record> {
        self.map_numbers("strip_season", records, |number| number.replace_season(None))
    }

    fn zero_pad(&self, records: Vec<Record>, zero_pad: ZeroPad) -> Vec<Record> {
        let width = match zero_pad {
            ZeroPad::Width(width) => width,
            ZeroPad::Auto => records
                .iter()
                .map(|record| record.number.rendered_len())
                .max()
                .unwrap_or_default(),
        };
        self.map_numbers("zero_pad", records, |number| {
            number.replace_episode(pad_zeros(number.episode(), width))
        })
    }

    /// Replace each record's number and log the ones that changed.
    fn map_numbers<F>(&self, stage: &str, records: Vec<Record>, mut transform: F) -> Vec<Record>
    where
        F: FnMut(&EpisodeNumber) -> EpisodeNumber,
    {
        records
            .into_iter()
            .map(|record| {
                let new = transform(&record.number);
                if new != record.number {
                    self.logger.trace(&format!(
                        "{stage}: renumbered '{}' from {} to {new}",
                        record.source.display(),
                        record.number
                    ));
                }
                record.with_number(new)
            })
            .collect()
    }
}

/// Remove leading zeros, keeping a single zero for an all-zero value.
fn strip_zeros(value: &str) -> String {
    let stripped = value.trim_start_matches('0');
    if stripped.is_empty() {
        "0".to_string()
    } else {
        stripped.to_string()
    }
}

/// Left pad with zeros to at least `width` characters.
fn pad_zeros(value: &str, width: usize) -> String {
    let mut padded = "0".repeat(width.saturating_sub(value.chars().count()));
    padded.push_str(value);
    padded
}

impl FromStr for ZeroPad {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        if value.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        value
            .parse::<usize>()
            .map(Self::Width)
            .map_err(|_| format!("expected 'auto' or a non-negative width, got '{s}'"))
    }
}

impl fmt::Display for ZeroPad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Width(width) => write!(f, "{width}"),
        }
    }
}
