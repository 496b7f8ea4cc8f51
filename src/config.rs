//! Configuration validated from the command line options.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::logger::Logger;
use crate::materialize::OutputType;
use crate::overlap::OverlapPolicy;
use crate::pattern::{CompiledPattern, DEFAULT_INPUT_FORMAT, PatternError};
use crate::transform::{TransformOptions, ZeroPad};

/// Raw options as given on the command line, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameOptions {
    pub path: Option<PathBuf>,
    pub title: String,
    pub destination: Option<PathBuf>,
    pub season: Option<String>,
    /// `Some(true)` for `--renumber`, `Some(false)` for `--no-renumber`.
    pub renumber: Option<bool>,
    pub renumber_start: Option<u64>,
    pub strip_season: bool,
    pub strip_leading_zeros: bool,
    pub zero_pad: Option<ZeroPad>,
    pub overwrite: bool,
    pub resolve_overlaps: OverlapPolicy,
    pub output_type: OutputType,
    pub first: Option<usize>,
    pub skip: Option<usize>,
    pub dry: bool,
    pub input_format: String,
    pub verbose: u8,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot specify both `--renumber` and `--strip-leading-zeros`")]
    RenumberWithStripLeadingZeros,
    #[error("cannot specify both `--zero-pad` and `--strip-leading-zeros`")]
    ZeroPadWithStripLeadingZeros,
    #[error("cannot specify both `--season` and `--strip-season`")]
    SeasonWithStripSeason,
    #[error("`--season` must be a non-negative integer, got '{0}'")]
    InvalidSeason(String),
    #[error("cannot specify `--renumber-start` without `--renumber`")]
    RenumberStartWithoutRenumber,
    #[error(
        "must specify a destination with `-d/--destination` while using `--skip` or `--first` \
         because you most likely want to use this command more than once"
    )]
    RangeWithoutDestination,
    #[error("`--destination` must refer to a valid directory: '{}'", .0.display())]
    InvalidDestination(PathBuf),
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("invalid input path: {0}")]
    InvalidInputPath(String),
    #[error("invalid `--input-fmt`: {0}")]
    Pattern(#[from] PatternError),
}

/// Final config after validating the option combinations.
#[derive(Debug)]
pub struct EpRenameConfig {
    pub(crate) input_dir: PathBuf,
    pub(crate) destination: PathBuf,
    pub(crate) title: String,
    pub(crate) pattern: CompiledPattern,
    pub(crate) transform: TransformOptions,
    pub(crate) overwrite: bool,
    pub(crate) overlap_policy: OverlapPolicy,
    pub(crate) output_type: OutputType,
    pub(crate) first: Option<usize>,
    pub(crate) skip: Option<usize>,
    pub(crate) dryrun: bool,
    pub(crate) logger: Logger,
}

impl Default for RenameOptions {
    fn default() -> Self {
        Self {
            path: None,
            title: String::new(),
            destination: None,
            season: None,
            renumber: None,
            renumber_start: None,
            strip_season: false,
            strip_leading_zeros: false,
            zero_pad: None,
            overwrite: false,
            resolve_overlaps: OverlapPolicy::default(),
            output_type: OutputType::default(),
            first: None,
            skip: None,
            dry: false,
            input_format: DEFAULT_INPUT_FORMAT.to_string(),
            verbose: 0,
        }
    }
}

impl EpRenameConfig {
    /// Validate the option combinations and build the final config.
    ///
    /// `--skip` and `--strip-season` turn renumbering on unless `--no-renumber` was given,
    /// and renumbering starts from 1 unless `--renumber-start` is set.
    ///
    /// # Errors
    /// Returns an error for conflicting or incomplete options.
    pub fn from_options(options: RenameOptions) -> Result<Self, ConfigError> {
        let title = options.title.trim().to_string();
        if title.is_empty() {
            return Err(ConfigError::EmptyTitle);
        }

        if options.season.is_some() && options.strip_season {
            return Err(ConfigError::SeasonWithStripSeason);
        }
        if let Some(season) = &options.season
            && (season.is_empty() || !season.chars().all(|c| c.is_ascii_digit()))
        {
            return Err(ConfigError::InvalidSeason(season.clone()));
        }

        if (options.skip.is_some() || options.first.is_some()) && options.destination.is_none() {
            return Err(ConfigError::RangeWithoutDestination);
        }

        let renumber = options
            .renumber
            .unwrap_or(options.skip.is_some() || options.strip_season);

        if options.strip_leading_zeros && renumber {
            return Err(ConfigError::RenumberWithStripLeadingZeros);
        }
        if options.strip_leading_zeros && options.zero_pad.is_some() {
            return Err(ConfigError::ZeroPadWithStripLeadingZeros);
        }

        let renumber_start = match (renumber, options.renumber_start) {
            (true, start) => Some(start.unwrap_or(1)),
            (false, Some(_)) => return Err(ConfigError::RenumberStartWithoutRenumber),
            (false, None) => None,
        };

        let input_dir = crate::resolve_input_path(options.path.as_deref())
            .map_err(|error| ConfigError::InvalidInputPath(error.to_string()))?;

        let destination = match options.destination {
            // Spelled like the input dir so source and destination paths compare equal.
            Some(destination) if destination.is_dir() => crate::resolve_input_path(Some(&destination))
                .map_err(|_| ConfigError::InvalidDestination(destination.clone()))?,
            Some(destination) => return Err(ConfigError::InvalidDestination(destination)),
            None => input_dir.clone(),
        };

        let pattern = CompiledPattern::compile(&options.input_format)?;

        Ok(Self {
            input_dir,
            destination,
            title,
            pattern,
            transform: TransformOptions {
                season: options.season,
                renumber_start,
                strip_leading_zeros: options.strip_leading_zeros,
                strip_season: options.strip_season,
                zero_pad: options.zero_pad,
            },
            overwrite: options.overwrite,
            overlap_policy: options.resolve_overlaps,
            output_type: options.output_type,
            first: options.first,
            skip: options.skip,
            dryrun: options.dry,
            logger: Logger::new(options.verbose),
        })
    }

    #[must_use]
    pub const fn transform(&self) -> &TransformOptions {
        &self.transform
    }

    #[must_use]
    pub const fn pattern(&self) -> &CompiledPattern {
        &self.pattern
    }
}

impl fmt::Display for EpRenameConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let optional = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());
        writeln!(f, "Config:")?;
        writeln!(f, "  input:       {}", self.input_dir.display())?;
        writeln!(f, "  destination: {}", self.destination.display())?;
        writeln!(f, "  title:       \"{}\"", self.title)?;
        writeln!(f, "  input fmt:   \"{}\"", self.pattern)?;
        writeln!(f, "  season:      {}", optional(self.transform.season.clone()))?;
        writeln!(
            f,
            "  renumber:    {}",
            optional(self.transform.renumber_start.map(|start| format!("from {start}")))
        )?;
        writeln!(
            f,
            "  strip zeros: {}",
            crate::colorize_bool(self.transform.strip_leading_zeros)
        )?;
        writeln!(f, "  strip season: {}", crate::colorize_bool(self.transform.strip_season))?;
        writeln!(
            f,
            "  zero pad:    {}",
            optional(self.transform.zero_pad.map(|zero_pad| zero_pad.to_string()))
        )?;
        writeln!(f, "  first:       {}", optional(self.first.map(|n| n.to_string())))?;
        writeln!(f, "  skip:        {}", optional(self.skip.map(|n| n.to_string())))?;
        writeln!(f, "  overlaps:    {}", self.overlap_policy)?;
        writeln!(f, "  output type: {}", self.output_type)?;
        writeln!(f, "  overwrite:   {}", crate::colorize_bool(self.overwrite))?;
        write!(f, "  dryrun:      {}", crate::colorize_bool(self.dryrun))
    }
}
