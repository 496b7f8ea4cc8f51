//! Creating the destination links or copies.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use colored::Colorize;
use thiserror::Error;

use crate::logger::Logger;
use crate::record::Record;

/// What kind of file to create at the destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputType {
    /// Symbolic link to the resolved source path
    #[default]
    Symlink,
    /// Hard link to the source
    Hardlink,
    /// Byte-for-byte copy of the source
    Copy,
}

/// Destinations that cannot be written without losing data.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{} destination file(s) already exist", .existing.len() + .sources.len())]
pub struct OverwriteError {
    /// Existing destinations, only reported when overwrite is disabled.
    pub existing: Vec<PathBuf>,
    /// Destinations that are source files of this batch, always reported.
    pub sources: Vec<PathBuf>,
}

/// Check every destination before anything is created.
///
/// Destinations that point at the record's own source are ignored since they are skipped later.
///
/// # Errors
/// Returns an error listing all offending destinations.
pub fn check_overwrites(records: &[Record], overwrite: bool, logger: Logger) -> Result<(), OverwriteError> {
    let sources: HashSet<&Path> = records.iter().map(Record::source).collect();
    let mut existing = Vec::new();
    let mut overwritten_sources = Vec::new();
    for record in records {
        let Some(destination) = record.destination() else {
            continue;
        };
        if destination == record.source() {
            continue;
        }
        if sources.contains(destination) {
            overwritten_sources.push(destination.to_path_buf());
        } else if !overwrite && path_exists(destination) {
            existing.push(destination.to_path_buf());
        }
    }

    if existing.is_empty() && overwritten_sources.is_empty() {
        return Ok(());
    }

    if !existing.is_empty() {
        logger.error("the following files already exist:");
        for path in &existing {
            logger.error(&format!("  {}", path.display()));
        }
        logger.error("");
        logger.error("use the `--overwrite` flag to ignore these.");
    }
    if !overwritten_sources.is_empty() {
        logger.error("the following destinations are source files and would be replaced:");
        for path in &overwritten_sources {
            logger.error(&format!("  {}", path.display()));
        }
    }
    Err(OverwriteError {
        existing,
        sources: overwritten_sources,
    })
}

/// Check for an existing file, including dangling symlinks.
fn path_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Creates the destination files for resolved records.
#[derive(Debug)]
pub struct Materializer {
    output_type: OutputType,
    overwrite: bool,
    dryrun: bool,
    logger: Logger,
}

impl Materializer {
    #[must_use]
    pub const fn new(output_type: OutputType, overwrite: bool, dryrun: bool, logger: Logger) -> Self {
        Self {
            output_type,
            overwrite,
            dryrun,
            logger,
        }
    }

    /// Create all destinations in order, stopping at the first failure.
    ///
    /// Returns the number of created (or in dry mode, planned) destinations.
    ///
    /// # Errors
    /// Returns an error if removing an existing destination or creating the link fails.
    pub fn materialize_all(&self, records: &[Record]) -> Result<usize> {
        let mut count = 0;
        for record in records {
            if self.materialize(record)? {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Create the destination for one record.
    ///
    /// Returns false if the record was skipped.
    ///
    /// # Errors
    /// Returns an error if removing an existing destination or creating the link fails.
    pub fn materialize(&self, record: &Record) -> Result<bool> {
        let destination = record
            .destination()
            .with_context(|| format!("No destination computed for {}", record.source().display()))?;

        if destination == record.source() {
            self.logger
                .info(&format!("skipping '{}' which is already named", record.source().display()));
            return Ok(false);
        }

        if self.dryrun {
            if self.logger.enabled(crate::logger::LEVEL_INFO) {
                eprintln!("{}", "Dryrun:".cyan().bold());
                crate::show_diff(record.file_name(), &crate::path_to_filename_string(destination));
            }
            return Ok(true);
        }

        if self.overwrite && path_exists(destination) {
            self.logger
                .warn(&format!("removing existing file '{}'", destination.display()));
            fs::remove_file(destination)
                .with_context(|| format!("Failed to remove existing file {}", destination.display()))?;
        }

        match self.output_type {
            OutputType::Symlink => {
                let target = dunce::canonicalize(record.source())
                    .with_context(|| format!("Failed to resolve source path {}", record.source().display()))?;
                create_symlink(&target, destination)?;
            }
            OutputType::Hardlink => {
                fs::hard_link(record.source(), destination).with_context(|| {
                    format!(
                        "Failed to create hard link {} -> {}",
                        destination.display(),
                        record.source().display()
                    )
                })?;
            }
            OutputType::Copy => {
                fs::copy(record.source(), destination).with_context(|| {
                    format!(
                        "Failed to copy {} to {}",
                        record.source().display(),
                        destination.display()
                    )
                })?;
            }
        }

        self.logger.info(&format!(
            "created {} from '{}' to '{}'",
            self.output_type.description(),
            destination.display(),
            record.source().display()
        ));
        Ok(true)
    }
}

#[cfg(unix)]
fn create_symlink(target: &Path, link: &Path) -> Result<()> {
    std::os::unix::fs::symlink(target, link)
        .with_context(|| format!("Failed to create symbolic link {} -> {}", link.display(), target.display()))
}

#[cfg(windows)]
fn create_symlink(target: &Path, link: &Path) -> Result<()> {
    std::os::windows::fs::symlink_file(target, link)
        .with_context(|| format!("Failed to create symbolic link {} -> {}", link.display(), target.display()))
}

impl OutputType {
    /// Human-readable name used in log messages.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Symlink => "symbolic link",
            Self::Hardlink => "hard link",
            Self::Copy => "copy",
        }
    }

    /// Plural name used in the summary line.
    #[must_use]
    pub const fn description_plural(self, count: usize) -> &'static str {
        match (self, count == 1) {
            (Self::Symlink, true) => "symbolic link",
            (Self::Symlink, false) => "symbolic links",
            (Self::Hardlink, true) => "hard link",
            (Self::Hardlink, false) => "hard links",
            (Self::Copy, true) => "copy",
            (Self::Copy, false) => "copies",
        }
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Symlink => "symlink",
            Self::Hardlink => "hardlink",
            Self::Copy => "copy",
        };
        write!(f, "{name}")
    }
}


#[cfg(test)]
mod materializer_tests {
    use std::fs;

    use super::*;
    use crate::number::EpisodeNumber;

    fn setup(content: &str) -> (tempfile::TempDir, Record) {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("[Group] show - 01.mkv");
        fs::write(&source, content).unwrap();
        let record = Record::new(source, EpisodeNumber::episode_only("01"), "mkv")
            .with_destination(dir.path().join("Show 01.mkv"));
        (dir, record)
    }

    #[cfg(unix)]
    #[test]
    fn creates_symlink_to_canonical_source() {
        let (dir, record) = setup("video");
        let materializer = Materializer::new(OutputType::Symlink, false, false, Logger::default());
        assert!(materializer.materialize(&record).unwrap());

        let link = dir.path().join("Show 01.mkv");
        let target = fs::read_link(&link).unwrap();
        assert!(target.is_absolute());
        assert_eq!(fs::read_to_string(&link).unwrap(), "video");
    }

    #[test]
    fn creates_hard_link() {
        let (dir, record) = setup("video");
        let materializer = Materializer::new(OutputType::Hardlink, false, false, Logger::default());
        materializer.materialize(&record).unwrap();

        let link = dir.path().join("Show 01.mkv");
        assert!(!fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(&link).unwrap(), "video");
    }

    #[test]
    fn copies_contents() {
        let (dir, record) = setup("video");
        let materializer = Materializer::new(OutputType::Copy, false, false, Logger::default());
        materializer.materialize(&record).unwrap();

        fs::write(record.source(), "changed").unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("Show 01.mkv")).unwrap(), "video");
    }

    #[test]
    fn dryrun_creates_nothing() {
        let (dir, record) = setup("video");
        let materializer = Materializer::new(OutputType::Copy, false, true, Logger::default());
        assert!(materializer.materialize(&record).unwrap());
        assert!(!dir.path().join("Show 01.mkv").exists());
    }

    #[test]
    fn overwrite_replaces_existing_destination() {
        let (dir, record) = setup("new");
        fs::write(dir.path().join("Show 01.mkv"), "old").unwrap();
        let materializer = Materializer::new(OutputType::Copy, true, false, Logger::default());
        materializer.materialize(&record).unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("Show 01.mkv")).unwrap(), "new");
    }

    #[test]
    fn existing_destination_without_overwrite_fails() {
        let (dir, record) = setup("new");
        fs::write(dir.path().join("Show 01.mkv"), "old").unwrap();
        let materializer = Materializer::new(OutputType::Hardlink, false, false, Logger::default());
        assert!(materializer.materialize(&record).is_err());
        assert_eq!(fs::read_to_string(dir.path().join("Show 01.mkv")).unwrap(), "old");
    }

    #[test]
    fn skips_record_already_at_destination() {
        let (_dir, record) = setup("video");
        let record = record.clone().with_destination(record.source().to_path_buf());
        let materializer = Materializer::new(OutputType::Copy, true, false, Logger::default());
        assert!(!materializer.materialize(&record).unwrap());
        assert_eq!(fs::read_to_string(record.source()).unwrap(), "video");
    }

    #[test]
    fn counts_materialized_records() {
        let (dir, record) = setup("video");
        let second = Record::new(record.source().to_path_buf(), EpisodeNumber::episode_only("02"), "mkv")
            .with_destination(dir.path().join("Show 02.mkv"));
        let materializer = Materializer::new(OutputType::Copy, false, false, Logger::default());
        assert_eq!(materializer.materialize_all(&[record, second]).unwrap(), 2);
    }
}
