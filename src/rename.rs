//! Episode rename run: list, parse, transform, resolve, materialize.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use walkdir::WalkDir;

use crate::config::EpRenameConfig;
use crate::destination::{assign_destinations, group_by_destination};
use crate::materialize::{Materializer, check_overwrites};
use crate::overlap::{file_modified_time, resolve_overlaps};
use crate::record::{Record, sort_by_number};
use crate::transform::Pipeline;

/// Episode rename handler.
#[derive(Debug)]
pub struct EpRename {
    config: EpRenameConfig,
}

impl EpRename {
    #[must_use]
    pub const fn new(config: EpRenameConfig) -> Self {
        Self { config }
    }

    /// Run the whole rename.
    ///
    /// Collisions and existing destinations are checked for the whole batch
    /// before anything is written.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be read, destinations collide or already exist,
    /// or creating a destination fails.
    pub fn run(&self) -> Result<()> {
        let logger = self.config.logger;
        logger.trace(&self.config.to_string());

        let records = self.plan()?;
        if records.is_empty() {
            logger.info("No files to rename");
            return Ok(());
        }

        check_overwrites(&records, self.config.overwrite, logger)?;

        let materializer = Materializer::new(
            self.config.output_type,
            self.config.overwrite,
            self.config.dryrun,
            logger,
        );
        let count = materializer.materialize_all(&records)?;

        let message = format!("{count} {}", self.config.output_type.description_plural(count));
        if self.config.dryrun {
            println!("Dryrun: would have created {message}");
        } else {
            println!("{}", format!("Created {message}").green());
        }
        Ok(())
    }

    /// Compute the final records without touching the filesystem.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be read or destinations collide.
    pub fn plan(&self) -> Result<Vec<Record>> {
        let logger = self.config.logger;
        let files = list_files(&self.config.input_dir)?;

        let mut records = Vec::with_capacity(files.len());
        for file in files {
            if let Some(record) = Record::from_path(&file, &self.config.pattern) {
                logger.trace(&format!(
                    "extracted season={:?} episode={:?} suffix={:?} from file='{}'",
                    record.number().season(),
                    record.number().episode(),
                    record.suffix(),
                    file.display()
                ));
                records.push(record);
            } else {
                logger.warn(&format!(
                    "warning: '{}' does not match input format \"{}\", skipping",
                    crate::path_to_filename_string(&file),
                    self.config.pattern
                ));
            }
        }
        sort_by_number(&mut records);

        let records = self.select_range(records);
        let records = Pipeline::new(&self.config.transform, logger).apply(records);
        let records = assign_destinations(records, &self.config.title, &self.config.destination);

        let mut records = resolve_overlaps(
            group_by_destination(records),
            self.config.overlap_policy,
            logger,
            file_modified_time,
        )?;
        sort_by_number(&mut records);
        Ok(records)
    }

    /// Apply `--skip` and `--first`, clamping to the number of records.
    fn select_range(&self, mut records: Vec<Record>) -> Vec<Record> {
        let logger = self.config.logger;
        if let Some(skip) = self.config.skip {
            if skip >= records.len() {
                logger.warn("warning: skipping all files");
            }
            records.drain(..skip.min(records.len()));
        }
        if let Some(first) = self.config.first {
            if first > records.len() {
                logger.warn(&format!(
                    "warning: there are only {} files but given --first={first}",
                    records.len()
                ));
            }
            records.truncate(first);
        }
        records
    }
}

/// List regular files directly inside the directory, sorted by name.
///
/// Hidden files are skipped. Symlinks to files count as files.
fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.with_context(|| format!("Failed to read directory {}", dir.display()))?;
        if crate::is_hidden(&entry) {
            continue;
        }
        let path = entry.into_path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort_unstable();
    Ok(files)
}
