//! Resolving several source files that map to the same destination.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};
use clap::ValueEnum;
use itertools::Itertools;
use thiserror::Error;

use crate::destination::DestinationGroup;
use crate::logger::Logger;
use crate::record::Record;

/// How to pick a single source when several map to the same destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OverlapPolicy {
    /// Abort and list all overlapping files
    #[default]
    Error,
    /// Keep the most recently modified source
    Newest,
    /// Keep the least recently modified source
    Oldest,
    /// Keep any one of the sources
    Any,
}

/// Source files that all map to one destination, sorted by modification time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub destination: String,
    pub sources: Vec<(PathBuf, SystemTime)>,
}

#[derive(Debug, Error)]
pub enum OverlapError {
    #[error("{} destination(s) have more than one source file", .0.len())]
    Collisions(Vec<Collision>),
    #[error("Failed to read modification time of {}: {source}", .path.display())]
    ModifiedTime { path: PathBuf, source: io::Error },
}

/// Modification time of a file, following symlinks.
///
/// # Errors
/// Returns an error if the file metadata cannot be read.
pub fn file_modified_time(path: &Path) -> io::Result<SystemTime> {
    std::fs::metadata(path)?.modified()
}

/// Format a timestamp as local time for reports.
#[must_use]
pub fn format_time(time: SystemTime) -> String {
    DateTime::<Local>::from(time).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Pick one record per destination group according to the policy.
///
/// Groups with a single record are always kept.
/// Modification times are only read for records in colliding groups.
///
/// # Errors
/// Returns [`OverlapError::Collisions`] with every colliding group if the policy is `Error`,
/// or [`OverlapError::ModifiedTime`] if a modification time is needed and cannot be read.
pub fn resolve_overlaps<F>(
    groups: Vec<DestinationGroup>,
    policy: OverlapPolicy,
    logger: Logger,
    mut modified: F,
) -> Result<Vec<Record>, OverlapError>
where
    F: FnMut(&Path) -> io::Result<SystemTime>,
{
    let (collisions, unique): (Vec<DestinationGroup>, Vec<DestinationGroup>) =
        groups.into_iter().partition(DestinationGroup::is_collision);

    let mut survivors: Vec<Record> = unique.into_iter().flat_map(|group| group.records).collect();
    if collisions.is_empty() {
        return Ok(survivors);
    }

    if policy == OverlapPolicy::Error {
        let mut report = Vec::with_capacity(collisions.len());
        for group in collisions {
            let sorted = sort_by_modified_time(group.records, &mut modified)?;
            report.push(Collision {
                destination: group.destination,
                sources: sorted
                    .into_iter()
                    .map(|(record, time)| (record.source, time))
                    .collect(),
            });
        }
        log_collisions(&report, logger);
        return Err(OverlapError::Collisions(report));
    }

    logger.info(&format!("using overlap resolution: {policy}"));
    for group in collisions {
        let (chosen, ignored) = match policy {
            OverlapPolicy::Newest => {
                let mut sorted = sort_by_modified_time(group.records, &mut modified)?;
                let (chosen, _) = sorted.pop().ok_or_else(|| empty_group(&group.destination))?;
                (chosen, sorted.into_iter().map(|(record, _)| record).collect_vec())
            }
            OverlapPolicy::Oldest => {
                let mut sorted = sort_by_modified_time(group.records, &mut modified)?.into_iter();
                let (chosen, _) = sorted.next().ok_or_else(|| empty_group(&group.destination))?;
                (chosen, sorted.map(|(record, _)| record).collect_vec())
            }
            OverlapPolicy::Any | OverlapPolicy::Error => {
                let mut records = group.records.into_iter();
                let chosen = records.next().ok_or_else(|| empty_group(&group.destination))?;
                (chosen, records.collect_vec())
            }
        };
        logger.info(&format!(
            "choosing '{}' for '{}' in favor of [{}]",
            chosen.source.display(),
            group.destination,
            ignored
                .iter()
                .map(|record| format!("'{}'", record.source.display()))
                .join(", ")
        ));
        survivors.push(chosen);
    }

    Ok(survivors)
}

/// Print the full collision report at the always-visible level.
fn log_collisions(collisions: &[Collision], logger: Logger) {
    for collision in collisions {
        logger.error(&format!("the following files all map to '{}':", collision.destination));
        for (path, time) in &collision.sources {
            logger.error(&format!("  {}  {}", format_time(*time), path.display()));
        }
    }
    logger.error("");
    logger.error("use the `--resolve-overlaps` flag to proceed");
    logger.error("files above are already shown in ascending date order");
}

/// Pair each record with its modification time and sort ascending.
///
/// The sort is stable, so records with equal times keep their order.
fn sort_by_modified_time<F>(records: Vec<Record>, modified: &mut F) -> Result<Vec<(Record, SystemTime)>, OverlapError>
where
    F: FnMut(&Path) -> io::Result<SystemTime>,
{
    let mut timed = records
        .into_iter()
        .map(|record| match modified(&record.source) {
            Ok(time) => Ok((record, time)),
            Err(source) => Err(OverlapError::ModifiedTime {
                path: record.source.clone(),
                source,
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;
    timed.sort_by_key(|(_, time)| *time);
    Ok(timed)
}

fn empty_group(destination: &str) -> OverlapError {
    OverlapError::Collisions(vec![Collision {
        destination: destination.to_string(),
        sources: Vec::new(),
    }])
}

impl fmt::Display for OverlapPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Error => "error",
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::Any => "any",
        };
        write!(f, "{name}")
    }
}
