//! Destination names and collision grouping.

use std::collections::BTreeMap;
use std::path::Path;

use crate::record::Record;

/// Records that all map to the same destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationGroup {
    pub destination: String,
    pub records: Vec<Record>,
}

impl DestinationGroup {
    #[must_use]
    pub fn is_collision(&self) -> bool {
        self.records.len() > 1
    }
}

/// Destination file name for a record: `<title> <number>.<suffix>`.
#[must_use]
pub fn destination_name(record: &Record, title: &str) -> String {
    if record.suffix.is_empty() {
        format!("{title} {}", record.number)
    } else {
        format!("{title} {}.{}", record.number, record.suffix)
    }
}

/// Set the destination path of every record.
#[must_use]
pub fn assign_destinations(records: Vec<Record>, title: &str, destination_dir: &Path) -> Vec<Record> {
    records
        .into_iter()
        .map(|record| {
            let destination = destination_dir.join(destination_name(&record, title));
            record.with_destination(destination)
        })
        .collect()
}

/// Group records by their exact destination string, ordered by destination.
///
/// Records keep their relative order inside each group.
/// Records without a destination are grouped under an empty string.
#[must_use]
pub fn group_by_destination(records: Vec<Record>) -> Vec<DestinationGroup> {
    let mut groups: BTreeMap<String, Vec<Record>> = BTreeMap::new();
    for record in records {
        let key = record
            .destination()
            .map(crate::path_to_string)
            .unwrap_or_default();
        groups.entry(key).or_default().push(record);
    }
    groups
        .into_iter()
        .map(|(destination, records)| DestinationGroup { destination, records })
        .collect()
}
