//! CSV roster parsing.
//!
//! The roster has one row per performer with a header line:
//!
//! | Column | Required | Notes |
//! |--------|----------|-------|
//! | `first_name` | yes | |
//! | `last_name` | yes | |
//! | `classes` | yes | Comma-separated entity names |
//! | `performer_id` | no | Falls back to `student_id` |
//! | `student_id` | no | |
//!
//! Rows without an id get sequential ids `0001`, `0002`, ... Rows sharing
//! an id are merged: the first row's name wins and entity names are unioned.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, info};

use crate::error::IngestError;
use crate::models::Participant;

/// Roster parsing options.
#[derive(Debug, Clone)]
pub struct RosterOptions {
    /// Drop entity names containing "private" (case-insensitive).
    pub exclude_private: bool,
}

impl RosterOptions {
    /// Keeps or drops private lessons.
    pub fn with_exclude_private(mut self, exclude: bool) -> Self {
        self.exclude_private = exclude;
        self
    }
}

impl Default for RosterOptions {
    fn default() -> Self {
        Self {
            exclude_private: true,
        }
    }
}

/// Column layout resolved from the header line.
struct Columns {
    first_name: usize,
    last_name: usize,
    classes: usize,
    performer_id: Option<usize>,
    student_id: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self, IngestError> {
        let find = |name: &str| headers.iter().position(|h| h == name);
        let require = |name: &'static str| find(name).ok_or(IngestError::MissingColumn { column: name });

        Ok(Self {
            first_name: require("first_name")?,
            last_name: require("last_name")?,
            classes: require("classes")?,
            performer_id: find("performer_id"),
            student_id: find("student_id"),
        })
    }
}

fn field(record: &StringRecord, column: Option<usize>) -> Option<&str> {
    column
        .and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn required<'r>(
    record: &'r StringRecord,
    column: usize,
    name: &'static str,
) -> Result<&'r str, IngestError> {
    field(record, Some(column)).ok_or_else(|| IngestError::MissingField {
        line: record.position().map_or(0, |p| p.line()),
        field: name,
    })
}

fn split_classes<'a>(classes: &'a str, options: &'a RosterOptions) -> impl Iterator<Item = &'a str> {
    classes
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter(move |name| !(options.exclude_private && name.to_lowercase().contains("private")))
}

/// Parses a roster from any reader.
///
/// # Errors
///
/// Fails on malformed CSV, a missing required column, or a row with an
/// empty required field. Nothing is returned on failure.
pub fn parse_roster<R: Read>(reader: R, options: &RosterOptions) -> Result<Vec<Participant>, IngestError> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(reader);
    let columns = Columns::from_headers(reader.headers()?)?;

    let mut participants: Vec<Participant> = Vec::new();
    let mut by_id: HashMap<String, usize> = HashMap::new();
    let mut next_auto_id = 1u32;

    for record in reader.records() {
        let record = record?;
        let first_name = required(&record, columns.first_name, "first_name")?;
        let last_name = required(&record, columns.last_name, "last_name")?;
        let classes = required(&record, columns.classes, "classes")?;

        let id = match field(&record, columns.performer_id).or_else(|| field(&record, columns.student_id)) {
            Some(id) => id.to_string(),
            None => {
                let id = format!("{next_auto_id:04}");
                next_auto_id += 1;
                id
            }
        };

        let entities = split_classes(classes, options);
        match by_id.get(&id) {
            Some(&i) => {
                debug!(id = %id, "merging duplicate roster row");
                participants[i].merge_entities(entities);
            }
            None => {
                let mut participant = Participant::new(id.clone()).with_name(first_name, last_name);
                participant.merge_entities(entities);
                by_id.insert(id, participants.len());
                participants.push(participant);
            }
        }
    }

    info!(participants = participants.len(), "roster parsed");
    Ok(participants)
}

/// Parses a roster file.
pub fn load_roster<P: AsRef<Path>>(path: P, options: &RosterOptions) -> Result<Vec<Participant>, IngestError> {
    let file = std::fs::File::open(path)?;
    parse_roster(file, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(csv: &str) -> Result<Vec<Participant>, IngestError> {
        parse_roster(csv.as_bytes(), &RosterOptions::default())
    }

    #[test]
    fn test_basic_roster() {
        let roster = parse(
            "first_name,last_name,classes\n\
             Ada,Lovelace,\"Tap 1, Jazz 2\"\n\
             Alan,Turing,Jazz 2\n",
        )
        .unwrap();

        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].id, "0001");
        assert_eq!(roster[1].id, "0002");
        assert_eq!(roster[0].display_name(), "Ada Lovelace");
        assert_eq!(roster[0].entity_names, vec!["Tap 1", "Jazz 2"]);
    }

    #[test]
    fn test_id_columns() {
        let roster = parse(
            "performer_id,student_id,first_name,last_name,classes\n\
             P7,S1,Ada,L,Tap\n\
             ,S2,Alan,T,Tap\n\
             ,,Grace,H,Tap\n",
        )
        .unwrap();
        let ids: Vec<&str> = roster.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["P7", "S2", "0001"]);
    }

    #[test]
    fn test_duplicate_ids_merge() {
        let roster = parse(
            "student_id,first_name,last_name,classes\n\
             7,Ada,L,\"Tap, Jazz\"\n\
             7,Ada,L,\"Jazz, Ballet\"\n",
        )
        .unwrap();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].entity_names, vec!["Tap", "Jazz", "Ballet"]);
    }

    #[test]
    fn test_private_lessons_filtered() {
        let csv = "first_name,last_name,classes\nAda,L,\"Tap, Private Lesson, PRIVATE voice\"\n";
        let roster = parse(csv).unwrap();
        assert_eq!(roster[0].entity_names, vec!["Tap"]);

        let options = RosterOptions::default().with_exclude_private(false);
        let roster = parse_roster(csv.as_bytes(), &options).unwrap();
        assert_eq!(roster[0].entity_names.len(), 3);
    }

    #[test]
    fn test_empty_tokens_and_lines_dropped() {
        let roster = parse("first_name,last_name,classes\n\nAda,L,\"Tap,, ,Jazz,\"\n\n").unwrap();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].entity_names, vec!["Tap", "Jazz"]);
    }

    #[test]
    fn test_missing_column() {
        let err = parse("first_name,last_name\nAda,L\n").unwrap_err();
        assert!(matches!(err, IngestError::MissingColumn { column: "classes" }));
    }

    #[test]
    fn test_missing_field_reports_line() {
        let err = parse("first_name,last_name,classes\nAda,L,Tap\nAlan,,Jazz\n").unwrap_err();
        match err {
            IngestError::MissingField { line, field } => {
                assert_eq!(line, 3);
                assert_eq!(field, "last_name");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_roster_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.csv");
        std::fs::write(&path, "first_name,last_name,classes\nAda,L,Tap\n").unwrap();
        let roster = load_roster(&path, &RosterOptions::default()).unwrap();
        assert_eq!(roster.len(), 1);

        let err = load_roster(dir.path().join("missing.csv"), &RosterOptions::default()).unwrap_err();
        assert!(matches!(err, IngestError::Io(_)));
    }
}
