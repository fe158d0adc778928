// src/journal.rs
//
// Append-only JSONL journal for the feedback/action log.
//
// One serialized record per line. The journal is the durable side of the
// in-memory store: attach a writer to mirror appends to disk, replay a file
// to rebuild the tables at startup.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::types::{ActivityId, FeedbackRecord};

/// One journaled row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JournalRecord {
    Feedback(FeedbackRecord),
    Action {
        action: usize,
        activity_id: ActivityId,
    },
}

/// Line-buffered JSONL appender.
pub struct JournalWriter {
    writer: BufWriter<File>,
}

impl JournalWriter {
    /// Open for appending, creating the file if needed.
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())
            .with_context(|| format!("opening journal {:?}", path.as_ref()))?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    /// Append one record and flush. Each record must be durable before the
    /// caller's request completes.
    pub fn append(&mut self, record: &JournalRecord) -> anyhow::Result<()> {
        let line = serde_json::to_string(record).context("serializing journal record")?;
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Read a full journal file. Blank lines are skipped; a malformed line is an
/// error, not a silent drop.
pub fn read_journal(path: impl AsRef<Path>) -> anyhow::Result<Vec<JournalRecord>> {
    let file =
        File::open(path.as_ref()).with_context(|| format!("opening journal {:?}", path.as_ref()))?;
    let reader = BufReader::new(file);
    let mut records = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: JournalRecord = serde_json::from_str(&line)
            .with_context(|| format!("parsing journal line {}", lineno + 1))?;
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MotionState;

    fn sample_feedback() -> FeedbackRecord {
        FeedbackRecord {
            state: MotionState::Walking,
            activity_id: 3,
            feedback: "Yes".into(),
            reward: Some(1.0),
            observation: Some("[4, 2]".into()),
        }
    }

    #[test]
    fn write_then_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.jsonl");

        let mut writer = JournalWriter::open(&path).unwrap();
        writer
            .append(&JournalRecord::Feedback(sample_feedback()))
            .unwrap();
        writer
            .append(&JournalRecord::Action {
                action: 2,
                activity_id: 3,
            })
            .unwrap();
        drop(writer);

        let records = read_journal(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], JournalRecord::Feedback(sample_feedback()));
        assert_eq!(
            records[1],
            JournalRecord::Action {
                action: 2,
                activity_id: 3
            }
        );
    }

    #[test]
    fn append_mode_preserves_existing_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.jsonl");

        for i in 0..2 {
            let mut writer = JournalWriter::open(&path).unwrap();
            writer
                .append(&JournalRecord::Action {
                    action: i,
                    activity_id: 1,
                })
                .unwrap();
        }

        let records = read_journal(&path).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn malformed_line_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.jsonl");
        std::fs::write(&path, "{not json}\n").unwrap();
        assert!(read_journal(&path).is_err());
    }
}
