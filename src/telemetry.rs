// src/telemetry.rs
//
// Telemetry sinks for episode runs.
// - StepSink: trait used by the harness
// - NoopSink: discards all records
// - FileSink: one JSON line per step, for offline analysis / replay

use std::fs::File;
use std::io::{self, BufWriter, Write};

use serde::Serialize;

use crate::env::StepResult;

/// Abstract sink for per-step telemetry.
pub trait StepSink {
    fn log_step(&mut self, episode: u64, tick: u64, result: &StepResult);
}

/// Sink that discards all records.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl StepSink for NoopSink {
    fn log_step(&mut self, _episode: u64, _tick: u64, _result: &StepResult) {
        // intentionally no-op
    }
}

#[derive(Serialize)]
struct StepLine<'a> {
    episode: u64,
    tick: u64,
    #[serde(flatten)]
    result: &'a StepResult,
}

/// JSONL file sink. Each step is written as a single JSON object on its own
/// line; serialization failures are dropped rather than aborting the run.
pub struct FileSink {
    writer: BufWriter<File>,
}

impl FileSink {
    /// Create a new sink writing to `path`.
    pub fn create(path: &str) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    /// Flush buffered records.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl StepSink for FileSink {
    fn log_step(&mut self, episode: u64, tick: u64, result: &StepResult) {
        let line = StepLine {
            episode,
            tick,
            result,
        };
        if let Ok(json) = serde_json::to_string(&line) {
            let _ = self.writer.write_all(json.as_bytes());
            let _ = self.writer.write_all(b"\n");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{Observation, StepInfo, OBS_VERSION};
    use crate::types::MotionState;

    fn result() -> StepResult {
        StepResult {
            observation: Observation {
                obs_version: OBS_VERSION,
                state_code: 4,
                location_code: 2,
            },
            reward: 1.0,
            done: false,
            info: StepInfo {
                activity_id: 1,
                activity_name: "Morning jog".into(),
                state: MotionState::Walking,
                location: "Park".into(),
                action_space: 3,
            },
        }
    }

    #[test]
    fn file_sink_writes_one_line_per_step() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("steps.jsonl");
        let mut sink = FileSink::create(path.to_str().unwrap()).unwrap();
        sink.log_step(0, 1, &result());
        sink.log_step(0, 2, &result());
        sink.flush().unwrap();
        drop(sink);

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed["tick"], 1);
        assert_eq!(parsed["reward"], 1.0);
        assert_eq!(parsed["info"]["location"], "Park");
    }
}
