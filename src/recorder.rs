// Experiment recorder: task timing, collision/parking flags, CSV result logs
//
// Two append-only logs are written on every task end:
//   duration log: participant,mode,trial,duration_sec
//   trial log:    participant,mode,trial,duration_sec,collision,parking
// The header goes in only when the file is created. Each append is
// independent; a failing log is reported and the other one is still written.

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::ControlMode;

#[derive(Debug, thiserror::Error)]
pub enum RecorderError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Outcome of one finished trial
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRecord {
    pub participant_id: String,
    pub control_mode: ControlMode,
    pub trial_number: u32,
    pub duration_seconds: f64,
    pub collision: bool,
    pub parking_success: bool,
}

#[derive(Serialize)]
struct DurationRow<'a> {
    participant: &'a str,
    mode: ControlMode,
    trial: u32,
    duration_sec: f64,
}

#[derive(Serialize)]
struct TrialRow<'a> {
    participant: &'a str,
    mode: ControlMode,
    trial: u32,
    duration_sec: f64,
    collision: u8,
    parking: u8,
}

impl TaskRecord {
    fn duration_row(&self) -> DurationRow<'_> {
        DurationRow {
            participant: &self.participant_id,
            mode: self.control_mode,
            trial: self.trial_number,
            duration_sec: self.duration_seconds,
        }
    }

    fn trial_row(&self) -> TrialRow<'_> {
        TrialRow {
            participant: &self.participant_id,
            mode: self.control_mode,
            trial: self.trial_number,
            duration_sec: self.duration_seconds,
            collision: u8::from(self.collision),
            parking: u8::from(self.parking_success),
        }
    }
}

/// An append-only CSV file
#[derive(Debug, Clone)]
pub struct ResultLog {
    path: PathBuf,
}

impl ResultLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row, writing the header first if the file is new
    pub fn append<T: Serialize>(&self, row: &T) -> Result<(), RecorderError> {
        let write_header = !self.path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(write_header)
            .from_writer(file);
        writer.serialize(row)?;
        writer.flush()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    Running { started_at: Instant },
}

pub struct ExperimentRecorder {
    participant_id: String,
    control_mode: ControlMode,
    trial_number: u32,
    phase: Phase,
    collision: bool,
    parking_success: bool,
    time_log: ResultLog,
    trial_log: ResultLog,
}

impl ExperimentRecorder {
    pub fn new(
        participant_id: impl Into<String>,
        control_mode: ControlMode,
        first_trial: u32,
        time_log: ResultLog,
        trial_log: ResultLog,
    ) -> Self {
        Self {
            participant_id: participant_id.into(),
            control_mode,
            trial_number: first_trial,
            phase: Phase::Idle,
            collision: false,
            parking_success: false,
            time_log,
            trial_log,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, Phase::Running { .. })
    }

    pub fn collision(&self) -> bool {
        self.collision
    }

    pub fn parking_success(&self) -> bool {
        self.parking_success
    }

    pub fn trial_number(&self) -> u32 {
        self.trial_number
    }

    /// Begin a task; ignored (returns false) while one is already running
    pub fn start_task(&mut self, now: Instant) -> bool {
        if self.is_running() {
            warn!("Task already running, start ignored");
            return false;
        }
        self.phase = Phase::Running { started_at: now };
        self.collision = false;
        self.parking_success = false;
        info!(
            "Task started (participant={}, mode={:?}, trial={})",
            self.participant_id, self.control_mode, self.trial_number
        );
        true
    }

    pub fn mark_parking(&mut self) -> bool {
        if !self.is_running() {
            warn!("No active task, parking mark ignored");
            return false;
        }
        self.parking_success = true;
        info!("Parking success marked");
        true
    }

    /// Latch the collision flag for the running task.
    /// Returns true only on the tick it actually latched.
    pub fn mark_collision(&mut self) -> bool {
        if !self.is_running() || self.collision {
            return false;
        }
        self.collision = true;
        true
    }

    /// Finish the running task and append it to both logs
    pub fn end_task(&mut self, now: Instant) -> Option<TaskRecord> {
        let Phase::Running { started_at } = self.phase else {
            warn!("No active task, end ignored");
            return None;
        };

        let duration = now.saturating_duration_since(started_at).as_secs_f64();
        self.phase = Phase::Idle;
        info!("Task ended, duration {:.3} seconds", duration);

        let record = TaskRecord {
            participant_id: self.participant_id.clone(),
            control_mode: self.control_mode,
            trial_number: self.trial_number,
            duration_seconds: duration,
            collision: self.collision,
            parking_success: self.parking_success,
        };

        write_row(&self.time_log, &record.duration_row());
        write_row(&self.trial_log, &record.trial_row());

        self.trial_number += 1;
        Some(record)
    }
}

fn write_row<T: Serialize>(log: &ResultLog, row: &T) {
    match log.append(row) {
        Ok(()) => info!("Written to {}", log.path().display()),
        Err(e) => warn!("Failed to write {}: {}", log.path().display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;

    fn recorder_in(dir: &Path) -> ExperimentRecorder {
        ExperimentRecorder::new(
            "P01",
            ControlMode::Gesture,
            1,
            ResultLog::new(dir.join("results_time.csv")),
            ResultLog::new(dir.join("results_trials.csv")),
        )
    }

    fn lines(path: &Path) -> Vec<String> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_round_trip_appends_one_row_each() {
        let dir = tempfile::tempdir().unwrap();
        let mut recorder = recorder_in(dir.path());
        let t0 = Instant::now();

        assert!(recorder.start_task(t0));
        let record = recorder.end_task(t0 + Duration::from_millis(2500)).unwrap();
        assert_eq!(record.trial_number, 1);
        assert_eq!(record.duration_seconds, 2.5);
        assert_eq!(recorder.trial_number(), 2);
        assert!(!recorder.is_running());

        let time = lines(&dir.path().join("results_time.csv"));
        assert_eq!(time, vec!["participant,mode,trial,duration_sec", "P01,GESTURE,1,2.5"]);

        let trials = lines(&dir.path().join("results_trials.csv"));
        assert_eq!(
            trials,
            vec![
                "participant,mode,trial,duration_sec,collision,parking",
                "P01,GESTURE,1,2.5,0,0"
            ]
        );
    }

    #[test]
    fn test_header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut recorder = recorder_in(dir.path());
        let t0 = Instant::now();

        for i in 0..3u64 {
            recorder.start_task(t0);
            recorder.end_task(t0 + Duration::from_secs(i + 1));
        }

        let trials = lines(&dir.path().join("results_trials.csv"));
        assert_eq!(trials.len(), 4);
        assert_eq!(trials[1], "P01,GESTURE,1,1.0,0,0");
        assert_eq!(trials[3], "P01,GESTURE,3,3.0,0,0");
    }

    #[test]
    fn test_second_start_keeps_original_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let mut recorder = recorder_in(dir.path());
        let t0 = Instant::now();

        assert!(recorder.start_task(t0));
        assert!(!recorder.start_task(t0 + Duration::from_secs(5)));
        let record = recorder.end_task(t0 + Duration::from_secs(8)).unwrap();
        assert_eq!(record.duration_seconds, 8.0);
    }

    #[test]
    fn test_idle_controls_are_noops() {
        let dir = tempfile::tempdir().unwrap();
        let mut recorder = recorder_in(dir.path());

        assert!(!recorder.mark_parking());
        assert!(!recorder.mark_collision());
        assert!(recorder.end_task(Instant::now()).is_none());
        assert_eq!(recorder.trial_number(), 1);
        assert!(!dir.path().join("results_time.csv").exists());
    }

    #[test]
    fn test_flags_reset_on_start() {
        let dir = tempfile::tempdir().unwrap();
        let mut recorder = recorder_in(dir.path());
        let t0 = Instant::now();

        recorder.start_task(t0);
        assert!(recorder.mark_collision());
        assert!(!recorder.mark_collision(), "collision latches only once");
        assert!(recorder.mark_parking());
        let record = recorder.end_task(t0).unwrap();
        assert!(record.collision && record.parking_success);

        recorder.start_task(t0);
        assert!(!recorder.collision());
        assert!(!recorder.parking_success());
    }

    #[test]
    fn test_failed_log_does_not_block_the_other() {
        let dir = tempfile::tempdir().unwrap();
        let mut recorder = ExperimentRecorder::new(
            "P02",
            ControlMode::Keyboard,
            4,
            ResultLog::new(dir.path().join("missing").join("results_time.csv")),
            ResultLog::new(dir.path().join("results_trials.csv")),
        );
        let t0 = Instant::now();

        recorder.start_task(t0);
        let record = recorder.end_task(t0 + Duration::from_secs(1));
        assert!(record.is_some());
        assert_eq!(recorder.trial_number(), 5);

        let trials = lines(&dir.path().join("results_trials.csv"));
        assert_eq!(trials[1], "P02,KEYBOARD,4,1.0,0,0");
    }
}
