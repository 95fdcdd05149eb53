// Timing, thresholds, robot geometry, experiment files and CLI overrides
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use serde::Serialize;

// Simulation basic time step (one tick)
pub const TIME_STEP_MS: u64 = 32;

// TCP server for the gesture client
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 10020;
pub const RECV_BUFFER_SIZE: usize = 1024;

// Speed profile (rad/s at the wheel)
pub const DEFAULT_BASE_SPEED: f64 = 3.0;
pub const DEFAULT_TURN_SPEED: f64 = 2.0;
pub const BASE_SPEED_STEP: f64 = 1.0;
pub const TURN_SPEED_STEP: f64 = 0.5;
pub const MAX_ANGULAR_SPEED: f64 = 6.28; // actuator limit

// e-puck geometry
pub const WHEEL_RADIUS: f64 = 0.0205; // meters
pub const AXLE_LENGTH: f64 = 0.052; // meters

// Stuck detection
pub const STUCK_STEPS_THRESHOLD: u32 = 5; // consecutive ticks
pub const COMMAND_SPEED_THRESHOLD: f64 = 0.1; // rad/s, above this we are "told to move"
pub const ACTUAL_SPEED_THRESHOLD: f64 = 0.01; // m/s, below this we are "not moving"

// Indicator ring: led0..led7 + body led8 + front led9
pub const LED_COUNT: usize = 10;

// Simulated arena (square, centered on the start pose)
pub const ARENA_HALF_SIZE: f64 = 0.5; // meters

// Experiment result files
pub const RESULT_TIME_FILE: &str = "results_time.csv";
pub const RESULT_TRIAL_FILE: &str = "results_trials.csv";
pub const DEFAULT_PARTICIPANT: &str = "P01";

// Zenoh topics
pub const TOPIC_RT_WHEELS: &str = "epuck/rt/wheels"; // actuation
pub const TOPIC_STATE: &str = "epuck/state/controller"; // controller status

/// Which input modality a trial is run with (labels every result row)
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ControlMode {
    Gesture,
    Keyboard,
}

/// Command line overrides for the controller
#[derive(Debug, Clone, Parser)]
#[command(name = "epuck-gesture-runtime", about = "Gesture/keyboard teleop controller for a simulated e-puck")]
pub struct ControllerConfig {
    /// Address the gesture client connects to
    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,

    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Participant id written to every result row
    #[arg(long, default_value = DEFAULT_PARTICIPANT)]
    pub participant: String,

    #[arg(long, value_enum, default_value_t = ControlMode::Gesture)]
    pub mode: ControlMode,

    /// Trial number of the first task in this session
    #[arg(long, default_value_t = 1)]
    pub trial: u32,

    #[arg(long, default_value = RESULT_TIME_FILE)]
    pub time_log: PathBuf,

    #[arg(long, default_value = RESULT_TRIAL_FILE)]
    pub trial_log: PathBuf,

    #[arg(long, default_value_t = TIME_STEP_MS)]
    pub time_step_ms: u64,

    /// Start with LED feedback disabled
    #[arg(long)]
    pub no_feedback: bool,

    /// Do not publish actuation/status over zenoh
    #[arg(long)]
    pub no_telemetry: bool,

    /// Half the side length of the simulated arena, in meters
    #[arg(long, default_value_t = ARENA_HALF_SIZE)]
    pub arena_half_size: f64,

    /// Measured speed (m/s) below which a commanded robot counts as stuck
    #[arg(long, default_value_t = ACTUAL_SPEED_THRESHOLD)]
    pub actual_speed_threshold: f64,
}

impl ControllerConfig {
    pub fn time_step(&self) -> Duration {
        Duration::from_millis(self.time_step_ms.max(1))
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            participant: DEFAULT_PARTICIPANT.to_string(),
            mode: ControlMode::Gesture,
            trial: 1,
            time_log: PathBuf::from(RESULT_TIME_FILE),
            trial_log: PathBuf::from(RESULT_TRIAL_FILE),
            time_step_ms: TIME_STEP_MS,
            no_feedback: false,
            no_telemetry: false,
            arena_half_size: ARENA_HALF_SIZE,
            actual_speed_threshold: ACTUAL_SPEED_THRESHOLD,
        }
    }
}
