// Command vocabulary, motion state and the messages the runtime publishes

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Discrete movement mode of the robot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MotionState {
    #[default]
    Stop,
    Forward,
    Backward,
    TurnLeft,
    TurnRight,
}

impl MotionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            MotionState::Stop => "STOP",
            MotionState::Forward => "FORWARD",
            MotionState::Backward => "BACKWARD",
            MotionState::TurnLeft => "TURN_LEFT",
            MotionState::TurnRight => "TURN_RIGHT",
        }
    }
}

impl fmt::Display for MotionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Commands accepted from the gesture client and the keyboard
///
/// The experiment controls (`TaskStart` .. `ToggleFeedback`) are only ever
/// produced by the local keyboard, never parsed off the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(MotionState),
    SpeedUp,
    SlowDown,
    EmergencyStop,
    TaskStart,
    TaskEnd,
    MarkParking,
    ToggleFeedback,
}

/// Token that matched nothing in the network vocabulary
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown command token: {0:?}")]
pub struct UnknownCommand(pub String);

impl FromStr for Command {
    type Err = UnknownCommand;

    /// Parse a network token (trimmed, case-insensitive)
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let token = token.trim().to_ascii_uppercase();
        let command = match token.as_str() {
            "STOP" => Command::Move(MotionState::Stop),
            "FORWARD" => Command::Move(MotionState::Forward),
            "BACKWARD" => Command::Move(MotionState::Backward),
            "TURN_LEFT" => Command::Move(MotionState::TurnLeft),
            "TURN_RIGHT" => Command::Move(MotionState::TurnRight),
            "SPEED_UP" => Command::SpeedUp,
            "SLOW_DOWN" => Command::SlowDown,
            "EMERGENCY_STOP" => Command::EmergencyStop,
            _ => return Err(UnknownCommand(token)),
        };
        Ok(command)
    }
}

/// Left/right wheel angular velocity command (rad/s)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WheelCommand {
    pub left: f64,
    pub right: f64,
}

impl WheelCommand {
    pub fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }

    pub fn zero() -> Self {
        Self::default()
    }
}

/// Estimated body pose of the simulated robot
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
}

/// Status published by the runtime every tick
#[derive(Debug, Clone, Serialize)]
pub struct ControllerStatus {
    pub motion: MotionState,
    pub base_speed: f64,
    pub turn_speed: f64,
    pub linear_speed: f64,
    pub client_connected: bool,
    pub task_running: bool,
    pub collision: bool,
    pub pose: Pose,
}
