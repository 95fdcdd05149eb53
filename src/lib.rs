// Gesture/keyboard teleop controller for a simulated two-wheeled e-puck
//
// Provides:
// - Single-client TCP command channel and local keyboard input
// - Command interpreter, motion state machine and LED feedback
// - Encoder-based stuck/collision detection
// - Experiment recorder writing CSV result logs

pub mod channel;
pub mod config;
pub mod controller;
pub mod keyboard;
pub mod kinematics;
pub mod led;
pub mod messages;
pub mod monitor;
pub mod motion;
pub mod recorder;
pub mod robot;
pub mod runtime;
pub mod telemetry;
