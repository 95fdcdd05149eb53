// Per-tick controller: command interpretation, motion output, stuck detection
//
// All mutable controller data lives in `ControllerState`, which the runtime
// owns and passes into `step` once per tick. Tick order:
//   1. network event   2. local keys   3. wheel output   4. stuck detection

use std::time::Instant;

use tracing::{info, warn};

use crate::channel::ChannelEvent;
use crate::config::ControllerConfig;
use crate::keyboard::KeyAction;
use crate::led::{apply_pattern, pattern_for, LedCue, LedPattern};
use crate::messages::{Command, ControllerStatus, MotionState, Pose, WheelCommand};
use crate::monitor::{KinematicMonitor, MonitorReading, MonitorThresholds};
use crate::motion::{commanded_speed, wheel_command, SpeedProfile};
use crate::recorder::{ExperimentRecorder, ResultLog};
use crate::robot::Robot;

/// Returned by `step`; `Terminate` ends the host loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    Terminate,
}

pub struct ControllerState {
    motion: MotionState,
    speed: SpeedProfile,
    feedback_enabled: bool,
    client_connected: bool,
    monitor: KinematicMonitor,
    recorder: ExperimentRecorder,
    output: WheelCommand,
    last_reading: Option<MonitorReading>,
}

impl ControllerState {
    pub fn new<R: Robot + ?Sized>(
        robot: &mut R,
        recorder: ExperimentRecorder,
        feedback_enabled: bool,
    ) -> Self {
        Self::with_thresholds(robot, recorder, feedback_enabled, MonitorThresholds::default())
    }

    pub fn with_thresholds<R: Robot + ?Sized>(
        robot: &mut R,
        recorder: ExperimentRecorder,
        feedback_enabled: bool,
        thresholds: MonitorThresholds,
    ) -> Self {
        let monitor = KinematicMonitor::with_thresholds(robot.wheel_positions(), thresholds);
        robot.set_wheel_velocities(WheelCommand::zero());
        Self {
            motion: MotionState::Stop,
            speed: SpeedProfile::default(),
            feedback_enabled,
            client_connected: false,
            monitor,
            recorder,
            output: WheelCommand::zero(),
            last_reading: None,
        }
    }

    /// Build from CLI config with the configured result logs
    pub fn from_config<R: Robot + ?Sized>(robot: &mut R, config: &ControllerConfig) -> Self {
        let recorder = ExperimentRecorder::new(
            config.participant.clone(),
            config.mode,
            config.trial,
            ResultLog::new(&config.time_log),
            ResultLog::new(&config.trial_log),
        );
        let thresholds = MonitorThresholds {
            actual_speed: config.actual_speed_threshold,
            ..MonitorThresholds::default()
        };
        Self::with_thresholds(robot, recorder, !config.no_feedback, thresholds)
    }

    pub fn motion(&self) -> MotionState {
        self.motion
    }

    pub fn speed(&self) -> SpeedProfile {
        self.speed
    }

    pub fn output(&self) -> WheelCommand {
        self.output
    }

    pub fn feedback_enabled(&self) -> bool {
        self.feedback_enabled
    }

    pub fn recorder(&self) -> &ExperimentRecorder {
        &self.recorder
    }

    pub fn stuck_counter(&self) -> u32 {
        self.monitor.stuck_counter()
    }

    /// One simulation tick
    pub fn step<R: Robot + ?Sized>(
        &mut self,
        robot: &mut R,
        network: ChannelEvent,
        keys: &[KeyAction],
        now: Instant,
    ) -> StepOutcome {
        self.handle_channel_event(robot, network, now);

        let mut outcome = StepOutcome::Continue;
        for &key in keys {
            match key {
                KeyAction::Command(command) => self.handle_command(robot, command, now),
                KeyAction::Quit => {
                    info!("Quit requested");
                    outcome = StepOutcome::Terminate;
                }
            }
        }

        self.output = wheel_command(self.motion, &self.speed);
        robot.set_wheel_velocities(self.output);

        self.update_monitor(robot);
        outcome
    }

    pub fn handle_channel_event<R: Robot + ?Sized>(
        &mut self,
        robot: &mut R,
        event: ChannelEvent,
        now: Instant,
    ) {
        match event {
            ChannelEvent::Idle => {}
            ChannelEvent::Connected(_) => {
                self.client_connected = true;
                self.show(robot, LedCue::Motion(self.motion));
            }
            ChannelEvent::Command(token) => self.handle_token(robot, &token, now),
            ChannelEvent::Disconnected | ChannelEvent::Fault(_) => {
                self.client_connected = false;
                self.halt(robot);
            }
        }
    }

    /// Parse and apply a network token; unknown tokens are only logged
    pub fn handle_token<R: Robot + ?Sized>(&mut self, robot: &mut R, token: &str, now: Instant) {
        match token.parse::<Command>() {
            Ok(command) => self.handle_command(robot, command, now),
            Err(e) => warn!("Unknown command: {}", e.0),
        }
    }

    /// Shared entry point for network and keyboard commands
    pub fn handle_command<R: Robot + ?Sized>(
        &mut self,
        robot: &mut R,
        command: Command,
        now: Instant,
    ) {
        match command {
            Command::Move(state) => {
                self.motion = state;
                info!("Motion state set to: {}", state);
            }
            Command::SpeedUp => self.speed.speed_up(),
            Command::SlowDown => self.speed.slow_down(),
            Command::EmergencyStop => {
                self.halt(robot);
                info!("Emergency stop activated");
                return;
            }
            Command::TaskStart => {
                self.recorder.start_task(now);
            }
            Command::TaskEnd => {
                self.recorder.end_task(now);
            }
            Command::MarkParking => {
                self.recorder.mark_parking();
            }
            Command::ToggleFeedback => {
                self.feedback_enabled = !self.feedback_enabled;
                if self.feedback_enabled {
                    info!("LED feedback enabled, refreshing LED state");
                    self.show(robot, LedCue::Motion(self.motion));
                } else {
                    info!("LED feedback disabled");
                    apply_pattern(robot, LedPattern::empty());
                }
            }
        }

        if let Some(cue) = LedCue::for_command(command) {
            self.show(robot, cue);
        }
    }

    /// Safe stop: STOP state, zero wheels right now, STOP pattern
    fn halt<R: Robot + ?Sized>(&mut self, robot: &mut R) {
        self.motion = MotionState::Stop;
        self.output = WheelCommand::zero();
        robot.set_wheel_velocities(self.output);
        self.show(robot, LedCue::Motion(MotionState::Stop));
    }

    fn show<R: Robot + ?Sized>(&self, robot: &mut R, cue: LedCue) {
        apply_pattern(robot, pattern_for(cue, self.feedback_enabled));
    }

    fn update_monitor<R: Robot + ?Sized>(&mut self, robot: &mut R) {
        let dt = robot.time_step().as_secs_f64();
        let moving = self.recorder.is_running() && self.motion != MotionState::Stop;
        let reading = self.monitor.update(
            robot.wheel_positions(),
            dt,
            moving,
            commanded_speed(self.motion, &self.speed),
        );

        if reading.stuck && self.recorder.mark_collision() {
            warn!("Collision detected: commanded to move but speed dropped");
        }
        self.last_reading = Some(reading);
    }

    pub fn status(&self, pose: Pose) -> ControllerStatus {
        ControllerStatus {
            motion: self.motion,
            base_speed: self.speed.base_speed,
            turn_speed: self.speed.turn_speed,
            linear_speed: self.last_reading.map_or(0.0, |r| r.linear_speed),
            client_connected: self.client_connected,
            task_running: self.recorder.is_running(),
            collision: self.recorder.collision(),
            pose,
        }
    }
}
