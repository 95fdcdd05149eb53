// Robot abstraction and an in-process simulated e-puck
//
// The controller only talks to the `Robot` trait: wheel velocity output,
// wheel angle sensors and an indicator capability query. `SimRobot` is a
// kinematic differential drive inside a square arena; driving into a wall
// stalls the wheels, which is what the stuck detector picks up.

use std::time::Duration;

use tracing::debug;

use crate::config::{AXLE_LENGTH, LED_COUNT, MAX_ANGULAR_SPEED, WHEEL_RADIUS};
use crate::kinematics::{integrate_pose, KinematicSample};
use crate::led::Led;
use crate::messages::{Pose, WheelCommand};

pub trait Robot {
    /// Length of one simulation tick
    fn time_step(&self) -> Duration;

    fn set_wheel_velocities(&mut self, command: WheelCommand);

    /// Current wheel angles (radians)
    fn wheel_positions(&self) -> KinematicSample;

    /// Indicator at `index`, or `None` if this robot has no such device
    fn led(&mut self, index: usize) -> Option<&mut dyn Led>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimLed {
    pub on: bool,
}

impl Led for SimLed {
    fn set(&mut self, on: bool) {
        self.on = on;
    }
}

pub struct SimRobot {
    time_step: Duration,
    command: WheelCommand,
    sample: KinematicSample,
    pose: Pose,
    arena_half_size: f64,
    stalled: bool,
    leds: Vec<Option<SimLed>>,
}

impl SimRobot {
    /// Robot at the arena center with all ten indicators fitted
    pub fn new(time_step: Duration, arena_half_size: f64) -> Self {
        Self {
            time_step,
            command: WheelCommand::zero(),
            sample: KinematicSample::default(),
            pose: Pose::default(),
            arena_half_size,
            stalled: false,
            leds: vec![Some(SimLed::default()); LED_COUNT],
        }
    }

    /// Only fit the indicators listed in `present`
    pub fn with_leds(mut self, present: &[usize]) -> Self {
        self.leds = (0..LED_COUNT)
            .map(|i| present.contains(&i).then(SimLed::default))
            .collect();
        self
    }

    pub fn with_pose(mut self, pose: Pose) -> Self {
        self.pose = pose;
        self
    }

    /// Advance the physics by one tick using the last velocity command
    pub fn advance(&mut self) {
        let dt = self.time_step.as_secs_f64();
        let dl = self.command.left * dt;
        let dr = self.command.right * dt;

        let next = integrate_pose(self.pose, dl, dr, WHEEL_RADIUS, AXLE_LENGTH);
        let inside = next.x.abs() <= self.arena_half_size && next.y.abs() <= self.arena_half_size;

        if inside {
            if self.stalled {
                debug!("Robot free again at ({:.3}, {:.3})", next.x, next.y);
            }
            self.stalled = false;
            self.pose = next;
            self.sample = KinematicSample::new(
                self.sample.left_wheel_angle + dl,
                self.sample.right_wheel_angle + dr,
            );
        } else {
            if !self.stalled {
                debug!("Robot blocked by arena wall at ({:.3}, {:.3})", self.pose.x, self.pose.y);
            }
            self.stalled = true;
        }
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn wheel_command(&self) -> WheelCommand {
        self.command
    }

    pub fn is_stalled(&self) -> bool {
        self.stalled
    }

    pub fn lit_leds(&self) -> Vec<usize> {
        self.leds
            .iter()
            .enumerate()
            .filter_map(|(i, led)| led.filter(|l| l.on).map(|_| i))
            .collect()
    }
}

impl Robot for SimRobot {
    fn time_step(&self) -> Duration {
        self.time_step
    }

    fn set_wheel_velocities(&mut self, command: WheelCommand) {
        self.command = WheelCommand::new(
            command.left.clamp(-MAX_ANGULAR_SPEED, MAX_ANGULAR_SPEED),
            command.right.clamp(-MAX_ANGULAR_SPEED, MAX_ANGULAR_SPEED),
        );
    }

    fn wheel_positions(&self) -> KinematicSample {
        self.sample
    }

    fn led(&mut self, index: usize) -> Option<&mut dyn Led> {
        match self.leds.get_mut(index) {
            Some(Some(led)) => Some(led as &mut dyn Led),
            _ => None,
        }
    }
}
