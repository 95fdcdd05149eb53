// Stuck detection: commanded to move, but the wheels say otherwise
//
// There is no contact sensor on the base, so a collision is inferred when the
// robot is told to move for several consecutive ticks while the encoder-based
// speed estimate stays near zero.

use tracing::debug;

use crate::config::{
    ACTUAL_SPEED_THRESHOLD, COMMAND_SPEED_THRESHOLD, STUCK_STEPS_THRESHOLD, WHEEL_RADIUS,
};
use crate::kinematics::{linear_speed, KinematicSample};

#[derive(Debug, Clone, Copy)]
pub struct MonitorThresholds {
    pub stuck_steps: u32,
    pub command_speed: f64,
    pub actual_speed: f64,
    pub wheel_radius: f64,
}

impl Default for MonitorThresholds {
    fn default() -> Self {
        Self {
            stuck_steps: STUCK_STEPS_THRESHOLD,
            command_speed: COMMAND_SPEED_THRESHOLD,
            actual_speed: ACTUAL_SPEED_THRESHOLD,
            wheel_radius: WHEEL_RADIUS,
        }
    }
}

/// What the monitor concluded for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonitorReading {
    pub linear_speed: f64,
    pub stuck_counter: u32,
    /// Counter is at or above the threshold this tick
    pub stuck: bool,
}

pub struct KinematicMonitor {
    thresholds: MonitorThresholds,
    previous: KinematicSample,
    stuck_counter: u32,
}

impl KinematicMonitor {
    pub fn new(initial: KinematicSample) -> Self {
        Self::with_thresholds(initial, MonitorThresholds::default())
    }

    pub fn with_thresholds(initial: KinematicSample, thresholds: MonitorThresholds) -> Self {
        Self {
            thresholds,
            previous: initial,
            stuck_counter: 0,
        }
    }

    /// Feed one tick of encoder data
    ///
    /// * `moving` - the robot is in a non-STOP state during an active task
    /// * `commanded_speed` - magnitude of the wheel speed that state requests
    pub fn update(
        &mut self,
        sample: KinematicSample,
        dt: f64,
        moving: bool,
        commanded_speed: f64,
    ) -> MonitorReading {
        let (dl, dr) = sample.delta(&self.previous);
        self.previous = sample;

        let speed = linear_speed(dl, dr, self.thresholds.wheel_radius, dt);

        let commanded = moving && commanded_speed > self.thresholds.command_speed;
        let stationary = speed.abs() < self.thresholds.actual_speed;

        if commanded && stationary {
            self.stuck_counter = self.stuck_counter.saturating_add(1);
            debug!(
                "Stuck tick {}: commanded {:.2} rad/s, measured {:.3} m/s",
                self.stuck_counter, commanded_speed, speed
            );
        } else {
            self.stuck_counter = 0;
        }

        MonitorReading {
            linear_speed: speed,
            stuck_counter: self.stuck_counter,
            stuck: self.stuck_counter >= self.thresholds.stuck_steps,
        }
    }

    pub fn stuck_counter(&self) -> u32 {
        self.stuck_counter
    }
}
