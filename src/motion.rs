// Speed profile and the per-tick state -> wheel command mapping

use tracing::info;

use crate::config::{
    BASE_SPEED_STEP, DEFAULT_BASE_SPEED, DEFAULT_TURN_SPEED, MAX_ANGULAR_SPEED, TURN_SPEED_STEP,
};
use crate::messages::{MotionState, WheelCommand};

/// Commanded wheel speeds for straight driving and spinning in place
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedProfile {
    pub base_speed: f64,
    pub turn_speed: f64,
}

impl Default for SpeedProfile {
    fn default() -> Self {
        Self {
            base_speed: DEFAULT_BASE_SPEED,
            turn_speed: DEFAULT_TURN_SPEED,
        }
    }
}

impl SpeedProfile {
    pub fn speed_up(&mut self) {
        self.base_speed = (self.base_speed + BASE_SPEED_STEP).min(MAX_ANGULAR_SPEED);
        self.turn_speed = (self.turn_speed + TURN_SPEED_STEP).min(MAX_ANGULAR_SPEED);
        info!(
            "Speed increased: base={:.2}, turn={:.2}",
            self.base_speed, self.turn_speed
        );
    }

    pub fn slow_down(&mut self) {
        self.base_speed = (self.base_speed - BASE_SPEED_STEP).max(0.0);
        self.turn_speed = (self.turn_speed - TURN_SPEED_STEP).max(0.0);
        info!(
            "Speed decreased: base={:.2}, turn={:.2}",
            self.base_speed, self.turn_speed
        );
    }
}

/// Wheel velocities for a motion state (pure, recomputed every tick)
pub fn wheel_command(state: MotionState, profile: &SpeedProfile) -> WheelCommand {
    let base = profile.base_speed;
    let turn = profile.turn_speed;
    match state {
        MotionState::Stop => WheelCommand::zero(),
        MotionState::Forward => WheelCommand::new(base, base),
        MotionState::Backward => WheelCommand::new(-base, -base),
        MotionState::TurnLeft => WheelCommand::new(-turn, turn),
        MotionState::TurnRight => WheelCommand::new(turn, -turn),
    }
}

/// Magnitude of the speed the current state asks the wheels for
pub fn commanded_speed(state: MotionState, profile: &SpeedProfile) -> f64 {
    match state {
        MotionState::Stop => 0.0,
        MotionState::Forward | MotionState::Backward => profile.base_speed.abs(),
        MotionState::TurnLeft | MotionState::TurnRight => profile.turn_speed.abs(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wheel_command_table() {
        let profile = SpeedProfile::default();
        assert_eq!(wheel_command(MotionState::Stop, &profile), WheelCommand::zero());
        assert_eq!(wheel_command(MotionState::Forward, &profile), WheelCommand::new(3.0, 3.0));
        assert_eq!(wheel_command(MotionState::Backward, &profile), WheelCommand::new(-3.0, -3.0));
        assert_eq!(wheel_command(MotionState::TurnLeft, &profile), WheelCommand::new(-2.0, 2.0));
        assert_eq!(wheel_command(MotionState::TurnRight, &profile), WheelCommand::new(2.0, -2.0));
    }

    #[test]
    fn test_speed_up_saturates() {
        for k in 0..8u32 {
            let mut profile = SpeedProfile::default();
            for _ in 0..k {
                profile.speed_up();
            }
            let k = k as f64;
            assert_eq!(profile.base_speed, (3.0 + k).min(MAX_ANGULAR_SPEED));
            assert_eq!(profile.turn_speed, (2.0 + 0.5 * k).min(MAX_ANGULAR_SPEED));
        }
    }

    #[test]
    fn test_slow_down_floors_at_zero() {
        let mut profile = SpeedProfile::default();
        for _ in 0..5 {
            profile.slow_down();
        }
        assert_eq!(profile.base_speed, 0.0);
        assert_eq!(profile.turn_speed, 0.0);
        assert_eq!(commanded_speed(MotionState::Forward, &profile), 0.0);
    }

    #[test]
    fn test_commanded_speed_by_state() {
        let profile = SpeedProfile::default();
        assert_eq!(commanded_speed(MotionState::Stop, &profile), 0.0);
        assert_eq!(commanded_speed(MotionState::Backward, &profile), 3.0);
        assert_eq!(commanded_speed(MotionState::TurnRight, &profile), 2.0);
    }
}
