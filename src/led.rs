// LED feedback: which indicators light up for which command

use crate::config::LED_COUNT;
use crate::messages::{Command, MotionState};
use crate::robot::Robot;

/// Something that can switch an indicator on or off
pub trait Led {
    fn set(&mut self, on: bool);
}

/// What the pattern is derived from: a motion state or a speed change that was just issued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedCue {
    Motion(MotionState),
    SpeedUp,
    SlowDown,
}

impl LedCue {
    /// Cue for a handled command, if that command has one
    pub fn for_command(command: Command) -> Option<Self> {
        match command {
            Command::Move(state) => Some(LedCue::Motion(state)),
            Command::EmergencyStop => Some(LedCue::Motion(MotionState::Stop)),
            Command::SpeedUp => Some(LedCue::SpeedUp),
            Command::SlowDown => Some(LedCue::SlowDown),
            _ => None,
        }
    }
}

/// Set of lit indicators, one bit per index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedPattern(u16);

impl LedPattern {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn from_indices(indices: &[usize]) -> Self {
        let bits = indices
            .iter()
            .filter(|&&i| i < LED_COUNT)
            .fold(0u16, |acc, &i| acc | (1 << i));
        Self(bits)
    }

    pub fn contains(&self, index: usize) -> bool {
        index < LED_COUNT && self.0 & (1 << index) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn indices(&self) -> Vec<usize> {
        (0..LED_COUNT).filter(|&i| self.contains(i)).collect()
    }
}

/// Indicator set for a cue; always empty when feedback is disabled
pub fn pattern_for(cue: LedCue, enabled: bool) -> LedPattern {
    if !enabled {
        return LedPattern::empty();
    }
    match cue {
        LedCue::Motion(MotionState::Stop) => LedPattern::from_indices(&[8]), // body led
        LedCue::Motion(MotionState::Forward) => LedPattern::from_indices(&[0, 1, 2, 3, 4, 5, 6, 7]),
        LedCue::Motion(MotionState::Backward) => LedPattern::from_indices(&[4, 5, 6, 7]),
        LedCue::Motion(MotionState::TurnLeft) => LedPattern::from_indices(&[5, 6, 7]),
        LedCue::Motion(MotionState::TurnRight) => LedPattern::from_indices(&[1, 2, 3]),
        LedCue::SpeedUp => LedPattern::from_indices(&[0, 1, 7]),
        LedCue::SlowDown => LedPattern::from_indices(&[3, 4, 5]),
    }
}

/// Push a pattern to the robot: every present LED off, then the selected ones on.
/// Indices the robot has no LED for are skipped.
pub fn apply_pattern<R: Robot + ?Sized>(robot: &mut R, pattern: LedPattern) {
    for index in 0..LED_COUNT {
        if let Some(led) = robot.led(index) {
            led.set(pattern.contains(index));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_table() {
        let cases: [(LedCue, &[usize]); 7] = [
            (LedCue::Motion(MotionState::Stop), &[8]),
            (LedCue::Motion(MotionState::Forward), &[0, 1, 2, 3, 4, 5, 6, 7]),
            (LedCue::Motion(MotionState::Backward), &[4, 5, 6, 7]),
            (LedCue::Motion(MotionState::TurnLeft), &[5, 6, 7]),
            (LedCue::Motion(MotionState::TurnRight), &[1, 2, 3]),
            (LedCue::SpeedUp, &[0, 1, 7]),
            (LedCue::SlowDown, &[3, 4, 5]),
        ];
        for (cue, expected) in cases {
            assert_eq!(pattern_for(cue, true).indices(), expected.to_vec(), "{:?}", cue);
        }
    }

    #[test]
    fn test_disabled_is_always_empty() {
        assert!(pattern_for(LedCue::Motion(MotionState::Forward), false).is_empty());
        assert!(pattern_for(LedCue::SpeedUp, false).is_empty());
    }

    #[test]
    fn test_emergency_stop_shares_stop_cue() {
        assert_eq!(
            LedCue::for_command(Command::EmergencyStop),
            LedCue::for_command(Command::Move(MotionState::Stop))
        );
        assert_eq!(LedCue::for_command(Command::TaskStart), None);
    }

    #[test]
    fn test_out_of_range_indices_ignored() {
        let pattern = LedPattern::from_indices(&[2, 42]);
        assert_eq!(pattern.indices(), vec![2]);
        assert!(!pattern.contains(42));
    }
}
