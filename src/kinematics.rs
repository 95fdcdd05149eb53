// Differential drive kinematics for the two-wheeled e-puck base
// Wheel angles (rad) -> linear travel / body velocity / pose updates.

use crate::messages::Pose;

/// Wheel encoder reading for one tick (radians, unwrapped)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KinematicSample {
    pub left_wheel_angle: f64,
    pub right_wheel_angle: f64,
}

impl KinematicSample {
    pub fn new(left_wheel_angle: f64, right_wheel_angle: f64) -> Self {
        Self {
            left_wheel_angle,
            right_wheel_angle,
        }
    }

    /// Per-wheel angle travelled since `previous`
    pub fn delta(&self, previous: &KinematicSample) -> (f64, f64) {
        (
            self.left_wheel_angle - previous.left_wheel_angle,
            self.right_wheel_angle - previous.right_wheel_angle,
        )
    }
}

/// Forward linear speed (m/s) from wheel angle deltas over `dt` seconds
///
/// Spinning in place gives ~0 since the two deltas cancel.
pub fn linear_speed(delta_left: f64, delta_right: f64, wheel_radius: f64, dt: f64) -> f64 {
    if dt <= 0.0 {
        return 0.0;
    }
    (delta_left + delta_right) * 0.5 * wheel_radius / dt
}

/// Integrate a pose by the given wheel angle deltas
///
/// Midpoint heading integration, as used by classic e-puck odometry.
pub fn integrate_pose(
    pose: Pose,
    delta_left: f64,
    delta_right: f64,
    wheel_radius: f64,
    axle_length: f64,
) -> Pose {
    let dist_left = delta_left * wheel_radius;
    let dist_right = delta_right * wheel_radius;

    let distance = (dist_left + dist_right) * 0.5;
    let dtheta = (dist_right - dist_left) / axle_length;
    let heading = pose.theta + dtheta * 0.5;

    Pose {
        x: pose.x + distance * heading.cos(),
        y: pose.y + distance * heading.sin(),
        theta: normalize_angle(pose.theta + dtheta),
    }
}

/// Wrap an angle into (-pi, pi]
pub fn normalize_angle(angle: f64) -> f64 {
    use std::f64::consts::PI;
    let mut a = angle % (2.0 * PI);
    if a > PI {
        a -= 2.0 * PI;
    } else if a <= -PI {
        a += 2.0 * PI;
    }
    a
}
