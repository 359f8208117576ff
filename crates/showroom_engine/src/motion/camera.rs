use crate::geometry::Vec3;

use super::locomotion::EYE_HEIGHT;

pub trait CameraRig {
    fn position(&self) -> Vec3;
    fn set_position(&mut self, position: Vec3);
    fn look_direction(&self) -> Vec3;
    fn up(&self) -> Vec3 {
        Vec3::UP
    }
    /// Whether player input currently drives the camera (no modal UI open).
    fn is_locked(&self) -> bool;
}

/// Pointer-lock style camera: yaw around world up, pitch around the camera's
/// right axis. Yaw 0 looks down -Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FirstPersonCamera {
    pub position: Vec3,
    pub yaw_radians: f32,
    pub pitch_radians: f32,
    locked: bool,
}

const PITCH_LIMIT_RADIANS: f32 = std::f32::consts::FRAC_PI_2 - 0.001;

impl Default for FirstPersonCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, EYE_HEIGHT, 0.0),
            yaw_radians: 0.0,
            pitch_radians: 0.0,
            locked: false,
        }
    }
}

impl FirstPersonCamera {
    pub fn at(x: f32, z: f32) -> Self {
        Self {
            position: Vec3::new(x, EYE_HEIGHT, z),
            ..Self::default()
        }
    }

    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn unlock(&mut self) {
        self.locked = false;
    }

    pub fn set_yaw_degrees(&mut self, degrees: f32) {
        self.yaw_radians = degrees.to_radians();
    }

    pub fn set_pitch_clamped(&mut self, pitch_radians: f32) {
        self.pitch_radians = if pitch_radians.is_finite() {
            pitch_radians.clamp(-PITCH_LIMIT_RADIANS, PITCH_LIMIT_RADIANS)
        } else {
            0.0
        };
    }

    pub fn rotate(&mut self, yaw_delta: f32, pitch_delta: f32) {
        self.yaw_radians += yaw_delta;
        self.set_pitch_clamped(self.pitch_radians + pitch_delta);
    }
}

impl CameraRig for FirstPersonCamera {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn look_direction(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw_radians.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch_radians.sin_cos();
        Vec3::new(-sin_yaw * cos_pitch, sin_pitch, -cos_yaw * cos_pitch)
    }

    fn is_locked(&self) -> bool {
        self.locked
    }
}
