use tracing::{debug, warn};
use winit::keyboard::KeyCode;

use crate::geometry::Vec3;

use super::camera::CameraRig;
use super::collision::{can_move, BlockReason, ObstacleSet};
use super::input::{DirectionState, MoveDirection, MoveIntent};

pub const EYE_HEIGHT: f32 = 4.0;
pub const DEFAULT_SPEED: f32 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveOutcome {
    Inactive,
    Idle,
    Moved { from: Vec3, to: Vec3 },
    Blocked(BlockReason),
}

/// Per-frame first-person movement. Owns the held-key state and the speed so
/// several independent instances can coexist.
#[derive(Debug, Clone)]
pub struct Locomotion {
    speed: f32,
    directions: DirectionState,
}

impl Default for Locomotion {
    fn default() -> Self {
        Self::new(DEFAULT_SPEED)
    }
}

impl Locomotion {
    pub fn new(speed: f32) -> Self {
        let mut locomotion = Self {
            speed: DEFAULT_SPEED,
            directions: DirectionState::empty(),
        };
        locomotion.set_speed(speed);
        locomotion
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f32) {
        if !speed.is_finite() {
            warn!(speed, "ignoring non-finite movement speed");
            return;
        }
        self.speed = speed;
    }

    pub fn handle_key(&mut self, key: KeyCode, is_pressed: bool) -> bool {
        self.directions.set_key(key, is_pressed)
    }

    pub fn set_direction(&mut self, direction: MoveDirection, is_down: bool) {
        self.directions.set(direction, is_down);
    }

    pub fn directions(&self) -> &DirectionState {
        &self.directions
    }

    pub fn release_all(&mut self) {
        self.directions.release_all();
    }

    pub fn step(&self, camera: &mut impl CameraRig, obstacles: &ObstacleSet) -> MoveOutcome {
        if !camera.is_locked() {
            return MoveOutcome::Inactive;
        }

        let intent = self.directions.intent();
        if intent.is_zero() {
            return MoveOutcome::Idle;
        }

        let Some(movement) =
            movement_vector(intent, camera.look_direction(), camera.up(), self.speed)
        else {
            return MoveOutcome::Idle;
        };

        let from = camera.position();
        match can_move(movement, from, obstacles) {
            Ok(()) => {
                let to = (from + movement).with_y(EYE_HEIGHT);
                camera.set_position(to);
                MoveOutcome::Moved { from, to }
            }
            Err(reason) => {
                debug!(?reason, x = from.x, z = from.z, "move_rejected");
                camera.set_position(from.with_y(EYE_HEIGHT));
                MoveOutcome::Blocked(reason)
            }
        }
    }
}

/// Camera-relative displacement for one frame, scaled to exactly `speed`
/// regardless of how many axes are active. `None` when the intent or the
/// projected basis is degenerate.
pub fn movement_vector(intent: MoveIntent, look: Vec3, up: Vec3, speed: f32) -> Option<Vec3> {
    if intent.is_zero() {
        return None;
    }

    let forward = look.flattened().normalize_or_zero();
    let right = forward.cross(up).normalize_or_zero();
    let combined = forward * f32::from(intent.forward) + right * f32::from(intent.strafe);

    combined.try_normalize().map(|direction| direction * speed)
}
