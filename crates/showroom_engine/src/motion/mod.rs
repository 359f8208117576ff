mod barriers;
mod camera;
mod collision;
mod input;
mod locomotion;

pub use barriers::{
    museum_barriers, museum_button_anchors, ButtonAnchor, BUTTON_BARRIER_OFFSET,
    BUTTON_BARRIER_RADIUS,
};
pub use camera::{CameraRig, FirstPersonCamera};
pub use collision::{
    can_move, Aabb, BlockReason, CircularBarrier, Obstacle, ObstacleSet, Ray, RayTarget,
    TriangleMesh, BARRIER_CLEARANCE, COLLISION_MARGIN,
};
pub use input::{direction_for_key, DirectionState, MoveDirection, MoveIntent};
pub use locomotion::{movement_vector, Locomotion, MoveOutcome, DEFAULT_SPEED, EYE_HEIGHT};
