use super::collision::CircularBarrier;

pub const BUTTON_BARRIER_RADIUS: f32 = 8.0;
/// Pushes the disk of a wall-side button away from the aisle, toward the
/// exhibit it labels.
pub const BUTTON_BARRIER_OFFSET: f32 = 7.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButtonAnchor {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl ButtonAnchor {
    pub const fn new(id: u32, x: f32, y: f32, z: f32) -> Self {
        Self { id, x, y, z }
    }

    pub fn barrier(&self) -> CircularBarrier {
        CircularBarrier::new(
            offset_near_aisle(self.x),
            offset_near_aisle(self.z),
            BUTTON_BARRIER_RADIUS,
        )
    }
}

fn offset_near_aisle(coordinate: f32) -> f32 {
    if coordinate > -15.0 && coordinate < -10.0 {
        coordinate - BUTTON_BARRIER_OFFSET
    } else if coordinate > 10.0 && coordinate < 15.0 {
        coordinate + BUTTON_BARRIER_OFFSET
    } else {
        coordinate
    }
}

const MUSEUM_BUTTONS: [ButtonAnchor; 24] = [
    // front gallery
    ButtonAnchor::new(1, -13.0, 1.0, -111.0),
    ButtonAnchor::new(2, 13.0, 1.0, -111.0),
    ButtonAnchor::new(3, -13.0, 1.0, -89.5),
    ButtonAnchor::new(4, 13.0, 1.0, -89.5),
    ButtonAnchor::new(5, -13.0, 1.0, -68.0),
    ButtonAnchor::new(6, 13.0, 1.0, -68.0),
    // left gallery
    ButtonAnchor::new(7, -110.0, 1.0, -13.0),
    ButtonAnchor::new(8, -110.0, 1.0, 13.0),
    ButtonAnchor::new(9, -88.5, 1.0, -13.0),
    ButtonAnchor::new(10, -88.5, 1.0, 13.0),
    ButtonAnchor::new(11, -67.0, 1.0, -13.0),
    ButtonAnchor::new(12, -67.0, 1.0, 13.0),
    // back gallery
    ButtonAnchor::new(13, 12.5, 1.0, 110.0),
    ButtonAnchor::new(14, -13.0, 1.0, 110.0),
    ButtonAnchor::new(15, 12.5, 1.0, 88.5),
    ButtonAnchor::new(16, -13.0, 1.0, 88.5),
    ButtonAnchor::new(17, 12.5, 1.0, 67.0),
    ButtonAnchor::new(18, -13.0, 1.0, 67.0),
    // right gallery
    ButtonAnchor::new(19, 110.5, 1.0, 13.0),
    ButtonAnchor::new(20, 110.5, 1.0, -13.0),
    ButtonAnchor::new(21, 89.5, 1.0, 13.0),
    ButtonAnchor::new(22, 89.5, 1.0, -13.0),
    ButtonAnchor::new(23, 68.0, 1.0, 13.0),
    ButtonAnchor::new(24, 68.0, 1.0, -13.0),
];

/// Exhibit info buttons of the museum floor. Brand-wall buttons sit flush with
/// the outer walls and get no barrier.
pub fn museum_button_anchors() -> &'static [ButtonAnchor] {
    &MUSEUM_BUTTONS
}

pub fn museum_barriers() -> Vec<CircularBarrier> {
    MUSEUM_BUTTONS.iter().map(ButtonAnchor::barrier).collect()
}
