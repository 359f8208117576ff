use winit::keyboard::KeyCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveDirection {
    Forward,
    Back,
    Left,
    Right,
}

const MOVEMENT_KEY_COUNT: usize = 8;

/// Held state of the eight movement keys. WASD and the arrow keys are tracked
/// separately so releasing one alias does not cancel the other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectionState {
    down: [bool; MOVEMENT_KEY_COUNT],
}

/// Signed per-axis intent: `forward` is +1 forward / -1 back, `strafe` is
/// +1 right / -1 left.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveIntent {
    pub forward: i8,
    pub strafe: i8,
}

impl MoveIntent {
    pub fn is_zero(self) -> bool {
        self.forward == 0 && self.strafe == 0
    }
}

impl DirectionState {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn set_key(&mut self, key: KeyCode, is_down: bool) -> bool {
        match key_slot(key) {
            Some(slot) => {
                self.down[slot] = is_down;
                true
            }
            None => false,
        }
    }

    pub fn set(&mut self, direction: MoveDirection, is_down: bool) {
        let (primary, alias) = direction.slots();
        self.down[primary] = is_down;
        self.down[alias] = is_down;
    }

    pub fn with_direction(mut self, direction: MoveDirection, is_down: bool) -> Self {
        self.set(direction, is_down);
        self
    }

    pub fn is_down(&self, direction: MoveDirection) -> bool {
        let (primary, alias) = direction.slots();
        self.down[primary] || self.down[alias]
    }

    pub fn release_all(&mut self) {
        self.down = [false; MOVEMENT_KEY_COUNT];
    }

    pub fn intent(&self) -> MoveIntent {
        let mut intent = MoveIntent::default();
        if self.is_down(MoveDirection::Forward) {
            intent.forward += 1;
        }
        if self.is_down(MoveDirection::Back) {
            intent.forward -= 1;
        }
        if self.is_down(MoveDirection::Right) {
            intent.strafe += 1;
        }
        if self.is_down(MoveDirection::Left) {
            intent.strafe -= 1;
        }
        intent
    }
}

impl MoveDirection {
    const fn slots(self) -> (usize, usize) {
        match self {
            MoveDirection::Forward => (0, 1),
            MoveDirection::Back => (2, 3),
            MoveDirection::Left => (4, 5),
            MoveDirection::Right => (6, 7),
        }
    }
}

pub fn direction_for_key(key: KeyCode) -> Option<MoveDirection> {
    match key {
        KeyCode::KeyW | KeyCode::ArrowUp => Some(MoveDirection::Forward),
        KeyCode::KeyS | KeyCode::ArrowDown => Some(MoveDirection::Back),
        KeyCode::KeyA | KeyCode::ArrowLeft => Some(MoveDirection::Left),
        KeyCode::KeyD | KeyCode::ArrowRight => Some(MoveDirection::Right),
        _ => None,
    }
}

fn key_slot(key: KeyCode) -> Option<usize> {
    let direction = direction_for_key(key)?;
    let (primary, alias) = direction.slots();
    let is_letter = matches!(
        key,
        KeyCode::KeyW | KeyCode::KeyS | KeyCode::KeyA | KeyCode::KeyD
    );
    Some(if is_letter { primary } else { alias })
}
