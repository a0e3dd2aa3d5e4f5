//! Racer Intents
//!
//! The only input surface the simulation sees. Device polling and key
//! mapping stay outside; they report levels to an [`IntentTracker`], which
//! derives the per-tick edges.

/// Input intents for one simulation tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RacerIntents {
    pub turn_left: bool,
    pub turn_right: bool,
    pub move_forward: bool,
    pub move_backward: bool,
    /// Jump went down this tick
    pub jump_pressed: bool,
    /// Jump is down
    pub jump_held: bool,
    /// Jump went up this tick
    pub jump_released: bool,
}

impl RacerIntents {
    /// Steering direction: +1 left, -1 right, 0 when both or neither.
    pub fn turn_axis(&self) -> f32 {
        match (self.turn_left, self.turn_right) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        }
    }

    /// Throttle direction: +1 forward, -1 backward, 0 when both or neither.
    pub fn drive_axis(&self) -> f32 {
        match (self.move_forward, self.move_backward) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        }
    }
}

/// Level state of the racer controls as last reported by the input layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlLevels {
    pub left: bool,
    pub right: bool,
    pub forward: bool,
    pub backward: bool,
    pub jump: bool,
}

/// Turns level input into [`RacerIntents`] with jump edges.
///
/// Levels may be reported any number of times between ticks. An edge is
/// emitted once, on the next [`IntentTracker::tick`] after it happened, so a
/// tap shorter than one tick still arms a jump.
#[derive(Debug, Clone, Default)]
pub struct IntentTracker {
    levels: ControlLevels,
    pending_press: bool,
    pending_release: bool,
}

impl IntentTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current control levels.
    pub fn set_levels(&mut self, levels: ControlLevels) {
        if levels.jump && !self.levels.jump {
            self.pending_press = true;
        }
        if !levels.jump && self.levels.jump {
            self.pending_release = true;
        }
        self.levels = levels;
    }

    pub fn levels(&self) -> ControlLevels {
        self.levels
    }

    /// Intents for the next tick; clears the pending edges.
    pub fn tick(&mut self) -> RacerIntents {
        let intents = RacerIntents {
            turn_left: self.levels.left,
            turn_right: self.levels.right,
            move_forward: self.levels.forward,
            move_backward: self.levels.backward,
            jump_pressed: self.pending_press,
            jump_held: self.levels.jump,
            // A press and release inside one tick reports both edges
            jump_released: self.pending_release,
        };

        self.pending_press = false;
        self.pending_release = false;
        intents
    }
}
