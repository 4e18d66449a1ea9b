//! # Command Definitions
//!
//! What the player asked for during one tick, independent of any device.

use serde::{Deserialize, Serialize};

/// Debug switches flipped this tick. Each `true` toggles the matching flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugToggles {
    pub god: bool,
    pub noclip: bool,
    pub fullbright: bool,
    pub debug: bool,
}

impl DebugToggles {
    pub fn any(&self) -> bool {
        self.god || self.noclip || self.fullbright || self.debug
    }
}

/// Current state of the debug switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugFlags {
    /// Player ignores bites
    pub god: bool,
    /// Player walks through walls
    pub noclip: bool,
    /// Renderer ignores the lightmap
    pub fullbright: bool,
    /// Renderer draws the debug overlay
    pub debug: bool,
}

impl DebugFlags {
    /// Flips every flag requested by `toggles`.
    ///
    /// # Examples
    ///
    /// ```
    /// use carotid::{DebugFlags, DebugToggles};
    ///
    /// let mut flags = DebugFlags::default();
    /// flags.apply(DebugToggles { god: true, ..DebugToggles::default() });
    /// assert!(flags.god);
    /// flags.apply(DebugToggles { god: true, ..DebugToggles::default() });
    /// assert!(!flags.god);
    /// ```
    pub fn apply(&mut self, toggles: DebugToggles) {
        self.god ^= toggles.god;
        self.noclip ^= toggles.noclip;
        self.fullbright ^= toggles.fullbright;
        self.debug ^= toggles.debug;
    }
}

/// Player intent for a single tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TickIntent {
    /// Horizontal direction, -1.0 to 1.0
    pub move_x: f64,
    /// Vertical direction, -1.0 to 1.0
    pub move_y: f64,
    /// Facing angle in radians
    pub angle: f64,
    pub fire: bool,
    pub toggles: DebugToggles,
}

impl TickIntent {
    /// An intent that does nothing but face `angle`.
    pub fn idle(angle: f64) -> Self {
        Self {
            angle,
            ..Self::default()
        }
    }

    /// Walks in the given direction.
    pub fn walk(move_x: f64, move_y: f64) -> Self {
        Self {
            move_x,
            move_y,
            ..Self::default()
        }
    }

    pub fn with_fire(mut self, angle: f64) -> Self {
        self.fire = true;
        self.angle = angle;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggles_flip_only_requested_flags() {
        let mut flags = DebugFlags {
            noclip: true,
            ..DebugFlags::default()
        };
        let toggles = DebugToggles {
            fullbright: true,
            noclip: true,
            ..DebugToggles::default()
        };
        assert!(toggles.any());

        flags.apply(toggles);
        assert!(!flags.noclip);
        assert!(flags.fullbright);
        assert!(!flags.god);

        flags.apply(DebugToggles::default());
        assert!(flags.fullbright);
    }

    #[test]
    fn test_intent_builders() {
        let intent = TickIntent::walk(1.0, 0.0).with_fire(0.5);
        assert!(intent.fire);
        assert_eq!(intent.move_x, 1.0);
        assert_eq!(intent.angle, 0.5);
        assert!(!TickIntent::idle(0.0).toggles.any());
    }
}
