//! Joypad state and the JOYP (0xFF00) projection.

/// Current pressed-or-not state of the eight buttons, as reported by the
/// host. Edge detection happens here, not in the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JoypadState {
    pub right: bool,
    pub left: bool,
    pub up: bool,
    pub down: bool,
    pub a: bool,
    pub b: bool,
    pub select: bool,
    pub start: bool,
}

// JOYP select bits, active-low (0 = group selected).
const DPAD_SELECT: u8 = 1 << 4;
const BUTTONS_SELECT: u8 = 1 << 5;

/// Owns the button state and the game-written selector bits, and projects
/// both into the JOYP register layout.
#[derive(Clone, Debug)]
pub struct Joypad {
    state: JoypadState,
    select: u8, // bits 4-5 as last written by the game
    prev_lines: u8, // low nibble from the previous edge poll
}

impl Joypad {
    pub fn new() -> Self {
        Joypad {
            state: JoypadState::default(),
            select: DPAD_SELECT | BUTTONS_SELECT, // neither group selected
            prev_lines: 0x0F,
        }
    }

    /// Replaces the button state with the host's current snapshot.
    pub fn set_state(&mut self, state: JoypadState) {
        self.state = state;
    }

    pub fn state(&self) -> JoypadState {
        self.state
    }

    /// The JOYP low nibble: selected groups pull their lines low.
    /// With both groups selected the pressed bits combine (active-low AND).
    fn lines(&self) -> u8 {
        let mut lines = 0x0F;

        if self.select & DPAD_SELECT == 0 {
            if self.state.right {
                lines &= !0x01;
            }
            if self.state.left {
                lines &= !0x02;
            }
            if self.state.up {
                lines &= !0x04;
            }
            if self.state.down {
                lines &= !0x08;
            }
        }
        if self.select & BUTTONS_SELECT == 0 {
            if self.state.a {
                lines &= !0x01;
            }
            if self.state.b {
                lines &= !0x02;
            }
            if self.state.select {
                lines &= !0x04;
            }
            if self.state.start {
                lines &= !0x08;
            }
        }

        lines
    }

    /// Read of 0xFF00. Unused high bits read 1.
    pub fn read(&self) -> u8 {
        self.lines() | self.select | 0xC0
    }

    /// Write to 0xFF00; only the selector bits 4-5 are writable.
    pub fn write(&mut self, value: u8) {
        self.select = value & (DPAD_SELECT | BUTTONS_SELECT);
    }

    /// Re-projects the lines and reports whether any selected line fell
    /// 1 -> 0 (unpressed to pressed) since the previous poll.
    pub fn poll_edges(&mut self) -> bool {
        let lines = self.lines();
        let edge = self.prev_lines & !lines & 0x0F != 0;
        self.prev_lines = lines;
        edge
    }
}

impl Default for Joypad {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unselected_groups_read_released() {
        let mut joypad = Joypad::new();
        joypad.set_state(JoypadState {
            start: true,
            ..Default::default()
        });
        // Neither group selected: low nibble stays high.
        assert_eq!(joypad.read() & 0x0F, 0x0F);
    }

    #[test]
    fn buttons_group_projection() {
        let mut joypad = Joypad::new();
        joypad.write(!BUTTONS_SELECT); // select action buttons
        joypad.set_state(JoypadState {
            a: true,
            start: true,
            ..Default::default()
        });
        assert_eq!(joypad.read() & 0x0F, 0b0110); // bits 0 (A) and 3 (start) low
    }

    #[test]
    fn both_groups_combine_active_low() {
        let mut joypad = Joypad::new();
        joypad.write(0x00);
        joypad.set_state(JoypadState {
            right: true,
            start: true,
            ..Default::default()
        });
        assert_eq!(joypad.read() & 0x0F, 0b0110);
    }

    #[test]
    fn edges_fire_once_per_press() {
        let mut joypad = Joypad::new();
        joypad.write(!BUTTONS_SELECT);
        assert!(!joypad.poll_edges());

        joypad.set_state(JoypadState {
            b: true,
            ..Default::default()
        });
        assert!(joypad.poll_edges());
        assert!(!joypad.poll_edges()); // held, no new edge

        joypad.set_state(JoypadState::default());
        assert!(!joypad.poll_edges()); // release is not an edge
    }

    #[test]
    fn only_selector_bits_are_writable() {
        let mut joypad = Joypad::new();
        joypad.write(0xFF);
        assert_eq!(joypad.read(), 0xFF);
        joypad.write(0x0F);
        assert_eq!(joypad.read() & 0x30, 0x00);
    }
}
