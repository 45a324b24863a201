//! Operating mode and the mode-select button.
//!
//! The debugger runs either the interactive shell or the Lawicel bridge.
//! Holding the mode button enters a selection phase where short presses
//! toggle the candidate mode; after a quiet period the candidate is
//! committed to [`CONFIG`](crate::config::CONFIG).
//!
//! [`ModeSelector::tick`] is driven from a 10 ms timer, outside the poll
//! loop. It only communicates through the atomic mode in the config.

use crate::config::DebuggerConfig;

/// Ticks the button must be held to enter selection (1.5 s).
pub const HOLD_TICKS: u16 = 150;

/// Debounce ticks for a toggle press during selection.
pub const PRESS_TICKS: u16 = 10;

/// Idle ticks after which the candidate is committed (4 s).
pub const COMMIT_TICKS: u16 = 400;

/// LED blink half-period during selection.
pub const BLINK_TICKS: u8 = 10;

/// Which engine the poll loop drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum OperatingMode {
    /// Interactive command shell.
    Shell = 0,
    /// Lawicel ASCII bridge.
    Bridge = 1,
    /// Neither engine runs.
    Unknown = 2,
}

impl OperatingMode {
    /// Convert from raw u8 value.
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => OperatingMode::Shell,
            1 => OperatingMode::Bridge,
            _ => OperatingMode::Unknown,
        }
    }

    fn toggled(self) -> Self {
        match self {
            OperatingMode::Shell => OperatingMode::Bridge,
            _ => OperatingMode::Shell,
        }
    }
}

/// Colour of a two-colour LED.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Duo {
    Off,
    Green,
    Red,
}

/// Mode indicator LEDs. LED 1 marks the bridge, LED 2 the shell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LedState {
    pub duo1: Duo,
    pub duo2: Duo,
}

impl LedState {
    pub const OFF: LedState = LedState { duo1: Duo::Off, duo2: Duo::Off };

    /// Steady indication of a mode.
    pub fn for_mode(mode: OperatingMode) -> Self {
        match mode {
            OperatingMode::Shell => LedState { duo1: Duo::Off, duo2: Duo::Green },
            OperatingMode::Bridge => LedState { duo1: Duo::Green, duo2: Duo::Off },
            OperatingMode::Unknown => LedState::OFF,
        }
    }

    fn blink(mode: OperatingMode, lit: bool) -> Self {
        let colour = if lit { Duo::Green } else { Duo::Off };
        match mode {
            OperatingMode::Shell => LedState { duo1: Duo::Off, duo2: colour },
            _ => LedState { duo1: colour, duo2: Duo::Off },
        }
    }
}

/// Mode-select button state machine.
pub struct ModeSelector {
    selecting: bool,
    /// Button hold/debounce counter
    switch_counter: u16,
    /// Press already counted, waiting for release
    pressed: bool,
    candidate: OperatingMode,
    return_counter: u16,
    led_counter: u8,
    led_lit: bool,
}

impl ModeSelector {
    pub const fn new() -> Self {
        Self {
            selecting: false,
            switch_counter: 0,
            pressed: false,
            candidate: OperatingMode::Unknown,
            return_counter: 0,
            led_counter: 0,
            led_lit: true,
        }
    }

    /// True while the selection phase is running.
    #[inline]
    pub fn is_selecting(&self) -> bool {
        self.selecting
    }

    /// Mode currently offered during selection.
    #[inline]
    pub fn candidate(&self) -> OperatingMode {
        self.candidate
    }

    /// Advance one 10 ms tick.
    ///
    /// # Arguments
    /// * `button_down` - debounced-raw button level, true when pressed
    /// * `config` - receives the committed mode
    ///
    /// Returns the new LED state when the indication changes.
    pub fn tick(&mut self, button_down: bool, config: &DebuggerConfig) -> Option<LedState> {
        if !self.selecting {
            if button_down {
                self.switch_counter += 1;
                if self.switch_counter >= HOLD_TICKS {
                    self.switch_counter = 0;
                    self.selecting = true;
                    self.candidate = config.mode();
                    self.pressed = true;
                }
            } else {
                self.switch_counter = 0;
                self.pressed = false;
            }
            return None;
        }

        if button_down {
            if !self.pressed {
                self.switch_counter += 1;
            }
        } else {
            self.switch_counter = 0;
            self.pressed = false;
        }

        if self.switch_counter > PRESS_TICKS {
            self.switch_counter = 0;
            self.pressed = true;
            self.return_counter = 0;
            self.candidate = self.candidate.toggled();
        }

        self.return_counter += 1;
        if self.return_counter > COMMIT_TICKS {
            self.return_counter = 0;
            self.selecting = false;
            self.switch_counter = 0;
            config.set_mode(self.candidate);
            return Some(LedState::for_mode(self.candidate));
        }

        self.led_counter += 1;
        if self.led_counter > BLINK_TICKS {
            self.led_counter = 0;
            let leds = LedState::blink(self.candidate, !self.led_lit);
            self.led_lit = !self.led_lit;
            return Some(leds);
        }

        None
    }
}

impl Default for ModeSelector {
    fn default() -> Self {
        Self::new()
    }
}
