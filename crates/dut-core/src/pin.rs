//! Pin model: named signal lines with a current driven level.
//!
//! Pin state is only mutated by committing a finalized pattern; see
//! [`crate::Dut::commit_pattern`].

use core::fmt;

use crate::UsageError;

/// Binary drive level for a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Level {
    /// Logic low.
    Low,
    /// Logic high.
    High,
}

impl Level {
    /// Decodes a raw `0`/`1` signal value.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::InvalidLevel`] for any other value.
    pub const fn from_u8(level: u8) -> Result<Self, UsageError> {
        match level {
            0 => Ok(Self::Low),
            1 => Ok(Self::High),
            other => Err(UsageError::InvalidLevel { level: other }),
        }
    }

    /// Returns the raw signal value (`0` or `1`).
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Low => 0,
            Self::High => 1,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// Current state of a signal line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum PinState {
    /// Actively driven to a binary level.
    Drive(Level),
    /// Released to high impedance.
    HighZ,
    /// Never driven since configuration.
    #[default]
    Undriven,
}

impl PinState {
    /// Returns the single-character tester symbol for this state
    /// (`1`/`0` driven, `Z` high impedance, `X` undriven).
    #[must_use]
    pub const fn as_tester_char(self) -> char {
        match self {
            Self::Drive(Level::High) => '1',
            Self::Drive(Level::Low) => '0',
            Self::HighZ => 'Z',
            Self::Undriven => 'X',
        }
    }
}

/// A named signal line on the DUT.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Pin {
    name: String,
    state: PinState,
}

impl Pin {
    /// Creates a pin in the [`PinState::Undriven`] state.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            state: PinState::Undriven,
        }
    }

    /// Returns the pin name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Drives the pin to a binary level.
    pub const fn drive(&mut self, level: Level) {
        self.state = PinState::Drive(level);
    }

    /// Releases the pin to high impedance.
    pub const fn release(&mut self) {
        self.state = PinState::HighZ;
    }

    /// Samples the current pin state.
    #[must_use]
    pub const fn sample(&self) -> PinState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::{Level, Pin, PinState};
    use crate::UsageError;

    #[test]
    fn levels_decode_only_binary_signal_values() {
        assert_eq!(Level::from_u8(0), Ok(Level::Low));
        assert_eq!(Level::from_u8(1), Ok(Level::High));
        assert_eq!(
            Level::from_u8(2),
            Err(UsageError::InvalidLevel { level: 2 })
        );
    }

    #[test]
    fn pins_start_undriven_and_track_drive_and_release() {
        let mut pin = Pin::new("clk");
        assert_eq!(pin.sample(), PinState::Undriven);

        pin.drive(Level::High);
        assert_eq!(pin.sample(), PinState::Drive(Level::High));

        pin.release();
        assert_eq!(pin.sample(), PinState::HighZ);

        pin.drive(Level::Low);
        assert_eq!(pin.sample(), PinState::Drive(Level::Low));
    }

    #[test]
    fn tester_symbols_cover_every_state() {
        assert_eq!(PinState::Drive(Level::High).as_tester_char(), '1');
        assert_eq!(PinState::Drive(Level::Low).as_tester_char(), '0');
        assert_eq!(PinState::HighZ.as_tester_char(), 'Z');
        assert_eq!(PinState::Undriven.as_tester_char(), 'X');
    }
}
