//! Pattern timeline engine: recording and finalizing pin-level
//! stimulus sequences.
//!
//! Production follows `Idle -> Producing -> Finalized`: obtaining a
//! [`PatternBuilder`] starts production, and consuming it through
//! [`PatternBuilder::finalize`] is the only way to obtain a [`Pattern`].
//! A builder dropped without finalizing discards the in-progress
//! sequence; a finalized pattern is immutable and replayable any number
//! of times.

/// Lazy replay of finalized patterns.
pub mod replay;
pub use replay::{CycleRecord, Replay};

use crate::{Dut, Level, UsageError};

/// One recorded stimulus action on the pattern timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum PatternAction {
    /// Drive a pin to a binary level from the next cycle onward.
    DrivePin {
        /// Target pin name.
        pin: String,
        /// Level to drive.
        level: Level,
    },
    /// Release a pin to high impedance from the next cycle onward.
    ReleasePin {
        /// Target pin name.
        pin: String,
    },
    /// Hold the current driven states for `count` clock cycles.
    RepeatCycles {
        /// Number of cycles; zero is recorded but emits nothing.
        count: u32,
    },
    /// Idle for `cycles` clock cycles without state changes.
    Wait {
        /// Number of cycles; zero is recorded but emits nothing.
        cycles: u32,
    },
}

impl PatternAction {
    /// Returns the number of timeline cycles this action emits.
    #[must_use]
    pub const fn cycles(&self) -> u32 {
        match self {
            Self::DrivePin { .. } | Self::ReleasePin { .. } => 0,
            Self::RepeatCycles { count } => *count,
            Self::Wait { cycles } => *cycles,
        }
    }
}

/// In-progress pattern production handle.
///
/// Records actions against the owning DUT's pin set; pin state is never
/// mutated at record time. Consume with [`PatternBuilder::finalize`].
#[derive(Debug)]
pub struct PatternBuilder<'a> {
    dut: &'a Dut,
    name: String,
    actions: Vec<PatternAction>,
    pins: Vec<String>,
}

impl<'a> PatternBuilder<'a> {
    pub(crate) fn new(dut: &'a Dut, name: &str) -> Self {
        Self {
            dut,
            name: name.to_string(),
            actions: Vec::new(),
            pins: Vec::new(),
        }
    }

    fn reference_pin(&mut self, pin: &str) -> Result<(), UsageError> {
        if self.dut.pin(pin).is_err() {
            return Err(UsageError::UnknownPin {
                pin: pin.to_string(),
            });
        }
        if !self.pins.iter().any(|known| known == pin) {
            self.pins.push(pin.to_string());
        }
        Ok(())
    }

    /// Records driving `pin` to a raw `0`/`1` level.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::UnknownPin`] for pins the DUT does not
    /// define and [`UsageError::InvalidLevel`] for non-binary levels.
    pub fn drive(&mut self, pin: &str, level: u8) -> Result<(), UsageError> {
        let level = Level::from_u8(level)?;
        self.reference_pin(pin)?;
        self.actions.push(PatternAction::DrivePin {
            pin: pin.to_string(),
            level,
        });
        Ok(())
    }

    /// Records releasing `pin` to high impedance.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::UnknownPin`] for pins the DUT does not
    /// define.
    pub fn release(&mut self, pin: &str) -> Result<(), UsageError> {
        self.reference_pin(pin)?;
        self.actions.push(PatternAction::ReleasePin {
            pin: pin.to_string(),
        });
        Ok(())
    }

    /// Records holding the current driven states for `count` cycles.
    pub fn repeat(&mut self, count: u32) {
        self.actions.push(PatternAction::RepeatCycles { count });
    }

    /// Records idling for `cycles` cycles.
    pub fn wait(&mut self, cycles: u32) {
        self.actions.push(PatternAction::Wait { cycles });
    }

    /// Returns the number of actions recorded so far.
    #[must_use]
    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    /// Finalizes production, consuming the builder.
    ///
    /// Finalize is unconditional: an empty action sequence yields an
    /// empty (legal) pattern.
    #[must_use]
    pub fn finalize(self) -> Pattern {
        Pattern {
            name: self.name,
            actions: self.actions,
            pins: self.pins,
        }
    }
}

/// A finalized, immutable, replayable stimulus sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Pattern {
    name: String,
    actions: Vec<PatternAction>,
    pins: Vec<String>,
}

impl Pattern {
    /// Returns the pattern name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the recorded action sequence in record order.
    #[must_use]
    pub fn actions(&self) -> &[PatternAction] {
        &self.actions
    }

    /// Returns the referenced pin names in first-reference order.
    #[must_use]
    pub fn pins(&self) -> &[String] {
        &self.pins
    }

    /// Returns the total number of cycles a replay will emit.
    #[must_use]
    pub fn cycle_count(&self) -> u64 {
        self.actions
            .iter()
            .map(|action| u64::from(action.cycles()))
            .sum()
    }

    /// Starts a fresh replay from the beginning of the timeline.
    ///
    /// Replays are lazy and restartable; calling this again always
    /// yields the identical cycle sequence.
    #[must_use]
    pub fn replay(&self) -> Replay<'_> {
        Replay::new(self)
    }
}
