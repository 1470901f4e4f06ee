//! Lazy, restartable replay of finalized patterns.
//!
//! Replay walks the recorded action sequence in order, applying state
//! actions to a private pin-state snapshot and emitting one
//! [`CycleRecord`] per clock cycle. The snapshot always starts with
//! every referenced pin [`Undriven`](crate::PinState::Undriven), so
//! replaying the same pattern twice yields identical sequences.

use indexmap::IndexMap;

use crate::{Pattern, PatternAction, PinState};

/// Pin states observed during one clock cycle of a replay.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CycleRecord {
    /// Zero-based cycle index on the pattern timeline.
    pub cycle_index: u64,
    /// State of every referenced pin, in first-reference order.
    pub pin_states: IndexMap<String, PinState>,
}

/// Iterator over the cycle records of one pattern replay.
///
/// Obtained from [`Pattern::replay`]; finite and restartable.
#[derive(Debug)]
pub struct Replay<'a> {
    actions: &'a [PatternAction],
    action_index: usize,
    pending_cycles: u32,
    states: IndexMap<String, PinState>,
    cycle_index: u64,
}

impl<'a> Replay<'a> {
    pub(crate) fn new(pattern: &'a Pattern) -> Self {
        let states = pattern
            .pins()
            .iter()
            .map(|pin| (pin.clone(), PinState::Undriven))
            .collect();
        Self {
            actions: pattern.actions(),
            action_index: 0,
            pending_cycles: 0,
            states,
            cycle_index: 0,
        }
    }

    fn apply_state_action(&mut self, action: &PatternAction) {
        match action {
            PatternAction::DrivePin { pin, level } => {
                self.states.insert(pin.clone(), PinState::Drive(*level));
            }
            PatternAction::ReleasePin { pin } => {
                self.states.insert(pin.clone(), PinState::HighZ);
            }
            PatternAction::RepeatCycles { .. } | PatternAction::Wait { .. } => {}
        }
    }
}

impl Iterator for Replay<'_> {
    type Item = CycleRecord;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pending_cycles == 0 {
            let action = self.actions.get(self.action_index)?;
            self.action_index += 1;
            self.apply_state_action(action);
            self.pending_cycles = action.cycles();
        }

        self.pending_cycles -= 1;
        let record = CycleRecord {
            cycle_index: self.cycle_index,
            pin_states: self.states.clone(),
        };
        self.cycle_index += 1;
        Some(record)
    }
}
