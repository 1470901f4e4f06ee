//! DUT aggregate: the configuration-time ingestion surface owning the
//! register and pin collections.
//!
//! Definition happens in a single-threaded configuration phase; once
//! defined, the model is read-heavy and safe to share immutably.

use indexmap::IndexMap;

use crate::{
    AccessType, DefinitionError, Pattern, PatternAction, PatternBuilder, Pin, Register, UsageError,
};

/// A device-under-test model: named registers and pins plus pattern
/// production entry points.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Dut {
    name: String,
    registers: IndexMap<String, Register>,
    pins: IndexMap<String, Pin>,
}

impl Dut {
    /// Creates an empty DUT model.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            registers: IndexMap::new(),
            pins: IndexMap::new(),
        }
    }

    /// Returns the DUT name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Defines a new register.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::DuplicateRegister`] when the name is
    /// taken and propagates [`DefinitionError::InvalidSize`] from the
    /// register constructor.
    pub fn define_register(
        &mut self,
        name: &str,
        address: u64,
        size_bits: u32,
    ) -> Result<&mut Register, DefinitionError> {
        if self.registers.contains_key(name) {
            return Err(DefinitionError::DuplicateRegister {
                register: name.to_string(),
            });
        }
        let register = Register::new(name, address, size_bits)?;
        Ok(self.registers.entry(name.to_string()).or_insert(register))
    }

    /// Defines a new field on an already-defined register.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::UnknownRegister`] when the register
    /// does not exist and propagates every field-level
    /// [`DefinitionError`].
    pub fn define_field(
        &mut self,
        register: &str,
        name: &str,
        offset: u32,
        width: u32,
        access: AccessType,
        reset: u64,
    ) -> Result<(), DefinitionError> {
        let reg = self.registers.get_mut(register).ok_or_else(|| {
            DefinitionError::UnknownRegister {
                register: register.to_string(),
                field: name.to_string(),
            }
        })?;
        reg.define_field(name, offset, width, access, reset)?;
        Ok(())
    }

    /// Defines a new pin in the undriven state.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::DuplicatePin`] when the name is taken.
    pub fn define_pin(&mut self, name: &str) -> Result<&Pin, DefinitionError> {
        if self.pins.contains_key(name) {
            return Err(DefinitionError::DuplicatePin {
                pin: name.to_string(),
            });
        }
        Ok(self
            .pins
            .entry(name.to_string())
            .or_insert_with(|| Pin::new(name)))
    }

    /// Looks up a register by name.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::UnknownRegister`] when absent.
    pub fn register(&self, name: &str) -> Result<&Register, UsageError> {
        self.registers
            .get(name)
            .ok_or_else(|| UsageError::UnknownRegister {
                register: name.to_string(),
            })
    }

    /// Looks up a register by name for mutation.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::UnknownRegister`] when absent.
    pub fn register_mut(&mut self, name: &str) -> Result<&mut Register, UsageError> {
        self.registers
            .get_mut(name)
            .ok_or_else(|| UsageError::UnknownRegister {
                register: name.to_string(),
            })
    }

    /// Looks up a pin by name.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::UnknownPin`] when absent.
    pub fn pin(&self, name: &str) -> Result<&Pin, UsageError> {
        self.pins.get(name).ok_or_else(|| UsageError::UnknownPin {
            pin: name.to_string(),
        })
    }

    /// Iterates registers in declaration order.
    pub fn registers(&self) -> impl Iterator<Item = &Register> {
        self.registers.values()
    }

    /// Iterates pins in declaration order.
    pub fn pins(&self) -> impl Iterator<Item = &Pin> {
        self.pins.values()
    }

    /// Restores every register shadow to its cached reset value.
    pub fn reset_registers(&mut self) {
        for register in self.registers.values_mut() {
            register.reset();
        }
    }

    /// Starts producing a pattern against this DUT's pin set.
    #[must_use]
    pub fn produce_pattern(&self, name: &str) -> PatternBuilder<'_> {
        PatternBuilder::new(self, name)
    }

    /// Replays a finalized pattern against the live pin models.
    ///
    /// This is the only sanctioned pin mutation path: every state
    /// action is applied in record order and each pin is left in its
    /// terminal state. Returns the number of timeline cycles consumed.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::UnknownPin`] when the pattern references a
    /// pin this DUT does not define; no pin is mutated in that case.
    pub fn commit_pattern(&mut self, pattern: &Pattern) -> Result<u64, UsageError> {
        for pin in pattern.pins() {
            if !self.pins.contains_key(pin) {
                return Err(UsageError::UnknownPin { pin: pin.clone() });
            }
        }

        let mut cycles = 0u64;
        for action in pattern.actions() {
            match action {
                PatternAction::DrivePin { pin, level } => {
                    self.pins[pin].drive(*level);
                }
                PatternAction::ReleasePin { pin } => {
                    self.pins[pin].release();
                }
                PatternAction::RepeatCycles { .. } | PatternAction::Wait { .. } => {
                    cycles += u64::from(action.cycles());
                }
            }
        }
        Ok(cycles)
    }
}
