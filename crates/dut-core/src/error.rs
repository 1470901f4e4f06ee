//! Definition and usage error taxonomy for the DUT model layer.
//!
//! Definition errors are fatal to the definition call that raised them
//! and leave previously defined model objects intact. Usage errors are
//! local to the read/write/verify call that raised them and leave the
//! register shadow unchanged.

use thiserror::Error;

/// Errors raised while defining registers, fields, and pins.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    /// A new field's bit range intersects an existing field's range.
    #[error("field `{field_a}` overlaps field `{field_b}` on bits {overlap_lsb}..={overlap_msb}")]
    Overlap {
        /// Name of the field being defined.
        field_a: String,
        /// Name of the already-defined field it collides with.
        field_b: String,
        /// Lowest shared bit position.
        overlap_lsb: u32,
        /// Highest shared bit position.
        overlap_msb: u32,
    },
    /// A field bit range is zero-width or extends beyond the register.
    #[error("field `{field}` has an empty or out-of-bounds bit range (offset {offset}, width {width})")]
    InvalidRange {
        /// Name of the rejected field.
        field: String,
        /// Declared LSB0 bit offset.
        offset: u32,
        /// Declared width in bits.
        width: u32,
    },
    /// A field reset value does not fit the field width.
    #[error("reset value {reset:#x} of field `{field}` does not fit in {width} bits")]
    ResetOverflow {
        /// Name of the rejected field.
        field: String,
        /// Declared reset value.
        reset: u64,
        /// Declared width in bits.
        width: u32,
    },
    /// A field name is already defined on the owning register.
    #[error("field `{field}` is already defined on register `{register}`")]
    DuplicateField {
        /// Owning register name.
        register: String,
        /// Colliding field name.
        field: String,
    },
    /// A register name is already defined on the DUT.
    #[error("register `{register}` is already defined")]
    DuplicateRegister {
        /// Colliding register name.
        register: String,
    },
    /// A pin name is already defined on the DUT.
    #[error("pin `{pin}` is already defined")]
    DuplicatePin {
        /// Colliding pin name.
        pin: String,
    },
    /// A register size is outside the supported value domain.
    #[error("register `{register}` size of {size_bits} bits is outside 1..=64")]
    InvalidSize {
        /// Name of the rejected register.
        register: String,
        /// Declared size in bits.
        size_bits: u32,
    },
    /// A field definition targeted a register the DUT does not know.
    #[error("cannot define field `{field}` on unknown register `{register}`")]
    UnknownRegister {
        /// Requested register name.
        register: String,
        /// Field that was being defined.
        field: String,
    },
}

/// Errors raised by read/write/verify operations against defined models.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    /// A field name is not present on the targeted register.
    #[error("register `{register}` has no field named `{field}`")]
    UnknownField {
        /// Targeted register name.
        register: String,
        /// Requested field name.
        field: String,
    },
    /// A field value exceeds the field width.
    #[error("value {value:#x} does not fit in the {width}-bit field `{field}` of register `{register}`")]
    ValueOverflow {
        /// Targeted register name.
        register: String,
        /// Targeted field name.
        field: String,
        /// Rejected value.
        value: u64,
        /// Field width in bits.
        width: u32,
    },
    /// A register name is not present on the DUT.
    #[error("unknown register `{register}`")]
    UnknownRegister {
        /// Requested register name.
        register: String,
    },
    /// A pin name is not present on the DUT.
    #[error("unknown pin `{pin}`")]
    UnknownPin {
        /// Requested pin name.
        pin: String,
    },
    /// A drive level is not a legal binary signal value.
    #[error("drive level {level} is not a legal signal value (expected 0 or 1)")]
    InvalidLevel {
        /// Rejected level.
        level: u8,
    },
}

#[cfg(test)]
mod tests {
    use super::{DefinitionError, UsageError};

    #[test]
    fn overlap_message_names_both_fields_and_the_shared_bits() {
        let err = DefinitionError::Overlap {
            field_a: "aien".to_string(),
            field_b: "coco".to_string(),
            overlap_lsb: 6,
            overlap_msb: 7,
        };
        assert_eq!(
            err.to_string(),
            "field `aien` overlaps field `coco` on bits 6..=7"
        );
    }

    #[test]
    fn value_overflow_message_names_field_width_and_value() {
        let err = UsageError::ValueOverflow {
            register: "reg2".to_string(),
            field: "adch".to_string(),
            value: 0x20,
            width: 5,
        };
        assert_eq!(
            err.to_string(),
            "value 0x20 does not fit in the 5-bit field `adch` of register `reg2`"
        );
    }

    #[test]
    fn definition_errors_are_value_comparable() {
        let a = DefinitionError::DuplicatePin {
            pin: "clk".to_string(),
        };
        let b = DefinitionError::DuplicatePin {
            pin: "clk".to_string(),
        };
        assert_eq!(a, b);
    }
}
