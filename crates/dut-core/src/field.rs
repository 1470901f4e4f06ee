//! Bit-field layout descriptors used by register definitions.
//!
//! A field is a named, LSB0-positioned slice of a register's bits with
//! an access policy and a reset value. Descriptors are immutable once
//! constructed; the owning register performs bounds and overlap checks
//! at definition time.

use core::str::FromStr;

use crate::DefinitionError;

/// Widest supported field/register value domain in bits.
pub const MAX_VALUE_BITS: u32 = 64;

/// Access policy for a bit field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum AccessType {
    /// Field is readable and writable.
    #[default]
    ReadWrite,
    /// Field is readable only; writes through the model are still
    /// recorded in the shadow, hardware behavior is the DUT's concern.
    ReadOnly,
    /// Field is writable only.
    WriteOnly,
}

impl AccessType {
    /// Returns the conventional short mnemonic (`rw`/`ro`/`wo`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ReadWrite => "rw",
            Self::ReadOnly => "ro",
            Self::WriteOnly => "wo",
        }
    }
}

impl FromStr for AccessType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rw" => Ok(Self::ReadWrite),
            "ro" => Ok(Self::ReadOnly),
            "wo" => Ok(Self::WriteOnly),
            other => Err(format!("unknown access type `{other}`")),
        }
    }
}

/// An immutable named bit range within a register.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Field {
    name: String,
    offset: u32,
    width: u32,
    access: AccessType,
    reset: u64,
}

impl Field {
    /// Creates a field descriptor.
    ///
    /// Bounds relative to the owning register are checked by the
    /// register at definition time; this constructor only rejects
    /// ranges that can never be valid.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::InvalidRange`] for a zero-width range
    /// or one wider than the supported value domain, and
    /// [`DefinitionError::ResetOverflow`] when `reset` does not fit in
    /// `width` bits.
    pub fn new(
        name: &str,
        offset: u32,
        width: u32,
        access: AccessType,
        reset: u64,
    ) -> Result<Self, DefinitionError> {
        if width == 0 || offset >= MAX_VALUE_BITS || width > MAX_VALUE_BITS - offset {
            return Err(DefinitionError::InvalidRange {
                field: name.to_string(),
                offset,
                width,
            });
        }
        if reset & !width_mask(width) != 0 {
            return Err(DefinitionError::ResetOverflow {
                field: name.to_string(),
                reset,
                width,
            });
        }
        Ok(Self {
            name: name.to_string(),
            offset,
            width,
            access,
            reset,
        })
    }

    /// Creates a single-bit read-write field with reset 0.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::InvalidRange`] when `bit` is outside
    /// the supported value domain.
    pub fn bit(name: &str, bit: u32) -> Result<Self, DefinitionError> {
        Self::new(name, bit, 1, AccessType::ReadWrite, 0)
    }

    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the LSB0 bit offset.
    #[must_use]
    pub const fn offset(&self) -> u32 {
        self.offset
    }

    /// Returns the width in bits.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Returns the most significant bit position occupied by the field.
    #[must_use]
    pub const fn msb(&self) -> u32 {
        self.offset + self.width - 1
    }

    /// Returns the access policy.
    #[must_use]
    pub const fn access(&self) -> AccessType {
        self.access
    }

    /// Returns the reset value (unshifted, field-relative).
    #[must_use]
    pub const fn reset(&self) -> u64 {
        self.reset
    }

    /// Returns the field mask shifted into register position.
    #[must_use]
    pub const fn mask(&self) -> u64 {
        width_mask(self.width) << self.offset
    }

    /// Returns `true` when `value` fits in the field width.
    #[must_use]
    pub const fn accepts(&self, value: u64) -> bool {
        value & !width_mask(self.width) == 0
    }

    /// Extracts this field's bits from a full register value.
    #[must_use]
    pub const fn extract(&self, register_value: u64) -> u64 {
        (register_value >> self.offset) & width_mask(self.width)
    }

    /// Clears this field's bits in `register_value` and ORs in `value`.
    ///
    /// `value` must already fit the field width; callers validate with
    /// [`Field::accepts`] before merging.
    #[must_use]
    pub const fn merge(&self, register_value: u64, value: u64) -> u64 {
        (register_value & !self.mask()) | ((value & width_mask(self.width)) << self.offset)
    }

    /// Returns `true` when this field shares at least one bit with the
    /// `offset`/`width` range.
    #[must_use]
    pub const fn intersects(&self, offset: u32, width: u32) -> bool {
        width != 0 && self.offset <= offset + width - 1 && offset <= self.msb()
    }
}

/// Returns the unshifted mask for a `width`-bit value.
#[must_use]
pub const fn width_mask(width: u32) -> u64 {
    if width >= MAX_VALUE_BITS {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

#[cfg(test)]
mod tests {
    use core::str::FromStr;

    use super::{width_mask, AccessType, Field};
    use crate::DefinitionError;

    #[test]
    fn width_mask_covers_the_full_value_domain() {
        assert_eq!(width_mask(1), 0x1);
        assert_eq!(width_mask(5), 0x1F);
        assert_eq!(width_mask(16), 0xFFFF);
        assert_eq!(width_mask(64), u64::MAX);
    }

    #[test]
    fn zero_width_ranges_are_rejected() {
        assert_eq!(
            Field::new("empty", 3, 0, AccessType::ReadWrite, 0),
            Err(DefinitionError::InvalidRange {
                field: "empty".to_string(),
                offset: 3,
                width: 0,
            })
        );
    }

    #[test]
    fn reset_values_must_fit_the_field_width() {
        assert_eq!(
            Field::new("adch", 0, 5, AccessType::ReadWrite, 0x20),
            Err(DefinitionError::ResetOverflow {
                field: "adch".to_string(),
                reset: 0x20,
                width: 5,
            })
        );
        assert!(Field::new("adch", 0, 5, AccessType::ReadWrite, 0x1F).is_ok());
    }

    #[test]
    fn extract_and_merge_are_inverse_on_the_field_bits() {
        let field = Field::new("adch", 0, 5, AccessType::ReadWrite, 0x1F).expect("valid field");
        let merged = field.merge(0x00E0, 0x0A);
        assert_eq!(merged, 0x00EA);
        assert_eq!(field.extract(merged), 0x0A);
    }

    #[test]
    fn merge_does_not_disturb_unrelated_bits() {
        let field = Field::new("aien", 6, 1, AccessType::ReadWrite, 0).expect("valid field");
        assert_eq!(field.merge(0x00FF, 0), 0x00BF);
        assert_eq!(field.merge(0x0000, 1), 0x0040);
    }

    #[test]
    fn intersection_matches_interval_arithmetic() {
        let field = Field::new("adch", 0, 5, AccessType::ReadWrite, 0).expect("valid field");
        assert!(field.intersects(4, 1));
        assert!(field.intersects(0, 8));
        assert!(!field.intersects(5, 3));
        assert!(!field.intersects(5, 0));
    }

    #[test]
    fn access_type_mnemonics_roundtrip() {
        for access in [
            AccessType::ReadWrite,
            AccessType::ReadOnly,
            AccessType::WriteOnly,
        ] {
            assert_eq!(AccessType::from_str(access.as_str()), Ok(access));
        }
        assert!(AccessType::from_str("rx").is_err());
    }

    #[test]
    fn single_bit_helper_defaults_to_read_write_reset_zero() {
        let field = Field::bit("coco", 7).expect("valid field");
        assert_eq!(field.offset(), 7);
        assert_eq!(field.width(), 1);
        assert_eq!(field.msb(), 7);
        assert_eq!(field.access(), AccessType::ReadWrite);
        assert_eq!(field.reset(), 0);
        assert_eq!(field.mask(), 0x80);
    }
}
