//! Register model: an addressed, ordered collection of bit fields with
//! shadow read/write/verify semantics.
//!
//! The register *model* (name, address, size, fields) is immutable once
//! definition finishes; the only mutable state is the shadow value, the
//! in-memory last-known value of the hardware register. Nothing in this
//! module talks to a transport; live access is the controller's job.

use core::fmt;

use indexmap::IndexMap;

use crate::field::width_mask;
use crate::{AccessType, DefinitionError, Field, UsageError};

/// Payload accepted by register write and verify operations.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ValueSpec {
    /// A full-width register value, masked to the register size.
    Whole(u64),
    /// An ordered field-name to field-value map.
    Fields(IndexMap<String, u64>),
}

impl ValueSpec {
    /// Builds a field-map spec from `(name, value)` pairs, preserving
    /// the given order.
    #[must_use]
    pub fn fields<'a>(entries: impl IntoIterator<Item = (&'a str, u64)>) -> Self {
        Self::Fields(
            entries
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        )
    }
}

/// One field-level discrepancy found by a verify operation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct FieldMismatch {
    /// Name of the discrepant field.
    pub field: String,
    /// Field-relative expected value.
    pub expected: u64,
    /// Field-relative actual value.
    pub actual: u64,
}

impl fmt::Display for FieldMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "field `{}`: expected {:#x}, actual {:#x}",
            self.field, self.expected, self.actual
        )
    }
}

/// Accumulated outcome of a verify operation.
///
/// Completing with mismatches is a normal, reportable outcome, not an
/// error; every discrepant field is collected before the report is
/// returned.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct VerifyReport {
    /// Field-level discrepancies in field declaration order.
    pub mismatches: Vec<FieldMismatch>,
}

impl VerifyReport {
    /// Returns `true` when no field differed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// An addressed register with an ordered set of bit fields and a shadow
/// value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Register {
    name: String,
    address: u64,
    size_bits: u32,
    fields: IndexMap<String, Field>,
    reset_value: u64,
    shadow: u64,
}

impl Register {
    /// Creates an empty register model with a zeroed shadow.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::InvalidSize`] when `size_bits` is
    /// outside `1..=64`.
    pub fn new(name: &str, address: u64, size_bits: u32) -> Result<Self, DefinitionError> {
        if size_bits == 0 || size_bits > crate::field::MAX_VALUE_BITS {
            return Err(DefinitionError::InvalidSize {
                register: name.to_string(),
                size_bits,
            });
        }
        Ok(Self {
            name: name.to_string(),
            address,
            size_bits,
            fields: IndexMap::new(),
            reset_value: 0,
            shadow: 0,
        })
    }

    /// Defines a new field on this register.
    ///
    /// The field's reset value is folded into the cached register reset
    /// value and into the shadow, so that a fully defined register reads
    /// back its reset state before the first write.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::DuplicateField`] when the name is
    /// taken, [`DefinitionError::InvalidRange`] when the range leaves
    /// `[0, size_bits)`, and [`DefinitionError::Overlap`] when the range
    /// shares bits with an existing field. A failed definition leaves
    /// previously defined fields intact.
    pub fn add_field(&mut self, field: Field) -> Result<&Field, DefinitionError> {
        if self.fields.contains_key(field.name()) {
            return Err(DefinitionError::DuplicateField {
                register: self.name.clone(),
                field: field.name().to_string(),
            });
        }
        if field.msb() >= self.size_bits {
            return Err(DefinitionError::InvalidRange {
                field: field.name().to_string(),
                offset: field.offset(),
                width: field.width(),
            });
        }
        for existing in self.fields.values() {
            if existing.intersects(field.offset(), field.width()) {
                return Err(DefinitionError::Overlap {
                    field_a: field.name().to_string(),
                    field_b: existing.name().to_string(),
                    overlap_lsb: existing.offset().max(field.offset()),
                    overlap_msb: existing.msb().min(field.msb()),
                });
            }
        }

        self.reset_value = field.merge(self.reset_value, field.reset());
        self.shadow = field.merge(self.shadow, field.reset());
        let name = field.name().to_string();
        self.fields.insert(name.clone(), field);
        Ok(&self.fields[&name])
    }

    /// Convenience wrapper building the field descriptor inline.
    ///
    /// # Errors
    ///
    /// Propagates every [`DefinitionError`] from [`Field::new`] and
    /// [`Register::add_field`].
    pub fn define_field(
        &mut self,
        name: &str,
        offset: u32,
        width: u32,
        access: AccessType,
        reset: u64,
    ) -> Result<&Field, DefinitionError> {
        let field = Field::new(name, offset, width, access, reset)?;
        self.add_field(field)
    }

    /// Returns the register name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the register address.
    #[must_use]
    pub const fn address(&self) -> u64 {
        self.address
    }

    /// Returns the register size in bits.
    #[must_use]
    pub const fn size_bits(&self) -> u32 {
        self.size_bits
    }

    /// Returns the cached reset value (OR of shifted field resets).
    #[must_use]
    pub const fn reset_value(&self) -> u64 {
        self.reset_value
    }

    /// Returns the full-width mask for this register.
    #[must_use]
    pub const fn size_mask(&self) -> u64 {
        width_mask(self.size_bits)
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Iterates fields in ascending offset order.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        let mut ordered: Vec<&Field> = self.fields.values().collect();
        ordered.sort_by_key(|field| field.offset());
        ordered.into_iter()
    }

    /// Returns the number of defined fields.
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Returns the shadow value masked to the register size.
    ///
    /// Pure model access; a live read through hardware is a controller
    /// operation.
    #[must_use]
    pub const fn read(&self) -> u64 {
        self.shadow & self.size_mask()
    }

    /// Extracts one field's bits from the shadow.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::UnknownField`] when the field name is not
    /// defined on this register.
    pub fn field_value(&self, name: &str) -> Result<u64, UsageError> {
        self.fields.get(name).map_or_else(
            || {
                Err(UsageError::UnknownField {
                    register: self.name.clone(),
                    field: name.to_string(),
                })
            },
            |field| Ok(field.extract(self.shadow)),
        )
    }

    /// Validates a value spec against the register's field set without
    /// applying it.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::UnknownField`] for names not defined on
    /// this register and [`UsageError::ValueOverflow`] for values
    /// exceeding a field's width.
    pub fn validate_spec(&self, spec: &ValueSpec) -> Result<(), UsageError> {
        if let ValueSpec::Fields(entries) = spec {
            for (name, value) in entries {
                let field = self.fields.get(name).ok_or_else(|| UsageError::UnknownField {
                    register: self.name.clone(),
                    field: name.clone(),
                })?;
                if !field.accepts(*value) {
                    return Err(UsageError::ValueOverflow {
                        register: self.name.clone(),
                        field: name.clone(),
                        value: *value,
                        width: field.width(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Updates the shadow from a full value or a field map.
    ///
    /// Whole values are masked to the register size. Field writes clear
    /// the touched field's bits and OR in the shifted new value; bits of
    /// untouched fields are preserved. The whole spec is validated
    /// before any bit changes, so a rejected call leaves the shadow
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns the [`UsageError`] reported by [`Register::validate_spec`].
    pub fn write(&mut self, spec: &ValueSpec) -> Result<(), UsageError> {
        self.validate_spec(spec)?;
        match spec {
            ValueSpec::Whole(value) => {
                self.shadow = value & self.size_mask();
            }
            ValueSpec::Fields(entries) => {
                for (name, value) in entries {
                    let field = &self.fields[name];
                    self.shadow = field.merge(self.shadow, *value);
                }
            }
        }
        Ok(())
    }

    /// Compares a value spec against the shadow.
    ///
    /// # Errors
    ///
    /// Returns the [`UsageError`] reported by [`Register::validate_spec`].
    pub fn verify(&self, spec: &ValueSpec) -> Result<VerifyReport, UsageError> {
        self.verify_against(spec, self.shadow)
    }

    /// Compares a value spec against an externally obtained register
    /// value (e.g. a live read performed by a controller).
    ///
    /// Whole-value specs are decomposed into the defined fields and
    /// compared per field; bits covered by no field are don't-care. All
    /// mismatches are accumulated before the report is returned.
    ///
    /// # Errors
    ///
    /// Returns the [`UsageError`] reported by [`Register::validate_spec`].
    pub fn verify_against(&self, spec: &ValueSpec, actual: u64) -> Result<VerifyReport, UsageError> {
        self.validate_spec(spec)?;
        let mut report = VerifyReport::default();
        match spec {
            ValueSpec::Whole(value) => {
                for field in self.fields() {
                    let expected = field.extract(*value);
                    let got = field.extract(actual);
                    if expected != got {
                        report.mismatches.push(FieldMismatch {
                            field: field.name().to_string(),
                            expected,
                            actual: got,
                        });
                    }
                }
            }
            ValueSpec::Fields(entries) => {
                for (name, expected) in entries {
                    let field = &self.fields[name];
                    let got = field.extract(actual);
                    if *expected != got {
                        report.mismatches.push(FieldMismatch {
                            field: name.clone(),
                            expected: *expected,
                            actual: got,
                        });
                    }
                }
            }
        }
        Ok(report)
    }

    /// Restores the shadow to the cached reset value.
    pub const fn reset(&mut self) {
        self.shadow = self.reset_value;
    }
}
