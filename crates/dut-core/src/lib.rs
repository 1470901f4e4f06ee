//! Core DUT modeling crate: register/bit-field layout, pin models, a
//! transport-lowering device controller, and the pattern timeline
//! engine.

/// Definition and usage error taxonomy.
pub mod error;
pub use error::{DefinitionError, UsageError};

/// Bit-field layout descriptors.
pub mod field;
pub use field::{width_mask, AccessType, Field, MAX_VALUE_BITS};

/// Register model with shadow read/write/verify semantics.
pub mod register;
pub use register::{FieldMismatch, Register, ValueSpec, VerifyReport};

/// Pin model primitives.
pub mod pin;
pub use pin::{Level, Pin, PinState};

/// DUT aggregate and configuration ingestion surface.
pub mod dut;
pub use dut::Dut;

/// Pattern timeline engine: production, finalization, and replay.
pub mod pattern;
pub use pattern::{CycleRecord, Pattern, PatternAction, PatternBuilder, Replay};

/// Device controller and transport capability seam.
pub mod controller;
pub use controller::{
    Controller, ControllerError, Instruction, ReadOutcome, RegisterBacked, Response,
    TransactionEvent, TransactionSink, Transport, TransportError, VerifyOutcome, WriteOutcome,
    WriteRequest,
};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
