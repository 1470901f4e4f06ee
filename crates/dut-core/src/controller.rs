//! Device controller: lowers logical register operations into
//! protocol-level instruction sequences dispatched through a transport
//! capability.
//!
//! The controller is polymorphic over DUT variants: it is handed the
//! register model to target per call and owns no register set of its
//! own. Transactions against one transport must be serialized by the
//! caller; the controller never retries.

use core::fmt;

use indexmap::IndexMap;

use crate::{Register, UsageError, ValueSpec, VerifyReport};

use thiserror::Error;

/// An opaque protocol-level command lowered from a register operation.
///
/// The wire format is the transport's concern; the core only defines
/// the logical command set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Instruction {
    /// Select the target register address for subsequent shifts.
    SelectAddress {
        /// Register address.
        address: u64,
    },
    /// Shift a value of `width` bits into the selected register.
    ShiftIn {
        /// Value to shift, already masked to `width` bits.
        value: u64,
        /// Shift width in bits.
        width: u32,
    },
    /// Shift `width` bits out of the selected register.
    ShiftOut {
        /// Shift width in bits.
        width: u32,
    },
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelectAddress { address } => write!(f, "select-address {address:#x}"),
            Self::ShiftIn { value, width } => write!(f, "shift-in {value:#x} ({width} bits)"),
            Self::ShiftOut { width } => write!(f, "shift-out ({width} bits)"),
        }
    }
}

/// Transport-level response to one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Response {
    /// Instruction completed with no data phase.
    Ack,
    /// Instruction completed and captured shifted-out data.
    Data(u64),
}

/// Failure reported by the transport for one instruction.
///
/// The only error class originating below the core; it is propagated
/// upward unmodified, wrapped with lowering context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum TransportError {
    /// The transport gave up waiting for the device.
    #[error("transport timeout")]
    Timeout,
    /// The device refused the instruction.
    #[error("protocol nack")]
    Nack,
    /// The link is no longer usable.
    #[error("transport link closed")]
    LinkClosed,
}

/// Capability consumed by the controller to reach real hardware.
///
/// At most one transaction is outstanding at a time; implementations
/// own timeout policy and report failures as [`TransportError`].
pub trait Transport {
    /// Executes one protocol instruction.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the instruction cannot be
    /// completed.
    fn transact(&mut self, instruction: &Instruction) -> Result<Response, TransportError>;
}

/// Deterministic observability event for one lowered instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionEvent {
    /// Instruction handed to the transport.
    Issued {
        /// The lowered instruction.
        instruction: Instruction,
    },
    /// Instruction completed with a response.
    Completed {
        /// The lowered instruction.
        instruction: Instruction,
        /// Transport response.
        response: Response,
    },
    /// Instruction failed at the transport.
    Failed {
        /// The lowered instruction.
        instruction: Instruction,
        /// Transport failure.
        error: TransportError,
    },
}

/// Sink trait receiving transaction events in issue order.
pub trait TransactionSink {
    /// Records one event.
    fn on_transaction(&mut self, event: TransactionEvent);
}

/// Errors surfaced by controller register operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    /// The request was rejected by the register model before lowering.
    #[error(transparent)]
    Usage(#[from] UsageError),
    /// The transport failed mid-sequence. Instructions already issued
    /// are not rolled back; `completed` reports how many of the lowered
    /// instructions finished before the failure.
    #[error("transport failed on `{instruction}` after {completed} completed instruction(s): {source}")]
    Transport {
        /// The instruction that failed.
        instruction: Instruction,
        /// Lowered instructions completed before the failure.
        completed: usize,
        /// The underlying transport failure.
        source: TransportError,
    },
    /// The transport answered with a response shape the instruction
    /// cannot produce.
    #[error("transport returned an unexpected response to `{instruction}`")]
    ProtocolViolation {
        /// The instruction with the mismatched response.
        instruction: Instruction,
    },
}

/// Request shape accepted by [`RegisterBacked::write_register`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteRequest {
    /// Push the register's current shadow value.
    Shadow,
    /// Push an explicit full-width value, masked to the register size.
    Value(u64),
    /// Read-modify-write: live read, merge only the named fields, push
    /// the merged image.
    Overlay(IndexMap<String, u64>),
}

impl WriteRequest {
    /// Builds an overlay request from `(field, value)` pairs.
    #[must_use]
    pub fn overlay<'a>(entries: impl IntoIterator<Item = (&'a str, u64)>) -> Self {
        Self::Overlay(
            entries
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        )
    }
}

/// Outcome of a completed register write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOutcome {
    /// The bit-exact value pushed to hardware.
    pub value_written: u64,
    /// Number of lowered instructions completed.
    pub instructions_completed: usize,
}

/// Outcome of a completed register verify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyOutcome {
    /// The value obtained by the live read.
    pub value_read: u64,
    /// Field-level comparison report.
    pub report: VerifyReport,
    /// Number of lowered instructions completed.
    pub instructions_completed: usize,
}

/// Outcome of a completed live register read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOutcome {
    /// The value obtained by the live read.
    pub value_read: u64,
    /// Number of lowered instructions completed.
    pub instructions_completed: usize,
}

/// Capability implemented by anything that can realize logical register
/// operations on hardware.
///
/// DUT variants share one controller implementation and differ only in
/// the register models they pass in.
pub trait RegisterBacked {
    /// Writes a register, updating its shadow on success.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError`] on request validation or transport
    /// failure; the shadow is not updated on failure.
    fn write_register(
        &mut self,
        register: &mut Register,
        request: &WriteRequest,
    ) -> Result<WriteOutcome, ControllerError>;

    /// Live-reads a register and compares it against expectations
    /// without mutating the shadow.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError`] on request validation or transport
    /// failure.
    fn verify_register(
        &mut self,
        register: &Register,
        expected: Option<&ValueSpec>,
    ) -> Result<VerifyOutcome, ControllerError>;

    /// Live-reads a register, synchronizing its shadow to the value
    /// read back.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError`] on transport failure; the shadow is
    /// not updated on failure.
    fn read_register(&mut self, register: &mut Register) -> Result<ReadOutcome, ControllerError>;
}

/// Generic device controller over an injected transport capability.
pub struct Controller<T: Transport> {
    transport: T,
    sink: Option<Box<dyn TransactionSink>>,
}

impl<T: Transport> fmt::Debug for Controller<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("sink", &self.sink.is_some())
            .finish_non_exhaustive()
    }
}

impl<T: Transport> Controller<T> {
    /// Creates a controller over a transport.
    pub const fn new(transport: T) -> Self {
        Self {
            transport,
            sink: None,
        }
    }

    /// Attaches a transaction sink receiving every lowered instruction
    /// and its outcome in issue order.
    pub fn set_sink(&mut self, sink: Box<dyn TransactionSink>) {
        self.sink = Some(sink);
    }

    /// Consumes the controller, returning the transport.
    #[must_use]
    pub fn into_transport(self) -> T {
        self.transport
    }

    fn transact(
        &mut self,
        instruction: Instruction,
        completed: &mut usize,
    ) -> Result<Response, ControllerError> {
        if let Some(sink) = self.sink.as_mut() {
            sink.on_transaction(TransactionEvent::Issued { instruction });
        }
        match self.transport.transact(&instruction) {
            Ok(response) => {
                if let Some(sink) = self.sink.as_mut() {
                    sink.on_transaction(TransactionEvent::Completed {
                        instruction,
                        response,
                    });
                }
                *completed += 1;
                Ok(response)
            }
            Err(source) => {
                if let Some(sink) = self.sink.as_mut() {
                    sink.on_transaction(TransactionEvent::Failed {
                        instruction,
                        error: source,
                    });
                }
                Err(ControllerError::Transport {
                    instruction,
                    completed: *completed,
                    source,
                })
            }
        }
    }

    /// Lowered live read: select the address, then shift the register
    /// width out.
    fn live_read(
        &mut self,
        register: &Register,
        completed: &mut usize,
    ) -> Result<u64, ControllerError> {
        self.transact(
            Instruction::SelectAddress {
                address: register.address(),
            },
            completed,
        )?;
        let shift_out = Instruction::ShiftOut {
            width: register.size_bits(),
        };
        match self.transact(shift_out, completed)? {
            Response::Data(value) => Ok(value & register.size_mask()),
            Response::Ack => Err(ControllerError::ProtocolViolation {
                instruction: shift_out,
            }),
        }
    }

    /// Lowered write: select the address, then shift the value in.
    fn push_value(
        &mut self,
        register: &Register,
        value: u64,
        completed: &mut usize,
    ) -> Result<(), ControllerError> {
        self.transact(
            Instruction::SelectAddress {
                address: register.address(),
            },
            completed,
        )?;
        self.transact(
            Instruction::ShiftIn {
                value,
                width: register.size_bits(),
            },
            completed,
        )?;
        Ok(())
    }
}

impl<T: Transport> RegisterBacked for Controller<T> {
    fn write_register(
        &mut self,
        register: &mut Register,
        request: &WriteRequest,
    ) -> Result<WriteOutcome, ControllerError> {
        let mut completed = 0usize;
        let value = match request {
            WriteRequest::Shadow => register.read(),
            WriteRequest::Value(value) => value & register.size_mask(),
            WriteRequest::Overlay(entries) => {
                let spec = ValueSpec::Fields(entries.clone());
                register.validate_spec(&spec)?;
                let live = self.live_read(register, &mut completed)?;
                let mut merged = live;
                for (name, value) in entries {
                    if let Some(field) = register.field(name) {
                        merged = field.merge(merged, *value);
                    }
                }
                merged
            }
        };

        self.push_value(register, value, &mut completed)?;
        register.write(&ValueSpec::Whole(value))?;
        Ok(WriteOutcome {
            value_written: value,
            instructions_completed: completed,
        })
    }

    fn verify_register(
        &mut self,
        register: &Register,
        expected: Option<&ValueSpec>,
    ) -> Result<VerifyOutcome, ControllerError> {
        if let Some(spec) = expected {
            register.validate_spec(spec)?;
        }
        let mut completed = 0usize;
        let live = self.live_read(register, &mut completed)?;
        let report = match expected {
            Some(spec) => register.verify_against(spec, live)?,
            None => register.verify_against(&ValueSpec::Whole(register.read()), live)?,
        };
        Ok(VerifyOutcome {
            value_read: live,
            report,
            instructions_completed: completed,
        })
    }

    fn read_register(&mut self, register: &mut Register) -> Result<ReadOutcome, ControllerError> {
        let mut completed = 0usize;
        let live = self.live_read(register, &mut completed)?;
        register.write(&ValueSpec::Whole(live))?;
        Ok(ReadOutcome {
            value_read: live,
            instructions_completed: completed,
        })
    }
}
