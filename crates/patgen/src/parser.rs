//! Line parser for pattern stimulus scripts.
//!
//! Scripts are line oriented; `#` starts a comment that runs to the end
//! of the line. One directive per line:
//!
//! ```text
//! pin clk
//! register ctrl 0x0024 16
//! field ctrl adch 0 5 rw 0x1F
//! pattern boot
//!   drive clk 1
//!   repeat 100
//!   release clk
//!   wait 10
//! end
//! ```
//!
//! The parser classifies single lines; block structure (pattern
//! bracketing) is enforced by the compiler.

use core::str::FromStr;

use dut_core::AccessType;

/// A parsed script directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `pin <name>` - declare a pin.
    Pin {
        /// Pin name.
        name: String,
    },
    /// `register <name> <address> <size_bits>` - declare a register.
    Register {
        /// Register name.
        name: String,
        /// Register address.
        address: u64,
        /// Register size in bits.
        size_bits: u32,
    },
    /// `field <register> <name> <offset> <width> [access] [reset]` -
    /// declare a field on a register.
    Field {
        /// Owning register name.
        register: String,
        /// Field name.
        name: String,
        /// LSB0 bit offset.
        offset: u32,
        /// Width in bits.
        width: u32,
        /// Access policy (defaults to `rw`).
        access: AccessType,
        /// Reset value (defaults to 0).
        reset: u64,
    },
    /// `pattern <name>` - open a pattern block.
    PatternStart {
        /// Pattern name.
        name: String,
    },
    /// `drive <pin> <0|1>` - record a drive action.
    Drive {
        /// Target pin name.
        pin: String,
        /// Raw signal level.
        level: u8,
    },
    /// `release <pin>` - record a high-Z action.
    Release {
        /// Target pin name.
        pin: String,
    },
    /// `repeat <count>` - hold the current states.
    Repeat {
        /// Cycle count.
        count: u32,
    },
    /// `wait <cycles>` - idle without state changes.
    Wait {
        /// Cycle count.
        cycles: u32,
    },
    /// `end` - close the current pattern block.
    PatternEnd,
}

/// A statement with its 1-indexed source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedStatement {
    /// 1-indexed line number.
    pub line: usize,
    /// The parsed directive.
    pub statement: Statement,
}

/// Parse error with its 1-indexed source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// 1-indexed line number.
    pub line: usize,
    /// Kind of parse error.
    pub kind: ParseErrorKind,
}

/// Classification of parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// First word of the line is not a known directive.
    UnknownDirective(String),
    /// Directive received the wrong number of operands.
    BadOperandCount {
        /// The directive name.
        directive: &'static str,
        /// Operands the directive expects (human-readable).
        expected: &'static str,
        /// Operands found on the line.
        found: usize,
    },
    /// An operand could not be parsed as a number.
    InvalidNumber(String),
    /// An access operand was not `rw`/`ro`/`wo`.
    InvalidAccess(String),
}

impl core::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnknownDirective(word) => write!(f, "unknown directive `{word}`"),
            Self::BadOperandCount {
                directive,
                expected,
                found,
            } => write!(
                f,
                "`{directive}` expects {expected}, found {found} operand(s)"
            ),
            Self::InvalidNumber(word) => write!(f, "invalid number `{word}`"),
            Self::InvalidAccess(word) => write!(f, "invalid access type `{word}`"),
        }
    }
}

/// Parses a decimal or `0x`-prefixed hexadecimal unsigned number.
fn parse_number(word: &str, line: usize) -> Result<u64, ParseError> {
    let parsed = word.strip_prefix("0x").map_or_else(
        || word.parse::<u64>(),
        |hex| u64::from_str_radix(hex, 16),
    );
    parsed.map_err(|_| ParseError {
        line,
        kind: ParseErrorKind::InvalidNumber(word.to_string()),
    })
}

fn parse_number_u32(word: &str, line: usize) -> Result<u32, ParseError> {
    let value = parse_number(word, line)?;
    u32::try_from(value).map_err(|_| ParseError {
        line,
        kind: ParseErrorKind::InvalidNumber(word.to_string()),
    })
}

fn parse_number_u8(word: &str, line: usize) -> Result<u8, ParseError> {
    let value = parse_number(word, line)?;
    u8::try_from(value).map_err(|_| ParseError {
        line,
        kind: ParseErrorKind::InvalidNumber(word.to_string()),
    })
}

fn bad_operand_count(
    line: usize,
    directive: &'static str,
    expected: &'static str,
    found: usize,
) -> ParseError {
    ParseError {
        line,
        kind: ParseErrorKind::BadOperandCount {
            directive,
            expected,
            found,
        },
    }
}

/// Parses one source line into a statement.
///
/// Returns `Ok(None)` for blank and comment-only lines.
///
/// # Errors
///
/// Returns [`ParseError`] for unknown directives and malformed
/// operands.
pub fn parse_line(raw: &str, line: usize) -> Result<Option<Statement>, ParseError> {
    let content = raw.split('#').next().unwrap_or("").trim();
    if content.is_empty() {
        return Ok(None);
    }

    let mut words = content.split_whitespace();
    let directive = words.next().unwrap_or("");
    let operands: Vec<&str> = words.collect();

    let statement = match directive {
        "pin" => match operands.as_slice() {
            [name] => Statement::Pin {
                name: (*name).to_string(),
            },
            _ => return Err(bad_operand_count(line, "pin", "1 operand (name)", operands.len())),
        },
        "register" => match operands.as_slice() {
            [name, address, size_bits] => Statement::Register {
                name: (*name).to_string(),
                address: parse_number(address, line)?,
                size_bits: parse_number_u32(size_bits, line)?,
            },
            _ => {
                return Err(bad_operand_count(
                    line,
                    "register",
                    "3 operands (name, address, size)",
                    operands.len(),
                ))
            }
        },
        "field" => match operands.as_slice() {
            [register, name, offset, width, rest @ ..] if rest.len() <= 2 => {
                let access = match rest.first() {
                    Some(word) => AccessType::from_str(word).map_err(|_| ParseError {
                        line,
                        kind: ParseErrorKind::InvalidAccess((*word).to_string()),
                    })?,
                    None => AccessType::ReadWrite,
                };
                let reset = match rest.get(1) {
                    Some(word) => parse_number(word, line)?,
                    None => 0,
                };
                Statement::Field {
                    register: (*register).to_string(),
                    name: (*name).to_string(),
                    offset: parse_number_u32(offset, line)?,
                    width: parse_number_u32(width, line)?,
                    access,
                    reset,
                }
            }
            _ => {
                return Err(bad_operand_count(
                    line,
                    "field",
                    "4-6 operands (register, name, offset, width, [access], [reset])",
                    operands.len(),
                ))
            }
        },
        "pattern" => match operands.as_slice() {
            [name] => Statement::PatternStart {
                name: (*name).to_string(),
            },
            _ => {
                return Err(bad_operand_count(
                    line,
                    "pattern",
                    "1 operand (name)",
                    operands.len(),
                ))
            }
        },
        "drive" => match operands.as_slice() {
            [pin, level] => Statement::Drive {
                pin: (*pin).to_string(),
                level: parse_number_u8(level, line)?,
            },
            _ => {
                return Err(bad_operand_count(
                    line,
                    "drive",
                    "2 operands (pin, level)",
                    operands.len(),
                ))
            }
        },
        "release" => match operands.as_slice() {
            [pin] => Statement::Release {
                pin: (*pin).to_string(),
            },
            _ => {
                return Err(bad_operand_count(
                    line,
                    "release",
                    "1 operand (pin)",
                    operands.len(),
                ))
            }
        },
        "repeat" => match operands.as_slice() {
            [count] => Statement::Repeat {
                count: parse_number_u32(count, line)?,
            },
            _ => {
                return Err(bad_operand_count(
                    line,
                    "repeat",
                    "1 operand (count)",
                    operands.len(),
                ))
            }
        },
        "wait" => match operands.as_slice() {
            [cycles] => Statement::Wait {
                cycles: parse_number_u32(cycles, line)?,
            },
            _ => {
                return Err(bad_operand_count(
                    line,
                    "wait",
                    "1 operand (cycles)",
                    operands.len(),
                ))
            }
        },
        "end" => {
            if !operands.is_empty() {
                return Err(bad_operand_count(line, "end", "no operands", operands.len()));
            }
            Statement::PatternEnd
        }
        other => {
            return Err(ParseError {
                line,
                kind: ParseErrorKind::UnknownDirective(other.to_string()),
            })
        }
    };

    Ok(Some(statement))
}

/// Parses a whole script into located statements, failing on the first
/// malformed line.
///
/// # Errors
///
/// Returns the [`ParseError`] of the first malformed line.
pub fn parse_source(source: &str) -> Result<Vec<ParsedStatement>, ParseError> {
    let mut statements = Vec::new();
    for (index, raw) in source.lines().enumerate() {
        let line = index + 1;
        if let Some(statement) = parse_line(raw, line)? {
            statements.push(ParsedStatement { line, statement });
        }
    }
    Ok(statements)
}
