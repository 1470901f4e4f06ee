//! Script compilation pipeline: parsed statements to a DUT model plus
//! finalized patterns.
//!
//! Definitions (`pin`/`register`/`field`) are only legal outside
//! pattern blocks; actions (`drive`/`release`/`repeat`/`wait`) only
//! inside. Each `pattern`..`end` block produces one finalized pattern
//! through the core's builder, in declaration order.

use dut_core::{DefinitionError, Dut, Pattern, UsageError};

use crate::parser::{parse_source, ParseError, ParseErrorKind, ParsedStatement, Statement};

/// Compiled output: the DUT model and every finalized pattern in
/// declaration order.
#[derive(Debug)]
pub struct CompileOutput {
    /// The DUT assembled from the script's definitions.
    pub dut: Dut,
    /// Finalized patterns in declaration order.
    pub patterns: Vec<Pattern>,
}

/// Script error with its 1-indexed source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptError {
    /// 1-indexed line number the error is attributed to.
    pub line: usize,
    /// Kind of script error.
    pub kind: ScriptErrorKind,
}

/// Classification of script errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptErrorKind {
    /// A line failed to parse.
    Parse(ParseErrorKind),
    /// A definition directive was rejected by the model.
    Definition(DefinitionError),
    /// An action directive was rejected by the model.
    Usage(UsageError),
    /// An action directive appeared outside a pattern block.
    ActionOutsidePattern(&'static str),
    /// A definition directive appeared inside a pattern block.
    DefinitionInsidePattern(&'static str),
    /// A `pattern` directive appeared inside a pattern block.
    NestedPattern,
    /// An `end` directive appeared outside a pattern block.
    EndOutsidePattern,
    /// A pattern block was not closed before end of file.
    UnterminatedPattern {
        /// Name of the open pattern.
        pattern: String,
    },
    /// Two pattern blocks share a name.
    DuplicatePattern {
        /// The colliding pattern name.
        pattern: String,
    },
}

impl core::fmt::Display for ScriptErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Parse(kind) => write!(f, "{kind}"),
            Self::Definition(err) => write!(f, "{err}"),
            Self::Usage(err) => write!(f, "{err}"),
            Self::ActionOutsidePattern(directive) => {
                write!(f, "`{directive}` is only legal inside a pattern block")
            }
            Self::DefinitionInsidePattern(directive) => {
                write!(f, "`{directive}` is not legal inside a pattern block")
            }
            Self::NestedPattern => write!(f, "pattern blocks cannot nest"),
            Self::EndOutsidePattern => write!(f, "`end` without an open pattern block"),
            Self::UnterminatedPattern { pattern } => {
                write!(f, "pattern `{pattern}` is never closed with `end`")
            }
            Self::DuplicatePattern { pattern } => {
                write!(f, "pattern `{pattern}` is already defined")
            }
        }
    }
}

impl core::fmt::Display for ScriptError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "line {}: {}", self.line, self.kind)
    }
}

impl std::error::Error for ScriptError {}

impl From<ParseError> for ScriptError {
    fn from(err: ParseError) -> Self {
        Self {
            line: err.line,
            kind: ScriptErrorKind::Parse(err.kind),
        }
    }
}

fn definition_error(line: usize, err: DefinitionError) -> ScriptError {
    ScriptError {
        line,
        kind: ScriptErrorKind::Definition(err),
    }
}

fn usage_error(line: usize, err: UsageError) -> ScriptError {
    ScriptError {
        line,
        kind: ScriptErrorKind::Usage(err),
    }
}

/// Compiles a script into a DUT model and finalized patterns.
///
/// # Errors
///
/// Returns a located [`ScriptError`] for the first malformed line,
/// rejected definition, rejected action, or block-structure violation.
pub fn compile(source: &str, dut_name: &str) -> Result<CompileOutput, ScriptError> {
    let statements = parse_source(source)?;

    let mut dut = Dut::new(dut_name);
    let mut patterns: Vec<Pattern> = Vec::new();

    let mut index = 0;
    while index < statements.len() {
        let ParsedStatement { line, statement } = &statements[index];
        match statement {
            Statement::Pin { name } => {
                dut.define_pin(name)
                    .map_err(|err| definition_error(*line, err))?;
            }
            Statement::Register {
                name,
                address,
                size_bits,
            } => {
                dut.define_register(name, *address, *size_bits)
                    .map_err(|err| definition_error(*line, err))?;
            }
            Statement::Field {
                register,
                name,
                offset,
                width,
                access,
                reset,
            } => {
                dut.define_field(register, name, *offset, *width, *access, *reset)
                    .map_err(|err| definition_error(*line, err))?;
            }
            Statement::PatternStart { name } => {
                if patterns.iter().any(|pattern| pattern.name() == name) {
                    return Err(ScriptError {
                        line: *line,
                        kind: ScriptErrorKind::DuplicatePattern {
                            pattern: name.clone(),
                        },
                    });
                }
                let (pattern, consumed) =
                    compile_pattern_block(&dut, name, *line, &statements[index + 1..])?;
                patterns.push(pattern);
                index += consumed;
            }
            Statement::Drive { .. } => {
                return Err(ScriptError {
                    line: *line,
                    kind: ScriptErrorKind::ActionOutsidePattern("drive"),
                })
            }
            Statement::Release { .. } => {
                return Err(ScriptError {
                    line: *line,
                    kind: ScriptErrorKind::ActionOutsidePattern("release"),
                })
            }
            Statement::Repeat { .. } => {
                return Err(ScriptError {
                    line: *line,
                    kind: ScriptErrorKind::ActionOutsidePattern("repeat"),
                })
            }
            Statement::Wait { .. } => {
                return Err(ScriptError {
                    line: *line,
                    kind: ScriptErrorKind::ActionOutsidePattern("wait"),
                })
            }
            Statement::PatternEnd => {
                return Err(ScriptError {
                    line: *line,
                    kind: ScriptErrorKind::EndOutsidePattern,
                })
            }
        }
        index += 1;
    }

    Ok(CompileOutput { dut, patterns })
}

/// Compiles one pattern body, returning the finalized pattern and the
/// number of body statements consumed (including the closing `end`).
fn compile_pattern_block(
    dut: &Dut,
    name: &str,
    start_line: usize,
    body: &[ParsedStatement],
) -> Result<(Pattern, usize), ScriptError> {
    let mut builder = dut.produce_pattern(name);

    for (consumed, ParsedStatement { line, statement }) in body.iter().enumerate() {
        match statement {
            Statement::Drive { pin, level } => {
                builder
                    .drive(pin, *level)
                    .map_err(|err| usage_error(*line, err))?;
            }
            Statement::Release { pin } => {
                builder
                    .release(pin)
                    .map_err(|err| usage_error(*line, err))?;
            }
            Statement::Repeat { count } => builder.repeat(*count),
            Statement::Wait { cycles } => builder.wait(*cycles),
            Statement::PatternEnd => return Ok((builder.finalize(), consumed + 1)),
            Statement::PatternStart { .. } => {
                return Err(ScriptError {
                    line: *line,
                    kind: ScriptErrorKind::NestedPattern,
                })
            }
            Statement::Pin { .. } => {
                return Err(ScriptError {
                    line: *line,
                    kind: ScriptErrorKind::DefinitionInsidePattern("pin"),
                })
            }
            Statement::Register { .. } => {
                return Err(ScriptError {
                    line: *line,
                    kind: ScriptErrorKind::DefinitionInsidePattern("register"),
                })
            }
            Statement::Field { .. } => {
                return Err(ScriptError {
                    line: *line,
                    kind: ScriptErrorKind::DefinitionInsidePattern("field"),
                })
            }
        }
    }

    Err(ScriptError {
        line: start_line,
        kind: ScriptErrorKind::UnterminatedPattern {
            pattern: name.to_string(),
        },
    })
}
