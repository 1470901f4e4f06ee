//! CLI entry point for the patgen binary.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use dut_core as _;
use patgen::compiler::{compile, CompileOutput, ScriptError};
use patgen::render::render_pattern;
#[cfg(test)]
use tempfile as _;

const USAGE_TEXT: &str = "\
Usage: patgen <command> [options]

Commands:
  build <input> [-o <dir>]  Compile a script and write one .vec file per pattern
  check <input>             Compile a script without writing output

Options:
  -o, --output <dir>  Output directory (default: the input's directory)
  -h, --help          Show this help message

Examples:
  patgen build bringup.pat
  patgen build bringup.pat -o vectors/
  patgen check bringup.pat
";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Build(BuildArgs),
    Check(CheckArgs),
}

#[derive(Debug, PartialEq, Eq)]
struct BuildArgs {
    input: PathBuf,
    output: Option<PathBuf>,
}

#[derive(Debug, PartialEq, Eq)]
struct CheckArgs {
    input: PathBuf,
}

#[derive(Debug)]
enum ParseResult {
    Command(Command),
    Help,
}

fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let first = args.next().ok_or_else(|| "missing command".to_string())?;

    if first == "--help" || first == "-h" {
        return Ok(ParseResult::Help);
    }

    let command_str = first.to_string_lossy().to_string();

    match command_str.as_str() {
        "build" => parse_build_args(args)
            .map(Command::Build)
            .map(ParseResult::Command),
        "check" => parse_check_args(args)
            .map(Command::Check)
            .map(ParseResult::Command),
        other => Err(format!("unknown command: {other}")),
    }
}

#[allow(clippy::while_let_on_iterator)]
fn parse_build_args(mut args: impl Iterator<Item = OsString>) -> Result<BuildArgs, String> {
    let mut input: Option<PathBuf> = None;
    let mut output: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        if arg == "--help" || arg == "-h" {
            return Err(USAGE_TEXT.to_string());
        }

        if arg == "--output" || arg == "-o" {
            let value = args
                .next()
                .ok_or_else(|| "missing value for --output".to_string())?;
            if output.is_some() {
                return Err("multiple output directories provided".to_string());
            }
            output = Some(PathBuf::from(value));
            continue;
        }

        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }

        if input.is_some() {
            return Err("multiple input paths provided".to_string());
        }
        input = Some(PathBuf::from(arg));
    }

    let input = input.ok_or_else(|| "missing input path".to_string())?;
    Ok(BuildArgs { input, output })
}

fn parse_check_args(args: impl Iterator<Item = OsString>) -> Result<CheckArgs, String> {
    let mut input: Option<PathBuf> = None;

    for arg in args {
        if arg == "--help" || arg == "-h" {
            return Err(USAGE_TEXT.to_string());
        }

        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }

        if input.is_some() {
            return Err("multiple input paths provided".to_string());
        }
        input = Some(PathBuf::from(arg));
    }

    let input = input.ok_or_else(|| "missing input path".to_string())?;
    Ok(CheckArgs { input })
}

/// DUT name derived from the input file stem.
fn dut_name(input: &Path) -> String {
    input
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("dut")
        .to_string()
}

fn compile_input(input: &Path) -> Result<CompileOutput, i32> {
    let source = match fs::read_to_string(input) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error: failed to read {}: {err}", input.display());
            return Err(1);
        }
    };

    match compile(&source, &dut_name(input)) {
        Ok(output) => Ok(output),
        Err(err) => {
            report_script_error(input, &err);
            Err(1)
        }
    }
}

fn report_script_error(input: &Path, err: &ScriptError) {
    eprintln!("{}:{}: error: {}", input.display(), err.line, err.kind);
}

fn run_build(args: &BuildArgs) -> Result<(), i32> {
    let output = compile_input(&args.input)?;

    let out_dir = args.output.clone().unwrap_or_else(|| {
        args.input
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
    });

    if let Err(err) = fs::create_dir_all(&out_dir) {
        eprintln!(
            "error: failed to create output directory {}: {err}",
            out_dir.display()
        );
        return Err(1);
    }

    for pattern in &output.patterns {
        let path = out_dir.join(format!("{}.vec", pattern.name()));
        let text = render_pattern(pattern);
        if let Err(err) = fs::write(&path, text) {
            eprintln!("error: failed to write {}: {err}", path.display());
            return Err(1);
        }
        println!(
            "Rendered {} ({} cycles) -> {}",
            pattern.name(),
            pattern.cycle_count(),
            path.display()
        );
    }

    if output.patterns.is_empty() {
        println!("No patterns found in {}", args.input.display());
    }

    Ok(())
}

fn run_check(args: &CheckArgs) -> Result<(), i32> {
    let output = compile_input(&args.input)?;

    println!(
        "OK: {} register(s), {} pin(s), {} pattern(s)",
        output.dut.registers().count(),
        output.dut.pins().count(),
        output.patterns.len()
    );

    Ok(())
}

fn main() {
    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Command(Command::Build(args))) => match run_build(&args) {
            Ok(()) => 0,
            Err(code) => code,
        },
        Ok(ParseResult::Command(Command::Check(args))) => match run_check(&args) {
            Ok(()) => 0,
            Err(code) => code,
        },
        Err(error) => {
            if error.starts_with("Usage:") {
                println!("{error}");
            } else {
                eprintln!("error: {error}");
                eprintln!("{USAGE_TEXT}");
            }
            1
        }
    };

    std::process::exit(exit_code);
}
