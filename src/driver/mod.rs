//! Pipeline orchestration.
//!
//! The in-memory driver (`compile_source`) runs the stage chain
//! parse → check → lower → optimize → emit and can stop after any stage,
//! which is how tests exercise a prefix of the pipeline with a chosen
//! pass set. The file driver (`compile_file`) dispatches on the
//! input/output extensions through `.pln → .c → .s → .o → .so` with the
//! off-chain `.pln → .lua` branch, keeps every intermediate file in a
//! temporary directory that is removed on success and on error alike,
//! and places the endpoints next to the input.

use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::info;

use crate::codegen;
use crate::ir;
use crate::optimizer::{self, PassConfig, PassError};
use crate::parser::{self, ParseError, ParsedProgram};
use crate::translator;
use crate::typechecker::{self, CheckedModule, TypeCheckError};

/// Last stage to run in `compile_source`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StopAfter {
    Parse,
    Check,
    Lower,
    Optimize,
    Emit,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub stop_after: StopAfter,
    pub passes: PassConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            stop_after: StopAfter::Emit,
            passes: PassConfig::all(),
        }
    }
}

/// Everything the pipeline produced before it stopped.
#[derive(Debug, Default)]
pub struct Artifacts {
    pub parsed: Option<ParsedProgram>,
    pub checked: Option<CheckedModule>,
    pub ir: Option<ir::Module>,
    pub c_source: Option<String>,
    pub lua_source: Option<String>,
}

#[derive(Debug)]
pub enum CompileError {
    Syntax(Vec<ParseError>),
    Check(Vec<TypeCheckError>),
    Analysis(PassError),
    Io(String),
    Toolchain(String),
}

impl CompileError {
    /// One rendered line per diagnostic, in source order.
    pub fn render(&self) -> Vec<String> {
        match self {
            CompileError::Syntax(errors) => {
                errors.iter().map(|e| e.to_string()).collect()
            }
            CompileError::Check(errors) => {
                errors.iter().map(|e| e.to_string()).collect()
            }
            CompileError::Analysis(error) => vec![error.to_string()],
            CompileError::Io(message) => vec![format!("pallenec: io: {message}")],
            CompileError::Toolchain(message) => {
                vec![format!("pallenec: toolchain: {message}")]
            }
        }
    }
}

impl Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for line in self.render() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

impl std::error::Error for CompileError {}

/// Run the compiler stages on an in-memory buffer.
pub fn compile_source(
    file_name: &str,
    source: &str,
    config: &Config,
) -> Result<Artifacts, CompileError> {
    let mut artifacts = Artifacts::default();

    let parsed = parser::parse(file_name, source).map_err(CompileError::Syntax)?;
    artifacts.parsed = Some(parsed);
    if config.stop_after == StopAfter::Parse {
        return Ok(artifacts);
    }

    let parsed = artifacts.parsed.as_ref().unwrap();
    let checked =
        typechecker::check(parsed.program.clone()).map_err(CompileError::Check)?;
    artifacts.checked = Some(checked);
    if config.stop_after == StopAfter::Check {
        return Ok(artifacts);
    }

    let module_name = module_name_of(file_name);
    let checked = artifacts.checked.as_ref().unwrap();
    let module = ir::lower(&module_name, checked);
    artifacts.ir = Some(module);
    if config.stop_after == StopAfter::Lower {
        return Ok(artifacts);
    }

    let module = artifacts.ir.take().unwrap();
    let module =
        optimizer::optimize(module, &config.passes).map_err(CompileError::Analysis)?;
    artifacts.ir = Some(module);
    if config.stop_after == StopAfter::Optimize {
        return Ok(artifacts);
    }

    artifacts.c_source = Some(codegen::emit(artifacts.ir.as_ref().unwrap()));
    let parsed = artifacts.parsed.as_ref().unwrap();
    let checked = artifacts.checked.as_ref().unwrap();
    artifacts.lua_source = Some(translator::translate(
        source,
        &checked.program,
        &parsed.comments,
    ));

    Ok(artifacts)
}

/// The runtime-visible module name: the base name with `/` replaced by
/// `_`. Any other character outside the allowed base-name alphabet also
/// maps to `_` so the name is always a valid C identifier.
pub fn module_name_of(file_name: &str) -> String {
    let base = file_name.strip_suffix(".pln").unwrap_or(file_name);
    let base = base.strip_suffix(".c").unwrap_or(base);
    base.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// `.pln`-to-something emit modes of the file driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// `.pln` → `.so` (the default chain)
    SharedObject,
    /// `.pln` → `.c`
    EmitC,
    /// `.c` → `.s`
    EmitAsm,
    /// `.pln` → `.lua`
    EmitLua,
    /// `.c` → `.so`
    CompileC,
}

impl Mode {
    fn input_extension(&self) -> &'static str {
        match self {
            Mode::SharedObject | Mode::EmitC | Mode::EmitLua => "pln",
            Mode::EmitAsm | Mode::CompileC => "c",
        }
    }

    fn output_extension(&self) -> &'static str {
        match self {
            Mode::SharedObject | Mode::CompileC => "so",
            Mode::EmitC => "c",
            Mode::EmitAsm => "s",
            Mode::EmitLua => "lua",
        }
    }
}

/// Compile `input` according to `mode`, returning the path of the
/// produced endpoint (placed next to the input).
pub fn compile_file(input: &Path, mode: Mode, config: &Config) -> Result<PathBuf, CompileError> {
    let extension = input.extension().and_then(|e| e.to_str()).unwrap_or("");
    if extension != mode.input_extension() {
        return Err(CompileError::Io(format!(
            "input file '{}' must have the '.{}' extension",
            input.display(),
            mode.input_extension()
        )));
    }

    let base = input.with_extension("");
    let base_str = base.to_string_lossy();
    if base_str.is_empty()
        || !base_str
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '/' || c == '.')
    {
        return Err(CompileError::Io(format!(
            "invalid module path '{base_str}': only letters, digits, '_' and '/' are allowed"
        )));
    }

    let output = input.with_extension(mode.output_extension());
    info!("compiling {} -> {}", input.display(), output.display());

    match mode {
        Mode::EmitAsm => {
            run_cc(&["-S", "-O2", "-fPIC"], input, &output)?;
        }
        Mode::CompileC => {
            run_cc(&["-shared", "-O2", "-fPIC"], input, &output)?;
        }
        Mode::EmitC | Mode::EmitLua => {
            let artifacts = compile_input(input, config)?;
            let text = match mode {
                Mode::EmitC => artifacts.c_source.unwrap(),
                _ => artifacts.lua_source.unwrap(),
            };
            fs::write(&output, text)
                .map_err(|e| CompileError::Io(format!("{}: {e}", output.display())))?;
        }
        Mode::SharedObject => {
            let artifacts = compile_input(input, config)?;
            // all intermediates live in a directory removed on every exit
            // path, success or error
            let tmp = tempfile::tempdir()
                .map_err(|e| CompileError::Io(format!("creating temp dir: {e}")))?;
            let c_path = tmp.path().join("module.c");
            let s_path = tmp.path().join("module.s");
            let o_path = tmp.path().join("module.o");
            fs::write(&c_path, artifacts.c_source.unwrap())
                .map_err(|e| CompileError::Io(format!("{}: {e}", c_path.display())))?;
            run_cc(&["-S", "-O2", "-fPIC"], &c_path, &s_path)?;
            run_cc(&["-c"], &s_path, &o_path)?;
            run_cc(&["-shared"], &o_path, &output)?;
        }
    }

    Ok(output)
}

fn compile_input(input: &Path, config: &Config) -> Result<Artifacts, CompileError> {
    let source = fs::read_to_string(input)
        .map_err(|e| CompileError::Io(format!("{}: {e}", input.display())))?;
    let file_name = input.to_string_lossy();
    compile_source(&file_name, &source, config)
}

fn run_cc(flags: &[&str], input: &Path, output: &Path) -> Result<(), CompileError> {
    let mut command = Command::new("cc");
    command.args(flags);
    if let Ok(extra) = std::env::var("PALLENE_CFLAGS") {
        command.args(extra.split_whitespace());
    }
    command.arg(input).arg("-o").arg(output);

    info!("running {command:?}");
    let result = command
        .output()
        .map_err(|e| CompileError::Toolchain(format!("failed to run cc: {e}")))?;
    if !result.status.success() {
        return Err(CompileError::Toolchain(format!(
            "cc exited with {}: {}",
            result.status,
            String::from_utf8_lossy(&result.stderr).trim()
        )));
    }
    Ok(())
}
