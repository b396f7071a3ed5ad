//! CLI argument parsing for pallenec.

use clap::{Parser, ValueEnum};

use pallenec::driver::Mode;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// The input file (`.pln`, or `.c` for --emit-asm / --compile-c).
    #[arg(index = 1)]
    pub input: std::path::PathBuf,

    /// Emit C source instead of a shared object.
    #[arg(long)]
    pub emit_c: bool,

    /// Compile a C file down to assembly.
    #[arg(long)]
    pub emit_asm: bool,

    /// Emit plain Lua source (the type-stripping translator).
    #[arg(long)]
    pub emit_lua: bool,

    /// Compile a C file to a shared object.
    #[arg(long)]
    pub compile_c: bool,

    /// Dump the checked AST as JSON to stdout.
    #[arg(long)]
    pub dump_ast: bool,

    /// Dump the optimized IR as JSON to stdout.
    #[arg(long)]
    pub dump_ir: bool,

    /// Specify the log level of the compiler.
    #[arg(value_enum, short, long, default_value_t = LogLevel::default())]
    pub verbosity: LogLevel,
}

impl Cli {
    pub fn init() -> Self {
        Cli::parse()
    }

    /// The emit flags are mutually exclusive; the first two that are both
    /// set produce the conflict error, in flag-table order.
    pub fn conflicting_flags(&self) -> Option<(&'static str, &'static str)> {
        let flags = [
            ("--emit-c", self.emit_c),
            ("--emit-asm", self.emit_asm),
            ("--emit-lua", self.emit_lua),
            ("--compile-c", self.compile_c),
        ];
        let mut set = flags.iter().filter(|(_, on)| *on);
        match (set.next(), set.next()) {
            (Some((first, _)), Some((second, _))) => Some((first, second)),
            _ => None,
        }
    }

    pub fn mode(&self) -> Mode {
        if self.emit_c {
            Mode::EmitC
        } else if self.emit_asm {
            Mode::EmitAsm
        } else if self.emit_lua {
            Mode::EmitLua
        } else if self.compile_c {
            Mode::CompileC
        } else {
            Mode::SharedObject
        }
    }
}

/// Log level of the compiler, mapped onto the `log` crate's levels.
#[derive(ValueEnum, Clone, Copy, Default, Debug)]
pub enum LogLevel {
    /// Only critical errors.
    #[default]
    #[value(alias("0"))]
    Error,

    /// Also warnings.
    #[value(alias("1"))]
    Warn,

    /// General progress information (which files are compiled, etc.).
    #[value(alias("2"))]
    Info,

    /// Internal compiler tracing.
    #[value(alias("3"))]
    Debug,

    /// Everything, including per-node trace output.
    #[value(alias("4"))]
    Trace,
}

impl From<LogLevel> for log::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_default_mode_is_shared_object() {
        let cli = Cli::try_parse_from(["pallenec", "foo.pln"]).unwrap();
        assert_eq!(cli.mode(), Mode::SharedObject);
        assert!(cli.conflicting_flags().is_none());
    }

    #[test]
    fn test_each_flag_selects_its_mode() {
        let cases = [
            ("--emit-c", Mode::EmitC),
            ("--emit-asm", Mode::EmitAsm),
            ("--emit-lua", Mode::EmitLua),
            ("--compile-c", Mode::CompileC),
        ];
        for (flag, mode) in cases {
            let cli = Cli::try_parse_from(["pallenec", flag, "foo.pln"]).unwrap();
            assert_eq!(cli.mode(), mode);
        }
    }

    #[test]
    fn test_conflicting_flags_are_reported_in_order() {
        let cli = Cli::try_parse_from(["pallenec", "--emit-c", "--emit-asm", "foo.pln"]).unwrap();
        assert_eq!(cli.conflicting_flags(), Some(("--emit-c", "--emit-asm")));

        let cli = Cli::try_parse_from(["pallenec", "--emit-lua", "--compile-c", "foo.pln"]).unwrap();
        assert_eq!(cli.conflicting_flags(), Some(("--emit-lua", "--compile-c")));
    }
}
