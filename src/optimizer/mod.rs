//! IR analysis and optimization passes.
//!
//! Passes run in a fixed order but are individually selectable by name,
//! which is how tests exercise one pass without the other. The
//! uninitialized-variable analysis rejects programs; constant
//! propagation only rewrites.

mod constant_propagation;
mod uninitialized;

pub use constant_propagation::ConstantPropagation;
pub use uninitialized::Uninitialized;

use std::collections::BTreeSet;
use std::{error::Error, fmt::Display};

use log::debug;

use crate::ir::Module;
use crate::lexer::Loc;

/// Error produced by an analysis pass. Passes stop at their first error.
#[derive(Debug, Clone, PartialEq)]
pub struct PassError {
    pub kind: &'static str,
    pub message: String,
    pub loc: Loc,
}

impl Display for PassError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}: {}", self.loc, self.kind, self.message)
    }
}

impl Error for PassError {}

pub trait Pass {
    fn name(&self) -> &'static str;
    fn run(&self, module: Module) -> Result<Module, PassError>;
}

/// Which passes the driver should run. Defaults to all of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassConfig {
    enabled: BTreeSet<String>,
}

impl PassConfig {
    pub fn all() -> Self {
        PassConfig {
            enabled: ["uninitialized", "constant_propagation"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }

    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PassConfig {
            enabled: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.enabled.contains(name)
    }
}

impl Default for PassConfig {
    fn default() -> Self {
        PassConfig::all()
    }
}

pub fn optimize(module: Module, config: &PassConfig) -> Result<Module, PassError> {
    let passes: Vec<Box<dyn Pass>> =
        vec![Box::new(Uninitialized), Box::new(ConstantPropagation)];

    let mut module = module;
    for pass in &passes {
        if config.is_enabled(pass.name()) {
            debug!("running pass '{}'", pass.name());
            module = pass.run(module)?;
        }
    }
    Ok(module)
}
