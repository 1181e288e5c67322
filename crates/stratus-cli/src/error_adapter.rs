//! Error adapter for converting StratusError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error type
//! and miette's rich diagnostic formatting used in the CLI.

use std::fmt;

use miette::Diagnostic as MietteDiagnostic;

use stratus::StratusError;

/// Adapter giving a [`StratusError`] a diagnostic code and, where one helps, a hint.
pub struct ErrorAdapter<'a>(pub &'a StratusError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            StratusError::Io(_) => "stratus::io",
            StratusError::Config(_) => "stratus::config",
            StratusError::Input(_) => "stratus::input",
            StratusError::Layout(_) => "stratus::layout",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match &self.0 {
            StratusError::Config(_) => {
                "check the [layout] section and the --preset, --engine, --spacing, and --edge-style values"
            }
            StratusError::Input(_) => {
                "the input file needs [[services]] entries with `id` and `name`; [[connections]] and [[groups]] are optional"
            }
            StratusError::Io(_) | StratusError::Layout(_) => return None,
        };
        Some(Box::new(help))
    }
}
