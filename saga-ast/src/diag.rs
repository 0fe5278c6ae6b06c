// saga-ast - AST, symbol tables and diagnostics for the Saga scripting language
// Copyright (c) 2026 the sagac authors. MIT licensed.

//! The collecting diagnostics sink.
//!
//! Every pass reports through the same two calls. Errors never abort a
//! pass; they are collected so one compiler run surfaces as many
//! problems as possible. The pipeline driver consults the error count
//! between stages and stops before any stage whose preconditions no
//! longer hold.

use std::fmt;

use colored::Colorize;

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// One collected diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Source file the construct came from.
    pub file: String,
    /// The offending text fragment (an identifier, usually), if any.
    pub fragment: Option<String>,
    /// 1-based source line.
    pub line: u32,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
        };
        write!(f, "{}:{}: {}", self.file, self.line, label)?;
        if let Some(fragment) = &self.fragment {
            write!(f, " at '{}'", fragment)?;
        }
        write!(f, ": {}", self.message)
    }
}

/// The sink itself: ordered diagnostics plus running counters.
#[derive(Debug, Default)]
pub struct Reporter {
    diagnostics: Vec<Diagnostic>,
    errors: u32,
    warnings: u32,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report an error against a source construct.
    pub fn error(&mut self, file: &str, fragment: Option<&str>, line: u32, message: impl Into<String>) {
        self.errors += 1;
        self.diagnostics.push(Diagnostic {
            severity: Severity::Error,
            file: file.to_string(),
            fragment: fragment.map(str::to_string),
            line,
            message: message.into(),
        });
    }

    /// Report a warning against a source line.
    pub fn warning(&mut self, file: &str, line: u32, message: impl Into<String>) {
        self.warnings += 1;
        self.diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            file: file.to_string(),
            fragment: None,
            line,
            message: message.into(),
        });
    }

    pub fn error_count(&self) -> u32 {
        self.errors
    }

    pub fn warning_count(&self) -> u32 {
        self.warnings
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Render every diagnostic plus the final tally, one per line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for d in &self.diagnostics {
            out.push_str(&d.to_string());
            out.push('\n');
        }
        out.push_str(&format!(
            "{} error(s), {} warning(s)\n",
            self.errors, self.warnings
        ));
        out
    }
}
