//! Write-only diagnostics channel.
//!
//! The stepper reports human-readable lines through a [`DiagnosticsSink`]
//! selected by [`Verbosity`]. Sinks only receive text; nothing they do
//! can feed back into the physics, so attaching or removing one never
//! changes results.

use std::fmt;

/// How much the stepper reports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Nothing.
    #[default]
    Silent,
    /// Once per track and on table builds.
    Summary,
    /// Every step.
    Steps,
}

/// Receiver of formatted diagnostic lines.
pub trait DiagnosticsSink: Send {
    /// Record one line.
    fn write_line(&mut self, args: fmt::Arguments<'_>);
}

/// Sink that prints to standard error with a `coulomb:` prefix.
#[derive(Clone, Copy, Debug, Default)]
pub struct StderrSink;

impl DiagnosticsSink for StderrSink {
    fn write_line(&mut self, args: fmt::Arguments<'_>) {
        eprintln!("coulomb: {args}");
    }
}
