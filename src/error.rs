//! Centralised error hierarchy for the **Rubel interpreter**.
//!
//! Front-end failures (scanner, parser) and run failures all surface to the
//! driver as a [`RubelError`]. Inside the evaluator, failures travel as a
//! [`RuntimeError`] tagged with an [`ErrorKind`]; the interpreter converts
//! the first one that reaches the top level into [`RubelError::Runtime`]
//! together with the index of the offending top-level statement.
//!
//! The module **does not** print diagnostics itself

use std::fmt;
use std::io;
use thiserror::Error;

use log::info;

/// Ordered run status of an interpreter context.
///
/// Every variant up to and including [`RunStatus::Ended`] is a non-error or
/// control status; everything after it is an error. Keep that order when
/// adding variants: [`RunStatus::is_error`] relies on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RunStatus {
    /// Nothing has run yet.
    Idle,

    /// A statement ran with no reportable value.
    RanCommand,

    /// A value was produced and then discarded.
    UnusedValue,

    /// A `break` was requested.
    Break,

    /// A function `return` was requested.
    Return,

    /// The run is over.
    Ended,

    /// Operand kinds did not fit the operation.
    TypeError,

    /// An undefined value ("no result") was used.
    NullValue,

    /// Allocation failure or an invalid reference.
    Memory,

    /// Not implemented, or a name was not found.
    NoImpl,

    /// Unclassified failure.
    General,
}

impl RunStatus {
    /// Single comparison against the last non-error status.
    #[inline]
    pub fn is_error(self) -> bool {
        self > RunStatus::Ended
    }

    /// Short tag used when reporting an error status.
    pub fn label(self) -> &'static str {
        match self {
            RunStatus::TypeError => "TypeErr",
            RunStatus::NullValue => "NullErr",
            RunStatus::Memory => "MemoryErr",
            RunStatus::NoImpl => "NoImplErr",
            RunStatus::General => "BaseRunErr",
            RunStatus::Idle => "Idle",
            RunStatus::RanCommand => "RanCommand",
            RunStatus::UnusedValue => "UnusedValue",
            RunStatus::Break => "Break",
            RunStatus::Return => "Return",
            RunStatus::Ended => "Ended",
        }
    }

    /// Canned description of an error status.
    pub fn description(self) -> &'static str {
        match self {
            RunStatus::TypeError => "Invalid types for operator.",
            RunStatus::NullValue => "Yielded undefined value in operation.",
            RunStatus::Memory => "Allocation failure or invalid reference passed.",
            RunStatus::NoImpl => "Item not found in scope.",
            RunStatus::General => "Unknown runtime error.",
            _ => "No error.",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classification of an evaluation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Type,
    NullValue,
    Memory,
    NoImpl,
    General,
}

impl ErrorKind {
    /// The error status this kind collapses into.
    pub fn status(self) -> RunStatus {
        match self {
            ErrorKind::Type => RunStatus::TypeError,
            ErrorKind::NullValue => RunStatus::NullValue,
            ErrorKind::Memory => RunStatus::Memory,
            ErrorKind::NoImpl => RunStatus::NoImpl,
            ErrorKind::General => RunStatus::General,
        }
    }
}

/// Failure raised while evaluating a statement or expression.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}: {message}", .kind.status())]
pub struct RuntimeError {
    pub kind: ErrorKind,
    pub message: String,
}

impl RuntimeError {
    pub fn new<S: Into<String>>(kind: ErrorKind, msg: S) -> Self {
        RuntimeError {
            kind,
            message: msg.into(),
        }
    }

    pub fn type_error<S: Into<String>>(msg: S) -> Self {
        Self::new(ErrorKind::Type, msg)
    }

    pub fn null_value<S: Into<String>>(msg: S) -> Self {
        Self::new(ErrorKind::NullValue, msg)
    }

    pub fn memory<S: Into<String>>(msg: S) -> Self {
        Self::new(ErrorKind::Memory, msg)
    }

    pub fn no_impl<S: Into<String>>(msg: S) -> Self {
        Self::new(ErrorKind::NoImpl, msg)
    }

    pub fn general<S: Into<String>>(msg: S) -> Self {
        Self::new(ErrorKind::General, msg)
    }

    /// Status code of this failure.
    #[inline]
    pub fn status(&self) -> RunStatus {
        self.kind.status()
    }
}

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RubelError {
    /// Lexical (scanner) error with source line information.
    #[error("[line {line}] Error: {message}")]
    Lex {
        /// Human‑readable description.
        message: String,

        /// 1‑based line where the error occurred.
        line: usize,
    },

    /// Syntactic (parser) error.
    #[error("[line {line}] Error: {message}")]
    Parse { message: String, line: usize },

    /// A top-level statement failed; execution of the script was abandoned.
    #[error("{} at stmt {stmt}: {} ({})", .source.status(), .source.status().description(), .source.message)]
    Runtime {
        /// 0-based index of the offending top-level statement.
        stmt: usize,
        source: RuntimeError,
    },

    /// Wrapper around `std::io::Error` (transparent).  Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// UTF‑8 decoding failure when ingesting external text.
    #[error(transparent)]
    Utf8(#[from] std::str::Utf8Error),
}

impl RubelError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Lex error: line={}, msg={}", line, message);

        RubelError::Lex { message, line }
    }

    /// Helper constructor for the **parser**.
    pub fn parse<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Parse error: line={}, msg={}", line, message);

        RubelError::Parse { message, line }
    }

    /// Helper constructor for the **interpreter**.
    pub fn runtime(stmt: usize, source: RuntimeError) -> Self {
        info!("Creating Runtime error: stmt={}, err={}", stmt, source);

        RubelError::Runtime { stmt, source }
    }

    /// Run status carried by a runtime error, if this is one.
    pub fn status(&self) -> Option<RunStatus> {
        match self {
            RubelError::Runtime { source, .. } => Some(source.status()),
            _ => None,
        }
    }
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, RubelError>;

/// Result alias for evaluation steps.
pub type RunResult<T> = std::result::Result<T, RuntimeError>;
