//! Per-unit failure taxonomy.
//!
//! Read and syntax failures are fatal for the one file being parsed.
//! `NoEnumsFound` is the "valid but empty" outcome so callers can decide
//! whether to warn or skip. `Cancelled` is distinct from every input
//! problem. Annotation/coercion problems are never errors at all; they
//! degrade locally inside the decoder.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseFailure {
    #[error("failed to read {filename}: {source}")]
    Read {
        filename: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{filename}: {source}")]
    Syntax {
        filename: String,
        #[source]
        source: SyntaxError,
    },

    #[error("no enums found in {filename}")]
    NoEnumsFound { filename: String },

    #[error("parse cancelled")]
    Cancelled,

    #[error("internal parser fault in {filename}: {message}")]
    Internal { filename: String, message: String },
}

/// Structural error from the lexer or the declaration parser.
#[derive(Debug, Error)]
#[error("syntax error at line {line}: {message}")]
pub struct SyntaxError {
    pub line: u32,
    pub message: String,
}

impl SyntaxError {
    pub fn new(line: u32, message: impl Into<String>) -> Self {
        Self { line, message: message.into() }
    }
}
